//! `PostgreSQL` implementation of the `CrossoverRepository` trait.
//!
//! Enum columns are stored as text and converted through the domain
//! `FromStr` impls; a row that fails to convert is an infrastructure
//! error, not a domain one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use mythcodex_core::error::DomainError;
use mythcodex_crossover::domain::alliances::{MythologyAlliance, MythologyPair};
use mythcodex_crossover::domain::requests::{
    AcceptanceEffect, CrossoverRequest, ResponseOutcome,
};
use mythcodex_crossover::domain::stories::CrossoverStory;
use mythcodex_crossover::repository::{CrossoverRepository, Direction};

/// PostgreSQL-backed crossover repository.
#[derive(Debug, Clone)]
pub struct PgCrossoverRepository {
    pool: PgPool,
}

impl PgCrossoverRepository {
    /// Creates a new `PgCrossoverRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn infra(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(err.to_string())
}

const REQUEST_COLUMNS: &str = "id, requester_id, target_user_id, requester_mythology_id, \
     target_mythology_id, request_type, status, response_message, created_at, responded_at, \
     completed_at";

/// Row shape for `crossover_requests`.
#[derive(Debug, sqlx::FromRow)]
struct RequestRow {
    id: Uuid,
    requester_id: Uuid,
    target_user_id: Uuid,
    requester_mythology_id: Uuid,
    target_mythology_id: Uuid,
    request_type: String,
    status: String,
    response_message: Option<String>,
    created_at: DateTime<Utc>,
    responded_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<RequestRow> for CrossoverRequest {
    type Error = DomainError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            requester_id: row.requester_id,
            target_user_id: row.target_user_id,
            requester_mythology_id: row.requester_mythology_id,
            target_mythology_id: row.target_mythology_id,
            request_type: row
                .request_type
                .parse()
                .map_err(DomainError::Infrastructure)?,
            status: row.status.parse().map_err(DomainError::Infrastructure)?,
            response_message: row.response_message,
            created_at: row.created_at,
            responded_at: row.responded_at,
            completed_at: row.completed_at,
        })
    }
}

/// Row shape for `mythology_alliances`.
#[derive(Debug, sqlx::FromRow)]
struct AllianceRow {
    id: Uuid,
    mythology1_id: Uuid,
    mythology2_id: Uuid,
    relationship_type: String,
    is_active: bool,
    formed_from_request_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AllianceRow> for MythologyAlliance {
    type Error = DomainError;

    fn try_from(row: AllianceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            mythology1_id: row.mythology1_id,
            mythology2_id: row.mythology2_id,
            relationship_type: row
                .relationship_type
                .parse()
                .map_err(DomainError::Infrastructure)?,
            is_active: row.is_active,
            formed_from_request_id: row.formed_from_request_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Row shape for `crossover_stories`.
#[derive(Debug, sqlx::FromRow)]
struct StoryRow {
    id: Uuid,
    title: String,
    story_type: String,
    status: String,
    mythology1_id: Uuid,
    mythology2_id: Uuid,
    author1_id: Uuid,
    author2_id: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<StoryRow> for CrossoverStory {
    type Error = DomainError;

    fn try_from(row: StoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: row.title,
            story_type: row.story_type,
            status: row.status.parse().map_err(DomainError::Infrastructure)?,
            mythology1_id: row.mythology1_id,
            mythology2_id: row.mythology2_id,
            author1_id: row.author1_id,
            author2_id: row.author2_id,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl CrossoverRepository for PgCrossoverRepository {
    async fn insert_request(&self, request: &CrossoverRequest) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO crossover_requests \
             (id, requester_id, target_user_id, requester_mythology_id, target_mythology_id, \
              request_type, status, response_message, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(request.id)
        .bind(request.requester_id)
        .bind(request.target_user_id)
        .bind(request.requester_mythology_id)
        .bind(request.target_mythology_id)
        .bind(request.request_type.as_str())
        .bind(request.status.as_str())
        .bind(&request.response_message)
        .bind(request.created_at)
        .execute(&self.pool)
        .await
        .map_err(infra)?;
        Ok(())
    }

    async fn find_request(&self, id: Uuid) -> Result<Option<CrossoverRequest>, DomainError> {
        let row: Option<RequestRow> = sqlx::query_as(&format!(
            "SELECT {REQUEST_COLUMNS} FROM crossover_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infra)?;
        row.map(TryInto::try_into).transpose()
    }

    async fn list_requests(
        &self,
        user_id: Uuid,
        direction: Direction,
    ) -> Result<Vec<CrossoverRequest>, DomainError> {
        let filter_column = match direction {
            Direction::Incoming => "target_user_id",
            Direction::Outgoing => "requester_id",
        };
        let rows: Vec<RequestRow> = sqlx::query_as(&format!(
            "SELECT {REQUEST_COLUMNS} FROM crossover_requests \
             WHERE {filter_column} = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(infra)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn apply_response(
        &self,
        outcome: &ResponseOutcome,
    ) -> Result<CrossoverRequest, DomainError> {
        let transition = &outcome.transition;
        let mut tx = self.pool.begin().await.map_err(infra)?;

        // Conditional transition: the WHERE clause is the concurrency
        // guard. Zero rows means a concurrent resolution won.
        let updated: Option<RequestRow> = sqlx::query_as(&format!(
            "UPDATE crossover_requests \
             SET status = $2, response_message = $3, responded_at = $4, completed_at = $5 \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(transition.request_id)
        .bind(transition.new_status.as_str())
        .bind(&transition.response_message)
        .bind(transition.responded_at)
        .bind(transition.completed_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(infra)?;

        let Some(row) = updated else {
            let current: Option<(String,)> =
                sqlx::query_as("SELECT status FROM crossover_requests WHERE id = $1")
                    .bind(transition.request_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(infra)?;
            return Err(match current {
                Some((status,)) => DomainError::InvalidStateTransition { current: status },
                None => DomainError::NotFound(transition.request_id),
            });
        };

        match &outcome.effect {
            Some(AcceptanceEffect::Relationship {
                pair,
                relationship,
                formed_from_request_id,
            }) => {
                // One row per unordered pair: re-acceptance retypes and
                // reactivates in place, keeping the original provenance.
                sqlx::query(
                    "INSERT INTO mythology_alliances \
                     (id, mythology1_id, mythology2_id, relationship_type, is_active, \
                      formed_from_request_id, created_at, updated_at) \
                     VALUES ($1, $2, $3, $4, TRUE, $5, $6, $6) \
                     ON CONFLICT (mythology1_id, mythology2_id) DO UPDATE \
                     SET relationship_type = EXCLUDED.relationship_type, \
                         is_active = TRUE, \
                         updated_at = EXCLUDED.updated_at",
                )
                .bind(Uuid::new_v4())
                .bind(pair.first())
                .bind(pair.second())
                .bind(relationship.as_str())
                .bind(formed_from_request_id)
                .bind(transition.responded_at)
                .execute(&mut *tx)
                .await
                .map_err(infra)?;
            }
            Some(AcceptanceEffect::Story(input)) => {
                let story = CrossoverStory::draft(Uuid::new_v4(), input, transition.responded_at);
                sqlx::query(
                    "INSERT INTO crossover_stories \
                     (id, title, story_type, status, mythology1_id, mythology2_id, \
                      author1_id, author2_id, created_at) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                )
                .bind(story.id)
                .bind(&story.title)
                .bind(&story.story_type)
                .bind(story.status.as_str())
                .bind(story.mythology1_id)
                .bind(story.mythology2_id)
                .bind(story.author1_id)
                .bind(story.author2_id)
                .bind(story.created_at)
                .execute(&mut *tx)
                .await
                .map_err(infra)?;
            }
            None => {}
        }

        tx.commit().await.map_err(infra)?;
        row.try_into()
    }

    async fn delete_request(&self, id: Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM crossover_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(id));
        }
        Ok(())
    }

    async fn find_alliance(
        &self,
        pair: MythologyPair,
    ) -> Result<Option<MythologyAlliance>, DomainError> {
        let row: Option<AllianceRow> = sqlx::query_as(
            "SELECT id, mythology1_id, mythology2_id, relationship_type, is_active, \
             formed_from_request_id, created_at, updated_at \
             FROM mythology_alliances WHERE mythology1_id = $1 AND mythology2_id = $2",
        )
        .bind(pair.first())
        .bind(pair.second())
        .fetch_optional(&self.pool)
        .await
        .map_err(infra)?;
        row.map(TryInto::try_into).transpose()
    }

    async fn list_alliances(
        &self,
        mythology_id: Uuid,
    ) -> Result<Vec<MythologyAlliance>, DomainError> {
        let rows: Vec<AllianceRow> = sqlx::query_as(
            "SELECT id, mythology1_id, mythology2_id, relationship_type, is_active, \
             formed_from_request_id, created_at, updated_at \
             FROM mythology_alliances \
             WHERE is_active AND (mythology1_id = $1 OR mythology2_id = $1) \
             ORDER BY updated_at DESC",
        )
        .bind(mythology_id)
        .fetch_all(&self.pool)
        .await
        .map_err(infra)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_stories(&self, mythology_id: Uuid) -> Result<Vec<CrossoverStory>, DomainError> {
        let rows: Vec<StoryRow> = sqlx::query_as(
            "SELECT id, title, story_type, status, mythology1_id, mythology2_id, \
             author1_id, author2_id, created_at \
             FROM crossover_stories \
             WHERE mythology1_id = $1 OR mythology2_id = $1 \
             ORDER BY created_at DESC",
        )
        .bind(mythology_id)
        .fetch_all(&self.pool)
        .await
        .map_err(infra)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}

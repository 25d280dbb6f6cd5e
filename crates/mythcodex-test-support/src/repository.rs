//! Test repositories — `CrossoverRepository` doubles for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use mythcodex_core::error::DomainError;
use mythcodex_crossover::domain::alliances::{MythologyAlliance, MythologyPair};
use mythcodex_crossover::domain::requests::{
    AcceptanceEffect, CrossoverRequest, RequestStatus, ResponseOutcome,
};
use mythcodex_crossover::domain::stories::CrossoverStory;
use mythcodex_crossover::repository::{CrossoverRepository, Direction};

#[derive(Debug, Default)]
struct Inner {
    requests: HashMap<Uuid, CrossoverRequest>,
    alliances: Vec<MythologyAlliance>,
    stories: Vec<CrossoverStory>,
}

/// An in-memory crossover repository with the same observable semantics
/// as the Postgres implementation, including the compare-and-set status
/// transition in `apply_response`.
#[derive(Debug, Default)]
pub struct InMemoryCrossoverRepository {
    inner: Mutex<Inner>,
}

impl InMemoryCrossoverRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-seeded with requests.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_requests(requests: Vec<CrossoverRequest>) -> Self {
        let repo = Self::new();
        {
            let mut inner = repo.inner.lock().unwrap();
            for request in requests {
                inner.requests.insert(request.id, request);
            }
        }
        repo
    }

    /// Returns a snapshot of a stored request.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn request(&self, id: Uuid) -> Option<CrossoverRequest> {
        self.inner.lock().unwrap().requests.get(&id).cloned()
    }

    /// Returns a snapshot of all alliance rows.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn alliances(&self) -> Vec<MythologyAlliance> {
        self.inner.lock().unwrap().alliances.clone()
    }

    /// Returns a snapshot of all story rows.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn stories(&self) -> Vec<CrossoverStory> {
        self.inner.lock().unwrap().stories.clone()
    }
}

#[async_trait]
impl CrossoverRepository for InMemoryCrossoverRepository {
    async fn insert_request(&self, request: &CrossoverRequest) -> Result<(), DomainError> {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn find_request(&self, id: Uuid) -> Result<Option<CrossoverRequest>, DomainError> {
        Ok(self.inner.lock().unwrap().requests.get(&id).cloned())
    }

    async fn list_requests(
        &self,
        user_id: Uuid,
        direction: Direction,
    ) -> Result<Vec<CrossoverRequest>, DomainError> {
        let inner = self.inner.lock().unwrap();
        let mut requests: Vec<CrossoverRequest> = inner
            .requests
            .values()
            .filter(|r| match direction {
                Direction::Incoming => r.target_user_id == user_id,
                Direction::Outgoing => r.requester_id == user_id,
            })
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn apply_response(
        &self,
        outcome: &ResponseOutcome,
    ) -> Result<CrossoverRequest, DomainError> {
        let mut inner = self.inner.lock().unwrap();
        let transition = &outcome.transition;

        let updated = {
            let request = inner
                .requests
                .get_mut(&transition.request_id)
                .ok_or(DomainError::NotFound(transition.request_id))?;
            // Compare-and-set: a concurrent resolution that already moved
            // the request out of pending wins.
            if request.status != RequestStatus::Pending {
                return Err(DomainError::InvalidStateTransition {
                    current: request.status.to_string(),
                });
            }
            request.status = transition.new_status;
            request.response_message = transition.response_message.clone();
            request.responded_at = Some(transition.responded_at);
            request.completed_at = transition.completed_at;
            request.clone()
        };

        match &outcome.effect {
            Some(AcceptanceEffect::Relationship {
                pair,
                relationship,
                formed_from_request_id,
            }) => {
                if let Some(row) = inner.alliances.iter_mut().find(|a| a.pair() == *pair) {
                    row.relationship_type = *relationship;
                    row.is_active = true;
                    row.updated_at = transition.responded_at;
                } else {
                    inner.alliances.push(MythologyAlliance::formed(
                        Uuid::new_v4(),
                        *pair,
                        *relationship,
                        *formed_from_request_id,
                        transition.responded_at,
                    ));
                }
            }
            Some(AcceptanceEffect::Story(story)) => {
                inner.stories.push(CrossoverStory::draft(
                    Uuid::new_v4(),
                    story,
                    transition.responded_at,
                ));
            }
            None => {}
        }

        Ok(updated)
    }

    async fn delete_request(&self, id: Uuid) -> Result<(), DomainError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .requests
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::NotFound(id))
    }

    async fn find_alliance(
        &self,
        pair: MythologyPair,
    ) -> Result<Option<MythologyAlliance>, DomainError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .alliances
            .iter()
            .find(|a| a.pair() == pair)
            .cloned())
    }

    async fn list_alliances(
        &self,
        mythology_id: Uuid,
    ) -> Result<Vec<MythologyAlliance>, DomainError> {
        let inner = self.inner.lock().unwrap();
        let mut alliances: Vec<MythologyAlliance> = inner
            .alliances
            .iter()
            .filter(|a| a.is_active && a.pair().contains(mythology_id))
            .cloned()
            .collect();
        alliances.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(alliances)
    }

    async fn list_stories(&self, mythology_id: Uuid) -> Result<Vec<CrossoverStory>, DomainError> {
        let inner = self.inner.lock().unwrap();
        let mut stories: Vec<CrossoverStory> = inner
            .stories
            .iter()
            .filter(|s| s.involves(mythology_id))
            .cloned()
            .collect();
        stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(stories)
    }
}

/// A crossover repository that always returns an infrastructure error.
/// Useful for testing error-handling paths.
#[derive(Debug)]
pub struct FailingCrossoverRepository;

impl FailingCrossoverRepository {
    fn failure<T>() -> Result<T, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

#[async_trait]
impl CrossoverRepository for FailingCrossoverRepository {
    async fn insert_request(&self, _request: &CrossoverRequest) -> Result<(), DomainError> {
        Self::failure()
    }

    async fn find_request(&self, _id: Uuid) -> Result<Option<CrossoverRequest>, DomainError> {
        Self::failure()
    }

    async fn list_requests(
        &self,
        _user_id: Uuid,
        _direction: Direction,
    ) -> Result<Vec<CrossoverRequest>, DomainError> {
        Self::failure()
    }

    async fn apply_response(
        &self,
        _outcome: &ResponseOutcome,
    ) -> Result<CrossoverRequest, DomainError> {
        Self::failure()
    }

    async fn delete_request(&self, _id: Uuid) -> Result<(), DomainError> {
        Self::failure()
    }

    async fn find_alliance(
        &self,
        _pair: MythologyPair,
    ) -> Result<Option<MythologyAlliance>, DomainError> {
        Self::failure()
    }

    async fn list_alliances(
        &self,
        _mythology_id: Uuid,
    ) -> Result<Vec<MythologyAlliance>, DomainError> {
        Self::failure()
    }

    async fn list_stories(&self, _mythology_id: Uuid) -> Result<Vec<CrossoverStory>, DomainError> {
        Self::failure()
    }
}

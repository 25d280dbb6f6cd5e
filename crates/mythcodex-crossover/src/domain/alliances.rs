//! Alliance records connecting two mythology worlds.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonically ordered unordered pair of mythology ids.
///
/// The lower id (under the `Uuid` total order) is always stored first, so
/// a pair identifies at most one alliance row regardless of which side
/// initiated the request. Any total order would do; `Uuid`'s byte order
/// needs no allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MythologyPair {
    first: Uuid,
    second: Uuid,
}

impl MythologyPair {
    /// Builds the canonical pair from the two mythology ids in any order.
    #[must_use]
    pub fn new(a: Uuid, b: Uuid) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// The lower mythology id.
    #[must_use]
    pub fn first(self) -> Uuid {
        self.first
    }

    /// The higher mythology id.
    #[must_use]
    pub fn second(self) -> Uuid {
        self.second
    }

    /// Whether `mythology_id` is either side of the pair.
    #[must_use]
    pub fn contains(self, mythology_id: Uuid) -> bool {
        self.first == mythology_id || self.second == mythology_id
    }
}

/// The durable relationship kind derived from an accepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// The two mythologies are allied.
    Alliance,
    /// The two mythologies are in conflict.
    Conflict,
    /// The two mythologies trade with each other.
    TradePartners,
}

impl RelationshipType {
    /// Stable string form used in storage and JSON.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alliance => "alliance",
            Self::Conflict => "conflict",
            Self::TradePartners => "trade_partners",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alliance" => Ok(Self::Alliance),
            "conflict" => Ok(Self::Conflict),
            "trade_partners" => Ok(Self::TradePartners),
            other => Err(format!("unknown relationship type: {other}")),
        }
    }
}

/// The durable record of a relationship between two mythology worlds.
#[derive(Debug, Clone, PartialEq)]
pub struct MythologyAlliance {
    /// Unique record identifier.
    pub id: Uuid,
    /// Lower mythology id of the canonical pair.
    pub mythology1_id: Uuid,
    /// Higher mythology id of the canonical pair.
    pub mythology2_id: Uuid,
    /// Relationship kind, retyped on every re-acceptance.
    pub relationship_type: RelationshipType,
    /// Whether the relationship is currently in force.
    pub is_active: bool,
    /// The request whose acceptance first formed this row (provenance).
    pub formed_from_request_id: Uuid,
    /// When the row was first created.
    pub created_at: DateTime<Utc>,
    /// Refreshed whenever a re-acceptance retypes the row.
    pub updated_at: DateTime<Utc>,
}

impl MythologyAlliance {
    /// Materializes a fresh alliance row for a newly accepted request.
    #[must_use]
    pub fn formed(
        id: Uuid,
        pair: MythologyPair,
        relationship_type: RelationshipType,
        formed_from_request_id: Uuid,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            mythology1_id: pair.first(),
            mythology2_id: pair.second(),
            relationship_type,
            is_active: true,
            formed_from_request_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// The canonical pair this row is keyed on.
    #[must_use]
    pub fn pair(&self) -> MythologyPair {
        MythologyPair::new(self.mythology1_id, self.mythology2_id)
    }
}

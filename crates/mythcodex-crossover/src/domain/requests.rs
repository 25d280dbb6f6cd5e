//! Crossover request entity and its resolution state machine.
//!
//! A request starts `pending` and is resolved exactly once: the target
//! accepts or declines it, or the requester cancels it. Acceptance also
//! decides which downstream record to materialize; the decision is
//! returned as a value so the store can apply it atomically with the
//! status transition.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use mythcodex_core::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::alliances::{MythologyPair, RelationshipType};
use super::stories::{DEFAULT_STORY_TITLE, NewCrossoverStory};

/// The kind of interaction a crossover request proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    /// Propose an alliance between the two mythologies.
    Alliance,
    /// Propose a conflict between the two mythologies.
    Conflict,
    /// Propose a trade relationship between the two mythologies.
    Trade,
    /// Propose a shared story written by both authors.
    Story,
}

impl RequestType {
    /// Stable string form used in storage and JSON.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alliance => "alliance",
            Self::Conflict => "conflict",
            Self::Trade => "trade",
            Self::Story => "story",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alliance" => Ok(Self::Alliance),
            "conflict" => Ok(Self::Conflict),
            "trade" => Ok(Self::Trade),
            "story" => Ok(Self::Story),
            other => Err(format!("unknown request type: {other}")),
        }
    }
}

/// Lifecycle state of a crossover request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting resolution; the only state transitions are defined from.
    Pending,
    /// The target accepted (terminal).
    Accepted,
    /// The target declined (terminal).
    Declined,
    /// The requester withdrew it (terminal).
    Cancelled,
}

impl RequestStatus {
    /// Whether any transition out of this status is still possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Stable string form used in storage and JSON.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown request status: {other}")),
        }
    }
}

/// Action a caller can take on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespondAction {
    /// Target accepts; materializes the downstream record.
    Accept,
    /// Target declines.
    Decline,
    /// Requester withdraws.
    Cancel,
}

impl RespondAction {
    /// Parses a caller-supplied action string.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAction` for unrecognized values.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "accept" => Ok(Self::Accept),
            "decline" => Ok(Self::Decline),
            "cancel" => Ok(Self::Cancel),
            other => Err(DomainError::InvalidAction(other.to_owned())),
        }
    }

    /// Stable string form for logging.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Decline => "decline",
            Self::Cancel => "cancel",
        }
    }
}

impl fmt::Display for RespondAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated input for creating a new crossover request.
#[derive(Debug, Clone)]
pub struct NewCrossoverRequest {
    /// The proposing user.
    pub requester_id: Uuid,
    /// The user whose mythology is being approached.
    pub target_user_id: Uuid,
    /// The requester's mythology.
    pub requester_mythology_id: Uuid,
    /// The target's mythology.
    pub target_mythology_id: Uuid,
    /// The kind of interaction proposed.
    pub request_type: RequestType,
    /// Optional note from the requester.
    pub message: Option<String>,
}

impl NewCrossoverRequest {
    /// Validates and builds creation input.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the requester targets
    /// themselves or proposes a crossover of a mythology with itself.
    pub fn new(
        requester_id: Uuid,
        target_user_id: Uuid,
        requester_mythology_id: Uuid,
        target_mythology_id: Uuid,
        request_type: RequestType,
        message: Option<String>,
    ) -> Result<Self, DomainError> {
        if requester_id == target_user_id {
            return Err(DomainError::Validation(
                "cannot send a crossover request to yourself".to_owned(),
            ));
        }
        if requester_mythology_id == target_mythology_id {
            return Err(DomainError::Validation(
                "a mythology cannot cross over with itself".to_owned(),
            ));
        }
        Ok(Self {
            requester_id,
            target_user_id,
            requester_mythology_id,
            target_mythology_id,
            request_type,
            message,
        })
    }
}

/// A proposed interaction between two users' mythology worlds.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossoverRequest {
    /// Unique record identifier.
    pub id: Uuid,
    /// The proposing user.
    pub requester_id: Uuid,
    /// The user whose mythology is being approached.
    pub target_user_id: Uuid,
    /// The requester's mythology.
    pub requester_mythology_id: Uuid,
    /// The target's mythology.
    pub target_mythology_id: Uuid,
    /// The kind of interaction proposed.
    pub request_type: RequestType,
    /// Lifecycle state.
    pub status: RequestStatus,
    /// Free text set when the target responds.
    pub response_message: Option<String>,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
    /// When the request left `pending`.
    pub responded_at: Option<DateTime<Utc>>,
    /// When acceptance side effects finished materializing.
    pub completed_at: Option<DateTime<Utc>>,
}

/// The status transition computed by a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTransition {
    /// The request being resolved.
    pub request_id: Uuid,
    /// The terminal status the request moves to.
    pub new_status: RequestStatus,
    /// The responder's message, if any.
    pub response_message: Option<String>,
    /// Resolution timestamp.
    pub responded_at: DateTime<Utc>,
    /// Set only for acceptance, once the side effect is part of the
    /// same atomic write.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Side effect applied atomically with an accepting transition.
#[derive(Debug, Clone, PartialEq)]
pub enum AcceptanceEffect {
    /// Create or reactivate the alliance row for the canonical pair.
    Relationship {
        /// Canonical mythology pair.
        pair: MythologyPair,
        /// Relationship kind the row takes on.
        relationship: RelationshipType,
        /// Provenance for a newly inserted row.
        formed_from_request_id: Uuid,
    },
    /// Start a shared draft story spanning both mythologies.
    Story(NewCrossoverStory),
}

/// Everything the store must apply for one resolution.
#[derive(Debug, Clone)]
pub struct ResponseOutcome {
    /// The conditional status transition.
    pub transition: StatusTransition,
    /// Present only when the transition is an acceptance.
    pub effect: Option<AcceptanceEffect>,
}

impl CrossoverRequest {
    /// Creates a new pending request from validated input.
    #[must_use]
    pub fn create(input: NewCrossoverRequest, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            requester_id: input.requester_id,
            target_user_id: input.target_user_id,
            requester_mythology_id: input.requester_mythology_id,
            target_mythology_id: input.target_mythology_id,
            request_type: input.request_type,
            status: RequestStatus::Pending,
            response_message: input.message,
            created_at: now,
            responded_at: None,
            completed_at: None,
        }
    }

    /// Whether `user_id` is one of the two parties.
    #[must_use]
    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.requester_id == user_id || self.target_user_id == user_id
    }

    fn authorize(&self, caller_id: Uuid, action: RespondAction) -> Result<(), DomainError> {
        if !self.is_party(caller_id) {
            return Err(DomainError::Forbidden(
                "you are not a party to this request".to_owned(),
            ));
        }
        match action {
            RespondAction::Cancel if caller_id != self.requester_id => Err(DomainError::Forbidden(
                "only the requester can cancel a request".to_owned(),
            )),
            RespondAction::Accept | RespondAction::Decline
                if caller_id != self.target_user_id =>
            {
                Err(DomainError::Forbidden(
                    "only the recipient can accept or decline a request".to_owned(),
                ))
            }
            _ => Ok(()),
        }
    }

    /// The record materialized when this request is accepted.
    fn acceptance_effect(&self) -> AcceptanceEffect {
        let relationship = |relationship| AcceptanceEffect::Relationship {
            pair: MythologyPair::new(self.requester_mythology_id, self.target_mythology_id),
            relationship,
            formed_from_request_id: self.id,
        };
        match self.request_type {
            RequestType::Alliance => relationship(RelationshipType::Alliance),
            RequestType::Conflict => relationship(RelationshipType::Conflict),
            RequestType::Trade => relationship(RelationshipType::TradePartners),
            RequestType::Story => AcceptanceEffect::Story(NewCrossoverStory {
                title: DEFAULT_STORY_TITLE.to_owned(),
                mythology1_id: self.requester_mythology_id,
                mythology2_id: self.target_mythology_id,
                author1_id: self.requester_id,
                author2_id: self.target_user_id,
            }),
        }
    }

    /// Resolves a pending request, producing the transition to apply and
    /// the side effect to materialize with it.
    ///
    /// Validation order: party membership, per-action authorization,
    /// then the pending check.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Forbidden` when the caller is not allowed to
    /// take `action`, or `DomainError::InvalidStateTransition` when the
    /// request has already been resolved.
    pub fn resolve(
        &self,
        caller_id: Uuid,
        action: RespondAction,
        response_message: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ResponseOutcome, DomainError> {
        self.authorize(caller_id, action)?;
        if self.status != RequestStatus::Pending {
            return Err(DomainError::InvalidStateTransition {
                current: self.status.to_string(),
            });
        }

        let new_status = match action {
            RespondAction::Accept => RequestStatus::Accepted,
            RespondAction::Decline => RequestStatus::Declined,
            RespondAction::Cancel => RequestStatus::Cancelled,
        };
        let effect = (action == RespondAction::Accept).then(|| self.acceptance_effect());
        let completed_at = effect.as_ref().map(|_| now);

        Ok(ResponseOutcome {
            transition: StatusTransition {
                request_id: self.id,
                new_status,
                response_message,
                responded_at: now,
                completed_at,
            },
            effect,
        })
    }

    /// Checks that `caller_id` may delete this request right now.
    ///
    /// Either party may remove a resolved request; a pending one has to
    /// be cancelled first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Forbidden` for non-parties and
    /// `DomainError::InvalidStateTransition` while still pending.
    pub fn ensure_deletable(&self, caller_id: Uuid) -> Result<(), DomainError> {
        if !self.is_party(caller_id) {
            return Err(DomainError::Forbidden(
                "you are not a party to this request".to_owned(),
            ));
        }
        if self.status == RequestStatus::Pending {
            return Err(DomainError::InvalidStateTransition {
                current: self.status.to_string(),
            });
        }
        Ok(())
    }
}

//! Shared crossover story drafts.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title given to a story draft before the authors rename it.
pub const DEFAULT_STORY_TITLE: &str = "Untitled Crossover Story";

/// Story type discriminator for stories spanning two mythologies.
pub const CROSSOVER_STORY_TYPE: &str = "crossover";

/// Publication state of a crossover story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryStatus {
    /// Being written; the state every materialized story starts in.
    Draft,
    /// Visible to readers outside the two authors.
    Published,
}

impl StoryStatus {
    /// Stable string form used in storage and JSON.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

impl fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            other => Err(format!("unknown story status: {other}")),
        }
    }
}

/// Input for the story created when a story-type request is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCrossoverStory {
    /// Initial title (the default placeholder unless renamed later).
    pub title: String,
    /// The requester's mythology.
    pub mythology1_id: Uuid,
    /// The target's mythology.
    pub mythology2_id: Uuid,
    /// The requester.
    pub author1_id: Uuid,
    /// The target.
    pub author2_id: Uuid,
}

/// A shared narrative draft spanning two mythology worlds.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossoverStory {
    /// Unique record identifier.
    pub id: Uuid,
    /// Story title.
    pub title: String,
    /// Always [`CROSSOVER_STORY_TYPE`] for stories created here.
    pub story_type: String,
    /// Publication state; starts at [`StoryStatus::Draft`].
    pub status: StoryStatus,
    /// The requester's mythology.
    pub mythology1_id: Uuid,
    /// The target's mythology.
    pub mythology2_id: Uuid,
    /// The requester.
    pub author1_id: Uuid,
    /// The target.
    pub author2_id: Uuid,
    /// When the story was materialized.
    pub created_at: DateTime<Utc>,
}

impl CrossoverStory {
    /// Materializes the draft story for an accepted story-type request.
    #[must_use]
    pub fn draft(id: Uuid, input: &NewCrossoverStory, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title.clone(),
            story_type: CROSSOVER_STORY_TYPE.to_owned(),
            status: StoryStatus::Draft,
            mythology1_id: input.mythology1_id,
            mythology2_id: input.mythology2_id,
            author1_id: input.author1_id,
            author2_id: input.author2_id,
            created_at,
        }
    }

    /// Whether `mythology_id` is either of the two mythologies involved.
    #[must_use]
    pub fn involves(&self, mythology_id: Uuid) -> bool {
        self.mythology1_id == mythology_id || self.mythology2_id == mythology_id
    }
}

//! Duplicate-resolution plan data model.

use crate::models::media::MediaKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Plan file format version.
pub const PLAN_VERSION: &str = "1.0";

/// A full deduplication plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Plan version.
    pub version: String,
    /// Unique plan ID.
    pub plan_id: String,
    /// Creation timestamp.
    pub created_at: String,
    /// One entry per duplicate group, in discovery order.
    pub groups: Vec<GroupPlan>,
    /// Files that could not be classified and are left untouched.
    #[serde(default)]
    pub unclassified: Vec<UnclassifiedItem>,
}

impl Plan {
    /// Create an empty plan stamped with a fresh ID and the current time.
    pub fn new() -> Self {
        Self {
            version: PLAN_VERSION.to_string(),
            plan_id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            groups: Vec::new(),
            unclassified: Vec::new(),
        }
    }

    /// Iterate over every action in the plan.
    pub fn actions(&self) -> impl Iterator<Item = &PlanAction> {
        self.groups.iter().flat_map(|g| g.actions.iter())
    }

    /// Count actions with a given disposition.
    pub fn count(&self, disposition: Disposition) -> usize {
        self.actions()
            .filter(|a| a.disposition == disposition)
            .count()
    }

    /// Groups holding more than one file.
    pub fn duplicate_groups(&self) -> impl Iterator<Item = &GroupPlan> {
        self.groups.iter().filter(|g| g.actions.len() > 1)
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self::new()
    }
}

/// Actions for one logical title/episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupPlan {
    pub title: String,
    pub year: Option<u16>,
    pub kind: MediaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    /// Actions ordered by rank, best first.
    pub actions: Vec<PlanAction>,
}

impl GroupPlan {
    /// Human readable group label.
    pub fn label(&self) -> String {
        let mut label = match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        };
        if let (Some(season), Some(episode)) = (self.season, self.episode) {
            label.push_str(&format!(" S{:02}E{:02}", season, episode));
        }
        label
    }
}

/// What happens to a single file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanAction {
    /// Current location.
    pub source: PathBuf,
    /// Rank the decision was based on.
    pub rank: i32,
    pub disposition: Disposition,
    /// Move destination; `None` when the file stays where it is
    /// (or, for deletes, when the mover picks the location).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
}

/// Disposition of a file within its duplicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Keep,
    Demote,
    Delete,
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Disposition::Keep => write!(f, "keep"),
            Disposition::Demote => write!(f, "demote"),
            Disposition::Delete => write!(f, "delete"),
        }
    }
}

/// A file that failed classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnclassifiedItem {
    /// Source file.
    pub source: PathBuf,
    /// Reason for failure.
    pub reason: String,
}

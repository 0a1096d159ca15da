use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::Status;
use super::timeframe::Timeframe;

/// A tracked objective, optionally nested under a parent goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    /// Parent goal reference. May dangle; the tree builder treats a dangling
    /// parent as absent.
    #[serde(default)]
    pub parent_goal_id: Option<String>,
    #[serde(default)]
    pub space_id: String,
    #[serde(default)]
    pub champion_id: Option<String>,
    #[serde(default)]
    pub reviewer_id: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<NaiveDate>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<Timeframe>,
    /// 0–100. `None` when progress is not tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

impl Goal {
    /// Create an active, top-level goal with no optional fields set
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Goal {
            id: id.into(),
            name: name.into(),
            parent_goal_id: None,
            space_id: String::new(),
            champion_id: None,
            reviewer_id: None,
            status: Status::Active,
            closed: false,
            closed_at: None,
            archived: false,
            archived_at: None,
            timeframe: None,
            progress: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_goal_id = Some(parent.into());
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
}

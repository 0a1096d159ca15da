use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::Status;
use super::timeframe::Timeframe;

/// A unit of execution work, optionally attached to a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Owning goal. Unattached projects are listed at the root.
    #[serde(default)]
    pub goal_id: Option<String>,
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Project {
            id: id.into(),
            name: name.into(),
            goal_id: None,
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

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal_id = Some(goal.into());
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
}

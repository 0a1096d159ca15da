use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::entity::Status;
use super::timeframe::Timeframe;

/// Column the sibling groups of a tree are ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortColumn {
    #[default]
    Name,
    Progress,
    Timeframe,
    Status,
}

impl SortColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Progress => "progress",
            SortColumn::Timeframe => "timeframe",
            SortColumn::Status => "status",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortColumn::Name),
            "progress" => Ok(SortColumn::Progress),
            "timeframe" => Ok(SortColumn::Timeframe),
            "status" => Ok(SortColumn::Status),
            _ => Err(format!(
                "unknown sort column '{}' (expected: name, progress, timeframe, status)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(format!("unknown sort direction '{}' (expected: asc, desc)", s)),
        }
    }
}

/// Everything that shapes a built tree. Immutable once handed to the
/// builder; a changed option means a new tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeOptions {
    /// Only entities in this space
    pub space_id: Option<String>,
    /// Only entities championed by this person
    pub person_id: Option<String>,
    /// Only entities reviewed by this person
    pub reviewer_id: Option<String>,
    /// Restrict the tree to the subtree rooted at this goal
    pub goal_id: Option<String>,
    pub sort_column: SortColumn,
    pub sort_direction: SortDirection,
    pub show_active: bool,
    pub show_paused: bool,
    pub show_completed: bool,
    /// Only entities whose timeframe overlaps this one
    pub timeframe: Option<Timeframe>,
}

impl Default for TreeOptions {
    fn default() -> Self {
        TreeOptions {
            space_id: None,
            person_id: None,
            reviewer_id: None,
            goal_id: None,
            sort_column: SortColumn::default(),
            sort_direction: SortDirection::default(),
            show_active: true,
            show_paused: true,
            show_completed: true,
            timeframe: None,
        }
    }
}

impl TreeOptions {
    pub fn with_space(mut self, space_id: impl Into<String>) -> Self {
        self.space_id = Some(space_id.into());
        self
    }

    pub fn with_person(mut self, person_id: impl Into<String>) -> Self {
        self.person_id = Some(person_id.into());
        self
    }

    pub fn with_reviewer(mut self, reviewer_id: impl Into<String>) -> Self {
        self.reviewer_id = Some(reviewer_id.into());
        self
    }

    pub fn with_goal(mut self, goal_id: impl Into<String>) -> Self {
        self.goal_id = Some(goal_id.into());
        self
    }

    pub fn with_sort(mut self, column: SortColumn, direction: SortDirection) -> Self {
        self.sort_column = column;
        self.sort_direction = direction;
        self
    }

    pub fn with_statuses(mut self, active: bool, paused: bool, completed: bool) -> Self {
        self.show_active = active;
        self.show_paused = paused;
        self.show_completed = completed;
        self
    }

    pub fn with_timeframe(mut self, timeframe: Timeframe) -> Self {
        self.timeframe = Some(timeframe);
        self
    }

    /// Whether the status toggles let an entity with `status` through
    pub fn shows_status(&self, status: Status) -> bool {
        match status {
            Status::Active => self.show_active,
            Status::Paused => self.show_paused,
            Status::Completed => self.show_completed,
        }
    }
}

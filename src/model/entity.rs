use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::goal::Goal;
use super::project::Project;
use super::timeframe::Timeframe;

/// Lifecycle status shared by goals and projects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Paused,
    Completed,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Paused => "paused",
            Status::Completed => "completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which kind of entity a tree node wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Goal,
    Project,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Goal => "goal",
            NodeKind::Project => "project",
        }
    }
}

/// Identity of a tree node. Goal and project ids live in separate
/// namespaces, so the kind is part of the key.
///
/// Text form is `goal:<id>` or `project:<id>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId {
    pub kind: NodeKind,
    pub id: String,
}

impl NodeId {
    pub fn goal(id: impl Into<String>) -> Self {
        NodeId {
            kind: NodeKind::Goal,
            id: id.into(),
        }
    }

    pub fn project(id: impl Into<String>) -> Self {
        NodeId {
            kind: NodeKind::Project,
            id: id.into(),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

impl FromStr for NodeId {
    type Err = String;

    /// A bare id without a `kind:` prefix is taken to be a goal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = match s.split_once(':') {
            Some(("goal", id)) => (NodeKind::Goal, id),
            Some(("project", id)) => (NodeKind::Project, id),
            Some((other, _)) => {
                return Err(format!(
                    "unknown node kind '{}' (expected: goal, project)",
                    other
                ));
            }
            None => (NodeKind::Goal, s),
        };
        if id.is_empty() {
            return Err(format!("missing id in node reference '{}'", s));
        }
        Ok(NodeId {
            kind,
            id: id.to_string(),
        })
    }
}

impl TryFrom<String> for NodeId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodeId> for String {
    fn from(value: NodeId) -> Self {
        value.to_string()
    }
}

/// The capability shared by everything that can sit in a goal tree.
/// Filtering and sorting are written once against this trait.
pub trait Treeable {
    fn kind(&self) -> NodeKind;
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    /// Parent goal id: `parent_goal_id` for goals, `goal_id` for projects.
    fn parent_id(&self) -> Option<&str>;
    fn space_id(&self) -> &str;
    fn champion_id(&self) -> Option<&str>;
    fn reviewer_id(&self) -> Option<&str>;
    fn status(&self) -> Status;
    fn is_closed(&self) -> bool;
    fn is_archived(&self) -> bool;
    fn timeframe(&self) -> Option<&Timeframe>;
    fn progress(&self) -> Option<f64>;

    fn node_id(&self) -> NodeId {
        NodeId {
            kind: self.kind(),
            id: self.id().to_string(),
        }
    }

    /// Completed for rollup purposes: explicit completed status, or closed.
    fn is_completed(&self) -> bool {
        self.status() == Status::Completed || self.is_closed()
    }
}

macro_rules! impl_treeable {
    ($ty:ty, $kind:expr, $parent:ident) => {
        impl Treeable for $ty {
            fn kind(&self) -> NodeKind {
                $kind
            }
            fn id(&self) -> &str {
                &self.id
            }
            fn name(&self) -> &str {
                &self.name
            }
            fn parent_id(&self) -> Option<&str> {
                self.$parent.as_deref()
            }
            fn space_id(&self) -> &str {
                &self.space_id
            }
            fn champion_id(&self) -> Option<&str> {
                self.champion_id.as_deref()
            }
            fn reviewer_id(&self) -> Option<&str> {
                self.reviewer_id.as_deref()
            }
            fn status(&self) -> Status {
                self.status
            }
            fn is_closed(&self) -> bool {
                self.closed
            }
            fn is_archived(&self) -> bool {
                self.archived
            }
            fn timeframe(&self) -> Option<&Timeframe> {
                self.timeframe.as_ref()
            }
            fn progress(&self) -> Option<f64> {
                self.progress
            }
        }
    };
}

impl_treeable!(Goal, NodeKind::Goal, parent_goal_id);
impl_treeable!(Project, NodeKind::Project, goal_id);

/// A goal or a project, as held by a tree node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    Goal(Goal),
    Project(Project),
}

impl Entity {
    fn inner(&self) -> &dyn Treeable {
        match self {
            Entity::Goal(g) => g,
            Entity::Project(p) => p,
        }
    }
}

impl Treeable for Entity {
    fn kind(&self) -> NodeKind {
        self.inner().kind()
    }
    fn id(&self) -> &str {
        self.inner().id()
    }
    fn name(&self) -> &str {
        self.inner().name()
    }
    fn parent_id(&self) -> Option<&str> {
        self.inner().parent_id()
    }
    fn space_id(&self) -> &str {
        self.inner().space_id()
    }
    fn champion_id(&self) -> Option<&str> {
        self.inner().champion_id()
    }
    fn reviewer_id(&self) -> Option<&str> {
        self.inner().reviewer_id()
    }
    fn status(&self) -> Status {
        self.inner().status()
    }
    fn is_closed(&self) -> bool {
        self.inner().is_closed()
    }
    fn is_archived(&self) -> bool {
        self.inner().is_archived()
    }
    fn timeframe(&self) -> Option<&Timeframe> {
        self.inner().timeframe()
    }
    fn progress(&self) -> Option<f64> {
        self.inner().progress()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_text_form() {
        assert_eq!(NodeId::goal("g1").to_string(), "goal:g1");
        assert_eq!(NodeId::project("p1").to_string(), "project:p1");
        assert_eq!("project:p1".parse::<NodeId>().unwrap(), NodeId::project("p1"));
        assert_eq!("g7".parse::<NodeId>().unwrap(), NodeId::goal("g7"));
        assert!("space:s1".parse::<NodeId>().is_err());
        assert!("goal:".parse::<NodeId>().is_err());
    }

    #[test]
    fn node_id_as_json_map_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(NodeId::goal("1"), true);
        map.insert(NodeId::project("p1"), false);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"goal:1":true,"project:p1":false}"#);
        let back: std::collections::BTreeMap<NodeId, bool> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn entity_delegates_to_inner() {
        let goal = Goal::new("g1", "Grow").with_parent("g0");
        let project = Project::new("p1", "Ship").with_goal("g1");
        let e_goal = Entity::Goal(goal);
        let e_project = Entity::Project(project);
        assert_eq!(e_goal.kind(), NodeKind::Goal);
        assert_eq!(e_goal.parent_id(), Some("g0"));
        assert_eq!(e_project.kind(), NodeKind::Project);
        assert_eq!(e_project.parent_id(), Some("g1"));
        assert_eq!(e_project.node_id(), NodeId::project("p1"));
    }

    #[test]
    fn closed_counts_as_completed() {
        let mut goal = Goal::new("g1", "Grow");
        assert!(!goal.is_completed());
        goal.closed = true;
        assert!(goal.is_completed());
        let project = Project::new("p1", "Ship").with_status(Status::Completed);
        assert!(project.is_completed());
    }

    #[test]
    fn goal_deserializes_with_defaults() {
        let goal: Goal = serde_json::from_str(r#"{"id":"1","name":"Q1"}"#).unwrap();
        assert_eq!(goal.status, Status::Active);
        assert!(goal.parent_goal_id.is_none());
        assert!(!goal.closed);
        assert!(goal.progress.is_none());
    }
}

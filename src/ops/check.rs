use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::model::{NodeKind, Snapshot, Treeable};
use crate::ops::tree::find_cycles;

/// Structured result from `gt check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// Data the tree builder has to repair to render anything.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// Two entries of the same kind share an id; only the first is shown
    #[serde(rename = "duplicate_id")]
    DuplicateId { kind: NodeKind, id: String, count: usize },
    /// A goal names itself as parent
    #[serde(rename = "self_parent")]
    SelfParent { goal_id: String },
    /// Goals whose parent links form a loop
    #[serde(rename = "cycle")]
    Cycle { goal_ids: Vec<String> },
}

/// Suspicious but harmless data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// Parent goal id doesn't resolve; the goal shows as a root
    #[serde(rename = "dangling_parent")]
    DanglingParent { goal_id: String, parent_id: String },
    /// Project's goal id doesn't resolve; the project shows as a root
    #[serde(rename = "dangling_goal")]
    DanglingGoal { project_id: String, goal_id: String },
    /// Progress outside 0–100
    #[serde(rename = "progress_out_of_range")]
    ProgressOutOfRange {
        kind: NodeKind,
        id: String,
        progress: f64,
    },
}

// ---------------------------------------------------------------------------
// Main check entry point
// ---------------------------------------------------------------------------

/// Validate a snapshot and return structured results.
///
/// Read-only. Checks run against the raw data, before any filtering:
/// 1. No duplicate goal or project ids
/// 2. No goal is its own parent
/// 3. No cycles among parent links
/// 4. Warnings for dangling references and out-of-range progress
pub fn check_snapshot(snapshot: &Snapshot) -> CheckResult {
    let mut result = CheckResult::default();

    check_duplicates(
        NodeKind::Goal,
        snapshot.goals.iter().map(|g| g.id.as_str()),
        &mut result,
    );
    check_duplicates(
        NodeKind::Project,
        snapshot.projects.iter().map(|p| p.id.as_str()),
        &mut result,
    );

    let goal_ids: HashSet<&str> = snapshot.goals.iter().map(|g| g.id.as_str()).collect();
    let mut parent_of: HashMap<&str, &str> = HashMap::new();

    for goal in &snapshot.goals {
        let Some(parent) = goal.parent_goal_id.as_deref() else {
            continue;
        };
        if parent == goal.id {
            result.errors.push(CheckError::SelfParent {
                goal_id: goal.id.clone(),
            });
        } else if !goal_ids.contains(parent) {
            result.warnings.push(CheckWarning::DanglingParent {
                goal_id: goal.id.clone(),
                parent_id: parent.to_string(),
            });
        } else {
            parent_of.entry(goal.id.as_str()).or_insert(parent);
        }
    }

    let mut sorted_ids: Vec<&str> = goal_ids.iter().copied().collect();
    sorted_ids.sort_unstable();
    for cycle in find_cycles(sorted_ids, &parent_of) {
        result.errors.push(CheckError::Cycle {
            goal_ids: cycle.into_iter().map(str::to_string).collect(),
        });
    }

    for project in &snapshot.projects {
        if let Some(goal_id) = project.goal_id.as_deref()
            && !goal_ids.contains(goal_id)
        {
            result.warnings.push(CheckWarning::DanglingGoal {
                project_id: project.id.clone(),
                goal_id: goal_id.to_string(),
            });
        }
    }

    let entities = snapshot
        .goals
        .iter()
        .map(|g| g as &dyn Treeable)
        .chain(snapshot.projects.iter().map(|p| p as &dyn Treeable));
    for entity in entities {
        if let Some(progress) = entity.progress()
            && !(0.0..=100.0).contains(&progress)
        {
            result.warnings.push(CheckWarning::ProgressOutOfRange {
                kind: entity.kind(),
                id: entity.id().to_string(),
                progress,
            });
        }
    }

    result.valid = result.errors.is_empty();
    result
}

fn check_duplicates<'a>(
    kind: NodeKind,
    ids: impl Iterator<Item = &'a str>,
    result: &mut CheckResult,
) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for id in ids {
        *counts.entry(id).or_default() += 1;
    }
    for (id, count) in counts {
        if count > 1 {
            result.errors.push(CheckError::DuplicateId {
                kind,
                id: id.to_string(),
                count,
            });
        }
    }
}

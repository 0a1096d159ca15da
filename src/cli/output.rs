use serde::Serialize;

use crate::context::{Row, TreeContext};
use crate::io::state::ViewPrefs;
use crate::model::{Density, NodeKind, Status, TreeOptions, Treeable};
use crate::ops::check::{CheckError, CheckResult, CheckWarning};
use crate::ops::tree::{Rollup, TreeNode};
use crate::util::unicode::truncate_to_width;

/// Names longer than this many cells are truncated in text output
pub const NAME_WIDTH: usize = 48;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TreeJson<'a> {
    pub options: &'a TreeOptions,
    pub totals: Rollup,
    pub roots: Vec<NodeJson>,
}

#[derive(Serialize)]
pub struct NodeJson {
    pub kind: NodeKind,
    pub id: String,
    pub name: String,
    pub status: Status,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub closed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    pub depth: usize,
    pub expanded: bool,
    pub rollup: Rollup,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeJson>,
}

#[derive(Serialize)]
pub struct ViewJson {
    pub sort_column: String,
    pub sort_direction: String,
    pub show_active: bool,
    pub show_paused: bool,
    pub show_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    pub density: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn tree_to_json(ctx: &TreeContext) -> TreeJson<'_> {
    TreeJson {
        options: ctx.options(),
        totals: ctx.tree().totals(),
        roots: ctx
            .tree()
            .roots
            .iter()
            .map(|n| node_to_json(ctx, n))
            .collect(),
    }
}

/// The full subtree, regardless of collapsed state; `expanded` reports it
pub fn node_to_json(ctx: &TreeContext, node: &TreeNode) -> NodeJson {
    let entity = &node.entity;
    NodeJson {
        kind: entity.kind(),
        id: entity.id().to_string(),
        name: entity.name().to_string(),
        status: entity.status(),
        closed: entity.is_closed(),
        archived: entity.is_archived(),
        timeframe: entity.timeframe().map(|tf| tf.to_string()),
        progress: entity.progress(),
        depth: node.depth,
        expanded: node.has_children()
            && ctx.expandable().is_expanded(&node.node_id(), node.depth),
        rollup: node.rollup,
        children: node.children.iter().map(|c| node_to_json(ctx, c)).collect(),
    }
}

pub fn view_to_json(prefs: &ViewPrefs) -> ViewJson {
    ViewJson {
        sort_column: prefs.sort_column.to_string(),
        sort_direction: prefs.sort_direction.to_string(),
        show_active: prefs.show_active,
        show_paused: prefs.show_paused,
        show_completed: prefs.show_completed,
        timeframe: prefs.timeframe.map(|tf| tf.to_string()),
        density: prefs.density.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Status shown in brackets. Closed and archived replace the status so the
/// reader sees them even though the status filter let them through.
fn status_label(entity: &dyn Treeable) -> &'static str {
    if entity.is_archived() {
        "archived"
    } else if entity.is_closed() {
        "closed"
    } else {
        entity.status().as_str()
    }
}

fn rollup_label(rollup: &Rollup) -> String {
    format!(
        "{}g {}p {}\u{2713}",
        rollup.total_goals, rollup.total_projects, rollup.completed
    )
}

/// Format one row: indent, expand marker, name, id, status, then the
/// optional timeframe, progress and (for goals) rollup columns.
pub fn format_row(row: &Row<'_>, density: Density) -> String {
    let entity = &row.node.entity;
    let marker = match (row.has_children, row.is_expanded) {
        (false, _) => "  ",
        (true, true) => "- ",
        (true, false) => "+ ",
    };
    let mut line = format!(
        "{}{}{}  {}  [{}]",
        "  ".repeat(row.depth),
        marker,
        truncate_to_width(entity.name(), NAME_WIDTH),
        row.node.node_id(),
        status_label(entity),
    );
    if let Some(tf) = entity.timeframe() {
        line.push_str(&format!("  {}", tf.label()));
    }
    if let Some(progress) = entity.progress() {
        line.push_str(&format!("  {:.0}%", progress));
    }
    if density == Density::Default && entity.kind() == NodeKind::Goal {
        line.push_str(&format!("  {}", rollup_label(&row.node.rollup)));
    }
    line
}

/// Format the visible rows of a tree, one line each
pub fn format_tree(rows: &[Row<'_>], density: Density) -> Vec<String> {
    rows.iter().map(|r| format_row(r, density)).collect()
}

pub fn format_view(prefs: &ViewPrefs) -> Vec<String> {
    vec![
        format!("sort: {} {}", prefs.sort_column, prefs.sort_direction),
        format!(
            "show: active={} paused={} completed={}",
            prefs.show_active, prefs.show_paused, prefs.show_completed
        ),
        format!(
            "timeframe: {}",
            prefs
                .timeframe
                .map(|tf| tf.to_string())
                .unwrap_or_else(|| "none".to_string())
        ),
        format!("density: {}", prefs.density),
    ]
}

pub fn format_check(result: &CheckResult) -> Vec<String> {
    let mut lines = Vec::new();
    if !result.errors.is_empty() {
        lines.push("Errors:".to_string());
        for err in &result.errors {
            lines.push(match err {
                CheckError::DuplicateId { kind, id, count } => {
                    format!("  {}:{} appears {} times", kind.as_str(), id, count)
                }
                CheckError::SelfParent { goal_id } => {
                    format!("  goal:{} is its own parent", goal_id)
                }
                CheckError::Cycle { goal_ids } => {
                    format!("  parent cycle: {}", goal_ids.join(" -> "))
                }
            });
        }
    }
    if !result.warnings.is_empty() {
        if !result.errors.is_empty() {
            lines.push(String::new());
        }
        lines.push("Warnings:".to_string());
        for warn in &result.warnings {
            lines.push(match warn {
                CheckWarning::DanglingParent { goal_id, parent_id } => {
                    format!("  goal:{} has missing parent {}", goal_id, parent_id)
                }
                CheckWarning::DanglingGoal {
                    project_id,
                    goal_id,
                } => {
                    format!("  project:{} has missing goal {}", project_id, goal_id)
                }
                CheckWarning::ProgressOutOfRange { kind, id, progress } => {
                    format!(
                        "  {}:{} has progress {} outside 0-100",
                        kind.as_str(),
                        id,
                        progress
                    )
                }
            });
        }
    }
    if result.errors.is_empty() && result.warnings.is_empty() {
        lines.push("No issues found.".to_string());
    }
    lines
}

/// Parse a toggle value: true/false, yes/no, or on/off
pub fn parse_flag(s: &str) -> Result<bool, String> {
    match s {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        _ => Err(format!("expected true or false, got '{}'", s)),
    }
}

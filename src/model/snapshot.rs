use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::config::WorkspaceConfig;
use super::goal::Goal;
use super::project::Project;

/// One consistent set of goals and projects, as handed over by the loader.
/// Treated as authoritative; never reconciled with earlier snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// A fully loaded goaltree workspace
#[derive(Debug)]
pub struct Workspace {
    /// Root directory of the workspace (parent of `goaltree/`)
    pub root: PathBuf,
    /// Path to the `goaltree/` directory
    pub dir: PathBuf,
    /// Parsed workspace.toml
    pub config: WorkspaceConfig,
    /// Parsed snapshot.json
    pub snapshot: Snapshot,
}

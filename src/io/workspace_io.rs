use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::model::config::WorkspaceConfig;
use crate::model::snapshot::{Snapshot, Workspace};

/// Name of the directory that marks a workspace root
pub const WORKSPACE_DIR: &str = "goaltree";
pub const CONFIG_FILE: &str = "workspace.toml";
pub const SNAPSHOT_FILE: &str = "snapshot.json";
/// Preference store file, inside the workspace directory
pub const PREFS_FILE: &str = ".prefs.json";

/// Error type for workspace I/O operations
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("not a goaltree workspace: no goaltree/ directory found")]
    NotAWorkspace,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse workspace.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not parse snapshot: {0}")]
    SnapshotParseError(#[from] serde_json::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Discover the workspace by walking up from the given directory,
/// looking for a `goaltree/` subdirectory with a config file.
pub fn discover_workspace(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        let dir = current.join(WORKSPACE_DIR);
        if dir.is_dir() && dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotAWorkspace);
        }
    }
}

/// Load config and snapshot from the given root directory.
///
/// A missing snapshot file loads as an empty snapshot.
pub fn load_workspace(root: &Path) -> Result<Workspace, WorkspaceError> {
    let dir = root.join(WORKSPACE_DIR);
    if !dir.is_dir() {
        return Err(WorkspaceError::NotAWorkspace);
    }

    let config = read_config(&dir)?;

    let snapshot_path = dir.join(SNAPSHOT_FILE);
    let snapshot = if snapshot_path.exists() {
        read_snapshot(&snapshot_path)?
    } else {
        debug!(path = %snapshot_path.display(), "no snapshot file; starting empty");
        Snapshot::default()
    };

    Ok(Workspace {
        root: root.to_path_buf(),
        dir,
        config,
        snapshot,
    })
}

pub fn read_config(dir: &Path) -> Result<WorkspaceConfig, WorkspaceError> {
    let path = dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&path).map_err(|e| WorkspaceError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Read a snapshot file written by the data loader
pub fn read_snapshot(path: &Path) -> Result<Snapshot, WorkspaceError> {
    let text = fs::read_to_string(path).map_err(|e| WorkspaceError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let snapshot: Snapshot = serde_json::from_str(&text)?;
    debug!(
        goals = snapshot.goals.len(),
        projects = snapshot.projects.len(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

/// Replace the workspace snapshot with `snapshot`
pub fn write_snapshot(dir: &Path, snapshot: &Snapshot) -> Result<(), WorkspaceError> {
    let content = serde_json::to_string_pretty(snapshot)?;
    crate::io::atomic_write(&dir.join(SNAPSHOT_FILE), content.as_bytes())?;
    Ok(())
}

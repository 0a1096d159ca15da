use std::fs;
use std::path::Path;

use tracing::info;

use crate::cli::commands::InitArgs;
use crate::io::workspace_io::{self, CONFIG_FILE, SNAPSHOT_FILE, WORKSPACE_DIR};
use crate::model::Snapshot;

const WORKSPACE_TOML_TEMPLATE: &str = r##"[workspace]
name = "{name}"

# --- View defaults ---
# Stored preferences (gt view set ...) override these.

[view]
sort_column = "name"        # name, progress, timeframe, status
sort_direction = "asc"      # asc, desc
show_active = true
show_paused = false
show_completed = false
timeframe = "current-year"  # current-year, current-quarter, all
density = "default"         # default, compact

# --- Expand defaults ---
# Nodes at depth <= default_depth start expanded until toggled.

[expand]
default_depth = 1
"##;

/// Turn a directory name like `acme-roadmap` into `Acme Roadmap`
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_workspace_toml(name: &str) -> String {
    // Names go inside a basic TOML string
    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    WORKSPACE_TOML_TEMPLATE.replace("{name}", &escaped)
}

pub fn cmd_init(args: InitArgs, cwd: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let dir = cwd.join(WORKSPACE_DIR);

    if dir.join(CONFIG_FILE).exists() && !args.force {
        return Err(format!(
            "workspace already exists in ./{}/ (use --force to reinitialize)",
            WORKSPACE_DIR
        )
        .into());
    }

    if let Some(parent) = cwd.parent()
        && let Ok(parent_root) = workspace_io::discover_workspace(parent)
    {
        eprintln!(
            "Note: parent workspace found at {}/",
            parent_root.join(WORKSPACE_DIR).display()
        );
        eprintln!("Creating new workspace in ./{}/", WORKSPACE_DIR);
    }

    let name = args.name.unwrap_or_else(|| {
        cwd.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Untitled".to_string())
    });

    fs::create_dir_all(&dir)?;
    crate::io::atomic_write(
        &dir.join(CONFIG_FILE),
        render_workspace_toml(&name).as_bytes(),
    )?;
    // Keep an existing snapshot on --force; only the config is rewritten
    if !dir.join(SNAPSHOT_FILE).exists() {
        workspace_io::write_snapshot(&dir, &Snapshot::default())?;
    }
    info!(name = %name, dir = %dir.display(), "initialized workspace");

    println!("Initialized workspace \"{}\" in ./{}/", name, WORKSPACE_DIR);
    Ok(())
}

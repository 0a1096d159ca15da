use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gt",
    about = concat!(
        "goaltree v",
        env!("CARGO_PKG_VERSION"),
        " - goals, sub-goals and projects as a tree"
    ),
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "workspace-dir", global = true)]
    pub workspace_dir: Option<String>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new workspace in the current directory
    Init(InitArgs),
    /// Print the goal/project tree
    Tree(TreeArgs),
    /// Expand a node
    Expand(NodeArg),
    /// Collapse a node
    Collapse(NodeArg),
    /// Toggle a node between expanded and collapsed
    Toggle(NodeArg),
    /// Expand every node in the current tree
    ExpandAll,
    /// Collapse every node in the current tree
    CollapseAll,
    /// Show or change stored view preferences
    View(ViewCmd),
    /// Report dangling references, self-parents, cycles and duplicate ids
    Check,
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Workspace name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Reinitialize even if goaltree/ already exists
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Tree args
// ---------------------------------------------------------------------------

/// Per-invocation overrides. Nothing here is persisted.
#[derive(Args, Default)]
pub struct TreeArgs {
    /// Only goals and projects in this space
    #[arg(long)]
    pub space: Option<String>,
    /// Only goals and projects championed by this person
    #[arg(long)]
    pub champion: Option<String>,
    /// Only goals and projects reviewed by this person
    #[arg(long)]
    pub reviewer: Option<String>,
    /// Only the subtree rooted at this goal id
    #[arg(long)]
    pub goal: Option<String>,
    /// Sort column (name, progress, timeframe, status)
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort descending
    #[arg(long, conflicts_with = "asc")]
    pub desc: bool,
    /// Sort ascending
    #[arg(long)]
    pub asc: bool,
    /// Hide active goals and projects
    #[arg(long)]
    pub hide_active: bool,
    /// Hide paused goals and projects
    #[arg(long)]
    pub hide_paused: bool,
    /// Hide completed goals and projects
    #[arg(long)]
    pub hide_completed: bool,
    /// Only entries overlapping this timeframe (2025, 2025-H1, 2025-Q1, 2025-03, a..b, or all)
    #[arg(long)]
    pub timeframe: Option<String>,
    /// Show every node, ignoring collapsed state
    #[arg(long)]
    pub all: bool,
}

// ---------------------------------------------------------------------------
// Expand/collapse args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct NodeArg {
    /// Node reference: goal:<id>, project:<id>, or a bare goal id
    pub node: String,
}

// ---------------------------------------------------------------------------
// View preferences
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ViewCmd {
    #[command(subcommand)]
    pub action: ViewAction,
}

#[derive(Subcommand)]
pub enum ViewAction {
    /// Show the effective view preferences
    Show,
    /// Change stored view preferences
    Set(ViewSetArgs),
    /// Forget stored preferences and return to workspace.toml defaults
    Reset,
}

#[derive(Args)]
pub struct ViewSetArgs {
    /// Sort column (name, progress, timeframe, status)
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort direction (asc, desc)
    #[arg(long)]
    pub dir: Option<String>,
    /// Show active entries (true/false)
    #[arg(long)]
    pub active: Option<String>,
    /// Show paused entries (true/false)
    #[arg(long)]
    pub paused: Option<String>,
    /// Show completed entries (true/false)
    #[arg(long)]
    pub completed: Option<String>,
    /// Timeframe filter, or "all" to clear it
    #[arg(long)]
    pub timeframe: Option<String>,
    /// Row density (default, compact)
    #[arg(long)]
    pub density: Option<String>,
}

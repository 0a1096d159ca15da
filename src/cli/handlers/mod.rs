mod init;

pub use init::cmd_init;

use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::context::TreeContext;
use crate::io::prefs::JsonFileStore;
use crate::io::state::{self, ViewPrefs};
use crate::io::workspace_io::{self, PREFS_FILE, WorkspaceError};
use crate::model::{NodeId, SortDirection, Timeframe, TreeOptions, Workspace};
use crate::ops::check;
use crate::ops::expand::ExpandPolicy;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let start = start_dir(cli.workspace_dir.as_deref())?;

    match cli.command {
        Commands::Init(args) => cmd_init(args, &start),
        Commands::Tree(args) => cmd_tree(&start, &args, json),
        Commands::Expand(arg) => cmd_set_expanded(&start, &arg.node, Some(true), json),
        Commands::Collapse(arg) => cmd_set_expanded(&start, &arg.node, Some(false), json),
        Commands::Toggle(arg) => cmd_set_expanded(&start, &arg.node, None, json),
        Commands::ExpandAll => cmd_expand_all(&start, true),
        Commands::CollapseAll => cmd_expand_all(&start, false),
        Commands::View(cmd) => match cmd.action {
            ViewAction::Show => cmd_view_show(&start, json),
            ViewAction::Set(args) => cmd_view_set(&start, &args, json),
            ViewAction::Reset => cmd_view_reset(&start, json),
        },
        Commands::Check => cmd_check(&start, json),
    }
}

/// Directory to start workspace discovery from: `-C` if given, else the cwd
fn start_dir(override_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match override_dir {
        Some(dir) => Ok(std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?),
        None => Ok(std::env::current_dir()?),
    }
}

// ---------------------------------------------------------------------------
// Session helpers
// ---------------------------------------------------------------------------

/// A loaded workspace together with its preference store
struct Session {
    workspace: Workspace,
    store: JsonFileStore,
}

impl Session {
    fn open(start: &Path) -> Result<Self, WorkspaceError> {
        let root = workspace_io::discover_workspace(start)?;
        let workspace = workspace_io::load_workspace(&root)?;
        let store = JsonFileStore::open(&workspace.dir.join(PREFS_FILE));
        Ok(Session { workspace, store })
    }

    /// Stored view preferences; the config's default timeframe is
    /// resolved against the local date
    fn view_prefs(&self) -> ViewPrefs {
        let today = chrono::Local::now().date_naive();
        ViewPrefs::load(&self.store, &self.workspace.config.view, today)
    }

    /// Options as the stored view preferences leave them
    fn stored_options(&self) -> TreeOptions {
        let mut options = TreeOptions::default();
        self.view_prefs().apply(&mut options);
        options
    }

    fn policy(&self) -> ExpandPolicy {
        ExpandPolicy {
            default_depth: self.workspace.config.expand.default_depth,
        }
    }

    /// Build a context over the snapshot. The snapshot moves into the
    /// context; the session keeps the config and store.
    fn context(&mut self, options: TreeOptions) -> TreeContext {
        let expandable = state::load_expand_state(&self.store, self.policy());
        let snapshot = std::mem::take(&mut self.workspace.snapshot);
        TreeContext::with_state(snapshot, options, expandable)
    }
}

/// Layer per-invocation `tree` flags over the stored options
fn apply_tree_args(options: &mut TreeOptions, args: &TreeArgs) -> Result<(), String> {
    if let Some(space) = &args.space {
        options.space_id = Some(space.clone());
    }
    if let Some(person) = &args.champion {
        options.person_id = Some(person.clone());
    }
    if let Some(reviewer) = &args.reviewer {
        options.reviewer_id = Some(reviewer.clone());
    }
    if let Some(goal) = &args.goal {
        options.goal_id = Some(goal.clone());
    }
    if let Some(col) = &args.sort {
        options.sort_column = col.parse()?;
    }
    if args.desc {
        options.sort_direction = SortDirection::Desc;
    } else if args.asc {
        options.sort_direction = SortDirection::Asc;
    }
    if args.hide_active {
        options.show_active = false;
    }
    if args.hide_paused {
        options.show_paused = false;
    }
    if args.hide_completed {
        options.show_completed = false;
    }
    if let Some(tf) = &args.timeframe {
        options.timeframe = parse_timeframe_arg(tf)?;
    }
    Ok(())
}

/// `none` or `all` lifts the timeframe filter
fn parse_timeframe_arg(arg: &str) -> Result<Option<Timeframe>, String> {
    match arg {
        "none" | "all" => Ok(None),
        other => other.parse().map(Some),
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

fn cmd_tree(start: &Path, args: &TreeArgs, json: bool) -> CmdResult {
    let mut session = Session::open(start)?;
    let density = session.view_prefs().density;
    let mut options = session.stored_options();
    apply_tree_args(&mut options, args)?;
    let mut ctx = session.context(options);

    if json {
        println!("{}", serde_json::to_string_pretty(&tree_to_json(&ctx))?);
        return Ok(());
    }

    if ctx.tree().is_empty() {
        println!("No goals or projects to show.");
        return Ok(());
    }
    // --all only affects this rendering; nothing is saved
    if args.all {
        ctx.expand_all();
    }
    for line in format_tree(&ctx.visible_rows(), density) {
        println!("{}", line);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Expand / collapse
// ---------------------------------------------------------------------------

/// `Some(state)` sets the node explicitly; `None` toggles it
fn cmd_set_expanded(start: &Path, node: &str, expanded: Option<bool>, json: bool) -> CmdResult {
    let id: NodeId = node.parse()?;
    let mut session = Session::open(start)?;
    let options = session.stored_options();
    let mut ctx = session.context(options);

    let now = match expanded {
        Some(value) => ctx.set_expanded(&id, value).then_some(value),
        None => ctx.toggle(&id),
    };
    let Some(now) = now else {
        return Err(format!("{} is not in the current tree", id).into());
    };
    state::save_expand_state(&mut session.store, ctx.expandable())?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "node": id.to_string(), "expanded": now })
        );
    } else {
        println!("{} {}", id, if now { "expanded" } else { "collapsed" });
    }
    Ok(())
}

fn cmd_expand_all(start: &Path, expand: bool) -> CmdResult {
    let mut session = Session::open(start)?;
    let options = session.stored_options();
    let mut ctx = session.context(options);
    if expand {
        ctx.expand_all();
    } else {
        ctx.collapse_all();
    }
    state::save_expand_state(&mut session.store, ctx.expandable())?;
    println!(
        "{} {} nodes",
        if expand { "Expanded" } else { "Collapsed" },
        ctx.tree().iter().filter(|n| n.has_children()).count()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// View preferences
// ---------------------------------------------------------------------------

fn print_view(prefs: &ViewPrefs, json: bool) -> CmdResult {
    if json {
        println!("{}", serde_json::to_string_pretty(&view_to_json(prefs))?);
    } else {
        for line in format_view(prefs) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_view_show(start: &Path, json: bool) -> CmdResult {
    let session = Session::open(start)?;
    print_view(&session.view_prefs(), json)
}

fn cmd_view_set(start: &Path, args: &ViewSetArgs, json: bool) -> CmdResult {
    let mut session = Session::open(start)?;
    let mut prefs = session.view_prefs();

    if let Some(col) = &args.sort {
        prefs.sort_column = col.parse()?;
    }
    if let Some(dir) = &args.dir {
        prefs.sort_direction = dir.parse()?;
    }
    if let Some(v) = &args.active {
        prefs.show_active = parse_flag(v)?;
    }
    if let Some(v) = &args.paused {
        prefs.show_paused = parse_flag(v)?;
    }
    if let Some(v) = &args.completed {
        prefs.show_completed = parse_flag(v)?;
    }
    if let Some(tf) = &args.timeframe {
        prefs.timeframe = parse_timeframe_arg(tf)?;
    }
    if let Some(density) = &args.density {
        prefs.density = density.parse()?;
    }

    prefs.save(&mut session.store)?;
    print_view(&prefs, json)
}

fn cmd_view_reset(start: &Path, json: bool) -> CmdResult {
    let mut session = Session::open(start)?;
    ViewPrefs::clear(&mut session.store)?;
    print_view(&session.view_prefs(), json)
}

// ---------------------------------------------------------------------------
// Check
// ---------------------------------------------------------------------------

fn cmd_check(start: &Path, json: bool) -> CmdResult {
    let session = Session::open(start)?;
    let result = check::check_snapshot(&session.workspace.snapshot);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for line in format_check(&result) {
            println!("{}", line);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Snapshot, SortColumn};

    #[test]
    fn tree_args_layer_over_stored_options() {
        let mut options =
            TreeOptions::default().with_sort(SortColumn::Progress, SortDirection::Desc);
        let args = TreeArgs {
            champion: Some("ana".into()),
            asc: true,
            hide_completed: true,
            timeframe: Some("2025-Q2".into()),
            ..TreeArgs::default()
        };
        apply_tree_args(&mut options, &args).unwrap();
        assert_eq!(options.person_id.as_deref(), Some("ana"));
        assert_eq!(options.sort_column, SortColumn::Progress);
        assert_eq!(options.sort_direction, SortDirection::Asc);
        assert!(options.show_active);
        assert!(!options.show_completed);
        assert_eq!(options.timeframe, Timeframe::quarter(2025, 2));
    }

    #[test]
    fn bad_tree_args_are_rejected() {
        let mut options = TreeOptions::default();
        let args = TreeArgs {
            sort: Some("colour".into()),
            ..TreeArgs::default()
        };
        assert!(apply_tree_args(&mut options, &args).is_err());

        let args = TreeArgs {
            timeframe: Some("someday".into()),
            ..TreeArgs::default()
        };
        assert!(apply_tree_args(&mut options, &args).is_err());
    }

    #[test]
    fn all_lifts_a_stored_timeframe() {
        let mut options = TreeOptions::default().with_timeframe(Timeframe::year(2026).unwrap());
        let args = TreeArgs {
            timeframe: Some("all".into()),
            ..TreeArgs::default()
        };
        apply_tree_args(&mut options, &args).unwrap();
        assert!(options.timeframe.is_none());
        assert_eq!(parse_timeframe_arg("none"), Ok(None));
        assert_eq!(parse_timeframe_arg("2026"), Ok(Timeframe::year(2026)));
    }

    #[test]
    fn empty_snapshot_context_is_empty() {
        let ctx = TreeContext::new(
            Snapshot::default(),
            TreeOptions::default(),
            ExpandPolicy::default(),
        );
        assert!(ctx.tree().is_empty());
    }
}

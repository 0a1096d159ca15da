//! The tree provider: owns the inputs, keeps the built tree current, and
//! answers expand/collapse queries against it.

use tracing::debug;

use crate::model::{NodeId, Snapshot, SortColumn, SortDirection, Timeframe, TreeOptions};
use crate::ops::expand::{ExpandPolicy, ExpandableState};
use crate::ops::tree::{Tree, TreeNode, build_tree};

/// One visible line of a rendered tree
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub node: &'a TreeNode,
    pub depth: usize,
    pub has_children: bool,
    pub is_expanded: bool,
}

/// Holds `(snapshot, options)`, the tree built from them, and the
/// expandable state. Setters rebuild only when an input actually changed.
#[derive(Debug)]
pub struct TreeContext {
    snapshot: Snapshot,
    options: TreeOptions,
    tree: Tree,
    expandable: ExpandableState,
}

impl TreeContext {
    pub fn new(snapshot: Snapshot, options: TreeOptions, policy: ExpandPolicy) -> Self {
        TreeContext::with_state(snapshot, options, ExpandableState::new(policy))
    }

    /// Start from previously persisted expand state
    pub fn with_state(
        snapshot: Snapshot,
        options: TreeOptions,
        expandable: ExpandableState,
    ) -> Self {
        let tree = build_tree(&snapshot.goals, &snapshot.projects, &options);
        TreeContext {
            snapshot,
            options,
            tree,
            expandable,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn expandable(&self) -> &ExpandableState {
        &self.expandable
    }

    pub fn into_expandable(self) -> ExpandableState {
        self.expandable
    }

    fn rebuild(&mut self) {
        debug!("rebuilding tree");
        self.tree = build_tree(&self.snapshot.goals, &self.snapshot.projects, &self.options);
    }

    /// Replace all options. Returns whether the tree was rebuilt.
    pub fn set_options(&mut self, options: TreeOptions) -> bool {
        if options == self.options {
            return false;
        }
        self.options = options;
        self.rebuild();
        true
    }

    /// Replace the data. Returns whether the tree was rebuilt.
    pub fn replace_snapshot(&mut self, snapshot: Snapshot) -> bool {
        if snapshot == self.snapshot {
            return false;
        }
        self.snapshot = snapshot;
        self.rebuild();
        true
    }

    pub fn set_sort(&mut self, column: SortColumn, direction: SortDirection) -> bool {
        let options = self.options.clone().with_sort(column, direction);
        self.set_options(options)
    }

    pub fn set_status_filter(&mut self, active: bool, paused: bool, completed: bool) -> bool {
        let options = self.options.clone().with_statuses(active, paused, completed);
        self.set_options(options)
    }

    pub fn set_timeframe(&mut self, timeframe: Option<Timeframe>) -> bool {
        let mut options = self.options.clone();
        options.timeframe = timeframe;
        self.set_options(options)
    }

    /// Set the space/champion/reviewer/subtree scope in one go
    pub fn set_scope(
        &mut self,
        space_id: Option<String>,
        person_id: Option<String>,
        reviewer_id: Option<String>,
        goal_id: Option<String>,
    ) -> bool {
        let options = TreeOptions {
            space_id,
            person_id,
            reviewer_id,
            goal_id,
            ..self.options.clone()
        };
        self.set_options(options)
    }

    /// Expanded state of a node in the current tree. Nodes not in the tree
    /// are reported collapsed.
    pub fn is_expanded(&self, id: &NodeId) -> bool {
        self.tree
            .depth_of(id)
            .is_some_and(|depth| self.expandable.is_expanded(id, depth))
    }

    /// Toggle a node of the current tree. Returns the new state, or `None`
    /// if the node isn't shown.
    pub fn toggle(&mut self, id: &NodeId) -> Option<bool> {
        let depth = self.tree.depth_of(id)?;
        Some(self.expandable.toggle(id, depth))
    }

    /// Set a node's state explicitly. Returns false if the node isn't shown.
    pub fn set_expanded(&mut self, id: &NodeId, expanded: bool) -> bool {
        if self.tree.find(id).is_none() {
            return false;
        }
        self.expandable.set(id, expanded);
        true
    }

    pub fn expand_all(&mut self) {
        self.expandable.expand_all(&self.tree);
    }

    pub fn collapse_all(&mut self) {
        self.expandable.collapse_all(&self.tree);
    }

    /// Pre-order rows, skipping the descendants of collapsed nodes
    pub fn visible_rows(&self) -> Vec<Row<'_>> {
        let mut rows = Vec::new();
        for root in &self.tree.roots {
            self.push_rows(root, &mut rows);
        }
        rows
    }

    fn push_rows<'a>(&'a self, node: &'a TreeNode, rows: &mut Vec<Row<'a>>) {
        let is_expanded =
            node.has_children() && self.expandable.is_expanded(&node.node_id(), node.depth);
        rows.push(Row {
            node,
            depth: node.depth,
            has_children: node.has_children(),
            is_expanded,
        });
        if is_expanded {
            for child in &node.children {
                self.push_rows(child, rows);
            }
        }
    }
}

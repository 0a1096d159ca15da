//! Goal/project tree construction.
//!
//! [`build_tree`] turns flat goal and project lists into a filtered, sorted
//! forest with rollup counters. The tree reflects *visible* ancestry: when
//! a goal's parent is filtered out, missing, or part of a cycle, the goal is
//! promoted to a root instead of being dropped. Projects whose goal is not
//! visible are promoted the same way.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::Serialize;
use tracing::{debug, trace};

use crate::model::{Entity, Goal, NodeId, NodeKind, Project, TreeOptions, Treeable};
use crate::ops::filter;
use crate::ops::sort::sort_nodes;

/// Aggregate counts over a node and all of its descendants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Rollup {
    pub total_goals: usize,
    pub total_projects: usize,
    pub completed: usize,
}

impl Rollup {
    /// The contribution of a single entity, ignoring its children
    pub fn own(entity: &dyn Treeable) -> Self {
        let (total_goals, total_projects) = match entity.kind() {
            NodeKind::Goal => (1, 0),
            NodeKind::Project => (0, 1),
        };
        Rollup {
            total_goals,
            total_projects,
            completed: usize::from(entity.is_completed()),
        }
    }

    pub fn total(&self) -> usize {
        self.total_goals + self.total_projects
    }
}

impl Add for Rollup {
    type Output = Rollup;

    fn add(self, rhs: Rollup) -> Rollup {
        Rollup {
            total_goals: self.total_goals + rhs.total_goals,
            total_projects: self.total_projects + rhs.total_projects,
            completed: self.completed + rhs.completed,
        }
    }
}

impl AddAssign for Rollup {
    fn add_assign(&mut self, rhs: Rollup) {
        *self = *self + rhs;
    }
}

impl Sum for Rollup {
    fn sum<I: Iterator<Item = Rollup>>(iter: I) -> Rollup {
        iter.fold(Rollup::default(), Add::add)
    }
}

/// One goal or project placed in the tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub entity: Entity,
    /// Child goals first, then attached projects; each group sorted
    pub children: Vec<TreeNode>,
    /// 0 for roots
    pub depth: usize,
    /// Counts for this node plus every descendant
    pub rollup: Rollup,
}

impl TreeNode {
    pub fn node_id(&self) -> NodeId {
        self.entity.node_id()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Pre-order traversal of this node and its descendants
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }
}

/// A built forest and the options it was built with. Never mutated; a
/// changed input produces a new tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tree {
    pub roots: Vec<TreeNode>,
    pub options: TreeOptions,
}

impl Tree {
    pub fn empty(options: TreeOptions) -> Self {
        Tree {
            roots: Vec::new(),
            options,
        }
    }

    /// Pre-order traversal over every node in the forest
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: self.roots.iter().rev().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn find(&self, id: &NodeId) -> Option<&TreeNode> {
        self.iter()
            .find(|n| n.entity.kind() == id.kind && n.entity.id() == id.id)
    }

    pub fn depth_of(&self, id: &NodeId) -> Option<usize> {
        self.find(id).map(|n| n.depth)
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.iter().map(TreeNode::node_id).collect()
    }

    /// Rollup over the whole forest
    pub fn totals(&self) -> Rollup {
        self.roots.iter().map(|n| n.rollup).sum()
    }
}

/// Pre-order iterator over tree nodes
pub struct Iter<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build the goal/project forest for `options`.
///
/// Total over its input: dangling references, self-parents and parent
/// cycles are recovered from, never reported. The result depends only on
/// the entity values, not on the order of `goals` or `projects` (except
/// which of two entries sharing an id is kept: the first).
pub fn build_tree(goals: &[Goal], projects: &[Project], options: &TreeOptions) -> Tree {
    let visible = filter::build_predicate(options);

    // Visible goals by id, first occurrence wins
    let mut goal_index: BTreeMap<&str, &Goal> = BTreeMap::new();
    for goal in goals.iter().filter(|g| visible(*g)) {
        goal_index.entry(goal.id.as_str()).or_insert(goal);
    }

    let mut parent_of = effective_parents(&goal_index);
    for cycle in find_cycles(goal_index.keys().copied(), &parent_of) {
        // Cycle members are sorted, so the first is the smallest id
        debug!(members = ?cycle, root = cycle[0], "breaking parent cycle");
        parent_of.remove(cycle[0]);
    }

    let mut children_of: HashMap<&str, Vec<&Goal>> = HashMap::new();
    let mut root_goals = Vec::new();
    for (&id, &goal) in &goal_index {
        match parent_of.get(id) {
            Some(&parent) => children_of.entry(parent).or_default().push(goal),
            None => root_goals.push(goal),
        }
    }

    let mut seen_projects = HashSet::new();
    let mut projects_of: HashMap<&str, Vec<&Project>> = HashMap::new();
    let mut root_projects = Vec::new();
    for project in projects.iter().filter(|p| visible(*p)) {
        if !seen_projects.insert(project.id.as_str()) {
            continue;
        }
        match project.goal_id.as_deref() {
            Some(goal_id) if goal_index.contains_key(goal_id) => {
                projects_of.entry(goal_id).or_default().push(project)
            }
            Some(goal_id) => {
                debug!(
                    project = %project.id,
                    goal = goal_id,
                    "goal not visible; promoting project to root"
                );
                root_projects.push(project);
            }
            None => root_projects.push(project),
        }
    }

    if let Some(goal_id) = &options.goal_id {
        match goal_index.get(goal_id.as_str()) {
            Some(goal) => {
                root_goals = vec![*goal];
                root_projects.clear();
            }
            None => {
                debug!(goal = %goal_id, "subtree root not visible; tree is empty");
                return Tree::empty(options.clone());
            }
        }
    }

    let mut builder = Builder {
        children_of: &children_of,
        projects_of: &projects_of,
        options,
        placed: HashSet::new(),
    };
    let roots = builder.level(&root_goals, &root_projects, 0);

    trace!(
        goals = goal_index.len(),
        projects = seen_projects.len(),
        roots = roots.len(),
        "built tree"
    );
    Tree {
        roots,
        options: options.clone(),
    }
}

struct Builder<'a, 'o> {
    children_of: &'o HashMap<&'a str, Vec<&'a Goal>>,
    projects_of: &'o HashMap<&'a str, Vec<&'a Project>>,
    options: &'o TreeOptions,
    /// Goals already in the tree; never attached a second time
    placed: HashSet<&'a str>,
}

impl<'a, 'o> Builder<'a, 'o> {
    /// One sibling group: sorted goals followed by sorted projects
    fn level(
        &mut self,
        goals: &[&'a Goal],
        projects: &[&'a Project],
        depth: usize,
    ) -> Vec<TreeNode> {
        let mut goal_nodes = Vec::with_capacity(goals.len());
        for &goal in goals {
            if !self.placed.insert(goal.id.as_str()) {
                debug!(goal = %goal.id, "goal already placed; not descending again");
                continue;
            }
            goal_nodes.push(self.goal_node(goal, depth));
        }
        sort_nodes(&mut goal_nodes, self.options.sort_column, self.options.sort_direction);

        let mut project_nodes: Vec<TreeNode> = projects
            .iter()
            .map(|p| leaf(Entity::Project((*p).clone()), depth))
            .collect();
        sort_nodes(&mut project_nodes, self.options.sort_column, self.options.sort_direction);

        goal_nodes.extend(project_nodes);
        goal_nodes
    }

    fn goal_node(&mut self, goal: &'a Goal, depth: usize) -> TreeNode {
        let child_goals = self
            .children_of
            .get(goal.id.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();
        let child_projects = self
            .projects_of
            .get(goal.id.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();
        let children = self.level(child_goals, child_projects, depth + 1);
        let rollup = Rollup::own(goal) + children.iter().map(|c| c.rollup).sum::<Rollup>();
        TreeNode {
            entity: Entity::Goal(goal.clone()),
            children,
            depth,
            rollup,
        }
    }
}

fn leaf(entity: Entity, depth: usize) -> TreeNode {
    let rollup = Rollup::own(&entity);
    TreeNode {
        entity,
        children: Vec::new(),
        depth,
        rollup,
    }
}

/// Parent links that survive visibility: the declared parent, unless it is
/// the goal itself or not in `index`.
fn effective_parents<'a>(index: &BTreeMap<&'a str, &'a Goal>) -> HashMap<&'a str, &'a str> {
    let mut parent_of = HashMap::new();
    for (&id, &goal) in index {
        let Some(parent) = goal.parent_goal_id.as_deref() else {
            continue;
        };
        if parent == id {
            debug!(goal = id, "goal is its own parent; treating as root");
        } else if !index.contains_key(parent) {
            debug!(goal = id, parent_id = parent, "parent not visible; promoting to root");
        } else {
            parent_of.insert(id, parent);
        }
    }
    parent_of
}

/// Find every cycle in a parent map. Each cycle is returned once, with its
/// members sorted by id; cycles are ordered by their smallest member.
pub(crate) fn find_cycles<'a>(
    ids: impl IntoIterator<Item = &'a str>,
    parent_of: &HashMap<&'a str, &'a str>,
) -> Vec<Vec<&'a str>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        OnPath,
        Done,
    }

    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut cycles = Vec::new();

    for start in ids {
        let mut path = Vec::new();
        let mut current = Some(start);
        while let Some(id) = current {
            match marks.get(id) {
                Some(Mark::Done) => break,
                Some(Mark::OnPath) => {
                    let at = path.iter().position(|p| *p == id).unwrap_or(0);
                    let mut members = path[at..].to_vec();
                    members.sort_unstable();
                    cycles.push(members);
                    break;
                }
                None => {
                    marks.insert(id, Mark::OnPath);
                    path.push(id);
                    current = parent_of.get(id).copied();
                }
            }
        }
        for id in path {
            marks.insert(id, Mark::Done);
        }
    }

    cycles.sort();
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SortColumn, SortDirection, Status};
    use pretty_assertions::assert_eq;

    /// Indented `kind:id` outline of a tree
    fn outline(tree: &Tree) -> Vec<String> {
        tree.iter()
            .map(|n| format!("{}{}", "  ".repeat(n.depth), n.node_id()))
            .collect()
    }

    fn named(id: &str, name: &str) -> Goal {
        Goal::new(id, name)
    }

    fn scenario() -> (Vec<Goal>, Vec<Project>) {
        let goals = vec![
            named("1", "Q1"),
            named("2", "Q1.1")
                .with_parent("1")
                .with_status(Status::Completed),
        ];
        let projects = vec![Project::new("p1", "Launch").with_goal("2")];
        (goals, projects)
    }

    #[test]
    fn nested_goal_and_project_with_rollups() {
        let (goals, projects) = scenario();
        let opts = TreeOptions::default().with_statuses(true, false, true);
        let tree = build_tree(&goals, &projects, &opts);

        assert_eq!(outline(&tree), ["goal:1", "  goal:2", "    project:p1"]);
        let root = &tree.roots[0];
        assert_eq!(
            root.rollup,
            Rollup {
                total_goals: 2,
                total_projects: 1,
                completed: 1
            }
        );
        assert_eq!(
            root.children[0].rollup,
            Rollup {
                total_goals: 1,
                total_projects: 1,
                completed: 1
            }
        );
        assert_eq!(tree.totals(), root.rollup);
    }

    #[test]
    fn hidden_parent_promotes_project_to_root() {
        let (goals, projects) = scenario();
        let opts = TreeOptions::default().with_statuses(true, false, false);
        let tree = build_tree(&goals, &projects, &opts);

        assert_eq!(outline(&tree), ["goal:1", "project:p1"]);
        assert!(!tree.roots[0].has_children());
        assert_eq!(tree.roots[0].rollup.total(), 1);
    }

    #[test]
    fn hidden_parent_promotes_child_goals() {
        let goals = vec![
            named("a", "A").with_status(Status::Paused),
            named("b", "B").with_parent("a"),
            named("c", "C").with_parent("b"),
        ];
        let opts = TreeOptions::default().with_statuses(true, false, true);
        let tree = build_tree(&goals, &[], &opts);
        assert_eq!(outline(&tree), ["goal:b", "  goal:c"]);
    }

    #[test]
    fn dangling_parent_is_root() {
        let goals = vec![named("a", "A").with_parent("missing")];
        let projects = vec![Project::new("p", "P").with_goal("nowhere")];
        let tree = build_tree(&goals, &projects, &TreeOptions::default());
        assert_eq!(outline(&tree), ["goal:a", "project:p"]);
    }

    #[test]
    fn self_parent_is_root() {
        let goals = vec![named("a", "A").with_parent("a"), named("b", "B").with_parent("a")];
        let tree = build_tree(&goals, &[], &TreeOptions::default());
        assert_eq!(outline(&tree), ["goal:a", "  goal:b"]);
    }

    #[test]
    fn two_goal_cycle_is_broken_at_smallest_id() {
        let goals = vec![named("B", "b").with_parent("A"), named("A", "a").with_parent("B")];
        let tree = build_tree(&goals, &[], &TreeOptions::default());
        assert_eq!(outline(&tree), ["goal:A", "  goal:B"]);
    }

    #[test]
    fn cycle_with_tail_keeps_every_goal_once() {
        // x -> y -> z -> x, and t hangs off z
        let goals = vec![
            named("y", "y").with_parent("z"),
            named("t", "t").with_parent("z"),
            named("z", "z").with_parent("x"),
            named("x", "x").with_parent("y"),
        ];
        let tree = build_tree(&goals, &[], &TreeOptions::default());
        assert_eq!(
            outline(&tree),
            ["goal:x", "  goal:z", "    goal:t", "    goal:y"]
        );
        assert_eq!(tree.roots[0].rollup.total_goals, 4);
    }

    #[test]
    fn children_are_goals_then_projects_each_sorted() {
        let goals = vec![
            named("root", "Root"),
            named("g2", "beta").with_parent("root"),
            named("g1", "Alpha").with_parent("root"),
        ];
        let projects = vec![
            Project::new("p2", "aardvark").with_goal("root"),
            Project::new("p1", "Zebra").with_goal("root"),
        ];
        let tree = build_tree(&goals, &projects, &TreeOptions::default());
        assert_eq!(
            outline(&tree),
            ["goal:root", "  goal:g1", "  goal:g2", "  project:p2", "  project:p1"]
        );

        let desc = TreeOptions::default().with_sort(SortColumn::Name, SortDirection::Desc);
        let tree = build_tree(&goals, &projects, &desc);
        assert_eq!(
            outline(&tree),
            ["goal:root", "  goal:g2", "  goal:g1", "  project:p1", "  project:p2"]
        );
    }

    #[test]
    fn sorting_is_local_to_sibling_groups() {
        let goals = vec![
            named("r1", "Zulu"),
            named("r2", "Alpha"),
            named("c1", "Aaa").with_parent("r1"),
        ];
        let tree = build_tree(&goals, &[], &TreeOptions::default());
        assert_eq!(outline(&tree), ["goal:r2", "goal:r1", "  goal:c1"]);
    }

    #[test]
    fn subtree_restriction() {
        let goals = vec![
            named("1", "Top"),
            named("2", "Mid").with_parent("1"),
            named("3", "Leaf").with_parent("2"),
            named("4", "Other"),
        ];
        let projects = vec![
            Project::new("p1", "Under leaf").with_goal("3"),
            Project::new("p2", "Loose"),
        ];
        let tree = build_tree(&goals, &projects, &TreeOptions::default().with_goal("2"));
        assert_eq!(outline(&tree), ["goal:2", "  goal:3", "    project:p1"]);
        assert_eq!(tree.roots[0].depth, 0);
    }

    #[test]
    fn subtree_restriction_on_hidden_goal_is_empty() {
        let goals = vec![named("1", "Top").with_status(Status::Paused)];
        let opts = TreeOptions::default()
            .with_statuses(true, false, true)
            .with_goal("1");
        assert!(build_tree(&goals, &[], &opts).is_empty());
        assert!(build_tree(&goals, &[], &TreeOptions::default().with_goal("nope")).is_empty());
    }

    #[test]
    fn empty_and_fully_filtered_inputs() {
        assert!(build_tree(&[], &[], &TreeOptions::default()).is_empty());
        let goals = vec![named("1", "Top")];
        let opts = TreeOptions::default().with_space("elsewhere");
        let tree = build_tree(&goals, &[], &opts);
        assert!(tree.is_empty());
        assert_eq!(tree.totals(), Rollup::default());
    }

    #[test]
    fn duplicate_ids_are_placed_once() {
        let goals = vec![named("1", "First"), named("1", "Second")];
        let projects = vec![Project::new("p", "One"), Project::new("p", "Two")];
        let tree = build_tree(&goals, &projects, &TreeOptions::default());
        assert_eq!(outline(&tree), ["goal:1", "project:p"]);
        assert_eq!(tree.roots[0].entity.name(), "First");
    }

    #[test]
    fn rebuild_is_identical_and_order_independent() {
        let goals = vec![
            named("1", "Top"),
            named("2", "Mid").with_parent("1"),
            named("3", "mid").with_parent("1"),
            named("4", "Solo"),
        ];
        let projects = vec![
            Project::new("p1", "x").with_goal("2"),
            Project::new("p2", "X").with_goal("2"),
        ];
        let opts = TreeOptions::default();
        let a = build_tree(&goals, &projects, &opts);
        let b = build_tree(&goals, &projects, &opts);
        assert_eq!(a, b);

        let mut rev_goals = goals.clone();
        rev_goals.reverse();
        let mut rev_projects = projects.clone();
        rev_projects.reverse();
        assert_eq!(build_tree(&rev_goals, &rev_projects, &opts), a);
    }

    #[test]
    fn tree_lookup_helpers() {
        let (goals, projects) = scenario();
        let tree = build_tree(&goals, &projects, &TreeOptions::default());
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.depth_of(&NodeId::project("p1")), Some(2));
        assert_eq!(tree.depth_of(&NodeId::goal("p1")), None);
        assert_eq!(
            tree.node_ids(),
            vec![NodeId::goal("1"), NodeId::goal("2"), NodeId::project("p1")]
        );
    }

    #[test]
    fn find_cycles_reports_each_cycle_once() {
        let parent_of: HashMap<&str, &str> =
            [("a", "b"), ("b", "a"), ("c", "d"), ("d", "e"), ("e", "c"), ("f", "c")]
                .into_iter()
                .collect();
        let cycles = find_cycles(["f", "e", "d", "c", "b", "a"], &parent_of);
        assert_eq!(cycles, vec![vec!["a", "b"], vec!["c", "d", "e"]]);
    }
}

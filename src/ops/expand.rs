use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::NodeId;
use crate::ops::tree::Tree;

/// Which nodes start out expanded before the user touches them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandPolicy {
    /// Nodes with `depth <= default_depth` start expanded
    pub default_depth: usize,
}

impl Default for ExpandPolicy {
    fn default() -> Self {
        ExpandPolicy { default_depth: 1 }
    }
}

impl ExpandPolicy {
    pub fn expands(&self, depth: usize) -> bool {
        depth <= self.default_depth
    }
}

/// Expanded/collapsed flags keyed by node identity.
///
/// Independent of any particular tree: entries survive rebuilds, and
/// entries for nodes that are no longer shown are kept but ignored. Nodes
/// without an entry fall back to the policy, evaluated on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandableState {
    #[serde(default)]
    policy: ExpandPolicy,
    #[serde(default)]
    entries: BTreeMap<NodeId, bool>,
}

impl ExpandableState {
    pub fn new(policy: ExpandPolicy) -> Self {
        ExpandableState {
            policy,
            entries: BTreeMap::new(),
        }
    }

    pub fn policy(&self) -> ExpandPolicy {
        self.policy
    }

    /// Replace the policy. Explicit entries are kept.
    pub fn set_policy(&mut self, policy: ExpandPolicy) {
        self.policy = policy;
    }

    pub fn is_expanded(&self, id: &NodeId, depth: usize) -> bool {
        self.entries
            .get(id)
            .copied()
            .unwrap_or_else(|| self.policy.expands(depth))
    }

    /// Flip the node's current state and return the new one
    pub fn toggle(&mut self, id: &NodeId, depth: usize) -> bool {
        let expanded = !self.is_expanded(id, depth);
        self.entries.insert(id.clone(), expanded);
        expanded
    }

    pub fn set(&mut self, id: &NodeId, expanded: bool) {
        self.entries.insert(id.clone(), expanded);
    }

    /// Forget the explicit state of one node, falling back to the policy
    pub fn clear(&mut self, id: &NodeId) {
        self.entries.remove(id);
    }

    pub fn expand_all(&mut self, tree: &Tree) {
        self.set_all(tree, true);
    }

    pub fn collapse_all(&mut self, tree: &Tree) {
        self.set_all(tree, false);
    }

    fn set_all(&mut self, tree: &Tree, expanded: bool) {
        for node in tree.iter() {
            self.entries.insert(node.node_id(), expanded);
        }
    }

    /// Drop every explicit entry
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Number of explicit entries, including ones for nodes no longer shown
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

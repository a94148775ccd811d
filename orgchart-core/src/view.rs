//! Caller-side interaction state layered over an immutable tree.
//!
//! The tree is a pure function of the input records. Everything the user
//! toggles lives here as plain id sets keyed by [`NodeId`], so a rebuild
//! simply replaces the tree while the view state stays equality-comparable
//! and trivially diffable.

use crate::tree::query::{flatten_tree, path_to_root};
use crate::tree::search::search;
use crate::types::{FieldMapping, NodeId, OrgNode};
use std::collections::HashSet;
use tracing::debug;

/// Collapse, highlight and search-cursor state for one rendered chart.
///
/// Never stores nodes, only ids: the state survives a tree rebuild and is
/// re-applied against the fresh tree by the caller.
#[derive(Clone, Debug, Default)]
pub struct ViewState {
    collapsed: HashSet<NodeId>,
    highlighted: HashSet<NodeId>,
    matches: Vec<NodeId>,
    match_ids: HashSet<NodeId>,
    cursor: Option<usize>,
}

impl ViewState {
    pub fn new() -> Self {
        ViewState::default()
    }

    // ── Collapse / expand ──

    /// Initial collapse: every non-leaf at `expand_level` or deeper starts
    /// collapsed. Level 0 leaves the whole tree expanded.
    pub fn collapse_beyond_level(&mut self, tree: &OrgNode, expand_level: u32) {
        self.collapsed.clear();
        if expand_level == 0 {
            return;
        }
        for node in flatten_tree(tree) {
            if node.depth >= expand_level && !node.is_leaf {
                self.collapsed.insert(node.id.clone());
            }
        }
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    /// Collapse every non-leaf node.
    pub fn collapse_all(&mut self, tree: &OrgNode) {
        self.collapsed = flatten_tree(tree)
            .into_iter()
            .filter(|n| !n.is_leaf)
            .map(|n| n.id.clone())
            .collect();
    }

    /// Toggle one node. Returns true when the node is now expanded.
    pub fn toggle(&mut self, id: &NodeId) -> bool {
        if self.collapsed.remove(id) {
            true
        } else {
            self.collapsed.insert(id.clone());
            false
        }
    }

    /// Expand every ancestor of `id` so the node is reachable on screen.
    pub fn focus(&mut self, tree: &OrgNode, id: &NodeId) {
        for ancestor in path_to_root(tree, id) {
            self.collapsed.remove(&ancestor);
        }
    }

    pub fn is_collapsed(&self, id: &NodeId) -> bool {
        self.collapsed.contains(id)
    }

    // ── Path highlighting ──

    /// Highlight the root-to-node path, replacing any previous highlight.
    pub fn highlight_path(&mut self, tree: &OrgNode, id: &NodeId) {
        self.highlighted = path_to_root(tree, id);
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted.clear();
    }

    pub fn is_highlighted(&self, id: &NodeId) -> bool {
        self.highlighted.contains(id)
    }

    /// The highlighted nodes, in display order.
    pub fn highlighted_nodes<'a>(&self, tree: &'a OrgNode) -> Vec<&'a OrgNode> {
        flatten_tree(tree)
            .into_iter()
            .filter(|n| self.highlighted.contains(&n.id))
            .collect()
    }

    // ── Search ──

    /// Run a search and adopt its results: every match's ancestors are
    /// expanded and the cursor moves to the first hit. An empty query (or no
    /// match) clears the previous match state. Returns the match count.
    pub fn apply_search(&mut self, tree: &OrgNode, query: &str, mapping: &FieldMapping) -> usize {
        let results = search(tree, query, mapping);
        let matched: Vec<NodeId> = results.iter().map(|r| r.node.id.clone()).collect();

        for id in &matched {
            self.focus(tree, id);
        }

        self.match_ids = matched.iter().cloned().collect();
        self.cursor = if matched.is_empty() { None } else { Some(0) };
        self.matches = matched;

        debug!("search state: {} matches", self.matches.len());
        self.matches.len()
    }

    /// Advance to the next match, wrapping circularly, and expand its
    /// ancestors. None when no search is active.
    pub fn next_match(&mut self, tree: &OrgNode) -> Option<NodeId> {
        if self.matches.is_empty() {
            return None;
        }
        let next = match self.cursor {
            Some(i) => (i + 1) % self.matches.len(),
            None => 0,
        };
        self.step_to(tree, next)
    }

    /// Step back to the previous match, wrapping circularly.
    pub fn prev_match(&mut self, tree: &OrgNode) -> Option<NodeId> {
        if self.matches.is_empty() {
            return None;
        }
        let len = self.matches.len();
        let prev = match self.cursor {
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        self.step_to(tree, prev)
    }

    fn step_to(&mut self, tree: &OrgNode, index: usize) -> Option<NodeId> {
        self.cursor = Some(index);
        let id = self.matches[index].clone();
        self.focus(tree, &id);
        Some(id)
    }

    pub fn is_match(&self, id: &NodeId) -> bool {
        self.match_ids.contains(id)
    }

    /// Current cursor position and total match count, for a "n/m" readout.
    pub fn match_cursor(&self) -> Option<(usize, usize)> {
        self.cursor.map(|i| (i, self.matches.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build::build_tree;
    use crate::types::Record;
    use serde_json::json;

    fn records(raw: serde_json::Value) -> Vec<Record> {
        serde_json::from_value(raw).unwrap()
    }

    fn mapping() -> FieldMapping {
        FieldMapping {
            name: Some("name".to_string()),
            role_type: Some("role_type".to_string()),
            ..FieldMapping::default()
        }
    }

    /// Three levels: root → (2, 3) → 4 under 2, 5 under 4.
    fn sample_tree() -> OrgNode {
        let data = records(json!([
            {"id": 1, "parent_id": null, "name": "Root"},
            {"id": 2, "parent_id": 1, "name": "Branch"},
            {"id": 3, "parent_id": 1, "name": "Leaf arm"},
            {"id": 4, "parent_id": 2, "name": "Deep branch"},
            {"id": 5, "parent_id": 4, "name": "Deep leaf"},
        ]));
        build_tree(&data, &mapping()).unwrap()
    }

    #[test]
    fn test_collapse_beyond_level() {
        let tree = sample_tree();
        let mut view = ViewState::new();
        view.collapse_beyond_level(&tree, 1);
        // Non-leaves at depth >= 1 collapse: nodes 2 and 4.
        assert!(!view.is_collapsed(&NodeId::Int(1)));
        assert!(view.is_collapsed(&NodeId::Int(2)));
        assert!(!view.is_collapsed(&NodeId::Int(3)));
        assert!(view.is_collapsed(&NodeId::Int(4)));
    }

    #[test]
    fn test_collapse_level_zero_means_fully_expanded() {
        let tree = sample_tree();
        let mut view = ViewState::new();
        view.collapse_beyond_level(&tree, 0);
        for node in flatten_tree(&tree) {
            assert!(!view.is_collapsed(&node.id));
        }
    }

    #[test]
    fn test_collapse_all_and_expand_all() {
        let tree = sample_tree();
        let mut view = ViewState::new();
        view.collapse_all(&tree);
        assert!(view.is_collapsed(&NodeId::Int(1)));
        assert!(view.is_collapsed(&NodeId::Int(2)));
        assert!(view.is_collapsed(&NodeId::Int(4)));
        // Leaves are never collapsed.
        assert!(!view.is_collapsed(&NodeId::Int(3)));
        assert!(!view.is_collapsed(&NodeId::Int(5)));

        view.expand_all();
        assert!(!view.is_collapsed(&NodeId::Int(1)));
    }

    #[test]
    fn test_toggle_reports_new_state() {
        let mut view = ViewState::new();
        let id = NodeId::Int(2);
        assert!(!view.toggle(&id), "collapsing returns false");
        assert!(view.is_collapsed(&id));
        assert!(view.toggle(&id), "expanding returns true");
        assert!(!view.is_collapsed(&id));
    }

    #[test]
    fn test_focus_expands_ancestors() {
        let tree = sample_tree();
        let mut view = ViewState::new();
        view.collapse_all(&tree);
        view.focus(&tree, &NodeId::Int(5));
        assert!(!view.is_collapsed(&NodeId::Int(1)));
        assert!(!view.is_collapsed(&NodeId::Int(2)));
        assert!(!view.is_collapsed(&NodeId::Int(4)));
    }

    #[test]
    fn test_highlight_path() {
        let tree = sample_tree();
        let mut view = ViewState::new();
        view.highlight_path(&tree, &NodeId::Int(4));
        assert!(view.is_highlighted(&NodeId::Int(1)));
        assert!(view.is_highlighted(&NodeId::Int(2)));
        assert!(view.is_highlighted(&NodeId::Int(4)));
        assert!(!view.is_highlighted(&NodeId::Int(3)));

        let nodes = view.highlighted_nodes(&tree);
        assert_eq!(nodes.len(), 3);

        view.clear_highlight();
        assert!(!view.is_highlighted(&NodeId::Int(1)));
    }

    #[test]
    fn test_apply_search_expands_and_positions_cursor() {
        let tree = sample_tree();
        let mut view = ViewState::new();
        view.collapse_all(&tree);

        let count = view.apply_search(&tree, "deep", &mapping());
        assert_eq!(count, 2);
        assert_eq!(view.match_cursor(), Some((0, 2)));
        assert!(view.is_match(&NodeId::Int(4)));
        assert!(view.is_match(&NodeId::Int(5)));
        // Ancestors of both matches are expanded again.
        assert!(!view.is_collapsed(&NodeId::Int(1)));
        assert!(!view.is_collapsed(&NodeId::Int(2)));
        assert!(!view.is_collapsed(&NodeId::Int(4)));
    }

    #[test]
    fn test_empty_query_clears_match_state() {
        let tree = sample_tree();
        let mut view = ViewState::new();
        view.apply_search(&tree, "deep", &mapping());
        assert!(view.match_cursor().is_some());

        let count = view.apply_search(&tree, "", &mapping());
        assert_eq!(count, 0);
        assert_eq!(view.match_cursor(), None);
        assert!(!view.is_match(&NodeId::Int(4)));
        assert!(view.next_match(&tree).is_none());
    }

    #[test]
    fn test_match_navigation_wraps() {
        let tree = sample_tree();
        let mut view = ViewState::new();
        view.apply_search(&tree, "deep", &mapping());

        assert_eq!(view.next_match(&tree), Some(NodeId::Int(5)));
        assert_eq!(view.match_cursor(), Some((1, 2)));
        // Wraps back to the first match.
        assert_eq!(view.next_match(&tree), Some(NodeId::Int(4)));
        assert_eq!(view.match_cursor(), Some((0, 2)));
        // And backwards past the start.
        assert_eq!(view.prev_match(&tree), Some(NodeId::Int(5)));
        assert_eq!(view.match_cursor(), Some((1, 2)));
    }
}

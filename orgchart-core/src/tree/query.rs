use crate::types::{NodeId, OrgNode};
use std::collections::HashSet;

/// Every node of the tree in display order: the node itself, then its
/// assistants' full subtrees, then its transversals', then its children's.
///
/// Callers rely on a node's assistants and transversals being enumerated
/// immediately after the node itself; this order is a fixed contract.
///
/// Iterative on an explicit stack, so arbitrarily deep hierarchies cannot
/// overflow the call stack.
pub fn flatten_tree(root: &OrgNode) -> Vec<&OrgNode> {
    let mut result = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        result.push(node);
        // Reverse pushes so assistants pop first, children last.
        for child in node.children.iter().rev() {
            stack.push(child);
        }
        for child in node.transversals.iter().rev() {
            stack.push(child);
        }
        for child in node.assistants.iter().rev() {
            stack.push(child);
        }
    }

    result
}

/// The ids on the path from the root down to `target`, both ends included.
/// Empty when `target` is not in the tree.
///
/// Probes assistants, then transversals, then children at every level; with
/// unique ids this only affects traversal cost, not the result.
pub fn path_to_root(root: &OrgNode, target: &NodeId) -> HashSet<NodeId> {
    // Each frame pairs a node with the index of the next child to probe,
    // counted over assistants + transversals + children. The frame stack is
    // exactly the in-progress root-to-here path.
    let mut frames: Vec<(&OrgNode, usize)> = vec![(root, 0)];

    while let Some(&(node, cursor)) = frames.last() {
        if cursor == 0 && node.id == *target {
            return frames.iter().map(|(n, _)| n.id.clone()).collect();
        }
        match child_at(node, cursor) {
            Some(child) => {
                if let Some(frame) = frames.last_mut() {
                    frame.1 += 1;
                }
                frames.push((child, 0));
            }
            None => {
                frames.pop();
            }
        }
    }

    HashSet::new()
}

fn child_at(node: &OrgNode, index: usize) -> Option<&OrgNode> {
    let assistants = node.assistants.len();
    let transversals = node.transversals.len();
    if index < assistants {
        node.assistants.get(index)
    } else if index < assistants + transversals {
        node.transversals.get(index - assistants)
    } else {
        node.children.get(index - assistants - transversals)
    }
}

use crate::tree::validate::validate_records;
use crate::types::{FieldMapping, NodeId, OrgNode, Record, RoleType, ValidationError};
use std::cmp::Ordering;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Why [`build_tree`] refused to produce a tree.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Validation found structural defects. All of them, joined.
    #[error("{}", join_messages(.errors))]
    Invalid { errors: Vec<ValidationError> },
    /// No record with an empty parent field. Unreachable after validation.
    #[error("no root node found")]
    MissingRoot,
    /// A parent reference did not resolve. Unreachable after validation.
    #[error("parent {parent} not found for node {id}")]
    UnknownParent { id: NodeId, parent: NodeId },
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Build the organization tree from flat records.
///
/// Validation always runs first; a tree is never built from defective input.
/// The root and parent-lookup checks stay as contract guards even though
/// validation makes them unreachable.
///
/// Given identical records and mapping, the output is structurally identical
/// on every call: partitions fill in input record order, then each partition
/// is sorted by the numeric `order` field (stable on ties) when that role is
/// bound.
pub fn build_tree(records: &[Record], mapping: &FieldMapping) -> Result<OrgNode, BuildError> {
    let errors = validate_records(records, mapping);
    if !errors.is_empty() {
        return Err(BuildError::Invalid { errors });
    }

    // One provisional node per record, plus per-parent attach lists in input
    // order. The attach lists drive every later pass so that nothing depends
    // on hash-map iteration order.
    let mut nodes: HashMap<NodeId, OrgNode> = HashMap::with_capacity(records.len());
    let mut attach: HashMap<NodeId, Vec<(NodeId, RoleType)>> = HashMap::new();
    let mut root_id: Option<NodeId> = None;

    for record in records {
        let id = mapping.record_id(record);
        let parent_id = mapping.record_parent(record);
        if parent_id.is_none() {
            root_id = Some(id.clone());
        }
        nodes.insert(
            id.clone(),
            OrgNode {
                id: id.clone(),
                parent_id: parent_id.clone(),
                data: record.clone(),
                children: Vec::new(),
                assistants: Vec::new(),
                transversals: Vec::new(),
                depth: 0,
                is_leaf: true,
            },
        );
        if let Some(parent) = parent_id {
            attach
                .entry(parent)
                .or_default()
                .push((id, mapping.record_role_type(record)));
        }
    }

    let root_id = match root_id {
        Some(id) => id,
        None => return Err(BuildError::MissingRoot),
    };

    // Contract guard: every referenced parent must exist.
    for (parent, entries) in &attach {
        if !nodes.contains_key(parent) {
            let (id, _) = entries[0].clone();
            return Err(BuildError::UnknownParent {
                id,
                parent: parent.clone(),
            });
        }
    }

    // Depth assignment, level by level from the root.
    let mut levels: Vec<Vec<NodeId>> = Vec::new();
    let mut frontier = vec![root_id.clone()];
    let mut depth: u32 = 0;
    while !frontier.is_empty() {
        let mut next = Vec::new();
        for id in &frontier {
            if let Some(node) = nodes.get_mut(id) {
                node.depth = depth;
            }
            if let Some(entries) = attach.get(id) {
                next.extend(entries.iter().map(|(child, _)| child.clone()));
            }
        }
        levels.push(frontier);
        frontier = next;
        depth += 1;
    }

    // Assemble deepest level first, so every node's partitions are complete
    // and sorted before the node itself is attached to its parent. Leaf
    // status is settled at the same moment.
    let mut finished: HashMap<NodeId, OrgNode> = HashMap::new();
    for level in levels.iter().rev() {
        for id in level {
            let mut node = match nodes.remove(id) {
                Some(node) => node,
                None => continue,
            };
            if let Some(entries) = attach.get(id) {
                for (child_id, role) in entries {
                    let child = match finished.remove(child_id) {
                        Some(child) => child,
                        None => continue,
                    };
                    match role {
                        RoleType::Assistant => node.assistants.push(child),
                        RoleType::Transversal => node.transversals.push(child),
                        RoleType::Standard => node.children.push(child),
                    }
                }
            }
            if mapping.order.is_some() {
                sort_partition(&mut node.children, mapping);
                sort_partition(&mut node.assistants, mapping);
                sort_partition(&mut node.transversals, mapping);
            }
            node.is_leaf = node.children.is_empty()
                && node.assistants.is_empty()
                && node.transversals.is_empty();
            finished.insert(node.id.clone(), node);
        }
    }

    let root = match finished.remove(&root_id) {
        Some(root) => root,
        None => return Err(BuildError::MissingRoot),
    };

    debug!(
        "tree built: {} records, max depth {}",
        records.len(),
        levels.len().saturating_sub(1)
    );
    Ok(root)
}

/// Ascending by the numeric `order` value. `sort_by` is stable, so ties keep
/// the input record order.
fn sort_partition(nodes: &mut [OrgNode], mapping: &FieldMapping) {
    nodes.sort_by(|a, b| {
        let ka = mapping.record_order(&a.data);
        let kb = mapping.record_order(&b.data);
        ka.partial_cmp(&kb).unwrap_or(Ordering::Equal)
    });
}

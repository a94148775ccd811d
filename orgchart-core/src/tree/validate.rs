use crate::types::{
    ErrorDetail, FieldMapping, NodeId, OrphanRef, Record, ValidationError, ValidationErrorKind,
};
use std::collections::{HashMap, HashSet};

/// Validate flat records before tree construction. Returns every defect
/// found; an empty vec means the set is structurally fit to build.
///
/// All checks run against the whole record set. Cycle detection is the one
/// exception: it assumes a clean graph shape, so it only runs when the
/// earlier checks found nothing.
pub fn validate_records(records: &[Record], mapping: &FieldMapping) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if records.is_empty() {
        errors.push(ValidationError {
            kind: ValidationErrorKind::EmptyData,
            message: "no records provided".to_string(),
            detail: None,
        });
        return errors;
    }

    // Id uniqueness
    let mut ids: HashSet<NodeId> = HashSet::new();
    let mut duplicates: Vec<NodeId> = Vec::new();
    for record in records {
        let id = mapping.record_id(record);
        if !ids.insert(id.clone()) {
            duplicates.push(id);
        }
    }
    if !duplicates.is_empty() {
        errors.push(ValidationError {
            kind: ValidationErrorKind::DuplicateId,
            message: format!("duplicate ids: {}", join_ids(&duplicates)),
            detail: Some(ErrorDetail::DuplicateIds { ids: duplicates }),
        });
    }

    // Root candidates and dangling parent references
    let mut roots: Vec<NodeId> = Vec::new();
    let mut orphans: Vec<OrphanRef> = Vec::new();
    for record in records {
        let id = mapping.record_id(record);
        match mapping.record_parent(record) {
            None => roots.push(id),
            Some(parent) if !ids.contains(&parent) => orphans.push(OrphanRef { id, parent }),
            Some(_) => {}
        }
    }

    if roots.is_empty() {
        errors.push(ValidationError {
            kind: ValidationErrorKind::NoRoot,
            message: "no root found (no record with a null or empty parent field)".to_string(),
            detail: None,
        });
    } else if roots.len() > 1 {
        errors.push(ValidationError {
            kind: ValidationErrorKind::MultipleRoots,
            message: format!(
                "multiple roots detected: {}; exactly one root is expected",
                join_ids(&roots)
            ),
            detail: Some(ErrorDetail::Roots { ids: roots }),
        });
    }

    if !orphans.is_empty() {
        let listed: Vec<String> = orphans
            .iter()
            .map(|o| format!("{} → parent {}", o.id, o.parent))
            .collect();
        errors.push(ValidationError {
            kind: ValidationErrorKind::Orphan,
            message: format!(
                "orphan records (parent references an unknown id): {}",
                listed.join(", ")
            ),
            detail: Some(ErrorDetail::Orphans { refs: orphans }),
        });
    }

    // Cycle walk assumes the shape checks above all passed
    if errors.is_empty() {
        let cycle = detect_cycles(records, mapping);
        if !cycle.is_empty() {
            errors.push(ValidationError {
                kind: ValidationErrorKind::Cycle,
                message: format!("cycle detected involving: {}", join_ids(&cycle)),
                detail: Some(ErrorDetail::CycleNodes { ids: cycle }),
            });
        }
    }

    errors
}

/// Walk each record's parent chain. A node reappearing on the chain currently
/// being walked is a cycle, and the whole in-progress chain is reported
/// (best-effort membership: lead-in nodes may be included). Nodes are marked
/// resolved after their first walk, so every chain is traversed at most once
/// overall and the scan stays linear.
fn detect_cycles(records: &[Record], mapping: &FieldMapping) -> Vec<NodeId> {
    let mut parents: HashMap<NodeId, Option<NodeId>> = HashMap::new();
    let mut walk_order: Vec<NodeId> = Vec::new();
    for record in records {
        let id = mapping.record_id(record);
        if !parents.contains_key(&id) {
            walk_order.push(id.clone());
        }
        parents.insert(id, mapping.record_parent(record));
    }

    let mut resolved: HashSet<NodeId> = HashSet::new();
    let mut cycle_nodes: Vec<NodeId> = Vec::new();

    for start in &walk_order {
        if resolved.contains(start) {
            continue;
        }

        let mut chain: Vec<NodeId> = Vec::new();
        let mut on_chain: HashSet<NodeId> = HashSet::new();
        let mut current = Some(start.clone());

        while let Some(id) = current {
            if resolved.contains(&id) {
                break;
            }
            if on_chain.contains(&id) {
                cycle_nodes.extend(chain.iter().cloned());
                break;
            }
            on_chain.insert(id.clone());
            chain.push(id.clone());
            current = parents.get(&id).cloned().flatten();
        }

        for id in chain {
            resolved.insert(id);
        }
    }

    cycle_nodes
}

fn join_ids(ids: &[NodeId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

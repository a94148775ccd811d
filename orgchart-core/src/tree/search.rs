//! Diacritic-insensitive substring search over a built tree.

use crate::tree::query::flatten_tree;
use crate::types::{FieldMapping, OrgNode, SearchField, SearchResult};
use tracing::debug;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize text for matching: Unicode lowercase, NFD decomposition, then
/// combining marks dropped. "École" and "ecole" compare equal.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Match `query` against every node's name, firstname, role and direction
/// values, in that priority order. The first field that contains the
/// normalized query produces the node's single result; a node never yields
/// more than one. Result order follows [`flatten_tree`], not relevance.
///
/// An empty or whitespace-only query yields no results.
pub fn search<'a>(
    root: &'a OrgNode,
    query: &str,
    mapping: &FieldMapping,
) -> Vec<SearchResult<'a>> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    let needle = normalize(query);

    let mut results = Vec::new();
    for node in flatten_tree(root) {
        for field in SearchField::ALL {
            let value = field
                .mapped(mapping)
                .and_then(|name| node.data.get(name))
                .and_then(|v| v.as_str());
            if let Some(value) = value {
                if !value.is_empty() && normalize(value).contains(&needle) {
                    results.push(SearchResult {
                        node,
                        field,
                        value: value.to_string(),
                    });
                    break;
                }
            }
        }
    }

    debug!("search for {:?} matched {} nodes", query, results.len());
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build::build_tree;
    use crate::types::{FieldMapping, NodeId, Record};
    use serde_json::json;

    fn records(raw: serde_json::Value) -> Vec<Record> {
        serde_json::from_value(raw).unwrap()
    }

    fn mapping() -> FieldMapping {
        FieldMapping {
            name: Some("name".to_string()),
            firstname: Some("firstname".to_string()),
            role: Some("role".to_string()),
            direction: Some("direction".to_string()),
            ..FieldMapping::default()
        }
    }

    fn sample_tree() -> OrgNode {
        let data = records(json!([
            {"id": 1, "parent_id": null, "name": "Durand", "firstname": "Claire",
             "role": "Directrice générale", "direction": "Direction générale"},
            {"id": 2, "parent_id": 1, "name": "Lefèvre", "firstname": "Anne",
             "role": "Cheffe de cabinet", "direction": "Direction du budget"},
            {"id": 3, "parent_id": 1, "name": "Martin", "firstname": "Paul",
             "role": "Directeur", "direction": "École des cadres"},
        ]));
        build_tree(&data, &mapping()).unwrap()
    }

    #[test]
    fn test_normalize_strips_case_and_diacritics() {
        assert_eq!(normalize("École"), "ecole");
        assert_eq!(normalize("Lefèvre"), "lefevre");
        assert_eq!(normalize("GÉNÉRALE"), "generale");
        assert_eq!(normalize("plain"), "plain");
    }

    #[test]
    fn test_empty_query_yields_nothing() {
        let tree = sample_tree();
        assert!(search(&tree, "", &mapping()).is_empty());
        assert!(search(&tree, "   ", &mapping()).is_empty());
    }

    #[test]
    fn test_accent_insensitive_match() {
        let tree = sample_tree();
        let results = search(&tree, "ecole", &mapping());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].node.id, NodeId::Int(3));
        assert_eq!(results[0].field, SearchField::Direction);
        assert_eq!(results[0].value, "École des cadres");
    }

    #[test]
    fn test_first_field_wins() {
        // "générale" appears in both role and direction of the root; role is
        // probed first and produces the node's single result.
        let tree = sample_tree();
        let results = search(&tree, "générale", &mapping());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].field, SearchField::Role);
        assert_eq!(results[0].value, "Directrice générale");
    }

    #[test]
    fn test_at_most_one_result_per_node() {
        let tree = sample_tree();
        // Matches role or direction on every node.
        let results = search(&tree, "dire", &mapping());
        assert_eq!(results.len(), 3);
        let mut seen = std::collections::HashSet::new();
        for result in &results {
            assert!(seen.insert(result.node.id.clone()));
        }
    }

    #[test]
    fn test_no_match_is_not_an_error() {
        let tree = sample_tree();
        assert!(search(&tree, "zzz", &mapping()).is_empty());
    }

    #[test]
    fn test_results_follow_flatten_order() {
        let tree = sample_tree();
        let results = search(&tree, "dire", &mapping());
        let ids: Vec<&NodeId> = results.iter().map(|r| &r.node.id).collect();
        assert_eq!(ids, [&NodeId::Int(1), &NodeId::Int(2), &NodeId::Int(3)]);
    }

    #[test]
    fn test_unbound_fields_are_skipped() {
        let tree = sample_tree();
        let narrow = FieldMapping {
            name: Some("name".to_string()),
            ..FieldMapping::default()
        };
        // "directrice" only appears in role/direction, which are unbound here.
        assert!(search(&tree, "directrice", &narrow).is_empty());
        assert_eq!(search(&tree, "lefevre", &narrow).len(), 1);
    }
}

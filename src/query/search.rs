use serde::Serialize;
use serde_json::Value;

use crate::file_format::{tree::TreeNode, value::value_as_text};

/// One matching attribute.  `path` leads from the searched node (exclusive)
/// down to the object holding the attribute, root-most component first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchResult {
    pub path: Vec<String>,
    pub property: String,
    pub value: Value,
}

/// Depth-first walk over every object under `node`, in child order, keeping
/// the attributes `matches` accepts.  Uses an explicit stack so deep
/// hierarchies can't exhaust the call stack.
fn search_with<F>(node: &TreeNode, matches: F) -> Vec<SearchResult>
where
    F: Fn(&str, &Value) -> bool,
{
    let mut results = vec![];
    let mut pending: Vec<(&TreeNode, Vec<String>)> = vec![(node, vec![])];

    while let Some((node, path)) = pending.pop() {
        if let Some(attributes) = node.attributes() {
            for (property, value) in attributes {
                if matches(property, value) {
                    results.push(SearchResult {
                        path: path.clone(),
                        property: property.clone(),
                        value: value.clone(),
                    });
                }
            }
        }
        if let Some(children) = node.children() {
            for (key, child) in children.iter().rev() {
                let mut child_path = path.clone();
                child_path.push(key.clone());
                pending.push((child, child_path));
            }
        }
    }

    results
}

/// Attributes named `property_name`, compared case-insensitively but
/// otherwise exactly.
pub fn search_by_name(node: &TreeNode, property_name: &str) -> Vec<SearchResult> {
    let wanted = property_name.to_lowercase();
    search_with(node, |property, _| property.to_lowercase() == wanted)
}

/// Attributes whose value, as text, is exactly `target_value`.  This is a
/// string comparison, so `"512"` finds the integer 512.
pub fn search_by_value(node: &TreeNode, target_value: &str) -> Vec<SearchResult> {
    search_with(node, |_, value| value_as_text(value) == target_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_format::{dn::dn_to_path, tree::Tree};
    use serde_json::json;

    fn directory() -> Tree {
        let mut tree = Tree::new();
        for (dn, attrs) in [
            ("DC=example,DC=com", json!({"dc": "example"})),
            (
                "CN=Alice,OU=Users,DC=example,DC=com",
                json!({"mail": "alice@example.com", "userAccountControl": 512}),
            ),
            (
                "CN=Bob,OU=Users,DC=example,DC=com",
                json!({"Mail": "bob@example.com", "userAccountControl": 514}),
            ),
        ] {
            if let Value::Object(map) = attrs {
                tree.insert(&dn_to_path(dn), map);
            }
        }
        tree
    }

    #[test]
    fn by_name_is_case_insensitive_and_exact() {
        let tree = directory();
        let results = search_by_name(tree.root(), "MAIL");
        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0],
            SearchResult {
                path: vec![
                    "DC=com".to_string(),
                    "DC=example".to_string(),
                    "OU=Users".to_string(),
                    "CN=Alice".to_string()
                ],
                property: "mail".to_string(),
                value: json!("alice@example.com"),
            }
        );
        assert_eq!(results[1].property, "Mail");
        assert!(search_by_name(tree.root(), "mai").is_empty());
    }

    #[test]
    fn by_value_compares_text() {
        let tree = directory();
        let results = search_by_value(tree.root(), "514");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].property, "userAccountControl");
        assert_eq!(results[0].value, json!(514));
        assert_eq!(results[0].path.last().unwrap(), "CN=Bob");
    }

    #[test]
    fn branch_attributes_are_searched() {
        let tree = directory();
        let results = search_by_value(tree.root(), "example");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path, vec!["DC=com", "DC=example"]);
    }

    #[test]
    fn paths_are_relative_to_the_searched_node() {
        let tree = directory();
        let users = tree
            .root()
            .child("DC=com")
            .and_then(|n| n.child("DC=example"))
            .and_then(|n| n.child("OU=Users"))
            .unwrap();
        let results = search_by_name(users, "mail");
        assert_eq!(results[0].path, vec!["CN=Alice"]);
        // Searching a leaf directly yields the empty path.
        let alice = users.child("CN=Alice").unwrap();
        assert_eq!(search_by_name(alice, "mail")[0].path, Vec::<String>::new());
    }

    #[test]
    fn nothing_to_find() {
        assert!(search_by_name(&TreeNode::empty_interior(), "mail").is_empty());
        assert!(search_by_value(&TreeNode::empty_interior(), "x").is_empty());
        let tree = directory();
        let alice = tree
            .root()
            .child("DC=com")
            .and_then(|n| n.child("DC=example"))
            .and_then(|n| n.child("OU=Users"))
            .and_then(|n| n.child("CN=Alice"))
            .unwrap();
        assert!(search_by_name(alice, "telephoneNumber").is_empty());
        assert!(search_by_value(alice, "nobody").is_empty());
    }
}

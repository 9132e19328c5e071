use crate::file_format::tree::{Tree, TreeNode};

/// Walk `path` down from the root of `tree`.  A component that isn't there,
/// or a leaf in the way, means there is nothing at `path`.
pub fn resolve<'a>(tree: &'a Tree, path: &[String]) -> Option<&'a TreeNode> {
    resolve_from(tree.root(), path)
}

pub fn resolve_from<'a>(node: &'a TreeNode, path: &[String]) -> Option<&'a TreeNode> {
    let mut node = node;
    for key in path {
        node = node.child(key)?;
    }
    Some(node)
}

/// Every object below `node` as a path relative to it, depth-first in child
/// order.  `node` itself counts when it is an object, as the empty path.
pub fn enumerate_paths(node: &TreeNode) -> Vec<Vec<String>> {
    let mut paths = vec![];
    let mut pending: Vec<(&TreeNode, Vec<String>)> = vec![(node, vec![])];

    while let Some((node, path)) = pending.pop() {
        if node.attributes().is_some() {
            paths.push(path.clone());
        }
        if let Some(children) = node.children() {
            // Reversed so that the first child is popped first.
            for (key, child) in children.iter().rev() {
                let mut child_path = path.clone();
                child_path.push(key.clone());
                pending.push((child, child_path));
            }
        }
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_format::dn::dn_to_path;
    use serde_json::{json, Value};

    fn tree(entries: &[(&str, Value)]) -> Tree {
        let mut tree = Tree::new();
        for (dn, attrs) in entries {
            if let Value::Object(map) = attrs.clone() {
                tree.insert(&dn_to_path(dn), map);
            }
        }
        tree
    }

    fn p(components: &[&str]) -> Vec<String> {
        components.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolves_full_paths() {
        let t = tree(&[
            ("CN=Alice,OU=Users,DC=example,DC=com", json!({"mail": "alice@example.com"})),
            ("CN=Bob,OU=Users,DC=example,DC=com", json!({"mail": "bob@example.com"})),
        ]);
        let alice = resolve(&t, &p(&["DC=com", "DC=example", "OU=Users", "CN=Alice"])).unwrap();
        assert_eq!(alice.attributes().unwrap()["mail"], json!("alice@example.com"));
        let bob = resolve(&t, &p(&["DC=com", "DC=example", "OU=Users", "CN=Bob"])).unwrap();
        assert_ne!(alice, bob);
    }

    #[test]
    fn empty_path_is_the_root() {
        let t = tree(&[("DC=com", json!({"dc": "com"}))]);
        assert!(std::ptr::eq(resolve(&t, &[]).unwrap(), t.root()));
    }

    #[test]
    fn missing_components_are_absent() {
        let t = tree(&[("CN=Alice,DC=com", json!({"mail": "a"}))]);
        assert!(resolve(&t, &p(&["DC=org"])).is_none());
        assert!(resolve(&t, &p(&["DC=com", "CN=Bob"])).is_none());
        // Attribute names are not path components.
        assert!(resolve(&t, &p(&["DC=com", "CN=Alice", "mail"])).is_none());
    }

    #[test]
    fn enumerates_objects_depth_first() {
        let t = tree(&[
            ("DC=example,DC=com", json!({"dc": "example"})),
            ("CN=a,OU=x,DC=example,DC=com", json!({"cn": "a"})),
            ("CN=b,DC=example,DC=com", json!({"cn": "b"})),
        ]);
        assert_eq!(
            enumerate_paths(t.root()),
            vec![
                p(&["DC=com", "DC=example"]),
                p(&["DC=com", "DC=example", "OU=x", "CN=a"]),
                p(&["DC=com", "DC=example", "CN=b"]),
            ]
        );
        assert!(enumerate_paths(&TreeNode::empty_interior()).is_empty());
    }

    #[test]
    fn empty_dn_never_resolves() {
        let t = tree(&[("DC=com", json!({"dc": "com"}))]);
        assert!(resolve(&t, &dn_to_path("")).is_none());
    }

    #[test]
    fn escaped_commas_split_like_any_other() {
        let t = Tree::from_document_str(
            r#"{"DC=com": {" John": {"CN=Doe\\": {"sn": "Doe"}}}}"#,
        )
        .unwrap();
        let doe = resolve(&t, &dn_to_path(r"CN=Doe\, John,DC=com")).unwrap();
        assert_eq!(doe.attributes().unwrap()["sn"], json!("Doe"));

        // And the tree we build ourselves nests the same way.
        let built = tree(&[(r"CN=Doe\, John,DC=com", json!({"sn": "Doe"}))]);
        assert_eq!(built, t);
    }
}

use indexmap::IndexMap;
use serde::{ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{ser::PrettyFormatter, Map, Value};

use super::dn::dn_to_path;
use super::flat::FlatCollection;
use super::value::AttributeMap;

/// Children of a node keyed by DN component, in insertion order.
pub type Children = IndexMap<String, TreeNode>;

/// One position in the directory namespace.
///
/// Directory objects that have extracted descendants of their own (a domain
/// root, an OU) are `Branch`es; their attributes and their children live side
/// by side in the persisted document, the same way they did in the flat
/// search results.
#[derive(Clone, Debug, PartialEq)]
pub enum TreeNode {
    /// A directory object with no descendants.
    Leaf(AttributeMap),
    /// A DN component that was only ever seen as an ancestor.
    Interior(Children),
    /// A directory object that is also an ancestor of other objects.
    Branch {
        attributes: AttributeMap,
        children: Children,
    },
}

impl TreeNode {
    pub fn empty_interior() -> Self {
        TreeNode::Interior(Children::new())
    }

    /// The attributes of the object at this position, if there is one.
    pub fn attributes(&self) -> Option<&AttributeMap> {
        match self {
            TreeNode::Leaf(attributes) | TreeNode::Branch { attributes, .. } => Some(attributes),
            TreeNode::Interior(_) => None,
        }
    }

    pub fn children(&self) -> Option<&Children> {
        match self {
            TreeNode::Interior(children) | TreeNode::Branch { children, .. } => Some(children),
            TreeNode::Leaf(_) => None,
        }
    }

    pub fn child(&self, key: &str) -> Option<&TreeNode> {
        self.children()?.get(key)
    }

    /// Children to insert under.  A leaf that is about to gain descendants
    /// becomes a branch and keeps its attributes.
    fn children_mut(&mut self) -> &mut Children {
        if let TreeNode::Leaf(attributes) = self {
            let attributes = std::mem::take(attributes);
            *self = TreeNode::Branch {
                attributes,
                children: Children::new(),
            };
        }
        match self {
            TreeNode::Interior(children) | TreeNode::Branch { children, .. } => children,
            TreeNode::Leaf(_) => unreachable!("leaves are promoted to branches above"),
        }
    }

    /// Classify a JSON object from the persisted document: object-valued
    /// entries are children, everything else is an attribute.
    ///
    /// An empty object is an empty interior node.  Nested empty objects go
    /// through `from_json_child`.
    pub fn from_json_object(object: Map<String, Value>) -> TreeNode {
        let mut attributes = AttributeMap::new();
        let mut children = Children::new();
        for (key, value) in object {
            match value {
                Value::Object(child) => {
                    children.insert(key, TreeNode::from_json_child(child));
                }
                other => {
                    attributes.insert(key, other);
                }
            }
        }

        match (attributes.is_empty(), children.is_empty()) {
            (true, _) => TreeNode::Interior(children),
            (false, true) => TreeNode::Leaf(attributes),
            (false, false) => TreeNode::Branch {
                attributes,
                children,
            },
        }
    }

    /// Building a tree never leaves an ancestor without children, so below
    /// the root an empty object is an object without readable attributes.
    fn from_json_child(object: Map<String, Value>) -> TreeNode {
        if object.is_empty() {
            TreeNode::Leaf(AttributeMap::new())
        } else {
            TreeNode::from_json_object(object)
        }
    }
}

impl Serialize for TreeNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let attributes = self.attributes();
        let children = self.children();
        let len = attributes.map_or(0, |a| a.len()) + children.map_or(0, |c| c.len());

        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(attributes) = attributes {
            for (name, value) in attributes {
                map.serialize_entry(name, value)?;
            }
        }
        if let Some(children) = children {
            for (key, child) in children {
                map.serialize_entry(key, child)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TreeNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        Ok(TreeNode::from_json_object(object))
    }
}

/// The extracted directory as a namespace tree.  The root is the empty path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    root: TreeNode,
}

impl Default for Tree {
    fn default() -> Self {
        Self {
            root: TreeNode::empty_interior(),
        }
    }
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Place `attributes` at `path`, creating empty interior nodes for any
    /// missing ancestors.
    ///
    /// Whatever already sits at `path` is replaced, subtree included; the
    /// last write wins silently.  Inserting below an existing leaf turns that
    /// leaf into a branch.
    pub fn insert(&mut self, path: &[String], attributes: AttributeMap) {
        let (leaf_key, ancestors) = match path.split_last() {
            Some(split) => split,
            None => {
                warn!("ignoring object with an empty distinguished name");
                return;
            }
        };

        let mut node = &mut self.root;
        for key in ancestors {
            node = node
                .children_mut()
                .entry(key.clone())
                .or_insert_with(TreeNode::empty_interior);
        }
        node.children_mut()
            .insert(leaf_key.clone(), TreeNode::Leaf(attributes));
    }

    /// Fold a flat DN-keyed collection into a tree.
    pub fn from_flat(flat: FlatCollection) -> Tree {
        let mut tree = Tree::new();
        for (dn, attributes) in flat {
            tree.insert(&dn_to_path(&dn), attributes);
        }
        tree
    }

    /// Pretty-printed with a 4-space indent, the persisted document format.
    pub fn to_document_string(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        // serde_json only ever emits UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn from_document_str(s: &str) -> serde_json::Result<Tree> {
        serde_json::from_str(s)
    }
}

use indexmap::IndexMap;

use super::value::AttributeMap;

/// Everything one extraction run retrieved, keyed by distinguished name in
/// the order the source returned it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlatCollection {
    entries: IndexMap<String, AttributeMap>,
}

impl FlatCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an object.  The source guarantees DNs are unique within a run,
    /// so a repeated DN simply replaces the earlier attributes.
    pub fn insert(&mut self, dn: String, attributes: AttributeMap) {
        self.entries.insert(dn, attributes);
    }

    /// Move every entry of `other` into `self`, preserving order.
    pub fn append(&mut self, other: FlatCollection) {
        self.entries.extend(other.entries);
    }

    pub fn get(&self, dn: &str) -> Option<&AttributeMap> {
        self.entries.get(dn)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeMap)> {
        self.entries.iter()
    }
}

impl IntoIterator for FlatCollection {
    type Item = (String, AttributeMap);
    type IntoIter = indexmap::map::IntoIter<String, AttributeMap>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, AttributeMap)> for FlatCollection {
    fn from_iter<T: IntoIterator<Item = (String, AttributeMap)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

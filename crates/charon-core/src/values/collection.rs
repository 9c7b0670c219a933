//! Ordered collections of resources

use super::{Resource, COLLECTION_META, RELATIONSHIP_ITEMS};
use serde_json::{Map, Value};

/// Resources plus open metadata (pagination and the like)
#[derive(Debug, Clone, Default)]
pub struct ResourceCollection {
    resources: Vec<Resource>,
    meta: Map<String, Value>,
}

impl ResourceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn first(&self) -> Option<&Resource> {
        self.resources.first()
    }

    pub fn into_vec(self) -> Vec<Resource> {
        self.resources
    }

    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }

    pub fn add_meta(&mut self, key: &str, value: Value) {
        self.meta.insert(key.to_string(), value);
    }

    /// `{"items": [...]}` plus `"meta"` when metadata was added
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            RELATIONSHIP_ITEMS.to_string(),
            Value::Array(self.resources.iter().map(Resource::to_json).collect()),
        );
        if !self.meta.is_empty() {
            map.insert(COLLECTION_META.to_string(), Value::Object(self.meta.clone()));
        }
        Value::Object(map)
    }
}

impl FromIterator<Resource> for ResourceCollection {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        Self {
            resources: iter.into_iter().collect(),
            meta: Map::new(),
        }
    }
}

impl IntoIterator for ResourceCollection {
    type Item = Resource;
    type IntoIter = std::vec::IntoIter<Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResourceCollection {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_collection_json() {
        let collection = ResourceCollection::new();
        assert_eq!(collection.to_json(), json!({"items": []}));
    }

    #[test]
    fn test_meta_is_serialized() {
        let mut collection = ResourceCollection::new();
        collection.add_meta("pagination", json!({"next": null}));
        assert_eq!(
            collection.to_json(),
            json!({"items": [], "meta": {"pagination": {"next": null}}})
        );
    }
}

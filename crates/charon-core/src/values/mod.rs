//! Resources: the assembled output of a read, the staged input of a write
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod collection;
pub mod identifier;
pub mod resource;

pub use collection::ResourceCollection;
pub use identifier::{Identifier, IdentifierCollection};
pub use resource::{Resource, ResourceProperty, ResourceSource, ResourceValue};

use serde_json::{Map, Value};

/// Envelope key for sequences of child resources
pub const RELATIONSHIP_ITEMS: &str = "items";
/// Key carrying a relationship URL
pub const RELATIONSHIP_LINK: &str = "link";
/// Key carrying collection metadata
pub const COLLECTION_META: &str = "meta";

/// Follow a dotted display name through nested payload objects
///
/// Returns `None` when a segment is missing or an intermediate value is not an object.
pub fn lookup_display_path<'a>(payload: &'a Value, display_name: &str) -> Option<&'a Value> {
    display_name
        .split('.')
        .try_fold(payload, |current, segment| current.as_object()?.get(segment))
}

/// Insert `value` under a dotted display name, creating intermediate objects
pub(crate) fn insert_display_path(target: &mut Map<String, Value>, display_name: &str, value: Value) {
    match display_name.split_once('.') {
        None => {
            target.insert(display_name.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(nested) = entry {
                insert_display_path(nested, rest, value);
            }
        }
    }
}

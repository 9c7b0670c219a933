//! Entities and the property access protocol
//!
//! The engine never inspects entity types directly. Everything it needs goes through the
//! [`Entity`] capability trait: named readers, boolean predicates, plain attributes and
//! named writers. Typed entities usually implement it by delegating to an
//! [`Accessors`] table; [`DynamicEntity`] is a map-backed implementation for data
//! that only exists as JSON.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod access;
pub mod accessors;
pub mod dynamic;
pub mod hooks;
mod value;

pub use access::{read_property, write_property};
pub use accessors::Accessors;
pub use dynamic::DynamicEntity;
pub use hooks::{EntityHooks, Hook, HookCall};
pub use value::{is_truthy, loose_eq, PropertyValue};

use crate::context::DynamicContext;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared, mutable handle to an entity inside one call tree
pub type EntityRef = Rc<RefCell<dyn Entity>>;

/// Capability interface every mapped entity implements
///
/// Reads try [`getter`](Entity::getter), then [`predicate`](Entity::predicate), then
/// [`attribute`](Entity::attribute). Writes try [`setter`](Entity::setter), then
/// [`set_attribute`](Entity::set_attribute). Each method reports whether it knows the
/// property; the defaults know nothing.
pub trait Entity: fmt::Debug {
    /// Type name checked against a resource definition's entity type
    fn entity_type(&self) -> &str;

    /// Convention reader for `name`, receiving resolved path parameters
    fn getter(&self, _name: &str, _params: &[PropertyValue]) -> Option<PropertyValue> {
        None
    }

    /// Boolean predicate reader (`is<Name>`)
    fn predicate(&self, _name: &str, _params: &[PropertyValue]) -> Option<bool> {
        None
    }

    /// Directly accessible attribute
    fn attribute(&self, _name: &str) -> Option<PropertyValue> {
        None
    }

    /// Names of the directly accessible attributes, used when dumping an entity
    fn attribute_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Convention writer for `name`. Returns false when there is none.
    fn setter(&mut self, _name: &str, _value: &PropertyValue, _params: &[PropertyValue]) -> bool {
        false
    }

    /// Direct attribute write. Returns false when the attribute does not exist.
    fn set_attribute(&mut self, _name: &str, _value: &PropertyValue) -> bool {
        false
    }

    /// Entity-specific context adjustment applied before the entity is rendered
    fn dynamic_context(&self) -> Option<&dyn DynamicContext> {
        None
    }
}

/// Wrap an entity into a shared [`EntityRef`]
pub fn entity_ref<E: Entity + 'static>(entity: E) -> EntityRef {
    Rc::new(RefCell::new(entity))
}

/// Uppercase the first character: `category` becomes `Category`
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("category"), "Category");
        assert_eq!(capitalize("x"), "X");
        assert_eq!(capitalize(""), "");
    }
}

//! Entity-type hooks for eager loading, filtering and sorting
//!
//! Hooks are looked up by entity type and a method name derived from a prefix and the
//! capitalized property name (`eagerLoadCategory`, `filterName`, `sortId`). A missing
//! hook is not an error; callers fall back to their default behavior.

use super::{capitalize, PropertyValue};
use crate::query::QueryParameters;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Arguments handed to a hook
pub struct HookCall<'a> {
    pub entity_type: &'a str,
    pub method: &'a str,
    /// Resolved path parameters of the property, followed by caller supplied values
    pub parameters: Vec<PropertyValue>,
    /// Query under construction, present for filter and sort hooks
    pub query: Option<&'a mut QueryParameters>,
}

pub type Hook = Arc<dyn Fn(&mut HookCall<'_>) + Send + Sync>;

/// Hook table keyed by `(entity type, method name)`
#[derive(Clone, Default)]
pub struct EntityHooks {
    hooks: HashMap<(String, String), Hook>,
}

impl EntityHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` as `method` for `entity_type`
    pub fn register<F>(&mut self, entity_type: &str, method: &str, f: F)
    where
        F: Fn(&mut HookCall<'_>) + Send + Sync + 'static,
    {
        self.hooks
            .insert((entity_type.to_string(), method.to_string()), Arc::new(f));
    }

    pub fn get(&self, entity_type: &str, method: &str) -> Option<&Hook> {
        self.hooks.get(&(entity_type.to_string(), method.to_string()))
    }

    pub fn contains(&self, entity_type: &str, method: &str) -> bool {
        self.get(entity_type, method).is_some()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for EntityHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self
            .hooks
            .keys()
            .map(|(entity_type, method)| format!("{}::{}", entity_type, method))
            .collect();
        keys.sort();
        f.debug_list().entries(keys).finish()
    }
}

/// Method name for a hook: `hook_name("filter", "name")` is `filterName`
pub fn hook_name(prefix: &str, property: &str) -> String {
    format!("{}{}", prefix, capitalize(property))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_hook_name() {
        assert_eq!(hook_name("eagerLoad", "photos"), "eagerLoadPhotos");
        assert_eq!(hook_name("sort", "id"), "sortId");
    }

    #[test]
    fn test_register_and_invoke() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut hooks = EntityHooks::new();
        hooks.register("Pet", "filterName", move |call| {
            counter.fetch_add(call.parameters.len(), Ordering::SeqCst);
        });

        assert!(hooks.contains("Pet", "filterName"));
        assert!(!hooks.contains("Category", "filterName"));

        let hook = hooks.get("Pet", "filterName").unwrap().clone();
        let mut call = HookCall {
            entity_type: "Pet",
            method: "filterName",
            parameters: vec![PropertyValue::string("rex")],
            query: None,
        };
        hook(&mut call);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

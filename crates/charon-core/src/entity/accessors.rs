//! Per-type accessor tables for typed entities

use super::PropertyValue;
use std::collections::HashMap;
use std::fmt;

type Getter<T> = Box<dyn Fn(&T, &[PropertyValue]) -> PropertyValue + Send + Sync>;
type Predicate<T> = Box<dyn Fn(&T, &[PropertyValue]) -> bool + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, &PropertyValue, &[PropertyValue]) + Send + Sync>;

/// Named readers and writers for one entity type, built once and shared
///
/// ```
/// use charon_core::entity::{Accessors, PropertyValue};
///
/// struct Tag { name: String }
///
/// let accessors = Accessors::<Tag>::new()
///     .getter("name", |tag, _| PropertyValue::string(tag.name.clone()))
///     .setter("name", |tag, value, _| tag.name = value.to_display_string());
///
/// let mut tag = Tag { name: "old".into() };
/// assert!(accessors.set(&mut tag, "name", &PropertyValue::string("new"), &[]));
/// assert_eq!(accessors.get(&tag, "name", &[]).unwrap().to_display_string(), "new");
/// ```
pub struct Accessors<T> {
    getters: HashMap<String, Getter<T>>,
    predicates: HashMap<String, Predicate<T>>,
    setters: HashMap<String, Setter<T>>,
}

impl<T> Accessors<T> {
    pub fn new() -> Self {
        Self {
            getters: HashMap::new(),
            predicates: HashMap::new(),
            setters: HashMap::new(),
        }
    }

    pub fn getter<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&T, &[PropertyValue]) -> PropertyValue + Send + Sync + 'static,
    {
        self.getters.insert(name.to_string(), Box::new(f));
        self
    }

    pub fn predicate<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&T, &[PropertyValue]) -> bool + Send + Sync + 'static,
    {
        self.predicates.insert(name.to_string(), Box::new(f));
        self
    }

    pub fn setter<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&mut T, &PropertyValue, &[PropertyValue]) + Send + Sync + 'static,
    {
        self.setters.insert(name.to_string(), Box::new(f));
        self
    }

    pub fn get(&self, entity: &T, name: &str, params: &[PropertyValue]) -> Option<PropertyValue> {
        self.getters.get(name).map(|getter| getter(entity, params))
    }

    pub fn is(&self, entity: &T, name: &str, params: &[PropertyValue]) -> Option<bool> {
        self.predicates.get(name).map(|predicate| predicate(entity, params))
    }

    pub fn set(&self, entity: &mut T, name: &str, value: &PropertyValue, params: &[PropertyValue]) -> bool {
        match self.setters.get(name) {
            Some(setter) => {
                setter(entity, value, params);
                true
            }
            None => false,
        }
    }
}

impl<T> Default for Accessors<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Accessors<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut getters: Vec<_> = self.getters.keys().collect();
        getters.sort();
        let mut setters: Vec<_> = self.setters.keys().collect();
        setters.sort();
        f.debug_struct("Accessors")
            .field("getters", &getters)
            .field("predicates", &self.predicates.len())
            .field("setters", &setters)
            .finish()
    }
}

//! Transformation context
//!
//! A [`Context`] carries everything a transformation needs besides the entity and the
//! definition: the action, explicit field selections, named parameters for `{context.*}`
//! tokens, processors and input parsers. Contexts are built up front and treated as
//! immutable; per-entity adjustments happen on a [`fork`](Context::fork).
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::action::Action;
use crate::entity::{EntityRef, PropertyValue};
use crate::input::{InputParser, InputParserCollection};
use crate::processor::{Processor, ProcessorCollection};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Wildcard matching any single path segment in show/expand selections
pub const WILDCARD: &str = "*";

type ParameterFn = Arc<dyn Fn(Option<&EntityRef>) -> PropertyValue>;

/// A named context value
#[derive(Clone)]
pub enum ContextParameter {
    /// Fixed value
    Value(PropertyValue),
    /// Computed from the entity being resolved, if any
    Dynamic(ParameterFn),
}

impl fmt::Debug for ContextParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextParameter::Value(value) => write!(f, "Value({:?})", value),
            ContextParameter::Dynamic(_) => write!(f, "Dynamic(..)"),
        }
    }
}

/// Per-entity context adjustment
///
/// Applied to a forked context before an entity is rendered. Attach one to a
/// resource definition, or return one from
/// [`Entity::dynamic_context`](crate::entity::Entity::dynamic_context).
pub trait DynamicContext {
    fn adjust_context(&self, context: Context, entity: &EntityRef) -> Context;
}

impl<F> DynamicContext for F
where
    F: Fn(Context, &EntityRef) -> Context,
{
    fn adjust_context(&self, context: Context, entity: &EntityRef) -> Context {
        self(context, entity)
    }
}

/// Options of a single transformation call tree
#[derive(Clone, Debug)]
pub struct Context {
    action: Action,
    show: Vec<String>,
    expand: Vec<String>,
    parameters: HashMap<String, ContextParameter>,
    processors: ProcessorCollection,
    input_parsers: InputParserCollection,
}

impl Context {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            show: Vec::new(),
            expand: Vec::new(),
            parameters: HashMap::new(),
            processors: ProcessorCollection::default(),
            input_parsers: InputParserCollection::default(),
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Restrict output to these dotted display-name paths
    pub fn with_fields<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.show.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Expand the relationships at these dotted display-name paths
    pub fn with_expand<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expand.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_parameter(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.set_parameter(name, value);
        self
    }

    pub fn with_dynamic_parameter<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(Option<&EntityRef>) -> PropertyValue + 'static,
    {
        self.parameters
            .insert(name.to_string(), ContextParameter::Dynamic(Arc::new(f)));
        self
    }

    pub fn with_processor(mut self, processor: Arc<dyn Processor>) -> Self {
        self.processors.push(processor);
        self
    }

    pub fn with_input_parser(mut self, parser: Arc<dyn InputParser>) -> Self {
        self.input_parsers.push(parser);
        self
    }

    /// Set a parameter on a context this caller owns, typically a fork
    pub fn set_parameter(&mut self, name: &str, value: impl Into<PropertyValue>) {
        self.parameters
            .insert(name.to_string(), ContextParameter::Value(value.into()));
    }

    /// Value of parameter `name`, or null when it is not defined
    pub fn parameter(&self, name: &str, entity: Option<&EntityRef>) -> PropertyValue {
        match self.parameters.get(name) {
            Some(ContextParameter::Value(value)) => value.clone(),
            Some(ContextParameter::Dynamic(f)) => f(entity),
            None => PropertyValue::Null,
        }
    }

    pub fn processors(&self) -> &ProcessorCollection {
        &self.processors
    }

    pub fn input_parsers(&self) -> &InputParserCollection {
        &self.input_parsers
    }

    /// Independent copy that may be adjusted without affecting this context
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// Context used for the children of a relationship
    pub fn child_context(&self, action: Action) -> Self {
        let mut child = self.clone();
        child.action = action;
        child
    }

    /// Explicit show decision for the field at `path`
    ///
    /// `None` when no selection was made; the field's own action set then decides.
    /// Selecting a relationship without naming any of its fields shows all of them.
    pub fn show_field(&self, path: &str) -> Option<bool> {
        if self.show.is_empty() {
            return None;
        }
        Some(
            self.show
                .iter()
                .any(|pattern| selects(pattern, path) || (selects_descendants(pattern, path) && !self.narrows(pattern))),
        )
    }

    fn narrows(&self, pattern: &str) -> bool {
        let prefix = format!("{}.", pattern);
        self.show.iter().any(|other| other.starts_with(&prefix))
    }

    /// Explicit expand decision for the relationship at `path`
    ///
    /// Only ever returns `Some(true)`: relationships not listed fall back to their
    /// default expansion.
    pub fn expand_field(&self, path: &str) -> Option<bool> {
        self.expand
            .iter()
            .any(|pattern| selects(pattern, path))
            .then_some(true)
    }
}

/// Whether selection `pattern` covers `path`
///
/// Segments match literally or through [`WILDCARD`]. A pattern reaching deeper than
/// `path` also covers it, so selecting `category.name` implies `category`.
fn selects(pattern: &str, path: &str) -> bool {
    let pattern: Vec<&str> = pattern.split('.').collect();
    let path: Vec<&str> = path.split('.').collect();
    if pattern.len() < path.len() {
        return false;
    }
    pattern
        .iter()
        .zip(&path)
        .all(|(p, segment)| *p == WILDCARD || p == segment)
}

/// Whether `path` lies strictly below the relationship `pattern` selects
fn selects_descendants(pattern: &str, path: &str) -> bool {
    let pattern: Vec<&str> = pattern.split('.').collect();
    let path: Vec<&str> = path.split('.').collect();
    pattern.len() < path.len()
        && pattern
            .iter()
            .zip(&path)
            .all(|(p, segment)| *p == WILDCARD || p == segment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::DynamicEntity;
    use serde_json::json;

    #[test]
    fn test_parameters() {
        let context = Context::new(Action::View)
            .with_parameter("lang", json!("en"))
            .with_dynamic_parameter("kind", |entity| match entity {
                Some(entity) => PropertyValue::string(entity.borrow().entity_type().to_string()),
                None => PropertyValue::Null,
            });

        assert_eq!(context.parameter("lang", None).to_value(), json!("en"));
        assert!(context.parameter("missing", None).is_null());

        let pet = DynamicEntity::new("Pet").into_ref();
        assert_eq!(context.parameter("kind", Some(&pet)).to_value(), json!("Pet"));
        assert!(context.parameter("kind", None).is_null());
    }

    #[test]
    fn test_fork_is_independent() {
        let context = Context::new(Action::View).with_parameter("a", json!(1));
        let mut fork = context.fork();
        fork.set_parameter("a", json!(2));
        assert_eq!(context.parameter("a", None).to_value(), json!(1));
        assert_eq!(fork.parameter("a", None).to_value(), json!(2));
    }

    #[test]
    fn test_show_selection() {
        let context = Context::new(Action::View).with_fields(["id", "category.name", "tags.*"]);
        assert_eq!(context.show_field("id"), Some(true));
        assert_eq!(context.show_field("name"), Some(false));
        assert_eq!(context.show_field("category"), Some(true));
        assert_eq!(context.show_field("category.name"), Some(true));
        assert_eq!(context.show_field("category.id"), Some(false));
        assert_eq!(context.show_field("tags.label"), Some(true));

        let whole = Context::new(Action::View).with_fields(["category"]);
        assert_eq!(whole.show_field("category.id"), Some(true));
        assert_eq!(whole.show_field("category.owner.name"), Some(true));

        assert_eq!(Context::new(Action::View).show_field("id"), None);
    }

    #[test]
    fn test_expand_selection() {
        let context = Context::new(Action::View).with_expand(["category.owner"]);
        assert_eq!(context.expand_field("category"), Some(true));
        assert_eq!(context.expand_field("category.owner"), Some(true));
        assert_eq!(context.expand_field("photos"), None);
    }

    #[test]
    fn test_child_context_changes_action_only() {
        let context = Context::new(Action::View)
            .with_parameter("a", json!(1))
            .with_expand(["x"]);
        let child = context.child_context(Action::Index);
        assert_eq!(child.action(), Action::Index);
        assert_eq!(child.parameter("a", None).to_value(), json!(1));
        assert_eq!(child.expand_field("x"), Some(true));
    }
}

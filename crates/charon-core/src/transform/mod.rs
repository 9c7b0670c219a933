//! The resource transformer
//!
//! [`ResourceTransformer`] walks a resource definition alongside an entity graph
//! (read direction) or a payload (write direction). It owns the traversal stacks of
//! one call tree: the current field path and the stack of entities being visited.
//! Both are empty before and after every top-level call.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

mod filters;
mod read;
pub mod stack;
mod write;

pub use stack::{CurrentPath, ParentEntityCollection};

use crate::context::Context;
use crate::entity::hooks::hook_name;
use crate::entity::{EntityRef, HookCall, PropertyValue};
use crate::error::{Error, Result};
use crate::expression::ExpressionResolver;
use crate::query::QueryParameters;
use crate::schema::{Field, Registry, Relationship, ResourceDefinition};
use crate::values::{Identifier, Resource};
use std::cell::RefCell;
use std::sync::Arc;

/// Depth at which relationships stop expanding
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Transformer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformerConfig {
    /// Once more entities than this are on the parent stack, relationships render as links
    pub max_depth: usize,
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Bidirectional entity/resource transformer
///
/// Not reentrant across call trees: use one transformer per thread of work.
#[derive(Debug)]
pub struct ResourceTransformer {
    registry: Arc<Registry>,
    config: TransformerConfig,
    current_path: RefCell<CurrentPath>,
    parents: RefCell<ParentEntityCollection>,
}

impl ResourceTransformer {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_config(registry, TransformerConfig::default())
    }

    pub fn with_config(registry: Arc<Registry>, config: TransformerConfig) -> Self {
        Self {
            registry,
            config,
            current_path: RefCell::new(CurrentPath::default()),
            parents: RefCell::new(ParentEntityCollection::default()),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> TransformerConfig {
        self.config
    }

    /// Definition registered under `name`
    pub fn definition(&self, name: &str) -> Result<Arc<ResourceDefinition>> {
        self.registry.definition(name)
    }

    /// Dotted display path of the field being processed
    pub fn current_path(&self) -> String {
        self.current_path.borrow().display_path()
    }

    /// Number of entities on the parent stack
    pub fn depth(&self) -> usize {
        self.parents.borrow().len()
    }

    /// Nearest ancestor of the entity being processed
    pub fn parent_entity(&self) -> Option<EntityRef> {
        self.parents.borrow().parent().cloned()
    }

    pub(crate) fn resolver<'a>(&self, context: &'a Context) -> ExpressionResolver<'a> {
        ExpressionResolver::new(context, self.parent_entity())
    }

    fn depth_exceeded(&self) -> bool {
        self.depth() > self.config.max_depth
    }

    /// A field is included when it participates in the context's action and the
    /// context's explicit selection, if any, covers its path
    pub(crate) fn should_include(&self, field: &Field, context: &Context, path: &str) -> bool {
        field.has_action(context.action()) && context.show_field(path).unwrap_or(true)
    }

    pub(crate) fn should_expand(&self, relationship: &Relationship, context: &Context, path: &str) -> bool {
        context
            .expand_field(path)
            .unwrap_or_else(|| relationship.is_expanded_in(context.action()))
    }

    fn check_entity_type(&self, definition: &ResourceDefinition, entity: &EntityRef) -> Result<()> {
        let actual = entity
            .try_borrow()
            .map(|entity| entity.entity_type().to_string())
            .map_err(|_| Error::internal("entity is mutably borrowed"))?;
        if definition.accepts(&actual) {
            return Ok(());
        }
        Err(Error::InvalidEntity {
            expected: definition.entity_type().to_string(),
            actual,
        })
    }

    /// Read `field` off `entity`
    pub fn resolve_property(&self, entity: &EntityRef, field: &Field, context: &Context) -> Result<PropertyValue> {
        self.resolver(context).resolve_path(
            &PropertyValue::Entity(entity.clone()),
            field.expression(),
            Some(field.name()),
        )
    }

    /// Whether `entity` is the one `identifier` addresses
    ///
    /// Each provided value is decoded through its field's value transformer and
    /// compared loosely with the entity's value. Identifiers without fields never match.
    pub fn entity_equals(&self, entity: &EntityRef, identifier: &Identifier, context: &Context) -> Result<bool> {
        if identifier.is_empty() {
            return Ok(false);
        }
        for (field, provided) in identifier.entity_values(context)? {
            let actual = self.resolve_property(entity, &field, context)?;
            if !PropertyValue::from(provided).loose_eq(&actual) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Whether `resource` carries the identifier of `entity`
    pub fn does_resource_represent_entity(
        &self,
        resource: &Resource,
        entity: &EntityRef,
        context: &Context,
    ) -> Result<bool> {
        self.entity_equals(entity, &resource.identifier(), context)
    }

    /// Whether every identifier field of `definition` resolves to a value on `entity`
    ///
    /// Definitions without identifier fields report false.
    pub fn entity_exists(&self, entity: &EntityRef, definition: &ResourceDefinition, context: &Context) -> Result<bool> {
        let mut identifiers = definition.identifiers().peekable();
        if identifiers.peek().is_none() {
            return Ok(false);
        }
        for field in identifiers {
            if self.resolve_property(entity, field, context)?.is_null() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Invoke the `<prefix><Field>` hook of `definition`'s entity type
    ///
    /// Returns the hook name when one was registered and called, `None` otherwise.
    /// A hook whose required context parameters are missing counts as absent.
    pub(crate) fn call_entity_hook(
        &self,
        definition: &ResourceDefinition,
        field: &Field,
        prefix: &str,
        context: &Context,
        extras: Vec<PropertyValue>,
        query: Option<&mut QueryParameters>,
    ) -> Result<Option<String>> {
        let segment = match field.expression().first() {
            Some(segment) => segment,
            None => return Ok(None),
        };
        let method = hook_name(prefix, &segment.name);
        let hook = match self.registry.hook(definition.entity_type(), &method) {
            Some(hook) => hook,
            None => return Ok(None),
        };

        let resolved = self.resolver(context).resolve_parameters(
            &segment.parameters,
            &PropertyValue::Null,
            Some(field.name()),
        );
        let mut parameters = match resolved {
            Ok(parameters) => parameters,
            Err(Error::VariableNotFoundInContext { parameter, .. }) => {
                tracing::debug!(
                    entity_type = definition.entity_type(),
                    method = %method,
                    parameter = %parameter,
                    "hook parameter missing from context, skipping hook"
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        parameters.extend(extras);

        let mut call = HookCall {
            entity_type: definition.entity_type(),
            method: &method,
            parameters,
            query,
        };
        (*hook)(&mut call);
        tracing::trace!(entity_type = definition.entity_type(), method = %method, "called entity hook");
        Ok(Some(method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::entity::DynamicEntity;
    use crate::schema::Field;
    use crate::value_transformer::MappingTransformer;
    use serde_json::json;

    fn setup() -> (ResourceTransformer, Arc<ResourceDefinition>) {
        let registry = Arc::new(Registry::new());
        let definition = registry
            .register(
                ResourceDefinition::builder("Pet")
                    .field(Field::new("id").identifier().visible())
                    .field(
                        Field::new("status")
                            .identifier()
                            .transformer(Arc::new(MappingTransformer::parse("1=available,2=sold").unwrap())),
                    )
                    .field(Field::new("name").visible())
                    .build()
                    .unwrap(),
            )
            .unwrap();
        (ResourceTransformer::new(registry), definition)
    }

    fn pet() -> EntityRef {
        DynamicEntity::new("Pet")
            .with("id", json!(3))
            .with("status", json!(2))
            .into_ref()
    }

    #[test]
    fn test_entity_equals_decodes_provided_values() {
        let (transformer, definition) = setup();
        let context = Context::new(Action::Edit);

        let matching = Identifier::from_payload(&definition, &json!({"id": "3", "status": "sold"}));
        assert!(transformer.entity_equals(&pet(), &matching, &context).unwrap());

        let mismatch = Identifier::from_payload(&definition, &json!({"id": 3, "status": "available"}));
        assert!(!transformer.entity_equals(&pet(), &mismatch, &context).unwrap());
    }

    #[test]
    fn test_empty_identifier_never_equals() {
        let (transformer, _) = setup();
        let context = Context::new(Action::Edit);
        assert!(!transformer.entity_equals(&pet(), &Identifier::new(), &context).unwrap());
    }

    #[test]
    fn test_entity_exists() {
        let (transformer, definition) = setup();
        let context = Context::new(Action::View);
        assert!(transformer.entity_exists(&pet(), &definition, &context).unwrap());

        let fresh = DynamicEntity::new("Pet").with("id", json!(3)).into_ref();
        assert!(!transformer.entity_exists(&fresh, &definition, &context).unwrap());

        let bare = ResourceDefinition::builder("Pet").build().unwrap();
        assert!(!transformer.entity_exists(&pet(), &bare, &context).unwrap());
    }

    #[test]
    fn test_should_include_respects_actions_and_selection() {
        let (transformer, definition) = setup();
        let name = definition.field("name").unwrap();
        let status = definition.field("status").unwrap();

        let view = Context::new(Action::View);
        assert!(transformer.should_include(name, &view, "name"));
        assert!(!transformer.should_include(status, &view, "status"));

        let narrowed = Context::new(Action::View).with_fields(["id"]);
        assert!(!transformer.should_include(name, &narrowed, "name"));
        assert!(!transformer.should_include(status, &Context::new(Action::View).with_fields(["status"]), "status"));
    }
}

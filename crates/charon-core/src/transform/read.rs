//! Read direction: entity graph to resources
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::stack::{ParentGuard, PathGuard};
use super::ResourceTransformer;
use crate::action::{ActionKind, Cardinality};
use crate::context::Context;
use crate::entity::{EntityRef, PropertyValue};
use crate::error::{Error, Result};
use crate::processor::ProcessScope;
use crate::query::FilterResults;
use crate::schema::{Field, Relationship, ResourceDefinition};
use crate::values::{Resource, ResourceCollection, ResourceSource, ResourceValue};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;

impl ResourceTransformer {
    /// Render `entity` through `definition`
    pub fn to_resource(
        &self,
        definition: &Arc<ResourceDefinition>,
        entity: &EntityRef,
        context: &Context,
    ) -> Result<Resource> {
        self.entity_to_resource(definition, entity, context, None)
    }

    /// Render every entity of `entities`, then run the collection processors
    pub fn to_resources(
        &self,
        definition: &Arc<ResourceDefinition>,
        entities: &[EntityRef],
        context: &Context,
    ) -> Result<ResourceCollection> {
        self.entities_to_collection(definition, entities, context, None, None)
    }

    /// Like [`to_resources`](Self::to_resources), handing the query that selected
    /// `entities` to the collection processors
    pub fn to_resources_filtered(
        &self,
        definition: &Arc<ResourceDefinition>,
        entities: &[EntityRef],
        context: &Context,
        filter_results: &FilterResults,
    ) -> Result<ResourceCollection> {
        self.entities_to_collection(definition, entities, context, Some(filter_results), None)
    }

    fn entities_to_collection(
        &self,
        definition: &Arc<ResourceDefinition>,
        entities: &[EntityRef],
        context: &Context,
        filter_results: Option<&FilterResults>,
        parent_field: Option<&Field>,
    ) -> Result<ResourceCollection> {
        let mut collection = entities
            .iter()
            .map(|entity| self.entity_to_resource(definition, entity, context, parent_field))
            .collect::<Result<ResourceCollection>>()?;

        let parent_entity = self.parents.borrow().current().cloned();
        let scope = ProcessScope {
            transformer: self,
            definition,
            context,
            parent_field,
            parent_entity: parent_entity.as_ref(),
        };
        context
            .processors()
            .process_collection(&scope, &mut collection, filter_results)?;
        Ok(collection)
    }

    fn entity_to_resource(
        &self,
        definition: &Arc<ResourceDefinition>,
        entity: &EntityRef,
        context: &Context,
        parent_field: Option<&Field>,
    ) -> Result<Resource> {
        self.check_entity_type(definition, entity)?;
        if !context.action().is_read() {
            return Err(Error::InvalidContextAction {
                action: context.action(),
                expected: ActionKind::Read,
            });
        }

        let context = self.adjusted_context(definition, entity, context)?;
        let context = context.as_ref();

        let parent_entity = self.parents.borrow().current().cloned();
        let _parent = ParentGuard::enter(&self.parents, entity.clone());

        let mut resource = Resource::new(definition.clone(), Some(ResourceSource::Entity(entity.clone())));
        for field in definition.fields() {
            let _path = PathGuard::enter(&self.current_path, field.clone());
            let path = self.current_path();
            let visible = self.should_include(field, context, &path);
            if !visible && !field.is_sortable() && !field.is_identifier() {
                continue;
            }
            tracing::trace!(field = field.name(), path = %path, visible, "resolving field");

            let value = match field.relationship() {
                None => ResourceValue::Scalar(self.scalar_to_resource(entity, field, context)?),
                Some(relationship) => self.relationship_to_resource(entity, field, relationship, context, &path)?,
            };
            resource.set(field.clone(), value, visible);
        }

        let scope = ProcessScope {
            transformer: self,
            definition,
            context,
            parent_field,
            parent_entity: parent_entity.as_ref(),
        };
        context.processors().process_resource(&scope, &mut resource)?;
        Ok(resource)
    }

    /// Let the definition, then the entity, adjust a fork of `context`
    fn adjusted_context<'c>(
        &self,
        definition: &ResourceDefinition,
        entity: &EntityRef,
        context: &'c Context,
    ) -> Result<Cow<'c, Context>> {
        let mut adjusted = None;
        if let Some(dynamic) = definition.dynamic_context() {
            adjusted = Some(dynamic.adjust_context(context.fork(), entity));
        }

        let borrowed = entity
            .try_borrow()
            .map_err(|_| Error::internal("entity is mutably borrowed"))?;
        if let Some(dynamic) = borrowed.dynamic_context() {
            let base = adjusted.take().unwrap_or_else(|| context.fork());
            adjusted = Some(dynamic.adjust_context(base, entity));
        }

        Ok(match adjusted {
            Some(context) => Cow::Owned(context),
            None => Cow::Borrowed(context),
        })
    }

    fn scalar_to_resource(&self, entity: &EntityRef, field: &Field, context: &Context) -> Result<Value> {
        let value = self.resolve_property(entity, field, context)?;
        if !field.is_array() {
            return self.encode(field, &value.to_value(), context);
        }

        let found = value.type_name();
        let items = value.into_items().ok_or_else(|| Error::IterableExpected {
            field: field.name().to_string(),
            found,
        })?;
        items
            .iter()
            .map(|item| self.encode(field, &item.to_value(), context))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    fn encode(&self, field: &Field, value: &Value, context: &Context) -> Result<Value> {
        match field.transformer() {
            Some(transformer) => transformer.to_resource_value(value, context),
            None => Ok(value.clone()),
        }
    }

    fn relationship_url(&self, entity: &EntityRef, relationship: &Relationship, context: &Context) -> Result<Option<String>> {
        relationship
            .url()
            .map(|template| {
                self.resolver(context)
                    .render_template(template, &PropertyValue::Entity(entity.clone()))
            })
            .transpose()
    }

    fn relationship_to_resource(
        &self,
        entity: &EntityRef,
        field: &Field,
        relationship: &Relationship,
        context: &Context,
        path: &str,
    ) -> Result<ResourceValue> {
        let url = self.relationship_url(entity, relationship, context)?;

        if !self.should_expand(relationship, context, path) {
            return Ok(ResourceValue::Link { url });
        }
        if self.depth_exceeded() {
            tracing::debug!(
                field = field.name(),
                depth = self.depth(),
                max_depth = self.config.max_depth,
                "maximum depth reached, rendering relationship as link"
            );
            return Ok(ResourceValue::Link { url });
        }

        let child_definition = self.registry.definition(relationship.definition())?;
        let child_context = context.child_context(relationship.expand_action());

        match relationship.cardinality() {
            Cardinality::Many => {
                let value = self.resolve_property(entity, field, context)?;
                let found = value.type_name();
                let items = value.into_items().ok_or_else(|| Error::IterableExpected {
                    field: field.name().to_string(),
                    found,
                })?;
                let entities = items
                    .into_iter()
                    .filter(|item| !item.is_null())
                    .map(|item| match item {
                        PropertyValue::Entity(child) => Ok(child),
                        other => Err(Error::InvalidEntity {
                            expected: child_definition.entity_type().to_string(),
                            actual: other.type_name(),
                        }),
                    })
                    .collect::<Result<Vec<_>>>()?;
                let children =
                    self.entities_to_collection(&child_definition, &entities, &child_context, None, Some(field))?;
                Ok(ResourceValue::Children { url, children })
            }
            Cardinality::One => {
                let child = match self.single_child(entity, field, context) {
                    Ok(Some(child)) => Some(Box::new(self.entity_to_resource(
                        &child_definition,
                        &child,
                        &child_context,
                        Some(field),
                    )?)),
                    Ok(None) => None,
                    Err(Error::InvalidProperty { property, entity_type }) => {
                        tracing::debug!(%property, %entity_type, "to-one relationship unresolved, treating as absent");
                        None
                    }
                    Err(err) => return Err(err),
                };
                Ok(ResourceValue::Child { url, child })
            }
        }
    }

    fn single_child(&self, entity: &EntityRef, field: &Field, context: &Context) -> Result<Option<EntityRef>> {
        match self.resolve_property(entity, field, context)? {
            PropertyValue::Entity(child) => Ok(Some(child)),
            value if value.is_null() => Ok(None),
            value => Err(Error::InvalidProperty {
                property: field.name().to_string(),
                entity_type: value.type_name(),
            }),
        }
    }
}

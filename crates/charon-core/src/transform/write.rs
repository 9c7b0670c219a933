//! Write direction: payloads to staged resources, staged resources to entities
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::stack::{ParentGuard, PathGuard};
use super::ResourceTransformer;
use crate::action::{Action, ActionKind, Cardinality};
use crate::context::Context;
use crate::entity::{is_truthy, write_property, EntityRef, PropertyValue};
use crate::error::{Error, Result};
use crate::factory::EntityFactory;
use crate::schema::{Field, Relationship, ResourceDefinition};
use crate::values::{
    lookup_display_path, Identifier, IdentifierCollection, Resource, ResourceCollection, ResourceSource,
    ResourceValue, RELATIONSHIP_ITEMS,
};
use serde_json::Value;
use std::sync::Arc;

fn require_write(context: &Context) -> Result<()> {
    if context.action().is_write() {
        return Ok(());
    }
    Err(Error::InvalidContextAction {
        action: context.action(),
        expected: ActionKind::Write,
    })
}

impl ResourceTransformer {
    /// Stage `payload` as a resource of `definition`
    ///
    /// Only fields writeable under the context are taken, plus identifier fields so
    /// that nested children can be matched and linked. Fields absent from the payload
    /// stay unset. The definition's validators run on the result.
    pub fn from_array(
        &self,
        definition: &Arc<ResourceDefinition>,
        payload: &Value,
        context: &Context,
    ) -> Result<Resource> {
        require_write(context)?;

        let mut resource = Resource::new(definition.clone(), Some(ResourceSource::Payload(payload.clone())));
        for field in definition.fields() {
            let _path = PathGuard::enter(&self.current_path, field.clone());
            let path = self.current_path();
            let writeable = self.should_include(field, context, &path);
            if !writeable && !field.is_identifier() {
                continue;
            }

            let value = match self.payload_value(payload, field, &path) {
                Ok(value) => value,
                Err(Error::ValueUndefined { .. }) => continue,
                Err(err) => return Err(err),
            };

            let value = match field.relationship() {
                None => ResourceValue::Scalar(value.clone()),
                Some(relationship) => self.relationship_from_payload(field, relationship, value, context)?,
            };
            resource.set(field.clone(), value, writeable);
        }

        for validator in definition.validators() {
            validator.validate(&resource, context)?;
        }
        Ok(resource)
    }

    fn payload_value<'p>(&self, payload: &'p Value, field: &Field, path: &str) -> Result<&'p Value> {
        lookup_display_path(payload, field.display_name()).ok_or_else(|| Error::ValueUndefined {
            path: path.to_string(),
        })
    }

    fn relationship_from_payload(
        &self,
        field: &Field,
        relationship: &Relationship,
        value: &Value,
        context: &Context,
    ) -> Result<ResourceValue> {
        let child_definition = self.registry.definition(relationship.definition())?;

        match relationship.cardinality() {
            Cardinality::One => {
                let child = match value {
                    Value::Object(_) => {
                        let child_context = self.input_child_context(context, relationship, &child_definition, value);
                        Some(Box::new(self.from_array(&child_definition, value, &child_context)?))
                    }
                    _ => None,
                };
                Ok(ResourceValue::Child { url: None, child })
            }
            Cardinality::Many => {
                let items = match value.get(RELATIONSHIP_ITEMS).unwrap_or(value) {
                    Value::Array(items) => items,
                    Value::Null => return Ok(ResourceValue::Children { url: None, children: ResourceCollection::new() }),
                    other => {
                        return Err(Error::IterableExpected {
                            field: field.name().to_string(),
                            found: PropertyValue::from(other.clone()).type_name(),
                        })
                    }
                };

                let mut children = ResourceCollection::new();
                for item in items {
                    if !item.is_object() {
                        tracing::warn!(field = field.name(), "skipping non-object child payload");
                        continue;
                    }
                    let child_context = self.input_child_context(context, relationship, &child_definition, item);
                    children.push(self.from_array(&child_definition, item, &child_context)?);
                }
                Ok(ResourceValue::Children { url: None, children })
            }
        }
    }

    /// Context for one embedded child payload
    ///
    /// The child is edited only when the parent is not being created, the
    /// relationship allows inline children, and the payload carries a truthy value
    /// for every identifier field of the child definition. Otherwise it is created.
    pub fn input_child_context(
        &self,
        context: &Context,
        relationship: &Relationship,
        child_definition: &ResourceDefinition,
        payload: &Value,
    ) -> Context {
        let mut identifiers = child_definition.identifiers().peekable();
        let identified = identifiers.peek().is_some()
            && identifiers.all(|field| {
                lookup_display_path(payload, field.display_name())
                    .map(is_truthy)
                    .unwrap_or(false)
            });

        let edit = context.action() != Action::Create && relationship.can_create_new_children() && identified;
        context.child_context(if edit { Action::Edit } else { Action::Create })
    }

    /// Stage every resource the context's input parsers find in `request`
    pub fn from_input(
        &self,
        definition: &Arc<ResourceDefinition>,
        request: &Value,
        context: &Context,
    ) -> Result<ResourceCollection> {
        context
            .input_parsers()
            .get_resources(self, definition, context, request)?
            .ok_or(Error::NoInputDataFound)
    }

    /// Identifiers the context's input parsers find in `request`
    pub fn identifiers_from_input(
        &self,
        definition: &Arc<ResourceDefinition>,
        request: &Value,
        context: &Context,
    ) -> Result<IdentifierCollection> {
        context
            .input_parsers()
            .get_identifiers(self, definition, context, request)?
            .ok_or(Error::NoInputDataFound)
    }

    /// Look up the entities addressed by `identifiers`, skipping those not found
    pub fn entities_from_identifiers(
        &self,
        definition: &ResourceDefinition,
        identifiers: &IdentifierCollection,
        factory: &dyn EntityFactory,
        context: &Context,
    ) -> Result<Vec<EntityRef>> {
        require_write(context)?;

        let mut entities = Vec::with_capacity(identifiers.len());
        for identifier in identifiers {
            match factory.resolve_from_identifier(definition.entity_type(), identifier, context)? {
                Some(entity) => entities.push(entity),
                None => tracing::debug!(
                    entity_type = definition.entity_type(),
                    identifier = %identifier.to_json(),
                    "identifier did not resolve"
                ),
            }
        }
        Ok(entities)
    }

    /// Apply a staged resource to `entity`, or to a new entity from `factory`
    pub fn to_entity(
        &self,
        resource: &Resource,
        definition: &Arc<ResourceDefinition>,
        factory: &dyn EntityFactory,
        context: &Context,
        entity: Option<EntityRef>,
    ) -> Result<EntityRef> {
        require_write(context)?;

        let entity = match entity {
            Some(entity) => entity,
            None => factory.create_entity(definition.entity_type(), context)?,
        };
        let _parent = ParentGuard::enter(&self.parents, entity.clone());

        for property in resource.properties() {
            let field = property.field();
            if !field.has_action(context.action()) {
                continue;
            }
            let _path = PathGuard::enter(&self.current_path, field.clone());

            match (property.value(), field.relationship()) {
                (ResourceValue::Scalar(value), None) => {
                    let decoded = self.decode(field, value, context)?;
                    self.write_field(&entity, field, PropertyValue::from(decoded), context)?;
                }
                (ResourceValue::Child { child, .. }, Some(relationship)) => {
                    self.child_to_entity(&entity, field, relationship, child.as_deref(), factory, context)?;
                }
                (ResourceValue::Children { children, .. }, Some(relationship)) => {
                    self.children_to_entity(&entity, field, relationship, children, factory, context)?;
                }
                _ => {}
            }
        }
        Ok(entity)
    }

    fn decode(&self, field: &Field, value: &Value, context: &Context) -> Result<Value> {
        let transformer = match field.transformer() {
            Some(transformer) => transformer,
            None => return Ok(value.clone()),
        };
        match value {
            Value::Array(items) if field.is_array() => items
                .iter()
                .map(|item| transformer.to_entity_value(item, context))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            _ => transformer.to_entity_value(value, context),
        }
    }

    /// Write `value` through the field's path: every segment but the last selects
    /// the owner, the last one is written on it
    fn write_field(&self, entity: &EntityRef, field: &Field, value: PropertyValue, context: &Context) -> Result<()> {
        let resolver = self.resolver(context);
        let target = PropertyValue::Entity(entity.clone());
        let owner = resolver.resolve_owner(&target, field.expression(), Some(field.name()))?;
        let segment = match field.expression().segments.last() {
            Some(segment) => segment,
            None => return Err(Error::definition(field.name(), "field has an empty path")),
        };

        let owner = match owner {
            PropertyValue::Entity(owner) => owner,
            other => {
                return Err(Error::InvalidProperty {
                    property: field.expression().source.clone(),
                    entity_type: other.type_name(),
                })
            }
        };
        let parameters = resolver.resolve_parameters(&segment.parameters, &target, Some(field.name()))?;
        write_property(&owner, &segment.name, &value, &parameters)
    }

    fn current_children(&self, entity: &EntityRef, field: &Field, context: &Context) -> Result<Vec<EntityRef>> {
        let value = self.resolve_property(entity, field, context)?;
        let found = value.type_name();
        let items = value.into_items().ok_or_else(|| Error::IterableExpected {
            field: field.name().to_string(),
            found,
        })?;
        Ok(items
            .into_iter()
            .filter_map(|item| item.as_entity().cloned())
            .collect())
    }

    /// Position of the entity among `candidates` that `identifier` addresses
    pub fn get_child_by_identifiers(
        &self,
        candidates: &[EntityRef],
        identifier: &Identifier,
        context: &Context,
    ) -> Result<Option<usize>> {
        for (index, candidate) in candidates.iter().enumerate() {
            if self.entity_equals(candidate, identifier, context)? {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// New or linked entity for a child that matched nothing on the parent
    fn detached_child(
        &self,
        entity: &EntityRef,
        field: &Field,
        relationship: &Relationship,
        child: &Resource,
        factory: &dyn EntityFactory,
        context: &Context,
    ) -> Result<Option<EntityRef>> {
        let child_definition = child.definition();
        if relationship.can_create_new_children() {
            let child_context = context.child_context(Action::Create);
            return self
                .to_entity(child, child_definition, factory, &child_context, None)
                .map(Some);
        }

        let identifier = child.identifier();
        if identifier.is_empty() {
            tracing::warn!(field = field.name(), "child without identifier cannot be linked");
            return Ok(None);
        }
        let linked = factory.resolve_linked_entity(entity, child_definition.entity_type(), &identifier, context)?;
        if linked.is_none() {
            tracing::warn!(
                field = field.name(),
                identifier = %identifier.to_json(),
                "linked entity not found"
            );
        }
        Ok(linked)
    }

    fn child_to_entity(
        &self,
        entity: &EntityRef,
        field: &Field,
        relationship: &Relationship,
        child: Option<&Resource>,
        factory: &dyn EntityFactory,
        context: &Context,
    ) -> Result<()> {
        let child = match child {
            Some(child) => child,
            None => return self.write_field(entity, field, PropertyValue::Null, context),
        };

        let current = match self.resolve_property(entity, field, context)? {
            PropertyValue::Entity(current) => Some(current),
            _ => None,
        };
        if let Some(current) = current {
            if self.entity_equals(&current, &child.identifier(), context)? {
                let child_context = context.child_context(Action::Edit);
                self.to_entity(child, child.definition(), factory, &child_context, Some(current))?;
                return Ok(());
            }
        }

        match self.detached_child(entity, field, relationship, child, factory, context)? {
            Some(replacement) => self.write_field(entity, field, PropertyValue::Entity(replacement), context),
            None => Ok(()),
        }
    }

    fn children_to_entity(
        &self,
        entity: &EntityRef,
        field: &Field,
        relationship: &Relationship,
        children: &ResourceCollection,
        factory: &dyn EntityFactory,
        context: &Context,
    ) -> Result<()> {
        let current = self.current_children(entity, field, context)?;
        let mut kept = vec![false; current.len()];
        let mut added = Vec::new();

        for child in children {
            let identifier = child.identifier();
            if let Some(index) = self.get_child_by_identifiers(&current, &identifier, context)? {
                let child_context = context.child_context(Action::Edit);
                self.to_entity(child, child.definition(), factory, &child_context, Some(current[index].clone()))?;
                kept[index] = true;
                continue;
            }
            if let Some(child_entity) = self.detached_child(entity, field, relationship, child, factory, context)? {
                added.push(child_entity);
            }
        }

        let list = current
            .into_iter()
            .zip(kept)
            .filter_map(|(child, kept)| kept.then_some(child))
            .chain(added)
            .map(PropertyValue::Entity)
            .collect();
        self.write_field(entity, field, PropertyValue::List(list), context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::DynamicEntity;
    use crate::factory::DynamicEntityFactory;
    use crate::schema::Registry;
    use serde_json::json;

    fn registry() -> Arc<Registry> {
        let registry = Registry::new();
        registry
            .register(
                ResourceDefinition::builder("Owner")
                    .field(Field::new("id").identifier().visible())
                    .field(Field::new("name").visible().writeable())
                    .field(Field::new("size").display_name("meta.size").writeable())
                    .field(Field::one("address", "Address").writeable().create_new_children())
                    .field(Field::many("tags", "Tag").writeable())
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
            .register(
                ResourceDefinition::builder("Address")
                    .field(Field::new("id").identifier())
                    .field(Field::new("street").writeable())
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
            .register(
                ResourceDefinition::builder("Tag")
                    .field(Field::new("id").identifier())
                    .field(Field::new("label").writeable())
                    .build()
                    .unwrap(),
            )
            .unwrap();
        Arc::new(registry)
    }

    #[test]
    fn test_from_array_requires_write_action() {
        let registry = registry();
        let transformer = ResourceTransformer::new(registry.clone());
        let definition = registry.definition("Owner").unwrap();
        let err = transformer
            .from_array(&definition, &json!({}), &Context::new(Action::View))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidContextAction { expected: ActionKind::Write, .. }));
    }

    #[test]
    fn test_missing_and_nested_values() {
        let registry = registry();
        let transformer = ResourceTransformer::new(registry.clone());
        let definition = registry.definition("Owner").unwrap();

        let resource = transformer
            .from_array(&definition, &json!({"meta": {"size": 3}}), &Context::new(Action::Create))
            .unwrap();
        assert!(resource.get("name").is_none());
        assert!(matches!(
            resource.get("size").map(|p| p.value()),
            Some(ResourceValue::Scalar(value)) if *value == json!(3)
        ));

        let resource = transformer
            .from_array(&definition, &json!({"meta": 7}), &Context::new(Action::Create))
            .unwrap();
        assert!(resource.get("size").is_none());
        assert_eq!(transformer.current_path(), "");
    }

    #[test]
    fn test_child_context_action() {
        let registry = registry();
        let transformer = ResourceTransformer::new(registry.clone());
        let owner = registry.definition("Owner").unwrap();
        let address = registry.definition("Address").unwrap();
        let relationship = owner.field("address").unwrap().relationship().unwrap();

        let edit = Context::new(Action::Edit);
        let child = transformer.input_child_context(&edit, relationship, &address, &json!({"id": 4}));
        assert_eq!(child.action(), Action::Edit);

        let child = transformer.input_child_context(&edit, relationship, &address, &json!({"street": "x"}));
        assert_eq!(child.action(), Action::Create);

        let child = transformer.input_child_context(&edit, relationship, &address, &json!({"id": 0}));
        assert_eq!(child.action(), Action::Create);

        let create = Context::new(Action::Create);
        let child = transformer.input_child_context(&create, relationship, &address, &json!({"id": 4}));
        assert_eq!(child.action(), Action::Create);

        let tags = owner.field("tags").unwrap().relationship().unwrap();
        let tag = registry.definition("Tag").unwrap();
        let child = transformer.input_child_context(&edit, tags, &tag, &json!({"id": 4}));
        assert_eq!(child.action(), Action::Create);
    }

    #[test]
    fn test_to_entity_writes_scalars_and_relationships() {
        let registry = registry();
        let transformer = ResourceTransformer::new(registry.clone());
        let definition = registry.definition("Owner").unwrap();
        let factory = DynamicEntityFactory::new();
        let red = DynamicEntity::new("Tag").with("id", json!(1)).with("label", json!("red")).into_ref();
        factory.store(red.clone());

        let context = Context::new(Action::Create);
        let payload = json!({
            "id": 9,
            "name": "Ann",
            "address": {"street": "Main"},
            "tags": {"items": [{"id": 1}, {"id": 2}]}
        });
        let resource = transformer.from_array(&definition, &payload, &context).unwrap();
        let entity = transformer
            .to_entity(&resource, &definition, &factory, &context, None)
            .unwrap();

        let dumped = DynamicEntity::to_json(&entity);
        assert_eq!(dumped["name"], json!("Ann"));
        assert_eq!(dumped["address"]["street"], json!("Main"));
        assert_eq!(dumped["tags"], json!([{"@type": "Tag", "id": 1, "label": "red"}]));
        assert!(dumped.get("id").is_none());
        assert_eq!(transformer.depth(), 0);
    }

    #[test]
    fn test_edit_keeps_matched_children_and_removes_others() {
        let registry = registry();
        let transformer = ResourceTransformer::new(registry.clone());
        let definition = registry.definition("Owner").unwrap();
        let factory = DynamicEntityFactory::new();

        let one = DynamicEntity::new("Tag").with("id", json!(1)).with("label", json!("a")).into_ref();
        let two = DynamicEntity::new("Tag").with("id", json!(2)).with("label", json!("b")).into_ref();
        let owner = DynamicEntity::new("Owner")
            .with("tags", PropertyValue::List(vec![one.clone().into(), two.into()]))
            .into_ref();

        let context = Context::new(Action::Edit);
        let resource = transformer
            .from_array(&definition, &json!({"tags": {"items": [{"id": "1", "label": "z"}]}}), &context)
            .unwrap();
        transformer
            .to_entity(&resource, &definition, &factory, &context, Some(owner.clone()))
            .unwrap();

        let dumped = DynamicEntity::to_json(&owner);
        assert_eq!(dumped["tags"], json!([{"@type": "Tag", "id": 1, "label": "z"}]));
    }

    #[test]
    fn test_entities_from_identifiers_skips_unknown() {
        let registry = registry();
        let transformer = ResourceTransformer::new(registry.clone());
        let definition = registry.definition("Tag").unwrap();
        let factory = DynamicEntityFactory::new();
        factory.store(DynamicEntity::new("Tag").with("id", json!(1)).into_ref());

        let identifiers: IdentifierCollection = [json!({"id": 1}), json!({"id": 5})]
            .iter()
            .map(|payload| Identifier::from_payload(&definition, payload))
            .collect();
        let found = transformer
            .entities_from_identifiers(&definition, &identifiers, &factory, &Context::new(Action::Edit))
            .unwrap();
        assert_eq!(found.len(), 1);

        assert!(transformer
            .entities_from_identifiers(&definition, &identifiers, &factory, &Context::new(Action::View))
            .is_err());
    }
}

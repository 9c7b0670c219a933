//! Map-backed entities

use super::{entity_ref, Entity, EntityRef, PropertyValue};
use crate::action::Cardinality;
use crate::error::Result;
use crate::schema::{FieldKind, Registry, ResourceDefinition};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::rc::Rc;

/// An entity whose properties are all plain attributes
///
/// Any attribute can be written, so a `DynamicEntity` accepts whatever a payload
/// carries. Useful for tooling and tests where no domain types exist.
#[derive(Debug, Clone)]
pub struct DynamicEntity {
    entity_type: String,
    attributes: BTreeMap<String, PropertyValue>,
}

impl DynamicEntity {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute assignment
    pub fn with(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.attributes.get(name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<PropertyValue>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.attributes.iter()
    }

    pub fn into_ref(self) -> EntityRef {
        entity_ref(self)
    }

    /// Build an entity graph from a JSON document
    ///
    /// Keys naming a relationship field of `definition` become child entities of the
    /// related definition's entity type; every other key becomes a scalar attribute.
    pub fn hydrate(definition: &ResourceDefinition, document: &Value, registry: &Registry) -> Result<EntityRef> {
        let mut entity = DynamicEntity::new(definition.entity_type());
        let object = match document {
            Value::Object(object) => object,
            _ => return Ok(entity.into_ref()),
        };

        for (key, value) in object {
            let relationship = definition
                .fields()
                .iter()
                .filter(|field| field.attribute_name() == Some(key.as_str()))
                .find_map(|field| match field.kind() {
                    FieldKind::Relationship(relationship) => Some(relationship),
                    FieldKind::Scalar => None,
                });

            let property = match relationship {
                None => PropertyValue::from(value.clone()),
                Some(relationship) => {
                    let child = registry.definition(relationship.definition())?;
                    match (relationship.cardinality(), value) {
                        (_, Value::Null) => PropertyValue::Null,
                        (Cardinality::One, Value::Object(_)) => {
                            PropertyValue::Entity(Self::hydrate(&child, value, registry)?)
                        }
                        (Cardinality::Many, Value::Array(items)) => PropertyValue::List(
                            items
                                .iter()
                                .map(|item| match item {
                                    Value::Object(_) => Self::hydrate(&child, item, registry).map(PropertyValue::Entity),
                                    other => Ok(PropertyValue::from(other.clone())),
                                })
                                .collect::<Result<Vec<_>>>()?,
                        ),
                        (_, other) => PropertyValue::from(other.clone()),
                    }
                }
            };
            entity.attributes.insert(key.clone(), property);
        }

        Ok(entity.into_ref())
    }

    /// Dump an entity graph as JSON. Entities already on the current branch print as null.
    pub fn to_json(entity: &EntityRef) -> Value {
        let mut branch = Vec::new();
        dump_entity(entity, &mut branch)
    }
}

fn dump_entity(entity: &EntityRef, branch: &mut Vec<*const ()>) -> Value {
    let key = Rc::as_ptr(entity) as *const ();
    if branch.contains(&key) {
        return Value::Null;
    }
    let borrowed = match entity.try_borrow() {
        Ok(borrowed) => borrowed,
        Err(_) => return Value::Null,
    };

    branch.push(key);
    let mut object = Map::new();
    object.insert("@type".to_string(), Value::String(borrowed.entity_type().to_string()));
    for name in borrowed.attribute_names() {
        let value = borrowed.attribute(&name).unwrap_or_default();
        object.insert(name, dump_value(&value, branch));
    }
    branch.pop();
    Value::Object(object)
}

fn dump_value(value: &PropertyValue, branch: &mut Vec<*const ()>) -> Value {
    match value {
        PropertyValue::Entity(entity) => dump_entity(entity, branch),
        PropertyValue::List(items) => Value::Array(items.iter().map(|item| dump_value(item, branch)).collect()),
        other => other.to_value(),
    }
}

impl Entity for DynamicEntity {
    fn entity_type(&self) -> &str {
        &self.entity_type
    }

    fn attribute(&self, name: &str) -> Option<PropertyValue> {
        self.attributes.get(name).cloned()
    }

    fn attribute_names(&self) -> Vec<String> {
        self.attributes.keys().cloned().collect()
    }

    fn set_attribute(&mut self, name: &str, value: &PropertyValue) -> bool {
        self.attributes.insert(name.to_string(), value.clone());
        true
    }
}

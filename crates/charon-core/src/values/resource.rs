//! A single resource

use super::{
    insert_display_path, Identifier, ResourceCollection, COLLECTION_META, RELATIONSHIP_ITEMS, RELATIONSHIP_LINK,
};
use crate::context::Context;
use crate::entity::EntityRef;
use crate::error::Result;
use crate::schema::{Field, ResourceDefinition};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Value held by one resource property
#[derive(Debug, Clone)]
pub enum ResourceValue {
    /// Wire value (read) or raw payload value (write)
    Scalar(Value),
    /// Relationship represented by its URL only
    Link { url: Option<String> },
    /// To-one relationship with its embedded child, if any
    Child {
        url: Option<String>,
        child: Option<Box<Resource>>,
    },
    /// To-many relationship with its embedded children
    Children {
        url: Option<String>,
        children: ResourceCollection,
    },
}

impl ResourceValue {
    pub fn to_json(&self) -> Value {
        match self {
            ResourceValue::Scalar(value) => value.clone(),
            ResourceValue::Link { url } | ResourceValue::Child { url, child: None } => link(url),
            ResourceValue::Child { child: Some(child), .. } => child.to_json(),
            ResourceValue::Children { url, children } => {
                let mut map = Map::new();
                map.insert(
                    RELATIONSHIP_ITEMS.to_string(),
                    Value::Array(children.iter().map(Resource::to_json).collect()),
                );
                if let Some(url) = url {
                    map.insert(RELATIONSHIP_LINK.to_string(), Value::String(url.clone()));
                }
                Value::Object(map)
            }
        }
    }
}

fn link(url: &Option<String>) -> Value {
    let mut map = Map::new();
    map.insert(
        RELATIONSHIP_LINK.to_string(),
        url.clone().map(Value::String).unwrap_or(Value::Null),
    );
    Value::Object(map)
}

/// A field together with its value and visibility
#[derive(Debug, Clone)]
pub struct ResourceProperty {
    field: Arc<Field>,
    value: ResourceValue,
    visible: bool,
}

impl ResourceProperty {
    pub fn field(&self) -> &Arc<Field> {
        &self.field
    }

    pub fn value(&self) -> &ResourceValue {
        &self.value
    }

    /// Hidden properties are kept for sorting but never serialized
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Where a resource came from. Never serialized.
#[derive(Clone)]
pub enum ResourceSource {
    Entity(EntityRef),
    Payload(Value),
}

/// One entity rendered through a definition, or one payload staged for writing
#[derive(Clone)]
pub struct Resource {
    definition: Arc<ResourceDefinition>,
    properties: Vec<ResourceProperty>,
    source: Option<ResourceSource>,
    meta: Map<String, Value>,
}

impl Resource {
    pub fn new(definition: Arc<ResourceDefinition>, source: Option<ResourceSource>) -> Self {
        Self {
            definition,
            properties: Vec::new(),
            source,
            meta: Map::new(),
        }
    }

    pub fn definition(&self) -> &Arc<ResourceDefinition> {
        &self.definition
    }

    /// Set the value of `field`, replacing an earlier one
    pub fn set(&mut self, field: Arc<Field>, value: ResourceValue, visible: bool) {
        match self
            .properties
            .iter_mut()
            .find(|property| property.field.name() == field.name())
        {
            Some(property) => {
                property.value = value;
                property.visible = visible;
            }
            None => self.properties.push(ResourceProperty { field, value, visible }),
        }
    }

    /// Property by entity-side field name
    pub fn get(&self, name: &str) -> Option<&ResourceProperty> {
        self.properties.iter().find(|property| property.field.name() == name)
    }

    pub fn get_by_display_name(&self, display_name: &str) -> Option<&ResourceProperty> {
        self.properties
            .iter()
            .find(|property| property.field.display_name() == display_name)
    }

    pub fn properties(&self) -> &[ResourceProperty] {
        &self.properties
    }

    pub fn visible_properties(&self) -> impl Iterator<Item = &ResourceProperty> {
        self.properties.iter().filter(|property| property.visible)
    }

    pub fn source(&self) -> Option<&ResourceSource> {
        self.source.as_ref()
    }

    pub fn source_entity(&self) -> Option<&EntityRef> {
        match &self.source {
            Some(ResourceSource::Entity(entity)) => Some(entity),
            _ => None,
        }
    }

    /// Open metadata for processors, serialized under `meta` when not empty
    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.meta
    }

    /// Identifier built from the scalar identifier properties of this resource
    pub fn identifier(&self) -> Identifier {
        let mut identifier = Identifier::new();
        for field in self.definition.identifiers() {
            if let Some(ResourceValue::Scalar(value)) = self.get(field.name()).map(ResourceProperty::value) {
                if !value.is_null() {
                    identifier.push(field.clone(), value.clone());
                }
            }
        }
        identifier
    }

    /// Run the definition's validators, then validate embedded children
    pub fn validate(&self, context: &Context) -> Result<()> {
        for validator in self.definition.validators() {
            validator.validate(self, context)?;
        }
        for property in &self.properties {
            match &property.value {
                ResourceValue::Child { child: Some(child), .. } => child.validate(context)?,
                ResourceValue::Children { children, .. } => {
                    for child in children.iter() {
                        child.validate(context)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Wire representation: visible properties keyed by display name
    ///
    /// Processor metadata merges into a `meta` object built from display names;
    /// keys a field already wrote there are kept.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for property in self.visible_properties() {
            insert_display_path(&mut map, property.field.display_name(), property.value.to_json());
        }
        if self.meta.is_empty() {
            return Value::Object(map);
        }

        match map.get_mut(COLLECTION_META) {
            Some(Value::Object(existing)) => {
                for (key, value) in &self.meta {
                    existing.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
            Some(_) => {
                tracing::debug!(
                    definition = self.definition.name(),
                    "field value occupies the meta key, dropping processor metadata"
                );
            }
            None => {
                map.insert(COLLECTION_META.to_string(), Value::Object(self.meta.clone()));
            }
        }
        Value::Object(map)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("definition", &self.definition.name())
            .field("properties", &self.properties)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn definition() -> Arc<ResourceDefinition> {
        Arc::new(
            ResourceDefinition::builder("Pet")
                .field(Field::new("id").identifier().visible().sortable())
                .field(Field::new("size").display_name("meta.size").visible())
                .field(Field::one("category", "Category").visible())
                .field(Field::many("photos", "Photo").visible())
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_to_json_shapes() {
        let definition = definition();
        let field = |name: &str| definition.field(name).unwrap().clone();

        let mut resource = Resource::new(definition.clone(), None);
        resource.set(field("id"), ResourceValue::Scalar(json!(1)), true);
        resource.set(field("size"), ResourceValue::Scalar(json!("xl")), true);
        resource.set(
            field("category"),
            ResourceValue::Link {
                url: Some("/categories/5".to_string()),
            },
            true,
        );
        resource.set(
            field("photos"),
            ResourceValue::Children {
                url: Some("/pets/1/photos".to_string()),
                children: ResourceCollection::new(),
            },
            true,
        );

        assert_eq!(
            resource.to_json(),
            json!({
                "id": 1,
                "meta": {"size": "xl"},
                "category": {"link": "/categories/5"},
                "photos": {"items": [], "link": "/pets/1/photos"}
            })
        );
    }

    #[test]
    fn test_processor_meta_merges_with_field_meta() {
        let definition = definition();
        let mut resource = Resource::new(definition.clone(), None);
        resource.set(definition.field("id").unwrap().clone(), ResourceValue::Scalar(json!(1)), true);
        resource.set(definition.field("size").unwrap().clone(), ResourceValue::Scalar(json!("xl")), true);
        resource.meta_mut().insert("count".to_string(), json!(3));
        resource.meta_mut().insert("size".to_string(), json!("ignored"));

        assert_eq!(
            resource.to_json(),
            json!({"id": 1, "meta": {"size": "xl", "count": 3}})
        );

        let mut bare = Resource::new(definition.clone(), None);
        bare.meta_mut().insert("count".to_string(), json!(0));
        assert_eq!(bare.to_json(), json!({"meta": {"count": 0}}));
    }

    #[test]
    fn test_hidden_properties_are_not_serialized() {
        let definition = definition();
        let mut resource = Resource::new(definition.clone(), None);
        resource.set(definition.field("id").unwrap().clone(), ResourceValue::Scalar(json!(1)), false);
        assert_eq!(resource.to_json(), json!({}));
        assert_eq!(resource.properties().len(), 1);
        assert_eq!(resource.identifier().len(), 1);
    }

    #[test]
    fn test_set_replaces_existing_value() {
        let definition = definition();
        let id = definition.field("id").unwrap().clone();
        let mut resource = Resource::new(definition, None);
        resource.set(id.clone(), ResourceValue::Scalar(json!(1)), true);
        resource.set(id, ResourceValue::Scalar(json!(2)), true);
        assert_eq!(resource.properties().len(), 1);
        assert_eq!(resource.to_json(), json!({"id": 2}));
    }

    #[test]
    fn test_absent_child_serializes_as_link() {
        let value = ResourceValue::Child { url: None, child: None };
        assert_eq!(value.to_json(), json!({"link": null}));
    }
}

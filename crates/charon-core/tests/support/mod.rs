//! Shared petstore fixture for integration tests

#![allow(dead_code)]

use charon_core::entity::{Accessors, Entity, EntityRef, PropertyValue};
use charon_core::value_transformer::{DateTimeTransformer, MappingTransformer};
use charon_core::{entity_ref, Action, DynamicEntity, Field, Registry, ResourceDefinition};
use serde_json::{json, Value};
use std::sync::{Arc, OnceLock};

/// A typed entity reading and writing through an accessor table
#[derive(Debug, Default)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub status: i64,
    pub born: i64,
    pub weight: i64,
    pub category: Option<EntityRef>,
    pub tags: Vec<EntityRef>,
    pub photos: Vec<EntityRef>,
}

fn entities(value: &PropertyValue) -> Vec<EntityRef> {
    value
        .clone()
        .into_items()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| item.as_entity().cloned())
        .collect()
}

fn list(items: &[EntityRef]) -> PropertyValue {
    PropertyValue::List(items.iter().cloned().map(PropertyValue::Entity).collect())
}

fn pet_accessors() -> &'static Accessors<Pet> {
    static ACCESSORS: OnceLock<Accessors<Pet>> = OnceLock::new();
    ACCESSORS.get_or_init(|| {
        Accessors::new()
            .getter("id", |pet: &Pet, _| json!(pet.id).into())
            .getter("name", |pet: &Pet, _| PropertyValue::string(pet.name.clone()))
            .getter("status", |pet: &Pet, _| json!(pet.status).into())
            .getter("born", |pet: &Pet, _| json!(pet.born).into())
            .getter("weight", |pet: &Pet, _| json!(pet.weight).into())
            .getter("category", |pet: &Pet, _| pet.category.clone().into())
            .getter("tags", |pet: &Pet, _| list(&pet.tags))
            .getter("photos", |pet: &Pet, _| list(&pet.photos))
            .getter("nameIn", |pet: &Pet, params| {
                let case = params.first().map(PropertyValue::to_display_string).unwrap_or_default();
                match case.as_str() {
                    "upper" => PropertyValue::string(pet.name.to_uppercase()),
                    _ => PropertyValue::string(pet.name.to_lowercase()),
                }
            })
            .predicate("heavy", |pet: &Pet, _| pet.weight > 20)
            .setter("name", |pet: &mut Pet, value, _| pet.name = value.to_display_string())
            .setter("status", |pet: &mut Pet, value, _| {
                pet.status = value.as_scalar().and_then(Value::as_i64).unwrap_or_default()
            })
            .setter("born", |pet: &mut Pet, value, _| {
                pet.born = value.as_scalar().and_then(Value::as_i64).unwrap_or_default()
            })
            .setter("category", |pet: &mut Pet, value, _| pet.category = value.as_entity().cloned())
            .setter("tags", |pet: &mut Pet, value, _| pet.tags = entities(value))
            .setter("photos", |pet: &mut Pet, value, _| pet.photos = entities(value))
    })
}

impl Entity for Pet {
    fn entity_type(&self) -> &str {
        "Pet"
    }

    fn getter(&self, name: &str, params: &[PropertyValue]) -> Option<PropertyValue> {
        pet_accessors().get(self, name, params)
    }

    fn predicate(&self, name: &str, params: &[PropertyValue]) -> Option<bool> {
        pet_accessors().is(self, name, params)
    }

    fn setter(&mut self, name: &str, value: &PropertyValue, params: &[PropertyValue]) -> bool {
        pet_accessors().set(self, name, value, params)
    }
}

pub fn category(id: i64, name: &str) -> EntityRef {
    DynamicEntity::new("Category")
        .with("id", json!(id))
        .with("name", json!(name))
        .into_ref()
}

pub fn tag(id: i64, label: &str) -> EntityRef {
    DynamicEntity::new("Tag")
        .with("id", json!(id))
        .with("label", json!(label))
        .into_ref()
}

pub fn photo(id: i64, url: &str) -> EntityRef {
    DynamicEntity::new("Photo")
        .with("id", json!(id))
        .with("url", json!(url))
        .into_ref()
}

/// Rex the dog: category 5, tags 1 and 2, no photos
pub fn rex() -> Pet {
    Pet {
        id: 1,
        name: "Rex".to_string(),
        status: 1,
        born: 1_700_000_000,
        weight: 30,
        category: Some(category(5, "Dog")),
        tags: vec![tag(1, "good"), tag(2, "loud")],
        photos: Vec::new(),
    }
}

pub fn rex_ref() -> EntityRef {
    entity_ref(rex())
}

/// Registry with the Pet, Category, Tag and Photo definitions
pub fn petstore() -> Arc<Registry> {
    let registry = Registry::new();

    registry
        .register(
            ResourceDefinition::builder("Pet")
                .field(Field::new("id").identifier().visible().sortable().filterable())
                .field(Field::new("name").visible().writeable().searchable().sortable())
                .field(
                    Field::new("status")
                        .visible()
                        .writeable()
                        .filterable()
                        .transformer(Arc::new(MappingTransformer::parse("1=available,2=sold").unwrap())),
                )
                .field(
                    Field::new("born")
                        .visible()
                        .writeable()
                        .transformer(Arc::new(DateTimeTransformer::rfc3339())),
                )
                .field(Field::new("weight").sortable())
                .field(Field::new("heavy").visible_in(&[Action::View]))
                .field(
                    Field::new("nameIn|{context.case?}")
                        .display_name("label")
                        .visible_in(&[Action::View]),
                )
                .field(
                    Field::one("category", "Category")
                        .visible()
                        .writeable()
                        .url("/categories/{model.category.id?}")
                        .expanded(&[Action::View])
                        .create_new_children(),
                )
                .field(
                    Field::many("tags", "Tag")
                        .visible()
                        .writeable()
                        .url("/pets/{model.id}/tags"),
                )
                .field(
                    Field::many("photos", "Photo")
                        .visible()
                        .writeable()
                        .url("/pets/{model.id}/photos")
                        .create_new_children(),
                )
                .build()
                .unwrap(),
        )
        .unwrap();

    registry
        .register(
            ResourceDefinition::builder("Category")
                .field(Field::new("id").identifier().visible())
                .field(Field::new("name").visible().writeable())
                .build()
                .unwrap(),
        )
        .unwrap();

    registry
        .register(
            ResourceDefinition::builder("Tag")
                .field(Field::new("id").identifier().visible())
                .field(Field::new("label").visible().writeable())
                .build()
                .unwrap(),
        )
        .unwrap();

    registry
        .register(
            ResourceDefinition::builder("Photo")
                .field(Field::new("id").identifier().visible())
                .field(Field::new("url").visible().writeable())
                .build()
                .unwrap(),
        )
        .unwrap();

    Arc::new(registry)
}

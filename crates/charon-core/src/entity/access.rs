//! Reading and writing named properties on entities
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::{EntityRef, PropertyValue};
use crate::error::{Error, Result};
use serde_json::Value;

/// Read `name` from `target`
///
/// Entities are asked for a getter, then a predicate, then an attribute. JSON objects
/// are indexed by key. Anything else, and any unknown property, reads as null.
pub fn read_property(target: &PropertyValue, name: &str, params: &[PropertyValue]) -> PropertyValue {
    match target {
        PropertyValue::Entity(entity) => read_entity_property(entity, name, params),
        PropertyValue::Scalar(Value::Object(map)) => map
            .get(name)
            .cloned()
            .map(PropertyValue::from)
            .unwrap_or_default(),
        _ => PropertyValue::Null,
    }
}

fn read_entity_property(entity: &EntityRef, name: &str, params: &[PropertyValue]) -> PropertyValue {
    let entity = match entity.try_borrow() {
        Ok(entity) => entity,
        Err(_) => {
            tracing::warn!(property = name, "entity is mutably borrowed, reading as null");
            return PropertyValue::Null;
        }
    };

    if let Some(value) = entity.getter(name, params) {
        return value;
    }
    if let Some(flag) = entity.predicate(name, params) {
        return PropertyValue::Scalar(Value::Bool(flag));
    }
    entity.attribute(name).unwrap_or_default()
}

/// Write `value` to `name` on `entity`: setter first, then attribute
pub fn write_property(
    entity: &EntityRef,
    name: &str,
    value: &PropertyValue,
    params: &[PropertyValue],
) -> Result<()> {
    let mut entity = entity
        .try_borrow_mut()
        .map_err(|_| Error::internal(format!("entity is already borrowed while writing {}", name)))?;

    if entity.setter(name, value, params) || entity.set_attribute(name, value) {
        return Ok(());
    }

    Err(Error::InvalidProperty {
        property: name.to_string(),
        entity_type: entity.entity_type().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{entity_ref, Entity};
    use serde_json::json;

    #[derive(Debug, Default)]
    struct Lamp {
        on: bool,
        label: String,
        watts: i64,
    }

    impl Entity for Lamp {
        fn entity_type(&self) -> &str {
            "Lamp"
        }

        fn getter(&self, name: &str, params: &[PropertyValue]) -> Option<PropertyValue> {
            match name {
                "label" => {
                    let suffix = params.first().map(|p| p.to_display_string()).unwrap_or_default();
                    Some(PropertyValue::string(format!("{}{}", self.label, suffix)))
                }
                _ => None,
            }
        }

        fn predicate(&self, name: &str, _params: &[PropertyValue]) -> Option<bool> {
            (name == "on").then_some(self.on)
        }

        fn attribute(&self, name: &str) -> Option<PropertyValue> {
            match name {
                "watts" => Some(PropertyValue::Scalar(json!(self.watts))),
                "label" => Some(PropertyValue::string("attribute label")),
                _ => None,
            }
        }

        fn setter(&mut self, name: &str, value: &PropertyValue, _params: &[PropertyValue]) -> bool {
            if name == "label" {
                self.label = value.to_display_string().to_uppercase();
                return true;
            }
            false
        }

        fn set_attribute(&mut self, name: &str, value: &PropertyValue) -> bool {
            match name {
                "watts" => {
                    self.watts = value.to_value().as_i64().unwrap_or_default();
                    true
                }
                "label" => {
                    self.label = value.to_display_string();
                    true
                }
                _ => false,
            }
        }
    }

    #[test]
    fn test_getter_takes_precedence_over_attribute() {
        let lamp = entity_ref(Lamp {
            label: "desk".into(),
            ..Default::default()
        });
        let target = PropertyValue::Entity(lamp);
        let value = read_property(&target, "label", &[PropertyValue::string("!")]);
        assert_eq!(value.to_display_string(), "desk!");
    }

    #[test]
    fn test_predicate_and_attribute_fallbacks() {
        let target = PropertyValue::Entity(entity_ref(Lamp {
            on: true,
            watts: 40,
            ..Default::default()
        }));
        assert_eq!(read_property(&target, "on", &[]).to_value(), json!(true));
        assert_eq!(read_property(&target, "watts", &[]).to_value(), json!(40));
        assert!(read_property(&target, "missing", &[]).is_null());
    }

    #[test]
    fn test_read_from_json_object_and_scalars() {
        let target = PropertyValue::Scalar(json!({"a": {"b": 1}}));
        assert_eq!(read_property(&target, "a", &[]).to_value(), json!({"b": 1}));
        assert!(read_property(&PropertyValue::Scalar(json!(3)), "a", &[]).is_null());
        assert!(read_property(&PropertyValue::Null, "a", &[]).is_null());
    }

    #[test]
    fn test_setter_takes_precedence_over_attribute() {
        let lamp = entity_ref(Lamp::default());
        write_property(&lamp, "label", &PropertyValue::string("hall"), &[]).unwrap();
        write_property(&lamp, "watts", &PropertyValue::Scalar(json!(60)), &[]).unwrap();
        let target = PropertyValue::Entity(lamp);
        assert_eq!(read_property(&target, "label", &[]).to_display_string(), "HALL");
        assert_eq!(read_property(&target, "watts", &[]).to_value(), json!(60));
    }

    #[test]
    fn test_unknown_write_is_invalid_property() {
        let lamp = entity_ref(Lamp::default());
        let err = write_property(&lamp, "color", &PropertyValue::Null, &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidProperty { ref property, .. } if property == "color"));
    }
}

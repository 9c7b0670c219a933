//! Value transformers
//!
//! A value transformer is a codec between the value an entity stores and the value a
//! resource carries on the wire. Transformers are attached to fields and must be
//! inverses of each other on the values they accept.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod built_in;

pub use built_in::{BooleanTransformer, DateTimeTransformer, MappingTransformer};

use crate::context::Context;
use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Bidirectional codec for a single field value
pub trait ValueTransformer: fmt::Debug + Send + Sync {
    /// Entity value to wire value
    fn to_resource_value(&self, value: &Value, context: &Context) -> Result<Value>;

    /// Wire value to entity value
    fn to_entity_value(&self, value: &Value, context: &Context) -> Result<Value>;
}

/// Build a transformer from its spec string (`name` or `name|argument`)
///
/// Known names: `datetime`, `boolean`, `map`.
pub fn from_spec(spec: &str) -> Result<Arc<dyn ValueTransformer>> {
    let (name, argument) = match spec.split_once('|') {
        Some((name, argument)) => (name.trim(), Some(argument.trim())),
        None => (spec.trim(), None),
    };

    match name {
        "datetime" => Ok(Arc::new(match argument {
            Some(format) => DateTimeTransformer::with_format(format),
            None => DateTimeTransformer::rfc3339(),
        })),
        "boolean" => Ok(Arc::new(BooleanTransformer)),
        "map" => {
            let argument = argument.ok_or_else(|| Error::InvalidTransformer {
                name: spec.to_string(),
                message: "map requires a list of entity=wire pairs".to_string(),
            })?;
            Ok(Arc::new(MappingTransformer::parse(argument).map_err(|message| {
                Error::InvalidTransformer {
                    name: spec.to_string(),
                    message,
                }
            })?))
        }
        _ => Err(Error::InvalidTransformer {
            name: spec.to_string(),
            message: "unknown transformer".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use serde_json::json;

    #[test]
    fn test_from_spec() {
        assert!(from_spec("datetime").is_ok());
        assert!(from_spec("datetime|%Y-%m-%d").is_ok());
        assert!(from_spec("boolean").is_ok());
        let map = from_spec("map|1=active, 0=inactive").unwrap();
        assert_eq!(map.to_resource_value(&json!(1), &Context::new(Action::View)).unwrap(), json!("active"));
    }

    #[test]
    fn test_unknown_spec() {
        let err = from_spec("money").unwrap_err();
        assert!(matches!(err, Error::InvalidTransformer { .. }));
        assert!(from_spec("map").is_err());
    }
}

//! Values flowing through the property access protocol

use super::EntityRef;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// A value read from, or written to, an entity
///
/// Scalars are plain JSON values. Entities are shared references so the same child can
/// appear under several parents, and cycles are representable.
#[derive(Clone, Default)]
pub enum PropertyValue {
    #[default]
    Null,
    Scalar(Value),
    Entity(EntityRef),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    pub fn string(value: impl Into<String>) -> Self {
        PropertyValue::Scalar(Value::String(value.into()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null | PropertyValue::Scalar(Value::Null))
    }

    pub fn as_entity(&self) -> Option<&EntityRef> {
        match self {
            PropertyValue::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            PropertyValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Scalar view of this value. Entities have no scalar form and become null.
    pub fn to_value(&self) -> Value {
        match self {
            PropertyValue::Null | PropertyValue::Entity(_) => Value::Null,
            PropertyValue::Scalar(value) => value.clone(),
            PropertyValue::List(items) => Value::Array(items.iter().map(Self::to_value).collect()),
        }
    }

    /// Elements of a sequence value. Null counts as the empty sequence; any other
    /// non-sequence yields `None`.
    pub fn into_items(self) -> Option<Vec<PropertyValue>> {
        match self {
            PropertyValue::Null | PropertyValue::Scalar(Value::Null) => Some(Vec::new()),
            PropertyValue::List(items) => Some(items),
            PropertyValue::Scalar(Value::Array(items)) => {
                Some(items.into_iter().map(PropertyValue::from).collect())
            }
            _ => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            PropertyValue::Null => false,
            PropertyValue::Scalar(value) => is_truthy(value),
            PropertyValue::Entity(_) => true,
            PropertyValue::List(items) => !items.is_empty(),
        }
    }

    /// Short name of the value's shape, used in error messages
    pub fn type_name(&self) -> String {
        match self {
            PropertyValue::Null => "null".to_string(),
            PropertyValue::Scalar(value) => match value {
                Value::Null => "null",
                Value::Bool(_) => "boolean",
                Value::Number(_) => "number",
                Value::String(_) => "string",
                Value::Array(_) => "array",
                Value::Object(_) => "object",
            }
            .to_string(),
            PropertyValue::Entity(entity) => match entity.try_borrow() {
                Ok(entity) => entity.entity_type().to_string(),
                Err(_) => "entity".to_string(),
            },
            PropertyValue::List(_) => "list".to_string(),
        }
    }

    /// Text used when the value is spliced into a URL or method name
    pub fn to_display_string(&self) -> String {
        match self {
            PropertyValue::Scalar(value) => scalar_to_string(value),
            PropertyValue::List(items) => items
                .iter()
                .map(Self::to_display_string)
                .collect::<Vec<_>>()
                .join(","),
            PropertyValue::Null | PropertyValue::Entity(_) => String::new(),
        }
    }

    /// Loose equality: entities by identity, scalars per [`loose_eq`]
    pub fn loose_eq(&self, other: &PropertyValue) -> bool {
        match (self, other) {
            (PropertyValue::Entity(a), PropertyValue::Entity(b)) => Rc::ptr_eq(a, b),
            (PropertyValue::Entity(_), _) | (_, PropertyValue::Entity(_)) => false,
            _ => loose_eq(&self.to_value(), &other.to_value()),
        }
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => PropertyValue::Null,
            other => PropertyValue::Scalar(other),
        }
    }
}

impl From<EntityRef> for PropertyValue {
    fn from(entity: EntityRef) -> Self {
        PropertyValue::Entity(entity)
    }
}

impl From<Option<EntityRef>> for PropertyValue {
    fn from(entity: Option<EntityRef>) -> Self {
        entity.map(PropertyValue::Entity).unwrap_or_default()
    }
}

impl fmt::Debug for PropertyValue {
    // Entity graphs may be cyclic, so entities print by type only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => write!(f, "Null"),
            PropertyValue::Scalar(value) => write!(f, "Scalar({})", value),
            PropertyValue::Entity(_) => write!(f, "Entity({})", self.type_name()),
            PropertyValue::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Truthiness of a JSON value: null, false, zero, `""`, `"0"` and empty containers are false
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Loose comparison of two JSON values
///
/// Numbers compare numerically, also against numeric strings. Booleans compare by
/// truthiness. Null equals null, `false` and `""`. Everything else compares strictly.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, other) | (other, Value::Null) => {
            matches!(other, Value::Bool(false)) || other.as_str() == Some("")
        }
        (Value::Bool(x), other) | (other, Value::Bool(x)) => *x == is_truthy(other),
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            match (n.as_f64(), s.trim().parse::<f64>()) {
                (Some(x), Ok(y)) => x == y,
                _ => false,
            }
        }
        (Value::String(x), Value::String(y)) => {
            if x == y {
                return true;
            }
            match (x.trim().parse::<f64>(), y.trim().parse::<f64>()) {
                (Ok(x), Ok(y)) => x == y,
                _ => false,
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| loose_eq(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, v)| y.get(k).map(|w| loose_eq(v, w)).unwrap_or(false))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_loose_eq_numbers_and_strings() {
        assert!(loose_eq(&json!(1), &json!("1")));
        assert!(loose_eq(&json!("1.0"), &json!(1)));
        assert!(loose_eq(&json!(2.0), &json!(2)));
        assert!(!loose_eq(&json!(1), &json!("one")));
        assert!(!loose_eq(&json!("abc"), &json!("abd")));
    }

    #[test]
    fn test_loose_eq_null_and_bool() {
        assert!(loose_eq(&json!(null), &json!(false)));
        assert!(loose_eq(&json!(null), &json!("")));
        assert!(!loose_eq(&json!(null), &json!("0")));
        assert!(loose_eq(&json!(true), &json!("yes")));
        assert!(loose_eq(&json!(false), &json!(0)));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!("0")));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(is_truthy(&json!(12)));
        assert!(is_truthy(&json!("a")));
    }

    #[test]
    fn test_into_items() {
        assert_eq!(PropertyValue::Null.into_items().map(|i| i.len()), Some(0));
        let items = PropertyValue::Scalar(json!(["a", "b"])).into_items().unwrap();
        assert_eq!(items.len(), 2);
        assert!(PropertyValue::Scalar(json!("a")).into_items().is_none());
    }

    #[test]
    fn test_display_string() {
        assert_eq!(PropertyValue::Scalar(json!(12)).to_display_string(), "12");
        assert_eq!(PropertyValue::string("abc").to_display_string(), "abc");
        assert_eq!(PropertyValue::Null.to_display_string(), "");
    }
}

//! Built-in value transformers

use super::ValueTransformer;
use crate::context::Context;
use crate::entity::{is_truthy, loose_eq};
use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

/// Unix timestamp (seconds) on the entity, formatted date string on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct DateTimeTransformer {
    format: Option<String>,
}

impl DateTimeTransformer {
    /// RFC 3339 wire format
    pub fn rfc3339() -> Self {
        Self { format: None }
    }

    /// Custom `chrono` format string. Date-only formats read back as midnight UTC.
    pub fn with_format(format: &str) -> Self {
        Self {
            format: Some(format.to_string()),
        }
    }

    fn format(&self, datetime: DateTime<Utc>) -> String {
        match &self.format {
            Some(format) => datetime.format(format).to_string(),
            None => datetime.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    fn parse(&self, text: &str) -> Result<DateTime<Utc>> {
        let failure = |message: String| Error::Transformation {
            value: text.to_string(),
            message,
        };

        match &self.format {
            None => DateTime::parse_from_rfc3339(text)
                .map(|datetime| datetime.with_timezone(&Utc))
                .map_err(|e| failure(e.to_string())),
            Some(format) => {
                if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
                    return Ok(Utc.from_utc_datetime(&datetime));
                }
                let date = NaiveDate::parse_from_str(text, format).map_err(|e| failure(e.to_string()))?;
                let midnight = date
                    .and_hms_opt(0, 0, 0)
                    .ok_or_else(|| failure("invalid date".to_string()))?;
                Ok(Utc.from_utc_datetime(&midnight))
            }
        }
    }
}

impl ValueTransformer for DateTimeTransformer {
    fn to_resource_value(&self, value: &Value, _context: &Context) -> Result<Value> {
        let timestamp = match value {
            Value::Null => return Ok(Value::Null),
            Value::Number(n) => n.as_i64().ok_or_else(|| Error::Transformation {
                value: n.to_string(),
                message: "timestamp must be an integer".to_string(),
            })?,
            Value::String(text) => return Ok(Value::String(self.format(self.parse(text)?))),
            other => {
                return Err(Error::Transformation {
                    value: other.to_string(),
                    message: "expected a timestamp".to_string(),
                })
            }
        };

        let datetime = Utc
            .timestamp_opt(timestamp, 0)
            .single()
            .ok_or_else(|| Error::Transformation {
                value: timestamp.to_string(),
                message: "timestamp out of range".to_string(),
            })?;
        Ok(Value::String(self.format(datetime)))
    }

    fn to_entity_value(&self, value: &Value, _context: &Context) -> Result<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::String(text) if text.is_empty() => Ok(Value::Null),
            Value::String(text) => Ok(Value::from(self.parse(text)?.timestamp())),
            Value::Number(_) => Ok(value.clone()),
            other => Err(Error::Transformation {
                value: other.to_string(),
                message: "expected a date string".to_string(),
            }),
        }
    }
}

/// Truthy entity values become JSON booleans, and back
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BooleanTransformer;

impl ValueTransformer for BooleanTransformer {
    fn to_resource_value(&self, value: &Value, _context: &Context) -> Result<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            other => Ok(Value::Bool(is_truthy(other))),
        }
    }

    fn to_entity_value(&self, value: &Value, _context: &Context) -> Result<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::String(text) => match text.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "off" | "0" | "" => Ok(Value::Bool(false)),
                _ => Err(Error::Transformation {
                    value: text.clone(),
                    message: "not a boolean".to_string(),
                }),
            },
            other => Ok(Value::Bool(is_truthy(other))),
        }
    }
}

/// Enumerated values mapped one-to-one between entity and wire
#[derive(Debug, Clone, PartialEq)]
pub struct MappingTransformer {
    pairs: Vec<(Value, Value)>,
}

impl MappingTransformer {
    pub fn new(pairs: Vec<(Value, Value)>) -> Self {
        Self { pairs }
    }

    /// Parse `entity=wire` pairs separated by commas. Numeric entity values become numbers.
    pub fn parse(spec: &str) -> std::result::Result<Self, String> {
        let pairs = spec
            .split(',')
            .filter(|pair| !pair.trim().is_empty())
            .map(|pair| {
                let (entity, wire) = pair
                    .split_once('=')
                    .ok_or_else(|| format!("'{}' is not an entity=wire pair", pair.trim()))?;
                let entity = entity.trim();
                let entity_value = entity
                    .parse::<i64>()
                    .map(Value::from)
                    .unwrap_or_else(|_| Value::String(entity.to_string()));
                Ok((entity_value, Value::String(wire.trim().to_string())))
            })
            .collect::<std::result::Result<Vec<_>, String>>()?;

        if pairs.is_empty() {
            return Err("empty mapping".to_string());
        }
        Ok(Self { pairs })
    }
}

impl ValueTransformer for MappingTransformer {
    fn to_resource_value(&self, value: &Value, _context: &Context) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        self.pairs
            .iter()
            .find(|(entity, _)| loose_eq(entity, value))
            .map(|(_, wire)| wire.clone())
            .ok_or_else(|| Error::Transformation {
                value: value.to_string(),
                message: "no mapping for entity value".to_string(),
            })
    }

    fn to_entity_value(&self, value: &Value, _context: &Context) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        self.pairs
            .iter()
            .find(|(_, wire)| wire == value)
            .map(|(entity, _)| entity.clone())
            .ok_or_else(|| Error::Transformation {
                value: value.to_string(),
                message: "no mapping for wire value".to_string(),
            })
    }
}

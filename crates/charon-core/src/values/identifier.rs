//! Identifiers: the values that address one entity within a collection

use super::lookup_display_path;
use crate::context::Context;
use crate::entity::loose_eq;
use crate::error::Result;
use crate::schema::{Field, ResourceDefinition};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Ordered (field, wire value) pairs
#[derive(Debug, Clone, Default)]
pub struct Identifier {
    values: Vec<(Arc<Field>, Value)>,
}

impl Identifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: Arc<Field>, value: Value) {
        self.values.push((field, value));
    }

    pub fn with(mut self, field: Arc<Field>, value: Value) -> Self {
        self.push(field, value);
        self
    }

    /// Collect the identifier fields of `definition` present in `payload`
    pub fn from_payload(definition: &ResourceDefinition, payload: &Value) -> Self {
        let values = definition
            .identifiers()
            .filter_map(|field| {
                lookup_display_path(payload, field.display_name())
                    .filter(|value| !value.is_null())
                    .map(|value| (field.clone(), value.clone()))
            })
            .collect();
        Self { values }
    }

    pub fn values(&self) -> &[(Arc<Field>, Value)] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Wire value for the field with `display_name`
    pub fn get(&self, display_name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(field, _)| field.display_name() == display_name)
            .map(|(_, value)| value)
    }

    /// Values decoded through each field's value transformer
    pub fn entity_values(&self, context: &Context) -> Result<Vec<(Arc<Field>, Value)>> {
        self.values
            .iter()
            .map(|(field, value)| {
                let decoded = match field.transformer() {
                    Some(transformer) => transformer.to_entity_value(value, context)?,
                    None => value.clone(),
                };
                Ok((field.clone(), decoded))
            })
            .collect()
    }

    /// Field-wise equality after decoding both sides
    ///
    /// Identifiers without fields never match.
    pub fn matches(&self, other: &Identifier, context: &Context) -> Result<bool> {
        if self.is_empty() || self.len() != other.len() {
            return Ok(false);
        }
        let ours = self.entity_values(context)?;
        let theirs = other.entity_values(context)?;
        Ok(ours.iter().all(|(field, value)| {
            theirs
                .iter()
                .find(|(other_field, _)| other_field.name() == field.name())
                .map(|(_, other_value)| loose_eq(value, other_value))
                .unwrap_or(false)
        }))
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (field, value) in &self.values {
            super::insert_display_path(&mut map, field.display_name(), value.clone());
        }
        Value::Object(map)
    }
}

/// Identifiers read from a request
#[derive(Debug, Clone, Default)]
pub struct IdentifierCollection {
    identifiers: Vec<Identifier>,
}

impl IdentifierCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, identifier: Identifier) {
        self.identifiers.push(identifier);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Identifier> {
        self.identifiers.iter()
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

impl FromIterator<Identifier> for IdentifierCollection {
    fn from_iter<I: IntoIterator<Item = Identifier>>(iter: I) -> Self {
        Self {
            identifiers: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a IdentifierCollection {
    type Item = &'a Identifier;
    type IntoIter = std::slice::Iter<'a, Identifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.identifiers.iter()
    }
}

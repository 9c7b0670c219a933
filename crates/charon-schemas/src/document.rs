//! Resource definition documents
//!
//! The serde model of a definitions file. A document maps definition names to their
//! fields; relationships name their child definition, which may live in the same
//! document or in another one loaded alongside it.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use charon_core::{Action, Cardinality};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A parsed definitions file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefinitionDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub definitions: BTreeMap<String, DefinitionSpec>,
}

impl DefinitionDocument {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }
}

/// One resource definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefinitionSpec {
    /// Entity type the definition renders; defaults to the definition name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(default)]
    pub any_entity: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

/// One field of a definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    /// Path expression naming the entity property
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(default)]
    pub identifier: bool,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub writeable: bool,
    /// Additional actions the field participates in
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub filterable: bool,
    #[serde(default)]
    pub searchable: bool,
    #[serde(default)]
    pub array: bool,
    /// Value transformer spec, `name` or `name|argument`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<RelationshipSpec>,
}

impl FieldSpec {
    pub fn display_name(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.name)
    }

    /// Explicit transformer, or the one implied by the value type
    pub fn transformer_spec(&self) -> Option<&str> {
        self.transformer
            .as_deref()
            .or_else(|| self.value_type.and_then(ValueType::default_transformer))
    }
}

/// Declared wire type of a scalar field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Integer,
    Number,
    Boolean,
    Datetime,
    Object,
}

impl ValueType {
    fn default_transformer(self) -> Option<&'static str> {
        match self {
            ValueType::Datetime => Some("datetime"),
            ValueType::Boolean => Some("boolean"),
            _ => None,
        }
    }
}

/// Relationship details of a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationshipSpec {
    pub definition: String,
    #[serde(default = "default_cardinality")]
    pub cardinality: Cardinality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expand: Vec<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand_action: Option<Action>,
    /// Payloads may create new children inline
    #[serde(default)]
    pub create: bool,
}

fn default_cardinality() -> Cardinality {
    Cardinality::One
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_yaml_document() {
        let yaml = r#"
definitions:
  Pet:
    fields:
      - { name: id, type: integer, identifier: true, visible: true }
      - { name: born, type: datetime, visible: true }
      - name: category
        relationship: { definition: Category, expand: [view], create: true }
"#;
        let document: DefinitionDocument = serde_yaml::from_str(yaml).unwrap();
        let pet = &document.definitions["Pet"];
        assert_eq!(pet.fields.len(), 3);
        assert_eq!(pet.fields[1].transformer_spec(), Some("datetime"));
        assert_eq!(pet.fields[0].transformer_spec(), None);

        let relationship = pet.fields[2].relationship.as_ref().unwrap();
        assert_eq!(relationship.cardinality, Cardinality::One);
        assert_eq!(relationship.expand, vec![Action::View]);
        assert!(relationship.create);
    }

    #[test]
    fn test_explicit_transformer_wins_over_type() {
        let field = FieldSpec {
            name: "born".to_string(),
            value_type: Some(ValueType::Datetime),
            transformer: Some("datetime|%Y-%m-%d".to_string()),
            ..FieldSpec::default()
        };
        assert_eq!(field.transformer_spec(), Some("datetime|%Y-%m-%d"));
        assert_eq!(field.display_name(), "born");
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let yaml = "definitions:\n  Pet:\n    fields:\n      - { name: id, hidden: true }\n";
        assert!(serde_yaml::from_str::<DefinitionDocument>(yaml).is_err());
    }
}

//! JSON Schema for definition documents
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::Violation;
use crate::loader::error::{LoaderError, LoaderResult};
use serde_json::{json, Value};
use std::fmt;

/// The draft 2020-12 schema every definition document must satisfy
pub fn document_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "Charon resource definitions",
        "type": "object",
        "required": ["definitions"],
        "additionalProperties": false,
        "properties": {
            "version": { "type": "string" },
            "definitions": {
                "type": "object",
                "minProperties": 1,
                "additionalProperties": { "$ref": "#/$defs/definition" }
            }
        },
        "$defs": {
            "action": {
                "enum": ["index", "view", "create", "edit", "destroy", "identifier"]
            },
            "actions": {
                "type": "array",
                "items": { "$ref": "#/$defs/action" },
                "uniqueItems": true
            },
            "definition": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "entity": { "type": "string", "minLength": 1 },
                    "any_entity": { "type": "boolean" },
                    "description": { "type": "string" },
                    "fields": {
                        "type": "array",
                        "items": { "$ref": "#/$defs/field" }
                    }
                }
            },
            "field": {
                "type": "object",
                "required": ["name"],
                "additionalProperties": false,
                "properties": {
                    "name": { "type": "string", "minLength": 1 },
                    "display": { "type": "string", "minLength": 1 },
                    "type": {
                        "enum": ["string", "integer", "number", "boolean", "datetime", "object"]
                    },
                    "identifier": { "type": "boolean" },
                    "visible": { "type": "boolean" },
                    "writeable": { "type": "boolean" },
                    "actions": { "$ref": "#/$defs/actions" },
                    "sortable": { "type": "boolean" },
                    "filterable": { "type": "boolean" },
                    "searchable": { "type": "boolean" },
                    "array": { "type": "boolean" },
                    "transformer": { "type": "string", "minLength": 1 },
                    "description": { "type": "string" },
                    "relationship": { "$ref": "#/$defs/relationship" }
                }
            },
            "relationship": {
                "type": "object",
                "required": ["definition"],
                "additionalProperties": false,
                "properties": {
                    "definition": { "type": "string", "minLength": 1 },
                    "cardinality": { "enum": ["one", "many"] },
                    "url": { "type": "string" },
                    "expand": { "$ref": "#/$defs/actions" },
                    "expand_action": { "$ref": "#/$defs/action" },
                    "create": { "type": "boolean" }
                }
            }
        }
    })
}

/// Compiled [`document_schema`]
pub struct StructuralValidator {
    validator: jsonschema::Validator,
}

impl fmt::Debug for StructuralValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuralValidator").finish_non_exhaustive()
    }
}

impl StructuralValidator {
    pub fn new() -> LoaderResult<Self> {
        let validator = jsonschema::validator_for(&document_schema()).map_err(|e| {
            LoaderError::SchemaCompile {
                reason: e.to_string(),
            }
        })?;
        Ok(Self { validator })
    }

    pub fn is_valid(&self, document: &Value) -> bool {
        self.validator.is_valid(document)
    }

    /// Every schema violation in the document
    pub fn validate(&self, document: &Value) -> Vec<Violation> {
        self.validator
            .iter_errors(document)
            .map(|error| {
                let path = pointer_to_path(&error.instance_path.to_string());
                Violation::new(path, "schema", error.to_string())
            })
            .collect()
    }
}

/// `/definitions/Pet/fields/1/display` to `definitions.Pet.fields[1].display`
fn pointer_to_path(pointer: &str) -> String {
    let mut path = String::new();
    for segment in pointer.split('/').filter(|s| !s.is_empty()) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        if segment.chars().all(|c| c.is_ascii_digit()) {
            path.push_str(&format!("[{}]", segment));
        } else {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(&segment);
        }
    }
    path
}

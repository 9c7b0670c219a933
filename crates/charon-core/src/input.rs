//! Input parser chain
//!
//! Parsers turn a raw request into staged resources or identifiers. The transformer
//! asks each parser of the context's chain in order and takes the first non-empty
//! answer.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::context::Context;
use crate::error::{Error, Result};
use crate::schema::ResourceDefinition;
use crate::transform::ResourceTransformer;
use crate::values::{Identifier, IdentifierCollection, ResourceCollection, RELATIONSHIP_ITEMS};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub trait InputParser {
    fn get_identifiers(
        &self,
        transformer: &ResourceTransformer,
        definition: &Arc<ResourceDefinition>,
        context: &Context,
        request: &Value,
    ) -> Result<Option<IdentifierCollection>>;

    fn get_resources(
        &self,
        transformer: &ResourceTransformer,
        definition: &Arc<ResourceDefinition>,
        context: &Context,
        request: &Value,
    ) -> Result<Option<ResourceCollection>>;
}

/// Ordered parser chain
#[derive(Clone, Default)]
pub struct InputParserCollection {
    parsers: Vec<Arc<dyn InputParser>>,
}

impl InputParserCollection {
    pub fn push(&mut self, parser: Arc<dyn InputParser>) {
        self.parsers.push(parser);
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    fn check_exists(&self) -> Result<()> {
        if self.parsers.is_empty() {
            return Err(Error::NoInputParsersSet);
        }
        Ok(())
    }

    /// Identifiers from the first parser that finds any
    pub fn get_identifiers(
        &self,
        transformer: &ResourceTransformer,
        definition: &Arc<ResourceDefinition>,
        context: &Context,
        request: &Value,
    ) -> Result<Option<IdentifierCollection>> {
        self.check_exists()?;
        for parser in &self.parsers {
            if let Some(identifiers) = parser.get_identifiers(transformer, definition, context, request)? {
                if !identifiers.is_empty() {
                    return Ok(Some(identifiers));
                }
            }
        }
        Ok(None)
    }

    /// Resources from the first parser that finds any
    pub fn get_resources(
        &self,
        transformer: &ResourceTransformer,
        definition: &Arc<ResourceDefinition>,
        context: &Context,
        request: &Value,
    ) -> Result<Option<ResourceCollection>> {
        self.check_exists()?;
        for parser in &self.parsers {
            if let Some(resources) = parser.get_resources(transformer, definition, context, request)? {
                if !resources.is_empty() {
                    return Ok(Some(resources));
                }
            }
        }
        Ok(None)
    }
}

impl fmt::Debug for InputParserCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InputParserCollection({})", self.parsers.len())
    }
}

/// Reads a JSON body: an `{"items": [...]}` envelope or a single object
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBodyInputParser;

impl JsonBodyInputParser {
    fn objects(request: &Value) -> Vec<&Value> {
        match request.get(RELATIONSHIP_ITEMS) {
            Some(Value::Array(items)) => items.iter().filter(|item| item.is_object()).collect(),
            _ if request.is_object() => vec![request],
            _ => Vec::new(),
        }
    }
}

impl InputParser for JsonBodyInputParser {
    fn get_identifiers(
        &self,
        _transformer: &ResourceTransformer,
        definition: &Arc<ResourceDefinition>,
        _context: &Context,
        request: &Value,
    ) -> Result<Option<IdentifierCollection>> {
        let identifiers: IdentifierCollection = Self::objects(request)
            .into_iter()
            .map(|object| Identifier::from_payload(definition, object))
            .filter(|identifier| !identifier.is_empty())
            .collect();
        Ok((!identifiers.is_empty()).then_some(identifiers))
    }

    fn get_resources(
        &self,
        transformer: &ResourceTransformer,
        definition: &Arc<ResourceDefinition>,
        context: &Context,
        request: &Value,
    ) -> Result<Option<ResourceCollection>> {
        let objects = Self::objects(request);
        if objects.is_empty() {
            return Ok(None);
        }
        let resources = objects
            .into_iter()
            .map(|object| transformer.from_array(definition, object, context))
            .collect::<Result<ResourceCollection>>()?;
        Ok(Some(resources))
    }
}

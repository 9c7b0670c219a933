//! Error types for the Charon core library
//!
//! Every failure the engine can report is a variant of [`Error`]. Variants carry the
//! names involved (field, parameter, entity type) so callers can build useful messages
//! without parsing strings.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::action::{Action, ActionKind};
use thiserror::Error;

/// Main error type for Charon operations
#[derive(Error, Debug)]
pub enum Error {
    /// Entity does not match the type a resource definition expects
    #[error("Invalid entity: expected {expected}, {actual} given")]
    InvalidEntity { expected: String, actual: String },

    /// Operation requires a read context but got a write one, or vice versa
    #[error("Invalid context action: {action} is not a {expected} action")]
    InvalidContextAction { action: Action, expected: ActionKind },

    /// A property could not be read or written on an entity
    #[error("Invalid property: {property} on {entity_type}")]
    InvalidProperty {
        property: String,
        entity_type: String,
    },

    /// A required path parameter resolved to nothing
    #[error("Field {} requires a parameter {parameter} to be set in the context, but no such parameter was defined", field.as_deref().unwrap_or("<unknown>"))]
    VariableNotFoundInContext {
        field: Option<String>,
        parameter: String,
    },

    /// A payload did not contain a value for the requested path
    #[error("Value undefined: no input value found at {path}")]
    ValueUndefined { path: String },

    /// An array or to-many field produced something that is not a sequence
    #[error("Iterable expected: {field} produced {found}")]
    IterableExpected { field: String, found: String },

    /// No parser in the input chain produced data
    #[error("No input data found")]
    NoInputDataFound,

    /// The input chain is empty
    #[error("No input parsers set")]
    NoInputParsersSet,

    /// Malformed path expression or unknown token namespace
    #[error("Invalid expression '{expression}': {message}")]
    InvalidExpression { expression: String, message: String },

    /// Resource definition could not be built or looked up
    #[error("Invalid resource definition {definition}: {message}")]
    InvalidResourceDefinition { definition: String, message: String },

    /// Value transformer spec could not be resolved
    #[error("Invalid transformer '{name}': {message}")]
    InvalidTransformer { name: String, message: String },

    /// A value transformer rejected its input
    #[error("Transformation failed for {value}: {message}")]
    Transformation { value: String, message: String },

    /// A resource failed validation
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn expression(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidExpression {
            expression: expression.into(),
            message: message.into(),
        }
    }

    pub(crate) fn definition(definition: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidResourceDefinition {
            definition: definition.into(),
            message: message.into(),
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        Error::Internal {
            source: anyhow::anyhow!(message.clone()),
            message,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}

//! Resource validation hook
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::context::Context;
use crate::error::{Error, Result};
use crate::values::Resource;

/// Inspects a staged resource and rejects it with [`Error::Validation`]
pub trait ResourceValidator: Send + Sync {
    fn validate(&self, resource: &Resource, context: &Context) -> Result<()>;
}

impl<F> ResourceValidator for F
where
    F: Fn(&Resource, &Context) -> Result<()> + Send + Sync,
{
    fn validate(&self, resource: &Resource, context: &Context) -> Result<()> {
        self(resource, context)
    }
}

/// Shorthand for a validation failure on `field`
pub fn invalid(field: &str, message: impl Into<String>) -> Error {
    Error::Validation {
        field: field.to_string(),
        message: message.into(),
    }
}

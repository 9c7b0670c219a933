//! Validation of definition documents
//!
//! Two passes: [`StructuralValidator`] checks the raw document against an embedded JSON
//! Schema, then [`check_rules`] applies the rules a schema cannot express (unique names,
//! resolvable references, parseable expressions).
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod rules;
pub mod structural;

pub use rules::{check_rules, is_valid_display_name};
pub use structural::{document_schema, StructuralValidator};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single rule violation with the document location it applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Dotted location inside the document, e.g. `definitions.Pet.fields[1].display`
    pub path: String,
    pub rule: String,
    pub message: String,
}

impl Violation {
    pub fn new<P, R, M>(path: P, rule: R, message: M) -> Self
    where
        P: Into<String>,
        R: Into<String>,
        M: Into<String>,
    {
        Self {
            path: path.into(),
            rule: rule.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "[{}] {}", self.rule, self.message)
        } else {
            write!(f, "{}: [{}] {}", self.path, self.rule, self.message)
        }
    }
}

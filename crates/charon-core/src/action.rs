//! Actions and relationship cardinality
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The operation a transformation is performed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Listing a collection
    Index,
    /// Showing a single resource
    View,
    /// Creating a new entity from a payload
    Create,
    /// Editing an existing entity from a payload
    Edit,
    /// Removing an entity
    Destroy,
    /// Rendering only the identifying fields of a resource
    Identifier,
}

/// Read or write classification of an [`Action`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Read,
    Write,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Index,
        Action::View,
        Action::Create,
        Action::Edit,
        Action::Destroy,
        Action::Identifier,
    ];

    /// Actions in which a field marked `visible` participates
    pub const READABLE: [Action; 2] = [Action::Index, Action::View];

    /// Actions in which a field marked `writeable` participates
    pub const WRITEABLE: [Action; 2] = [Action::Create, Action::Edit];

    pub fn is_read(self) -> bool {
        matches!(self, Action::Index | Action::View | Action::Identifier)
    }

    pub fn is_write(self) -> bool {
        matches!(self, Action::Create | Action::Edit)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Index => "index",
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Destroy => "destroy",
            Action::Identifier => "identifier",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .iter()
            .copied()
            .find(|action| action.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown action '{}'", s))
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Read => write!(f, "read"),
            ActionKind::Write => write!(f, "write"),
        }
    }
}

/// How many children a relationship holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Many,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::One => write!(f, "one"),
            Cardinality::Many => write!(f, "many"),
        }
    }
}

impl FromStr for Cardinality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "one" => Ok(Cardinality::One),
            "many" => Ok(Cardinality::Many),
            other => Err(format!("unknown cardinality '{}'", other)),
        }
    }
}

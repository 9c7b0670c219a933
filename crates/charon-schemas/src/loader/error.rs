//! Error types for definition loading
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::validation::Violation;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse YAML file '{path}': {source}")]
    YamlParseError {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to parse JSON file '{path}': {source}")]
    JsonParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Unsupported file format for '{path}'. Expected .yaml, .yml, or .json")]
    UnsupportedFormat { path: PathBuf },

    /// The document failed structural or domain validation
    #[error("Invalid definition document '{path}': {summary}")]
    InvalidDocument {
        path: PathBuf,
        summary: String,
        violations: Vec<Violation>,
    },

    /// The embedded document schema could not be compiled
    #[error("Failed to compile the definition document schema: {reason}")]
    SchemaCompile { reason: String },

    #[error("Failed to register definitions from '{path}': {source}")]
    Registry {
        path: PathBuf,
        source: charon_core::Error,
    },
}

impl From<std::io::Error> for LoaderError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::from("<unknown>"),
            source: error,
        }
    }
}

impl LoaderError {
    pub fn io_error(path: PathBuf, error: std::io::Error) -> Self {
        Self::IoError {
            path,
            source: error,
        }
    }

    pub fn yaml_parse_error(path: PathBuf, error: serde_yaml::Error) -> Self {
        Self::YamlParseError {
            path,
            source: error,
        }
    }

    pub fn json_parse_error(path: PathBuf, error: serde_json::Error) -> Self {
        Self::JsonParseError {
            path,
            source: error,
        }
    }

    pub fn unsupported_format(path: PathBuf) -> Self {
        Self::UnsupportedFormat { path }
    }

    /// Create a validation error; the summary names the first violation and the count
    pub fn invalid_document(path: PathBuf, violations: Vec<Violation>) -> Self {
        let summary = match violations.as_slice() {
            [] => "no violations reported".to_string(),
            [only] => only.to_string(),
            [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
        };
        Self::InvalidDocument {
            path,
            summary,
            violations,
        }
    }

    pub fn registry(path: PathBuf, error: charon_core::Error) -> Self {
        Self::Registry {
            path,
            source: error,
        }
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::IoError { path, .. } => Some(path),
            Self::YamlParseError { path, .. } => Some(path),
            Self::JsonParseError { path, .. } => Some(path),
            Self::UnsupportedFormat { path } => Some(path),
            Self::InvalidDocument { path, .. } => Some(path),
            Self::Registry { path, .. } => Some(path),
            Self::SchemaCompile { .. } => None,
        }
    }

    /// Violations behind an [`LoaderError::InvalidDocument`], empty otherwise
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::InvalidDocument { violations, .. } => violations,
            _ => &[],
        }
    }
}

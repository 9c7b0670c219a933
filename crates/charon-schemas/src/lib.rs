//! Charon Schemas - declarative resource definitions
//!
//! Resource definitions can be written as YAML or JSON documents instead of Rust
//! builders. This crate loads such documents, validates them and compiles them into
//! a [`charon_core::Registry`].
//!
//! ## Quick Start
//!
//! ```rust
//! use charon_schemas::{compile, DefinitionLoader, Format};
//! use charon_core::Registry;
//! use std::path::Path;
//!
//! let yaml = r#"
//! definitions:
//!   Pet:
//!     fields:
//!       - { name: id, type: integer, identifier: true, visible: true }
//!       - { name: name, display: pet-name, visible: true, writeable: true }
//!       - name: category
//!         relationship: { definition: Category, url: "/categories/{model.category.id?}", expand: [view] }
//!   Category:
//!     fields:
//!       - { name: id, identifier: true, visible: true }
//! "#;
//!
//! let loader = DefinitionLoader::new().unwrap();
//! let document = loader.parse_str(yaml, Format::Yaml, Path::new("<inline>")).unwrap();
//!
//! let registry = Registry::new();
//! compile::register(&document, &registry).unwrap();
//! assert!(registry.definition("Pet").unwrap().field_by_display_name("pet-name").is_some());
//! ```
//!
//! ## Validation
//!
//! Documents are checked in two passes. The structural pass validates the raw
//! document against a JSON Schema (draft 2020-12, see
//! [`validation::document_schema`]). The rule pass then checks:
//! - field names and display names are unique per definition
//! - display names are dotted identifiers
//! - relationship targets exist
//! - transformer specs resolve
//! - field names and url templates parse as expressions
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod compile;
pub mod document;
pub mod loader;
pub mod validation;

pub use document::{DefinitionDocument, DefinitionSpec, FieldSpec, RelationshipSpec, ValueType};
pub use loader::{DefinitionLoader, Format, LoadedDocument, LoaderConfig, LoaderError, LoaderResult};
pub use validation::{StructuralValidator, Violation};

use charon_core::Registry;
use std::path::PathBuf;

/// Load `paths` into a fresh registry
pub fn load_registry(paths: &[PathBuf]) -> LoaderResult<Registry> {
    let registry = Registry::new();
    DefinitionLoader::new()?.load_into(paths, &registry)?;
    Ok(registry)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

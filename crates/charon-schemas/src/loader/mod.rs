//! Loading definition documents from disk
//!
//! - YAML and JSON parsing, chosen by file extension
//! - structural validation against the embedded JSON Schema
//! - domain rules across a set of documents
//! - an in-memory cache keyed by path and modification time
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use charon_schemas::loader::DefinitionLoader;
//! use charon_core::Registry;
//! use std::path::PathBuf;
//!
//! let mut loader = DefinitionLoader::new()?;
//! let registry = Registry::new();
//! let names = loader.load_into(&[PathBuf::from("petstore.yaml")], &registry)?;
//! println!("registered: {}", names.join(", "));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod cache;
pub mod definition_loader;
pub mod error;
pub mod parser;

pub use cache::{CacheConfig, CacheEntry, DocumentCache};
pub use definition_loader::{DefinitionLoader, LoadedDocument, LoaderConfig};
pub use error::{LoaderError, LoaderResult};
pub use parser::{DocumentParser, Format};

//! Resource definitions, fields and the registry that holds them
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod definition;
pub mod field;
pub mod registry;

pub use definition::{ResourceDefinition, ResourceDefinitionBuilder, SharedDynamicContext};
pub use field::{Field, FieldBuilder, FieldKind, Relationship};
pub use registry::{DefinitionFactory, Registry};

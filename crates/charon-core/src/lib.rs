//! Charon Core - bidirectional mapping between entity graphs and resources
//!
//! This crate renders in-memory entity graphs into wire-level resources according to
//! declarative resource definitions, and parses inbound payloads back onto entities.
//!
//! # Main Components
//!
//! - **Schema**: [`ResourceDefinition`]s made of [`Field`]s, memoized in a [`Registry`]
//! - **Path Expressions**: how a field reaches its value on an entity
//! - **Transformer**: [`ResourceTransformer`], the read and write directions
//! - **Collaborators**: entity factories, processors, input parsers, value transformers
//!
//! # Example
//!
//! ```
//! use charon_core::{Action, Context, DynamicEntity, Field, Registry, ResourceDefinition, ResourceTransformer};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! fn example() -> charon_core::Result<()> {
//!     let registry = Arc::new(Registry::new());
//!     let pets = registry.register(
//!         ResourceDefinition::builder("Pet")
//!             .field(Field::new("id").identifier().visible())
//!             .field(Field::new("name").visible())
//!             .build()?,
//!     )?;
//!
//!     let rex = DynamicEntity::new("Pet").with("id", json!(1)).with("name", json!("Rex")).into_ref();
//!     let transformer = ResourceTransformer::new(registry);
//!     let resource = transformer.to_resource(&pets, &rex, &Context::new(Action::View))?;
//!     assert_eq!(resource.to_json(), json!({"id": 1, "name": "Rex"}));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod action;
pub mod context;
pub mod entity;
pub mod error;
pub mod expression;
pub mod factory;
pub mod input;
pub mod processor;
pub mod query;
pub mod schema;
pub mod transform;
pub mod validator;
pub mod value_transformer;
pub mod values;

// Re-export main types for convenience
pub use action::{Action, ActionKind, Cardinality};
pub use context::{Context, ContextParameter, DynamicContext};
pub use entity::{entity_ref, Accessors, DynamicEntity, Entity, EntityRef, HookCall, PropertyValue};
pub use error::{Error, Result};
pub use factory::{DynamicEntityFactory, EntityFactory};
pub use input::{InputParser, InputParserCollection, JsonBodyInputParser};
pub use processor::{CountProcessor, ProcessScope, Processor, ProcessorCollection};
pub use query::{Filter, FilterOperator, FilterResults, QueryParameters, Sort, SortDirection};
pub use schema::{Field, FieldBuilder, FieldKind, Registry, Relationship, ResourceDefinition};
pub use transform::{ResourceTransformer, TransformerConfig, DEFAULT_MAX_DEPTH};
pub use validator::ResourceValidator;
pub use value_transformer::ValueTransformer;
pub use values::{Identifier, IdentifierCollection, Resource, ResourceCollection, ResourceValue};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

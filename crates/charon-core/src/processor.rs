//! Processors: extension points invoked by the transformer
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::context::Context;
use crate::entity::EntityRef;
use crate::error::Result;
use crate::query::FilterResults;
use crate::schema::{Field, ResourceDefinition};
use crate::transform::ResourceTransformer;
use crate::values::{Resource, ResourceCollection};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Where in the traversal a processor is being invoked
pub struct ProcessScope<'a> {
    pub transformer: &'a ResourceTransformer,
    pub definition: &'a ResourceDefinition,
    pub context: &'a Context,
    /// Relationship field the processed resources hang under, if nested
    pub parent_field: Option<&'a Field>,
    pub parent_entity: Option<&'a EntityRef>,
}

/// Post-processing of resources, collections and filters
///
/// Processors annotate results through the designated extension points (resource and
/// collection metadata, query descriptors). All methods default to doing nothing.
pub trait Processor {
    /// Called after all fields of a resource are resolved
    fn process_resource(&self, _scope: &ProcessScope<'_>, _resource: &mut Resource) -> Result<()> {
        Ok(())
    }

    /// Called after a collection of resources is assembled
    fn process_collection(
        &self,
        _scope: &ProcessScope<'_>,
        _collection: &mut ResourceCollection,
        _filter_results: Option<&FilterResults>,
    ) -> Result<()> {
        Ok(())
    }

    /// Called while building filters, after field filters were applied
    fn process_filters(
        &self,
        _scope: &ProcessScope<'_>,
        _request: &Value,
        _filter_results: &mut FilterResults,
    ) -> Result<()> {
        Ok(())
    }
}

/// Ordered processor chain
#[derive(Clone, Default)]
pub struct ProcessorCollection {
    processors: Vec<Arc<dyn Processor>>,
}

impl ProcessorCollection {
    pub fn push(&mut self, processor: Arc<dyn Processor>) {
        self.processors.push(processor);
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub fn process_resource(&self, scope: &ProcessScope<'_>, resource: &mut Resource) -> Result<()> {
        for processor in &self.processors {
            processor.process_resource(scope, resource)?;
        }
        Ok(())
    }

    pub fn process_collection(
        &self,
        scope: &ProcessScope<'_>,
        collection: &mut ResourceCollection,
        filter_results: Option<&FilterResults>,
    ) -> Result<()> {
        for processor in &self.processors {
            processor.process_collection(scope, collection, filter_results)?;
        }
        Ok(())
    }

    pub fn process_filters(
        &self,
        scope: &ProcessScope<'_>,
        request: &Value,
        filter_results: &mut FilterResults,
    ) -> Result<()> {
        for processor in &self.processors {
            processor.process_filters(scope, request, filter_results)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ProcessorCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProcessorCollection({})", self.processors.len())
    }
}

/// Adds the number of items to every collection's metadata under `count`
#[derive(Debug, Clone, Copy, Default)]
pub struct CountProcessor;

impl Processor for CountProcessor {
    fn process_collection(
        &self,
        _scope: &ProcessScope<'_>,
        collection: &mut ResourceCollection,
        _filter_results: Option<&FilterResults>,
    ) -> Result<()> {
        let count = collection.len();
        collection.add_meta("count", Value::from(count));
        Ok(())
    }
}

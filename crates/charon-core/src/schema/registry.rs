//! Registry of resource definitions, value transformers and entity hooks
//!
//! Definitions refer to their children by name. The registry turns those names into
//! shared definitions, building lazily registered ones on first use and memoizing the
//! result, so definitions that refer to themselves (directly or through a cycle) work.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::definition::ResourceDefinition;
use crate::entity::{EntityHooks, Hook, HookCall};
use crate::error::{Error, Result};
use crate::value_transformer::{self, ValueTransformer};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Deferred definition constructor
pub type DefinitionFactory = Arc<dyn Fn(&Registry) -> Result<ResourceDefinition> + Send + Sync>;

/// Shared lookup tables used by a transformer
#[derive(Default)]
pub struct Registry {
    definitions: RwLock<HashMap<String, Arc<ResourceDefinition>>>,
    factories: RwLock<HashMap<String, DefinitionFactory>>,
    transformers: RwLock<HashMap<String, Arc<dyn ValueTransformer>>>,
    hooks: RwLock<EntityHooks>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a built definition under its own name
    pub fn register(&self, definition: ResourceDefinition) -> Result<Arc<ResourceDefinition>> {
        let name = definition.name().to_string();
        let mut definitions = write(&self.definitions)?;
        if definitions.contains_key(&name) || read(&self.factories)?.contains_key(&name) {
            return Err(Error::definition(name, "already registered"));
        }
        let definition = Arc::new(definition);
        definitions.insert(name, definition.clone());
        Ok(definition)
    }

    /// Register a definition built on first request
    pub fn register_factory<F>(&self, name: &str, factory: F) -> Result<()>
    where
        F: Fn(&Registry) -> Result<ResourceDefinition> + Send + Sync + 'static,
    {
        if read(&self.definitions)?.contains_key(name) {
            return Err(Error::definition(name, "already registered"));
        }
        write(&self.factories)?.insert(name.to_string(), Arc::new(factory));
        Ok(())
    }

    /// Look up a definition by name, building and memoizing lazy ones
    pub fn definition(&self, name: &str) -> Result<Arc<ResourceDefinition>> {
        if let Some(definition) = read(&self.definitions)?.get(name) {
            return Ok(definition.clone());
        }

        let factory = read(&self.factories)?
            .get(name)
            .cloned()
            .ok_or_else(|| Error::definition(name, "no such definition registered"))?;

        let built = factory(self)?;
        if built.name() != name {
            return Err(Error::definition(
                name,
                format!("factory produced definition '{}'", built.name()),
            ));
        }

        let mut definitions = write(&self.definitions)?;
        let definition = definitions
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(built))
            .clone();
        tracing::debug!(definition = name, "memoized resource definition");
        Ok(definition)
    }

    pub fn contains(&self, name: &str) -> bool {
        let known = |map: Result<bool>| map.unwrap_or(false);
        known(read(&self.definitions).map(|d| d.contains_key(name)))
            || known(read(&self.factories).map(|f| f.contains_key(name)))
    }

    /// Names of all registered definitions, sorted
    pub fn definition_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = read(&self.definitions)?.keys().cloned().collect();
        for name in read(&self.factories)?.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Register a transformer under `spec`, replacing any memoized one
    pub fn register_transformer(&self, spec: &str, transformer: Arc<dyn ValueTransformer>) -> Result<()> {
        write(&self.transformers)?.insert(spec.to_string(), transformer);
        Ok(())
    }

    /// Transformer for `spec`, built from the built-ins once and then reused
    pub fn transformer(&self, spec: &str) -> Result<Arc<dyn ValueTransformer>> {
        if let Some(transformer) = read(&self.transformers)?.get(spec) {
            return Ok(transformer.clone());
        }
        let transformer = value_transformer::from_spec(spec)?;
        Ok(write(&self.transformers)?
            .entry(spec.to_string())
            .or_insert(transformer)
            .clone())
    }

    /// Register an entity hook, see [`EntityHooks`]
    pub fn register_hook<F>(&self, entity_type: &str, method: &str, f: F) -> Result<()>
    where
        F: Fn(&mut HookCall<'_>) + Send + Sync + 'static,
    {
        write(&self.hooks)?.register(entity_type, method, f);
        Ok(())
    }

    pub fn hook(&self, entity_type: &str, method: &str) -> Option<Hook> {
        read(&self.hooks)
            .ok()
            .and_then(|hooks| hooks.get(entity_type, method).cloned())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("definitions", &self.definition_names().unwrap_or_default())
            .finish()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| Error::internal("registry lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| Error::internal("registry lock poisoned"))
}

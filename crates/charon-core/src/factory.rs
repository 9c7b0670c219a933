//! Entity factories: how the write path materializes and looks up entities
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::context::Context;
use crate::entity::{loose_eq, DynamicEntity, EntityRef, PropertyValue};
use crate::error::Result;
use crate::expression::ExpressionResolver;
use crate::values::Identifier;
use std::cell::RefCell;
use std::collections::HashMap;

pub trait EntityFactory {
    /// New, empty entity of `entity_type`
    fn create_entity(&self, entity_type: &str, context: &Context) -> Result<EntityRef>;

    /// Existing entity to link under `parent`, addressed by `identifier`
    fn resolve_linked_entity(
        &self,
        parent: &EntityRef,
        entity_type: &str,
        identifier: &Identifier,
        context: &Context,
    ) -> Result<Option<EntityRef>>;

    /// Existing entity addressed by `identifier`
    fn resolve_from_identifier(
        &self,
        entity_type: &str,
        identifier: &Identifier,
        context: &Context,
    ) -> Result<Option<EntityRef>>;
}

/// Creates [`DynamicEntity`] instances and resolves identifiers against an in-memory store
#[derive(Debug, Default)]
pub struct DynamicEntityFactory {
    store: RefCell<HashMap<String, Vec<EntityRef>>>,
}

impl DynamicEntityFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `entity` resolvable by identifier
    pub fn store(&self, entity: EntityRef) {
        let entity_type = entity.borrow().entity_type().to_string();
        self.store.borrow_mut().entry(entity_type).or_default().push(entity);
    }

    pub fn stored(&self, entity_type: &str) -> usize {
        self.store.borrow().get(entity_type).map(Vec::len).unwrap_or(0)
    }

    fn find(&self, entity_type: &str, identifier: &Identifier, context: &Context) -> Result<Option<EntityRef>> {
        if identifier.is_empty() {
            return Ok(None);
        }
        let wanted = identifier.entity_values(context)?;
        let resolver = ExpressionResolver::new(context, None);
        let store = self.store.borrow();
        let candidates = match store.get(entity_type) {
            Some(candidates) => candidates,
            None => return Ok(None),
        };

        for candidate in candidates {
            let target = PropertyValue::Entity(candidate.clone());
            let mut matches = true;
            for (field, value) in &wanted {
                let actual = resolver.resolve_path(&target, field.expression(), Some(field.name()))?;
                if !loose_eq(value, &actual.to_value()) {
                    matches = false;
                    break;
                }
            }
            if matches {
                return Ok(Some(candidate.clone()));
            }
        }
        Ok(None)
    }
}

impl EntityFactory for DynamicEntityFactory {
    fn create_entity(&self, entity_type: &str, _context: &Context) -> Result<EntityRef> {
        Ok(DynamicEntity::new(entity_type).into_ref())
    }

    fn resolve_linked_entity(
        &self,
        _parent: &EntityRef,
        entity_type: &str,
        identifier: &Identifier,
        context: &Context,
    ) -> Result<Option<EntityRef>> {
        self.find(entity_type, identifier, context)
    }

    fn resolve_from_identifier(
        &self,
        entity_type: &str,
        identifier: &Identifier,
        context: &Context,
    ) -> Result<Option<EntityRef>> {
        self.find(entity_type, identifier, context)
    }
}

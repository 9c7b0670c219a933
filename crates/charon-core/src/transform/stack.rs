//! Traversal stacks
//!
//! Both stacks are pushed and popped through guards, so they stay balanced when a
//! transformation bails out with an error.

use crate::entity::EntityRef;
use crate::schema::Field;
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

/// Fields from the root definition down to the field being processed
#[derive(Debug, Default)]
pub struct CurrentPath {
    fields: Vec<Arc<Field>>,
}

impl CurrentPath {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[Arc<Field>] {
        &self.fields
    }

    /// Display names joined with dots, e.g. `category.name`
    pub fn display_path(&self) -> String {
        self.fields
            .iter()
            .map(|field| field.display_name())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for CurrentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_path())
    }
}

/// Entities being traversed (read) or built (write); the top is the current entity
#[derive(Default)]
pub struct ParentEntityCollection {
    entities: Vec<EntityRef>,
}

impl ParentEntityCollection {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity currently being processed
    pub fn current(&self) -> Option<&EntityRef> {
        self.entities.last()
    }

    /// Nearest ancestor of the current entity
    pub fn parent(&self) -> Option<&EntityRef> {
        self.entities
            .len()
            .checked_sub(2)
            .and_then(|index| self.entities.get(index))
    }
}

impl fmt::Debug for ParentEntityCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParentEntityCollection({})", self.entities.len())
    }
}

pub(crate) struct PathGuard<'a> {
    path: &'a RefCell<CurrentPath>,
}

impl<'a> PathGuard<'a> {
    pub(crate) fn enter(path: &'a RefCell<CurrentPath>, field: Arc<Field>) -> Self {
        path.borrow_mut().fields.push(field);
        Self { path }
    }
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        self.path.borrow_mut().fields.pop();
    }
}

pub(crate) struct ParentGuard<'a> {
    parents: &'a RefCell<ParentEntityCollection>,
}

impl<'a> ParentGuard<'a> {
    pub(crate) fn enter(parents: &'a RefCell<ParentEntityCollection>, entity: EntityRef) -> Self {
        parents.borrow_mut().entities.push(entity);
        Self { parents }
    }
}

impl Drop for ParentGuard<'_> {
    fn drop(&mut self) {
        self.parents.borrow_mut().entities.pop();
    }
}

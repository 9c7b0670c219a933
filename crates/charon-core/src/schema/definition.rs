//! Resource definitions
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::field::{Field, FieldBuilder};
use crate::action::Action;
use crate::context::DynamicContext;
use crate::error::{Error, Result};
use crate::validator::ResourceValidator;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Shared per-entity context adjustment attached to a definition
pub type SharedDynamicContext = Arc<dyn DynamicContext + Send + Sync>;

/// The fields a resource exposes and the entity type it maps
pub struct ResourceDefinition {
    name: String,
    entity_type: String,
    any_entity: bool,
    fields: Vec<Arc<Field>>,
    dynamic_context: Option<SharedDynamicContext>,
    validators: Vec<Arc<dyn ResourceValidator>>,
    description: Option<String>,
}

impl ResourceDefinition {
    pub fn builder(name: &str) -> ResourceDefinitionBuilder {
        ResourceDefinitionBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entity type accepted by this definition
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Whether entities of `entity_type` may be rendered through this definition
    pub fn accepts(&self, entity_type: &str) -> bool {
        self.any_entity || self.entity_type == entity_type
    }

    /// All fields in declaration order
    pub fn fields(&self) -> &[Arc<Field>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Arc<Field>> {
        self.fields.iter().find(|field| field.name() == name)
    }

    pub fn field_by_display_name(&self, display_name: &str) -> Option<&Arc<Field>> {
        self.fields
            .iter()
            .find(|field| field.display_name() == display_name)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &Arc<Field>> {
        self.fields.iter().filter(|field| field.is_identifier())
    }

    pub fn sortable(&self) -> impl Iterator<Item = &Arc<Field>> {
        self.fields.iter().filter(|field| field.is_sortable())
    }

    pub fn relationships(&self) -> impl Iterator<Item = &Arc<Field>> {
        self.fields.iter().filter(|field| field.is_relationship())
    }

    pub fn with_action(&self, action: Action) -> impl Iterator<Item = &Arc<Field>> {
        self.fields.iter().filter(move |field| field.has_action(action))
    }

    pub fn dynamic_context(&self) -> Option<&SharedDynamicContext> {
        self.dynamic_context.as_ref()
    }

    pub fn validators(&self) -> &[Arc<dyn ResourceValidator>] {
        &self.validators
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl fmt::Debug for ResourceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDefinition")
            .field("name", &self.name)
            .field("entity_type", &self.entity_type)
            .field("fields", &self.fields)
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// Builder for [`ResourceDefinition`]
pub struct ResourceDefinitionBuilder {
    name: String,
    entity_type: Option<String>,
    any_entity: bool,
    fields: Vec<FieldBuilder>,
    dynamic_context: Option<SharedDynamicContext>,
    validators: Vec<Arc<dyn ResourceValidator>>,
    description: Option<String>,
}

impl ResourceDefinitionBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entity_type: None,
            any_entity: false,
            fields: Vec::new(),
            dynamic_context: None,
            validators: Vec::new(),
            description: None,
        }
    }

    /// Entity type accepted by the definition; defaults to the definition name
    pub fn entity_type(mut self, entity_type: &str) -> Self {
        self.entity_type = Some(entity_type.to_string());
        self
    }

    /// Skip the entity type check when rendering
    pub fn accept_any_entity(mut self) -> Self {
        self.any_entity = true;
        self
    }

    pub fn field(mut self, field: FieldBuilder) -> Self {
        self.fields.push(field);
        self
    }

    pub fn dynamic_context(mut self, dynamic_context: SharedDynamicContext) -> Self {
        self.dynamic_context = Some(dynamic_context);
        self
    }

    pub fn validator(mut self, validator: Arc<dyn ResourceValidator>) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Build the definition, parsing every field and rejecting duplicate names
    pub fn build(self) -> Result<ResourceDefinition> {
        let mut names = HashSet::new();
        let mut display_names = HashSet::new();
        let mut fields = Vec::with_capacity(self.fields.len());

        for builder in self.fields {
            let field = builder.build()?;
            if !names.insert(field.name().to_string()) {
                return Err(Error::definition(
                    &self.name,
                    format!("duplicate field '{}'", field.name()),
                ));
            }
            if !display_names.insert(field.display_name().to_string()) {
                return Err(Error::definition(
                    &self.name,
                    format!("duplicate display name '{}'", field.display_name()),
                ));
            }
            fields.push(Arc::new(field));
        }

        Ok(ResourceDefinition {
            entity_type: self.entity_type.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            any_entity: self.any_entity,
            fields,
            dynamic_context: self.dynamic_context,
            validators: self.validators,
            description: self.description,
        })
    }
}

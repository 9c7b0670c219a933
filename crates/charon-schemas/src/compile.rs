//! Compiling documents into registry definitions
//!
//! Every definition is registered as a lazy factory: the registry builds it the first
//! time it is requested, so documents may refer to definitions declared later, in
//! another document, or to themselves. Transformer specs are resolved through the
//! registry at build time, which lets callers register custom transformers after
//! compiling.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::document::{DefinitionDocument, DefinitionSpec, FieldSpec};
use charon_core::{Cardinality, Field, FieldBuilder, Registry, ResourceDefinition, Result};

/// Register every definition of `document`, returning the registered names
pub fn register(document: &DefinitionDocument, registry: &Registry) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(document.definitions.len());
    for (name, spec) in &document.definitions {
        let spec = spec.clone();
        let definition_name = name.clone();
        registry.register_factory(name, move |registry| {
            build_definition(&definition_name, &spec, registry)
        })?;
        tracing::debug!(definition = %name, "registered definition factory");
        names.push(name.clone());
    }
    Ok(names)
}

/// Build one definition eagerly
pub fn build_definition(name: &str, spec: &DefinitionSpec, registry: &Registry) -> Result<ResourceDefinition> {
    let mut builder = ResourceDefinition::builder(name);
    if let Some(entity) = &spec.entity {
        builder = builder.entity_type(entity);
    }
    if spec.any_entity {
        builder = builder.accept_any_entity();
    }
    if let Some(description) = &spec.description {
        builder = builder.describe(description);
    }
    for field in &spec.fields {
        builder = builder.field(field_builder(field, registry)?);
    }
    builder.build()
}

pub fn field_builder(spec: &FieldSpec, registry: &Registry) -> Result<FieldBuilder> {
    let mut builder = match &spec.relationship {
        Some(relationship) => match relationship.cardinality {
            Cardinality::One => Field::one(&spec.name, &relationship.definition),
            Cardinality::Many => Field::many(&spec.name, &relationship.definition),
        },
        None => Field::new(&spec.name),
    };

    if let Some(display) = &spec.display {
        builder = builder.display_name(display);
    }
    if spec.identifier {
        builder = builder.identifier();
    }
    if spec.visible {
        builder = builder.visible();
    }
    if spec.writeable {
        builder = builder.writeable();
    }
    builder = builder.visible_in(&spec.actions);
    if spec.sortable {
        builder = builder.sortable();
    }
    if spec.filterable {
        builder = builder.filterable();
    }
    if spec.searchable {
        builder = builder.searchable();
    }
    if spec.array {
        builder = builder.array();
    }
    if let Some(description) = &spec.description {
        builder = builder.describe(description);
    }

    match &spec.relationship {
        Some(relationship) => {
            if let Some(url) = &relationship.url {
                builder = builder.url(url);
            }
            builder = builder.expanded(&relationship.expand);
            if let Some(action) = relationship.expand_action {
                builder = builder.expand_action(action);
            }
            if relationship.create {
                builder = builder.create_new_children();
            }
        }
        None => {
            if let Some(transformer) = spec.transformer_spec() {
                builder = builder.transformer(registry.transformer(transformer)?);
            }
        }
    }

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use charon_core::Action;

    fn document() -> DefinitionDocument {
        serde_yaml::from_str(
            r#"
definitions:
  Node:
    entity: TreeNode
    description: A tree node
    fields:
      - { name: id, identifier: true, visible: true, sortable: true }
      - { name: title, display: heading, visible: true, writeable: true, searchable: true }
      - { name: created, type: datetime, visible: true }
      - { name: flags, array: true, actions: [view] }
      - name: children
        relationship: { definition: Node, cardinality: many, expand: [view], expand_action: identifier, create: true }
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_register_is_lazy_and_self_referencing() {
        let registry = Registry::new();
        let names = register(&document(), &registry).unwrap();
        assert_eq!(names, vec!["Node".to_string()]);
        assert!(registry.contains("Node"));

        let node = registry.definition("Node").unwrap();
        assert_eq!(node.entity_type(), "TreeNode");
        assert_eq!(node.description(), Some("A tree node"));
        assert_eq!(node.fields().len(), 5);

        let children = node.field("children").unwrap();
        let relationship = children.relationship().unwrap();
        assert_eq!(relationship.cardinality(), Cardinality::Many);
        assert_eq!(relationship.definition(), "Node");
        assert!(relationship.is_expanded_in(Action::View));
        assert!(!relationship.is_expanded_in(Action::Index));
        assert_eq!(relationship.expand_action(), Action::Identifier);
        assert!(relationship.can_create_new_children());

        // the relationship resolves back to the memoized definition
        let again = registry.definition(relationship.definition()).unwrap();
        assert!(std::sync::Arc::ptr_eq(&node, &again));
    }

    #[test]
    fn test_field_flags() {
        let registry = Registry::new();
        register(&document(), &registry).unwrap();
        let node = registry.definition("Node").unwrap();

        let title = node.field_by_display_name("heading").unwrap();
        assert!(title.has_action(Action::Create));
        assert!(title.has_action(Action::Index));
        assert!(title.is_searchable());
        assert!(!title.is_sortable());

        let flags = node.field("flags").unwrap();
        assert!(flags.is_array());
        assert!(flags.has_action(Action::View));
        assert!(!flags.has_action(Action::Index));

        assert!(node.field("created").unwrap().transformer().is_some());
        assert!(node.field("id").unwrap().is_identifier());
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let registry = Registry::new();
        registry
            .register(ResourceDefinition::builder("Node").build().unwrap())
            .unwrap();
        assert!(register(&document(), &registry).is_err());
    }
}

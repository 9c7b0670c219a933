//! Resource fields
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::action::{Action, Cardinality};
use crate::error::Result;
use crate::expression::{parse_path, PathExpression, UrlTemplate};
use crate::value_transformer::ValueTransformer;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// One property of a resource definition
pub struct Field {
    name: String,
    display_name: String,
    expression: PathExpression,
    kind: FieldKind,
    actions: HashSet<Action>,
    identifier: bool,
    sortable: bool,
    filterable: bool,
    searchable: bool,
    array: bool,
    transformer: Option<Arc<dyn ValueTransformer>>,
    description: Option<String>,
}

/// Scalar value or link to another resource definition
#[derive(Debug, Clone)]
pub enum FieldKind {
    Scalar,
    Relationship(Relationship),
}

/// Relationship details of a field
#[derive(Debug, Clone)]
pub struct Relationship {
    cardinality: Cardinality,
    definition: String,
    url: Option<UrlTemplate>,
    expanded: HashSet<Action>,
    expand_action: Action,
    create_new_children: bool,
}

impl Relationship {
    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Name of the child definition, looked up in the registry on use
    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn url(&self) -> Option<&UrlTemplate> {
        self.url.as_ref()
    }

    /// Whether the relationship expands by default in `action`
    pub fn is_expanded_in(&self, action: Action) -> bool {
        self.expanded.contains(&action)
    }

    /// Action used for the child context when expanding
    pub fn expand_action(&self) -> Action {
        self.expand_action
    }

    /// Whether payloads may create new child entities inline
    pub fn can_create_new_children(&self) -> bool {
        self.create_new_children
    }
}

impl Field {
    /// Start a scalar field reading entity property `name`
    #[allow(clippy::new_ret_no_self)]
    pub fn new(name: &str) -> FieldBuilder {
        FieldBuilder::new(name, FieldKind::Scalar)
    }

    /// Start a to-one relationship to the definition named `definition`
    pub fn one(name: &str, definition: &str) -> FieldBuilder {
        FieldBuilder::relationship(name, Cardinality::One, definition)
    }

    /// Start a to-many relationship to the definition named `definition`
    pub fn many(name: &str, definition: &str) -> FieldBuilder {
        FieldBuilder::relationship(name, Cardinality::Many, definition)
    }

    /// Entity path expression
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key under which the value appears in resources and payloads
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn expression(&self) -> &PathExpression {
        &self.expression
    }

    /// Plain property name, when the expression is a single parameterless segment
    pub fn attribute_name(&self) -> Option<&str> {
        self.expression.simple_name()
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn relationship(&self) -> Option<&Relationship> {
        match &self.kind {
            FieldKind::Relationship(relationship) => Some(relationship),
            FieldKind::Scalar => None,
        }
    }

    pub fn is_relationship(&self) -> bool {
        self.relationship().is_some()
    }

    /// Whether the field participates in `action`
    pub fn has_action(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        Action::ALL.into_iter().filter(|action| self.actions.contains(action))
    }

    pub fn is_identifier(&self) -> bool {
        self.identifier
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable
    }

    pub fn is_array(&self) -> bool {
        self.array
    }

    pub fn transformer(&self) -> Option<&Arc<dyn ValueTransformer>> {
        self.transformer.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("display_name", &self.display_name)
            .field("kind", &self.kind)
            .field("actions", &self.actions().collect::<Vec<_>>())
            .field("identifier", &self.identifier)
            .finish()
    }
}

/// Builder for [`Field`]
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    name: String,
    display_name: Option<String>,
    kind: FieldKind,
    url: Option<String>,
    actions: HashSet<Action>,
    identifier: bool,
    sortable: bool,
    filterable: bool,
    searchable: bool,
    array: bool,
    transformer: Option<Arc<dyn ValueTransformer>>,
    description: Option<String>,
}

impl FieldBuilder {
    fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            display_name: None,
            kind,
            url: None,
            actions: HashSet::new(),
            identifier: false,
            sortable: false,
            filterable: false,
            searchable: false,
            array: false,
            transformer: None,
            description: None,
        }
    }

    fn relationship(name: &str, cardinality: Cardinality, definition: &str) -> Self {
        let expand_action = match cardinality {
            Cardinality::One => Action::View,
            Cardinality::Many => Action::Index,
        };
        Self::new(
            name,
            FieldKind::Relationship(Relationship {
                cardinality,
                definition: definition.to_string(),
                url: None,
                expanded: HashSet::new(),
                expand_action,
                create_new_children: false,
            }),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(mut self, display_name: &str) -> Self {
        self.display_name = Some(display_name.to_string());
        self
    }

    /// Include in index and view
    pub fn visible(self) -> Self {
        self.visible_in(&Action::READABLE)
    }

    /// Accept in create and edit payloads
    pub fn writeable(self) -> Self {
        self.visible_in(&Action::WRITEABLE)
    }

    /// Participate in exactly these additional actions
    pub fn visible_in(mut self, actions: &[Action]) -> Self {
        self.actions.extend(actions.iter().copied());
        self
    }

    /// Mark as identifier. Identifiers are also shown in the identifier action.
    pub fn identifier(mut self) -> Self {
        self.identifier = true;
        self.actions.insert(Action::Identifier);
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    /// The property holds a sequence of scalars
    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    pub fn transformer(mut self, transformer: Arc<dyn ValueTransformer>) -> Self {
        self.transformer = Some(transformer);
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// URL template for relationship links
    pub fn url(mut self, template: &str) -> Self {
        self.url = Some(template.to_string());
        self
    }

    /// Expand the relationship by default in these actions
    pub fn expanded(mut self, actions: &[Action]) -> Self {
        if let FieldKind::Relationship(relationship) = &mut self.kind {
            relationship.expanded.extend(actions.iter().copied());
        }
        self
    }

    /// Action used for the child context when the relationship expands
    pub fn expand_action(mut self, action: Action) -> Self {
        if let FieldKind::Relationship(relationship) = &mut self.kind {
            relationship.expand_action = action;
        }
        self
    }

    /// Allow payloads to create new children inline
    pub fn create_new_children(mut self) -> Self {
        if let FieldKind::Relationship(relationship) = &mut self.kind {
            relationship.create_new_children = true;
        }
        self
    }

    /// Parse the expression and url template into a [`Field`]
    pub fn build(self) -> Result<Field> {
        let expression = parse_path(&self.name)?;
        let mut kind = self.kind;
        if let (FieldKind::Relationship(relationship), Some(url)) = (&mut kind, &self.url) {
            relationship.url = Some(UrlTemplate::parse(url)?);
        }

        Ok(Field {
            display_name: self.display_name.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            expression,
            kind,
            actions: self.actions,
            identifier: self.identifier,
            sortable: self.sortable,
            filterable: self.filterable,
            searchable: self.searchable,
            array: self.array,
            transformer: self.transformer,
            description: self.description,
        })
    }
}

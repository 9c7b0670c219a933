//! Domain rules for definition documents
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::Violation;
use crate::document::{DefinitionDocument, DefinitionSpec, FieldSpec, RelationshipSpec};
use charon_core::expression::{parse_path, UrlTemplate};
use charon_core::{value_transformer, Registry};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

const NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_\-]*(\.[A-Za-z_][A-Za-z0-9_\-]*)*$";

fn name_regex() -> Option<&'static Regex> {
    static NAME: OnceLock<Option<Regex>> = OnceLock::new();
    NAME.get_or_init(|| Regex::new(NAME_PATTERN).ok()).as_ref()
}

/// Display names are dotted identifiers: `name`, `pet-name`, `meta.size`
pub fn is_valid_display_name(name: &str) -> bool {
    name_regex().is_some_and(|regex| regex.is_match(name))
}

/// Check a structurally valid document
///
/// Relationship targets may be defined in the document itself, in `external` (names
/// from documents loaded alongside it) or in `registry`. Transformer specs are
/// resolved through `registry` when one is given, so custom transformers registered
/// there are accepted; otherwise only the built-ins are.
pub fn check_rules(
    document: &DefinitionDocument,
    external: &BTreeSet<String>,
    registry: Option<&Registry>,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let known = |name: &str| {
        document.definitions.contains_key(name)
            || external.contains(name)
            || registry.is_some_and(|registry| registry.contains(name))
    };

    for (name, definition) in &document.definitions {
        let location = format!("definitions.{}", name);
        if !is_valid_display_name(name) || name.contains('.') {
            violations.push(Violation::new(
                &location,
                "definition-name",
                format!("'{}' is not a valid definition name", name),
            ));
        }
        check_definition(&location, definition, &known, registry, &mut violations);
    }

    violations
}

fn check_definition(
    location: &str,
    definition: &DefinitionSpec,
    known: &dyn Fn(&str) -> bool,
    registry: Option<&Registry>,
    violations: &mut Vec<Violation>,
) {
    let mut names = HashSet::new();
    let mut display_names = HashSet::new();

    for (index, field) in definition.fields.iter().enumerate() {
        let location = format!("{}.fields[{}]", location, index);

        if !names.insert(field.name.as_str()) {
            violations.push(Violation::new(
                &location,
                "unique-field",
                format!("duplicate field '{}'", field.name),
            ));
        }
        if let Err(err) = parse_path(&field.name) {
            violations.push(Violation::new(format!("{}.name", location), "expression", err.to_string()));
        }

        let display_name = field.display_name();
        if field.display.is_some() && !is_valid_display_name(display_name) {
            violations.push(Violation::new(
                format!("{}.display", location),
                "display-name",
                format!("'{}' does not match {}", display_name, NAME_PATTERN),
            ));
        }
        if !display_names.insert(display_name) {
            violations.push(Violation::new(
                &location,
                "unique-display",
                format!("duplicate display name '{}'", display_name),
            ));
        }

        match &field.relationship {
            Some(relationship) => check_relationship(&location, field, relationship, known, violations),
            None => check_scalar(&location, field, registry, violations),
        }
    }
}

fn check_scalar(
    location: &str,
    field: &FieldSpec,
    registry: Option<&Registry>,
    violations: &mut Vec<Violation>,
) {
    let Some(spec) = field.transformer_spec() else {
        return;
    };
    let resolved = match registry {
        Some(registry) => registry.transformer(spec).map(|_| ()),
        None => value_transformer::from_spec(spec).map(|_| ()),
    };
    if let Err(err) = resolved {
        violations.push(Violation::new(format!("{}.transformer", location), "transformer", err.to_string()));
    }
}

fn check_relationship(
    location: &str,
    field: &FieldSpec,
    relationship: &RelationshipSpec,
    known: &dyn Fn(&str) -> bool,
    violations: &mut Vec<Violation>,
) {
    let location = format!("{}.relationship", location);

    if !known(&relationship.definition) {
        violations.push(Violation::new(
            format!("{}.definition", location),
            "relationship-target",
            format!("unknown definition '{}'", relationship.definition),
        ));
    }
    if let Some(url) = &relationship.url {
        if let Err(err) = UrlTemplate::parse(url) {
            violations.push(Violation::new(format!("{}.url", location), "url-template", err.to_string()));
        }
    }
    if let Some(action) = relationship.expand_action {
        if !action.is_read() {
            violations.push(Violation::new(
                format!("{}.expand_action", location),
                "expand-action",
                format!("children can only be expanded with a read action, not '{}'", action),
            ));
        }
    }

    let scalar_only = [
        (field.array, "array"),
        (field.identifier, "identifier"),
        (field.transformer.is_some(), "transformer"),
        (field.value_type.is_some(), "type"),
    ];
    for (_, key) in scalar_only.iter().filter(|(set, _)| *set) {
        violations.push(Violation::new(
            &location,
            "scalar-only",
            format!("relationship fields cannot set '{}'", key),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(yaml: &str) -> DefinitionDocument {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn rules(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.rule.as_str()).collect()
    }

    #[test]
    fn test_display_names() {
        assert!(is_valid_display_name("name"));
        assert!(is_valid_display_name("pet-name"));
        assert!(is_valid_display_name("_meta.size"));
        assert!(!is_valid_display_name("1st"));
        assert!(!is_valid_display_name("meta..size"));
        assert!(!is_valid_display_name("name|upper"));
        assert!(!is_valid_display_name(""));
    }

    #[test]
    fn test_clean_document() {
        let document = document(
            r#"
definitions:
  Pet:
    fields:
      - { name: id, identifier: true, visible: true }
      - { name: "nameIn|{context.case?}", display: label, visible: true }
      - { name: status, transformer: "map|1=available,2=sold" }
      - name: category
        relationship: { definition: Category, url: "/categories/{model.category.id}" }
  Category:
    fields:
      - { name: id, identifier: true }
"#,
        );
        assert_eq!(check_rules(&document, &BTreeSet::new(), None), vec![]);
    }

    #[test]
    fn test_duplicates_and_bad_display() {
        let document = document(
            r#"
definitions:
  Pet:
    fields:
      - { name: id }
      - { name: id, display: ident }
      - { name: name, display: "pet name" }
      - { name: other, display: ident }
"#,
        );
        let violations = check_rules(&document, &BTreeSet::new(), None);
        assert_eq!(rules(&violations), vec!["unique-field", "display-name", "unique-display"]);
        assert_eq!(violations[1].path, "definitions.Pet.fields[2].display");
    }

    #[test]
    fn test_unresolvable_references() {
        let document = document(
            r#"
definitions:
  Pet:
    fields:
      - { name: status, transformer: money }
      - { name: "tags|{model.id", display: tagged }
      - name: owner
        relationship: { definition: Person, url: "/people/{model.owner.id" }
"#,
        );
        let violations = check_rules(&document, &BTreeSet::new(), None);
        assert_eq!(
            rules(&violations),
            vec!["transformer", "expression", "relationship-target", "url-template"]
        );
    }

    #[test]
    fn test_external_and_registry_targets() {
        let document = document(
            "definitions:\n  Pet:\n    fields:\n      - name: owner\n        relationship: { definition: Person }\n",
        );
        let external: BTreeSet<String> = ["Person".to_string()].into_iter().collect();
        assert!(check_rules(&document, &external, None).is_empty());

        let registry = Registry::new();
        registry
            .register(charon_core::ResourceDefinition::builder("Person").build().unwrap())
            .unwrap();
        assert!(check_rules(&document, &BTreeSet::new(), Some(&registry)).is_empty());
    }

    #[test]
    fn test_relationship_scalar_keys() {
        let document = document(
            r#"
definitions:
  Pet:
    fields:
      - name: tags
        array: true
        relationship: { definition: Pet, cardinality: many, expand_action: edit }
"#,
        );
        let violations = check_rules(&document, &BTreeSet::new(), None);
        assert_eq!(rules(&violations), vec!["expand-action", "scalar-only"]);
        assert!(violations[1].message.contains("'array'"));
    }
}

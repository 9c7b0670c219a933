//! Query descriptors: filters, sorting and eager loading
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::ResourceTransformer;
use crate::context::Context;
use crate::entity::{EntityRef, PropertyValue};
use crate::error::Result;
use crate::processor::ProcessScope;
use crate::query::{parse_sort, FilterOperator, FilterResults, SortDirection, SORT_PARAMETER};
use crate::schema::ResourceDefinition;
use crate::values::lookup_display_path;
use serde_json::Value;

const FILTER_HOOK: &str = "filter";
const SORT_HOOK: &str = "sort";
const EAGER_LOAD_HOOK: &str = "eagerLoad";

fn is_empty_parameter(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

impl ResourceTransformer {
    /// Build the query descriptor for a request's parameter map
    ///
    /// Filterable fields contribute `eq` clauses and searchable fields `search`
    /// clauses, keyed by display name. A field that is both filters by `eq`. The `sort` parameter contributes sort clauses
    /// for sortable fields. An entity hook named after the clause handles it instead
    /// when registered. The context's processors run last.
    pub fn apply_filters(
        &self,
        request: &Value,
        definition: &ResourceDefinition,
        context: &Context,
    ) -> Result<FilterResults> {
        let mut results = FilterResults::default();

        for field in definition.fields() {
            if field.is_relationship() || !(field.is_filterable() || field.is_searchable()) {
                continue;
            }
            let value = match lookup_display_path(request, field.display_name()) {
                Some(value) if !is_empty_parameter(value) => value,
                _ => continue,
            };
            let operator = if field.is_filterable() {
                FilterOperator::Eq
            } else {
                FilterOperator::Search
            };

            let handled = self.call_entity_hook(
                definition,
                field,
                FILTER_HOOK,
                context,
                vec![PropertyValue::from(value.clone()), PropertyValue::string(operator.to_string())],
                Some(&mut results.query),
            )?;
            match handled {
                Some(method) => results.handled_by_hooks.push(method),
                None => results.query.filter(
                    format!("{}.{}", definition.entity_type(), field.name()),
                    operator,
                    value.clone(),
                ),
            }
        }

        if let Some(spec) = request.get(SORT_PARAMETER).and_then(Value::as_str) {
            for (name, direction) in parse_sort(spec) {
                let field = match definition
                    .field_by_display_name(&name)
                    .filter(|field| field.is_sortable())
                {
                    Some(field) => field,
                    None => {
                        tracing::warn!(field = %name, definition = definition.name(), "ignoring sort on unknown or unsortable field");
                        continue;
                    }
                };

                let direction_name = match direction {
                    SortDirection::Asc => "asc",
                    SortDirection::Desc => "desc",
                };
                let handled = self.call_entity_hook(
                    definition,
                    field,
                    SORT_HOOK,
                    context,
                    vec![PropertyValue::string(direction_name)],
                    Some(&mut results.query),
                )?;
                match handled {
                    Some(method) => results.handled_by_hooks.push(method),
                    None => results
                        .query
                        .sort(format!("{}.{}", definition.entity_type(), field.name()), direction),
                }
            }
        }

        let scope = ProcessScope {
            transformer: self,
            definition,
            context,
            parent_field: None,
            parent_entity: None,
        };
        context.processors().process_filters(&scope, request, &mut results)?;
        Ok(results)
    }

    /// Let the entity type preload the relationships the context will expand
    ///
    /// Calls the `eagerLoad<Name>` hook, if registered, with the entities for every
    /// relationship that is both included and expanded. Returns the hooks called.
    pub fn process_eager_loading(
        &self,
        entities: &[EntityRef],
        definition: &ResourceDefinition,
        context: &Context,
    ) -> Result<Vec<String>> {
        let mut called = Vec::new();
        if entities.is_empty() {
            return Ok(called);
        }

        for field in definition.relationships() {
            let relationship = match field.relationship() {
                Some(relationship) => relationship,
                None => continue,
            };
            let path = field.display_name();
            if !self.should_include(field, context, path) || !self.should_expand(relationship, context, path) {
                continue;
            }

            let list = PropertyValue::List(entities.iter().cloned().map(PropertyValue::Entity).collect());
            if let Some(method) = self.call_entity_hook(definition, field, EAGER_LOAD_HOOK, context, vec![list], None)? {
                called.push(method);
            }
        }
        Ok(called)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::entity::DynamicEntity;
    use crate::query::{Filter, Sort};
    use crate::schema::{Field, Registry};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn setup() -> (ResourceTransformer, Arc<ResourceDefinition>) {
        let registry = Arc::new(Registry::new());
        let definition = registry
            .register(
                ResourceDefinition::builder("Pet")
                    .field(Field::new("id").identifier().visible().filterable().sortable())
                    .field(Field::new("name").display_name("pet-name").visible().searchable().sortable())
                    .field(Field::new("status").visible().filterable())
                    .field(Field::one("owner", "Owner").visible().expanded(&[Action::View]))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        (ResourceTransformer::new(registry), definition)
    }

    #[test]
    fn test_filters_and_sorting() {
        let (transformer, definition) = setup();
        let request = json!({"id": 4, "pet-name": "rex", "status": "", "sort": "!pet-name,weight"});

        let results = transformer
            .apply_filters(&request, &definition, &Context::new(Action::Index))
            .unwrap();
        assert_eq!(
            results.query.filters,
            vec![
                Filter {
                    field: "Pet.id".to_string(),
                    operator: FilterOperator::Eq,
                    value: json!(4),
                },
                Filter {
                    field: "Pet.name".to_string(),
                    operator: FilterOperator::Search,
                    value: json!("rex"),
                },
            ]
        );
        assert_eq!(
            results.query.sorting,
            vec![Sort {
                field: "Pet.name".to_string(),
                direction: SortDirection::Desc,
            }]
        );
        assert!(results.handled_by_hooks.is_empty());
    }

    #[test]
    fn test_filter_hook_replaces_default_clause() {
        let (transformer, definition) = setup();
        transformer
            .registry()
            .register_hook("Pet", "filterStatus", |call| {
                let value = call.parameters[0].to_value();
                if let Some(query) = call.query.as_deref_mut() {
                    query.filter("Pet.state", FilterOperator::Eq, value);
                }
            })
            .unwrap();

        let results = transformer
            .apply_filters(&json!({"status": "sold"}), &definition, &Context::new(Action::Index))
            .unwrap();
        assert_eq!(results.handled_by_hooks, vec!["filterStatus".to_string()]);
        assert_eq!(results.query.filters.len(), 1);
        assert_eq!(results.query.filters[0].field, "Pet.state");
    }

    #[test]
    fn test_filterable_wins_over_searchable() {
        let registry = Arc::new(Registry::new());
        let definition = registry
            .register(
                ResourceDefinition::builder("Pet")
                    .field(Field::new("name").visible().filterable().searchable())
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let transformer = ResourceTransformer::new(registry);

        let results = transformer
            .apply_filters(&json!({"name": "rex"}), &definition, &Context::new(Action::Index))
            .unwrap();
        assert_eq!(
            results.query.filters,
            vec![Filter {
                field: "Pet.name".to_string(),
                operator: FilterOperator::Eq,
                value: json!("rex"),
            }]
        );
    }

    #[test]
    fn test_hook_with_missing_context_parameter_is_skipped() {
        let registry = Arc::new(Registry::new());
        let definition = registry
            .register(
                ResourceDefinition::builder("Pet")
                    .field(
                        Field::one("owner|{context.user}", "Owner")
                            .display_name("owner")
                            .visible()
                            .expanded(&[Action::View]),
                    )
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let transformer = ResourceTransformer::new(registry);
        let users = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen = users.clone();
        transformer
            .registry()
            .register_hook("Pet", "eagerLoadOwner", move |call| {
                if let Some(user) = call.parameters.first() {
                    seen.lock().unwrap().push(user.to_value());
                }
            })
            .unwrap();

        let pets = vec![DynamicEntity::new("Pet").into_ref()];
        let called = transformer
            .process_eager_loading(&pets, &definition, &Context::new(Action::View))
            .unwrap();
        assert!(called.is_empty());
        assert!(users.lock().unwrap().is_empty());

        let context = Context::new(Action::View).with_parameter("user", json!(7));
        let called = transformer
            .process_eager_loading(&pets, &definition, &context)
            .unwrap();
        assert_eq!(called, vec!["eagerLoadOwner".to_string()]);
        assert_eq!(*users.lock().unwrap(), vec![json!(7)]);
    }

    #[test]
    fn test_eager_loading_only_for_expanded_relationships() {
        let (transformer, definition) = setup();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        transformer
            .registry()
            .register_hook("Pet", "eagerLoadOwner", move |call| {
                if let Some(PropertyValue::List(entities)) = call.parameters.first() {
                    counter.fetch_add(entities.len(), Ordering::SeqCst);
                }
            })
            .unwrap();

        let pets = vec![DynamicEntity::new("Pet").into_ref(), DynamicEntity::new("Pet").into_ref()];

        let called = transformer
            .process_eager_loading(&pets, &definition, &Context::new(Action::Index))
            .unwrap();
        assert!(called.is_empty());

        let called = transformer
            .process_eager_loading(&pets, &definition, &Context::new(Action::View))
            .unwrap();
        assert_eq!(called, vec!["eagerLoadOwner".to_string()]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}

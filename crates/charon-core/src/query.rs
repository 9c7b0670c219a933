//! Abstract query descriptors
//!
//! The engine never talks to a datastore. Filtering and sorting requests are turned
//! into these descriptors for an external query layer to execute.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Request parameter holding the sort specification
pub const SORT_PARAMETER: &str = "sort";

/// How a filter value is compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Exact match
    Eq,
    /// Free-text match
    Search,
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOperator::Eq => write!(f, "eq"),
            FilterOperator::Search => write!(f, "search"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Entity-side property, qualified with the entity type
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

/// Query under construction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParameters {
    pub filters: Vec<Filter>,
    pub sorting: Vec<Sort>,
}

impl QueryParameters {
    pub fn filter(&mut self, field: impl Into<String>, operator: FilterOperator, value: Value) {
        self.filters.push(Filter {
            field: field.into(),
            operator,
            value,
        });
    }

    pub fn sort(&mut self, field: impl Into<String>, direction: SortDirection) {
        self.sorting.push(Sort {
            field: field.into(),
            direction,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.sorting.is_empty()
    }
}

/// Outcome of applying request filters to a definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterResults {
    pub query: QueryParameters,
    /// Hook methods that handled their clause themselves
    pub handled_by_hooks: Vec<String>,
}

/// Parse a sort specification such as `name,!id` or `-created`
pub fn parse_sort(spec: &str) -> Vec<(String, SortDirection)> {
    spec.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.strip_prefix('!').or_else(|| part.strip_prefix('-')) {
            Some(name) => (name.to_string(), SortDirection::Desc),
            None => (part.to_string(), SortDirection::Asc),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_sort() {
        assert_eq!(
            parse_sort("name, !id,-born,"),
            vec![
                ("name".to_string(), SortDirection::Asc),
                ("id".to_string(), SortDirection::Desc),
                ("born".to_string(), SortDirection::Desc),
            ]
        );
        assert!(parse_sort("").is_empty());
    }

    #[test]
    fn test_query_serialization() {
        let mut query = QueryParameters::default();
        query.filter("Pet.name", FilterOperator::Search, json!("rex"));
        query.sort("Pet.id", SortDirection::Desc);
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "filters": [{"field": "Pet.name", "operator": "search", "value": "rex"}],
                "sorting": [{"field": "Pet.id", "direction": "desc"}]
            })
        );
    }
}

//! # Filter Expression AST
//!
//! Predicates over document fields. A [`Filter`] is a conjunction of
//! [`FilterExpr`] clauses; an empty filter selects every document.

use serde_json::{json, Map, Value};

use crate::document::{DocValue, Document, ID_FIELD};

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equals
    Eq,
    /// Value in list
    In,
    /// Less than
    Lt,
    /// Greater than
    Gt,
}

impl FilterOperator {
    /// Query-language spelling, as used in debug output
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "$eq",
            FilterOperator::In => "$in",
            FilterOperator::Lt => "$lt",
            FilterOperator::Gt => "$gt",
        }
    }
}

/// A single field predicate
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpr {
    /// Field to filter on
    pub field: String,

    /// Comparison operator
    pub operator: FilterOperator,

    /// Value to compare against; an array for `In`
    pub value: DocValue,
}

impl FilterExpr {
    /// Create a new filter expression
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: DocValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Create an equality filter
    pub fn eq(field: impl Into<String>, value: DocValue) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }

    /// Create an "in list" filter
    pub fn in_list(field: impl Into<String>, values: Vec<DocValue>) -> Self {
        Self::new(field, FilterOperator::In, DocValue::Array(values))
    }

    /// Create a less than filter
    pub fn lt(field: impl Into<String>, value: DocValue) -> Self {
        Self::new(field, FilterOperator::Lt, value)
    }

    /// Create a greater than filter
    pub fn gt(field: impl Into<String>, value: DocValue) -> Self {
        Self::new(field, FilterOperator::Gt, value)
    }

    /// Check if a document matches this filter.
    ///
    /// A missing field never matches.
    pub fn matches(&self, doc: &Document) -> bool {
        let Some(field_value) = doc.get(&self.field) else {
            return false;
        };

        match self.operator {
            FilterOperator::Eq => field_value.matches(&self.value),
            FilterOperator::In => match &self.value {
                DocValue::Array(candidates) => candidates.iter().any(|c| field_value.matches(c)),
                _ => false,
            },
            FilterOperator::Lt => field_value.compare(&self.value).is_some_and(|o| o.is_lt()),
            FilterOperator::Gt => field_value.compare(&self.value).is_some_and(|o| o.is_gt()),
        }
    }

    fn to_query_json(&self) -> Value {
        let value = self.value.to_json();
        let predicate = match self.operator {
            FilterOperator::Eq => value,
            op => {
                let mut predicate = Map::new();
                predicate.insert(op.as_str().to_string(), value);
                Value::Object(predicate)
            }
        };
        let mut clause = Map::new();
        clause.insert(self.field.clone(), predicate);
        Value::Object(clause)
    }
}

/// A set of filters combined with AND logic
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub clauses: Vec<FilterExpr>,
}

impl Filter {
    /// Filter matching every document
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter selecting a document by exact identifier
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::all().and(FilterExpr::eq(ID_FIELD, DocValue::String(id.into())))
    }

    pub fn and(mut self, filter: FilterExpr) -> Self {
        self.clauses.push(filter);
        self
    }

    pub fn is_all(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The identifier when this filter is exactly an `_id` equality.
    pub fn as_id(&self) -> Option<&str> {
        match self.clauses.as_slice() {
            [FilterExpr {
                field,
                operator: FilterOperator::Eq,
                value: DocValue::String(id),
            }] if field == ID_FIELD => Some(id.as_str()),
            _ => None,
        }
    }

    /// Check if a document matches all filters
    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses.iter().all(|f| f.matches(doc))
    }

    /// Renders the filter as a Mongo-style query document.
    pub fn to_query_json(&self) -> Value {
        match self.clauses.as_slice() {
            [] => json!({}),
            [single] => single.to_query_json(),
            clauses => json!({ "$and": clauses.iter().map(FilterExpr::to_query_json).collect::<Vec<_>>() }),
        }
    }
}

//! Query builder
//!
//! Turns a request payload into the store operation for one entity kind.
//! List scoping is declared per entity in the registry ([`ListScope`]) and
//! interpreted here.

use serde_json::{Map, Value};

use crate::document::{parse_timestamp, DocValue, Document};
use crate::schema::{
    json_type_name, required_id, EntityKind, IntervalScope, ListScope, SchemaError, SchemaResult,
    SchemaValidator,
};
use crate::store::{Filter, FilterExpr};

/// Insert of one validated document
#[derive(Debug, Clone, PartialEq)]
pub struct InsertQuery {
    /// Effective identifier, generated or supplied
    pub id: String,
    pub document: Document,
}

/// Merge-patch of one document selected by identifier
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    pub id: String,
    pub filter: Filter,
    pub set: Document,
}

/// Removal of at most one document selected by identifier
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteQuery {
    pub id: String,
    pub filter: Filter,
}

/// Builds store operations for one entity kind
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    kind: EntityKind,
}

impl QueryBuilder {
    pub fn new(kind: EntityKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    fn collection(&self) -> &'static str {
        self.kind.collection()
    }

    /// Builds the filter for a list request.
    ///
    /// `payload` is `None` when the request carried no body. Entities listed
    /// without a filter ignore the payload entirely.
    pub fn list(&self, payload: Option<&Value>) -> SchemaResult<Filter> {
        let scope = self.kind.list_scope();
        if !scope.needs_body() {
            return Ok(Filter::all());
        }

        let params = match payload {
            Some(Value::Object(params)) => params,
            Some(other) => return Err(SchemaError::not_an_object(self.collection(), json_type_name(other))),
            None => return Err(SchemaError::not_an_object(self.collection(), "empty body")),
        };

        match scope {
            ListScope::All => Ok(Filter::all()),
            ListScope::Owner { field } => {
                let owner = self.string_param(params, field)?;
                Ok(Filter::all().and(FilterExpr::eq(field, DocValue::String(owner))))
            }
            ListScope::Facet { field } => match params.get(field) {
                None | Some(Value::Null) => Ok(Filter::all()),
                Some(Value::String(s)) if s.is_empty() => Ok(Filter::all()),
                Some(Value::String(s)) => {
                    Ok(Filter::all().and(FilterExpr::eq(field, DocValue::String(s.clone()))))
                }
                Some(other) => Err(SchemaError::type_mismatch(
                    self.collection(),
                    field,
                    "string",
                    json_type_name(other),
                )),
            },
            ListScope::Interval(interval) => self.interval_filter(params, &interval),
        }
    }

    /// `owner ∈ owners AND start < requested_end AND end > requested_start`,
    /// plus the flag facet when set.
    fn interval_filter(&self, params: &Map<String, Value>, scope: &IntervalScope) -> SchemaResult<Filter> {
        let requested_start = self.timestamp_param(params, scope.start_field)?;
        let requested_end = self.timestamp_param(params, scope.end_field)?;
        let owners = self.string_list_param(params, scope.owners_param)?;

        let mut filter = Filter::all()
            .and(FilterExpr::in_list(
                scope.owner_field,
                owners.into_iter().map(DocValue::String).collect(),
            ))
            .and(FilterExpr::lt(scope.start_field, DocValue::Timestamp(requested_end)))
            .and(FilterExpr::gt(scope.end_field, DocValue::Timestamp(requested_start)));

        if let Some(facet) = scope.facet {
            if self.flag_param(params, facet.param) {
                filter = filter.and(FilterExpr::eq(facet.field, DocValue::String(facet.value.to_string())));
            }
        }

        Ok(filter)
    }

    /// Validates a create payload into an insert.
    pub fn insert(&self, payload: &Value) -> SchemaResult<InsertQuery> {
        let document = SchemaValidator::new(self.kind.schema()).validate_create(payload)?;
        let id = document.id().unwrap_or_default().to_string();
        Ok(InsertQuery { id, document })
    }

    /// Validates an update payload into a merge-patch by identifier.
    pub fn update(&self, payload: &Value) -> SchemaResult<UpdateQuery> {
        let patch = SchemaValidator::new(self.kind.schema()).validate_patch(payload)?;
        Ok(UpdateQuery {
            filter: Filter::by_id(patch.id.clone()),
            id: patch.id,
            set: patch.set,
        })
    }

    /// Reads the identifier of a delete payload.
    pub fn delete(&self, payload: &Value) -> SchemaResult<DeleteQuery> {
        let params = payload
            .as_object()
            .ok_or_else(|| SchemaError::not_an_object(self.collection(), json_type_name(payload)))?;
        let id = required_id(self.collection(), params)?;
        Ok(DeleteQuery {
            filter: Filter::by_id(id.clone()),
            id,
        })
    }

    fn string_param(&self, params: &Map<String, Value>, name: &str) -> SchemaResult<String> {
        match params.get(name) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Null) | None => Err(SchemaError::missing_field(self.collection(), name)),
            Some(other) => Err(SchemaError::type_mismatch(
                self.collection(),
                name,
                "string",
                json_type_name(other),
            )),
        }
    }

    fn string_list_param(&self, params: &Map<String, Value>, name: &str) -> SchemaResult<Vec<String>> {
        let items = match params.get(name) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => return Err(SchemaError::missing_field(self.collection(), name)),
            Some(other) => {
                return Err(SchemaError::type_mismatch(
                    self.collection(),
                    name,
                    "array",
                    json_type_name(other),
                ))
            }
        };

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    SchemaError::type_mismatch(
                        self.collection(),
                        format!("{}[{}]", name, i),
                        "string",
                        json_type_name(item),
                    )
                })
            })
            .collect()
    }

    fn timestamp_param(
        &self,
        params: &Map<String, Value>,
        name: &str,
    ) -> SchemaResult<chrono::DateTime<chrono::Utc>> {
        let raw = self.string_param(params, name)?;
        parse_timestamp(&raw).ok_or_else(|| SchemaError::invalid_timestamp(self.collection(), name, &raw))
    }

    /// Flags are read by truthiness, as older clients send `1` or `"true"`:
    /// absent, `null`, `false`, `0`, `""`, `[]` and `{}` are off.
    fn flag_param(&self, params: &Map<String, Value>, name: &str) -> bool {
        match params.get(name) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::Object(fields)) => !fields.is_empty(),
        }
    }
}

//! Entity registry
//!
//! Declares the six collections served by the gateway: their schemas, their
//! HTTP route prefixes and how a list request scopes its result.

use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;

use super::types::{FieldDef, FieldType, Schema};

/// The entity kinds served by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Event,
    ToDoList,
    Note,
    Recipe,
    Recommendation,
    GameConfig,
}

/// Optional flag on an interval query that narrows by a fixed field value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlagFacet {
    /// Boolean request parameter
    pub param: &'static str,
    /// Document field compared when the flag is set
    pub field: &'static str,
    /// Required field value
    pub value: &'static str,
}

/// Half-open interval overlap query over a set of owners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntervalScope {
    /// Request parameter with the owner set
    pub owners_param: &'static str,
    /// Document field holding the owner
    pub owner_field: &'static str,
    /// Document field where the interval starts (request parameter of the same name)
    pub start_field: &'static str,
    /// Document field where the interval ends (request parameter of the same name)
    pub end_field: &'static str,
    pub facet: Option<FlagFacet>,
}

/// How a list request selects documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListScope {
    /// Every document; the request body is ignored
    All,
    /// Exact match on a required request parameter of the same name
    Owner { field: &'static str },
    /// Exact match when the parameter is a non-empty string, else everything
    Facet { field: &'static str },
    /// Interval overlap query
    Interval(IntervalScope),
}

impl ListScope {
    /// Whether the list request needs a JSON object body
    pub fn needs_body(&self) -> bool {
        !matches!(self, ListScope::All)
    }
}

impl EntityKind {
    /// All entity kinds, in route registration order
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Event,
        EntityKind::Note,
        EntityKind::ToDoList,
        EntityKind::Recipe,
        EntityKind::Recommendation,
        EntityKind::GameConfig,
    ];

    /// Path segment the entity's routes live under
    pub fn route_prefix(&self) -> &'static str {
        match self {
            EntityKind::Event => "vevent",
            EntityKind::ToDoList => "vtodolist",
            EntityKind::Note => "vnote",
            EntityKind::Recipe => "vrecipe",
            EntityKind::Recommendation => "vrecommendation",
            EntityKind::GameConfig => "vgameConfig",
        }
    }

    /// Store collection name
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Event => "events",
            EntityKind::ToDoList => "todolists",
            EntityKind::Note => "notes",
            EntityKind::Recipe => "recipes",
            EntityKind::Recommendation => "recommendations",
            EntityKind::GameConfig => "gameConfigs",
        }
    }

    /// Human-readable name used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Event => "Event",
            EntityKind::ToDoList => "To-Do List",
            EntityKind::Note => "Note",
            EntityKind::Recipe => "Recipe",
            EntityKind::Recommendation => "Recommendation",
            EntityKind::GameConfig => "Game config",
        }
    }

    pub fn from_route_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.route_prefix() == prefix)
    }

    pub fn list_scope(&self) -> ListScope {
        match self {
            EntityKind::Event => ListScope::Interval(IntervalScope {
                owners_param: "persons",
                owner_field: "person",
                start_field: "start",
                end_field: "end",
                facet: Some(FlagFacet {
                    param: "isSalettl",
                    field: "location",
                    value: "Salettl",
                }),
            }),
            EntityKind::ToDoList | EntityKind::Note => ListScope::Owner { field: "person" },
            EntityKind::Recommendation => ListScope::Facet { field: "type" },
            EntityKind::Recipe | EntityKind::GameConfig => ListScope::All,
        }
    }

    /// The schema for this entity, built once per process
    pub fn schema(&self) -> &'static Schema {
        static SCHEMAS: OnceLock<[Schema; 6]> = OnceLock::new();
        let schemas = SCHEMAS.get_or_init(|| EntityKind::ALL.map(|kind| kind.build_schema()));
        let index = EntityKind::ALL
            .iter()
            .position(|kind| kind == self)
            .unwrap_or_default();
        &schemas[index]
    }

    fn build_schema(&self) -> Schema {
        let collection = self.collection();
        match self {
            EntityKind::Event => Schema::new(
                collection,
                [
                    ("title", FieldDef::required_string()),
                    ("description", FieldDef::optional_string()),
                    ("participants", FieldDef::required_int()),
                    ("location", FieldDef::optional_string()),
                    ("start", FieldDef::required_timestamp()),
                    ("end", FieldDef::required_timestamp()),
                    ("person", FieldDef::required_string()),
                ],
            ),
            EntityKind::ToDoList => Schema::new(
                collection,
                [
                    ("creator", FieldDef::required_string()),
                    ("person", FieldDef::required_string()),
                    ("title", FieldDef::required_string()),
                    (
                        "list",
                        FieldDef::required_array(FieldType::object([
                            ("context", FieldDef::required_string()),
                            ("active", FieldDef::required_bool()),
                        ])),
                    ),
                    ("created_at", FieldDef::required_timestamp()),
                    ("last_edited", FieldDef::required_timestamp()),
                ],
            ),
            // created_at / last_edited stay opaque strings for notes
            EntityKind::Note => Schema::new(
                collection,
                [
                    ("title", FieldDef::required_string()),
                    ("content", FieldDef::optional_string()),
                    ("created_at", FieldDef::required_string()),
                    ("last_edited", FieldDef::required_string()),
                    ("person", FieldDef::required_string()),
                    ("creator", FieldDef::required_string()),
                ],
            ),
            EntityKind::Recipe => Schema::new(
                collection,
                [
                    ("title", FieldDef::required_string()),
                    ("owner", FieldDef::required_string()),
                    (
                        "ingredients",
                        FieldDef::required_array(FieldType::object([
                            ("name", FieldDef::required_string()),
                            ("amount", FieldDef::required_int()),
                            ("unit", FieldDef::required_string()),
                        ])),
                    ),
                    ("guide", FieldDef::required_string()),
                    ("persons", FieldDef::required_int()),
                ],
            ),
            EntityKind::Recommendation => Schema::new(
                collection,
                [
                    ("title", FieldDef::required_string()),
                    ("creator", FieldDef::required_string()),
                    ("description", FieldDef::required_string()),
                    ("type", FieldDef::required_string()),
                ],
            ),
            EntityKind::GameConfig => Schema::new(
                collection,
                [
                    ("configName", FieldDef::required_string()),
                    ("rufspielTarif", FieldDef::required_int()),
                    ("soloTarif", FieldDef::required_int()),
                    ("bonusTarif", FieldDef::required_int()),
                    ("alleWeiter", FieldDef::required_string()),
                    ("soloArten", FieldDef::required_array(FieldType::String)),
                    ("hochzeit", FieldDef::required_bool()),
                    ("klopfen", FieldDef::required_bool()),
                    ("ramschTarif", FieldDef::required_int()),
                ],
            ),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.route_prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_schema_is_well_formed() {
        for kind in EntityKind::ALL {
            let schema = kind.schema();
            assert_eq!(schema.collection, kind.collection());
            assert!(schema.validate_structure().is_ok(), "{}", kind);
        }
    }

    #[test]
    fn test_route_prefixes_are_unique_and_resolvable() {
        let prefixes: HashSet<_> = EntityKind::ALL.iter().map(|k| k.route_prefix()).collect();
        assert_eq!(prefixes.len(), 6);

        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_route_prefix(kind.route_prefix()), Some(kind));
        }
        assert_eq!(EntityKind::from_route_prefix("vunknown"), None);
    }

    #[test]
    fn test_note_timestamps_are_plain_strings() {
        let schema = EntityKind::Note.schema();
        assert_eq!(schema.field("created_at").unwrap().field_type, FieldType::String);

        let schema = EntityKind::ToDoList.schema();
        assert_eq!(schema.field("created_at").unwrap().field_type, FieldType::Timestamp);
    }

    #[test]
    fn test_list_scopes() {
        assert!(!EntityKind::Recipe.list_scope().needs_body());
        assert!(!EntityKind::GameConfig.list_scope().needs_body());
        assert!(EntityKind::Recommendation.list_scope().needs_body());
        assert_eq!(
            EntityKind::Note.list_scope(),
            ListScope::Owner { field: "person" }
        );
    }
}

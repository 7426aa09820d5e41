//! The `Entity` trait ties a record struct to its backend table.

use crate::error::{Error, Result};
use crate::fields::{self, FieldSelection, FieldSpec};
use crate::ids::RecordId;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The CRM entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// A person.
    Contact,
    /// An organization.
    Company,
    /// A sales opportunity.
    Deal,
    /// A logged interaction.
    Activity,
    /// A price quote.
    Quote,
    /// A sales order.
    SalesOrder,
    /// A to-do item.
    Task,
    /// A pipeline column.
    PipelineStage,
}

impl EntityKind {
    /// Every entity kind, in menu order.
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Contact,
        EntityKind::Company,
        EntityKind::Deal,
        EntityKind::Activity,
        EntityKind::Quote,
        EntityKind::SalesOrder,
        EntityKind::Task,
        EntityKind::PipelineStage,
    ];

    /// Singular, kebab-case name used in logs and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Contact => "contact",
            EntityKind::Company => "company",
            EntityKind::Deal => "deal",
            EntityKind::Activity => "activity",
            EntityKind::Quote => "quote",
            EntityKind::SalesOrder => "sales-order",
            EntityKind::Task => "task",
            EntityKind::PipelineStage => "pipeline-stage",
        }
    }

    /// Capitalized name for messages, e.g. "Sales order".
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Contact => "Contact",
            EntityKind::Company => "Company",
            EntityKind::Deal => "Deal",
            EntityKind::Activity => "Activity",
            EntityKind::Quote => "Quote",
            EntityKind::SalesOrder => "Sales order",
            EntityKind::Task => "Task",
            EntityKind::PipelineStage => "Pipeline stage",
        }
    }

    /// Plural name.
    pub fn plural(self) -> &'static str {
        match self {
            EntityKind::Contact => "contacts",
            EntityKind::Company => "companies",
            EntityKind::Deal => "deals",
            EntityKind::Activity => "activities",
            EntityKind::Quote => "quotes",
            EntityKind::SalesOrder => "sales-orders",
            EntityKind::Task => "tasks",
            EntityKind::PipelineStage => "pipeline-stages",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        EntityKind::ALL
            .into_iter()
            .find(|k| k.name() == normalized || k.plural() == normalized)
            .ok_or_else(|| Error::validation_field("entity", format!("unknown entity '{s}'")))
    }
}

/// Default server-side ordering of a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultOrder {
    /// Backend field name.
    pub field: &'static str,
    /// Descending when `true`.
    pub descending: bool,
}

impl DefaultOrder {
    /// Most recently modified first.
    pub const MODIFIED_DESC: DefaultOrder = DefaultOrder {
        field: "ModifiedOn",
        descending: true,
    };

    /// Most recently created first.
    pub const CREATED_DESC: DefaultOrder = DefaultOrder {
        field: "CreatedOn",
        descending: true,
    };
}

/// A record type stored in one backend table.
///
/// Records serialize to UI-named maps (camelCase); the [`FIELDS`](Entity::FIELDS)
/// table translates those to and from backend names.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Which entity this is.
    const KIND: EntityKind;

    /// Backend table name.
    const TABLE: &'static str;

    /// UI ↔ backend field mapping.
    const FIELDS: &'static [FieldSpec];

    /// Ordering used by list queries.
    const DEFAULT_ORDER: DefaultOrder = DefaultOrder::MODIFIED_DESC;

    /// Backend field used for server-side free-text search.
    const SEARCH_FIELD: &'static str = "Name";

    /// Backend field used for server-side status filtering, if any.
    const STATUS_FIELD: Option<&'static str> = None;

    /// Identity of this record.
    fn id(&self) -> RecordId;

    /// Client-side validation run before create and full updates.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Backend-named map of this record.
    fn to_backend(&self, selection: FieldSelection) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(ui) => Ok(fields::to_backend(Self::FIELDS, &ui, selection)),
            _ => Err(Error::validation(format!(
                "{} did not serialize to an object",
                Self::KIND
            ))),
        }
    }

    /// Parses a backend-named map into a record.
    fn from_backend(backend: &Map<String, Value>) -> Result<Self> {
        let ui = fields::to_ui(Self::FIELDS, backend);
        Ok(serde_json::from_value(Value::Object(ui))?)
    }
}

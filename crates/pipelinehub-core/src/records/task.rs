use crate::entity::{Entity, EntityKind};
use crate::error::Result;
use crate::fields::{FieldDefault, FieldSpec, system_fields};
use crate::ids::{Lookup, RecordId};
use crate::validate;
use serde::{Deserialize, Serialize};

/// A to-do item, optionally tied to an activity or deal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    /// Backend identity
    pub id: RecordId,
    /// Task name
    pub name: String,
    /// Task title
    pub title: String,
    /// Details
    pub description: String,
    /// Workflow status; empty means the create default
    pub status: String,
    /// "High", "Medium" or "Low"; empty means the create default
    pub priority: String,
    /// Due date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Assignee
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_id: Option<Lookup>,
    /// Originating activity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<Lookup>,
    /// Related deal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<Lookup>,
    /// Creation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last modification timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

const SYSTEM: [FieldSpec; 3] = system_fields();

const FIELDS: &[FieldSpec] = &[
    SYSTEM[0],
    SYSTEM[1],
    SYSTEM[2],
    FieldSpec::text("name", "Name"),
    FieldSpec::text("title", "title_c"),
    FieldSpec::text("description", "description_c").with_default(FieldDefault::Text("")),
    FieldSpec::text("status", "status_c").with_default(FieldDefault::Text("Open")),
    FieldSpec::text("priority", "priority_c").with_default(FieldDefault::Text("Medium")),
    FieldSpec::date("dueDate", "due_date_c"),
    FieldSpec::lookup("assignedToId", "assigned_to_id_c"),
    FieldSpec::lookup("activityId", "activity_id_c"),
    FieldSpec::lookup("dealId", "deal_id_c"),
];

impl Entity for Task {
    const KIND: EntityKind = EntityKind::Task;
    const TABLE: &'static str = "tasks_c";
    const FIELDS: &'static [FieldSpec] = FIELDS;
    const STATUS_FIELD: Option<&'static str> = Some("status_c");

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<()> {
        validate::require("name", &self.name)?;
        validate::require("title", &self.title)
    }
}

impl Task {
    /// A new, not yet created task.
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            ..Self::default()
        }
    }
}

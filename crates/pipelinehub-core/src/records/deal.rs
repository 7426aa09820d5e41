use crate::entity::{Entity, EntityKind};
use crate::error::{Error, Result};
use crate::fields::{FieldDefault, FieldSpec, system_fields};
use crate::ids::{Lookup, RecordId};
use crate::validate;
use serde::{Deserialize, Serialize};

/// Stage name of a deal that closed successfully.
pub const STAGE_WON: &str = "Won";

/// Stage name of a deal that closed unsuccessfully.
pub const STAGE_LOST: &str = "Lost";

/// A sales opportunity moving through the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deal {
    /// Backend identity
    pub id: RecordId,
    /// Short description
    pub title: String,
    /// Monetary value
    pub value: f64,
    /// Pipeline stage name; empty means the create default
    pub stage: String,
    /// Win probability in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<i64>,
    /// "High", "Medium" or "Low"; empty means the create default
    pub priority: String,
    /// Primary contact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<Lookup>,
    /// Expected close date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_close_date: Option<String>,
    /// Free-form notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
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
    FieldSpec::text("title", "title_c"),
    FieldSpec::float("value", "value_c"),
    FieldSpec::text("stage", "stage_c").with_default(FieldDefault::Text("Lead")),
    FieldSpec::integer("probability", "probability_c").with_default(FieldDefault::Integer(10)),
    FieldSpec::text("priority", "priority_c").with_default(FieldDefault::Text("Medium")),
    FieldSpec::lookup("contactId", "contact_id_c"),
    FieldSpec::date("expectedCloseDate", "expected_close_date_c"),
    FieldSpec::text("notes", "notes_c"),
];

impl Entity for Deal {
    const KIND: EntityKind = EntityKind::Deal;
    const TABLE: &'static str = "deal_c";
    const FIELDS: &'static [FieldSpec] = FIELDS;
    const SEARCH_FIELD: &'static str = "title_c";
    const STATUS_FIELD: Option<&'static str> = Some("stage_c");

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<()> {
        validate::require("title", &self.title)?;
        validate::positive("value", self.value)?;
        if self.contact_id.is_none() {
            return Err(Error::validation_field("contactId", "contact is required"));
        }
        Ok(())
    }
}

impl Deal {
    /// A new, not yet created deal.
    pub fn new(title: impl Into<String>, value: f64) -> Self {
        Self {
            title: title.into(),
            value,
            ..Self::default()
        }
    }

    /// Sets the stage.
    pub fn in_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = stage.into();
        self
    }

    /// Sets the primary contact.
    pub fn for_contact(mut self, contact: impl Into<RecordId>) -> Self {
        self.contact_id = Some(Lookup::new(contact));
        self
    }

    /// Returns `true` unless the deal is won or lost.
    pub fn is_open(&self) -> bool {
        self.stage != STAGE_WON && self.stage != STAGE_LOST
    }

    /// Returns `true` if the deal belongs to `contact`.
    pub fn belongs_to(&self, contact: RecordId) -> bool {
        self.contact_id.as_ref().is_some_and(|c| c.id == contact)
    }
}

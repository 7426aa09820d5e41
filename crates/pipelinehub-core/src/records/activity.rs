use crate::entity::{DefaultOrder, Entity, EntityKind};
use crate::error::Result;
use crate::fields::{FieldSpec, system_fields};
use crate::ids::{Lookup, RecordId};
use crate::validate;
use serde::{Deserialize, Serialize};

/// A logged interaction: call, email, meeting, note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Activity {
    /// Backend identity
    pub id: RecordId,
    /// Kind of interaction, e.g. "call"
    #[serde(rename = "type")]
    pub activity_type: String,
    /// What happened
    pub description: String,
    /// Contact involved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<Lookup>,
    /// Deal involved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<Lookup>,
    /// When it happened
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Who logged it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
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
    FieldSpec::text("type", "type_c"),
    FieldSpec::text("description", "description_c"),
    FieldSpec::lookup("contactId", "contact_id_c"),
    FieldSpec::lookup("dealId", "deal_id_c"),
    FieldSpec::date("timestamp", "timestamp_c"),
    FieldSpec::text("userId", "user_id_c"),
];

impl Entity for Activity {
    const KIND: EntityKind = EntityKind::Activity;
    const TABLE: &'static str = "activity_c";
    const FIELDS: &'static [FieldSpec] = FIELDS;
    const DEFAULT_ORDER: DefaultOrder = DefaultOrder {
        field: "timestamp_c",
        descending: true,
    };
    const SEARCH_FIELD: &'static str = "description_c";
    const STATUS_FIELD: Option<&'static str> = Some("type_c");

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<()> {
        validate::require("type", &self.activity_type)?;
        validate::require("description", &self.description)
    }
}

impl Activity {
    /// A new activity of `activity_type` happening at `timestamp`.
    pub fn new(
        activity_type: impl Into<String>,
        description: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            activity_type: activity_type.into(),
            description: description.into(),
            timestamp: Some(timestamp.into()),
            ..Self::default()
        }
    }

    /// When the activity happened, falling back to its creation time.
    pub fn occurred_at(&self) -> Option<&str> {
        self.timestamp.as_deref().or(self.created_at.as_deref())
    }
}

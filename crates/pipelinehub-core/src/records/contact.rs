use crate::entity::{Entity, EntityKind};
use crate::error::Result;
use crate::fields::{FieldSpec, system_fields};
use crate::ids::RecordId;
use crate::validate;
use serde::{Deserialize, Serialize};

/// A person the sales team talks to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    /// Backend identity
    pub id: RecordId,
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Employer, free text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Labels such as "vip"
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
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
    FieldSpec::text("name", "Name"),
    FieldSpec::text("email", "email_c"),
    FieldSpec::text("phone", "phone_c"),
    FieldSpec::text("company", "company_c"),
    FieldSpec::tags("tags", "Tags"),
    FieldSpec::text("notes", "notes_c"),
];

impl Entity for Contact {
    const KIND: EntityKind = EntityKind::Contact;
    const TABLE: &'static str = "contact_c";
    const FIELDS: &'static [FieldSpec] = FIELDS;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<()> {
        validate::require("name", &self.name)?;
        validate::email("email", &self.email)
    }
}

impl Contact {
    /// A new, not yet created contact.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    /// Adds a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

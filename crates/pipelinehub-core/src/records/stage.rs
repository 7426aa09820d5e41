use crate::entity::{DefaultOrder, Entity, EntityKind};
use crate::error::Result;
use crate::fields::{FieldSpec, system_fields};
use crate::ids::RecordId;
use crate::validate;
use serde::{Deserialize, Serialize};

/// One column of the deal pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineStage {
    /// Backend identity
    pub id: RecordId,
    /// Stage name, matched against `Deal::stage`
    pub name: String,
    /// Position on the board
    pub order: i64,
    /// Display color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
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
    FieldSpec::integer("order", "order_c"),
    FieldSpec::text("color", "color_c"),
];

impl Entity for PipelineStage {
    const KIND: EntityKind = EntityKind::PipelineStage;
    const TABLE: &'static str = "pipeline_stage_c";
    const FIELDS: &'static [FieldSpec] = FIELDS;
    const DEFAULT_ORDER: DefaultOrder = DefaultOrder {
        field: "order_c",
        descending: false,
    };

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<()> {
        validate::require("name", &self.name)
    }
}

impl PipelineStage {
    /// A new stage at position `order`.
    pub fn new(name: impl Into<String>, order: i64) -> Self {
        Self {
            name: name.into(),
            order,
            ..Self::default()
        }
    }
}

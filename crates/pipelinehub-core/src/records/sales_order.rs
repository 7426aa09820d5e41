use crate::entity::{Entity, EntityKind};
use crate::error::Result;
use crate::fields::{FieldDefault, FieldSpec, system_fields};
use crate::ids::{Lookup, RecordId};
use crate::validate;
use serde::{Deserialize, Serialize};

/// A confirmed customer order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesOrder {
    /// Backend identity
    pub id: RecordId,
    /// Order name
    pub name: String,
    /// Order date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_date: Option<String>,
    /// Ordering customer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Lookup>,
    /// Order total; absent means the create default of zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    /// Workflow status; empty means the create default
    pub status: String,
    /// Shipping address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    /// Billing address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<String>,
    /// Free-form notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Labels
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
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
    FieldSpec::date("orderDate", "order_date_c"),
    FieldSpec::lookup("customerId", "customer_id_c"),
    FieldSpec::float("totalAmount", "total_amount_c").with_default(FieldDefault::Float(0.0)),
    FieldSpec::text("status", "status_c").with_default(FieldDefault::Text("Draft")),
    FieldSpec::text("shippingAddress", "shipping_address_c"),
    FieldSpec::text("billingAddress", "billing_address_c"),
    FieldSpec::text("notes", "notes_c"),
    FieldSpec::tags("tags", "Tags"),
];

impl Entity for SalesOrder {
    const KIND: EntityKind = EntityKind::SalesOrder;
    const TABLE: &'static str = "sales_order_c";
    const FIELDS: &'static [FieldSpec] = FIELDS;
    const STATUS_FIELD: Option<&'static str> = Some("status_c");

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<()> {
        validate::require("name", &self.name)?;
        validate::non_negative("totalAmount", self.total_amount)
    }
}

impl SalesOrder {
    /// A new, not yet created order.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

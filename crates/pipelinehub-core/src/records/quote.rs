use crate::entity::{DefaultOrder, Entity, EntityKind};
use crate::error::Result;
use crate::fields::{FieldDefault, FieldSpec, system_fields};
use crate::ids::{Lookup, RecordId};
use crate::validate;
use serde::{Deserialize, Serialize};

/// A priced offer sent to a customer.
///
/// Billing and shipping addresses are flattened into `billTo*` and
/// `shipTo*` fields, one per backend column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Quote {
    /// Backend identity
    pub id: RecordId,
    /// Quote name
    pub name: String,
    /// Quote title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Customer company
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Lookup>,
    /// Customer contact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<Lookup>,
    /// Related deal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<Lookup>,
    /// Issue date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_date: Option<String>,
    /// Workflow status; empty means the create default
    pub status: String,
    /// How the quote is delivered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_method: Option<String>,
    /// Expiry date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<String>,
    /// Bill-to name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_to_name: Option<String>,
    /// Bill-to street
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_to_street: Option<String>,
    /// Bill-to city
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_to_city: Option<String>,
    /// Bill-to state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_to_state: Option<String>,
    /// Bill-to country
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_to_country: Option<String>,
    /// Bill-to postal code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_to_pincode: Option<String>,
    /// Ship-to name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_to_name: Option<String>,
    /// Ship-to street
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_to_street: Option<String>,
    /// Ship-to city
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_to_city: Option<String>,
    /// Ship-to state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_to_state: Option<String>,
    /// Ship-to country
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_to_country: Option<String>,
    /// Ship-to postal code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_to_pincode: Option<String>,
    /// Free-form notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Total amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    /// Discount amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
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
    FieldSpec::text("title", "title_c"),
    FieldSpec::lookup("companyId", "company_id_c"),
    FieldSpec::lookup("contactId", "contact_id_c"),
    FieldSpec::lookup("dealId", "deal_id_c"),
    FieldSpec::date("quoteDate", "quote_date_c"),
    FieldSpec::text("status", "status_c").with_default(FieldDefault::Text("Draft")),
    FieldSpec::text("deliveryMethod", "delivery_method_c"),
    FieldSpec::date("expiresOn", "expires_on_c"),
    FieldSpec::text("billToName", "bill_to_name_c"),
    FieldSpec::text("billToStreet", "bill_to_street_c"),
    FieldSpec::text("billToCity", "bill_to_city_c"),
    FieldSpec::text("billToState", "bill_to_state_c"),
    FieldSpec::text("billToCountry", "bill_to_country_c"),
    FieldSpec::text("billToPincode", "bill_to_pincode_c"),
    FieldSpec::text("shipToName", "ship_to_name_c"),
    FieldSpec::text("shipToStreet", "ship_to_street_c"),
    FieldSpec::text("shipToCity", "ship_to_city_c"),
    FieldSpec::text("shipToState", "ship_to_state_c"),
    FieldSpec::text("shipToCountry", "ship_to_country_c"),
    FieldSpec::text("shipToPincode", "ship_to_pincode_c"),
    FieldSpec::text("notes", "notes_c"),
    FieldSpec::float("totalAmount", "total_amount_c"),
    FieldSpec::float("discount", "discount_c"),
    FieldSpec::tags("tags", "Tags"),
];

impl Entity for Quote {
    const KIND: EntityKind = EntityKind::Quote;
    const TABLE: &'static str = "quote_c";
    const FIELDS: &'static [FieldSpec] = FIELDS;
    const DEFAULT_ORDER: DefaultOrder = DefaultOrder::CREATED_DESC;
    const STATUS_FIELD: Option<&'static str> = Some("status_c");

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<()> {
        validate::require("name", &self.name)?;
        validate::non_negative("totalAmount", self.total_amount)?;
        validate::non_negative("discount", self.discount)
    }
}

impl Quote {
    /// A new, not yet created quote.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fields::FieldSelection;
    use serde_json::json;

    #[test]
    fn test_quote_defaults_to_draft() {
        let backend = Quote::new("Q-1").to_backend(FieldSelection::Create).unwrap();
        assert_eq!(backend.get("status_c"), Some(&json!("Draft")));
    }

    #[test]
    fn test_quote_address_columns() {
        let quote = Quote {
            bill_to_city: Some("Lyon".to_string()),
            ship_to_pincode: Some("69001".to_string()),
            ..Quote::new("Q-2")
        };
        let backend = quote.to_backend(FieldSelection::Create).unwrap();
        assert_eq!(backend.get("bill_to_city_c"), Some(&json!("Lyon")));
        assert_eq!(backend.get("ship_to_pincode_c"), Some(&json!("69001")));
    }

    #[test]
    fn test_quote_orders_by_creation() {
        assert_eq!(Quote::DEFAULT_ORDER.field, "CreatedOn");
        assert!(Quote::DEFAULT_ORDER.descending);
    }
}

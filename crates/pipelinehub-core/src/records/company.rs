use crate::entity::{Entity, EntityKind};
use crate::error::Result;
use crate::fields::{FieldSpec, system_fields};
use crate::ids::RecordId;
use crate::validate;
use serde::{Deserialize, Serialize};

/// An organization contacts belong to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Company {
    /// Backend identity
    pub id: RecordId,
    /// Company name
    pub name: String,
    /// Labels
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Industry, used as a facet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Street address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// City
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State or region
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Postal code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    /// Phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Website URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Head count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_employees: Option<i64>,
    /// Annual revenue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_revenue: Option<f64>,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Logo URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
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
    FieldSpec::tags("tags", "Tags"),
    FieldSpec::text("industry", "industry_c"),
    FieldSpec::text("address", "address_c"),
    FieldSpec::text("city", "city_c"),
    FieldSpec::text("state", "state_c"),
    FieldSpec::text("zipCode", "zip_code_c"),
    FieldSpec::text("phone", "phone_c"),
    FieldSpec::text("website", "website_c"),
    FieldSpec::integer("numberOfEmployees", "number_of_employees_c"),
    FieldSpec::float("annualRevenue", "annual_revenue_c"),
    FieldSpec::text("description", "description_c"),
    FieldSpec::text("logo", "logo_c"),
];

impl Entity for Company {
    const KIND: EntityKind = EntityKind::Company;
    const TABLE: &'static str = "company_c";
    const FIELDS: &'static [FieldSpec] = FIELDS;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<()> {
        validate::require("name", &self.name)?;
        validate::optional_url("website", self.website.as_deref())?;
        validate::non_negative(
            "numberOfEmployees",
            self.number_of_employees.map(|n| n as f64),
        )?;
        validate::non_negative("annualRevenue", self.annual_revenue)
    }
}

impl Company {
    /// A new, not yet created company.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if annual revenue is known and positive.
    pub fn has_revenue(&self) -> bool {
        self.annual_revenue.is_some_and(|r| r > 0.0)
    }
}

//! [`Viewable`] for every record type.
//!
//! Sort keys are the records' UI field names.

use pipelinehub_core::records::{
    Activity, Company, Contact, Deal, PipelineStage, Quote, SalesOrder, Task,
};

use crate::filter::{Facet, Viewable};
use crate::sort::SortValue;

fn push_opt<'a>(fields: &mut Vec<&'a str>, value: Option<&'a str>) {
    if let Some(value) = value {
        fields.push(value);
    }
}

fn tag_values(tags: &[String]) -> Vec<&str> {
    tags.iter().map(String::as_str).collect()
}

fn one(value: &str) -> Vec<&str> {
    vec![value]
}

impl Viewable for Contact {
    const FACETS: &'static [Facet] = &[Facet::Tag];
    const SORT_KEYS: &'static [&'static str] =
        &["name", "email", "company", "createdAt", "updatedAt"];

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.email.as_str()];
        push_opt(&mut fields, self.company.as_deref());
        fields
    }

    fn facet_values(&self, facet: Facet) -> Vec<&str> {
        match facet {
            Facet::Tag => tag_values(&self.tags),
            _ => Vec::new(),
        }
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        Some(match key {
            "name" => SortValue::text(Some(self.name.as_str())),
            "email" => SortValue::text(Some(self.email.as_str())),
            "company" => SortValue::text(self.company.as_deref()),
            "createdAt" => SortValue::date(self.created_at.as_deref()),
            "updatedAt" => SortValue::date(self.updated_at.as_deref()),
            _ => return None,
        })
    }
}

impl Viewable for Company {
    const FACETS: &'static [Facet] = &[Facet::Industry, Facet::Tag];
    const SORT_KEYS: &'static [&'static str] = &[
        "name",
        "industry",
        "city",
        "state",
        "website",
        "numberOfEmployees",
        "annualRevenue",
        "createdAt",
        "updatedAt",
    ];

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        push_opt(&mut fields, self.industry.as_deref());
        push_opt(&mut fields, self.city.as_deref());
        fields.extend(tag_values(&self.tags));
        fields
    }

    fn facet_values(&self, facet: Facet) -> Vec<&str> {
        match facet {
            Facet::Industry => self.industry.as_deref().into_iter().collect(),
            Facet::Tag => tag_values(&self.tags),
            _ => Vec::new(),
        }
    }

    // Company tables compare every column as text.
    fn sort_value(&self, key: &str) -> Option<SortValue> {
        let text = match key {
            "name" => Some(self.name.clone()),
            "industry" => self.industry.clone(),
            "city" => self.city.clone(),
            "state" => self.state.clone(),
            "website" => self.website.clone(),
            "numberOfEmployees" => self.number_of_employees.map(|n| n.to_string()),
            "annualRevenue" => self.annual_revenue.map(|r| r.to_string()),
            "createdAt" => self.created_at.clone(),
            "updatedAt" => self.updated_at.clone(),
            _ => return None,
        };
        Some(SortValue::text(text.as_deref()))
    }
}

impl Viewable for Deal {
    const FACETS: &'static [Facet] = &[Facet::Stage, Facet::Priority];
    const SORT_KEYS: &'static [&'static str] = &[
        "title",
        "value",
        "stage",
        "probability",
        "priority",
        "contactId",
        "expectedCloseDate",
        "createdAt",
        "updatedAt",
    ];

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        push_opt(&mut fields, self.contact_id.as_ref().and_then(|c| c.name.as_deref()));
        push_opt(&mut fields, self.notes.as_deref());
        fields
    }

    fn facet_values(&self, facet: Facet) -> Vec<&str> {
        match facet {
            Facet::Stage => one(&self.stage),
            Facet::Priority => one(&self.priority),
            _ => Vec::new(),
        }
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        Some(match key {
            "title" => SortValue::text(Some(self.title.as_str())),
            "value" => SortValue::number(Some(self.value)),
            "stage" => SortValue::text(Some(self.stage.as_str())),
            "probability" => SortValue::integer(self.probability),
            "priority" => SortValue::text(Some(self.priority.as_str())),
            "contactId" => SortValue::lookup(self.contact_id.as_ref()),
            "expectedCloseDate" => SortValue::date(self.expected_close_date.as_deref()),
            "createdAt" => SortValue::date(self.created_at.as_deref()),
            "updatedAt" => SortValue::date(self.updated_at.as_deref()),
            _ => return None,
        })
    }
}

impl Viewable for Activity {
    const FACETS: &'static [Facet] = &[Facet::ActivityType];
    const SORT_KEYS: &'static [&'static str] = &["type", "description", "timestamp", "createdAt"];

    fn search_fields(&self) -> Vec<&str> {
        vec![self.description.as_str(), self.activity_type.as_str()]
    }

    fn facet_values(&self, facet: Facet) -> Vec<&str> {
        match facet {
            Facet::ActivityType => one(&self.activity_type),
            _ => Vec::new(),
        }
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        Some(match key {
            "type" => SortValue::text(Some(self.activity_type.as_str())),
            "description" => SortValue::text(Some(self.description.as_str())),
            "timestamp" => SortValue::date(self.occurred_at()),
            "createdAt" => SortValue::date(self.created_at.as_deref()),
            _ => return None,
        })
    }
}

impl Viewable for Quote {
    const FACETS: &'static [Facet] = &[Facet::Status];
    const SORT_KEYS: &'static [&'static str] = &[
        "name",
        "title",
        "status",
        "deliveryMethod",
        "companyId",
        "contactId",
        "dealId",
        "quoteDate",
        "expiresOn",
        "totalAmount",
        "discount",
        "createdAt",
        "updatedAt",
    ];

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        push_opt(&mut fields, self.title.as_deref());
        push_opt(&mut fields, self.company_id.as_ref().and_then(|c| c.name.as_deref()));
        push_opt(&mut fields, self.contact_id.as_ref().and_then(|c| c.name.as_deref()));
        fields
    }

    fn facet_values(&self, facet: Facet) -> Vec<&str> {
        match facet {
            Facet::Status => one(&self.status),
            _ => Vec::new(),
        }
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        Some(match key {
            "name" => SortValue::text(Some(self.name.as_str())),
            "title" => SortValue::text(self.title.as_deref()),
            "status" => SortValue::text(Some(self.status.as_str())),
            "deliveryMethod" => SortValue::text(self.delivery_method.as_deref()),
            "companyId" => SortValue::lookup(self.company_id.as_ref()),
            "contactId" => SortValue::lookup(self.contact_id.as_ref()),
            "dealId" => SortValue::lookup(self.deal_id.as_ref()),
            "quoteDate" => SortValue::date(self.quote_date.as_deref()),
            "expiresOn" => SortValue::date(self.expires_on.as_deref()),
            "totalAmount" => SortValue::number(self.total_amount),
            "discount" => SortValue::number(self.discount),
            "createdAt" => SortValue::date(self.created_at.as_deref()),
            "updatedAt" => SortValue::date(self.updated_at.as_deref()),
            _ => return None,
        })
    }
}

impl Viewable for SalesOrder {
    const FACETS: &'static [Facet] = &[Facet::Status];
    const SORT_KEYS: &'static [&'static str] = &[
        "name",
        "status",
        "customerId",
        "orderDate",
        "totalAmount",
        "createdAt",
        "updatedAt",
    ];

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        push_opt(&mut fields, self.customer_id.as_ref().and_then(|c| c.name.as_deref()));
        fields.extend(tag_values(&self.tags));
        fields
    }

    fn facet_values(&self, facet: Facet) -> Vec<&str> {
        match facet {
            Facet::Status => one(&self.status),
            _ => Vec::new(),
        }
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        Some(match key {
            "name" => SortValue::text(Some(self.name.as_str())),
            "status" => SortValue::text(Some(self.status.as_str())),
            "customerId" => SortValue::lookup(self.customer_id.as_ref()),
            "orderDate" => SortValue::date(self.order_date.as_deref()),
            "totalAmount" => SortValue::number(self.total_amount),
            "createdAt" => SortValue::date(self.created_at.as_deref()),
            "updatedAt" => SortValue::date(self.updated_at.as_deref()),
            _ => return None,
        })
    }
}

impl Viewable for Task {
    const FACETS: &'static [Facet] = &[Facet::Status, Facet::Priority];
    const SORT_KEYS: &'static [&'static str] = &[
        "name",
        "title",
        "status",
        "priority",
        "dueDate",
        "createdAt",
        "updatedAt",
    ];

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.title.as_str(),
            self.description.as_str(),
        ]
    }

    fn facet_values(&self, facet: Facet) -> Vec<&str> {
        match facet {
            Facet::Status => one(&self.status),
            Facet::Priority => one(&self.priority),
            _ => Vec::new(),
        }
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        Some(match key {
            "name" => SortValue::text(Some(self.name.as_str())),
            "title" => SortValue::text(Some(self.title.as_str())),
            "status" => SortValue::text(Some(self.status.as_str())),
            "priority" => SortValue::text(Some(self.priority.as_str())),
            "dueDate" => SortValue::date(self.due_date.as_deref()),
            "createdAt" => SortValue::date(self.created_at.as_deref()),
            "updatedAt" => SortValue::date(self.updated_at.as_deref()),
            _ => return None,
        })
    }
}

impl Viewable for PipelineStage {
    const FACETS: &'static [Facet] = &[];
    const SORT_KEYS: &'static [&'static str] = &["name", "order"];

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn facet_values(&self, _facet: Facet) -> Vec<&str> {
        Vec::new()
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        Some(match key {
            "name" => SortValue::text(Some(self.name.as_str())),
            "order" => SortValue::integer(Some(self.order)),
            _ => return None,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::filter::{Filter, filter};
    use crate::sort::{SortSpec, sort};
    use pipelinehub_core::Lookup;

    fn sort_keys_resolve<T: Viewable>(sample: &T) {
        for key in T::SORT_KEYS {
            assert!(sample.sort_value(key).is_some(), "sort key {key} unresolved");
        }
        assert!(sample.sort_value("bogus").is_none());
    }

    #[test]
    fn test_every_declared_sort_key_resolves() {
        sort_keys_resolve(&Contact::default());
        sort_keys_resolve(&Company::default());
        sort_keys_resolve(&Deal::default());
        sort_keys_resolve(&Activity::default());
        sort_keys_resolve(&Quote::default());
        sort_keys_resolve(&SalesOrder::default());
        sort_keys_resolve(&Task::default());
        sort_keys_resolve(&PipelineStage::default());
    }

    #[test]
    fn test_company_search_covers_tags_and_city() {
        let companies = vec![
            Company {
                city: Some("Lisbon".to_string()),
                ..Company::new("Acme")
            },
            Company {
                tags: vec!["partner".to_string()],
                ..Company::new("Globex")
            },
        ];
        assert_eq!(filter(&companies, &Filter::new().search("lisb"))[0].name, "Acme");
        assert_eq!(filter(&companies, &Filter::new().search("PART"))[0].name, "Globex");
    }

    #[test]
    fn test_company_numbers_sort_as_text() {
        let mut companies = vec![
            Company {
                number_of_employees: Some(9),
                ..Company::new("Small")
            },
            Company {
                number_of_employees: Some(10),
                ..Company::new("Large")
            },
        ];
        sort(&mut companies, &SortSpec::asc("numberOfEmployees")).unwrap();
        assert_eq!(companies[0].name, "Large");
    }

    #[test]
    fn test_sales_orders_sort_by_customer_name() {
        let mut orders = vec![
            SalesOrder {
                customer_id: Some(Lookup::named(2, "zeta")),
                ..SalesOrder::new("SO-1")
            },
            SalesOrder {
                customer_id: Some(Lookup::named(1, "Alpha")),
                ..SalesOrder::new("SO-2")
            },
            SalesOrder::new("SO-3"),
        ];
        sort(&mut orders, &SortSpec::asc("customerId")).unwrap();
        let names: Vec<&str> = orders.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["SO-3", "SO-2", "SO-1"]);
    }

    #[test]
    fn test_quote_search_covers_lookup_names() {
        let quotes = vec![
            Quote {
                company_id: Some(Lookup::named(5, "Initech")),
                ..Quote::new("Q-1")
            },
            Quote::new("Q-2"),
        ];
        let rows = filter(&quotes, &Filter::new().search("initech"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Q-1");
    }
}

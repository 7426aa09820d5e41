//! Property-based tests for record mapping.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::entity::Entity;
    use crate::fields::FieldSelection;
    use crate::ids::{Lookup, RecordId};
    use crate::records::{Company, Contact, Deal, Task};
    use proptest::prelude::*;

    fn opt_text() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[a-zA-Z0-9 .@-]{0,16}")
    }

    fn tags() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec("[a-z]{1,8}", 0..4)
    }

    prop_compose! {
        fn arb_contact()(
            id in 1i64..1_000_000,
            name in "[A-Za-z ]{1,20}",
            email in "[a-z]{1,8}@[a-z]{1,8}\\.com",
            phone in opt_text(),
            company in opt_text(),
            tags in tags(),
            notes in opt_text(),
        ) -> Contact {
            Contact {
                id: RecordId::new(id),
                name,
                email,
                phone,
                company,
                tags,
                notes,
                created_at: Some("2024-01-01T00:00:00Z".to_string()),
                updated_at: None,
            }
        }
    }

    prop_compose! {
        fn arb_deal()(
            id in 1i64..1_000_000,
            title in "[A-Za-z ]{1,20}",
            value in 0.01f64..1.0e9,
            stage in "(Lead|Qualified|Proposal|Won|Lost)",
            probability in proptest::option::of(0i64..=100),
            priority in "(High|Medium|Low)",
            contact in proptest::option::of(1i64..10_000),
            expected_close_date in proptest::option::of("2024-0[1-9]-1[0-9]"),
            notes in opt_text(),
        ) -> Deal {
            Deal {
                id: RecordId::new(id),
                title,
                value,
                stage,
                probability,
                priority,
                contact_id: contact.map(Lookup::new),
                expected_close_date,
                notes,
                created_at: None,
                updated_at: None,
            }
        }
    }

    prop_compose! {
        fn arb_company()(
            name in "[A-Za-z ]{1,20}",
            tags in tags(),
            industry in opt_text(),
            employees in proptest::option::of(0i64..100_000),
            revenue in proptest::option::of(0.0f64..1.0e12),
        ) -> Company {
            Company {
                name,
                tags,
                industry,
                number_of_employees: employees,
                annual_revenue: revenue,
                ..Company::default()
            }
        }
    }

    proptest! {
        #[test]
        fn test_contact_backend_roundtrip(contact in arb_contact()) {
            let backend = contact.to_backend(FieldSelection::All).unwrap();
            let back = Contact::from_backend(&backend).unwrap();
            prop_assert_eq!(back, contact);
        }

        #[test]
        fn test_deal_backend_roundtrip(deal in arb_deal()) {
            let backend = deal.to_backend(FieldSelection::All).unwrap();
            let back = Deal::from_backend(&backend).unwrap();
            prop_assert_eq!(back, deal);
        }

        #[test]
        fn test_company_backend_roundtrip(company in arb_company()) {
            let backend = company.to_backend(FieldSelection::All).unwrap();
            let back = Company::from_backend(&backend).unwrap();
            prop_assert_eq!(back, company);
        }

        #[test]
        fn test_create_never_sends_read_only_fields(deal in arb_deal()) {
            let backend = deal.to_backend(FieldSelection::Create).unwrap();
            prop_assert!(!backend.contains_key("Id"));
            prop_assert!(!backend.contains_key("CreatedOn"));
            prop_assert!(!backend.contains_key("ModifiedOn"));
        }

        #[test]
        fn test_record_id_display_parse_roundtrip(raw in any::<i64>()) {
            let id = RecordId::new(raw);
            let parsed: RecordId = id.to_string().parse().unwrap();
            prop_assert_eq!(parsed, id);
        }
    }

    #[test]
    fn test_absent_fields_take_create_defaults() {
        let backend = Deal::default().to_backend(FieldSelection::Create).unwrap();
        let deal = Deal::from_backend(&backend).unwrap();
        assert_eq!(deal.stage, "Lead");
        assert_eq!(deal.priority, "Medium");
        assert_eq!(deal.probability, Some(10));
        assert_eq!(deal.contact_id, None);
        assert_eq!(deal.title, "");

        let backend = Task::default().to_backend(FieldSelection::Create).unwrap();
        let task = Task::from_backend(&backend).unwrap();
        assert_eq!(task.status, "Open");
        assert_eq!(task.priority, "Medium");
        assert_eq!(task.description, "");
    }

    #[test]
    fn test_absent_fields_roundtrip_without_defaults() {
        let contact = Contact::default();
        let backend = contact.to_backend(FieldSelection::All).unwrap();
        assert_eq!(Contact::from_backend(&backend).unwrap(), contact);
    }
}

//! Companies table statistics and dropdown values.

use pipelinehub_core::records::Company;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::aggregate::distinct_sorted;

/// Header statistics of the companies page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompanyStats {
    /// Companies shown after filtering
    pub shown: usize,
    /// Distinct industries across all companies
    pub industries: usize,
    /// Companies reporting annual revenue
    pub with_revenue: usize,
}

/// Statistics over `all` companies, `shown` of which pass the filter.
pub fn company_stats(all: &[Company], shown: usize) -> CompanyStats {
    let industries: BTreeSet<&str> = all
        .iter()
        .filter_map(|c| c.industry.as_deref())
        .filter(|i| !i.trim().is_empty())
        .collect();
    CompanyStats {
        shown,
        industries: industries.len(),
        with_revenue: all.iter().filter(|c| c.has_revenue()).count(),
    }
}

/// Sorted distinct tags across all companies.
pub fn company_tags(companies: &[Company]) -> Vec<String> {
    distinct_sorted(companies.iter().flat_map(|c| c.tags.iter().map(String::as_str)))
}

/// Sorted distinct industries.
pub fn industries(companies: &[Company]) -> Vec<String> {
    distinct_sorted(companies.iter().filter_map(|c| c.industry.as_deref()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::filter::{Facet, Filter};
    use crate::pages::{TableQuery, table_view};

    fn companies() -> Vec<Company> {
        vec![
            Company {
                industry: Some("Retail".to_string()),
                annual_revenue: Some(1_000_000.0),
                tags: vec!["partner".to_string(), "emea".to_string()],
                ..Company::new("Acme")
            },
            Company {
                industry: Some("Software".to_string()),
                tags: vec!["emea".to_string()],
                ..Company::new("Globex")
            },
            Company {
                industry: Some("Retail".to_string()),
                annual_revenue: Some(0.0),
                ..Company::new("Initech")
            },
        ]
    }

    #[test]
    fn test_stats_over_filtered_table() {
        let companies = companies();
        let query = TableQuery::new().filter(Filter::new().facet(Facet::Industry, "Retail"));
        let view = table_view(&companies, &query).unwrap();
        let stats = company_stats(&companies, view.shown());
        assert_eq!(
            stats,
            CompanyStats {
                shown: 2,
                industries: 2,
                with_revenue: 1,
            }
        );
    }

    #[test]
    fn test_distinct_tags_and_industries() {
        let companies = companies();
        assert_eq!(company_tags(&companies), vec!["emea", "partner"]);
        assert_eq!(industries(&companies), vec!["Retail", "Software"]);
    }

    #[test]
    fn test_empty_list_stats() {
        assert_eq!(company_stats(&[], 0), CompanyStats::default());
    }
}

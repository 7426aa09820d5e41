//! Contacts table and contact detail.

use pipelinehub_core::records::{Activity, Contact, Deal};
use pipelinehub_core::{RecordId, Result};
use serde::Serialize;
use std::collections::HashMap;

use crate::aggregate::distinct_sorted;
use crate::filter::{Viewable, filter};
use crate::pages::{TableQuery, TableView};
use crate::sort::{SortValue, sort, sort_by_value, unknown_key};

/// Sort key ordering contacts by the total value of their deals.
pub const DEAL_VALUE_KEY: &str = "value";

/// Every sort key the contacts table accepts.
pub fn sort_keys() -> Vec<&'static str> {
    let mut keys = <Contact as Viewable>::SORT_KEYS.to_vec();
    keys.push(DEAL_VALUE_KEY);
    keys
}

/// Total deal value per contact.
pub fn deal_totals(deals: &[Deal]) -> HashMap<RecordId, f64> {
    let mut totals = HashMap::new();
    for deal in deals {
        if let Some(contact) = &deal.contact_id {
            *totals.entry(contact.id).or_insert(0.0) += deal.value;
        }
    }
    totals
}

/// Filters and sorts contacts; the `value` key sorts by deal totals.
pub fn contacts_view<'a>(
    contacts: &'a [Contact],
    deals: &[Deal],
    query: &TableQuery,
) -> Result<TableView<&'a Contact>> {
    query.filter.check::<Contact>()?;
    let mut rows = filter(contacts, &query.filter);
    match &query.sort {
        Some(spec) if spec.key == DEAL_VALUE_KEY => {
            let totals = deal_totals(deals);
            sort_by_value(&mut rows, spec.direction, |c| {
                SortValue::number(totals.get(&c.id).copied())
            });
        }
        Some(spec) => {
            if !sort_keys().contains(&spec.key.as_str()) {
                return Err(unknown_key(&spec.key, &sort_keys()));
            }
            sort(&mut rows, spec)?;
        }
        None => {}
    }
    Ok(TableView {
        rows,
        total: contacts.len(),
    })
}

/// Sorted distinct tags across all contacts.
pub fn contact_tags(contacts: &[Contact]) -> Vec<String> {
    distinct_sorted(contacts.iter().flat_map(|c| c.tags.iter().map(String::as_str)))
}

/// A contact with its related records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactDetail<'a> {
    /// The contact
    pub contact: &'a Contact,
    /// Deals whose primary contact this is
    pub deals: Vec<&'a Deal>,
    /// Activities logged against this contact
    pub activities: Vec<&'a Activity>,
    /// Sum of the related deals' values
    pub deal_total: f64,
}

/// Gathers the deals and activities related to `contact`.
pub fn contact_detail<'a>(
    contact: &'a Contact,
    deals: &'a [Deal],
    activities: &'a [Activity],
) -> ContactDetail<'a> {
    let deals: Vec<&Deal> = deals.iter().filter(|d| d.belongs_to(contact.id)).collect();
    let activities = activities
        .iter()
        .filter(|a| a.contact_id.as_ref().is_some_and(|c| c.id == contact.id))
        .collect();
    let deal_total = deals.iter().map(|d| d.value).sum();
    ContactDetail {
        contact,
        deals,
        activities,
        deal_total,
    }
}

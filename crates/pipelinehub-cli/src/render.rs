//! Plain-text table rendering.

use pipelinehub_core::Lookup;
use pipelinehub_core::records::{
    Activity, Company, Contact, Deal, PipelineStage, Quote, SalesOrder, Task,
};
use std::io::{self, Write};

/// A record that renders as one table row.
pub trait Tabular {
    /// Column headers.
    const HEADERS: &'static [&'static str];

    /// Cell text, one per header.
    fn cells(&self) -> Vec<String>;
}

impl<T: Tabular> Tabular for &T {
    const HEADERS: &'static [&'static str] = T::HEADERS;

    fn cells(&self) -> Vec<String> {
        (*self).cells()
    }
}

fn opt(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn lookup(value: Option<&Lookup>) -> String {
    match value {
        Some(Lookup { name: Some(name), .. }) => name.clone(),
        Some(Lookup { id, .. }) => id.to_string(),
        None => String::new(),
    }
}

/// Formats an amount as dollars with thousands separators, e.g. `$12,500.00`.
pub fn money(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

fn opt_money(value: Option<f64>) -> String {
    value.map(money).unwrap_or_default()
}

impl Tabular for Contact {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "EMAIL", "COMPANY", "TAGS"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            opt(self.company.as_deref()),
            self.tags.join(", "),
        ]
    }
}

impl Tabular for Company {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "INDUSTRY", "CITY", "EMPLOYEES", "REVENUE"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            opt(self.industry.as_deref()),
            opt(self.city.as_deref()),
            self.number_of_employees.map(|n| n.to_string()).unwrap_or_default(),
            opt_money(self.annual_revenue),
        ]
    }
}

impl Tabular for Deal {
    const HEADERS: &'static [&'static str] =
        &["ID", "TITLE", "STAGE", "VALUE", "PROBABILITY", "PRIORITY", "CLOSE"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.stage.clone(),
            money(self.value),
            self.probability.map(|p| format!("{p}%")).unwrap_or_default(),
            self.priority.clone(),
            opt(self.expected_close_date.as_deref()),
        ]
    }
}

impl Tabular for Activity {
    const HEADERS: &'static [&'static str] = &["ID", "TYPE", "DESCRIPTION", "CONTACT", "WHEN"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.activity_type.clone(),
            self.description.clone(),
            lookup(self.contact_id.as_ref()),
            opt(self.occurred_at()),
        ]
    }
}

impl Tabular for Quote {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "STATUS", "COMPANY", "TOTAL", "EXPIRES"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.status.clone(),
            lookup(self.company_id.as_ref()),
            opt_money(self.total_amount),
            opt(self.expires_on.as_deref()),
        ]
    }
}

impl Tabular for SalesOrder {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "STATUS", "CUSTOMER", "TOTAL", "ORDERED"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.status.clone(),
            lookup(self.customer_id.as_ref()),
            opt_money(self.total_amount),
            opt(self.order_date.as_deref()),
        ]
    }
}

impl Tabular for Task {
    const HEADERS: &'static [&'static str] = &["ID", "TITLE", "STATUS", "PRIORITY", "DUE"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.status.clone(),
            self.priority.clone(),
            opt(self.due_date.as_deref()),
        ]
    }
}

impl Tabular for PipelineStage {
    const HEADERS: &'static [&'static str] = &["ID", "ORDER", "NAME", "COLOR"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.order.to_string(),
            self.name.clone(),
            opt(self.color.as_deref()),
        ]
    }
}

/// Writes `rows` as a left-aligned table with a header line.
pub fn render_table<T: Tabular>(rows: &[T], out: &mut impl Write) -> io::Result<()> {
    let cells: Vec<Vec<String>> = rows.iter().map(Tabular::cells).collect();
    let mut widths: Vec<usize> = T::HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header: Vec<String> = T::HEADERS.iter().map(|h| (*h).to_string()).collect();
    write_row(&header, &widths, out)?;
    for row in &cells {
        write_row(row, &widths, out)?;
    }
    Ok(())
}

fn write_row(row: &[String], widths: &[usize], out: &mut impl Write) -> io::Result<()> {
    let line: Vec<String> = row
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    writeln!(out, "{}", line.join("  ").trim_end())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pipelinehub_core::RecordId;

    fn rendered<T: Tabular>(rows: &[T]) -> String {
        let mut out = Vec::new();
        render_table(rows, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_money_groups_thousands() {
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(999.5), "$999.50");
        assert_eq!(money(1_234_567.891), "$1,234,567.89");
        assert_eq!(money(-1500.0), "-$1,500.00");
    }

    #[test]
    fn test_columns_are_padded() {
        let stages = vec![PipelineStage::new("Lead", 1), PipelineStage::new("Negotiation", 2)];
        let text = rendered(&stages);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ID  ORDER  NAME         COLOR");
        assert_eq!(lines[1], "0   1      Lead");
        assert_eq!(lines[2], "0   2      Negotiation");
    }

    #[test]
    fn test_lookup_prefers_name() {
        let mut activity = Activity::new("Call", "intro", "2024-05-01T09:00:00Z");
        activity.contact_id = Some(Lookup::named(RecordId::new(7), "Ann"));
        assert_eq!(activity.cells()[3], "Ann");
        activity.contact_id = Some(Lookup::new(RecordId::new(7)));
        assert_eq!(activity.cells()[3], "7");
    }

    #[test]
    fn test_references_render_like_values() {
        let deal = Deal::new("Renewal", 12_500.0).in_stage("Won");
        let by_ref = rendered(&[&deal]);
        let by_value = rendered(std::slice::from_ref(&deal));
        assert_eq!(by_ref, by_value);
        assert!(by_value.contains("$12,500.00"));
    }

    #[test]
    fn test_empty_table_has_header_only() {
        assert_eq!(rendered::<Task>(&[]), "ID  TITLE  STATUS  PRIORITY  DUE\n");
    }
}

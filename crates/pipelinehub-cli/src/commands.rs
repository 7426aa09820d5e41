//! Record commands: list, pipeline, activities and move-deal.

use chrono::{DateTime, Utc};
use pipelinehub_core::records::{
    Activity, Company, Contact, Deal, PipelineStage, Quote, SalesOrder, Task,
};
use pipelinehub_core::{Entity, EntityKind, RecordId};
use pipelinehub_store::{Crm, RecordStore};
use pipelinehub_view::pages::activities::{ActivityQuery, activity_stats, activities_view};
use pipelinehub_view::pages::contacts::contacts_view;
use pipelinehub_view::pages::pipeline::{ProbabilityBand, pipeline_board, pipeline_summary};
use pipelinehub_view::{
    Facet, Filter, SortSpec, TableQuery, TableView, TimeWindow, Viewable, default_sort,
    table_view,
};
use serde::Serialize;
use std::io::Write;

use crate::cli::{Command, ListArgs};
use crate::error::{Error, Result};
use crate::render::{Tabular, money, render_table};

/// Runs a record command against `crm`, writing results to `out`.
///
/// `now` anchors the time windows of the pipeline and activity views.
pub async fn run(
    command: Command,
    crm: &Crm,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::List(args) => cmd_list(crm, &args, out).await,
        Command::Pipeline { json } => cmd_pipeline(crm, json, now, out).await,
        Command::Activities {
            activity_type,
            window,
            json,
        } => cmd_activities(crm, &activity_type, &window, json, now, out).await,
        Command::MoveDeal { id, stage } => cmd_move_deal(crm, id, &stage, out).await,
        Command::Config { .. } => Err(Error::usage(
            "command",
            "config commands run without the record API",
        )),
    }
}

/// Builds the table query of `list` for `kind`.
pub fn list_query(kind: EntityKind, args: &ListArgs) -> Result<TableQuery> {
    let mut filter = Filter::new();
    if let Some(search) = &args.search {
        filter = filter.search(search.as_str());
    }
    for pair in &args.filters {
        let (facet, value) = pair
            .split_once('=')
            .ok_or_else(|| Error::usage("filter", format!("expected FACET=VALUE, got '{pair}'")))?;
        filter = filter.facet(facet.parse::<Facet>()?, value.trim());
    }

    let sort = match &args.sort {
        Some(key) if args.desc => Some(SortSpec::desc(key.as_str())),
        Some(key) => Some(SortSpec::asc(key.as_str())),
        None => default_sort(kind),
    };

    let query = TableQuery::new().filter(filter);
    Ok(match sort {
        Some(spec) => query.sort(spec),
        None => query,
    })
}

async fn load<E: Entity>(store: &RecordStore<E>) -> Result<Vec<E>> {
    store.load().await;
    let snapshot = store.snapshot();
    match snapshot.error {
        Some(message) => Err(Error::Load {
            entity: E::KIND.plural().to_string(),
            message,
        }),
        None => Ok(snapshot.items),
    }
}

fn emit<T: Tabular + Serialize>(
    view: &TableView<T>,
    noun: &str,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, view)?;
        writeln!(out)?;
    } else {
        render_table(&view.rows, out)?;
        writeln!(out, "{}", view.summary(noun))?;
    }
    Ok(())
}

async fn list_table<E>(
    store: &RecordStore<E>,
    query: &TableQuery,
    json: bool,
    out: &mut impl Write,
) -> Result<()>
where
    E: Entity + Viewable + Tabular,
{
    let items = load(store).await?;
    let view = table_view(&items, query)?;
    emit(&view, E::KIND.plural(), json, out)
}

async fn cmd_list(crm: &Crm, args: &ListArgs, out: &mut impl Write) -> Result<()> {
    let kind: EntityKind = args.entity.parse()?;
    let query = list_query(kind, args)?;
    tracing::debug!(entity = %kind, ?query, "listing");

    match kind {
        EntityKind::Contact => {
            let (contacts, deals) = tokio::try_join!(load(&crm.contacts), load(&crm.deals))?;
            let view = contacts_view(&contacts, &deals, &query)?;
            emit(&view, kind.plural(), args.json, out)
        }
        EntityKind::Company => list_table::<Company>(&crm.companies, &query, args.json, out).await,
        EntityKind::Deal => list_table::<Deal>(&crm.deals, &query, args.json, out).await,
        EntityKind::Activity => {
            list_table::<Activity>(&crm.activities, &query, args.json, out).await
        }
        EntityKind::Quote => list_table::<Quote>(&crm.quotes, &query, args.json, out).await,
        EntityKind::SalesOrder => {
            list_table::<SalesOrder>(&crm.sales_orders, &query, args.json, out).await
        }
        EntityKind::Task => list_table::<Task>(&crm.tasks, &query, args.json, out).await,
        EntityKind::PipelineStage => {
            list_table::<PipelineStage>(&crm.stages, &query, args.json, out).await
        }
    }
}

async fn cmd_pipeline(
    crm: &Crm,
    json: bool,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> Result<()> {
    let (stages, deals) = tokio::try_join!(load(&crm.stages), load(&crm.deals))?;
    let board = pipeline_board(&stages, &deals);
    let summary = pipeline_summary(&deals, now);

    if json {
        let doc = serde_json::json!({ "board": board, "summary": summary });
        serde_json::to_writer_pretty(&mut *out, &doc)?;
        writeln!(out)?;
        return Ok(());
    }

    for column in &board {
        writeln!(
            out,
            "{} ({} deals, {})",
            column.stage,
            column.stats.count,
            money(column.stats.sum)
        )?;
        for deal in &column.deals {
            writeln!(
                out,
                "  #{} {}  {}  {} probability",
                deal.id,
                deal.title,
                money(deal.value),
                ProbabilityBand::of(deal.probability).name()
            )?;
        }
    }
    writeln!(out)?;
    writeln!(out, "Open pipeline: {}", money(summary.open_value))?;
    writeln!(out, "Won:           {}", money(summary.won_value))?;
    writeln!(out, "Active deals:  {}", summary.active_deals)?;
    writeln!(out, "High priority: {}", summary.open_high_priority)?;
    writeln!(out, "Closing soon:  {}", summary.closing_soon)?;
    Ok(())
}

async fn cmd_activities(
    crm: &Crm,
    activity_type: &str,
    window: &str,
    json: bool,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> Result<()> {
    let window: TimeWindow = window.parse()?;
    let activities = load(&crm.activities).await?;
    let query = ActivityQuery::new().of_type(activity_type).within(window);
    let view = activities_view(&activities, &query, now);
    let stats = activity_stats(&activities, now);

    if json {
        let doc = serde_json::json!({ "activities": view, "stats": stats });
        serde_json::to_writer_pretty(&mut *out, &doc)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(
        out,
        "This week: {}  Last week: {}  Change: {}%",
        stats.this_week, stats.last_week, stats.week_change
    )?;
    for (kind, count) in &stats.by_type {
        writeln!(out, "  {kind}: {count}")?;
    }
    writeln!(out)?;
    render_table(&view.rows, out)?;
    writeln!(out, "{}", view.summary(EntityKind::Activity.plural()))?;
    Ok(())
}

async fn cmd_move_deal(crm: &Crm, id: RecordId, stage: &str, out: &mut impl Write) -> Result<()> {
    let stages = load(&crm.stages).await?;
    if !stages.is_empty() && !stages.iter().any(|s| s.name == stage) {
        let known: Vec<&str> = stages.iter().map(|s| s.name.as_str()).collect();
        return Err(Error::usage(
            "stage",
            format!("unknown stage '{stage}' (known: {})", known.join(", ")),
        ));
    }

    crm.deals.gateway().update_stage(id, stage).await?;
    tracing::info!(deal = %id, stage, "deal moved");
    writeln!(out, "Deal {id} moved to {stage}")?;
    Ok(())
}

//! List and show handlers

use anyhow::{Result, bail};
use colored::*;

use super::{ListArgs, ShowArgs};
use crate::cli::output::{OutputFormat, format_record, format_records, format_summary};
use crate::services::inventory::{Audience, InventoryRecord, InventoryView};

pub async fn handle_list_command(args: ListArgs) -> Result<()> {
    let query = crate::client_manager()?.query_service();
    let audience = if args.public {
        Audience::Public
    } else {
        Audience::Admin
    };

    let mut view = InventoryView::new(query.get_all(audience).await);
    let records = select_records(&mut view, args.missing, args.search.as_deref());
    print_records(&records, &view, args.format)
}

/// Apply the list filters to `view` and return the records to print.
///
/// Search follows the view's keystroke rules, so an empty or one-character
/// search leaves the full result in place.
fn select_records(
    view: &mut InventoryView,
    missing: bool,
    search: Option<&str>,
) -> Vec<InventoryRecord> {
    match search {
        Some(search) => view.search(search),
        None if missing => view.filter_missing_image(),
        None => {}
    }

    // Search replaces the missing-image filter in the view, so combine here
    view.visible()
        .filter(|r| !missing || !r.has_image())
        .cloned()
        .collect()
}

fn print_records(
    records: &[InventoryRecord],
    view: &InventoryView,
    format: OutputFormat,
) -> Result<()> {
    let output = format_records(records, format)?;
    if format == OutputFormat::Table {
        println!("{}", format_summary(&view.summary()));
        println!();
        println!("{}", output.trim_end());
        if records.len() != view.records().len() {
            println!(
                "{}",
                format!("showing {} of {}", records.len(), view.records().len()).dimmed()
            );
        }
    } else {
        println!("{}", output.trim_end());
    }
    Ok(())
}

pub async fn handle_show_command(args: ShowArgs) -> Result<()> {
    let query = crate::client_manager()?.query_service();
    let Some(record) = query.get_one(args.position).await else {
        bail!("No item at position {}", args.position);
    };
    println!("{}", format_record(&record, args.format)?.trim_end());
    Ok(())
}

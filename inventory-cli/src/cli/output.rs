//! Rendering of records and mutation reports for the terminal

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::*;
use unicode_width::UnicodeWidthStr;

use crate::services::images::{MutationReport, Outcome};
use crate::services::inventory::{InventoryRecord, InventorySummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for reading
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Comma-separated values with a header row
    Csv,
}

/// Names are cut to this many columns in table output
const NAME_WIDTH: usize = 32;

pub fn format_records(records: &[InventoryRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(records).context("Failed to format JSON output")
        }
        OutputFormat::Csv => records_to_csv(records),
        OutputFormat::Table => Ok(records_to_table(records)),
    }
}

pub fn format_record(record: &InventoryRecord, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(record).context("Failed to format JSON output")
        }
        OutputFormat::Csv => records_to_csv(std::slice::from_ref(record)),
        OutputFormat::Table => Ok(record_details(record)),
    }
}

fn records_to_csv(records: &[InventoryRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer
            .serialize(record)
            .context("Failed to write CSV row")?;
    }
    let bytes = writer.into_inner().context("Failed to finish CSV output")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

fn records_to_table(records: &[InventoryRecord]) -> String {
    if records.is_empty() {
        return "No items".dimmed().to_string();
    }

    let headers = ["#", "Name", "Category", "Price", "Qty", "Rating", "Image"];
    let rows: Vec<[String; 7]> = records
        .iter()
        .map(|r| {
            [
                r.position.to_string(),
                truncate(&r.name, NAME_WIDTH),
                r.category.clone(),
                format!("{:.2}", r.price),
                r.quantity.to_string(),
                format!("{:.1}", r.rating),
                if r.has_image() { "yes" } else { "-" }.to_string(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let mut out = String::new();
    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| pad(h, widths[i]))
        .collect();
    out.push_str(&header_line.join("  ").bold().to_string());
    out.push('\n');

    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let padded = pad(cell, widths[i]);
                if i == 6 && cell == "-" {
                    padded.yellow().to_string()
                } else {
                    padded
                }
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

fn record_details(record: &InventoryRecord) -> String {
    let image = match &record.image {
        Some(url) => url.cyan().to_string(),
        None => "none".yellow().to_string(),
    };
    let fields = [
        ("Position", record.position.to_string()),
        ("Name", record.name.bold().to_string()),
        ("Category", record.category.clone()),
        ("Price", format!("{:.2}", record.price)),
        ("Rating", format!("{:.1}", record.rating)),
        ("Review", record.review.clone()),
        ("Quantity", record.quantity.to_string()),
        ("Description", record.description.clone()),
        ("Timestamp", record.time_stamp.clone()),
        ("Image", image),
        ("Filename", record.image_filename()),
    ];
    fields
        .iter()
        .map(|(label, value)| format!("{:<12} {}", format!("{}:", label).dimmed(), value))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_summary(summary: &InventorySummary) -> String {
    format!(
        "{} items, {} without an image",
        summary.total.to_string().bold(),
        summary.without_image.to_string().yellow().bold()
    )
}

/// Human-readable report; the caller decides the exit status
pub fn format_report(report: &MutationReport) -> String {
    let headline = match report.outcome() {
        Outcome::Succeeded => format!("Image {} succeeded", report.kind).green(),
        Outcome::PartiallySucceeded => {
            format!("Image {} partially succeeded", report.kind).yellow()
        }
        Outcome::Failed => format!("Image {} failed", report.kind).red(),
    };

    let mut lines = vec![format!("{} (sheet row {})", headline.bold(), report.row)];
    for step in &report.completed {
        lines.push(format!("  {} {}", "done".green(), step));
    }
    for failure in &report.failed {
        lines.push(format!("  {} {}: {}", "failed".red(), failure.step, failure.error));
    }
    for step in &report.skipped {
        lines.push(format!("  {} {}", "skipped".dimmed(), step));
    }
    if let Some(url) = &report.url {
        lines.push(format!("  url: {}", url.cyan()));
    }
    if let Some(mismatch) = &report.filename_mismatch {
        lines.push(format!(
            "  {} stored as {} instead of {}",
            "warning:".yellow(),
            mismatch.actual,
            mismatch.expected
        ));
    }
    lines.join("\n")
}

/// Cut `text` to at most `max` display columns, marking the cut with `…`
pub fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w + 1 > max {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::images::MutationKind;
    use crate::services::images::outcome::MutationStep;
    use crate::services::inventory::SheetRow;

    fn widget() -> InventoryRecord {
        InventoryRecord {
            name: "Widget, large".to_string(),
            category: "A".to_string(),
            price: 9.99,
            rating: 4.5,
            review: "ok".to_string(),
            quantity: 10,
            description: "desc".to_string(),
            time_stamp: "111".to_string(),
            position: 1,
            image: Some("https://x/a.jpg".to_string()),
        }
    }

    #[test]
    fn test_csv_has_header_and_quotes_commas() {
        let csv = format_records(&[widget()], OutputFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("name,category,price,rating,review,quantity,description,timeStamp,position,image")
        );
        assert_eq!(
            lines.next(),
            Some("\"Widget, large\",A,9.99,4.5,ok,10,desc,111,1,https://x/a.jpg")
        );
    }

    #[test]
    fn test_json_uses_camel_case() {
        let json = format_records(&[widget()], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["timeStamp"], "111");
        assert_eq!(value[0]["position"], 1);
    }

    #[test]
    fn test_table_lists_every_record() {
        colored::control::set_override(false);
        let mut gadget = widget();
        gadget.name = "Gadget".to_string();
        gadget.position = 2;
        gadget.image = None;

        let table = format_records(&[widget(), gadget], OutputFormat::Table).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("#"));
        assert!(lines[2].starts_with("2"));
        assert!(lines[2].ends_with("-"));
    }

    #[test]
    fn test_truncate_respects_display_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_report_mentions_failures() {
        colored::control::set_override(false);
        let mut report = MutationReport::new(MutationKind::Delete, SheetRow(3));
        report.fail(
            MutationStep::DeleteAsset {
                key: "a.jpg".to_string(),
            },
            &anyhow::anyhow!("boom"),
        );
        let text = format_report(&report);
        assert!(text.starts_with("Image delete failed (sheet row 3)"));
        assert!(text.contains("failed delete asset a.jpg: boom"));
    }
}

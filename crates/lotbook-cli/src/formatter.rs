//! Output formatting for lots, the change log, and the summary.

use clap::ValueEnum;
use comfy_table::Table;
use lotbook_core::{format_price, ChangeEntry, Lot, Summary, TIMESTAMP_FORMAT};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render a list of lots.
pub fn render_lots(lots: &[&Lot], format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => {
            if lots.is_empty() {
                return "No lots found".to_string();
            }
            let mut table = Table::new();
            table.set_header(vec!["Code", "Name", "Price", "Description", "Created"]);
            for lot in lots {
                table.add_row(vec![
                    lot.code.clone(),
                    lot.name.clone(),
                    format_price(lot.price),
                    lot.description.clone(),
                    lot.created_at.format(TIMESTAMP_FORMAT).to_string(),
                ]);
            }
            table.to_string()
        }
        OutputFormat::Json => {
            serde_json::to_string_pretty(lots).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
        }
    }
}

/// Render the change log.
pub fn render_history(history: &[ChangeEntry], format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => {
            if history.is_empty() {
                return "Change log is empty".to_string();
            }
            let mut table = Table::new();
            table.set_header(vec!["Timestamp", "Code", "Action", "Field", "Old", "New"]);
            for entry in history {
                table.add_row(vec![
                    entry.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    entry.code.clone(),
                    entry.action.to_string(),
                    entry.field.clone(),
                    entry.old_value.clone(),
                    entry.new_value.clone(),
                ]);
            }
            table.to_string()
        }
        OutputFormat::Json => serde_json::to_string_pretty(history)
            .unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}")),
    }
}

/// Render the derived summary.
pub fn render_summary(summary: &Summary, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => {
            let last_created = summary
                .last_created_at
                .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default();
            format!(
                "Total lots:    {}\nPrice sum:     {}\nLast code:     {}\nLast created:  {}",
                summary.total_lots,
                format_price(summary.price_sum),
                summary.last_code,
                last_created,
            )
        }
        OutputFormat::Json => serde_json::to_string_pretty(summary)
            .unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}")),
    }
}

//! Table rendering for report result sets
//!
//! Turns a [`ResultSet`] into formatted text. Bordered styles go through
//! `comfy-table` presets; `tsv` and `csv` are written with the `csv` crate
//! so quoting and escaping follow the usual rules.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{
    ASCII_FULL, ASCII_FULL_CONDENSED, ASCII_HORIZONTAL_ONLY, ASCII_MARKDOWN, NOTHING, UTF8_FULL,
};
use comfy_table::{Cell, Table};
use serde_json::Value;

use crate::error::{ReportError, ReportResult};
use crate::types::{ResultSet, TableFormat};

/// Render a result set using the requested table format
pub fn render(results: &ResultSet, format: TableFormat) -> ReportResult<String> {
    if format.is_delimited() {
        return render_delimited(results, format);
    }

    let mut table = Table::new();
    match format {
        TableFormat::Psql => {
            table.load_preset(ASCII_FULL_CONDENSED);
        }
        TableFormat::Grid => {
            table.load_preset(ASCII_FULL);
        }
        TableFormat::Rounded => {
            table.load_preset(UTF8_FULL).apply_modifier(UTF8_ROUND_CORNERS);
        }
        TableFormat::Github | TableFormat::Pipe => {
            table.load_preset(ASCII_MARKDOWN);
        }
        TableFormat::Plain => {
            table.load_preset(NOTHING);
        }
        TableFormat::Simple => {
            table.load_preset(ASCII_HORIZONTAL_ONLY);
        }
        TableFormat::Tsv | TableFormat::Csv => unreachable!("delimited formats handled above"),
    }

    table.set_header(results.columns.iter().map(Cell::new).collect::<Vec<_>>());
    for row in &results.rows {
        table.add_row(row.iter().map(|v| Cell::new(cell_text(v))).collect::<Vec<_>>());
    }

    Ok(table.to_string())
}

fn render_delimited(results: &ResultSet, format: TableFormat) -> ReportResult<String> {
    let delimiter = match format {
        TableFormat::Tsv => b'\t',
        _ => b',',
    };

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer
        .write_record(&results.columns)
        .map_err(|e| ReportError::Serialization(e.to_string()))?;
    for row in &results.rows {
        let record: Vec<String> = row.iter().map(cell_text).collect();
        writer
            .write_record(&record)
            .map_err(|e| ReportError::Serialization(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Serialization(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReportError::Serialization(e.to_string()))
}

/// SQL NULL renders as an empty cell; strings render without JSON quoting
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

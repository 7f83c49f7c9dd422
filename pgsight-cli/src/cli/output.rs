/// Standard output utilities for consistent command formatting
use colored::*;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color as TableColor, ContentArrangement, Table};

use pgsight_core::report::registry;
use pgsight_core::report::{ReportDefinition, ReportParams};
use pgsight_core::runner::ReportOutput;
use pgsight_core::{render, RawParams, ReportResult, TableFormat};

/// Create a standard header cell
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .add_attribute(Attribute::Bold)
        .fg(TableColor::Cyan)
}

/// Single-cell panel with a titled header row
fn panel(title: &str, body: &str) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![header_cell(title)])
        .add_row(vec![Cell::new(body)]);
    table
}

fn help_body(definition: &ReportDefinition) -> String {
    let mut body = String::from(definition.description);
    body.push_str("\n\nColumns:");
    for column in &definition.output_columns {
        body.push_str(&format!("\n  - {}: {}", column.name, column.description));
    }
    body
}

fn input_body(params: &ReportParams, format: TableFormat) -> String {
    let mut lines: Vec<String> = params
        .iter()
        .map(|(name, value)| format!("{name} = {value}"))
        .collect();
    lines.push(format!("format = {format}"));
    lines.join("\n")
}

/// Rule plus bold label, printed before each fan-out group's table
pub fn print_group_header(label: &str) {
    println!("{}", "─".repeat(50).dimmed());
    println!("{}", label.bold());
}

/// Print the standard report frame: a Help panel describing the report and
/// its columns, an Input panel echoing the validated parameters, then each
/// result set as a table in the requested format
pub fn print_report(
    name: &str,
    raw: &RawParams,
    format: TableFormat,
    output: &ReportOutput,
) -> ReportResult<()> {
    let definition = registry::get(name)?;
    let params = registry::validate(name, raw)?;

    println!("{}", panel("Help", &help_body(definition)));
    println!("{}", panel("Input", &input_body(&params, format)));

    for (label, results) in output {
        if let Some(label) = label {
            print_group_header(label);
        }
        println!("{}", render(results, format)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgsight_core::ParamValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_help_body_lists_description_and_columns() {
        let definition = registry::get("indexes_usage").unwrap();
        let body = help_body(definition);
        assert!(body.starts_with(definition.description));
        assert!(body.contains("Columns:"));
        assert!(body.contains("  - idx_scan:"));
        assert!(body.contains("  - scans_per_write:"));
    }

    #[test]
    fn test_input_body_echoes_params_and_format() {
        let mut params = ReportParams::new();
        params.insert("schema".to_string(), ParamValue::Str("public".to_string()));
        params.insert("count".to_string(), ParamValue::Int(10));
        let body = input_body(&params, TableFormat::Github);
        assert_eq!(body, "count = 10\nschema = public\nformat = github");
    }

    #[test]
    fn test_panel_contains_title_and_body() {
        let rendered = panel("Help", "body text").to_string();
        assert!(rendered.contains("Help"));
        assert!(rendered.contains("body text"));
    }
}

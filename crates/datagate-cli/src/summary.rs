use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;

use datagate_model::{
    DriftReport, IngestionArtifact, Partition, SchemaDefinition, ValidationFinding,
};

use crate::types::GateOutcome;

pub fn print_ingestion(artifact: &IngestionArtifact) {
    println!("Train: {}", artifact.trained_file_path.display());
    println!("Test: {}", artifact.test_file_path.display());
}

pub fn print_outcome(outcome: &GateOutcome) {
    let validation = &outcome.validation;
    println!("Run: {}", outcome.run_dir.display());
    println!(
        "Train: {} -> {}",
        outcome.ingestion.trained_file_path.display(),
        validation.output_path(Partition::Train).display()
    );
    println!(
        "Test: {} -> {}",
        outcome.ingestion.test_file_path.display(),
        validation.output_path(Partition::Test).display()
    );
    println!(
        "Drift report: {}",
        validation.drift_report_file_path.display()
    );
    println!("{}", drift_table(&outcome.drift_report, outcome.threshold));
    if let Some(table) = findings_table(&validation.findings) {
        println!();
        println!("Findings:");
        println!("{table}");
    }
    if validation.validation_status {
        println!("Validation passed");
    } else {
        eprintln!("Validation failed: partitions written to the invalid paths");
    }
}

pub fn print_schema(path: &Path, schema: &SchemaDefinition) {
    println!("Schema: {}", path.display());
    println!("{}", schema_table(schema));
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{json}");
    Ok(())
}

/// One row per tested column plus a total row.
pub fn drift_table(report: &DriftReport, threshold: f64) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("p-value"),
        header_cell("Threshold"),
        header_cell("Drift"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    for (column, drift) in report.iter() {
        table.add_row(vec![
            Cell::new(column),
            Cell::new(format!("{:.6}", drift.p_value)),
            dim_cell(threshold),
            drift_cell(drift.drift_status),
        ]);
    }
    let drifted = report.drifted_columns().len();
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        count_cell(drifted).add_attribute(Attribute::Bold),
    ]);
    table
}

pub fn findings_table(findings: &[ValidationFinding]) -> Option<Table> {
    if findings.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Check"),
        header_cell("Partition"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    for finding in findings {
        let (check, partition) = match finding {
            ValidationFinding::ColumnCountMismatch { partition, .. } => {
                ("column count", Some(*partition))
            }
            ValidationFinding::NonNumericColumns { partition, .. } => {
                ("numerical columns", Some(*partition))
            }
            ValidationFinding::DatasetDrift { .. } => ("drift", None),
        };
        table.add_row(vec![
            Cell::new(check).fg(Color::Yellow),
            partition.map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(finding.message()),
        ]);
    }
    Some(table)
}

pub fn schema_table(schema: &SchemaDefinition) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Numerical"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    for (index, column) in schema.columns().iter().enumerate() {
        let numerical = schema.numerical_columns().contains(&column.name);
        table.add_row(vec![
            dim_cell(index + 1),
            Cell::new(&column.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&column.dtype),
            if numerical {
                Cell::new("yes").fg(Color::Green)
            } else {
                dim_cell("-")
            },
        ]);
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn drift_cell(drifted: bool) -> Cell {
    if drifted {
        Cell::new("yes").fg(Color::Red).add_attribute(Attribute::Bold)
    } else {
        Cell::new("no").fg(Color::Green)
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Red)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

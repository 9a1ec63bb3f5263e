//! Dataset drift detection between a base and a current table.

use std::fs;
use std::path::Path;

use polars::prelude::{DataFrame, DataType};
use tracing::debug;

use datagate_ingest::ensure_parent_dir;
use datagate_model::{
    ColumnDrift, DriftReport, GateError, Operation, Result, check_drift_threshold,
};

use crate::ks::ks_2samp;

/// Drift decision for one column: p-values at or above the threshold pass.
pub fn is_drift(p_value: f64, threshold: f64) -> bool {
    p_value < threshold
}

/// Non-null, non-NaN values of `column` as `f64`.
///
/// Fails when the column is absent, cannot be read as numbers, or holds no values.
pub fn numeric_sample(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let source = df
        .column(column)
        .map_err(|_| GateError::drift(column, "column missing from table"))?;
    let series = source
        .as_materialized_series()
        .strict_cast(&DataType::Float64)
        .map_err(|error| GateError::drift(column, format!("not numeric: {error}")))?;
    let values: Vec<f64> = series
        .f64()
        .map_err(|error| GateError::drift(column, error))?
        .into_iter()
        .flatten()
        .filter(|value| !value.is_nan())
        .collect();
    if values.is_empty() {
        return Err(GateError::drift(column, "no numeric values"));
    }
    Ok(values)
}

/// Run the KS test for every column of `base`, in column order.
///
/// Columns only present in `current` are ignored; a base column missing from
/// `current` is an error.
pub fn compute_drift_report(
    base: &DataFrame,
    current: &DataFrame,
    threshold: f64,
) -> Result<DriftReport> {
    check_drift_threshold(threshold)?;
    let mut report = DriftReport::new();
    for column in base.get_columns() {
        let name = column.name().as_str();
        let base_sample = numeric_sample(base, name)?;
        let current_sample = numeric_sample(current, name)?;
        let result = ks_2samp(&base_sample, &current_sample)
            .map_err(|error| GateError::drift(name, error))?;
        let drift_status = is_drift(result.p_value, threshold);
        debug!(
            column = name,
            statistic = result.statistic,
            p_value = result.p_value,
            method = ?result.method,
            drift_status,
            "ks test"
        );
        report.push(
            name,
            ColumnDrift {
                p_value: result.p_value,
                drift_status,
            },
        );
    }
    Ok(report)
}

/// Serialize `report` as YAML to `path`, creating parent directories.
pub fn write_drift_report(report: &DriftReport, path: &Path) -> Result<()> {
    ensure_parent_dir(path, Operation::WriteDriftReport)?;
    let yaml = report
        .to_yaml_string()
        .map_err(|error| GateError::output_write(Operation::WriteDriftReport, path, error))?;
    fs::write(path, yaml)
        .map_err(|error| GateError::output_write(Operation::WriteDriftReport, path, error))
}

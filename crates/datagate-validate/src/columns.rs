//! Schema conformance checks on a loaded table.

use polars::prelude::{DataFrame, DataType};

use datagate_model::{ColumnCountBasis, SchemaDefinition};

/// The count of `df` that is compared against the schema entry count.
pub fn observed_count(df: &DataFrame, basis: ColumnCountBasis) -> usize {
    match basis {
        ColumnCountBasis::Rows => df.height(),
        ColumnCountBasis::Columns => df.width(),
    }
}

/// True when `df` has as many rows or columns (per `basis`) as the schema declares.
pub fn column_count_matches(
    schema: &SchemaDefinition,
    df: &DataFrame,
    basis: ColumnCountBasis,
) -> bool {
    observed_count(df, basis) == schema.len()
}

/// Declared columns that `df` lacks, in schema order.
pub fn missing_columns(schema: &SchemaDefinition, df: &DataFrame) -> Vec<String> {
    schema
        .column_names()
        .filter(|name| df.column(name).is_err())
        .map(str::to_string)
        .collect()
}

/// Declared numerical columns that are absent or not stored as numbers.
pub fn non_numeric_columns(schema: &SchemaDefinition, df: &DataFrame) -> Vec<String> {
    schema
        .numerical_columns()
        .iter()
        .filter(|name| match df.column(name.as_str()) {
            Ok(column) => !is_numeric_dtype(column.dtype()),
            Err(_) => true,
        })
        .cloned()
        .collect()
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

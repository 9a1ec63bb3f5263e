//! Delimited table I/O backed by Polars.
//!
//! Tables are read whole, with a header row, and keep their column order.
//! Writes reproduce the frame verbatim: header row, no index column.

use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::Path;

use polars::prelude::{
    CsvParseOptions, CsvReadOptions, CsvWriter, DataFrame, NullValues, PlSmallStr, SerReader,
    SerWriter,
};
use tracing::debug;

use datagate_model::{GateError, Operation, Result};

/// Options for reading a delimited table.
#[derive(Debug, Clone, Default)]
pub struct TableReadOptions {
    /// Cell values read as null in every column.
    pub null_values: Vec<String>,
}

impl TableReadOptions {
    /// Treat each of `values` as a null cell.
    #[must_use]
    pub fn with_null_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_values = values.into_iter().map(Into::into).collect();
        self
    }
}

/// Load a delimited table with header row.
pub fn load_table(path: &Path) -> Result<DataFrame> {
    load_table_with_options(path, &TableReadOptions::default())
}

/// Load a delimited table with header row, applying `options`.
///
/// Any read or parse failure is returned as a `DataAccess` error; no partial
/// table is ever produced.
pub fn load_table_with_options(path: &Path, options: &TableReadOptions) -> Result<DataFrame> {
    let access = |message: String| GateError::data_access(Operation::LoadTable, path, message);
    if !path.is_file() {
        return Err(access("file not found".to_string()));
    }

    let null_values = if options.null_values.is_empty() {
        None
    } else {
        Some(NullValues::AllColumns(
            options
                .null_values
                .iter()
                .map(|value| PlSmallStr::from(value.as_str()))
                .collect(),
        ))
    };

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(CsvParseOptions::default().with_null_values(null_values))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|error| access(error.to_string()))?
        .finish()
        .map_err(|error| access(error.to_string()))?;

    if df.width() == 0 {
        return Err(access("table has no header row".to_string()));
    }
    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "table loaded"
    );
    Ok(df)
}

/// Create the parent directory of `path` if it does not exist yet.
pub fn ensure_parent_dir(path: &Path, operation: Operation) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|error| GateError::output_write(operation, parent, error))?;
    }
    Ok(())
}

/// Write `df` to `path` as CSV with a header row, creating parent directories.
pub fn write_table(df: &DataFrame, path: &Path) -> Result<()> {
    ensure_parent_dir(path, Operation::WriteTable)?;
    let write_error = |message: String| GateError::output_write(Operation::WriteTable, path, message);
    let mut file = File::create(path).map_err(|error| write_error(error.to_string()))?;
    let mut frame = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut frame)
        .map_err(|error| write_error(error.to_string()))?;
    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "table written"
    );
    Ok(())
}

/// Delete a previously written table; a missing file is not an error.
pub fn remove_table(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "stale table removed");
            Ok(())
        }
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
        Err(error) => Err(GateError::output_write(Operation::WriteTable, path, error)),
    }
}

//! Schema registry.
//!
//! The schema is a YAML document listing the expected columns in order, each
//! as a single-entry mapping of column name to declared type, plus an optional
//! list of columns that must be numeric:
//!
//! ```yaml
//! columns:
//!   - having_IP_Address: int64
//!   - URL_Length: int64
//! numerical_columns:
//!   - URL_Length
//! ```

#![deny(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use datagate_model::config::SCHEMA_FILE_PATH;
use datagate_model::{ColumnSpec, GateError, Result, SchemaDefinition};

const SCHEMA_ENV_VAR: &str = "DATAGATE_SCHEMA_FILE";

#[derive(Debug, Deserialize)]
struct RawSchema {
    columns: Vec<BTreeMap<String, String>>,
    #[serde(default)]
    numerical_columns: Vec<String>,
}

/// Schema location used when the caller does not name one.
pub fn default_schema_path() -> PathBuf {
    if let Ok(path) = std::env::var(SCHEMA_ENV_VAR) {
        return PathBuf::from(path);
    }
    PathBuf::from(SCHEMA_FILE_PATH)
}

/// Read and parse the schema file at `path`.
pub fn load_schema(path: &Path) -> Result<SchemaDefinition> {
    let text = std::fs::read_to_string(path).map_err(|error| GateError::SchemaLoad {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;
    let schema = parse_schema(&text, path)?;
    debug!(
        path = %path.display(),
        columns = schema.len(),
        numerical_columns = schema.numerical_columns().len(),
        "schema loaded"
    );
    Ok(schema)
}

/// Parse schema text; `path` is only used for error context.
pub fn parse_schema(text: &str, path: &Path) -> Result<SchemaDefinition> {
    let invalid = |message: String| GateError::SchemaLoad {
        path: path.to_path_buf(),
        message,
    };
    let raw: RawSchema = serde_yaml::from_str(text).map_err(|error| invalid(error.to_string()))?;

    let mut columns = Vec::with_capacity(raw.columns.len());
    let mut seen = BTreeSet::new();
    for (index, entry) in raw.columns.into_iter().enumerate() {
        if entry.len() != 1 {
            return Err(invalid(format!(
                "columns[{index}] must map exactly one column name to its type, found {} entries",
                entry.len()
            )));
        }
        let Some((name, dtype)) = entry.into_iter().next() else {
            continue;
        };
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(invalid(format!("columns[{index}] has an empty name")));
        }
        if !seen.insert(name.clone()) {
            return Err(invalid(format!("duplicate column `{name}`")));
        }
        columns.push(ColumnSpec::new(name, dtype.trim()));
    }
    if columns.is_empty() {
        return Err(invalid("schema declares no columns".to_string()));
    }

    for name in &raw.numerical_columns {
        if !seen.contains(name.as_str()) {
            return Err(invalid(format!(
                "numerical column `{name}` is not declared under columns"
            )));
        }
    }

    Ok(SchemaDefinition::new(columns, raw.numerical_columns))
}

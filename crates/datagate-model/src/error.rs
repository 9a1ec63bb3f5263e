use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ColumnCountBasis;

/// Pipeline operation an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Ingest,
    SplitTable,
    LoadTable,
    LoadSchema,
    ValidateColumnCount,
    DetectDrift,
    WriteDriftReport,
    WriteTable,
    Configure,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Ingest => "ingest",
            Operation::SplitTable => "split_table",
            Operation::LoadTable => "load_table",
            Operation::LoadSchema => "load_schema",
            Operation::ValidateColumnCount => "validate_column_count",
            Operation::DetectDrift => "detect_dataset_drift",
            Operation::WriteDriftReport => "write_drift_report",
            Operation::WriteTable => "write_table",
            Operation::Configure => "configure",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which ingested partition a table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Train,
    Test,
}

impl Partition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Train => "train",
            Partition::Test => "test",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error taxonomy without payload, for callers that only branch on the class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DataAccess,
    SchemaLoad,
    ColumnCountMismatch,
    DriftComputation,
    OutputWrite,
    Ingestion,
    InvalidConfig,
}

/// Errors raised by the ingestion and validation stages.
///
/// Every variant names the operation and the file or column that caused it,
/// so a failed run can be diagnosed from the message alone.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("{operation}: failed to read table {path}: {message}")]
    DataAccess {
        operation: Operation,
        path: PathBuf,
        message: String,
    },

    #[error("load_schema: failed to load schema {path}: {message}")]
    SchemaLoad { path: PathBuf, message: String },

    #[error(
        "validate_column_count: {partition} table {path} has {actual} {basis}, schema declares {expected} columns"
    )]
    ColumnCountMismatch {
        partition: Partition,
        path: PathBuf,
        basis: ColumnCountBasis,
        expected: usize,
        actual: usize,
    },

    #[error("detect_dataset_drift: column `{column}`: {message}")]
    DriftComputation { column: String, message: String },

    #[error("{operation}: failed to write {path}: {message}")]
    OutputWrite {
        operation: Operation,
        path: PathBuf,
        message: String,
    },

    #[error("configure: invalid {setting} {value}: {message}")]
    InvalidConfig {
        setting: &'static str,
        value: String,
        message: String,
    },

    #[error("{operation}: cannot ingest {path}: {message}")]
    Ingestion {
        operation: Operation,
        path: PathBuf,
        message: String,
    },
}

impl GateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GateError::DataAccess { .. } => ErrorKind::DataAccess,
            GateError::SchemaLoad { .. } => ErrorKind::SchemaLoad,
            GateError::ColumnCountMismatch { .. } => ErrorKind::ColumnCountMismatch,
            GateError::DriftComputation { .. } => ErrorKind::DriftComputation,
            GateError::OutputWrite { .. } => ErrorKind::OutputWrite,
            GateError::Ingestion { .. } => ErrorKind::Ingestion,
            GateError::InvalidConfig { .. } => ErrorKind::InvalidConfig,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            GateError::DataAccess { operation, .. }
            | GateError::OutputWrite { operation, .. }
            | GateError::Ingestion { operation, .. } => *operation,
            GateError::SchemaLoad { .. } => Operation::LoadSchema,
            GateError::ColumnCountMismatch { .. } => Operation::ValidateColumnCount,
            GateError::DriftComputation { .. } => Operation::DetectDrift,
            GateError::InvalidConfig { .. } => Operation::Configure,
        }
    }

    pub fn data_access(
        operation: Operation,
        path: impl Into<PathBuf>,
        message: impl fmt::Display,
    ) -> Self {
        Self::DataAccess {
            operation,
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn output_write(
        operation: Operation,
        path: impl Into<PathBuf>,
        message: impl fmt::Display,
    ) -> Self {
        Self::OutputWrite {
            operation,
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn drift(column: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::DriftComputation {
            column: column.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GateError>;

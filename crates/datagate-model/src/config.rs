//! Resolved pipeline configuration.
//!
//! Paths are derived once per pipeline invocation from an artifact root and a
//! run timestamp, then handed to the stages as plain values:
//!
//! ```text
//! <root>/<timestamp>/data_ingestion/feature_store/<raw file>
//! <root>/<timestamp>/data_ingestion/ingested/{train,test}.csv
//! <root>/<timestamp>/data_validation/validated/{train,test}.csv
//! <root>/<timestamp>/data_validation/invalid/{train,test}.csv
//! <root>/<timestamp>/data_validation/drift_report/report.yaml
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GateError, Result};

pub const ARTIFACT_DIR: &str = "Artifacts";
pub const TRAIN_FILE_NAME: &str = "train.csv";
pub const TEST_FILE_NAME: &str = "test.csv";
pub const SCHEMA_FILE_PATH: &str = "data_schema/schema.yaml";
/// `strftime` pattern of the per-run artifact directory name.
pub const TIMESTAMP_FORMAT: &str = "%m_%d_%Y_%H_%M_%S";

pub const DATA_INGESTION_DIR_NAME: &str = "data_ingestion";
pub const DATA_INGESTION_FEATURE_STORE_DIR: &str = "feature_store";
pub const DATA_INGESTION_INGESTED_DIR: &str = "ingested";
pub const DATA_INGESTION_TEST_RATIO: f64 = 0.2;
pub const DATA_INGESTION_SEED: u64 = 42;
pub const DATA_INGESTION_NULL_VALUES: &[&str] = &["na"];

pub const DATA_VALIDATION_DIR_NAME: &str = "data_validation";
pub const DATA_VALIDATION_VALID_DIR: &str = "validated";
pub const DATA_VALIDATION_INVALID_DIR: &str = "invalid";
pub const DATA_VALIDATION_DRIFT_REPORT_DIR: &str = "drift_report";
pub const DATA_VALIDATION_DRIFT_REPORT_FILE_NAME: &str = "report.yaml";
pub const DEFAULT_DRIFT_THRESHOLD: f64 = 0.05;

/// Root of a single pipeline invocation's artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub artifact_dir: PathBuf,
    pub timestamp: String,
}

impl PipelineConfig {
    pub fn new(artifact_root: impl AsRef<Path>, timestamp: impl Into<String>) -> Self {
        let timestamp = timestamp.into();
        Self {
            artifact_dir: artifact_root.as_ref().join(&timestamp),
            timestamp,
        }
    }

    pub fn ingestion_dir(&self) -> PathBuf {
        self.artifact_dir.join(DATA_INGESTION_DIR_NAME)
    }

    pub fn validation_dir(&self) -> PathBuf {
        self.artifact_dir.join(DATA_VALIDATION_DIR_NAME)
    }
}

/// Settings for splitting a raw table into train/test partitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionConfig {
    pub feature_store_file_path: PathBuf,
    pub training_file_path: PathBuf,
    pub testing_file_path: PathBuf,
    /// Fraction of rows assigned to the test partition, in (0, 1).
    pub test_ratio: f64,
    pub seed: u64,
    /// Cell values read as null.
    pub null_values: Vec<String>,
}

impl IngestionConfig {
    pub fn from_pipeline(pipeline: &PipelineConfig, raw_file_name: &str) -> Self {
        let dir = pipeline.ingestion_dir();
        Self {
            feature_store_file_path: dir.join(DATA_INGESTION_FEATURE_STORE_DIR).join(raw_file_name),
            training_file_path: dir.join(DATA_INGESTION_INGESTED_DIR).join(TRAIN_FILE_NAME),
            testing_file_path: dir.join(DATA_INGESTION_INGESTED_DIR).join(TEST_FILE_NAME),
            test_ratio: DATA_INGESTION_TEST_RATIO,
            seed: DATA_INGESTION_SEED,
            null_values: DATA_INGESTION_NULL_VALUES
                .iter()
                .map(|value| (*value).to_string())
                .collect(),
        }
    }

    #[must_use]
    pub fn with_test_ratio(mut self, ratio: f64) -> Self {
        self.test_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// What `validate_column_count` compares against the schema entry count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnCountBasis {
    /// Row count of the table. Matches the historical pipeline behaviour.
    Rows,
    /// Column count of the table.
    #[default]
    Columns,
}

impl ColumnCountBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnCountBasis::Rows => "rows",
            ColumnCountBasis::Columns => "columns",
        }
    }
}

impl fmt::Display for ColumnCountBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnCountBasis {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rows" | "row" => Ok(ColumnCountBasis::Rows),
            "columns" | "column" => Ok(ColumnCountBasis::Columns),
            other => Err(format!("unknown column count basis: {other}")),
        }
    }
}

/// Output locations and gate settings for the validation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub schema_file_path: PathBuf,
    pub valid_train_file_path: PathBuf,
    pub valid_test_file_path: PathBuf,
    pub invalid_train_file_path: PathBuf,
    pub invalid_test_file_path: PathBuf,
    pub drift_report_file_path: PathBuf,
    /// P-values strictly below this flag a column as drifted.
    pub drift_threshold: f64,
    pub count_basis: ColumnCountBasis,
    /// Abort the run on a column-count mismatch instead of recording a finding.
    pub strict_columns: bool,
}

impl ValidationConfig {
    pub fn from_pipeline(pipeline: &PipelineConfig, schema_file_path: impl Into<PathBuf>) -> Self {
        let dir = pipeline.validation_dir();
        let valid = dir.join(DATA_VALIDATION_VALID_DIR);
        let invalid = dir.join(DATA_VALIDATION_INVALID_DIR);
        Self {
            schema_file_path: schema_file_path.into(),
            valid_train_file_path: valid.join(TRAIN_FILE_NAME),
            valid_test_file_path: valid.join(TEST_FILE_NAME),
            invalid_train_file_path: invalid.join(TRAIN_FILE_NAME),
            invalid_test_file_path: invalid.join(TEST_FILE_NAME),
            drift_report_file_path: dir
                .join(DATA_VALIDATION_DRIFT_REPORT_DIR)
                .join(DATA_VALIDATION_DRIFT_REPORT_FILE_NAME),
            drift_threshold: DEFAULT_DRIFT_THRESHOLD,
            count_basis: ColumnCountBasis::default(),
            strict_columns: false,
        }
    }

    #[must_use]
    pub fn with_drift_threshold(mut self, threshold: f64) -> Self {
        self.drift_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_count_basis(mut self, basis: ColumnCountBasis) -> Self {
        self.count_basis = basis;
        self
    }

    #[must_use]
    pub fn with_strict_columns(mut self, strict: bool) -> Self {
        self.strict_columns = strict;
        self
    }

    /// Reject settings that would silently disable the gate.
    pub fn validate(&self) -> Result<()> {
        check_drift_threshold(self.drift_threshold)
    }
}

/// A drift threshold must be a finite p-value cut-off in `[0, 1]`.
///
/// A NaN or negative threshold never compares below a p-value, so every
/// column would pass.
pub fn check_drift_threshold(threshold: f64) -> Result<()> {
    if threshold.is_finite() && (0.0..=1.0).contains(&threshold) {
        return Ok(());
    }
    Err(GateError::InvalidConfig {
        setting: "drift threshold",
        value: threshold.to_string(),
        message: "expected a finite value in [0, 1]".to_string(),
    })
}

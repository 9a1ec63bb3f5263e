use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ColumnCountBasis, ValidationConfig};
use crate::error::Partition;

/// Output of the ingestion stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionArtifact {
    pub trained_file_path: PathBuf,
    pub test_file_path: PathBuf,
}

impl IngestionArtifact {
    pub fn new(trained_file_path: impl Into<PathBuf>, test_file_path: impl Into<PathBuf>) -> Self {
        Self {
            trained_file_path: trained_file_path.into(),
            test_file_path: test_file_path.into(),
        }
    }

    pub fn path_for(&self, partition: Partition) -> &Path {
        match partition {
            Partition::Train => &self.trained_file_path,
            Partition::Test => &self.test_file_path,
        }
    }
}

/// A failed, non-fatal check recorded on the validation artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationFinding {
    ColumnCountMismatch {
        partition: Partition,
        basis: ColumnCountBasis,
        expected: usize,
        actual: usize,
        /// Declared columns absent from the table.
        missing_columns: Vec<String>,
    },
    NonNumericColumns {
        partition: Partition,
        columns: Vec<String>,
    },
    DatasetDrift {
        columns: Vec<String>,
    },
}

impl ValidationFinding {
    pub fn message(&self) -> String {
        match self {
            ValidationFinding::ColumnCountMismatch {
                partition,
                basis,
                expected,
                actual,
                missing_columns,
            } => {
                let mut message = format!(
                    "{partition} dataframe has {actual} {basis}, schema declares {expected} columns"
                );
                if !missing_columns.is_empty() {
                    message.push_str(&format!(" (missing: {})", missing_columns.join(", ")));
                }
                message
            }
            ValidationFinding::NonNumericColumns { partition, columns } => format!(
                "{partition} dataframe has non-numeric or missing numerical columns: {}",
                columns.join(", ")
            ),
            ValidationFinding::DatasetDrift { columns } => {
                format!("drift detected in columns: {}", columns.join(", "))
            }
        }
    }
}

/// Result of a validation run, handed to the training stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationArtifact {
    pub validation_status: bool,
    pub drift_detected: bool,
    pub valid_train_file_path: PathBuf,
    pub valid_test_file_path: PathBuf,
    pub invalid_train_file_path: PathBuf,
    pub invalid_test_file_path: PathBuf,
    pub drift_report_file_path: PathBuf,
    pub findings: Vec<ValidationFinding>,
}

impl ValidationArtifact {
    /// Build the artifact from the run's findings. The run passes only when there are none.
    pub fn from_findings(config: &ValidationConfig, findings: Vec<ValidationFinding>) -> Self {
        let drift_detected = findings
            .iter()
            .any(|finding| matches!(finding, ValidationFinding::DatasetDrift { .. }));
        Self {
            validation_status: findings.is_empty(),
            drift_detected,
            valid_train_file_path: config.valid_train_file_path.clone(),
            valid_test_file_path: config.valid_test_file_path.clone(),
            invalid_train_file_path: config.invalid_train_file_path.clone(),
            invalid_test_file_path: config.invalid_test_file_path.clone(),
            drift_report_file_path: config.drift_report_file_path.clone(),
            findings,
        }
    }

    /// Where the copy of `partition` was written for this run.
    pub fn output_path(&self, partition: Partition) -> &Path {
        self.path_for(self.validation_status, partition)
    }

    /// The copy on the other side of the gate, which must not outlive this run.
    pub fn stale_path(&self, partition: Partition) -> &Path {
        self.path_for(!self.validation_status, partition)
    }

    fn path_for(&self, valid: bool, partition: Partition) -> &Path {
        match (valid, partition) {
            (true, Partition::Train) => &self.valid_train_file_path,
            (true, Partition::Test) => &self.valid_test_file_path,
            (false, Partition::Train) => &self.invalid_train_file_path,
            (false, Partition::Test) => &self.invalid_test_file_path,
        }
    }
}

//! Data validation stage.
//!
//! A run moves through `schema loaded -> tables loaded -> columns checked ->
//! drift checked -> artifact emitted`. Any error ends the run; there is no
//! partially written artifact.

use std::path::Path;
use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::{info, info_span, warn};

use datagate_ingest::{remove_table, write_table};
use datagate_model::{
    DriftReport, GateError, IngestionArtifact, Partition, Result, SchemaDefinition,
    ValidationArtifact, ValidationConfig, ValidationFinding,
};
use datagate_schema::load_schema;

use crate::columns::{column_count_matches, missing_columns, non_numeric_columns, observed_count};
use crate::drift::{compute_drift_report, write_drift_report};

/// Gates ingested partitions into training-ready partitions.
#[derive(Debug, Clone)]
pub struct DataValidator {
    ingestion: IngestionArtifact,
    config: ValidationConfig,
    schema: SchemaDefinition,
}

impl DataValidator {
    /// Build a validator, loading the schema named by `config` up front.
    pub fn new(ingestion: IngestionArtifact, config: ValidationConfig) -> Result<Self> {
        config.validate()?;
        let schema = load_schema(&config.schema_file_path)?;
        info!(
            schema = %config.schema_file_path.display(),
            columns = schema.len(),
            "schema loaded"
        );
        Ok(Self::with_schema(ingestion, config, schema))
    }

    /// Build a validator around an already loaded schema.
    pub fn with_schema(
        ingestion: IngestionArtifact,
        config: ValidationConfig,
        schema: SchemaDefinition,
    ) -> Self {
        Self {
            ingestion,
            config,
            schema,
        }
    }

    pub fn schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn ingestion(&self) -> &IngestionArtifact {
        &self.ingestion
    }

    /// Read one partition; unreadable or empty files are `DataAccess` errors.
    pub fn load_table(path: &Path) -> Result<DataFrame> {
        datagate_ingest::load_table(path)
    }

    /// Compare the table's count (rows or columns, per config) with the schema entry count.
    pub fn validate_column_count(&self, df: &DataFrame) -> bool {
        let basis = self.config.count_basis;
        let matches = column_count_matches(&self.schema, df, basis);
        info!(
            required = self.schema.len(),
            actual = observed_count(df, basis),
            basis = %basis,
            matches,
            "column count check"
        );
        matches
    }

    /// Test every base column for drift and persist the report.
    ///
    /// Returns `true` when no column drifted, together with the report.
    pub fn detect_dataset_drift(
        &self,
        base: &DataFrame,
        current: &DataFrame,
        threshold: f64,
    ) -> Result<(bool, DriftReport)> {
        let report = compute_drift_report(base, current, threshold)?;
        write_drift_report(&report, &self.config.drift_report_file_path)?;
        let status = !report.has_drift();
        info!(
            columns = report.len(),
            drifted = report.drifted_columns().len(),
            threshold,
            report = %self.config.drift_report_file_path.display(),
            "drift report written"
        );
        Ok((status, report))
    }

    /// Run the whole stage and emit the validation artifact.
    ///
    /// Passing runs copy the tables to the valid paths, failing runs to the
    /// invalid paths. Copies left on the other side by an earlier run in the
    /// same directory are removed. The drift report is written either way.
    pub fn initiate_data_validation(&self) -> Result<ValidationArtifact> {
        let span = info_span!(
            "data_validation",
            train = %self.ingestion.trained_file_path.display(),
            test = %self.ingestion.test_file_path.display()
        );
        let _guard = span.enter();
        let start = Instant::now();

        let train = Self::load_table(&self.ingestion.trained_file_path)?;
        let test = Self::load_table(&self.ingestion.test_file_path)?;
        info!(
            train_rows = train.height(),
            test_rows = test.height(),
            "tables loaded"
        );

        let mut findings = Vec::new();
        for (partition, df) in [(Partition::Train, &train), (Partition::Test, &test)] {
            if let Some(finding) = self.check_column_count(partition, df)? {
                findings.push(finding);
            }
            let non_numeric = non_numeric_columns(&self.schema, df);
            if !non_numeric.is_empty() {
                warn!(
                    partition = %partition,
                    columns = %non_numeric.join(", "),
                    "numerical columns missing or not numeric"
                );
                findings.push(ValidationFinding::NonNumericColumns {
                    partition,
                    columns: non_numeric,
                });
            }
        }

        let (no_drift, report) =
            self.detect_dataset_drift(&train, &test, self.config.drift_threshold)?;
        if !no_drift {
            let columns = report.drifted_columns();
            warn!(columns = %columns.join(", "), "dataset drift detected");
            findings.push(ValidationFinding::DatasetDrift { columns });
        }

        let artifact = ValidationArtifact::from_findings(&self.config, findings);
        for partition in [Partition::Train, Partition::Test] {
            remove_table(artifact.stale_path(partition))?;
        }
        write_table(&train, artifact.output_path(Partition::Train))?;
        write_table(&test, artifact.output_path(Partition::Test))?;

        info!(
            validation_status = artifact.validation_status,
            drift_detected = artifact.drift_detected,
            findings = artifact.findings.len(),
            duration_ms = start.elapsed().as_millis(),
            "data validation complete"
        );
        Ok(artifact)
    }

    fn check_column_count(
        &self,
        partition: Partition,
        df: &DataFrame,
    ) -> Result<Option<ValidationFinding>> {
        if self.validate_column_count(df) {
            return Ok(None);
        }
        let basis = self.config.count_basis;
        let expected = self.schema.len();
        let actual = observed_count(df, basis);
        if self.config.strict_columns {
            return Err(GateError::ColumnCountMismatch {
                partition,
                path: self.ingestion.path_for(partition).to_path_buf(),
                basis,
                expected,
                actual,
            });
        }
        let finding = ValidationFinding::ColumnCountMismatch {
            partition,
            basis,
            expected,
            actual,
            missing_columns: missing_columns(&self.schema, df),
        };
        warn!(partition = %partition, "{}", finding.message());
        Ok(Some(finding))
    }
}

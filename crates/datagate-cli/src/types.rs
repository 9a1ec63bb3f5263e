use std::path::PathBuf;

use serde::Serialize;

use datagate_model::{DriftReport, IngestionArtifact, ValidationArtifact};

/// Everything a `validate` or `run` invocation produced.
#[derive(Debug, Serialize)]
pub struct GateOutcome {
    pub run_dir: PathBuf,
    pub ingestion: IngestionArtifact,
    pub validation: ValidationArtifact,
    pub drift_report: DriftReport,
    pub threshold: f64,
}

impl GateOutcome {
    /// True when the partitions were routed to the invalid paths.
    pub fn has_failed(&self) -> bool {
        !self.validation.validation_status
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use datagate_ingest::DataIngestion;
use datagate_model::config::TIMESTAMP_FORMAT;
use datagate_model::{
    DriftReport, IngestionArtifact, IngestionConfig, PipelineConfig, SchemaDefinition,
    ValidationConfig,
};
use datagate_schema::{default_schema_path, load_schema};
use datagate_validate::DataValidator;

use crate::cli::{ArtifactArgs, GateArgs, IngestArgs, RunArgs, SchemaArgs, SplitArgs, ValidateArgs};
use crate::types::GateOutcome;

pub fn run_ingest(args: &IngestArgs) -> Result<IngestionArtifact> {
    let pipeline = pipeline_config(&args.artifacts);
    ingest(&pipeline, &args.raw_file, &args.split)
}

pub fn run_validate(args: &ValidateArgs) -> Result<GateOutcome> {
    let pipeline = pipeline_config(&args.artifacts);
    let ingestion = IngestionArtifact::new(&args.train, &args.test);
    validate(&pipeline, ingestion, &args.gate)
}

/// Ingestion followed by validation of the fresh partitions.
pub fn run_pipeline(args: &RunArgs) -> Result<GateOutcome> {
    let start = Instant::now();
    let pipeline = pipeline_config(&args.artifacts);
    let span = info_span!("pipeline", run = %pipeline.timestamp);
    let _guard = span.enter();

    let ingestion = ingest(&pipeline, &args.raw_file, &args.split)?;
    let outcome = validate(&pipeline, ingestion, &args.gate)?;
    info!(
        validation_status = outcome.validation.validation_status,
        duration_ms = start.elapsed().as_millis(),
        "pipeline complete"
    );
    Ok(outcome)
}

pub fn run_schema(args: &SchemaArgs) -> Result<(PathBuf, SchemaDefinition)> {
    let path = args.schema.clone().unwrap_or_else(default_schema_path);
    let schema = load_schema(&path).context("load schema")?;
    Ok((path, schema))
}

fn pipeline_config(args: &ArtifactArgs) -> PipelineConfig {
    let timestamp = args
        .timestamp
        .clone()
        .unwrap_or_else(|| chrono::Local::now().format(TIMESTAMP_FORMAT).to_string());
    PipelineConfig::new(&args.artifact_dir, timestamp)
}

fn ingest(pipeline: &PipelineConfig, raw_file: &Path, split: &SplitArgs) -> Result<IngestionArtifact> {
    let raw_name = raw_file
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("raw file path has no file name: {}", raw_file.display()))?;
    let config = IngestionConfig::from_pipeline(pipeline, raw_name)
        .with_test_ratio(split.test_ratio)
        .with_seed(split.seed);
    DataIngestion::new(config)
        .initiate_data_ingestion(raw_file)
        .context("data ingestion")
}

fn validate(
    pipeline: &PipelineConfig,
    ingestion: IngestionArtifact,
    gate: &GateArgs,
) -> Result<GateOutcome> {
    let schema_path = gate.schema.clone().unwrap_or_else(default_schema_path);
    let config = ValidationConfig::from_pipeline(pipeline, schema_path)
        .with_drift_threshold(gate.threshold)
        .with_count_basis(gate.count_basis.into())
        .with_strict_columns(gate.strict_columns);
    let validator =
        DataValidator::new(ingestion.clone(), config).context("initialize data validator")?;
    let validation = validator
        .initiate_data_validation()
        .context("data validation")?;

    let report_text = fs::read_to_string(&validation.drift_report_file_path).with_context(|| {
        format!(
            "read drift report {}",
            validation.drift_report_file_path.display()
        )
    })?;
    let drift_report = DriftReport::from_yaml_str(&report_text).context("parse drift report")?;

    Ok(GateOutcome {
        run_dir: pipeline.artifact_dir.clone(),
        ingestion,
        validation,
        drift_report,
        threshold: gate.threshold,
    })
}

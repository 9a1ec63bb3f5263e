//! CLI argument definitions for datagate.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use datagate_model::{ColumnCountBasis, check_drift_threshold};
use datagate_model::config::{
    ARTIFACT_DIR, DATA_INGESTION_SEED, DATA_INGESTION_TEST_RATIO, DEFAULT_DRIFT_THRESHOLD,
};

#[derive(Parser)]
#[command(
    name = "datagate",
    version,
    about = "Split raw tables and gate them on schema and drift checks",
    long_about = "Split a raw CSV table into train/test partitions and validate them.\n\n\
                  Validation checks the declared schema, runs a two-sample\n\
                  Kolmogorov-Smirnov test per column and copies the partitions to\n\
                  the valid or invalid artifact directory."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Split a raw CSV into train/test partitions.
    Ingest(IngestArgs),

    /// Validate existing train/test partitions.
    Validate(ValidateArgs),

    /// Ingest a raw CSV, then validate the resulting partitions.
    Run(RunArgs),

    /// Print the columns declared by a schema file.
    Schema(SchemaArgs),
}

#[derive(Args, Clone, Debug)]
pub struct ArtifactArgs {
    /// Root directory for run artifacts.
    #[arg(long = "artifact-dir", value_name = "DIR", default_value = ARTIFACT_DIR)]
    pub artifact_dir: PathBuf,

    /// Run directory name (default: current local time).
    #[arg(long = "timestamp", value_name = "NAME")]
    pub timestamp: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct SplitArgs {
    /// Fraction of rows assigned to the test partition.
    #[arg(long = "test-ratio", value_name = "RATIO", default_value_t = DATA_INGESTION_TEST_RATIO)]
    pub test_ratio: f64,

    /// Seed for the row shuffle.
    #[arg(long = "seed", default_value_t = DATA_INGESTION_SEED)]
    pub seed: u64,
}

#[derive(Args, Clone, Debug)]
pub struct GateArgs {
    /// Schema file (default: $DATAGATE_SCHEMA_FILE or data_schema/schema.yaml).
    #[arg(long = "schema", value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// P-values below this flag a column as drifted.
    #[arg(
        long = "threshold",
        value_name = "P",
        default_value_t = DEFAULT_DRIFT_THRESHOLD,
        value_parser = parse_threshold
    )]
    pub threshold: f64,

    /// What the schema entry count is compared against.
    #[arg(long = "count-basis", value_enum, default_value = "columns")]
    pub count_basis: CountBasisArg,

    /// Abort on a column-count mismatch instead of recording a finding.
    #[arg(long = "strict-columns")]
    pub strict_columns: bool,
}

fn parse_threshold(value: &str) -> Result<f64, String> {
    let threshold: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    check_drift_threshold(threshold).map_err(|_| "must be a finite value in [0, 1]".to_string())?;
    Ok(threshold)
}

#[derive(Parser, Clone, Debug)]
pub struct IngestArgs {
    /// Raw CSV table to split.
    #[arg(value_name = "RAW_CSV")]
    pub raw_file: PathBuf,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    #[command(flatten)]
    pub split: SplitArgs,

    /// Print the artifact as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser, Clone, Debug)]
pub struct ValidateArgs {
    /// Train partition.
    #[arg(long = "train", value_name = "PATH")]
    pub train: PathBuf,

    /// Test partition.
    #[arg(long = "test", value_name = "PATH")]
    pub test: PathBuf,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    #[command(flatten)]
    pub gate: GateArgs,

    /// Print the outcome as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser, Clone, Debug)]
pub struct RunArgs {
    /// Raw CSV table to split and validate.
    #[arg(value_name = "RAW_CSV")]
    pub raw_file: PathBuf,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    #[command(flatten)]
    pub split: SplitArgs,

    #[command(flatten)]
    pub gate: GateArgs,

    /// Print the outcome as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser, Clone, Debug)]
pub struct SchemaArgs {
    /// Schema file (default: $DATAGATE_SCHEMA_FILE or data_schema/schema.yaml).
    #[arg(value_name = "SCHEMA")]
    pub schema: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CountBasisArg {
    Rows,
    Columns,
}

impl From<CountBasisArg> for ColumnCountBasis {
    fn from(value: CountBasisArg) -> Self {
        match value {
            CountBasisArg::Rows => ColumnCountBasis::Rows,
            CountBasisArg::Columns => ColumnCountBasis::Columns,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_gate_flags() {
        let cli = Cli::try_parse_from([
            "datagate",
            "run",
            "phising.csv",
            "--schema",
            "schema.yaml",
            "--threshold",
            "0.1",
            "--count-basis",
            "rows",
            "--strict-columns",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.raw_file, PathBuf::from("phising.csv"));
        assert_eq!(args.gate.threshold, 0.1);
        assert!(args.gate.strict_columns);
        assert_eq!(
            ColumnCountBasis::from(args.gate.count_basis),
            ColumnCountBasis::Rows
        );
        assert_eq!(args.artifacts.artifact_dir, PathBuf::from(ARTIFACT_DIR));
        assert_eq!(args.split.seed, DATA_INGESTION_SEED);
    }

    #[test]
    fn threshold_outside_unit_interval_is_rejected() {
        for value in ["NaN", "-1", "1.5", "inf", "abc"] {
            let parsed =
                Cli::try_parse_from(["datagate", "run", "phising.csv", "--threshold", value]);
            assert!(parsed.is_err(), "accepted --threshold {value}");
        }
        let cli =
            Cli::try_parse_from(["datagate", "run", "phising.csv", "--threshold", "0"]).unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.gate.threshold, 0.0);
    }

    #[test]
    fn validate_requires_both_partitions() {
        assert!(Cli::try_parse_from(["datagate", "validate", "--train", "train.csv"]).is_err());
    }
}

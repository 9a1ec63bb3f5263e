//! datagate CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use datagate_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use datagate_cli::commands::{run_ingest, run_pipeline, run_schema, run_validate};
use datagate_cli::logging::{LogConfig, LogFormat, init_logging};
use datagate_cli::summary::{print_ingestion, print_json, print_outcome, print_schema};
use datagate_cli::types::GateOutcome;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Ingest(args) => match run_ingest(&args) {
            Ok(artifact) if args.json => report_json(&artifact),
            Ok(artifact) => {
                print_ingestion(&artifact);
                0
            }
            Err(error) => report_error(&error),
        },
        Command::Validate(args) => {
            let json = args.json;
            gate_exit_code(run_validate(&args), json)
        }
        Command::Run(args) => {
            let json = args.json;
            gate_exit_code(run_pipeline(&args), json)
        }
        Command::Schema(args) => match run_schema(&args) {
            Ok((path, schema)) => {
                print_schema(&path, &schema);
                0
            }
            Err(error) => report_error(&error),
        },
    };
    std::process::exit(exit_code);
}

/// A failed gate exits non-zero even though the run itself completed.
fn gate_exit_code(result: anyhow::Result<GateOutcome>, json: bool) -> i32 {
    match result {
        Ok(outcome) => {
            let code = if json {
                report_json(&outcome)
            } else {
                print_outcome(&outcome);
                0
            };
            if outcome.has_failed() { 1 } else { code }
        }
        Err(error) => report_error(&error),
    }
}

fn report_json<T: serde::Serialize>(value: &T) -> i32 {
    match print_json(value) {
        Ok(()) => 0,
        Err(error) => report_error(&error),
    }
}

fn report_error(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    1
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

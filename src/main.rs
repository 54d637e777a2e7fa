mod cli;
mod client;
mod config;
mod error;
mod formatter;
mod path;
mod report;
mod types;

use crate::client::transport::DryRunTransport;
use crate::client::ReportClient;
use crate::error::InsightsError;
use crate::formatter::ErrorFormatter;
use crate::path::PathNormalizer;
use crate::types::analysis::AnalysisResult;
use clap::Parser;
use std::io::Read;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const ISSUES: i32 = 1;
    pub const RUNTIME_FAILURE: i32 = 2;
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_input(path: &Path) -> Result<String, InsightsError> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return Ok(content);
    }
    std::fs::read_to_string(path).map_err(|e| {
        InsightsError::Input(format!("cannot read {}: {}", path.display(), e))
    })
}

fn run() -> Result<i32, InsightsError> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        cli::Commands::Report(cmd) => {
            let result = AnalysisResult::from_json(&read_input(&cmd.input)?)?;
            tracing::info!(
                file_errors = result.file_specific_errors.len(),
                other_errors = result.not_file_specific_errors.len(),
                "loaded analysis result"
            );

            let mut loaded = config::load_config(cmd.config.as_deref())?;
            if cmd.bulk {
                loaded.submit_mode = config::SubmitMode::Bulk;
            }

            let client = if cmd.dry_run {
                ReportClient::new(&loaded, Box::new(DryRunTransport))
            } else {
                ReportClient::over_http(&loaded)?
            };
            let output_format = match cmd.format {
                cli::ConsoleFormat::Table => report::OutputFormat::Table,
                cli::ConsoleFormat::Json => report::OutputFormat::Json,
            };
            let formatter = ErrorFormatter::new(client, PathNormalizer::new(&loaded.clone_dir))
                .with_output_format(output_format)
                .with_submit_mode(loaded.submit_mode);

            formatter.format(&result, &mut std::io::stdout().lock())
        }
        cli::Commands::Config(cmd) => {
            let loaded = config::load_config(cmd.config.as_deref())?;
            print!("{}", config::render_config(&loaded)?);
            Ok(exit_code::SUCCESS)
        }
    }
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}

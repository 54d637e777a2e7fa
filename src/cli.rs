use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "code-insights",
    version,
    about = "Publish static-analysis errors as Bitbucket Code Insights reports"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the analysis result and publish it as a report with annotations
    Report(ReportCommand),
    /// Print the resolved configuration
    Config(ConfigCommand),
}

#[derive(Args)]
pub struct ReportCommand {
    /// Analyzer output in JSON error format; `-` reads stdin
    #[arg(default_value = "-")]
    pub input: PathBuf,
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: ConsoleFormat,
    /// Config file (defaults to .insights.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Submit annotations through the bulk endpoint
    #[arg(long)]
    pub bulk: bool,
    /// Print the requests instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ConfigCommand {
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, ValueEnum)]
pub enum ConsoleFormat {
    Table,
    Json,
}

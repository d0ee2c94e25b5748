//! # Commands
//!
//! - `sentryscan scan` - Scan paths and git history for secrets
//! - `sentryscan baseline add` - Record current findings as accepted
//! - `sentryscan baseline list` - List recorded suppressions

mod commands;
mod output;
mod ui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sentryscan_core::Severity;

#[derive(Debug, Parser)]
#[command(
    name = "sentryscan",
    version,
    about = "Detects secrets in source trees and git history",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(visible_alias = "s")]
    Scan(ScanArgs),

    #[command(visible_alias = "b")]
    Baseline(BaselineArgs),
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
    /// SARIF (Static Analysis Results Interchange Format).
    Sarif,
}

/// Arguments for the `sentryscan scan` command.
#[derive(Debug, Parser)]
pub struct ScanArgs {
    /// Paths to scan; git repositories are scanned through their history
    /// selectors.
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Path to the configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Always exit with code 0 when the scan itself succeeds.
    #[arg(long)]
    pub no_fail: bool,

    /// Number of parallel scanning threads.
    #[arg(long)]
    pub threads: Option<usize>,

    /// Scan git changes since this commit.
    #[arg(long, value_name = "REF")]
    pub since: Option<String>,

    /// Scan the tip of this branch.
    #[arg(long, value_name = "NAME")]
    pub branch: Option<String>,

    /// Scan a commit range (from..to).
    #[arg(long, value_name = "FROM..TO")]
    pub commit_range: Option<String>,

    /// Only scan files with these extensions (including the leading dot).
    #[arg(long, value_name = "EXT")]
    pub include_ext: Vec<String>,

    /// Never scan files with these extensions.
    #[arg(long, value_name = "EXT")]
    pub exclude_ext: Vec<String>,

    /// Skip files larger than this many bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_file_size: Option<u64>,

    /// Ignore baseline suppressions.
    #[arg(long)]
    pub no_baseline: bool,

    /// Webhook URL for alerts.
    #[arg(long, value_name = "URL")]
    pub webhook_url: Option<String>,

    /// Webhook secret for signing.
    #[arg(long, value_name = "SECRET")]
    pub webhook_secret: Option<String>,

    /// Minimum severity that affects the exit code.
    #[arg(long)]
    pub severity: Option<Severity>,
}

/// Arguments for the `sentryscan baseline` command.
#[derive(Debug, Parser)]
pub struct BaselineArgs {
    #[command(subcommand)]
    pub command: BaselineCommand,
}

/// Subcommands for `sentryscan baseline`.
#[derive(Debug, Subcommand)]
pub enum BaselineCommand {
    /// Scan and record all current findings as accepted.
    Add(BaselineAddArgs),
    /// List recorded suppressions.
    List(BaselineListArgs),
}

/// Arguments for `sentryscan baseline add`.
#[derive(Debug, Parser)]
pub struct BaselineAddArgs {
    /// Paths to scan; the baseline is written to the first path.
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Path to the configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for `sentryscan baseline list`.
#[derive(Debug, Parser)]
pub struct BaselineListArgs {
    /// Scan root holding the baseline file.
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    let code = match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            ui::print_error(&format!("{err:#}"));
            ui::exit::ERROR
        }
    };

    std::process::exit(code);
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();
}

fn run(command: Command) -> anyhow::Result<i32> {
    match command {
        Command::Scan(args) => commands::scan::run(&args),
        Command::Baseline(args) => commands::baseline::run(&args),
    }
}

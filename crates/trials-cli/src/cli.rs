//! CLI argument definitions for the trials ETL.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "trials-etl",
    version,
    about = "Fetch, normalize and load drug filings and clinical trials",
    long_about = "Fetch FDA drug filings and ClinicalTrials.gov studies, flatten them into\n\
                  CSV tables, recode demographics and drug names, and load a SQLite store."
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

    /// Pipeline configuration file (TOML).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

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
    /// Page upstream datasets into the page store.
    Fetch(FetchArgs),

    /// Flatten stored pages into CSV tables.
    Build(BuildArgs),

    /// Replace the SQLite store from the CSV tables.
    Load,

    /// Fetch, build and load in one go.
    Run(RunArgs),

    /// List discovered race labels and the code each recodes to.
    Labels(BuildArgs),
}

#[derive(Args)]
pub struct FetchArgs {
    /// Dataset to fetch.
    #[arg(value_enum, default_value = "all")]
    pub dataset: DatasetArg,

    #[command(flatten)]
    pub limits: FetchLimits,
}

#[derive(Args)]
pub struct FetchLimits {
    /// Add pages to the existing store instead of replacing it.
    #[arg(long = "append")]
    pub append: bool,

    /// Stop after this many records per dataset.
    #[arg(long = "limit-total", value_name = "N")]
    pub limit_total: Option<usize>,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Fail on race labels no rule recognizes instead of recoding them as unknown.
    #[arg(long = "strict")]
    pub strict: bool,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub limits: FetchLimits,

    #[command(flatten)]
    pub build: BuildArgs,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DatasetArg {
    Trials,
    Fda,
    All,
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

use anyhow::{Context, Result};
use tracing::info_span;
use trials_cli::config::PipelineConfig;
use trials_cli::pipeline::{
    BuildOutput, DatasetSelection, LabelReport, PipelineContext, RunOptions,
};
use trials_fetch::{FetchReport, HttpPageClient, WriteMode};
use trials_load::LoadReport;
use trials_recode::RecodeMode;

use crate::cli::{BuildArgs, Cli, DatasetArg, FetchArgs, FetchLimits, RunArgs};

/// What a command produced, for the summary printer.
pub enum CommandOutput {
    Fetched(Vec<FetchReport>),
    Built(BuildOutput),
    Loaded(LoadReport),
    Ran {
        fetched: Vec<FetchReport>,
        built: BuildOutput,
        loaded: LoadReport,
    },
    Labels(LabelReport),
}

fn context(cli: &Cli, options: RunOptions) -> Result<PipelineContext> {
    let config = PipelineConfig::load(cli.config.as_deref())?;
    PipelineContext::new(config, options)
}

fn http_client(ctx: &PipelineContext) -> Result<HttpPageClient> {
    // Both sources share one client; the longer timeout wins.
    let timeout = ctx
        .config()
        .trials_source()
        .timeout()
        .max(ctx.config().fda_source().timeout());
    HttpPageClient::new(timeout).context("build http client")
}

fn fetch_options(limits: &FetchLimits) -> RunOptions {
    RunOptions {
        write_mode: if limits.append {
            WriteMode::Append
        } else {
            WriteMode::Replace
        },
        limit_total: limits.limit_total,
        strict: None,
    }
}

fn strict_flag(args: &BuildArgs) -> Option<bool> {
    args.strict.then_some(true)
}

fn selection(dataset: DatasetArg) -> DatasetSelection {
    match dataset {
        DatasetArg::Trials => DatasetSelection::Trials,
        DatasetArg::Fda => DatasetSelection::Fda,
        DatasetArg::All => DatasetSelection::All,
    }
}

pub fn run_fetch(cli: &Cli, args: &FetchArgs) -> Result<CommandOutput> {
    let span = info_span!("fetch");
    let _guard = span.enter();
    let ctx = context(cli, fetch_options(&args.limits))?;
    let client = http_client(&ctx)?;
    let reports = ctx.fetch(&client, selection(args.dataset))?;
    Ok(CommandOutput::Fetched(reports))
}

pub fn run_build(cli: &Cli, args: &BuildArgs) -> Result<CommandOutput> {
    let options = RunOptions {
        strict: strict_flag(args),
        ..RunOptions::default()
    };
    let ctx = context(cli, options)?;
    Ok(CommandOutput::Built(ctx.build()?))
}

pub fn run_load(cli: &Cli) -> Result<CommandOutput> {
    let mut ctx = context(cli, RunOptions::default())?;
    Ok(CommandOutput::Loaded(ctx.load()?))
}

pub fn run_all(cli: &Cli, args: &RunArgs) -> Result<CommandOutput> {
    let options = RunOptions {
        strict: strict_flag(&args.build),
        ..fetch_options(&args.limits)
    };
    let mut ctx = context(cli, options)?;
    let client = http_client(&ctx)?;
    let (fetched, built, loaded) = ctx.run(&client, DatasetSelection::All)?;
    Ok(CommandOutput::Ran {
        fetched,
        built,
        loaded,
    })
}

pub fn run_labels(cli: &Cli, args: &BuildArgs) -> Result<CommandOutput> {
    let ctx = context(cli, RunOptions::default())?;
    let strict = args.strict || ctx.config().recode.strict;
    let report = ctx.labels(RecodeMode::from_strict(strict))?;
    Ok(CommandOutput::Labels(report))
}

impl CommandOutput {
    /// Strict label listings that left labels unrecoded fail the process.
    pub fn has_unmatched_labels(&self) -> bool {
        matches!(self, Self::Labels(report) if !report.outcome.unmatched.is_empty())
    }
}

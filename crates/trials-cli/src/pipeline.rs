//! Pipeline stages over one explicit run context.
//!
//! 1. **Fetch**: page each upstream dataset into the page store
//! 2. **Build**: extract, explode, recode demographics, resolve drug names,
//!    write CSVs
//! 3. **Load**: replace the relational store from the CSVs, last
//!
//! The context owns the page store and the database connection for the run.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};
use trials_extract::{
    Schema, build_tables, fda_table_specs, read_table, table_path, trial_table_specs,
    write_tables,
};
use trials_fetch::{FetchReport, PageClient, PageStore, Paginator, SourceConfig, WriteMode};
use trials_load::{LoadReport, SqliteLoader};
use trials_model::{CellValue, DatasetId, Table};
use trials_recode::{
    MeasureFilter, RecodeMode, RecodeOutcome, RuleSet, discover, race_counts, recode, sex_counts,
};
use trials_resolve::{
    LeaderClusterer, apply_mapping, build_canonical, canonical_table, match_names,
};

use crate::config::PipelineConfig;

/// Tables the relational store is replaced with, in load order.
pub const LOAD_TABLES: &[&str] = &[
    "trial_conditions",
    "trial_interventions",
    "trial_locations",
    "trial_race",
    "trial_sex",
    "fda_full",
    "trials",
    "trial_status",
];

/// Which upstream dataset(s) a fetch covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetSelection {
    Trials,
    Fda,
    All,
}

impl DatasetSelection {
    pub fn datasets(self) -> Vec<DatasetId> {
        match self {
            Self::Trials => vec![DatasetId::trials()],
            Self::Fda => vec![DatasetId::fda()],
            Self::All => vec![DatasetId::trials(), DatasetId::fda()],
        }
    }
}

/// Run-scoped overrides coming from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub write_mode: WriteMode,
    pub limit_total: Option<usize>,
    pub strict: Option<bool>,
}

/// Output of the build stage.
#[derive(Debug)]
pub struct BuildOutput {
    pub tables: Vec<Table>,
    pub csv_paths: Vec<PathBuf>,
    pub race_labels: RecodeOutcome,
    pub canonical_drugs: usize,
    pub mapped_names: usize,
}

/// Discovered race labels and how they recode.
#[derive(Debug)]
pub struct LabelReport {
    pub labels: Vec<String>,
    pub outcome: RecodeOutcome,
}

pub struct PipelineContext {
    config: PipelineConfig,
    options: RunOptions,
    store: PageStore,
    loader: Option<SqliteLoader>,
}

impl PipelineContext {
    pub fn new(config: PipelineConfig, options: RunOptions) -> Result<Self> {
        let store = PageStore::open(&config.paths.data_dir)
            .with_context(|| format!("open page store: {}", config.paths.data_dir.display()))?;
        Ok(Self {
            config,
            options,
            store,
            loader: None,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &PageStore {
        &self.store
    }

    fn strict(&self) -> bool {
        self.options.strict.unwrap_or(self.config.recode.strict)
    }

    /// Source configuration for `dataset`, with run overrides applied.
    pub fn source_config(&self, dataset: &DatasetId) -> Result<SourceConfig> {
        let mut source = match dataset.as_str() {
            "trials" => self.config.trials_source(),
            "fda" => self.config.fda_source(),
            other => bail!("no source configured for dataset {other}"),
        };
        if self.options.limit_total.is_some() {
            source.limit_total = self.options.limit_total;
        }
        Ok(source)
    }

    /// Database connection, opened on first use and kept for the run.
    fn loader(&mut self) -> Result<&mut SqliteLoader> {
        if self.loader.is_none() {
            let path = &self.config.paths.database;
            let loader = SqliteLoader::open(path)
                .with_context(|| format!("open database: {}", path.display()))?;
            self.loader = Some(loader);
        }
        self.loader
            .as_mut()
            .context("database connection unavailable")
    }

    // ------------------------------------------------------------------
    // Stage 1: Fetch
    // ------------------------------------------------------------------

    pub fn fetch<C: PageClient>(
        &self,
        client: &C,
        selection: DatasetSelection,
    ) -> Result<Vec<FetchReport>> {
        let mut reports = Vec::new();
        for dataset in selection.datasets() {
            let source = self.source_config(&dataset)?;
            let started = Instant::now();
            let report = Paginator::new(client, &self.store, &source)
                .fetch_all(self.options.write_mode)
                .with_context(|| format!("fetch {dataset}"))?;
            info!(
                dataset = %dataset,
                pages = report.pages.len(),
                records = report.records,
                elapsed_ms = started.elapsed().as_millis(),
                "dataset fetched"
            );
            reports.push(report);
        }
        Ok(reports)
    }

    // ------------------------------------------------------------------
    // Stage 2: Build
    // ------------------------------------------------------------------

    /// Discovers race labels across stored trials and recodes them.
    pub fn labels(&self, mode: RecodeMode) -> Result<LabelReport> {
        let records = self
            .store
            .records(&DatasetId::trials())
            .context("load trial pages")?;
        let labels = discover(&records, &MeasureFilter::race());
        let rules = RuleSet::race().context("compile race rules")?;
        let outcome = recode(&labels, &rules, mode);
        Ok(LabelReport { labels, outcome })
    }

    pub fn build(&self) -> Result<BuildOutput> {
        let span = info_span!("build");
        let _guard = span.enter();
        let started = Instant::now();

        let trial_records = self
            .store
            .records(&DatasetId::trials())
            .context("load trial pages")?;
        let fda_records = self
            .store
            .records(&DatasetId::fda())
            .context("load fda pages")?;
        if trial_records.is_empty() {
            warn!("no trial records in the page store");
        }

        let trial_schema = Schema::clinical_trials();
        let trials = trial_schema
            .extract_all(&trial_records)
            .context("extract trial records")?;
        let fda = Schema::openfda_drugs()
            .extract_all(&fda_records)
            .context("extract fda records")?;

        let mut tables = build_tables(&trials, &trial_table_specs()).context("build trial tables")?;
        tables.extend(build_tables(&fda, &fda_table_specs()).context("build fda tables")?);

        // Demographics
        let mode = RecodeMode::from_strict(self.strict());
        let labels = discover(&trial_records, &MeasureFilter::race());
        let rules = RuleSet::race().context("compile race rules")?;
        let race_labels = recode(&labels, &rules, mode);
        if !race_labels.unmatched.is_empty() {
            bail!(
                "{} race label(s) matched no rule: {}; add a rule or run without --strict",
                race_labels.unmatched.len(),
                race_labels.unmatched.join(", ")
            );
        }
        tables.push(
            race_counts(&trial_schema, &trial_records, &race_labels.table, &MeasureFilter::race())
                .context("extract race counts")?,
        );
        tables.push(
            sex_counts(&trial_schema, &trial_records, &MeasureFilter::sex())
                .context("extract sex counts")?,
        );

        // Drug names
        let fda_full = find_table(&tables, "fda_full")?;
        let clusterer = LeaderClusterer {
            threshold: self.config.resolve.cluster_threshold,
        };
        let canonical = build_canonical(fda_full, "brand_name", &clusterer)
            .context("build canonical drugs")?;
        let canonical_names: Vec<String> = canonical.iter().map(|drug| drug.name.clone()).collect();
        let raw_interventions = find_table(&tables, "trial_interventions_raw")?;
        let raw_names = raw_interventions
            .column_values("intervention_name")
            .unwrap_or_default()
            .into_iter()
            .filter_map(CellValue::as_text);
        let mapping = match_names(&canonical_names, raw_names, self.config.resolve.tolerance);
        let interventions = apply_mapping(
            raw_interventions,
            "intervention_name",
            &mapping,
            "trial_interventions",
        )
        .context("recode trial interventions")?;
        tables.push(canonical_table(&canonical).context("build canonical drug table")?);
        tables.push(interventions);

        let csv_paths =
            write_tables(&self.config.paths.csv_dir, &tables).context("write csv tables")?;
        info!(
            tables = tables.len(),
            canonical = canonical.len(),
            mapped = mapping.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "build finished"
        );
        Ok(BuildOutput {
            tables,
            csv_paths,
            race_labels,
            canonical_drugs: canonical.len(),
            mapped_names: mapping.len(),
        })
    }

    // ------------------------------------------------------------------
    // Stage 3: Load
    // ------------------------------------------------------------------

    /// Reads every load table from the CSV directory, then replaces the
    /// relational store in one transaction.
    pub fn load(&mut self) -> Result<LoadReport> {
        let span = info_span!("load_stage");
        let _guard = span.enter();

        let csv_dir = self.config.paths.csv_dir.clone();
        let mut tables = Vec::with_capacity(LOAD_TABLES.len());
        for name in LOAD_TABLES {
            let path = table_path(&csv_dir, name);
            let table = read_table(name, &path)
                .with_context(|| format!("read {} (run `build` first)", path.display()))?;
            tables.push(table);
        }
        let loader = self.loader()?;
        loader.load(&tables).context("load relational store")
    }

    /// Fetch, build, then load.
    pub fn run<C: PageClient>(
        &mut self,
        client: &C,
        selection: DatasetSelection,
    ) -> Result<(Vec<FetchReport>, BuildOutput, LoadReport)> {
        let fetched = self.fetch(client, selection)?;
        let built = self.build()?;
        let loaded = self.load()?;
        Ok((fetched, built, loaded))
    }
}

fn find_table<'a>(tables: &'a [Table], name: &str) -> Result<&'a Table> {
    tables
        .iter()
        .find(|table| table.name == name)
        .with_context(|| format!("table {name} was not built"))
}

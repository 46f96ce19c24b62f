//! Pipeline configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) reproduces the
//! production queries. Source sections only override what they name.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use trials_fetch::{Pagination, SourceConfig};
use trials_resolve::{DEFAULT_CLUSTER_THRESHOLD, DEFAULT_TOLERANCE};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Page store root.
    pub data_dir: PathBuf,
    /// Directory for `<table>.csv` outputs.
    pub csv_dir: PathBuf,
    /// SQLite database file.
    pub database: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            csv_dir: PathBuf::from("data/csvs"),
            database: PathBuf::from("data/trials.db"),
        }
    }
}

/// Overrides for one upstream source.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSettings {
    pub endpoint: Option<String>,
    pub pagination: Option<Pagination>,
    pub records_key: Option<String>,
    pub fields: Option<Vec<String>>,
    pub fields_param: Option<String>,
    pub limit_param: Option<String>,
    pub limit_per_call: Option<usize>,
    pub max_limit: Option<usize>,
    pub limit_total: Option<usize>,
    pub filters: Option<Vec<(String, String)>>,
    pub page_delay_ms: Option<u64>,
    pub retries: Option<u32>,
    pub retry_backoff_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
}

impl SourceSettings {
    /// Applies the overrides on top of `base`.
    pub fn apply(&self, mut base: SourceConfig) -> SourceConfig {
        if let Some(endpoint) = &self.endpoint {
            base.endpoint.clone_from(endpoint);
        }
        if let Some(pagination) = &self.pagination {
            base.pagination = pagination.clone();
        }
        if let Some(key) = &self.records_key {
            base.records_key.clone_from(key);
        }
        if let Some(fields) = &self.fields {
            base.fields.clone_from(fields);
        }
        if self.fields_param.is_some() {
            base.fields_param.clone_from(&self.fields_param);
        }
        if let Some(param) = &self.limit_param {
            base.limit_param.clone_from(param);
        }
        if let Some(filters) = &self.filters {
            base.filters.clone_from(filters);
        }
        base.limit_per_call = self.limit_per_call.unwrap_or(base.limit_per_call);
        base.max_limit = self.max_limit.unwrap_or(base.max_limit);
        base.limit_total = self.limit_total.or(base.limit_total);
        base.page_delay_ms = self.page_delay_ms.unwrap_or(base.page_delay_ms);
        base.retries = self.retries.unwrap_or(base.retries);
        base.retry_backoff_ms = self.retry_backoff_ms.unwrap_or(base.retry_backoff_ms);
        base.timeout_secs = self.timeout_secs.unwrap_or(base.timeout_secs);
        base
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveConfig {
    /// Minimum Jaro similarity for a name match.
    pub tolerance: f64,
    /// Jaro-Winkler threshold for clustering canonical names.
    pub cluster_threshold: f64,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            cluster_threshold: DEFAULT_CLUSTER_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecodeConfig {
    /// Fail on labels no rule matches instead of coding them `unknown`.
    pub strict: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub trials: SourceSettings,
    pub fda: SourceSettings,
    pub resolve: ResolveConfig,
    pub recode: RecodeConfig,
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("parse pipeline config")
    }

    /// Reads `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config: {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn trials_source(&self) -> SourceConfig {
        self.trials.apply(SourceConfig::clinical_trials())
    }

    pub fn fda_source(&self) -> SourceConfig {
        self.fda.apply(SourceConfig::openfda_drugs())
    }
}

//! Source configuration for paginated retrieval.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use trials_model::DatasetId;

/// ClinicalTrials.gov v2 studies endpoint.
pub const CLINICAL_TRIALS_ENDPOINT: &str = "https://clinicaltrials.gov/api/v2/studies";

/// openFDA drugs@FDA endpoint.
pub const OPENFDA_DRUGS_ENDPOINT: &str = "https://api.fda.gov/drug/drugsfda.json";

/// Upper bound both upstream APIs place on one call.
pub const DEFAULT_MAX_LIMIT: usize = 1000;

/// Delay between successive calls.
pub const DEFAULT_PAGE_DELAY_MS: u64 = 2000;

/// How the next page is requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum Pagination {
    /// Opaque continuation token returned in the response body.
    Token {
        /// Query parameter carrying the token on the next call.
        request_param: String,
        /// Top-level response key holding the next token.
        response_key: String,
    },
    /// Explicit numeric offset; next offset is `skip + records returned`.
    Offset {
        /// Query parameter carrying the offset.
        skip_param: String,
    },
}

/// Everything needed to page through one upstream dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub dataset: DatasetId,
    pub endpoint: String,
    pub pagination: Pagination,
    /// Top-level response key holding the page's records.
    pub records_key: String,
    /// Requested field list, sent joined with `|` when `fields_param` is set.
    pub fields: Vec<String>,
    pub fields_param: Option<String>,
    pub limit_param: String,
    pub limit_per_call: usize,
    pub max_limit: usize,
    /// Hard cap on the number of records retrieved in one run.
    pub limit_total: Option<usize>,
    /// Source-specific filter predicates, sent in order.
    pub filters: Vec<(String, String)>,
    pub page_delay_ms: u64,
    pub retries: u32,
    pub retry_backoff_ms: u64,
    pub timeout_secs: u64,
}

impl SourceConfig {
    /// Production query for FDA-regulated phase 3/4 drug trials in the US.
    pub fn clinical_trials() -> Self {
        Self {
            dataset: DatasetId::trials(),
            endpoint: CLINICAL_TRIALS_ENDPOINT.to_string(),
            pagination: Pagination::Token {
                request_param: "pageToken".to_string(),
                response_key: "nextPageToken".to_string(),
            },
            records_key: "studies".to_string(),
            fields: Vec::new(),
            fields_param: None,
            limit_param: "pageSize".to_string(),
            limit_per_call: DEFAULT_MAX_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
            limit_total: None,
            filters: vec![
                pair("format", "json"),
                pair("query.intr", "AREA[InterventionType]DRUG"),
                pair("query.locn", "AREA[LocationCountry]United States"),
                pair(
                    "postFilter.advanced",
                    "AREA[IsFDARegulatedDrug]true AND AREA[Phase](PHASE3 OR PHASE4)",
                ),
            ],
            page_delay_ms: DEFAULT_PAGE_DELAY_MS,
            retries: 2,
            retry_backoff_ms: 1000,
            timeout_secs: 60,
        }
    }

    /// Production query for drug applications with submissions since 2003.
    pub fn openfda_drugs() -> Self {
        Self {
            dataset: DatasetId::fda(),
            endpoint: OPENFDA_DRUGS_ENDPOINT.to_string(),
            pagination: Pagination::Offset {
                skip_param: "skip".to_string(),
            },
            records_key: "results".to_string(),
            fields: Vec::new(),
            fields_param: None,
            limit_param: "limit".to_string(),
            limit_per_call: DEFAULT_MAX_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
            limit_total: None,
            filters: vec![pair(
                "search",
                "submissions.submission_status_date:[2003-01-01 TO 2024-02-19]",
            )],
            page_delay_ms: DEFAULT_PAGE_DELAY_MS,
            retries: 2,
            retry_backoff_ms: 1000,
            timeout_secs: 60,
        }
    }

    /// Per-call limit clamped to the source maximum, never zero.
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit_per_call.min(self.max_limit).max(1)
    }

    #[must_use]
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    #[must_use]
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the query for one call.
    ///
    /// `cursor` is the continuation token for token paging; `offset` is used
    /// for offset paging. Filters come first, in configured order.
    pub fn query(&self, limit: usize, cursor: Option<&str>, offset: usize) -> Vec<(String, String)> {
        let mut query = self.filters.clone();
        if let Some(param) = &self.fields_param
            && !self.fields.is_empty()
        {
            query.push((param.clone(), self.fields.join("|")));
        }
        query.push((self.limit_param.clone(), limit.to_string()));
        match &self.pagination {
            Pagination::Token { request_param, .. } => {
                if let Some(token) = cursor {
                    query.push((request_param.clone(), token.to_string()));
                }
            }
            Pagination::Offset { skip_param } => {
                query.push((skip_param.clone(), offset.to_string()));
            }
        }
        query
    }
}

fn pair(key: &str, value: &str) -> (String, String) {
    (key.to_string(), value.to_string())
}

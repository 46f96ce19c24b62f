//! Page-by-page retrieval of one dataset.

use std::fmt;
use std::thread;

use serde_json::Value;
use tracing::{debug, info, info_span, warn};
use trials_model::{DatasetId, RawPage};

use crate::client::{PageClient, PageResponse};
use crate::config::{Pagination, SourceConfig};
use crate::error::Result;
use crate::store::PageStore;

/// Whether a run replaces or extends previously stored pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    Replace,
    Append,
}

/// Why pagination ended. None of these are failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The last page carried no continuation (or was a short offset page).
    NoContinuation,
    /// The configured record cap was reached.
    CapReached,
    /// Upstream answered with a non-success status.
    Status(u16),
    /// The response body lacked the named top-level key.
    MissingKey(String),
    /// A page came back with zero records.
    EmptyPage,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoContinuation => f.write_str("no continuation"),
            Self::CapReached => f.write_str("record cap reached"),
            Self::Status(status) => write!(f, "HTTP status {status}"),
            Self::MissingKey(key) => write!(f, "missing key `{key}`"),
            Self::EmptyPage => f.write_str("empty page"),
        }
    }
}

/// Outcome of one `fetch_all` run.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub dataset: DatasetId,
    pub pages: Vec<RawPage>,
    pub records: usize,
    pub stop: StopReason,
}

/// Drives one source through its pages, persisting each page as it lands.
pub struct Paginator<'a, C: PageClient> {
    client: &'a C,
    store: &'a PageStore,
    config: &'a SourceConfig,
}

impl<'a, C: PageClient> Paginator<'a, C> {
    pub fn new(client: &'a C, store: &'a PageStore, config: &'a SourceConfig) -> Self {
        Self {
            client,
            store,
            config,
        }
    }

    /// Fetches pages until the source signals the end or the cap is reached.
    ///
    /// Transport failures (after retries) are returned as errors; pages
    /// stored before the failure stay in the page store.
    pub fn fetch_all(&self, mode: WriteMode) -> Result<FetchReport> {
        let config = self.config;
        let dataset = config.dataset.clone();
        let span = info_span!("fetch", dataset = %dataset);
        let _guard = span.enter();

        if mode == WriteMode::Replace {
            self.store.reset(&dataset)?;
        }

        let per_call = config.effective_limit();
        let mut pages: Vec<RawPage> = Vec::new();
        let mut records = 0usize;
        let mut cursor: Option<String> = None;
        let mut offset = 0usize;

        let stop = loop {
            let remaining = config.limit_total.map(|cap| cap.saturating_sub(records));
            if remaining == Some(0) {
                break StopReason::CapReached;
            }
            let requested = remaining.map_or(per_call, |left| left.min(per_call));

            if !pages.is_empty() {
                thread::sleep(config.page_delay());
            }

            let query = config.query(requested, cursor.as_deref(), offset);
            let response = self.request(&query)?;
            if !response.is_success() {
                warn!(status = response.status, "non-success status, ending pagination");
                break StopReason::Status(response.status);
            }
            let Some(body) = response.body else {
                break StopReason::MissingKey(config.records_key.clone());
            };
            let Some(mut batch) = take_records(&body, &config.records_key) else {
                warn!(key = %config.records_key, "records key missing, ending pagination");
                break StopReason::MissingKey(config.records_key.clone());
            };
            if batch.is_empty() {
                break StopReason::EmptyPage;
            }
            if let Some(left) = remaining {
                batch.truncate(left);
            }
            let returned = batch.len();

            let next_token = match &config.pagination {
                Pagination::Token { response_key, .. } => body
                    .get(response_key)
                    .and_then(Value::as_str)
                    .filter(|token| !token.is_empty())
                    .map(str::to_string),
                Pagination::Offset { .. } => None,
            };

            let page = RawPage::new(dataset.clone(), batch, next_token.clone());
            self.store.append_page(&page)?;
            records += returned;
            pages.push(page);
            info!(page = pages.len(), returned, total = records, "page stored");

            match &config.pagination {
                Pagination::Token { .. } => match next_token {
                    Some(token) => cursor = Some(token),
                    None => break StopReason::NoContinuation,
                },
                Pagination::Offset { .. } => {
                    offset += returned;
                    if returned < requested {
                        break StopReason::NoContinuation;
                    }
                }
            }
        };

        info!(pages = pages.len(), records, stop = %stop, "fetch finished");
        Ok(FetchReport {
            dataset,
            pages,
            records,
            stop,
        })
    }

    fn request(&self, query: &[(String, String)]) -> Result<PageResponse> {
        let mut attempt = 0u32;
        loop {
            match self.client.get(&self.config.endpoint, query) {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() && attempt < self.config.retries => {
                    let backoff = self.config.retry_backoff() * 2u32.saturating_pow(attempt);
                    warn!(attempt = attempt + 1, error = %err, ?backoff, "retrying request");
                    thread::sleep(backoff);
                    attempt += 1;
                }
                Err(err) => {
                    debug!(attempts = attempt + 1, "giving up on request");
                    return Err(err);
                }
            }
        }
    }
}

fn take_records(body: &Value, key: &str) -> Option<Vec<Value>> {
    match body.get(key)? {
        Value::Array(items) => Some(items.clone()),
        _ => None,
    }
}

//! Raw API pages as persisted by the page store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::DatasetId;

/// One response page from a paginated upstream API.
///
/// Records are kept as opaque JSON; the extractor decides what to read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    /// Dataset this page belongs to.
    pub dataset: DatasetId,
    /// Records in the order the API returned them.
    pub records: Vec<Value>,
    /// Continuation token for the next page, if the API returned one.
    #[serde(default)]
    pub next_token: Option<String>,
    /// When the page was received.
    pub fetched_at: DateTime<Utc>,
}

impl RawPage {
    pub fn new(dataset: DatasetId, records: Vec<Value>, next_token: Option<String>) -> Self {
        Self {
            dataset,
            records,
            next_token,
            fetched_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

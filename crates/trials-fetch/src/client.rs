//! HTTP access to paginated upstream APIs.

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{FetchError, Result};

/// One response as seen by the paginator.
///
/// `body` is `None` for non-success statuses and for bodies that are not
/// valid JSON; both end pagination rather than failing the run.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl PageResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body: Some(body),
        }
    }

    pub fn status(status: u16) -> Self {
        Self { status, body: None }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues one GET against a paginated endpoint.
///
/// Implementations return `Err` only when no HTTP response was obtained.
pub trait PageClient {
    fn get(&self, endpoint: &str, query: &[(String, String)]) -> Result<PageResponse>;
}

/// Blocking reqwest client.
pub struct HttpPageClient {
    client: Client,
}

impl HttpPageClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::Client(err.to_string()))?;
        Ok(Self { client })
    }
}

impl PageClient for HttpPageClient {
    fn get(&self, endpoint: &str, query: &[(String, String)]) -> Result<PageResponse> {
        let url = Url::parse_with_params(endpoint, query).map_err(|err| {
            FetchError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        })?;
        debug!(%url, "requesting page");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, concat!("trials-etl/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|err| FetchError::Transport {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Ok(PageResponse::status(status));
        }

        match response.json::<Value>() {
            Ok(body) => Ok(PageResponse {
                status,
                body: Some(body),
            }),
            Err(err) if err.is_decode() => {
                warn!(endpoint, error = %err, "response body is not JSON");
                Ok(PageResponse { status, body: None })
            }
            Err(err) => Err(FetchError::Transport {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }),
        }
    }
}

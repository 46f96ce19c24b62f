#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod paginator;
pub mod store;

pub use client::{HttpPageClient, PageClient, PageResponse};
pub use config::{Pagination, SourceConfig};
pub use error::{FetchError, Result};
pub use paginator::{FetchReport, Paginator, StopReason, WriteMode};
pub use store::PageStore;

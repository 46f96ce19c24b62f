#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod views;

pub use error::{LoadError, Result};
pub use loader::{LoadReport, SqliteLoader};
pub use views::{DERIVED_VIEWS, DerivedView, VIEWS_VERSION};

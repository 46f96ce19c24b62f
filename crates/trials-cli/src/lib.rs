//! Pipeline driver library for the trials/drug ETL.

#![deny(unsafe_code)]

pub mod config;
pub mod logging;
pub mod pipeline;

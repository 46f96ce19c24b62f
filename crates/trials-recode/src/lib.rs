#![deny(unsafe_code)]

pub mod codes;
pub mod counts;
pub mod discover;
pub mod error;
pub mod recode;
pub mod rules;

pub use codes::RaceCode;
pub use counts::{race_counts, sex_counts};
pub use discover::{COUNT_OF_PARTICIPANTS, MeasureFilter, discover, discover_pages};
pub use error::{RecodeError, Result};
pub use recode::{RecodeMode, RecodeOutcome, RecodeTable, recode};
pub use rules::{RecodeRule, RuleSet};

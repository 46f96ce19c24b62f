//! Label -> code tables.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::codes::RaceCode;
use crate::rules::RuleSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecodeMode {
    /// Unmatched labels are reported and left out of the table.
    Strict,
    /// Unmatched labels map to [`RaceCode::Unknown`].
    #[default]
    Lenient,
}

impl RecodeMode {
    pub fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Lenient }
    }
}

/// Label -> code mapping that remembers insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecodeTable {
    labels: Vec<String>,
    codes: HashMap<String, RaceCode>,
}

impl RecodeTable {
    pub fn insert(&mut self, label: impl Into<String>, code: RaceCode) {
        let label = label.into();
        if self.codes.insert(label.clone(), code).is_none() {
            self.labels.push(label);
        }
    }

    pub fn get(&self, label: &str) -> Option<RaceCode> {
        self.codes.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.codes.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, RaceCode)> + '_ {
        self.labels
            .iter()
            .filter_map(|label| self.codes.get(label).map(|code| (label.as_str(), *code)))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecodeOutcome {
    pub table: RecodeTable,
    /// Labels no rule matched (strict mode only).
    pub unmatched: Vec<String>,
}

/// Classifies each label with `rules`, first matching rule winning.
pub fn recode(labels: &[String], rules: &RuleSet, mode: RecodeMode) -> RecodeOutcome {
    let mut outcome = RecodeOutcome::default();
    for label in labels {
        if outcome.table.contains(label) || outcome.unmatched.contains(label) {
            continue;
        }
        match (rules.classify(label), mode) {
            (Some(code), _) => outcome.table.insert(label.as_str(), code),
            (None, RecodeMode::Lenient) => {
                debug!(label = %label, "unmatched label recoded as unknown");
                outcome.table.insert(label.as_str(), RaceCode::Unknown);
            }
            (None, RecodeMode::Strict) => outcome.unmatched.push(label.clone()),
        }
    }
    if !outcome.unmatched.is_empty() {
        warn!(count = outcome.unmatched.len(), "labels left unmatched");
    }
    outcome
}

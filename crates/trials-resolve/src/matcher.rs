//! Blocked, first-match fuzzy name linkage.

use std::collections::{HashMap, HashSet};

use rapidfuzz::distance::jaro;
use tracing::debug;

pub const DEFAULT_TOLERANCE: f64 = 0.85;

/// Raw name -> canonical name, at most one target per raw name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameMapping {
    order: Vec<String>,
    targets: HashMap<String, String>,
}

impl NameMapping {
    pub fn insert(&mut self, raw: impl Into<String>, canonical: impl Into<String>) {
        let raw = raw.into();
        if !self.targets.contains_key(&raw) {
            self.order.push(raw.clone());
            self.targets.insert(raw, canonical.into());
        }
    }

    pub fn get(&self, raw: &str) -> Option<&str> {
        self.targets.get(raw).map(String::as_str)
    }

    /// Mapped name, or the input unchanged when unmapped.
    pub fn resolve<'a>(&'a self, raw: &'a str) -> &'a str {
        self.get(raw).unwrap_or(raw)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.order
            .iter()
            .filter_map(|raw| self.targets.get(raw).map(|to| (raw.as_str(), to.as_str())))
    }
}

/// Jaro similarity in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    jaro::similarity(a.chars(), b.chars())
}

/// Maps each distinct lower-cased raw name to the first canonical name
/// (in `canonical` order) that shares its first character and scores at
/// least `tolerance`. Names with no such candidate stay unmapped.
pub fn match_names<'a>(
    canonical: &[String],
    raw_names: impl IntoIterator<Item = &'a str>,
    tolerance: f64,
) -> NameMapping {
    let mut mapping = NameMapping::default();
    let mut visited: HashSet<String> = HashSet::new();
    let mut compared = 0usize;

    for raw in raw_names {
        let raw = raw.to_lowercase();
        if !visited.insert(raw.clone()) {
            continue;
        }
        for candidate in canonical {
            let Some(block) = candidate.chars().next() else {
                continue;
            };
            if !raw.starts_with(block) {
                continue;
            }
            compared += 1;
            if similarity(candidate, &raw) >= tolerance {
                mapping.insert(raw.as_str(), candidate.as_str());
                break;
            }
        }
    }
    debug!(
        distinct = visited.len(),
        mapped = mapping.len(),
        compared,
        "names matched"
    );
    mapping
}

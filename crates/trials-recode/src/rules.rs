//! Ordered, case-insensitive label rules.

use regex::{Regex, RegexBuilder};

use crate::codes::RaceCode;
use crate::error::{RecodeError, Result};

#[derive(Debug, Clone)]
pub struct RecodeRule {
    pub code: RaceCode,
    pattern: Regex,
}

impl RecodeRule {
    pub fn new(pattern: &str, code: RaceCode) -> Result<Self> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| RecodeError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self { code, pattern })
    }

    pub fn matches(&self, label: &str) -> bool {
        self.pattern.is_match(label)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Rules tried in order; the first match wins.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<RecodeRule>,
}

/// Race/ethnicity rules. Order matters: mixed-race labels mention single
/// races, and "not hispanic" contains "hispanic".
const RACE_RULES: &[(&str, RaceCode)] = &[
    (r"multiple|more than one|multi|mixed", RaceCode::Multiple),
    (
        r"not hispanic|not latin|non[- ]?hispanic|non[- ]?latin",
        RaceCode::NotHispanicOrLatino,
    ),
    (r"white|caucasian", RaceCode::White),
    (r"asian", RaceCode::Asian),
    (r"black|african", RaceCode::Black),
    (r"hawaiian|pacific islander", RaceCode::HawaiianOrPacificIslander),
    (r"latin|hispanic|mexican", RaceCode::HispanicOrLatino),
    (r"american indian|alaska|native", RaceCode::AmericanIndianOrAlaskaNative),
    (
        r"other|unknown|refused|not applicable|none|declined|chose not|no response|missing|prefer not|not report",
        RaceCode::Unknown,
    ),
];

impl RuleSet {
    pub fn new(rules: Vec<RecodeRule>) -> Self {
        Self { rules }
    }

    pub fn race() -> Result<Self> {
        let rules = RACE_RULES
            .iter()
            .map(|(pattern, code)| RecodeRule::new(pattern, *code))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn classify(&self, label: &str) -> Option<RaceCode> {
        self.rules
            .iter()
            .find(|rule| rule.matches(label))
            .map(|rule| rule.code)
    }

    pub fn rules(&self) -> &[RecodeRule] {
        &self.rules
    }
}

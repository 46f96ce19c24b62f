use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical race/ethnicity taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceCode {
    AmericanIndianOrAlaskaNative,
    Asian,
    Black,
    HawaiianOrPacificIslander,
    White,
    Multiple,
    HispanicOrLatino,
    NotHispanicOrLatino,
    Unknown,
}

impl RaceCode {
    /// Column order of the `trial_race` table.
    pub const ALL: [RaceCode; 9] = [
        RaceCode::AmericanIndianOrAlaskaNative,
        RaceCode::Asian,
        RaceCode::Black,
        RaceCode::HawaiianOrPacificIslander,
        RaceCode::White,
        RaceCode::Multiple,
        RaceCode::HispanicOrLatino,
        RaceCode::NotHispanicOrLatino,
        RaceCode::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RaceCode::AmericanIndianOrAlaskaNative => "american_indian_or_alaska_native",
            RaceCode::Asian => "asian",
            RaceCode::Black => "black",
            RaceCode::HawaiianOrPacificIslander => "hawaiian_or_pacific_islander",
            RaceCode::White => "white",
            RaceCode::Multiple => "multiple",
            RaceCode::HispanicOrLatino => "hispanic_or_latino",
            RaceCode::NotHispanicOrLatino => "not_hispanic_or_latino",
            RaceCode::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RaceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

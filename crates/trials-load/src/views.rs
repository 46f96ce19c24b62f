//! Post-load derived views read by the dashboard.

/// Bumped whenever a view's shape changes; stored as `PRAGMA user_version`.
pub const VIEWS_VERSION: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedView {
    pub name: &'static str,
    /// Tables the view selects from; the view is skipped if any is absent.
    pub requires: &'static [&'static str],
    pub select: &'static str,
}

pub const DERIVED_VIEWS: &[DerivedView] = &[
    DerivedView {
        name: "drug_trial_counts",
        requires: &["trial_interventions"],
        select: "SELECT intervention_name, COUNT(DISTINCT nct_id) AS trial_count \
                 FROM trial_interventions \
                 WHERE intervention_name IS NOT NULL \
                 GROUP BY intervention_name",
    },
    DerivedView {
        name: "condition_trial_counts",
        requires: &["trial_conditions"],
        select: "SELECT condition, COUNT(DISTINCT nct_id) AS trial_count \
                 FROM trial_conditions \
                 WHERE condition IS NOT NULL \
                 GROUP BY condition",
    },
    DerivedView {
        name: "sponsor_trial_counts",
        requires: &["trials"],
        select: "SELECT lead_sponsor, COUNT(DISTINCT nct_id) AS trial_count \
                 FROM trials \
                 WHERE lead_sponsor IS NOT NULL \
                 GROUP BY lead_sponsor",
    },
    DerivedView {
        name: "trial_race_totals",
        requires: &["trial_race"],
        select: "SELECT \
                 SUM(CAST(american_indian_or_alaska_native AS INTEGER)) AS american_indian_or_alaska_native, \
                 SUM(CAST(asian AS INTEGER)) AS asian, \
                 SUM(CAST(black AS INTEGER)) AS black, \
                 SUM(CAST(hawaiian_or_pacific_islander AS INTEGER)) AS hawaiian_or_pacific_islander, \
                 SUM(CAST(white AS INTEGER)) AS white, \
                 SUM(CAST(multiple AS INTEGER)) AS multiple, \
                 SUM(CAST(hispanic_or_latino AS INTEGER)) AS hispanic_or_latino, \
                 SUM(CAST(not_hispanic_or_latino AS INTEGER)) AS not_hispanic_or_latino, \
                 SUM(CAST(unknown AS INTEGER)) AS unknown \
                 FROM trial_race",
    },
    DerivedView {
        name: "trial_drug_details",
        requires: &["trial_interventions", "trials", "trial_status"],
        select: "SELECT i.nct_id, i.intervention_name, t.brief_title, t.lead_sponsor, \
                 s.overall_status, s.start_date, s.completion_date \
                 FROM trial_interventions AS i \
                 JOIN trials AS t ON t.nct_id = i.nct_id \
                 LEFT JOIN trial_status AS s ON s.nct_id = i.nct_id",
    },
];

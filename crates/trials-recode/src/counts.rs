//! Per-trial demographic count tables.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info_span};
use trials_extract::{Schema, scalar_text};
use trials_model::{CellValue, Table};

use crate::codes::RaceCode;
use crate::discover::{MeasureFilter, items};
use crate::error::{RecodeError, Result};
use crate::recode::RecodeTable;

/// Value of the last measurement of a category, if any.
fn last_measurement(category: &Value) -> Option<String> {
    items(category, "measurements")
        .last()
        .and_then(|measurement| measurement.get("value"))
        .and_then(scalar_text)
}

/// Value of the last count of the last denominator in `holder`.
fn last_denominator(holder: &Value) -> Option<String> {
    items(holder, "denoms")
        .last()
        .and_then(|denom| items(denom, "counts").last())
        .and_then(|count| count.get("value"))
        .and_then(scalar_text)
}

/// Builds `trial_race`: one row per study, one column per [`RaceCode`].
///
/// Categories sharing a code are summed within one measure. Across measures
/// a later measure's count replaces an earlier one for the same code, so the
/// NIH/OMB race and ethnicity measures never count a participant twice. A
/// category label missing from `table` fails the whole build.
pub fn race_counts(
    schema: &Schema,
    records: &[Value],
    table: &RecodeTable,
    filter: &MeasureFilter,
) -> Result<Table> {
    let span = info_span!("race_counts", records = records.len());
    let _guard = span.enter();

    let id_column = schema.identifier.name().to_string();
    let columns = std::iter::once(id_column)
        .chain(RaceCode::ALL.iter().map(|code| code.as_str().to_string()))
        .collect();
    let mut out = Table::new("trial_race", columns);

    for record in records {
        let trial = schema.identify(record)?;
        let mut totals: BTreeMap<RaceCode, i64> = BTreeMap::new();
        for measure in filter.measures(record) {
            let mut measure_totals: BTreeMap<RaceCode, i64> = BTreeMap::new();
            for class in items(measure, "classes") {
                for category in items(class, "categories") {
                    let Some(label) = category.get("title").and_then(Value::as_str) else {
                        continue;
                    };
                    let code = table.get(label).ok_or_else(|| RecodeError::UnknownLabel {
                        trial: trial.clone(),
                        label: label.to_string(),
                    })?;
                    let Some(value) = last_measurement(category) else {
                        continue;
                    };
                    let count = parse_count(&value).ok_or_else(|| RecodeError::InvalidCount {
                        trial: trial.clone(),
                        label: label.to_string(),
                        value: value.clone(),
                    })?;
                    *measure_totals.entry(code).or_insert(0) += count;
                }
            }
            totals.extend(measure_totals);
        }

        let mut row = Vec::with_capacity(RaceCode::ALL.len() + 1);
        row.push(CellValue::text(trial));
        for code in RaceCode::ALL {
            row.push(
                totals
                    .get(&code)
                    .map_or(CellValue::Missing, |count| CellValue::text(count.to_string())),
            );
        }
        out.push_row(row)?;
    }
    debug!(rows = out.height(), "race counts built");
    Ok(out)
}

/// Builds `trial_sex`: nct_id, female, male, total per study.
pub fn sex_counts(schema: &Schema, records: &[Value], filter: &MeasureFilter) -> Result<Table> {
    let span = info_span!("sex_counts", records = records.len());
    let _guard = span.enter();

    let columns = [schema.identifier.name(), "female", "male", "total"]
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut out = Table::new("trial_sex", columns);

    for record in records {
        let trial = schema.identify(record)?;
        let (mut female, mut male, mut total) = (None, None, None);
        for measure in filter.measures(record) {
            if let Some(value) = last_denominator(measure) {
                total = Some(value);
            }
            for class in items(measure, "classes") {
                if let Some(value) = last_denominator(class) {
                    total = Some(value);
                }
                for category in items(class, "categories") {
                    let slot = match category.get("title").and_then(Value::as_str) {
                        Some("Female") => &mut female,
                        Some("Male") => &mut male,
                        _ => continue,
                    };
                    if let Some(value) = last_measurement(category) {
                        *slot = Some(value);
                    }
                }
            }
        }
        out.push_row(vec![
            CellValue::text(trial),
            CellValue::from_option(female.as_deref()),
            CellValue::from_option(male.as_deref()),
            CellValue::from_option(total.as_deref()),
        ])?;
    }
    debug!(rows = out.height(), "sex counts built");
    Ok(out)
}

fn parse_count(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    trimmed.parse::<i64>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|float| float.fract() == 0.0 && float.is_finite())
            .map(|float| float as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accept_whole_numbers_only() {
        assert_eq!(parse_count("12"), Some(12));
        assert_eq!(parse_count(" 7.0 "), Some(7));
        assert_eq!(parse_count("7.5"), None);
        assert_eq!(parse_count("NA"), None);
    }
}

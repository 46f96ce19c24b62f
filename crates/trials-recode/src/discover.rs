//! Category label discovery across baseline measures.

use serde_json::Value;
use trials_extract::{BASELINE_MEASURES_PATH, FieldPath, lookup};
use trials_model::RawPage;

/// Parameter type of participant-count measures.
pub const COUNT_OF_PARTICIPANTS: &str = "COUNT_OF_PARTICIPANTS";

/// Selects the baseline measures one demographic axis is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureFilter {
    pub titles: Vec<String>,
    pub param_type: String,
}

impl MeasureFilter {
    pub fn race() -> Self {
        Self {
            titles: vec![
                "Race/Ethnicity, Customized".to_string(),
                "Race (NIH/OMB)".to_string(),
                "Ethnicity (NIH/OMB)".to_string(),
            ],
            param_type: COUNT_OF_PARTICIPANTS.to_string(),
        }
    }

    pub fn sex() -> Self {
        Self {
            titles: vec!["Sex: Female, Male".to_string()],
            param_type: COUNT_OF_PARTICIPANTS.to_string(),
        }
    }

    pub fn accepts(&self, measure: &Value) -> bool {
        let title = measure.get("title").and_then(Value::as_str);
        let param_type = measure.get("paramType").and_then(Value::as_str);
        title.is_some_and(|title| self.titles.iter().any(|t| t == title))
            && param_type == Some(self.param_type.as_str())
    }

    /// Accepted measures of one study record, in source order.
    pub fn measures<'a>(&self, record: &'a Value) -> impl Iterator<Item = &'a Value> + 'a {
        let filter = self.clone();
        lookup(record, &FieldPath::parse(BASELINE_MEASURES_PATH))
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter(move |measure| filter.accepts(measure))
    }
}

/// Elements of `value[key]` if it is an array.
pub(crate) fn items<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Distinct category titles of accepted measures, in first-seen order.
pub fn discover<'a>(records: impl IntoIterator<Item = &'a Value>, filter: &MeasureFilter) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for record in records {
        for measure in filter.measures(record) {
            for class in items(measure, "classes") {
                for category in items(class, "categories") {
                    let Some(title) = category.get("title").and_then(Value::as_str) else {
                        continue;
                    };
                    if !labels.iter().any(|seen| seen == title) {
                        labels.push(title.to_string());
                    }
                }
            }
        }
    }
    labels
}

/// [`discover`] over every record of every page.
pub fn discover_pages(pages: &[RawPage], filter: &MeasureFilter) -> Vec<String> {
    discover(pages.iter().flat_map(|page| page.records.iter()), filter)
}

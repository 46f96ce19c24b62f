//! Tolerant projection of raw records into [`FieldRecord`]s.

use serde_json::Value;
use tracing::debug;
use trials_model::{FieldRecord, FieldValue, RecordId};

use crate::error::{ExtractError, Result};
use crate::schema::{FieldKind, FieldPath, IdentifierRule, PathSegment, Schema};

/// Follows `path` through `value`; `None` as soon as a step is missing.
pub fn lookup<'a>(value: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.segments() {
        current = match segment {
            PathSegment::Key(key) => current.as_object()?.get(key)?,
            PathSegment::Index(index) => current.as_array()?.get(*index)?,
        };
    }
    Some(current)
}

/// Renders a scalar JSON value as text. Null yields `None`.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        other => Some(other.to_string()),
    }
}

fn scalar_field(value: Option<&Value>) -> FieldValue {
    value
        .and_then(scalar_text)
        .map_or(FieldValue::Null, FieldValue::Text)
}

fn list_field(value: Option<&Value>) -> FieldValue {
    match value {
        None | Some(Value::Null) => FieldValue::List(Vec::new()),
        Some(Value::Array(items)) => FieldValue::List(items.clone()),
        Some(single) => FieldValue::List(vec![single.clone()]),
    }
}

impl Schema {
    /// Resolves the record identifier.
    pub fn identify(&self, raw: &Value) -> Result<String> {
        match &self.identifier {
            IdentifierRule::Path { path, .. } => lookup(raw, path)
                .and_then(scalar_text)
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| ExtractError::MissingIdentifier {
                    schema: self.dataset.to_string(),
                    path: path.to_string(),
                }),
            IdentifierRule::Digest { .. } => {
                let bytes = serde_json::to_vec(raw).map_err(ExtractError::Digest)?;
                Ok(RecordId::digest(&bytes).to_hex())
            }
        }
    }

    /// Projects one raw record. Only a missing identifier is an error.
    pub fn extract(&self, raw: &Value) -> Result<FieldRecord> {
        let mut record = FieldRecord::new(self.identify(raw)?);
        for field in &self.fields {
            let found = lookup(raw, &field.path);
            let value = match field.kind {
                FieldKind::Scalar => scalar_field(found),
                FieldKind::List => list_field(found),
            };
            record.insert(field.name.clone(), value);
        }
        Ok(record)
    }

    /// Projects every record, failing on the first malformed one.
    pub fn extract_all(&self, raws: &[Value]) -> Result<Vec<FieldRecord>> {
        let records = raws
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                self.extract(raw).map_err(|source| ExtractError::AtRecord {
                    index,
                    source: Box::new(source),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(dataset = %self.dataset, records = records.len(), "records extracted");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn lookup_stops_at_missing_steps() {
        let value = json!({ "a": { "b": [ { "c": 1 } ] } });
        assert_eq!(lookup(&value, &FieldPath::parse("a.b[0].c")), Some(&json!(1)));
        assert_eq!(lookup(&value, &FieldPath::parse("a.b[1].c")), None);
        assert_eq!(lookup(&value, &FieldPath::parse("a.x.c")), None);
        assert_eq!(lookup(&value, &FieldPath::parse("a.b.c")), None);
        assert_eq!(lookup(&value, &FieldPath::root()), Some(&value));
    }

    #[test]
    fn scalars_render_as_text() {
        assert_eq!(scalar_text(&json!(12)), Some("12".to_string()));
        assert_eq!(scalar_text(&json!(true)), Some("true".to_string()));
        assert_eq!(scalar_text(&json!(null)), None);
    }
}

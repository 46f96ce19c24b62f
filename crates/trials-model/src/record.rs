//! Flattened projections of raw API records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value of one semantic field in a [`FieldRecord`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum FieldValue {
    /// The source path was absent or held JSON `null`.
    #[default]
    Null,
    /// A scalar rendered as text (numbers and booleans included).
    Text(String),
    /// A nested list field. Absent and empty lists are both `List(vec![])`.
    List(Vec<Value>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> &[Value] {
        match self {
            Self::List(values) => values,
            _ => &[],
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

static NULL_FIELD: FieldValue = FieldValue::Null;

/// Flat view of one raw record: semantic field name -> value.
///
/// The identifier is always present; every other field may be null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    /// Deterministic identifier of the source record.
    pub identifier: String,
    /// Field values keyed by semantic name.
    pub values: BTreeMap<String, FieldValue>,
}

impl FieldRecord {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.values.insert(name.into(), value);
    }

    /// Returns the field value, or `Null` for undeclared names.
    pub fn get(&self, name: &str) -> &FieldValue {
        self.values.get(name).unwrap_or(&NULL_FIELD)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).as_text()
    }

    pub fn list(&self, name: &str) -> &[Value] {
        self.get(name).as_list()
    }
}

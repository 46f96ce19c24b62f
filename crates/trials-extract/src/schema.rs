//! Declared schema-path tables for the upstream datasets.
//!
//! Each semantic field maps to a path of object keys and list indices. The
//! identifier rule is the only non-defaulted lookup.

use std::fmt;

use trials_model::DatasetId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A path into a nested JSON value, e.g. `submissions[0].submission_status`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The empty path, which resolves to the value itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses dotted notation with optional `[n]` index suffixes.
    ///
    /// Anything that does not look like a well-formed index is kept as a
    /// literal key.
    pub fn parse(text: &str) -> Self {
        let mut segments = Vec::new();
        for part in text.split('.').filter(|part| !part.is_empty()) {
            let mut rest = part;
            let mut indices = Vec::new();
            while let Some(stripped) = rest.strip_suffix(']') {
                let Some(open) = stripped.rfind('[') else {
                    break;
                };
                let Ok(index) = stripped[open + 1..].parse::<usize>() else {
                    break;
                };
                indices.push(index);
                rest = &stripped[..open];
            }
            if !rest.is_empty() {
                segments.push(PathSegment::Key(rest.to_string()));
            }
            segments.extend(indices.into_iter().rev().map(PathSegment::Index));
        }
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for FieldPath {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.0 {
            match segment {
                PathSegment::Key(key) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Rendered as text; absent or JSON null becomes `Null`.
    Scalar,
    /// Absent, null and empty all become an empty list.
    List,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub path: FieldPath,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn scalar(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: FieldPath::parse(path),
            kind: FieldKind::Scalar,
        }
    }

    pub fn list(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: FieldPath::parse(path),
            kind: FieldKind::List,
        }
    }
}

/// How a record's identifier is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierRule {
    /// Mandatory path; absence fails extraction.
    Path { name: String, path: FieldPath },
    /// Content digest of the whole record.
    Digest { name: String },
}

impl IdentifierRule {
    pub fn name(&self) -> &str {
        match self {
            Self::Path { name, .. } | Self::Digest { name } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub dataset: DatasetId,
    pub identifier: IdentifierRule,
    pub fields: Vec<FieldSpec>,
}

/// Trial baseline measures; demographic extraction reads them from the raw record.
pub const BASELINE_MEASURES_PATH: &str = "resultsSection.baselineCharacteristicsModule.measures";

impl Schema {
    /// ClinicalTrials.gov v2 study records.
    pub fn clinical_trials() -> Self {
        Self {
            dataset: DatasetId::trials(),
            identifier: IdentifierRule::Path {
                name: "nct_id".to_string(),
                path: FieldPath::parse("protocolSection.identificationModule.nctId"),
            },
            fields: vec![
                FieldSpec::scalar("brief_title", "protocolSection.identificationModule.briefTitle"),
                FieldSpec::scalar(
                    "official_title",
                    "protocolSection.identificationModule.officialTitle",
                ),
                FieldSpec::scalar(
                    "lead_sponsor",
                    "protocolSection.sponsorCollaboratorsModule.leadSponsor.name",
                ),
                FieldSpec::scalar("overall_status", "protocolSection.statusModule.overallStatus"),
                FieldSpec::scalar(
                    "start_date",
                    "protocolSection.statusModule.startDateStruct.date",
                ),
                FieldSpec::scalar(
                    "completion_date",
                    "protocolSection.statusModule.primaryCompletionDateStruct.date",
                ),
                FieldSpec::scalar("why_stopped", "protocolSection.statusModule.whyStopped"),
                FieldSpec::list(
                    "locations",
                    "protocolSection.contactsLocationsModule.locations",
                ),
                FieldSpec::list(
                    "interventions",
                    "protocolSection.armsInterventionsModule.interventions",
                ),
                FieldSpec::list("conditions", "protocolSection.conditionsModule.conditions"),
                FieldSpec::list("keywords", "protocolSection.conditionsModule.keywords"),
            ],
        }
    }

    /// openFDA drugs@FDA application records.
    pub fn openfda_drugs() -> Self {
        Self {
            dataset: DatasetId::fda(),
            identifier: IdentifierRule::Digest {
                name: "record_id".to_string(),
            },
            fields: vec![
                FieldSpec::scalar(
                    "submission_status_date",
                    "submissions[0].submission_status_date",
                ),
                FieldSpec::scalar("submission_status", "submissions[0].submission_status"),
                FieldSpec::scalar("application_number", "application_number"),
                FieldSpec::scalar("brand_name", "products[0].brand_name"),
                FieldSpec::scalar("sponsor_name", "sponsor_name"),
                FieldSpec::scalar("generic_name", "openfda.generic_name[0]"),
                FieldSpec::scalar("substance_name", "openfda.substance_name[0]"),
                FieldSpec::scalar("manufacturer_name", "openfda.manufacturer_name[0]"),
            ],
        }
    }

    /// Built-in schema for a dataset, if one exists.
    pub fn for_dataset(dataset: &DatasetId) -> Option<Self> {
        match dataset.as_str() {
            "trials" => Some(Self::clinical_trials()),
            "fda" => Some(Self::openfda_drugs()),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }
}

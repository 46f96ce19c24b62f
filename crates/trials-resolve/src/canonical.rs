//! Canonical drug names from one source's name column.

use std::collections::HashMap;

use rapidfuzz::distance::jaro_winkler;
use tracing::debug;
use trials_model::{CellValue, Table};

use crate::error::{ResolveError, Result};

/// Assigns each name a cluster index.
///
/// Cluster indices are dense and numbered in order of first appearance.
pub trait NameClusterer {
    fn cluster(&self, names: &[String]) -> Vec<usize>;
}

/// Greedy leader clustering on Jaro-Winkler similarity.
///
/// A name joins the first existing leader sharing its first character whose
/// similarity reaches `threshold`; otherwise it leads a new cluster.
#[derive(Debug, Clone, Copy)]
pub struct LeaderClusterer {
    pub threshold: f64,
}

pub const DEFAULT_CLUSTER_THRESHOLD: f64 = 0.92;

impl Default for LeaderClusterer {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CLUSTER_THRESHOLD,
        }
    }
}

impl NameClusterer for LeaderClusterer {
    fn cluster(&self, names: &[String]) -> Vec<usize> {
        let mut leaders: Vec<&str> = Vec::new();
        let mut assignments = Vec::with_capacity(names.len());
        for name in names {
            let first = name.chars().next();
            let found = leaders.iter().position(|leader| {
                leader.chars().next() == first
                    && jaro_winkler::similarity(leader.chars(), name.chars()) >= self.threshold
            });
            let cluster = found.unwrap_or_else(|| {
                leaders.push(name);
                leaders.len() - 1
            });
            assignments.push(cluster);
        }
        assignments
    }
}

/// One deduplicated drug identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalDrug {
    /// Lower-cased representative, the cluster's first-seen name.
    pub name: String,
    /// Source row indices collapsed into this entity.
    pub members: Vec<usize>,
}

/// Lower-cases `column`, clusters distinct names and keeps one
/// representative per cluster, in order of first appearance.
pub fn build_canonical(
    table: &Table,
    column: &str,
    clusterer: &dyn NameClusterer,
) -> Result<Vec<CanonicalDrug>> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| ResolveError::MissingColumn {
            table: table.name.clone(),
            column: column.to_string(),
        })?;

    let mut distinct: Vec<String> = Vec::new();
    let mut rows_by_name: Vec<Vec<usize>> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();
    for (row_idx, row) in table.rows.iter().enumerate() {
        let Some(name) = row.get(idx).and_then(CellValue::as_text) else {
            continue;
        };
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            continue;
        }
        match position.get(&name) {
            Some(&pos) => rows_by_name[pos].push(row_idx),
            None => {
                position.insert(name.clone(), distinct.len());
                distinct.push(name);
                rows_by_name.push(vec![row_idx]);
            }
        }
    }

    let assignments = clusterer.cluster(&distinct);
    let mut canonical: Vec<CanonicalDrug> = Vec::new();
    let mut slot_of_cluster: Vec<Option<usize>> = Vec::new();
    for ((name, rows), cluster) in distinct.into_iter().zip(rows_by_name).zip(assignments) {
        if slot_of_cluster.len() <= cluster {
            slot_of_cluster.resize(cluster + 1, None);
        }
        match slot_of_cluster[cluster] {
            Some(slot) => canonical[slot].members.extend(rows),
            None => {
                slot_of_cluster[cluster] = Some(canonical.len());
                canonical.push(CanonicalDrug {
                    name,
                    members: rows,
                });
            }
        }
    }
    for drug in &mut canonical {
        drug.members.sort_unstable();
    }
    debug!(source_rows = table.height(), canonical = canonical.len(), "canonical drugs built");
    Ok(canonical)
}

/// `canonical_drugs` table with a single `brand_name` column.
pub fn canonical_table(drugs: &[CanonicalDrug]) -> Result<Table> {
    let mut table = Table::new("canonical_drugs", vec!["brand_name".to_string()]);
    for drug in drugs {
        table.push_row(vec![CellValue::text(drug.name.as_str())])?;
    }
    Ok(table)
}

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::evaluate::{
    average_pairwise_name_similarity, duplicate_coverage, key_consistency_error,
};
use crate::matching::{find_duplicate_groups, DuplicateGroup, MatchConfig};
use crate::normalize::normalize_table;
use crate::schema::RawTable;
use crate::TARGET_MATCH;

/// Everything one run produces: the ordered duplicate groups plus the
/// internal quality metrics.
#[derive(Debug, Serialize, Deserialize)]
pub struct DedupReport {
    pub total_records: usize,
    pub groups: Vec<DuplicateGroup>,
    pub metrics: Metrics,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Metrics {
    /// Mean pairwise name similarity inside multi-member groups (0-100).
    pub avg_name_similarity: f64,
    /// Share of records appearing in any emitted group, as a percentage.
    pub coverage_pct: f64,
    /// Mean fraction of members disagreeing with their group's key mode.
    pub key_consistency_error: f64,
}

/// Run the full pipeline over one table: resolve the schema (fatal on a
/// missing column, before any normalization), normalize, cluster, evaluate.
pub fn run(table: &RawTable, config: &MatchConfig) -> Result<DedupReport> {
    let records = table.records()?;
    let total_records = records.len();

    info!(
        target: TARGET_MATCH,
        "Starting deduplication over {} records (threshold {}, mode {:?})",
        total_records,
        config.threshold,
        config.mode
    );

    let normalized = normalize_table(records);
    let groups = find_duplicate_groups(&normalized, config);

    let metrics = Metrics {
        avg_name_similarity: average_pairwise_name_similarity(&groups),
        coverage_pct: duplicate_coverage(&groups, total_records),
        key_consistency_error: key_consistency_error(&groups),
    };

    Ok(DedupReport {
        total_records,
        groups,
        metrics,
    })
}

use serde::{Deserialize, Serialize};

use crate::normalize::NormalizedRecord;

use super::DEFAULT_THRESHOLD;

/// How phone-block candidates are stitched into groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    /// Candidates are scored only against the seed record that opened the
    /// group (star-shaped, order-dependent near the threshold). The default
    /// and documented contract.
    Seeded,
    /// Union-find over all matching pairs: true transitive closure, merging
    /// chains of near-duplicates the seeded pass keeps apart.
    Transitive,
}

/// Run configuration, immutable for a single pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Minimum acceptable name-similarity score (0-100) for phone matches.
    pub threshold: u8,
    pub mode: MatchMode,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            mode: MatchMode::Seeded,
        }
    }
}

impl MatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold.min(100);
        self
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }
}

/// A set of records believed to represent one real-world company. Created by
/// the clustering pass and never mutated afterwards; a group may hold a
/// single record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub ids: Vec<usize>,
    pub members: Vec<NormalizedRecord>,
}

impl DuplicateGroup {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

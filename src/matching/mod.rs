// Module declarations
pub mod blocking;
pub mod cluster;
pub mod similarity;
pub mod types;

pub use blocking::BlockIndex;
pub use cluster::find_duplicate_groups;
pub use similarity::token_sort_similarity;
pub use types::{DuplicateGroup, MatchConfig, MatchMode};

/// Minimum name-similarity score for phone-based matches, unless overridden.
pub const DEFAULT_THRESHOLD: u8 = 80;

pub mod evaluate;
pub mod logging;
pub mod matching;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod source;

pub const TARGET_NORMALIZE: &str = "normalize";
pub const TARGET_MATCH: &str = "matching";
pub const TARGET_EVAL: &str = "evaluate";

pub use matching::{DuplicateGroup, MatchConfig, MatchMode, DEFAULT_THRESHOLD};
pub use normalize::NormalizedRecord;
pub use pipeline::{run, DedupReport};
pub use schema::{RawRecord, RawTable, SchemaError, REQUIRED_COLUMNS};

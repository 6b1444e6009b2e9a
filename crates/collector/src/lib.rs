mod discover;
mod measure;
mod pipeline;
mod types;

pub use discover::{derived_entities, discover_base, discover_derived};
pub use measure::measure_entity;
pub use pipeline::collect_usage;
pub use types::{CollectError, IssueStage, Phase, PhaseStats, Result, RunIssue, RunReport};

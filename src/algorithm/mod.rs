//! Analysis stages
//!
//! Each stage is a set of pure functions over the canonical tables: burden
//! ranking, merging of the country tables, and the statistical summary.

pub mod burden;
pub mod merge;
pub mod statistics;

pub use burden::{BurdenAggregator, high_burden, high_burden_by_group, rank_burden};
pub use merge::{JoinStats, MergeOutcome, attach_mortality, latest_per_entity, merge_datasets};
pub use statistics::{StatisticalSummary, summarize};

//! HIV burden and multidimensional poverty analysis.
//!
//! Loads a malformed HIV observations file, a poverty indicator sheet and an
//! optional child mortality file; ranks countries by HIV burden; joins the
//! country tables; and summarizes the merged table with correlations and a
//! random-intercept regression that falls back to OLS.

pub mod algorithm;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod utils;

// Re-export the most common types for easier use
pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
pub use pipeline::{Pipeline, PipelineInputs};
pub use report::AnalysisReport;

pub use algorithm::burden::{BurdenAggregator, high_burden, high_burden_by_group, rank_burden};
pub use algorithm::merge::{attach_mortality, latest_per_entity, merge_datasets, two_pass_join};
pub use algorithm::statistics::{FitStatus, ModelKind, RegressionSummary, summarize};
pub use models::{BurdenEntry, MergedRecord, Observation, PovertyRecord};
pub use source::{DatasetSource, HivSource, LoadedTable, MortalitySource, PovertySource};

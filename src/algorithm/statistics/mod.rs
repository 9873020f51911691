//! Statistical summary of the merged table
//!
//! Descriptive statistics, pairwise-complete correlations of the HIV count
//! with each covariate, and the regression of the log count on the
//! standardized covariates.

pub mod correlation;
pub mod descriptive;
pub mod linalg;
pub mod regression;

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::models::MergedRecord;

pub use correlation::{Correlation, correlate, pearson};
pub use descriptive::{ColumnSummary, OUTCOME_COLUMN, describe};
pub use regression::{
    Coefficient, Design, FallbackReason, FitStatus, ModelKind, RegressionSummary, fit_merged,
    fit_regression,
};

/// Everything the statistical stage produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalSummary {
    pub descriptives: Vec<ColumnSummary>,
    pub correlations: Vec<Correlation>,
    pub regression: RegressionSummary,
}

/// Summarize the merged table with the configured covariates
#[must_use]
pub fn summarize(records: &[MergedRecord], config: &AnalysisConfig) -> StatisticalSummary {
    StatisticalSummary {
        descriptives: describe(records, &config.correlation_covariates),
        correlations: correlate(records, &config.correlation_covariates),
        regression: fit_merged(records, &config.regression),
    }
}

//! Descriptive summaries of the merged table's numeric columns

use serde::{Deserialize, Serialize};

use crate::models::{Covariate, MergedRecord};

/// Column name of the HIV outcome in summaries
pub const OUTCOME_COLUMN: &str = "hiv_count";

/// Summary of one numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    /// Present values
    pub count: usize,
    /// Absent values
    pub missing: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1)
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub median: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnSummary {
    /// Summarize a column of optional values
    #[must_use]
    pub fn from_values(name: &str, values: &[Option<f64>]) -> Self {
        let mut present: Vec<f64> = values
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .collect();
        let count = present.len();
        let missing = values.len() - count;

        if present.is_empty() {
            return Self {
                name: name.to_string(),
                count,
                missing,
                mean: None,
                std_dev: None,
                min: None,
                median: None,
                max: None,
            };
        }

        present.sort_by(f64::total_cmp);
        let mean = present.iter().sum::<f64>() / count as f64;
        let std_dev = (count > 1).then(|| {
            let ss: f64 = present.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        });
        let median = if count % 2 == 1 {
            present[count / 2]
        } else {
            (present[count / 2 - 1] + present[count / 2]) / 2.0
        };

        Self {
            name: name.to_string(),
            count,
            missing,
            mean: Some(mean),
            std_dev,
            min: present.first().copied(),
            median: Some(median),
            max: present.last().copied(),
        }
    }
}

/// Summaries of the outcome and every covariate, outcome first
#[must_use]
pub fn describe(records: &[MergedRecord], covariates: &[Covariate]) -> Vec<ColumnSummary> {
    let outcome: Vec<Option<f64>> = records.iter().map(|r| r.hiv_count).collect();

    std::iter::once(ColumnSummary::from_values(OUTCOME_COLUMN, &outcome))
        .chain(covariates.iter().map(|&covariate| {
            let values: Vec<Option<f64>> =
                records.iter().map(|r| r.covariate(covariate)).collect();
            ColumnSummary::from_values(covariate.name(), &values)
        }))
        .collect()
}

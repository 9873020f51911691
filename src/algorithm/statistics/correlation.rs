//! Pairwise-complete Pearson correlation

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::algorithm::statistics::descriptive::OUTCOME_COLUMN;
use crate::models::{Covariate, MergedRecord};

/// Correlation of the outcome with one covariate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    /// Outcome column
    pub outcome: String,
    pub covariate: Covariate,
    /// Pearson's r, absent when it is undefined
    pub coefficient: Option<f64>,
    /// Rows where both values are present
    pub n: usize,
    /// Two-sided p-value of r = 0
    pub p_value: Option<f64>,
}

/// Pearson's r over the pairs where both values are present.
///
/// Returns the coefficient (`None` with fewer than three complete pairs or a
/// constant column) and the number of complete pairs.
#[must_use]
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> (Option<f64>, usize) {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((*x, *y)),
            _ => None,
        })
        .collect();
    let n = pairs.len();
    if n < 3 {
        return (None, n);
    }

    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return (None, n);
    }

    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    (Some(r), n)
}

/// Two-sided p-value for a correlation over `n` pairs
#[must_use]
pub fn correlation_p_value(r: f64, n: usize) -> Option<f64> {
    if n < 3 {
        return None;
    }
    if (1.0 - r.abs()) <= f64::EPSILON {
        return Some(0.0);
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}

/// Correlate the HIV count with each covariate
#[must_use]
pub fn correlate(records: &[MergedRecord], covariates: &[Covariate]) -> Vec<Correlation> {
    let outcome: Vec<Option<f64>> = records.iter().map(|r| r.hiv_count).collect();

    covariates
        .iter()
        .map(|&covariate| {
            let values: Vec<Option<f64>> = records.iter().map(|r| r.covariate(covariate)).collect();
            let (coefficient, n) = pearson(&outcome, &values);
            Correlation {
                outcome: OUTCOME_COLUMN.to_string(),
                covariate,
                coefficient,
                n,
                p_value: coefficient.and_then(|r| correlation_p_value(r, n)),
            }
        })
        .collect()
}

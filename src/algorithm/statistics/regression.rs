//! Regression of the log HIV count on standardized poverty covariates
//!
//! The preferred model has a random intercept per region, fitted by maximum
//! likelihood with EM. When that fit is impossible or does not converge, an
//! ordinary least squares model on the same design is fitted instead and the
//! summary is tagged with the reason. Fitting never returns an error: if not
//! even OLS can be fitted the summary says so.

use std::fmt;

use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use crate::algorithm::statistics::linalg::{Matrix, add_outer, dot, invert, mat_vec, zeros};
use crate::config::RegressionConfig;
use crate::models::{Covariate, MergedRecord};

/// Name of the modelled outcome, `ln(hiv_count + 1)`
pub const LOG_OUTCOME_COLUMN: &str = "log_hiv_count";

/// Name of the intercept coefficient
pub const INTERCEPT: &str = "intercept";

/// Standard deviation below which a covariate counts as constant
const MIN_SCALE: f64 = 1e-12;

/// One row of the design matrix, intercept first
pub type DesignRow = SmallVec<[f64; 8]>;

/// Why the random-intercept model was not used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// A random intercept needs at least two groups
    TooFewGroups { groups: usize },
    /// EM hit the iteration limit
    NotConverged { iterations: usize },
    /// A matrix that has to be inverted is singular
    SingularMatrix,
    /// An estimate became NaN or infinite
    NonFiniteEstimate,
    /// The residual variance collapsed to zero
    DegenerateVariance,
    /// Not more rows than parameters
    InsufficientRows { rows: usize, parameters: usize },
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewGroups { groups } => write!(f, "only {groups} group(s)"),
            Self::NotConverged { iterations } => {
                write!(f, "no convergence after {iterations} iterations")
            }
            Self::SingularMatrix => f.write_str("singular design"),
            Self::NonFiniteEstimate => f.write_str("non-finite estimate"),
            Self::DegenerateVariance => f.write_str("zero residual variance"),
            Self::InsufficientRows { rows, parameters } => {
                write!(f, "{rows} rows for {parameters} parameters")
            }
        }
    }
}

/// Outcome of the preferred fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FitStatus {
    /// The random-intercept model converged
    Converged { iterations: usize },
    /// A simpler model was used instead
    Fallback { reason: FallbackReason },
}

/// The model the coefficients come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelKind {
    RandomIntercept,
    OrdinaryLeastSquares,
    /// Neither model could be fitted
    NotFitted { reason: FallbackReason },
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RandomIntercept => f.write_str("random intercept (by region)"),
            Self::OrdinaryLeastSquares => f.write_str("ordinary least squares"),
            Self::NotFitted { reason } => write!(f, "not fitted ({reason})"),
        }
    }
}

/// One fixed-effect estimate. Covariate effects are per standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: Option<f64>,
    /// t statistic (OLS) or z statistic (random intercept)
    pub statistic: Option<f64>,
    pub p_value: Option<f64>,
}

/// Everything reported about the regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionSummary {
    pub model: ModelKind,
    pub status: FitStatus,
    pub outcome: String,
    /// Complete rows used in the fit
    pub observations: usize,
    /// Distinct regions among those rows
    pub groups: usize,
    /// Covariates in the design, in order
    pub covariates: Vec<String>,
    /// Requested covariates left out (no data or constant)
    pub dropped_covariates: Vec<String>,
    pub coefficients: Vec<Coefficient>,
    pub residual_variance: Option<f64>,
    /// Variance of the region intercepts
    pub group_variance: Option<f64>,
    pub log_likelihood: Option<f64>,
    pub r_squared: Option<f64>,
}

impl RegressionSummary {
    /// Whether the preferred model was replaced
    #[must_use]
    pub fn fell_back(&self) -> bool {
        matches!(self.status, FitStatus::Fallback { .. })
    }

    /// Look up a coefficient by name
    #[must_use]
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }
}

/// Standardized design matrix with group membership
#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    pub y: Vec<f64>,
    pub x: Vec<DesignRow>,
    /// Group index of every row
    pub groups: Vec<usize>,
    /// Group names, indexed by group index
    pub group_labels: Vec<String>,
    /// Covariate column names, intercept excluded
    pub columns: Vec<String>,
    pub dropped: Vec<String>,
}

impl Design {
    /// Build a design from raw covariate columns.
    ///
    /// Each column is standardized to zero mean and unit (population)
    /// variance over these rows; constant columns are dropped.
    #[must_use]
    pub fn from_columns(
        y: Vec<f64>,
        groups: &[String],
        columns: Vec<(String, Vec<f64>)>,
    ) -> Self {
        let n = y.len();
        let mut names = Vec::new();
        let mut standardized: Vec<Vec<f64>> = Vec::new();
        let mut dropped = Vec::new();

        for (name, values) in columns {
            let mean = values.iter().sum::<f64>() / n as f64;
            let scale =
                (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64).sqrt();
            if !(scale.is_finite() && scale > MIN_SCALE) {
                dropped.push(name);
                continue;
            }
            standardized.push(values.iter().map(|v| (v - mean) / scale).collect());
            names.push(name);
        }

        let x = (0..n)
            .map(|i| {
                let mut row: DesignRow = smallvec![1.0];
                row.extend(standardized.iter().map(|column| column[i]));
                row
            })
            .collect();

        let mut index: FxHashMap<&str, usize> = FxHashMap::default();
        let mut group_labels = Vec::new();
        let groups = groups
            .iter()
            .map(|label| {
                *index.entry(label.as_str()).or_insert_with(|| {
                    group_labels.push(label.clone());
                    group_labels.len() - 1
                })
            })
            .collect();

        Self {
            y,
            x,
            groups,
            group_labels,
            columns: names,
            dropped,
        }
    }

    /// Build the design for `ln(hiv_count + 1)` from merged records.
    ///
    /// Covariates with no value in any row are dropped first; the fit then
    /// uses the rows where the outcome and every remaining covariate are
    /// present.
    #[must_use]
    pub fn from_records(records: &[MergedRecord], covariates: &[Covariate]) -> Self {
        let with_outcome: Vec<&MergedRecord> = records
            .iter()
            .filter(|r| r.hiv_count.is_some_and(|v| v.is_finite() && v >= 0.0))
            .collect();

        let (usable, absent): (Vec<Covariate>, Vec<Covariate>) = covariates
            .iter()
            .copied()
            .partition(|&c| with_outcome.iter().any(|r| r.covariate(c).is_some()));

        let mut y = Vec::new();
        let mut groups = Vec::new();
        let mut columns: Vec<(String, Vec<f64>)> = usable
            .iter()
            .map(|c| (c.name().to_string(), Vec::new()))
            .collect();

        for record in with_outcome {
            let values: Option<Vec<f64>> = usable.iter().map(|&c| record.covariate(c)).collect();
            let (Some(values), Some(outcome)) = (values, record.hiv_count) else {
                continue;
            };
            y.push(outcome.ln_1p());
            groups.push(record.group_id.clone());
            for ((_, column), value) in columns.iter_mut().zip(values) {
                column.push(value);
            }
        }

        let mut design = Self::from_columns(y, &groups, columns);
        design
            .dropped
            .extend(absent.iter().map(|c| c.name().to_string()));
        design
    }

    /// Number of fixed-effect parameters, intercept included
    #[must_use]
    pub fn n_params(&self) -> usize {
        self.columns.len() + 1
    }

    fn coefficient_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(INTERCEPT).chain(self.columns.iter().map(String::as_str))
    }

    fn members(&self) -> Vec<Vec<usize>> {
        let mut members = vec![Vec::new(); self.group_labels.len()];
        for (row, &group) in self.groups.iter().enumerate() {
            members[group].push(row);
        }
        members
    }
}

#[derive(Debug)]
struct OlsFit {
    beta: Vec<f64>,
    xtx_inv: Matrix,
    rss: f64,
    sigma2: f64,
    df: usize,
    r_squared: Option<f64>,
}

#[derive(Debug)]
struct MixedFit {
    beta: Vec<f64>,
    covariance: Matrix,
    sigma2: f64,
    tau2: f64,
    log_likelihood: f64,
    iterations: usize,
}

fn fit_ols(design: &Design) -> Result<OlsFit, FallbackReason> {
    let n = design.y.len();
    let p = design.n_params();
    if n <= p {
        return Err(FallbackReason::InsufficientRows {
            rows: n,
            parameters: p,
        });
    }

    let mut xtx = zeros(p);
    let mut xty = vec![0.0; p];
    for (row, y) in design.x.iter().zip(&design.y) {
        add_outer(&mut xtx, row, 1.0);
        for (acc, x) in xty.iter_mut().zip(row.iter()) {
            *acc += x * y;
        }
    }

    let xtx_inv = invert(&xtx).ok_or(FallbackReason::SingularMatrix)?;
    let beta = mat_vec(&xtx_inv, &xty);

    let rss: f64 = design
        .x
        .iter()
        .zip(&design.y)
        .map(|(row, y)| (y - dot(row, &beta)).powi(2))
        .sum();
    let df = n - p;
    let sigma2 = rss / df as f64;
    if !(beta.iter().all(|b| b.is_finite()) && sigma2.is_finite()) {
        return Err(FallbackReason::NonFiniteEstimate);
    }

    let mean_y = design.y.iter().sum::<f64>() / n as f64;
    let tss: f64 = design.y.iter().map(|y| (y - mean_y).powi(2)).sum();

    Ok(OlsFit {
        beta,
        xtx_inv,
        rss,
        sigma2,
        df,
        r_squared: (tss > 0.0).then(|| 1.0 - rss / tss),
    })
}

/// Marginal log-likelihood of the random-intercept model
fn log_likelihood(
    design: &Design,
    members: &[Vec<usize>],
    beta: &[f64],
    sigma2: f64,
    tau2: f64,
) -> f64 {
    let ln_2pi = (2.0 * std::f64::consts::PI).ln();
    members
        .iter()
        .map(|rows| {
            let n_g = rows.len() as f64;
            let (sum, sum_sq) = rows.iter().fold((0.0, 0.0), |(s, ss), &i| {
                let r = design.y[i] - dot(&design.x[i], beta);
                (s + r, ss + r * r)
            });
            let denom = sigma2 + n_g * tau2;
            let shrink = tau2 / denom;
            -0.5 * (n_g * ln_2pi
                + (n_g - 1.0) * sigma2.ln()
                + denom.ln()
                + (sum_sq - shrink * sum * sum) / sigma2)
        })
        .sum()
}

/// Generalized least squares for the fixed effects at given variances.
///
/// Returns the estimates together with their covariance, the inverse of the
/// fixed-effect information matrix.
fn generalized_least_squares(
    design: &Design,
    members: &[Vec<usize>],
    sigma2: f64,
    tau2: f64,
) -> Option<(Vec<f64>, Matrix)> {
    let p = design.n_params();
    let mut information = zeros(p);
    let mut score = vec![0.0; p];
    for rows in members {
        let shrink = tau2 / (sigma2 + rows.len() as f64 * tau2);
        let mut column_sums = vec![0.0; p];
        let mut y_sum = 0.0;
        for &i in rows {
            let row = &design.x[i];
            add_outer(&mut information, row, 1.0 / sigma2);
            for ((sum, s), x) in column_sums.iter_mut().zip(score.iter_mut()).zip(row.iter()) {
                *sum += x;
                *s += x * design.y[i] / sigma2;
            }
            y_sum += design.y[i];
        }
        add_outer(&mut information, &column_sums, -shrink / sigma2);
        for (s, sum) in score.iter_mut().zip(&column_sums) {
            *s -= shrink * sum * y_sum / sigma2;
        }
    }
    let covariance = invert(&information)?;
    let beta = mat_vec(&covariance, &score);
    Some((beta, covariance))
}

fn fit_random_intercept(
    design: &Design,
    max_iterations: usize,
    tolerance: f64,
) -> Result<MixedFit, FallbackReason> {
    let n_groups = design.group_labels.len();
    if n_groups < 2 {
        return Err(FallbackReason::TooFewGroups { groups: n_groups });
    }

    let ols = fit_ols(design)?;
    let members = design.members();
    let n = design.y.len() as f64;

    let mut beta = ols.beta.clone();
    let mut sigma2 = ols.rss / n;
    if !(sigma2 > 0.0) {
        return Err(FallbackReason::DegenerateVariance);
    }

    // Start the intercept variance at the spread of the group mean residuals
    let group_means: Vec<f64> = members
        .iter()
        .filter(|rows| !rows.is_empty())
        .map(|rows| {
            rows.iter()
                .map(|&i| design.y[i] - dot(&design.x[i], &beta))
                .sum::<f64>()
                / rows.len() as f64
        })
        .collect();
    let mut tau2 = (group_means.iter().map(|m| m * m).sum::<f64>() / group_means.len() as f64)
        .max(sigma2 * 0.01);

    let mut ll = log_likelihood(design, &members, &beta, sigma2, tau2);

    for iteration in 1..=max_iterations {
        // E-step: posterior mean and variance of each group intercept
        let mut posterior_mean = vec![0.0; n_groups];
        let mut posterior_var = vec![0.0; n_groups];
        for (g, rows) in members.iter().enumerate() {
            let residual_sum: f64 = rows
                .iter()
                .map(|&i| design.y[i] - dot(&design.x[i], &beta))
                .sum();
            let denom = sigma2 + rows.len() as f64 * tau2;
            posterior_mean[g] = tau2 * residual_sum / denom;
            posterior_var[g] = tau2 * sigma2 / denom;
        }

        // Conditional maximization: variances first, then GLS for beta
        tau2 = posterior_mean
            .iter()
            .zip(&posterior_var)
            .map(|(u, v)| u * u + v)
            .sum::<f64>()
            / n_groups as f64;

        sigma2 = design
            .x
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let g = design.groups[i];
                (design.y[i] - dot(row, &beta) - posterior_mean[g]).powi(2) + posterior_var[g]
            })
            .sum::<f64>()
            / n;

        if !(sigma2.is_finite() && tau2.is_finite()) {
            return Err(FallbackReason::NonFiniteEstimate);
        }
        if sigma2 <= 0.0 {
            return Err(FallbackReason::DegenerateVariance);
        }

        let (next_beta, covariance) = generalized_least_squares(design, &members, sigma2, tau2)
            .ok_or(FallbackReason::SingularMatrix)?;
        if !next_beta.iter().all(|b| b.is_finite()) {
            return Err(FallbackReason::NonFiniteEstimate);
        }
        beta = next_beta;

        let next = log_likelihood(design, &members, &beta, sigma2, tau2);
        if !next.is_finite() {
            return Err(FallbackReason::NonFiniteEstimate);
        }
        let converged = (next - ll).abs() <= tolerance * (1.0 + next.abs());
        ll = next;

        if converged {
            debug!("Random-intercept EM converged after {iteration} iterations (ll = {ll:.4})");
            return Ok(MixedFit {
                beta,
                covariance,
                sigma2,
                tau2,
                log_likelihood: ll,
                iterations: iteration,
            });
        }
    }

    Err(FallbackReason::NotConverged {
        iterations: max_iterations,
    })
}

fn coefficient(
    name: &str,
    estimate: f64,
    variance: f64,
    p_value: impl Fn(f64) -> Option<f64>,
) -> Coefficient {
    let std_error = (variance.is_finite() && variance > 0.0).then(|| variance.sqrt());
    let statistic = std_error.map(|se| estimate / se);
    Coefficient {
        name: name.to_string(),
        estimate,
        std_error,
        statistic,
        p_value: statistic.and_then(p_value),
    }
}

fn base_summary(design: &Design, model: ModelKind, status: FitStatus) -> RegressionSummary {
    RegressionSummary {
        model,
        status,
        outcome: LOG_OUTCOME_COLUMN.to_string(),
        observations: design.y.len(),
        groups: design.group_labels.len(),
        covariates: design.columns.clone(),
        dropped_covariates: design.dropped.clone(),
        coefficients: Vec::new(),
        residual_variance: None,
        group_variance: None,
        log_likelihood: None,
        r_squared: None,
    }
}

fn mixed_summary(design: &Design, fit: MixedFit) -> RegressionSummary {
    let normal = Normal::new(0.0, 1.0).ok();
    let two_sided = |z: f64| {
        normal
            .as_ref()
            .map(|d| (2.0 * (1.0 - d.cdf(z.abs()))).clamp(0.0, 1.0))
    };

    let mut summary = base_summary(
        design,
        ModelKind::RandomIntercept,
        FitStatus::Converged {
            iterations: fit.iterations,
        },
    );
    summary.coefficients = design
        .coefficient_names()
        .enumerate()
        .map(|(j, name)| coefficient(name, fit.beta[j], fit.covariance[j][j], two_sided))
        .collect();
    summary.residual_variance = Some(fit.sigma2);
    summary.group_variance = Some(fit.tau2);
    summary.log_likelihood = Some(fit.log_likelihood);
    summary
}

fn ols_summary(design: &Design, fit: &OlsFit, reason: FallbackReason) -> RegressionSummary {
    let t_dist = StudentsT::new(0.0, 1.0, fit.df as f64).ok();
    let two_sided = |t: f64| {
        t_dist
            .as_ref()
            .map(|d| (2.0 * (1.0 - d.cdf(t.abs()))).clamp(0.0, 1.0))
    };

    let mut summary = base_summary(
        design,
        ModelKind::OrdinaryLeastSquares,
        FitStatus::Fallback { reason },
    );
    summary.coefficients = design
        .coefficient_names()
        .enumerate()
        .map(|(j, name)| {
            coefficient(name, fit.beta[j], fit.sigma2 * fit.xtx_inv[j][j], two_sided)
        })
        .collect();
    summary.residual_variance = Some(fit.sigma2);
    summary.r_squared = fit.r_squared;
    summary
}

/// Fit the random-intercept model, falling back to OLS
#[must_use]
pub fn fit_regression(design: &Design, config: &RegressionConfig) -> RegressionSummary {
    let reason = match fit_random_intercept(design, config.max_iterations, config.tolerance) {
        Ok(fit) => {
            info!(
                "Fitted random-intercept model on {} rows in {} groups",
                design.y.len(),
                design.group_labels.len()
            );
            return mixed_summary(design, fit);
        }
        Err(reason) => reason,
    };

    warn!("Random-intercept model unavailable ({reason}), falling back to OLS");
    match fit_ols(design) {
        Ok(fit) => ols_summary(design, &fit, reason),
        Err(ols_reason) => {
            warn!("OLS fallback failed as well ({ols_reason})");
            base_summary(
                design,
                ModelKind::NotFitted { reason: ols_reason },
                FitStatus::Fallback { reason },
            )
        }
    }
}

/// Build the design from merged records and fit it
#[must_use]
pub fn fit_merged(records: &[MergedRecord], config: &RegressionConfig) -> RegressionSummary {
    let design = Design::from_records(records, &config.covariates);
    if !design.dropped.is_empty() {
        info!(
            "Regression leaves out covariates: {}",
            design.dropped.join(", ")
        );
    }
    fit_regression(&design, config)
}

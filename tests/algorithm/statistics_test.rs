//! Tests for the statistical summary of the merged table

use burden_report::algorithm::statistics::{
    Design, FallbackReason, FitStatus, ModelKind, OUTCOME_COLUMN, RegressionSummary, correlate,
    describe, fit_merged, fit_regression, pearson,
};
use burden_report::config::RegressionConfig;
use burden_report::models::Covariate;
use burden_report::{AnalysisConfig, MergedRecord, summarize};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn assert_tags_consistent(summary: &RegressionSummary) {
    match (&summary.model, &summary.status) {
        (ModelKind::RandomIntercept, FitStatus::Converged { .. }) => {
            assert!(!summary.fell_back());
            assert!(summary.group_variance.is_some());
        }
        (ModelKind::OrdinaryLeastSquares, FitStatus::Fallback { .. }) => {
            assert!(summary.fell_back());
            assert!(summary.group_variance.is_none());
            assert!(!summary.coefficients.is_empty());
        }
        (ModelKind::NotFitted { .. }, FitStatus::Fallback { .. }) => {
            assert!(summary.fell_back());
            assert!(summary.coefficients.is_empty());
        }
        (model, status) => panic!("inconsistent regression tags: {model:?} with {status:?}"),
    }
}

fn random_records(rng: &mut StdRng, rows: usize, regions: usize) -> Vec<MergedRecord> {
    (0..rows)
        .map(|i| {
            let monetary = rng.random_range(0.0..80.0);
            let sanitation = rng.random_range(0.0..100.0);
            let region_effect = (i % regions) as f64 * 0.5;
            let noise: f64 = rng.random_range(-0.5..0.5);
            let log_count = 8.0 + 0.03 * monetary + region_effect + noise;
            MergedRecord {
                entity_id: format!("C{i}"),
                group_id: format!("R{}", i % regions),
                hiv_count: Some(log_count.exp_m1()),
                monetary: Some(monetary),
                sanitation: (rng.random_range(0.0..1.0) > 0.1).then_some(sanitation),
                ..MergedRecord::default()
            }
        })
        .collect()
}

#[test]
fn test_random_data_never_yields_inconsistent_tags() {
    let mut rng = StdRng::seed_from_u64(7);
    let config = RegressionConfig {
        covariates: vec![Covariate::Monetary, Covariate::Sanitation],
        ..RegressionConfig::default()
    };

    for rows in [0, 1, 2, 3, 5, 12, 40] {
        for regions in [1, 2, 4] {
            let records = random_records(&mut rng, rows, regions);
            let summary = fit_merged(&records, &config);
            assert_tags_consistent(&summary);
            assert!(summary.observations <= rows);
        }
    }
}

#[test]
fn test_random_intercept_recovers_the_slope() {
    let mut rng = StdRng::seed_from_u64(42);
    let records = random_records(&mut rng, 80, 4);
    let config = RegressionConfig {
        covariates: vec![Covariate::Monetary],
        ..RegressionConfig::default()
    };

    let summary = fit_merged(&records, &config);

    assert_tags_consistent(&summary);
    assert_eq!(summary.model, ModelKind::RandomIntercept);
    assert_eq!(summary.groups, 4);
    let slope = summary.coefficient("monetary").unwrap();
    // 0.03 per point, times the standard deviation of the covariate
    let values: Vec<f64> = records.iter().filter_map(|r| r.monetary).collect();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let sd = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64).sqrt();
    assert!((slope.estimate - 0.03 * sd).abs() < 0.1);
    assert!(slope.p_value.unwrap() < 0.001);
}

#[test]
fn test_single_region_falls_back_to_ols() {
    let y: Vec<f64> = (0..10).map(|i: i32| f64::from(i) * 0.5 + 1.0).collect();
    let groups = vec!["Only".to_string(); 10];
    let x: Vec<f64> = (0..10_i32).map(f64::from).collect();
    let design = Design::from_columns(y, &groups, vec![("x".to_string(), x)]);

    let summary = fit_regression(&design, &RegressionConfig::default());

    assert_eq!(summary.model, ModelKind::OrdinaryLeastSquares);
    assert_eq!(
        summary.status,
        FitStatus::Fallback {
            reason: FallbackReason::TooFewGroups { groups: 1 }
        }
    );
    assert!((summary.r_squared.unwrap() - 1.0).abs() < 1e-9);
}

#[test]
fn test_summary_covers_every_configured_covariate() {
    let mut rng = StdRng::seed_from_u64(3);
    let records = random_records(&mut rng, 20, 3);
    let config = AnalysisConfig::default();

    let summary = summarize(&records, &config);

    assert_eq!(summary.descriptives[0].name, OUTCOME_COLUMN);
    assert_eq!(
        summary.descriptives.len(),
        config.correlation_covariates.len() + 1
    );
    assert_eq!(summary.correlations.len(), config.correlation_covariates.len());

    let electricity = summary
        .correlations
        .iter()
        .find(|c| c.covariate == Covariate::Electricity)
        .unwrap();
    assert_eq!(electricity.n, 0);
    assert_eq!(electricity.coefficient, None);
}

#[test]
fn test_correlation_uses_pairwise_complete_rows() {
    let records = vec![
        MergedRecord {
            hiv_count: Some(1.0),
            monetary: Some(2.0),
            ..MergedRecord::default()
        },
        MergedRecord {
            hiv_count: Some(2.0),
            monetary: None,
            ..MergedRecord::default()
        },
        MergedRecord {
            hiv_count: Some(3.0),
            monetary: Some(6.0),
            ..MergedRecord::default()
        },
        MergedRecord {
            hiv_count: Some(4.0),
            monetary: Some(8.0),
            ..MergedRecord::default()
        },
    ];

    let correlations = correlate(&records, &[Covariate::Monetary]);
    assert_eq!(correlations[0].n, 3);
    let (r, n) = pearson(
        &[Some(1.0), Some(3.0), Some(4.0)],
        &[Some(2.0), Some(6.0), Some(8.0)],
    );
    assert_eq!(n, 3);
    assert_eq!(correlations[0].coefficient, r);

    let columns = describe(&records, &[Covariate::Monetary]);
    assert_eq!(columns[1].missing, 1);
    assert_eq!(columns[1].median, Some(6.0));
}

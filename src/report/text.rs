//! Plain-text rendering of the analysis report

use crate::algorithm::merge::JoinStats;
use crate::algorithm::statistics::{FitStatus, ModelKind};
use crate::report::AnalysisReport;
use crate::source::LoadStats;

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}

fn load_line(name: &str, stats: &LoadStats) -> String {
    let mut line = format!(
        "  {name:<10} {:>6} rows read, {:>6} kept",
        stats.rows_read, stats.rows_kept
    );
    if stats.discarded_total() > 0 {
        let reasons = stats
            .discarded
            .iter()
            .map(|(reason, count)| format!("{reason}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        line.push_str(&format!(" (discarded {reasons})"));
    }
    if stats.invalid_numeric_cells > 0 {
        line.push_str(&format!(
            ", {} non-numeric cells",
            stats.invalid_numeric_cells
        ));
    }
    line.push('\n');
    line
}

fn join_line(name: &str, stats: &JoinStats) -> String {
    format!(
        "  {name}: {} matched ({} by name, {} by code), {} left unmatched, {} right unmatched\n",
        stats.matched(),
        stats.primary_matches,
        stats.secondary_matches,
        stats.unmatched_left,
        stats.unmatched_right
    )
}

/// Render the report for the terminal
#[must_use]
pub fn render_text(report: &AnalysisReport) -> String {
    let mut out = String::new();
    out.push_str("HIV Burden and Poverty Report\n");
    out.push_str(&format!(
        "  Generated: {}\n\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    out.push_str("Sources:\n");
    out.push_str(&load_line("hiv", &report.sources.hiv));
    out.push_str(&load_line("poverty", &report.sources.poverty));
    if let Some(mortality) = &report.sources.mortality {
        out.push_str(&load_line("mortality", mortality));
    }

    let burden = &report.burden;
    out.push_str(&format!(
        "\nHigh-burden countries ({} of {} within {:.0}% of the global total):\n",
        burden.global.len(),
        burden.ranking.len(),
        burden.threshold
    ));
    for entry in &burden.global {
        out.push_str(&format!(
            "  {:>3}. {:<32} {:<24} {:>12.0} {:>6.2}% {:>6.2}%\n",
            entry.rank,
            entry.entity_id,
            entry.group_id,
            entry.value,
            entry.share_of_total,
            entry.cumulative_share
        ));
    }
    if burden.global.is_empty() {
        out.push_str("  (none: the largest country alone exceeds the threshold)\n");
    }

    out.push_str("\nBy region:\n");
    for group in &burden.regional {
        let names = group
            .entries
            .iter()
            .map(|entry| entry.entity_id.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(
            "  {:<24} total {:>12.0}, {} of {} countries: {}\n",
            group.group_id,
            group.total,
            group.entries.len(),
            group.entities,
            if names.is_empty() { "-" } else { names.as_str() }
        ));
    }

    out.push_str("\nRegional totals:\n");
    for total in &burden.regional_totals {
        out.push_str(&format!(
            "  {:<24} {:>12.0} {:>6.2}% ({} countries)\n",
            total.group_id, total.total, total.share_of_global, total.entities
        ));
    }

    out.push_str(&format!(
        "\nMerged table: {} countries\n",
        report.merge.records.len()
    ));
    out.push_str(&join_line("hiv x poverty", &report.merge.poverty_join));
    if let Some(stats) = &report.merge.mortality_join {
        out.push_str(&join_line("merged x mortality", stats));
    }

    let stats = &report.statistics;
    out.push_str("\nDescriptive statistics:\n");
    out.push_str(&format!(
        "  {:<24} {:>5} {:>5} {:>12} {:>12} {:>12} {:>12} {:>12}\n",
        "column", "n", "miss", "mean", "sd", "min", "median", "max"
    ));
    for column in &stats.descriptives {
        out.push_str(&format!(
            "  {:<24} {:>5} {:>5} {:>12} {:>12} {:>12} {:>12} {:>12}\n",
            column.name,
            column.count,
            column.missing,
            fmt_opt(column.mean, 2),
            fmt_opt(column.std_dev, 2),
            fmt_opt(column.min, 2),
            fmt_opt(column.median, 2),
            fmt_opt(column.max, 2)
        ));
    }

    out.push_str("\nCorrelation with HIV count (pairwise complete):\n");
    for correlation in &stats.correlations {
        out.push_str(&format!(
            "  {:<24} r = {:>7} (n = {:>3}, p = {})\n",
            correlation.covariate.name(),
            fmt_opt(correlation.coefficient, 3),
            correlation.n,
            fmt_opt(correlation.p_value, 4)
        ));
    }

    let regression = &stats.regression;
    out.push_str(&format!(
        "\nRegression of {} ({} rows, {} regions)\n",
        regression.outcome, regression.observations, regression.groups
    ));
    out.push_str(&format!("  Model: {}\n", regression.model));
    match regression.status {
        FitStatus::Converged { iterations } => {
            out.push_str(&format!("  Converged after {iterations} iterations\n"));
        }
        FitStatus::Fallback { reason } => {
            out.push_str(&format!("  Random intercept not used: {reason}\n"));
        }
    }
    if !regression.dropped_covariates.is_empty() {
        out.push_str(&format!(
            "  Left out: {}\n",
            regression.dropped_covariates.join(", ")
        ));
    }
    if !matches!(regression.model, ModelKind::NotFitted { .. }) {
        out.push_str(&format!(
            "  {:<24} {:>10} {:>10} {:>8} {:>8}\n",
            "term", "estimate", "std.err", "stat", "p"
        ));
        for coefficient in &regression.coefficients {
            out.push_str(&format!(
                "  {:<24} {:>10.4} {:>10} {:>8} {:>8}\n",
                coefficient.name,
                coefficient.estimate,
                fmt_opt(coefficient.std_error, 4),
                fmt_opt(coefficient.statistic, 2),
                fmt_opt(coefficient.p_value, 4)
            ));
        }
        if let Some(tau2) = regression.group_variance {
            out.push_str(&format!("  Region intercept variance: {tau2:.4}\n"));
        }
        if let Some(sigma2) = regression.residual_variance {
            out.push_str(&format!("  Residual variance: {sigma2:.4}\n"));
        }
        if let Some(ll) = regression.log_likelihood {
            out.push_str(&format!("  Log-likelihood: {ll:.3}\n"));
        }
        if let Some(r2) = regression.r_squared {
            out.push_str(&format!("  R-squared: {r2:.4}\n"));
        }
    }

    out
}

//! End-to-end runs of the pipeline over the fixture files

use std::fs::File;

use burden_report::models::ArrowSchema;
use burden_report::report::{render_text, write_outputs};
use burden_report::{AnalysisReport, MergedRecord, ModelKind, Pipeline};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::utils::{EXPECTED_HIGH_BURDEN, FixtureDir};

fn run(with_mortality: bool) -> (FixtureDir, AnalysisReport) {
    let fixtures = FixtureDir::new();
    let report = Pipeline::new(fixtures.config(with_mortality)).run().unwrap();
    (fixtures, report)
}

#[test]
fn test_pipeline_without_mortality() {
    let (_fixtures, report) = run(false);

    assert_eq!(report.high_burden_entities(), EXPECTED_HIGH_BURDEN);
    assert_eq!(report.burden.ranking.len(), 10);
    assert_eq!(report.merge.records.len(), 9);
    assert_eq!(report.merge.poverty_join.unmatched_left, 1);
    assert_eq!(report.merge.poverty_join.unmatched_right, 1);
    assert!(report.merge.mortality_join.is_none());
    assert!(report.sources.mortality.is_none());

    assert_eq!(report.sources.hiv.rows_kept, 11);
    assert_eq!(report.sources.poverty.rows_kept, 11);
    assert!(
        report
            .merge
            .records
            .iter()
            .all(|r| r.under_five_mortality.is_none())
    );
}

#[test]
fn test_pipeline_with_mortality() {
    let (_fixtures, report) = run(true);

    let join = report.merge.mortality_join.as_ref().unwrap();
    assert_eq!(join.primary_matches, 2);
    assert_eq!(join.secondary_matches, 1);
    assert_eq!(join.unmatched_left, 6);

    let kenya = report
        .merge
        .records
        .iter()
        .find(|r| r.entity_id == "Kenya")
        .unwrap();
    assert_eq!(kenya.under_five_mortality, Some(37.0));
    assert_eq!(kenya.neonatal_mortality, Some(20.7));
    let uganda = report
        .merge
        .records
        .iter()
        .find(|r| r.entity_id == "Uganda")
        .unwrap();
    assert_eq!(uganda.under_five_mortality, Some(42.0));

    let regression = &report.statistics.regression;
    assert_eq!(regression.observations, 9);
    assert_eq!(regression.groups, 2);
    assert_eq!(
        regression.fell_back(),
        regression.model != ModelKind::RandomIntercept
    );
}

#[test]
fn test_outputs_are_written_and_readable() {
    let (fixtures, report) = run(true);
    let out = fixtures.dir.path().join("out");

    let written = write_outputs(&report, &out).unwrap();

    for name in [
        "burden_global.csv",
        "burden_regional.csv",
        "burden_ranking.csv",
        "regional_totals.csv",
        "yearly_trend.csv",
        "merged.csv",
        "correlations.csv",
        "descriptives.csv",
        "merged.parquet",
        "burden_global.parquet",
        "summary.json",
        "report.txt",
    ] {
        let path = out.join(name);
        assert!(path.is_file(), "missing {name}");
        assert!(written.files.contains(&path));
    }

    let json = std::fs::read_to_string(out.join("summary.json")).unwrap();
    let parsed: AnalysisReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.high_burden_entities(), EXPECTED_HIGH_BURDEN);

    let global = std::fs::read_to_string(out.join("burden_global.csv")).unwrap();
    assert_eq!(global.lines().count(), EXPECTED_HIGH_BURDEN.len() + 1);
    assert!(global.starts_with("rank,entity_id,group_id,year,value,share_of_total,cumulative_share"));

    let file = File::open(out.join("merged.parquet")).unwrap();
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap();
    let mut records: Vec<MergedRecord> = Vec::new();
    for batch in reader {
        records.extend(MergedRecord::from_record_batch(&batch.unwrap()).unwrap());
    }
    assert_eq!(records, report.merge.records);
}

#[test]
fn test_text_report_mentions_every_section() {
    let (_fixtures, report) = run(true);
    let text = render_text(&report);

    for heading in [
        "High-burden countries (4 of 10",
        "By region:",
        "Regional totals:",
        "Merged table: 9 countries",
        "merged x mortality: 3 matched (2 by name, 1 by code)",
        "Descriptive statistics:",
        "Correlation with HIV count",
        "Regression of log_hiv_count",
    ] {
        assert!(text.contains(heading), "missing {heading:?}");
    }
}

#[test]
fn test_missing_input_file_fails() {
    let fixtures = FixtureDir::new();
    let mut config = fixtures.config(false);
    config.poverty_path = Some(fixtures.dir.path().join("nope.csv"));

    let err = Pipeline::new(config).run().unwrap_err();
    assert!(format!("{err:#}").contains("nope.csv"));
}

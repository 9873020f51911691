//! Tests for loading the HIV observations file

use burden_report::models::Observation;
use burden_report::source::{DatasetSource, DiscardReason, HivSource};
use burden_report::config::HivParserConfig;
use tempfile::TempDir;

use crate::utils::{HIV_FIXTURE, write_fixture};

#[test]
fn test_load_fixture_counts_rows() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(dir.path(), "hiv.csv", HIV_FIXTURE);

    let table = HivSource::default().load(&path).unwrap();

    assert_eq!(table.stats.rows_read, 14);
    assert_eq!(table.stats.rows_kept, 11);
    assert_eq!(table.records.len(), 11);
    assert_eq!(table.stats.discarded_for(DiscardReason::MissingValue), 2);
    assert_eq!(table.stats.discarded_for(DiscardReason::YearOutOfRange), 1);
}

#[test]
fn test_values_are_scaled_and_years_kept() {
    let table = HivSource::default().read(HIV_FIXTURE.as_bytes()).unwrap();

    let kenya: Vec<&Observation> = table
        .records
        .iter()
        .filter(|obs| obs.entity_id == "Kenya")
        .collect();
    assert_eq!(kenya.len(), 2);
    assert_eq!(kenya[0].year, 2010);
    assert_eq!(kenya[1].value, Some(1_600_000.0));
    assert_eq!(kenya[1].group_id, "Africa");

    assert!(table.records.iter().all(|obs| obs.entity_id != "Albania"));
    assert!(table.records.iter().all(|obs| obs.entity_id != "Chile"));
}

#[test]
fn test_custom_scale_and_year_range() {
    let config = HivParserConfig {
        value_scale: 1.0,
        min_year: 1800,
        max_year: 2030,
    };
    let table = HivSource::new(config).read(HIV_FIXTURE.as_bytes()).unwrap();

    assert_eq!(table.records.len(), 12);
    let atlantis = table
        .records
        .iter()
        .find(|obs| obs.entity_id == "Atlantis")
        .unwrap();
    assert_eq!(atlantis.value, Some(5.0));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = HivSource::default()
        .load(&dir.path().join("absent.csv"))
        .unwrap_err();
    assert!(format!("{err:#}").contains("absent.csv"));
}

#[test]
fn test_parse_lines_matches_file_reading() {
    let lines = [
        "Kenya,Africa,2018,1600 thousand",
        "Kenya,Africa,2018,No data",
        "",
        "Country,WHO Region,Year,Count",
    ];
    let table = HivSource::default().parse_lines(lines);
    assert_eq!(table.records.len(), 1);
    assert_eq!(table.stats.rows_read, 2);
}

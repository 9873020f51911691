//! Tests for normalizing the poverty sheet

use burden_report::config::PovertySheetConfig;
use burden_report::source::poverty::{PovertyField, ResolvedBy};
use burden_report::source::{DatasetSource, DiscardReason, PovertySource};
use tempfile::TempDir;

use crate::utils::{POVERTY_FIXTURE, write_fixture};

#[test]
fn test_load_fixture_into_canonical_records() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(dir.path(), "mpm.csv", POVERTY_FIXTURE);

    let table = PovertySource::default().load(&path).unwrap();

    assert_eq!(table.records.len(), 11);
    assert_eq!(table.stats.rows_read, 12);
    assert_eq!(table.stats.discarded_for(DiscardReason::EmptyEntity), 1);
    assert_eq!(table.stats.invalid_numeric_cells, 1);

    let kenya = &table.records[0];
    assert_eq!(kenya.entity_id, "Kenya");
    assert_eq!(kenya.country_code.as_deref(), Some("KEN"));
    assert_eq!(kenya.region.as_deref(), Some("SSF"));
    assert_eq!(kenya.reporting_year, 2015);
    assert_eq!(kenya.monetary, Some(36.1));
    assert_eq!(kenya.educational_attainment, None);
    assert_eq!(kenya.drinking_water, Some(40.2));
    assert_eq!(kenya.headcount, Some(51.0));
}

#[test]
fn test_invalid_numeric_text_becomes_missing() {
    let table = PovertySource::default()
        .read(POVERTY_FIXTURE.as_bytes())
        .unwrap();
    let peru = table
        .records
        .iter()
        .find(|record| record.entity_id == "Peru")
        .unwrap();
    assert_eq!(peru.educational_enrollment, None);
    assert_eq!(peru.electricity, Some(4.1));
}

#[test]
fn test_header_row_is_configurable() {
    let data = "Economy,Reporting year,Electricity\nChad,2019,90.1\n";
    let source = PovertySource::new(PovertySheetConfig { header_row: 0 });
    let table = source.read(data.as_bytes()).unwrap();

    assert_eq!(table.records.len(), 1);
    assert_eq!(table.records[0].electricity, Some(90.1));
    assert_eq!(table.records[0].sanitation, None);
}

#[test]
fn test_sheet_without_header_row_fails() {
    let err = PovertySource::default()
        .read("only a title\n".as_bytes())
        .unwrap_err();
    assert!(err.to_string().contains("header"));
}

#[test]
fn test_required_column_missing_fails() {
    let data = "title\nsubtitle\nRegion,Reporting year\nSSF,2019\n";
    assert!(PovertySource::default().read(data.as_bytes()).is_err());
}

#[test]
fn test_mapping_resolves_ordinal_columns_by_position() {
    let header: Vec<&str> = POVERTY_FIXTURE.lines().nth(2).unwrap().split(',').collect();
    let map = burden_report::source::poverty::PovertyColumnMap::resolve(&csv::StringRecord::from(
        header,
    ))
    .unwrap();

    let by_position: Vec<PovertyField> = map
        .resolutions()
        .iter()
        .filter(|r| r.resolved_by == ResolvedBy::Position)
        .map(|r| r.field)
        .collect();
    assert_eq!(
        by_position,
        vec![
            PovertyField::EducationalAttainment,
            PovertyField::EducationalEnrollment,
            PovertyField::Electricity,
            PovertyField::Sanitation,
            PovertyField::DrinkingWater,
        ]
    );
}

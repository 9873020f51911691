//! Tests for the mortality source and the per-country profiles

use burden_report::config::MortalityConfig;
use burden_report::models::{MortalityIndicator, MortalityProfile};
use burden_report::source::{DatasetSource, DiscardReason, MortalitySource};

use crate::utils::MORTALITY_FIXTURE;

#[test]
fn test_only_included_known_indicators_are_kept() {
    let table = MortalitySource::default()
        .read(MORTALITY_FIXTURE.as_bytes())
        .unwrap();

    assert_eq!(table.records.len(), 5);
    assert_eq!(table.stats.discarded_for(DiscardReason::ExcludedStatus), 1);
    assert_eq!(table.stats.discarded_for(DiscardReason::UnknownIndicator), 1);
}

#[test]
fn test_profiles_take_latest_value_per_indicator() {
    let table = MortalitySource::default()
        .read(MORTALITY_FIXTURE.as_bytes())
        .unwrap();
    let profiles = MortalityProfile::collect(&table.records);

    assert_eq!(profiles.len(), 3);
    let kenya = &profiles[0];
    assert_eq!(kenya.entity_id, "Kenya");
    assert_eq!(kenya.under_five, Some(37.0));
    assert_eq!(kenya.under_five_year, Some(2021));
    assert_eq!(kenya.neonatal, Some(20.7));
    assert_eq!(profiles[2].code_key().as_deref(), Some("UGA"));
    assert_eq!(profiles[1].neonatal, None);
}

#[test]
fn test_status_prefix_is_configurable() {
    let source = MortalitySource::new(MortalityConfig {
        included_status: "Excluded".to_string(),
    });
    let table = source.read(MORTALITY_FIXTURE.as_bytes()).unwrap();

    assert_eq!(table.records.len(), 1);
    assert_eq!(table.records[0].entity_id, "Brazil");
    assert_eq!(table.records[0].indicator, MortalityIndicator::UnderFive);
}

//! Tests for the burden ranking and the high-burden prefix

use burden_report::algorithm::burden::{high_burden_prefix, regional_totals, yearly_trend};
use burden_report::{BurdenAggregator, HivSource, Observation, high_burden, rank_burden};
use burden_report::source::DatasetSource;
use proptest::prelude::*;

use crate::utils::{EXPECTED_HIGH_BURDEN, HIV_FIXTURE};

fn fixture_observations() -> Vec<Observation> {
    HivSource::default()
        .read(HIV_FIXTURE.as_bytes())
        .unwrap()
        .records
}

#[test]
fn test_fixture_global_high_burden() {
    let observations = fixture_observations();
    let entries = high_burden(&observations, 75.0);

    let names: Vec<&str> = entries.iter().map(|e| e.entity_id.as_str()).collect();
    assert_eq!(names, EXPECTED_HIGH_BURDEN);
    // Kenya enters with its 2018 value, not 2010
    assert_eq!(entries[1].year, 2018);
    assert!((entries[3].cumulative_share - 6100.0 / 8252.0 * 100.0).abs() < 1e-9);
}

#[test]
fn test_fixture_groups_use_their_own_totals() {
    let groups = BurdenAggregator::default().by_group(&fixture_observations());

    let ids: Vec<&str> = groups.iter().map(|g| g.group_id.as_str()).collect();
    assert_eq!(ids, vec!["Africa", "Americas", "Europe"]);

    let africa: Vec<&str> = groups[0]
        .entries
        .iter()
        .map(|e| e.entity_id.as_str())
        .collect();
    assert_eq!(africa, vec!["Nigeria", "Kenya", "Uganda"]);
    assert_eq!(groups[0].entities, 5);

    // Brazil alone holds more than 75% of the Americas
    assert!(groups[1].entries.is_empty());
    assert!(groups[2].entries.is_empty());
}

#[test]
fn test_fixture_totals_and_trend() {
    let observations = fixture_observations();

    let totals = regional_totals(&observations);
    let africa = totals.iter().find(|t| t.group_id == "Africa").unwrap();
    assert!((africa.total - 7_100_000.0).abs() < 1e-6);
    let share_sum: f64 = totals.iter().map(|t| t.share_of_global).sum();
    assert!((share_sum - 100.0).abs() < 1e-9);

    let trend = yearly_trend(&observations);
    assert_eq!(trend[0].scope, "Global");
    assert_eq!(trend[0].year, 2010);
    assert_eq!(trend[0].entities, 1);
}

#[test]
fn test_threshold_of_one_hundred_keeps_everyone() {
    let observations = fixture_observations();
    let ranking = rank_burden(&observations);
    let all = high_burden(&observations, 100.0);
    assert_eq!(all.len(), ranking.len());
}

fn observation_strategy() -> impl Strategy<Value = Vec<Observation>> {
    prop::collection::vec(
        (0usize..12, 2000i32..2005, prop::option::of(0.0f64..1e6)),
        0..40,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(entity, year, value)| {
                Observation::new(format!("C{entity}"), format!("R{}", entity % 3), year, value)
            })
            .collect()
    })
}

fn moving_observation_strategy() -> impl Strategy<Value = Vec<Observation>> {
    prop::collection::vec(
        (0usize..8, 0usize..3, 2000i32..2005, prop::option::of(1.0f64..1e6)),
        0..40,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(entity, group, year, value)| {
                Observation::new(format!("C{entity}"), format!("R{group}"), year, value)
            })
            .collect()
    })
}

#[test]
fn test_entity_that_changed_region_is_ranked_in_its_latest_region() {
    let observations = vec![
        Observation::new("X", "A", 2001, Some(90.0)),
        Observation::new("X", "B", 2010, Some(40.0)),
        Observation::new("Y", "A", 2010, Some(10.0)),
        Observation::new("Z", "B", 2010, Some(60.0)),
    ];
    let groups = BurdenAggregator::new(100.0).by_group(&observations);

    assert_eq!(groups[0].group_id, "A");
    assert_eq!(groups[0].total, 10.0);
    assert_eq!(groups[0].entities, 1);
    assert!(groups[0].entries.iter().all(|e| e.entity_id != "X"));

    let b: Vec<(&str, i32)> = groups[1]
        .entries
        .iter()
        .map(|e| (e.entity_id.as_str(), e.year))
        .collect();
    assert_eq!(b, vec![("Z", 2010), ("X", 2010)]);
    assert_eq!(groups[1].total, 100.0);
}

proptest! {
    #[test]
    fn prop_group_totals_agree_with_regional_totals(observations in moving_observation_strategy()) {
        let groups = BurdenAggregator::default().by_group(&observations);
        let totals = regional_totals(&observations);

        prop_assert_eq!(groups.len(), totals.len());
        for (group, regional) in groups.iter().zip(&totals) {
            prop_assert_eq!(&group.group_id, &regional.group_id);
            prop_assert_eq!(group.entities, regional.entities);
            prop_assert!((group.total - regional.total).abs() <= 1e-9 * regional.total.max(1.0));
        }

        let entity_count: usize = groups.iter().map(|g| g.entities).sum();
        prop_assert_eq!(entity_count, rank_burden(&observations).len());
    }

    #[test]
    fn prop_ranking_is_a_valid_cumulative_distribution(observations in observation_strategy()) {
        let ranking = rank_burden(&observations);

        let mut previous = 0.0;
        for (idx, entry) in ranking.iter().enumerate() {
            prop_assert_eq!(entry.rank, idx + 1);
            prop_assert!(entry.cumulative_share >= previous - 1e-9);
            prop_assert!(entry.cumulative_share <= 100.0);
            previous = entry.cumulative_share;
        }

        if let Some(last) = ranking.last() {
            let share_sum: f64 = ranking.iter().map(|e| e.share_of_total).sum();
            prop_assert!((share_sum - 100.0).abs() < 1e-6);
            prop_assert!((last.cumulative_share - 100.0).abs() < 1e-6);
        }

        let mut names: Vec<&str> = ranking.iter().map(|e| e.entity_id.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        prop_assert_eq!(names.len(), ranking.len());
    }

    #[test]
    fn prop_high_burden_is_the_maximal_prefix(
        observations in observation_strategy(),
        threshold in 1.0f64..=100.0,
    ) {
        let ranking = rank_burden(&observations);
        let prefix = high_burden_prefix(ranking.clone(), threshold);

        prop_assert!(prefix.len() <= ranking.len());
        prop_assert_eq!(&prefix[..], &ranking[..prefix.len()]);
        prop_assert!(prefix.iter().all(|e| e.cumulative_share <= threshold));
        if let Some(next) = ranking.get(prefix.len()) {
            prop_assert!(next.cumulative_share > threshold);
        }
    }
}

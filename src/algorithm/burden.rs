//! Cumulative burden aggregation
//!
//! Ranks entities by their most recent value and finds the high-burden set:
//! the ranked prefix whose cumulative share of the total stays within the
//! threshold. A prefix entry is kept only while its cumulative share is
//! `<=` the threshold, so when the largest entity alone exceeds it the set is
//! empty. Ties keep input order (the sort is stable).

use std::collections::BTreeMap;

use itertools::Itertools;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::algorithm::merge::latest_per_entity;
use crate::config::DEFAULT_BURDEN_THRESHOLD;
use crate::models::{
    BurdenEntry, EntityKeyed, GroupBurden, Observation, RegionalTotal, YearlyTotal,
};

/// Scope label of the global yearly trend
pub const GLOBAL_SCOPE: &str = "Global";

/// Computes burden rankings with a fixed threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurdenAggregator {
    threshold: f64,
}

impl Default for BurdenAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_BURDEN_THRESHOLD)
    }
}

impl BurdenAggregator {
    /// Create an aggregator for a threshold in percent
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// The threshold in percent
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Full ranking of the latest value per entity
    #[must_use]
    pub fn rank(&self, observations: &[Observation]) -> Vec<BurdenEntry> {
        rank_burden(observations)
    }

    /// High-burden set across all entities
    #[must_use]
    pub fn global(&self, observations: &[Observation]) -> Vec<BurdenEntry> {
        high_burden(observations, self.threshold)
    }

    /// High-burden set within each group
    #[must_use]
    pub fn by_group(&self, observations: &[Observation]) -> Vec<GroupBurden> {
        high_burden_by_group(observations, self.threshold)
    }
}

/// Rank the latest present value of every entity, descending, with each
/// entity's share of the total and the running cumulative share.
///
/// Observations without a value do not participate. Returns an empty ranking
/// when nothing is left or the total is zero.
#[must_use]
pub fn rank_burden(observations: &[Observation]) -> Vec<BurdenEntry> {
    let present: Vec<Observation> = observations
        .iter()
        .filter(|obs| obs.value.is_some())
        .cloned()
        .collect();
    let latest = latest_per_entity(&present);

    let mut valued: Vec<(&Observation, f64)> = latest
        .iter()
        .filter_map(|obs| obs.value.map(|value| (obs, value)))
        .collect();

    let total: f64 = valued.iter().map(|(_, value)| value).sum();
    if valued.is_empty() || total <= 0.0 {
        return Vec::new();
    }

    valued.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut running = 0.0;
    valued
        .into_iter()
        .enumerate()
        .map(|(idx, (obs, value))| {
            running += value;
            BurdenEntry {
                rank: idx + 1,
                entity_id: obs.entity_id.clone(),
                group_id: obs.group_id.clone(),
                year: obs.year,
                value,
                share_of_total: value / total * 100.0,
                // Summation order differs from the total's; clamp the rounding.
                cumulative_share: (running / total * 100.0).min(100.0),
            }
        })
        .collect()
}

/// The high-burden prefix of a ranking: entries up to, not including, the
/// first whose cumulative share exceeds the threshold.
#[must_use]
pub fn high_burden_prefix(ranking: Vec<BurdenEntry>, threshold: f64) -> Vec<BurdenEntry> {
    ranking
        .into_iter()
        .take_while(|entry| entry.cumulative_share <= threshold)
        .collect()
}

/// High-burden set across all observations
#[must_use]
pub fn high_burden(observations: &[Observation], threshold: f64) -> Vec<BurdenEntry> {
    high_burden_prefix(rank_burden(observations), threshold)
}

/// High-burden set of every group, each ranked against its own total.
///
/// Every entity is first reduced to its latest present value and then
/// assigned to the group of that row, so an entity that moved between groups
/// counts once, in its current group. Groups come back in name order.
#[must_use]
pub fn high_burden_by_group(observations: &[Observation], threshold: f64) -> Vec<GroupBurden> {
    let present: Vec<Observation> = observations
        .iter()
        .filter(|obs| obs.value.is_some())
        .cloned()
        .collect();

    let mut groups: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
    for obs in latest_per_entity(&present) {
        groups.entry(obs.group_id.clone()).or_default().push(obs);
    }

    groups
        .into_iter()
        .map(|(group_id, members)| {
            let ranking = rank_burden(&members);
            let total = ranking.iter().map(|entry| entry.value).sum();
            let entities = ranking.len();
            GroupBurden {
                group_id,
                total,
                entities,
                entries: high_burden_prefix(ranking, threshold),
            }
        })
        .collect()
}

/// Sum of the latest value per entity within each group, with the group's
/// share of the global sum
#[must_use]
pub fn regional_totals(observations: &[Observation]) -> Vec<RegionalTotal> {
    let ranking = rank_burden(observations);
    let global: f64 = ranking.iter().map(|entry| entry.value).sum();

    ranking
        .iter()
        .into_group_map_by(|entry| entry.group_id.clone())
        .into_iter()
        .sorted_by(|a, b| a.0.cmp(&b.0))
        .map(|(group_id, entries)| {
            let total: f64 = entries.iter().map(|entry| entry.value).sum();
            RegionalTotal {
                group_id,
                total,
                share_of_global: if global > 0.0 { total / global * 100.0 } else { 0.0 },
                entities: entries.len(),
            }
        })
        .collect()
}

/// Yearly sum of all present values, globally and per group. Global rows come
/// first, then groups in name order; years ascend within a scope.
///
/// An entity contributes at most one value per year: repeated rows for the
/// same entity and year keep the first one.
#[must_use]
pub fn yearly_trend(observations: &[Observation]) -> Vec<YearlyTotal> {
    let mut seen: FxHashSet<(String, i32)> = FxHashSet::default();
    let mut totals: BTreeMap<(bool, String, i32), (f64, usize)> = BTreeMap::new();

    for obs in observations {
        let Some(value) = obs.value else { continue };
        if !seen.insert((obs.join_key(), obs.year)) {
            continue;
        }
        for key in [
            (false, GLOBAL_SCOPE.to_string(), obs.year),
            (true, obs.group_id.clone(), obs.year),
        ] {
            let slot = totals.entry(key).or_insert((0.0, 0));
            slot.0 += value;
            slot.1 += 1;
        }
    }

    totals
        .into_iter()
        .map(|((_, scope, year), (total, entities))| YearlyTotal {
            scope,
            year,
            total,
            entities,
        })
        .collect()
}

//! Table merging
//!
//! Reduces a dataset to its most recent row per entity and joins datasets on
//! the normalised entity key. Unmatched rows are dropped (inner join) and
//! counted in [`JoinStats`]. The two-pass join matches on a primary key first
//! and uses a secondary key only for rows the first pass left unmatched.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::models::{
    Dated, EntityKeyed, MergedRecord, MortalityProfile, Observation, PovertyRecord,
};

/// Row accounting for one join
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinStats {
    /// Left rows entering the join (after reduction)
    pub left_rows: usize,
    /// Right rows entering the join (after reduction)
    pub right_rows: usize,
    /// Left rows matched on the primary key
    pub primary_matches: usize,
    /// Left rows matched on the secondary key
    pub secondary_matches: usize,
    /// Left rows without a match
    pub unmatched_left: usize,
    /// Right rows never matched
    pub unmatched_right: usize,
}

impl JoinStats {
    /// Total matched rows
    #[must_use]
    pub fn matched(&self) -> usize {
        self.primary_matches + self.secondary_matches
    }
}

/// Which pass produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinPass {
    Primary,
    Secondary,
}

/// A left row's partner in the right table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinMatch {
    pub right_index: usize,
    pub pass: JoinPass,
}

/// Result of a two-pass join: one slot per left row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TwoPassJoin {
    pub matches: Vec<Option<JoinMatch>>,
    pub stats: JoinStats,
}

/// Merged table with its join accounting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeOutcome {
    pub records: Vec<MergedRecord>,
    pub stats: JoinStats,
}

/// Keep one row per entity: the one with the maximal year. Equal years keep
/// the row seen first. Output follows the order in which entities first
/// appear.
#[must_use]
pub fn latest_per_entity<T>(rows: &[T]) -> Vec<T>
where
    T: EntityKeyed + Dated + Clone,
{
    let mut latest: Vec<T> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();

    for row in rows {
        match index.get(&row.join_key()) {
            Some(&slot) => {
                if row.year() > latest[slot].year() {
                    latest[slot] = row.clone();
                }
            }
            None => {
                index.insert(row.join_key(), latest.len());
                latest.push(row.clone());
            }
        }
    }

    latest
}

/// Inner join on the normalised entity key. The right side is reduced to its
/// latest row per entity first, so no left row can match twice. Output keeps
/// the left order.
pub fn inner_join<L, R, O, F>(left: &[L], right: &[R], mut combine: F) -> (Vec<O>, JoinStats)
where
    L: EntityKeyed,
    R: EntityKeyed + Dated + Clone,
    F: FnMut(&L, &R) -> O,
{
    let right = latest_per_entity(right);
    let lookup: FxHashMap<String, usize> = right
        .iter()
        .enumerate()
        .map(|(idx, row)| (row.join_key(), idx))
        .collect();

    let mut used = vec![false; right.len()];
    let mut output = Vec::new();
    let mut stats = JoinStats {
        left_rows: left.len(),
        right_rows: right.len(),
        ..JoinStats::default()
    };

    for row in left {
        match lookup.get(&row.join_key()) {
            Some(&idx) => {
                used[idx] = true;
                stats.primary_matches += 1;
                output.push(combine(row, &right[idx]));
            }
            None => stats.unmatched_left += 1,
        }
    }
    stats.unmatched_right = used.iter().filter(|used| !**used).count();

    (output, stats)
}

/// Join HIV observations with poverty records: latest observation per
/// country, inner join on the country name.
#[must_use]
pub fn merge_datasets(observations: &[Observation], poverty: &[PovertyRecord]) -> MergeOutcome {
    let latest = latest_per_entity(observations);
    let (records, stats) = inner_join(&latest, poverty, MergedRecord::from_parts);

    log::info!(
        "Merged {} countries ({} HIV countries without poverty data, {} poverty countries without HIV data)",
        records.len(),
        stats.unmatched_left,
        stats.unmatched_right
    );

    MergeOutcome { records, stats }
}

/// Two-pass join with explicit precedence. Every left row is first matched on
/// its primary key; rows still unmatched are then matched on their secondary
/// key. A right row is claimed at most once, so a primary match is never
/// displaced and a claimed row never matches again.
pub fn two_pass_join<L, R>(
    left: &[L],
    right: &[R],
    left_keys: impl Fn(&L) -> (Option<String>, Option<String>),
    right_keys: impl Fn(&R) -> (Option<String>, Option<String>),
) -> TwoPassJoin {
    let mut by_primary: FxHashMap<String, Vec<usize>> = FxHashMap::default();
    let mut by_secondary: FxHashMap<String, Vec<usize>> = FxHashMap::default();
    for (idx, row) in right.iter().enumerate() {
        let (primary, secondary) = right_keys(row);
        if let Some(key) = primary {
            by_primary.entry(key).or_default().push(idx);
        }
        if let Some(key) = secondary {
            by_secondary.entry(key).or_default().push(idx);
        }
    }

    let left_keys: Vec<_> = left.iter().map(&left_keys).collect();
    let mut claimed = vec![false; right.len()];
    let mut matches: Vec<Option<JoinMatch>> = vec![None; left.len()];

    let claim = |candidates: Option<&Vec<usize>>, claimed: &mut Vec<bool>| {
        let idx = candidates?.iter().copied().find(|idx| !claimed[*idx])?;
        claimed[idx] = true;
        Some(idx)
    };

    for (slot, (primary, _)) in matches.iter_mut().zip(&left_keys) {
        let candidates = primary.as_ref().and_then(|key| by_primary.get(key));
        if let Some(right_index) = claim(candidates, &mut claimed) {
            *slot = Some(JoinMatch {
                right_index,
                pass: JoinPass::Primary,
            });
        }
    }

    for (slot, (_, secondary)) in matches.iter_mut().zip(&left_keys) {
        if slot.is_some() {
            continue;
        }
        let candidates = secondary.as_ref().and_then(|key| by_secondary.get(key));
        if let Some(right_index) = claim(candidates, &mut claimed) {
            *slot = Some(JoinMatch {
                right_index,
                pass: JoinPass::Secondary,
            });
        }
    }

    let stats = JoinStats {
        left_rows: left.len(),
        right_rows: right.len(),
        primary_matches: matches
            .iter()
            .filter(|m| matches!(m, Some(JoinMatch { pass: JoinPass::Primary, .. })))
            .count(),
        secondary_matches: matches
            .iter()
            .filter(|m| matches!(m, Some(JoinMatch { pass: JoinPass::Secondary, .. })))
            .count(),
        unmatched_left: matches.iter().filter(|m| m.is_none()).count(),
        unmatched_right: claimed.iter().filter(|c| !**c).count(),
    };

    TwoPassJoin { matches, stats }
}

/// Attach mortality profiles to merged records: country name first, ISO code
/// for the rest. Records without a profile keep missing mortality values.
#[must_use]
pub fn attach_mortality(
    records: &[MergedRecord],
    profiles: &[MortalityProfile],
) -> (Vec<MergedRecord>, JoinStats) {
    let join = two_pass_join(
        records,
        profiles,
        |record| (Some(record.join_key()), record.code_key()),
        |profile| (Some(profile.join_key()), profile.code_key()),
    );

    let merged = records
        .iter()
        .zip(&join.matches)
        .map(|(record, matched)| match matched {
            Some(m) => record.clone().with_mortality(&profiles[m.right_index]),
            None => record.clone(),
        })
        .collect();

    log::info!(
        "Attached mortality data to {} of {} countries ({} by name, {} by code)",
        join.stats.matched(),
        records.len(),
        join.stats.primary_matches,
        join.stats.secondary_matches
    );

    (merged, join.stats)
}

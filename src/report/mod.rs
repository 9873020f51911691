//! The analysis report
//!
//! [`AnalysisReport`] gathers every table the pipeline produces together with
//! the row and join accounting, so the data loss of each stage can be read
//! next to the results.

pub mod export;
pub mod text;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::algorithm::merge::JoinStats;
use crate::algorithm::statistics::StatisticalSummary;
use crate::models::{BurdenEntry, GroupBurden, MergedRecord, RegionalTotal, YearlyTotal};
use crate::source::LoadStats;

pub use export::{OutputFiles, write_outputs};
pub use text::render_text;

/// Row accounting of every source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub hiv: LoadStats,
    pub poverty: LoadStats,
    /// Absent when no mortality file was given
    pub mortality: Option<LoadStats>,
}

/// Burden tables, global and per region
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BurdenTables {
    /// Cumulative share threshold in percent
    pub threshold: f64,
    /// Every entity with a value, ranked
    pub ranking: Vec<BurdenEntry>,
    /// High-burden entities across all regions
    pub global: Vec<BurdenEntry>,
    /// High-burden entities within each region
    pub regional: Vec<GroupBurden>,
    pub regional_totals: Vec<RegionalTotal>,
    pub yearly_trend: Vec<YearlyTotal>,
}

/// The merged country table and how it was joined
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeSummary {
    pub records: Vec<MergedRecord>,
    /// HIV to poverty join
    pub poverty_join: JoinStats,
    /// Merged table to mortality join
    pub mortality_join: Option<JoinStats>,
}

/// Everything one run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub sources: SourceSummary,
    pub burden: BurdenTables,
    pub merge: MergeSummary,
    pub statistics: StatisticalSummary,
}

impl AnalysisReport {
    /// Serialize the report as pretty JSON
    pub fn to_json(&self) -> crate::error::Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            crate::error::AnalysisError::serialization(format!("Report to JSON: {e}")).into()
        })
    }

    /// High-burden entity names, in rank order
    #[must_use]
    pub fn high_burden_entities(&self) -> Vec<&str> {
        self.burden
            .global
            .iter()
            .map(|entry| entry.entity_id.as_str())
            .collect()
    }
}

//! Burden ranking models

use serde::{Deserialize, Serialize};

use crate::models::traits::{ArrowSchema, EntityKeyed};

/// One entity in a burden ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurdenEntry {
    /// 1-based position in the descending ranking
    pub rank: usize,
    /// Country name
    pub entity_id: String,
    /// WHO region
    pub group_id: String,
    /// Year of the observation used
    pub year: i32,
    /// Number of people living with HIV
    pub value: f64,
    /// Percent of the ranking total
    pub share_of_total: f64,
    /// Running percent up to and including this entity
    pub cumulative_share: f64,
}

impl EntityKeyed for BurdenEntry {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }
}

impl ArrowSchema for BurdenEntry {}

/// High-burden entities of one region, ranked against the region's own total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBurden {
    /// WHO region
    pub group_id: String,
    /// Sum of the latest values in the region
    pub total: f64,
    /// Number of entities with a value in the region
    pub entities: usize,
    /// The high-burden prefix of the region's ranking
    pub entries: Vec<BurdenEntry>,
}

/// Latest-year total for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalTotal {
    /// WHO region
    pub group_id: String,
    /// Sum of the latest values in the region
    pub total: f64,
    /// Percent of the global total
    pub share_of_global: f64,
    /// Number of entities contributing
    pub entities: usize,
}

/// Sum of all observations for one year, globally or within a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyTotal {
    /// `Global` or the WHO region
    pub scope: String,
    /// Observation year
    pub year: i32,
    /// Sum of the values observed that year
    pub total: f64,
    /// Number of entities contributing
    pub entities: usize,
}

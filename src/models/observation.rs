//! HIV observation model

use serde::{Deserialize, Serialize};

use crate::models::traits::{ArrowSchema, Dated, EntityKeyed};

/// One HIV observation: the number of people living with HIV in a country
/// for one year. A missing value never leaves the parser, but the type keeps
/// the option so hand-built tables can carry gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Country name
    pub entity_id: String,
    /// WHO region
    pub group_id: String,
    /// Observation year
    pub year: i32,
    /// Number of people living with HIV
    pub value: Option<f64>,
}

impl Observation {
    /// Create a new observation
    pub fn new(
        entity_id: impl Into<String>,
        group_id: impl Into<String>,
        year: i32,
        value: Option<f64>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            group_id: group_id.into(),
            year,
            value,
        }
    }
}

impl EntityKeyed for Observation {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }
}

impl Dated for Observation {
    fn year(&self) -> i32 {
        self.year
    }
}

impl ArrowSchema for Observation {}

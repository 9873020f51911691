//! Child mortality models

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::models::traits::{Dated, EntityKeyed};

/// Mortality indicators the analysis uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MortalityIndicator {
    /// Deaths before age five per 1000 live births
    UnderFive,
    /// Deaths in the first 28 days per 1000 live births
    Neonatal,
}

impl MortalityIndicator {
    /// Recognise an indicator from its label in the source file
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        if label.contains("neonatal") {
            Some(Self::Neonatal)
        } else if label.contains("under-five")
            || label.contains("under five")
            || label.contains("under-5")
        {
            Some(Self::UnderFive)
        } else {
            None
        }
    }
}

impl fmt::Display for MortalityIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnderFive => write!(f, "under-five"),
            Self::Neonatal => write!(f, "neonatal"),
        }
    }
}

/// One included mortality observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortalityObservation {
    /// Country name
    pub entity_id: String,
    /// ISO 3166 alpha-3 code, when the file carries one
    pub country_code: Option<String>,
    /// Which rate this is
    pub indicator: MortalityIndicator,
    /// Observation year
    pub year: i32,
    /// Rate per 1000 live births
    pub value: f64,
    /// Source status text
    pub status: String,
}

impl EntityKeyed for MortalityObservation {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }
}

impl Dated for MortalityObservation {
    fn year(&self) -> i32 {
        self.year
    }
}

/// Latest mortality rates for one country
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MortalityProfile {
    /// Country name
    pub entity_id: String,
    /// ISO 3166 alpha-3 code
    pub country_code: Option<String>,
    /// Latest under-five mortality rate
    pub under_five: Option<f64>,
    /// Year of `under_five`
    pub under_five_year: Option<i32>,
    /// Latest neonatal mortality rate
    pub neonatal: Option<f64>,
    /// Year of `neonatal`
    pub neonatal_year: Option<i32>,
}

impl MortalityProfile {
    /// Collapse observations into one profile per country holding the most
    /// recent value of each indicator. Profiles keep the order in which
    /// countries first appear; an equal-year duplicate keeps the first value.
    #[must_use]
    pub fn collect(observations: &[MortalityObservation]) -> Vec<Self> {
        let mut profiles: Vec<Self> = Vec::new();
        let mut index: FxHashMap<String, usize> = FxHashMap::default();

        for obs in observations {
            let key = obs.join_key();
            let slot = *index.entry(key).or_insert_with(|| {
                profiles.push(Self {
                    entity_id: obs.entity_id.clone(),
                    ..Self::default()
                });
                profiles.len() - 1
            });
            let profile = &mut profiles[slot];

            if profile.country_code.is_none() {
                profile.country_code.clone_from(&obs.country_code);
            }

            let (value, year) = match obs.indicator {
                MortalityIndicator::UnderFive => {
                    (&mut profile.under_five, &mut profile.under_five_year)
                }
                MortalityIndicator::Neonatal => (&mut profile.neonatal, &mut profile.neonatal_year),
            };
            if year.is_none_or(|current| obs.year > current) {
                *value = Some(obs.value);
                *year = Some(obs.year);
            }
        }

        profiles
    }

    /// ISO code used as the secondary join key
    #[must_use]
    pub fn code_key(&self) -> Option<String> {
        self.country_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_uppercase)
    }
}

impl EntityKeyed for MortalityProfile {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }
}

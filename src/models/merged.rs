//! Merged country record and the covariates read from it

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::mortality::MortalityProfile;
use crate::models::observation::Observation;
use crate::models::poverty::PovertyRecord;
use crate::models::traits::{ArrowSchema, EntityKeyed};

/// A country's most recent HIV observation joined with its poverty survey and,
/// when available, its latest child mortality rates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MergedRecord {
    /// Country name as spelled in the HIV dataset
    pub entity_id: String,
    /// WHO region
    pub group_id: String,
    /// Year of the HIV observation
    pub year: i32,
    /// Number of people living with HIV
    pub hiv_count: Option<f64>,
    /// ISO 3166 alpha-3 code from the poverty sheet
    pub country_code: Option<String>,
    /// World Bank region code
    pub poverty_region: Option<String>,
    /// Reporting year of the poverty survey
    pub reporting_year: i32,
    /// Year the poverty survey was fielded
    pub survey_year: Option<i32>,
    pub monetary: Option<f64>,
    pub educational_attainment: Option<f64>,
    pub educational_enrollment: Option<f64>,
    pub electricity: Option<f64>,
    pub sanitation: Option<f64>,
    pub drinking_water: Option<f64>,
    pub headcount: Option<f64>,
    /// Latest under-five mortality rate
    pub under_five_mortality: Option<f64>,
    /// Latest neonatal mortality rate
    pub neonatal_mortality: Option<f64>,
}

impl MergedRecord {
    /// Combine a HIV observation with the poverty record it matched
    #[must_use]
    pub fn from_parts(observation: &Observation, poverty: &PovertyRecord) -> Self {
        Self {
            entity_id: observation.entity_id.clone(),
            group_id: observation.group_id.clone(),
            year: observation.year,
            hiv_count: observation.value,
            country_code: poverty.country_code.clone(),
            poverty_region: poverty.region.clone(),
            reporting_year: poverty.reporting_year,
            survey_year: poverty.survey_year,
            monetary: poverty.monetary,
            educational_attainment: poverty.educational_attainment,
            educational_enrollment: poverty.educational_enrollment,
            electricity: poverty.electricity,
            sanitation: poverty.sanitation,
            drinking_water: poverty.drinking_water,
            headcount: poverty.headcount,
            under_five_mortality: None,
            neonatal_mortality: None,
        }
    }

    /// Attach mortality rates from a matched profile
    #[must_use]
    pub fn with_mortality(mut self, profile: &MortalityProfile) -> Self {
        self.under_five_mortality = profile.under_five;
        self.neonatal_mortality = profile.neonatal;
        self
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

    /// Read one covariate
    #[must_use]
    pub fn covariate(&self, covariate: Covariate) -> Option<f64> {
        match covariate {
            Covariate::Monetary => self.monetary,
            Covariate::EducationalAttainment => self.educational_attainment,
            Covariate::EducationalEnrollment => self.educational_enrollment,
            Covariate::Electricity => self.electricity,
            Covariate::Sanitation => self.sanitation,
            Covariate::DrinkingWater => self.drinking_water,
            Covariate::Headcount => self.headcount,
            Covariate::UnderFiveMortality => self.under_five_mortality,
            Covariate::NeonatalMortality => self.neonatal_mortality,
        }
    }
}

impl EntityKeyed for MergedRecord {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }
}

impl ArrowSchema for MergedRecord {}

/// Numeric columns of a merged record that can enter the correlation and
/// regression analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Covariate {
    Monetary,
    EducationalAttainment,
    EducationalEnrollment,
    Electricity,
    Sanitation,
    DrinkingWater,
    Headcount,
    UnderFiveMortality,
    NeonatalMortality,
}

impl Covariate {
    /// Every covariate, in report order
    pub const ALL: [Self; 9] = [
        Self::Monetary,
        Self::EducationalAttainment,
        Self::EducationalEnrollment,
        Self::Electricity,
        Self::Sanitation,
        Self::DrinkingWater,
        Self::Headcount,
        Self::UnderFiveMortality,
        Self::NeonatalMortality,
    ];

    /// Column name used in reports
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Monetary => "monetary",
            Self::EducationalAttainment => "educational_attainment",
            Self::EducationalEnrollment => "educational_enrollment",
            Self::Electricity => "electricity",
            Self::Sanitation => "sanitation",
            Self::DrinkingWater => "drinking_water",
            Self::Headcount => "headcount",
            Self::UnderFiveMortality => "under_five_mortality",
            Self::NeonatalMortality => "neonatal_mortality",
        }
    }
}

impl fmt::Display for Covariate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! Multidimensional poverty record model

use serde::{Deserialize, Serialize};

use crate::models::traits::{ArrowSchema, Dated, EntityKeyed};

/// One row of the poverty sheet after schema mapping: a country survey with
/// its deprivation rates (percent of population).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PovertyRecord {
    /// Country name ("Economy" in the sheet)
    pub entity_id: String,
    /// ISO 3166 alpha-3 code
    pub country_code: Option<String>,
    /// World Bank region code
    pub region: Option<String>,
    /// Year the figures are reported for
    pub reporting_year: i32,
    /// Survey acronym
    pub survey_name: Option<String>,
    /// Year the survey was fielded
    pub survey_year: Option<i32>,
    /// Monetary poverty
    pub monetary: Option<f64>,
    /// Deprivation in educational attainment
    pub educational_attainment: Option<f64>,
    /// Deprivation in educational enrollment
    pub educational_enrollment: Option<f64>,
    /// Deprivation in electricity access
    pub electricity: Option<f64>,
    /// Deprivation in sanitation
    pub sanitation: Option<f64>,
    /// Deprivation in drinking water
    pub drinking_water: Option<f64>,
    /// Multidimensional poverty headcount ratio
    pub headcount: Option<f64>,
}

impl EntityKeyed for PovertyRecord {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }
}

impl Dated for PovertyRecord {
    fn year(&self) -> i32 {
        self.reporting_year
    }
}

impl ArrowSchema for PovertyRecord {}

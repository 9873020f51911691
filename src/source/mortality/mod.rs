//! Child mortality source
//!
//! A regular CSV with named headers. Only rows whose status marks them as
//! included, and whose indicator is under-five or neonatal mortality, become
//! observations.

use std::io::Read;

use serde::Deserialize;

use crate::config::MortalityConfig;
use crate::error::{AnalysisError, Result};
use crate::models::{MortalityIndicator, MortalityObservation};
use crate::source::{DatasetSource, DiscardReason, LoadedTable};
use crate::utils::text::{normalize_cell, parse_year};

/// One CSV row as published
#[derive(Debug, Deserialize)]
struct MortalityCsvRow {
    #[serde(rename = "REF_AREA", alias = "Country code", default)]
    ref_area: String,
    #[serde(rename = "Geographic area", alias = "Country", alias = "Country name", default)]
    geographic_area: String,
    #[serde(rename = "Indicator", alias = "Series Name", default)]
    indicator: String,
    #[serde(rename = "TIME_PERIOD", alias = "Year", default)]
    time_period: String,
    #[serde(rename = "OBS_VALUE", alias = "Value", default)]
    obs_value: String,
    #[serde(rename = "OBS_STATUS", alias = "Observation Status", alias = "Status", default)]
    obs_status: String,
}

/// Loader for the mortality file
#[derive(Debug, Clone, Default)]
pub struct MortalitySource {
    config: MortalityConfig,
}

impl MortalitySource {
    /// Create a mortality source with the given settings
    #[must_use]
    pub fn new(config: MortalityConfig) -> Self {
        Self { config }
    }

    /// Whether a status text admits the row
    #[must_use]
    pub fn is_included(&self, status: &str) -> bool {
        normalize_cell(status)
            .to_lowercase()
            .starts_with(&self.config.included_status.to_lowercase())
    }

    fn convert(
        &self,
        row: MortalityCsvRow,
    ) -> std::result::Result<MortalityObservation, DiscardReason> {
        if !self.is_included(&row.obs_status) {
            return Err(DiscardReason::ExcludedStatus);
        }
        let indicator =
            MortalityIndicator::from_label(&row.indicator).ok_or(DiscardReason::UnknownIndicator)?;

        let entity_id = normalize_cell(&row.geographic_area);
        if entity_id.is_empty() {
            return Err(DiscardReason::EmptyEntity);
        }
        let year = parse_year(&row.time_period).ok_or(DiscardReason::InvalidYear)?;
        let value = normalize_cell(&row.obs_value)
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .ok_or(DiscardReason::MissingValue)?;

        let code = normalize_cell(&row.ref_area);
        Ok(MortalityObservation {
            entity_id,
            country_code: (!code.is_empty()).then_some(code),
            indicator,
            year,
            value,
            status: normalize_cell(&row.obs_status),
        })
    }
}

impl DatasetSource for MortalitySource {
    type Record = MortalityObservation;

    fn name(&self) -> &'static str {
        "mortality"
    }

    fn read<R: Read>(&self, reader: R) -> Result<LoadedTable<MortalityObservation>> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let mut table = LoadedTable::default();
        for row in csv_reader.deserialize::<MortalityCsvRow>() {
            let row = match row {
                Ok(row) => row,
                Err(e) if e.is_io_error() => return Err(AnalysisError::Csv(e).into()),
                Err(e) => {
                    log::debug!("Skipping unreadable mortality row: {e}");
                    table.stats.discard(DiscardReason::Malformed);
                    continue;
                }
            };

            match self.convert(row) {
                Ok(observation) => {
                    table.stats.keep();
                    table.records.push(observation);
                }
                Err(reason) => table.stats.discard(reason),
            }
        }

        Ok(table)
    }
}

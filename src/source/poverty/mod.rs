//! Multidimensional poverty source
//!
//! Reads the poverty sheet (exported as CSV), skips the title rows above the
//! header, resolves the column mapping once and turns every data row into a
//! validated [`PovertyRecord`].

pub mod field_mapping;

use std::io::Read;

use csv::StringRecord;
use log::{info, warn};

use crate::config::PovertySheetConfig;
use crate::error::{AnalysisError, Result};
use crate::models::PovertyRecord;
use crate::source::{DatasetSource, DiscardReason, LoadStats, LoadedTable};
use crate::utils::text::{decode_lossy, normalize_cell, parse_year};

pub use field_mapping::{
    ColumnResolution, POVERTY_FIELDS, PovertyColumnMap, PovertyField, ResolvedBy,
};

/// Placeholder the sheet uses for "not available"
pub const MISSING_PLACEHOLDER: &str = "-";

/// Result of coercing one numeric cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericCell {
    /// A number
    Value(f64),
    /// Blank or the placeholder
    Missing,
    /// Text that is not a number
    Invalid,
}

/// Coerce a numeric cell. Blank cells and the `-` placeholder are missing;
/// a trailing `%` is accepted.
#[must_use]
pub fn coerce_numeric(raw: &str) -> NumericCell {
    let cell = normalize_cell(raw);
    if cell.is_empty() || cell == MISSING_PLACEHOLDER {
        return NumericCell::Missing;
    }
    let number = cell.trim_end_matches('%').trim();
    match number.parse::<f64>() {
        Ok(value) if value.is_finite() => NumericCell::Value(value),
        _ => NumericCell::Invalid,
    }
}

/// Coerce a numeric cell to a value, treating invalid text as missing
#[must_use]
pub fn normalize_numeric(raw: &str) -> Option<f64> {
    match coerce_numeric(raw) {
        NumericCell::Value(value) => Some(value),
        NumericCell::Missing | NumericCell::Invalid => None,
    }
}

fn optional_text(raw: &str) -> Option<String> {
    let cell = normalize_cell(raw);
    (!cell.is_empty() && cell != MISSING_PLACEHOLDER).then_some(cell)
}

/// Loader for the poverty sheet
#[derive(Debug, Clone, Default)]
pub struct PovertySource {
    config: PovertySheetConfig,
}

impl PovertySource {
    /// Create a poverty source with the given sheet settings
    #[must_use]
    pub fn new(config: PovertySheetConfig) -> Self {
        Self { config }
    }

    /// Convert one data row through the resolved mapping
    pub fn normalize_row(
        map: &PovertyColumnMap,
        row: &StringRecord,
        stats: &mut LoadStats,
    ) -> std::result::Result<PovertyRecord, DiscardReason> {
        let country = normalize_cell(map.cell(row, PovertyField::Country));
        if country.is_empty() {
            return Err(DiscardReason::EmptyEntity);
        }
        let reporting_year =
            parse_year(map.cell(row, PovertyField::ReportingYear)).ok_or(DiscardReason::InvalidYear)?;

        let mut number = |field: PovertyField| match coerce_numeric(map.cell(row, field)) {
            NumericCell::Value(value) => Some(value),
            NumericCell::Missing => None,
            NumericCell::Invalid => {
                stats.invalid_numeric_cells += 1;
                None
            }
        };

        Ok(PovertyRecord {
            entity_id: country,
            country_code: optional_text(map.cell(row, PovertyField::CountryCode)),
            region: optional_text(map.cell(row, PovertyField::Region)),
            reporting_year,
            survey_name: optional_text(map.cell(row, PovertyField::SurveyName)),
            survey_year: parse_year(map.cell(row, PovertyField::SurveyYear)),
            monetary: number(PovertyField::Monetary),
            educational_attainment: number(PovertyField::EducationalAttainment),
            educational_enrollment: number(PovertyField::EducationalEnrollment),
            electricity: number(PovertyField::Electricity),
            sanitation: number(PovertyField::Sanitation),
            drinking_water: number(PovertyField::DrinkingWater),
            headcount: number(PovertyField::Headcount),
        })
    }
}

fn is_blank(row: &StringRecord) -> bool {
    row.iter().all(|cell| normalize_cell(cell).is_empty())
}

impl DatasetSource for PovertySource {
    type Record = PovertyRecord;

    fn name(&self) -> &'static str {
        "poverty"
    }

    fn read<R: Read>(&self, reader: R) -> Result<LoadedTable<PovertyRecord>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut table = LoadedTable::default();
        let mut map: Option<PovertyColumnMap> = None;

        for (row_idx, record) in csv_reader.byte_records().enumerate() {
            let record = record.map_err(AnalysisError::Csv)?;
            let row = StringRecord::from(record.iter().map(decode_lossy).collect::<Vec<_>>());

            if row_idx < self.config.header_row {
                continue;
            }

            if map.is_none() {
                let resolved = PovertyColumnMap::resolve(&row)?;
                for resolution in resolved.resolutions() {
                    if resolution.resolved_by == ResolvedBy::Position {
                        info!(
                            "Poverty field '{}' taken from column {} by position",
                            resolution.field, resolution.column
                        );
                    }
                }
                if !resolved.unresolved().is_empty() {
                    warn!(
                        "Poverty sheet lacks columns for: {}",
                        resolved
                            .unresolved()
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                }
                map = Some(resolved);
                continue;
            }
            let Some(columns) = map.as_ref() else {
                continue;
            };

            if is_blank(&row) {
                continue;
            }

            match Self::normalize_row(columns, &row, &mut table.stats) {
                Ok(record) => {
                    table.stats.keep();
                    table.records.push(record);
                }
                Err(reason) => {
                    log::debug!("Discarding poverty row {row_idx} ({reason})");
                    table.stats.discard(reason);
                }
            }
        }

        if map.is_none() {
            return Err(AnalysisError::schema(format!(
                "poverty sheet ended before header row {}",
                self.config.header_row
            ))
            .into());
        }

        Ok(table)
    }
}

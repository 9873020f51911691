//! Parser for the malformed HIV rows
//!
//! Every record of the HIV file is a single logical column holding the fields
//! joined by commas, e.g. `Kenya,Africa,2018,1600 thousand`. The parser splits
//! that text into a fixed ordered field list, extracts the numeric magnitude,
//! and decides whether the row survives.

use crate::config::HivParserConfig;
use crate::models::Observation;
use crate::source::DiscardReason;
use crate::utils::text::{normalize_cell, parse_year};

/// The fixed ordered field list of a HIV record
pub const HIV_FIELDS: [&str; 4] = ["country", "region", "year", "value"];

/// Marker the source uses for countries without an estimate
const NO_DATA_MARKER: &str = "no data";

/// Marker the source uses for suppressed small estimates (`<100`)
const LESS_THAN_MARKER: char = '<';

/// The named text fields of one HIV record before coercion
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawHivRow {
    pub country: String,
    pub region: String,
    pub year: String,
    pub value: String,
}

/// Outcome of parsing one line
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// The line became an observation
    Kept(Observation),
    /// The line was dropped
    Discarded(DiscardReason),
    /// The line is the header
    Header,
}

/// Split a comma-joined line into the fixed field list. Tokens beyond the
/// last field are dropped; absent trailing fields are left empty.
#[must_use]
pub fn split_row(line: &str) -> RawHivRow {
    let mut tokens = line.split(',').map(normalize_cell);
    let mut next = || tokens.next().unwrap_or_default();

    RawHivRow {
        country: next(),
        region: next(),
        year: next(),
        value: next(),
    }
}

/// Extract the magnitude of a value cell and scale it.
///
/// The magnitude is the token before the first space (`"123 thousand"` →
/// `123`). Cells carrying the "no data" or less-than markers are missing
/// rather than parsed, as are unparsable or negative magnitudes.
#[must_use]
pub fn parse_magnitude(value: &str, scale: f64) -> Option<f64> {
    let value = normalize_cell(value);
    if value.to_lowercase().contains(NO_DATA_MARKER) || value.contains(LESS_THAN_MARKER) {
        return None;
    }

    let token = value.split(' ').next()?.trim();
    let magnitude = token.parse::<f64>().ok()?;
    if !magnitude.is_finite() || magnitude < 0.0 {
        return None;
    }

    Some(magnitude * scale)
}

/// Parse one line of the HIV file
#[must_use]
pub fn parse_row(line: &str, config: &HivParserConfig) -> RowOutcome {
    let raw = split_row(line);

    if raw.country.eq_ignore_ascii_case(HIV_FIELDS[0]) {
        return RowOutcome::Header;
    }
    if raw.country.is_empty() {
        return RowOutcome::Discarded(DiscardReason::EmptyEntity);
    }

    let Some(year) = parse_year(&raw.year) else {
        return RowOutcome::Discarded(DiscardReason::InvalidYear);
    };
    if !(config.min_year..=config.max_year).contains(&year) {
        return RowOutcome::Discarded(DiscardReason::YearOutOfRange);
    }

    match parse_magnitude(&raw.value, config.value_scale) {
        Some(value) => {
            RowOutcome::Kept(Observation::new(raw.country, raw.region, year, Some(value)))
        }
        None => RowOutcome::Discarded(DiscardReason::MissingValue),
    }
}

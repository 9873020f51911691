//! HIV observations source
//!
//! The HIV file stores each record as one quoted column of comma-joined
//! fields. The CSV layer only undoes the quoting; [`parser`] does the rest.

pub mod parser;

use std::io::Read;

use crate::config::HivParserConfig;
use crate::error::{AnalysisError, Result};
use crate::models::Observation;
use crate::source::{DatasetSource, DiscardReason, LoadStats, LoadedTable};
use crate::utils::text::decode_lossy;

pub use parser::{HIV_FIELDS, RawHivRow, RowOutcome, parse_magnitude, parse_row, split_row};

/// Loader for the HIV observations file
#[derive(Debug, Clone, Default)]
pub struct HivSource {
    config: HivParserConfig,
}

impl HivSource {
    /// Create a HIV source with the given parser settings
    #[must_use]
    pub fn new(config: HivParserConfig) -> Self {
        Self { config }
    }

    /// Parse already split lines, e.g. from a test fixture
    #[must_use]
    pub fn parse_lines<'a>(
        &self,
        lines: impl IntoIterator<Item = &'a str>,
    ) -> LoadedTable<Observation> {
        let mut table = LoadedTable::default();
        for line in lines {
            self.push_line(line, &mut table.records, &mut table.stats);
        }
        table
    }

    fn push_line(&self, line: &str, records: &mut Vec<Observation>, stats: &mut LoadStats) {
        if line.trim().is_empty() {
            return;
        }
        match parse_row(line, &self.config) {
            RowOutcome::Kept(observation) => {
                stats.keep();
                records.push(observation);
            }
            RowOutcome::Discarded(reason) => {
                log::debug!("Discarding HIV row ({reason}): {line}");
                stats.discard(reason);
            }
            RowOutcome::Header => {}
        }
    }
}

impl DatasetSource for HivSource {
    type Record = Observation;

    fn name(&self) -> &'static str {
        "HIV"
    }

    fn read<R: Read>(&self, reader: R) -> Result<LoadedTable<Observation>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut table = LoadedTable::default();
        for record in csv_reader.byte_records() {
            let record = match record {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Err(AnalysisError::Csv(e).into()),
                Err(e) => {
                    log::debug!("Skipping unreadable HIV record: {e}");
                    table.stats.discard(DiscardReason::Malformed);
                    continue;
                }
            };

            // Unquoted rows arrive split into several cells; rejoin them so
            // both layouts go through the same field splitting.
            let line = record
                .iter()
                .map(decode_lossy)
                .collect::<Vec<_>>()
                .join(",");
            self.push_line(&line, &mut table.records, &mut table.stats);
        }

        Ok(table)
    }
}

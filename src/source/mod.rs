//! Dataset sources
//!
//! Each source turns one raw input file into a table of canonical records.
//! Malformed rows are never fatal: they are discarded and counted per reason
//! in [`LoadStats`], which the report carries next to the data.

pub mod hiv;
pub mod mortality;
pub mod poverty;

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::error::util::safe_open_file;
use crate::utils::logging::{log_dataset_loaded, log_dataset_open, log_dataset_warning};

pub use hiv::HivSource;
pub use mortality::MortalitySource;
pub use poverty::PovertySource;

/// Why a source row did not make it into the canonical table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    /// The row has no entity name
    EmptyEntity,
    /// The year cell could not be parsed
    InvalidYear,
    /// The year lies outside the accepted range
    YearOutOfRange,
    /// The value is missing, a sentinel, or unparsable
    MissingValue,
    /// The row's status excludes it from the analysis
    ExcludedStatus,
    /// The row reports an indicator the analysis does not use
    UnknownIndicator,
    /// The row could not be read at all
    Malformed,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::EmptyEntity => "empty entity",
            Self::InvalidYear => "invalid year",
            Self::YearOutOfRange => "year out of range",
            Self::MissingValue => "missing value",
            Self::ExcludedStatus => "excluded status",
            Self::UnknownIndicator => "unknown indicator",
            Self::Malformed => "malformed row",
        };
        f.write_str(label)
    }
}

/// Row accounting for one loaded source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadStats {
    /// Data rows seen (header and blank rows excluded)
    pub rows_read: usize,
    /// Rows that produced a record
    pub rows_kept: usize,
    /// Discarded rows by reason
    pub discarded: BTreeMap<DiscardReason, usize>,
    /// Cells that held text where a number was expected
    pub invalid_numeric_cells: usize,
}

impl LoadStats {
    /// Count a kept row
    pub fn keep(&mut self) {
        self.rows_read += 1;
        self.rows_kept += 1;
    }

    /// Count a discarded row
    pub fn discard(&mut self, reason: DiscardReason) {
        self.rows_read += 1;
        *self.discarded.entry(reason).or_insert(0) += 1;
    }

    /// Total number of discarded rows
    #[must_use]
    pub fn discarded_total(&self) -> usize {
        self.discarded.values().sum()
    }

    /// Number of rows discarded for one reason
    #[must_use]
    pub fn discarded_for(&self, reason: DiscardReason) -> usize {
        self.discarded.get(&reason).copied().unwrap_or(0)
    }
}

/// A canonical table together with its row accounting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedTable<T> {
    /// The canonical records, in source order
    pub records: Vec<T>,
    /// How the source rows were handled
    pub stats: LoadStats,
}

impl<T> Default for LoadedTable<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            stats: LoadStats::default(),
        }
    }
}

impl<T> LoadedTable<T> {
    /// Wrap records built in memory, counting every one as kept
    #[must_use]
    pub fn from_records(records: Vec<T>) -> Self {
        let stats = LoadStats {
            rows_read: records.len(),
            rows_kept: records.len(),
            ..LoadStats::default()
        };
        Self { records, stats }
    }
}

/// A raw input file that can be read into canonical records
pub trait DatasetSource {
    /// The canonical record type
    type Record;

    /// Name used in logs and reports
    fn name(&self) -> &'static str;

    /// Read records from any byte stream
    fn read<R: Read>(&self, reader: R) -> Result<LoadedTable<Self::Record>>;

    /// Read records from a file, logging the outcome
    fn load(&self, path: &Path) -> Result<LoadedTable<Self::Record>> {
        log_dataset_open(self.name(), path);
        let start = Instant::now();

        let file = safe_open_file(path, &format!("reading {} data", self.name()))?;
        let table = self.read(file)?;

        if table.stats.discarded_total() > 0 {
            let reasons = table
                .stats
                .discarded
                .iter()
                .map(|(reason, count)| format!("{reason}: {count}"))
                .collect::<Vec<_>>()
                .join(", ");
            log_dataset_warning(
                &format!(
                    "Discarded {} {} rows ({reasons})",
                    table.stats.discarded_total(),
                    self.name()
                ),
                Some(path),
            );
        }
        log_dataset_loaded(
            self.name(),
            path,
            table.records.len(),
            table.stats.rows_read,
            start.elapsed(),
        );

        Ok(table)
    }
}

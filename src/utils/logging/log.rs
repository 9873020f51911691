//! Log lines for dataset loading and pipeline stages
//!
//! Every dataset load reports where it read from and how many rows survived
//! cleaning; later stages report a single count each.

use std::path::Path;
use std::time::Duration;

/// Announce that a dataset file is being read
pub fn log_dataset_open(dataset: &str, path: &Path) {
    log::info!("Reading {dataset} data from {}", path.display());
}

/// Report the rows of a dataset that survived cleaning
pub fn log_dataset_loaded(dataset: &str, path: &Path, kept: usize, read: usize, elapsed: Duration) {
    log::info!("{}", loaded_message(dataset, path, kept, read, elapsed));
}

fn loaded_message(dataset: &str, path: &Path, kept: usize, read: usize, elapsed: Duration) -> String {
    format!(
        "Kept {kept} of {read} {dataset} rows from {} in {elapsed:.2?}",
        path.display()
    )
}

/// Report the size of a stage result, e.g. `Merged table: 12 countries`
pub fn log_stage(stage: &str, items: usize, unit: &str) {
    log::info!("{}", stage_message(stage, items, unit));
}

fn stage_message(stage: &str, items: usize, unit: &str) -> String {
    format!("{stage}: {items} {unit}")
}

/// Warn about a dataset, naming its file when one is involved
pub fn log_dataset_warning(message: &str, path: Option<&Path>) {
    match path {
        Some(path) => log::warn!("{message} ({})", path.display()),
        None => log::warn!("{message}"),
    }
}

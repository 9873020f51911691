//! Progress reporting for the pipeline stages
//!
//! The pipeline is a single pass over small tables, so a spinner with a
//! stage message is all the binary shows.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Template used by the stage spinner
pub const DEFAULT_SPINNER_TEMPLATE: &str = "{spinner:.green} {elapsed_precise} {msg}";

/// Create a spinner progress bar for operations without a known length
///
/// # Arguments
/// * `message` - Optional message to display with the spinner
#[must_use]
pub fn create_spinner(message: Option<&str>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template(DEFAULT_SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);

    if let Some(msg) = message {
        pb.set_message(msg.to_string());
    }

    pb.enable_steady_tick(Duration::from_millis(100));

    pb
}

/// Show the current stage on an optional spinner
pub fn set_stage(pb: Option<&ProgressBar>, stage: &str) {
    if let Some(pb) = pb {
        pb.set_message(stage.to_string());
    }
}

/// Finish a progress bar and clear it from display
pub fn finish_and_clear(pb: &ProgressBar) {
    pb.finish_and_clear();
}

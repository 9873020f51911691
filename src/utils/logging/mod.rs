//! Dataset and stage logging, plus the stage spinner

pub mod log;
pub mod progress;

// Re-export commonly used functions for convenience
pub use log::{log_dataset_loaded, log_dataset_open, log_dataset_warning, log_stage};
pub use progress::{create_spinner, finish_and_clear, set_stage};

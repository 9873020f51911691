//! Shared utilities: logging helpers and text normalisation

pub mod logging;
pub mod text;

pub use text::{normalize_cell, normalize_key, parse_year};

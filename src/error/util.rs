//! Utility functions for error handling
//!
//! File-system checks that attach the path and the purpose of the access to
//! the error, so a failed run says which input or output was at fault.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::Context;

use crate::error::{AnalysisError, Result};

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        return Err(AnalysisError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )))
        .with_context(|| format!("Needed for: {purpose}"));
    }

    if !path.is_file() {
        return Err(AnalysisError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Path is not a file: {}", path.display()),
        )))
        .with_context(|| format!("Expected a file for: {purpose}"));
    }

    fs::File::open(path).map_err(AnalysisError::Io).with_context(|| {
        format!("Failed to open {} for: {purpose}", path.display())
    })
}

/// Safely read a whole file into memory with rich error information
pub fn safe_read_bytes(path: &Path, purpose: &str) -> Result<Vec<u8>> {
    let mut file = safe_open_file(path, purpose)?;
    let mut content = Vec::new();
    io::Read::read_to_end(&mut file, &mut content)
        .map_err(AnalysisError::Io)
        .with_context(|| format!("Failed to read {} for: {purpose}", path.display()))?;
    Ok(content)
}

/// Make sure an output directory exists, creating it when needed
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    if path.exists() && !path.is_dir() {
        return Err(AnalysisError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Output path is not a directory: {}", path.display()),
        ))
        .into());
    }

    fs::create_dir_all(path)
        .map_err(AnalysisError::Io)
        .with_context(|| format!("Failed to create output directory {}", path.display()))
}

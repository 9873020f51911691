//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::AnalysisConfig;
use crate::error::Result;

/// How the report is printed to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// The full report as JSON
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "burden-report")]
#[command(version)]
#[command(
    about = "HIV burden ranking and poverty regression over country-level datasets",
    long_about = None
)]
pub struct Cli {
    /// HIV observations file (one comma-joined record per line)
    #[arg(long, value_name = "FILE")]
    pub hiv: Option<PathBuf>,

    /// Multidimensional poverty sheet exported as CSV
    #[arg(long, value_name = "FILE")]
    pub poverty: Option<PathBuf>,

    /// Child mortality CSV (optional)
    #[arg(long, value_name = "FILE")]
    pub mortality: Option<PathBuf>,

    /// TOML configuration file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for the exported tables
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Cumulative burden threshold in percent
    #[arg(short, long, value_name = "PERCENT")]
    pub threshold: Option<f64>,

    /// Output format for stdout
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl Cli {
    /// Load the configuration file (if any) and apply the flags on top
    pub fn resolve_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_toml_file(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(path) = &self.hiv {
            config.hiv_path = Some(path.clone());
        }
        if let Some(path) = &self.poverty {
            config.poverty_path = Some(path.clone());
        }
        if let Some(path) = &self.mortality {
            config.mortality_path = Some(path.clone());
        }
        if let Some(dir) = &self.output {
            config.output_dir = dir.clone();
        }
        if let Some(threshold) = self.threshold {
            config.burden.threshold = threshold;
        }

        config.validate()?;
        Ok(config)
    }
}

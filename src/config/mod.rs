//! Configuration for the analysis pipeline.
//!
//! Every field has a default, so a configuration file only needs the values it
//! changes. Command-line flags are applied on top of the loaded file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::error::util::safe_read_bytes;
use crate::models::Covariate;

/// Default cumulative burden threshold, in percent
pub const DEFAULT_BURDEN_THRESHOLD: f64 = 75.0;

/// Default factor converting reported HIV magnitudes ("123 thousand") to counts
pub const DEFAULT_VALUE_SCALE: f64 = 1000.0;

/// Configuration for the whole analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// HIV observations file (one comma-joined record per line)
    pub hiv_path: Option<PathBuf>,
    /// Poverty indicator sheet exported as CSV
    pub poverty_path: Option<PathBuf>,
    /// Optional mortality observations CSV
    pub mortality_path: Option<PathBuf>,
    /// Directory that receives the exported tables
    pub output_dir: PathBuf,
    /// Burden aggregation settings
    pub burden: BurdenConfig,
    /// HIV record parser settings
    pub hiv: HivParserConfig,
    /// Poverty sheet settings
    pub poverty: PovertySheetConfig,
    /// Mortality file settings
    pub mortality: MortalityConfig,
    /// Regression settings
    pub regression: RegressionConfig,
    /// Covariates correlated against the HIV outcome
    pub correlation_covariates: Vec<Covariate>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            hiv_path: None,
            poverty_path: None,
            mortality_path: None,
            output_dir: PathBuf::from("report"),
            burden: BurdenConfig::default(),
            hiv: HivParserConfig::default(),
            poverty: PovertySheetConfig::default(),
            mortality: MortalityConfig::default(),
            regression: RegressionConfig::default(),
            correlation_covariates: Covariate::ALL.to_vec(),
        }
    }
}

/// Settings for the cumulative burden computation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BurdenConfig {
    /// Cumulative share (percent) the high-burden prefix may not exceed
    pub threshold: f64,
}

impl Default for BurdenConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_BURDEN_THRESHOLD,
        }
    }
}

/// Settings for the malformed HIV record parser
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HivParserConfig {
    /// Multiplier applied to the parsed magnitude
    pub value_scale: f64,
    /// First accepted observation year
    pub min_year: i32,
    /// Last accepted observation year
    pub max_year: i32,
}

impl Default for HivParserConfig {
    fn default() -> Self {
        Self {
            value_scale: DEFAULT_VALUE_SCALE,
            min_year: 2000,
            max_year: 2030,
        }
    }
}

/// Settings for the poverty sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PovertySheetConfig {
    /// Zero-based row holding the column headers
    pub header_row: usize,
}

impl Default for PovertySheetConfig {
    fn default() -> Self {
        Self { header_row: 2 }
    }
}

/// Settings for the mortality file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MortalityConfig {
    /// Status prefix (case-insensitive) a row needs to participate
    pub included_status: String,
}

impl Default for MortalityConfig {
    fn default() -> Self {
        Self {
            included_status: "Included".to_string(),
        }
    }
}

/// Settings for the random-intercept regression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionConfig {
    /// Maximum EM iterations before the fit counts as not converged
    pub max_iterations: usize,
    /// Relative log-likelihood change that counts as converged
    pub tolerance: f64,
    /// Covariates entered into the model
    pub covariates: Vec<Covariate>,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-8,
            covariates: vec![
                Covariate::Monetary,
                Covariate::EducationalAttainment,
                Covariate::Electricity,
                Covariate::Sanitation,
                Covariate::DrinkingWater,
            ],
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let bytes = safe_read_bytes(path, "reading configuration")?;
        let text = String::from_utf8_lossy(&bytes);
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("Invalid configuration file {}", path.display()))?;
        Ok(config)
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| AnalysisError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the numeric settings are usable
    pub fn validate(&self) -> Result<()> {
        let threshold = self.burden.threshold;
        if !(threshold > 0.0 && threshold <= 100.0) {
            return Err(AnalysisError::config(format!(
                "burden threshold must be in (0, 100], got {threshold}"
            ))
            .into());
        }
        if !(self.hiv.value_scale.is_finite() && self.hiv.value_scale > 0.0) {
            return Err(AnalysisError::config(format!(
                "value scale must be positive, got {}",
                self.hiv.value_scale
            ))
            .into());
        }
        if self.hiv.min_year > self.hiv.max_year {
            return Err(AnalysisError::config(format!(
                "year range is inverted: {}..={}",
                self.hiv.min_year, self.hiv.max_year
            ))
            .into());
        }
        if !(self.regression.tolerance.is_finite() && self.regression.tolerance > 0.0) {
            return Err(AnalysisError::config(format!(
                "regression tolerance must be positive, got {}",
                self.regression.tolerance
            ))
            .into());
        }
        if self.regression.max_iterations == 0 {
            return Err(AnalysisError::config("regression needs at least one iteration").into());
        }
        Ok(())
    }
}

//! Pipeline runner
//!
//! Loads the configured sources once and passes the immutable tables through
//! the analysis stages. [`Pipeline::analyze`] does no I/O, so the stages can
//! be driven from in-memory tables as well.

use std::path::Path;

use chrono::Utc;
use indicatif::ProgressBar;
use log::info;

use crate::algorithm::burden::{BurdenAggregator, regional_totals, yearly_trend};
use crate::algorithm::merge::{attach_mortality, merge_datasets};
use crate::algorithm::statistics::summarize;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::models::{MortalityObservation, MortalityProfile, Observation, PovertyRecord};
use crate::report::{AnalysisReport, BurdenTables, MergeSummary, SourceSummary};
use crate::source::{DatasetSource, HivSource, LoadedTable, MortalitySource, PovertySource};
use crate::utils::logging::{log_stage, set_stage};

/// The canonical tables the analysis starts from
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    pub hiv: LoadedTable<Observation>,
    pub poverty: LoadedTable<PovertyRecord>,
    pub mortality: Option<LoadedTable<MortalityObservation>>,
}

/// Runs the whole analysis for one configuration
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: AnalysisConfig,
    progress: Option<ProgressBar>,
}

fn required_path<'a>(path: Option<&'a Path>, name: &str) -> Result<&'a Path> {
    path.ok_or_else(|| AnalysisError::config(format!("no {name} input file given")).into())
}

impl Pipeline {
    /// Create a pipeline for a validated configuration
    #[must_use]
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    /// Show stage names on a spinner
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load every configured source
    pub fn load(&self) -> Result<PipelineInputs> {
        let config = &self.config;
        let hiv_path = required_path(config.hiv_path.as_deref(), "HIV")?;
        let poverty_path = required_path(config.poverty_path.as_deref(), "poverty")?;

        set_stage(self.progress.as_ref(), "Loading HIV data");
        let hiv = HivSource::new(config.hiv.clone()).load(hiv_path)?;

        set_stage(self.progress.as_ref(), "Loading poverty data");
        let poverty = PovertySource::new(config.poverty.clone()).load(poverty_path)?;

        let mortality = match config.mortality_path.as_deref() {
            Some(path) => {
                set_stage(self.progress.as_ref(), "Loading mortality data");
                Some(MortalitySource::new(config.mortality.clone()).load(path)?)
            }
            None => {
                info!("No mortality file configured; skipping mortality covariates");
                None
            }
        };

        Ok(PipelineInputs {
            hiv,
            poverty,
            mortality,
        })
    }

    /// Run every analysis stage over loaded tables
    #[must_use]
    pub fn analyze(&self, inputs: PipelineInputs) -> AnalysisReport {
        let config = &self.config;
        let observations = &inputs.hiv.records;

        set_stage(self.progress.as_ref(), "Ranking burden");
        let aggregator = BurdenAggregator::new(config.burden.threshold);
        let burden = BurdenTables {
            threshold: aggregator.threshold(),
            ranking: aggregator.rank(observations),
            global: aggregator.global(observations),
            regional: aggregator.by_group(observations),
            regional_totals: regional_totals(observations),
            yearly_trend: yearly_trend(observations),
        };
        log_stage("High-burden countries", burden.global.len(), "entities");

        set_stage(self.progress.as_ref(), "Merging tables");
        let outcome = merge_datasets(observations, &inputs.poverty.records);
        let (records, mortality_join) = match &inputs.mortality {
            Some(mortality) => {
                let profiles = MortalityProfile::collect(&mortality.records);
                let (records, stats) = attach_mortality(&outcome.records, &profiles);
                (records, Some(stats))
            }
            None => (outcome.records, None),
        };
        log_stage("Merged table", records.len(), "countries");

        set_stage(self.progress.as_ref(), "Fitting statistics");
        let statistics = summarize(&records, config);

        AnalysisReport {
            generated_at: Utc::now(),
            sources: SourceSummary {
                hiv: inputs.hiv.stats,
                poverty: inputs.poverty.stats,
                mortality: inputs.mortality.map(|table| table.stats),
            },
            burden,
            merge: MergeSummary {
                records,
                poverty_join: outcome.stats,
                mortality_join,
            },
            statistics,
        }
    }

    /// Load the sources and analyze them
    pub fn run(&self) -> Result<AnalysisReport> {
        let inputs = self.load()?;
        Ok(self.analyze(inputs))
    }
}

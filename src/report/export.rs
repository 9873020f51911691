//! Writing the report tables to disk
//!
//! Tables go out as CSV for chart and map tooling, the two main tables also as
//! Parquet, and the whole report as JSON.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::Serialize;

use crate::error::util::ensure_output_dir;
use crate::error::{AnalysisError, Result};
use crate::models::{ArrowSchema, BurdenEntry};
use crate::report::AnalysisReport;
use crate::report::text::render_text;

/// Paths of the files one run wrote
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputFiles {
    pub files: Vec<PathBuf>,
}

impl OutputFiles {
    fn push(&mut self, path: PathBuf) {
        log::debug!("Wrote {}", path.display());
        self.files.push(path);
    }

    fn csv<T: Serialize>(&mut self, dir: &Path, name: &str, rows: &[T]) -> Result<()> {
        let path = dir.join(name);
        write_csv(&path, rows)?;
        self.push(path);
        Ok(())
    }
}

/// Write rows as a CSV table with a header
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(AnalysisError::Csv)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(AnalysisError::Csv)
            .with_context(|| format!("Failed to write a row to {}", path.display()))?;
    }
    writer
        .flush()
        .map_err(AnalysisError::Io)
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

/// Write models as a single-batch Parquet file
pub fn write_parquet<T: ArrowSchema>(path: &Path, rows: &[T]) -> Result<()> {
    let batch = T::to_record_batch(rows)?;
    let file = File::create(path)
        .map_err(AnalysisError::Io)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), Some(props)).map_err(AnalysisError::Parquet)?;
    writer.write(&batch).map_err(AnalysisError::Parquet)?;
    writer.close().map_err(AnalysisError::Parquet)?;
    Ok(())
}

/// Write every output table of a report into `dir`
pub fn write_outputs(report: &AnalysisReport, dir: &Path) -> Result<OutputFiles> {
    ensure_output_dir(dir)?;
    let mut written = OutputFiles::default();
    let burden = &report.burden;

    let regional: Vec<BurdenEntry> = burden
        .regional
        .iter()
        .flat_map(|group| group.entries.iter().cloned())
        .collect();

    written.csv(dir, "burden_global.csv", &burden.global)?;
    written.csv(dir, "burden_regional.csv", &regional)?;
    written.csv(dir, "burden_ranking.csv", &burden.ranking)?;
    written.csv(dir, "regional_totals.csv", &burden.regional_totals)?;
    written.csv(dir, "yearly_trend.csv", &burden.yearly_trend)?;
    written.csv(dir, "merged.csv", &report.merge.records)?;
    written.csv(dir, "correlations.csv", &report.statistics.correlations)?;
    written.csv(dir, "descriptives.csv", &report.statistics.descriptives)?;

    let path = dir.join("merged.parquet");
    write_parquet(&path, &report.merge.records)?;
    written.push(path);

    let path = dir.join("burden_global.parquet");
    write_parquet(&path, &burden.global)?;
    written.push(path);

    let path = dir.join("summary.json");
    std::fs::write(&path, report.to_json()?)
        .map_err(AnalysisError::Io)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    written.push(path);

    let path = dir.join("report.txt");
    std::fs::write(&path, render_text(report))
        .map_err(AnalysisError::Io)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    written.push(path);

    log::info!(
        "Wrote {} output files to {}",
        written.files.len(),
        dir.display()
    );
    Ok(written)
}

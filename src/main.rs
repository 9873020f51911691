use clap::Parser;
use log::info;
use std::time::Instant;

use burden_report::Result;
use burden_report::cli::{Cli, OutputFormat};
use burden_report::pipeline::Pipeline;
use burden_report::report::{render_text, write_outputs};
use burden_report::utils::logging::{create_spinner, finish_and_clear};

fn main() -> Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    let output_dir = config.output_dir.clone();

    let start = Instant::now();
    let spinner = create_spinner(Some("Starting analysis"));
    let pipeline = Pipeline::new(config).with_progress(spinner.clone());

    let report = pipeline.run();
    finish_and_clear(&spinner);
    let report = report?;

    let written = write_outputs(&report, &output_dir)?;
    info!(
        "Analysis finished in {:?}; {} files in {}",
        start.elapsed(),
        written.files.len(),
        output_dir.display()
    );

    match cli.format {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}

//! CLI Command Implementations

use std::path::Path;

use log::info;

use crate::cli::Cli;
use crate::engine::{Pipeline, RunReport};
use crate::error::{ConvolvoError, Result};

/// Check both inputs exist, then run the pipeline
pub fn convolve_files(cli: &Cli) -> Result<RunReport> {
    for path in [&cli.input, &cli.impulse] {
        ensure_readable(path)?;
    }

    let pipeline = Pipeline::new(cli.pipeline_config()?);
    let config = pipeline.config();
    info!("Using {:?} convolution, {:?} header layout", config.method, config.header_layout);

    let report = pipeline.run(&cli.input, &cli.impulse, &cli.output)?;

    println!(
        "Input signal: {} samples, impulse response: {} samples",
        report.input_samples, report.impulse_samples
    );
    println!(
        "Output: {} ({} samples)",
        report.output.display(),
        report.output_samples
    );

    Ok(report)
}

fn ensure_readable(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(ConvolvoError::FileNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }
    Ok(())
}

//! CLI Module
//!
//! Command-line interface for the Convolvo pipeline.

pub mod commands;

use clap::Parser;
use std::path::PathBuf;

use crate::dsp::ConvolutionMethod;
use crate::engine::PipelineConfig;
use crate::error::Result;
use crate::wav::HeaderLayout;

/// Convolvo - convolve a WAV recording with an impulse response
#[derive(Parser, Debug)]
#[command(name = "convolvo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Input audio (.wav)
    pub input: PathBuf,

    /// Impulse response (.wav)
    pub impulse: PathBuf,

    /// Output audio (.wav)
    pub output: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Convolution algorithm
    #[arg(short, long, value_enum)]
    pub method: Option<ConvolutionMethod>,

    /// Locate fmt/data by walking the RIFF chunk list instead of fixed offsets
    #[arg(long)]
    pub scan_chunks: bool,

    /// JSON config file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Resolve the pipeline configuration from the config file and flags
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(method) = self.method {
            config.method = method;
        }
        if self.scan_chunks {
            config.header_layout = HeaderLayout::ChunkScan;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_three_positionals() {
        let cli = Cli::try_parse_from(["convolvo", "in.wav", "ir.wav", "out.wav"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("in.wav"));
        assert_eq!(cli.impulse, PathBuf::from("ir.wav"));
        assert_eq!(cli.output, PathBuf::from("out.wav"));
        assert_eq!(cli.pipeline_config().unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_wrong_argument_count_rejected() {
        assert!(Cli::try_parse_from(["convolvo", "in.wav", "ir.wav"]).is_err());
        assert!(Cli::try_parse_from(["convolvo", "a.wav", "b.wav", "c.wav", "d.wav"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "convolvo",
            "--method",
            "fft",
            "--scan-chunks",
            "in.wav",
            "ir.wav",
            "out.wav",
        ])
        .unwrap();

        let config = cli.pipeline_config().unwrap();
        assert_eq!(config.method, ConvolutionMethod::Fft);
        assert_eq!(config.header_layout, HeaderLayout::ChunkScan);
    }
}

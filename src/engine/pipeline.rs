//! Convolution Pipeline
//!
//! decode input + impulse → convolve → normalize → encode.
//!
//! The output takes the input's channel count, bit depth and sample rate;
//! only the impulse's samples are used. Nothing touches the output path
//! until every computation stage has succeeded.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::dsp::{ConvolutionMethod, Convolver, Normalizer};
use crate::engine::buffer::DecodedWav;
use crate::engine::config::PipelineConfig;
use crate::error::{Result, Stage};
use crate::wav::{PcmFormat, WavDecoder, WavEncoder, WavHeader};

/// Output of [`Pipeline::process`], ready to encode
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub format: PcmFormat,
    pub samples: Vec<i16>,
    pub input_peak: i16,
    pub result_peak: f64,
}

/// Summary of a completed [`Pipeline::run`]
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub output: PathBuf,
    pub method: ConvolutionMethod,
    pub input_samples: usize,
    pub impulse_samples: usize,
    pub output_samples: usize,
    pub input_peak: i16,
    pub result_peak: f64,
    pub header: WavHeader,
}

/// Convolves one WAV file with another
#[derive(Debug, Clone, Copy, Default)]
pub struct Pipeline {
    config: PipelineConfig,
    decoder: WavDecoder,
    convolver: Convolver,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Pipeline {
            config,
            decoder: WavDecoder::with_layout(config.header_layout),
            convolver: Convolver::new(config.method),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Convolve and normalize two decoded files in memory
    ///
    /// # Errors
    /// * `InvalidArgument` - if either file has no samples
    /// * `DegenerateSignal` - if the convolution result peaks at zero
    pub fn process(&self, input: &DecodedWav, impulse: &DecodedWav) -> Result<Rendered> {
        let result = self.convolve(input, impulse)?;
        self.normalize(input, &result)
    }

    /// Convolve `input_path` with `impulse_path` and write `output_path`
    ///
    /// Each failure carries the stage and the file it concerns. The output
    /// file is written atomically after convolution and normalization have
    /// succeeded, so a failed run leaves no partial output behind.
    pub fn run<P, Q, R>(&self, input_path: P, impulse_path: Q, output_path: R) -> Result<RunReport>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        R: AsRef<Path>,
    {
        let input_path = input_path.as_ref();
        let impulse_path = impulse_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            "Convolving {} with {}",
            input_path.display(),
            impulse_path.display()
        );

        let input = self
            .decoder
            .read_wav(input_path)
            .map_err(|e| e.in_stage(Stage::DecodeInput, input_path.display().to_string()))?;
        let impulse = self
            .decoder
            .read_wav(impulse_path)
            .map_err(|e| e.in_stage(Stage::DecodeImpulse, impulse_path.display().to_string()))?;

        info!(
            "Input signal: {} samples, impulse response: {} samples",
            input.samples().len(),
            impulse.samples().len()
        );

        let result = self.convolve(&input, &impulse).map_err(|e| {
            e.in_stage(
                Stage::Convolve,
                format!("{} * {}", input_path.display(), impulse_path.display()),
            )
        })?;
        let rendered = self
            .normalize(&input, &result)
            .map_err(|e| e.in_stage(Stage::Normalize, input_path.display().to_string()))?;

        let header = WavEncoder::new(rendered.format)
            .write_wav(output_path, &rendered.samples)
            .map_err(|e| e.in_stage(Stage::Encode, output_path.display().to_string()))?;

        let report = RunReport {
            output: output_path.to_path_buf(),
            method: self.config.method,
            input_samples: input.samples().len(),
            impulse_samples: impulse.samples().len(),
            output_samples: rendered.samples.len(),
            input_peak: rendered.input_peak,
            result_peak: rendered.result_peak,
            header,
        };

        info!(
            "Wrote {} samples to {} ({} ch, {} Hz, {}-bit)",
            report.output_samples,
            output_path.display(),
            header.channels(),
            header.sample_rate(),
            header.bits_per_sample()
        );

        Ok(report)
    }

    // ========================================================================
    // Stages
    // ========================================================================

    fn convolve(&self, input: &DecodedWav, impulse: &DecodedWav) -> Result<Vec<f64>> {
        let x: Vec<f64> = input.samples().to_real();
        let h: Vec<f64> = impulse.samples().to_real();
        self.convolver.convolve(&x, &h)
    }

    fn normalize(&self, input: &DecodedWav, result: &[f64]) -> Result<Rendered> {
        let format = input.header().format();
        let normalized =
            Normalizer::new(format.bit_depth).normalize(input.samples(), result)?;

        debug!(
            "Rendered {} samples as {}-bit",
            normalized.samples.len(),
            format.bit_depth.bits()
        );

        Ok(Rendered {
            format,
            samples: normalized.samples,
            input_peak: normalized.input_peak,
            result_peak: normalized.result_peak,
        })
    }
}

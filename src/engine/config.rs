//! Pipeline configuration
//!
//! Settings can come from a JSON file; command-line flags override them.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dsp::ConvolutionMethod;
use crate::error::{ConvolvoError, Result};
use crate::wav::HeaderLayout;

/// Configuration for a convolution run
///
/// ```json
/// { "method": "fft", "header_layout": "chunk_scan" }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Convolution algorithm (default: direct)
    pub method: ConvolutionMethod,
    /// How input headers are located (default: canonical 44-byte layout)
    pub header_layout: HeaderLayout,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: ConvolutionMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_header_layout(mut self, layout: HeaderLayout) -> Self {
        self.header_layout = layout;
        self
    }

    /// Parse a configuration from JSON; missing keys keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ConvolvoError::Config {
            reason: e.to_string(),
            source: Some(e),
        })
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConvolvoError::Config {
            reason: format!("cannot read {}: {}", path.display(), e),
            source: None,
        })?;
        Self::from_json_str(&text)
    }
}

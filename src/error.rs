//! Error handling for Convolvo
//!
//! Every stage returns a typed failure; nothing is recovered internally.
//! The pipeline wraps stage failures with the stage name and file path.

use std::fmt;

use thiserror::Error;

/// Result type alias for Convolvo operations
pub type Result<T> = std::result::Result<T, ConvolvoError>;

/// Pipeline stage a failure originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    DecodeInput,
    DecodeImpulse,
    Convolve,
    Normalize,
    Encode,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::DecodeInput => "decoding input",
            Stage::DecodeImpulse => "decoding impulse response",
            Stage::Convolve => "convolution",
            Stage::Normalize => "normalization",
            Stage::Encode => "encoding output",
        };
        f.write_str(name)
    }
}

/// Main error type for Convolvo operations
#[derive(Error, Debug)]
pub enum ConvolvoError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Malformed WAV data: {reason}")]
    MalformedWav { reason: String },

    // Processing Errors
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Degenerate signal: {reason}")]
    DegenerateSignal { reason: String },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    Config {
        reason: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Stage context
    #[error("{stage} failed for '{path}': {source}")]
    Stage {
        stage: Stage,
        path: String,
        #[source]
        source: Box<ConvolvoError>,
    },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvolvoError {
    /// Shorthand for a `MalformedWav` error
    pub fn malformed(reason: impl Into<String>) -> Self {
        ConvolvoError::MalformedWav {
            reason: reason.into(),
        }
    }

    /// Attach the failing stage and file path to this error
    pub fn in_stage(self, stage: Stage, path: impl Into<String>) -> Self {
        ConvolvoError::Stage {
            stage,
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// The underlying typed error, with any stage context removed
    pub fn root_cause(&self) -> &ConvolvoError {
        match self {
            ConvolvoError::Stage { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// The stage this error was raised in, if known
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ConvolvoError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ConvolvoError::FileNotFound { .. } => "FILE_NOT_FOUND",
            ConvolvoError::MalformedWav { .. } => "MALFORMED_WAV",
            ConvolvoError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            ConvolvoError::DegenerateSignal { .. } => "DEGENERATE_SIGNAL",
            ConvolvoError::Config { .. } => "CONFIG_ERROR",
            ConvolvoError::Stage { source, .. } => source.error_code(),
            ConvolvoError::Io(_) => "IO_ERROR",
        }
    }

    /// Check if the user can fix this error by changing the inputs
    pub fn is_recoverable(&self) -> bool {
        match self.root_cause() {
            ConvolvoError::FileNotFound { .. } => true,
            ConvolvoError::MalformedWav { .. } => true,
            ConvolvoError::DegenerateSignal { .. } => true,
            ConvolvoError::Config { .. } => true,
            _ => false,
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self.root_cause() {
            ConvolvoError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            ConvolvoError::MalformedWav { .. } => vec![
                "Only uncompressed 8-bit or 16-bit PCM WAV is supported",
                "Re-export the file with a canonical 44-byte header",
                "Try --scan-chunks if the file carries LIST or fact chunks",
            ],
            ConvolvoError::DegenerateSignal { .. } => vec![
                "The convolution result has no positive peak",
                "Check that neither input is silent",
            ],
            ConvolvoError::Config { .. } => vec![
                "Check the config file is valid JSON",
                "Valid methods: direct, fft",
            ],
            _ => vec![],
        }
    }
}

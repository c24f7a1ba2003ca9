//! Error types for calltrack
//!
//! Only the tracker itself raises these. Failures produced by wrapped work
//! keep their own type and are never converted into [`Error`].

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building trackers, describing calls, or
/// handing records to a telemetry sink
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Construction Errors
    // =========================================================================
    /// Tracking was requested without a telemetry sink
    #[error("Telemetry sink is required for a tracking service")]
    MissingSink,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // =========================================================================
    // Argument Errors
    // =========================================================================
    /// A required call parameter was blank or malformed
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// Request URI could not be parsed
    #[error("Invalid request URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    // =========================================================================
    // Sink Errors
    // =========================================================================
    /// The sink could not accept the record
    #[error("Telemetry sink unavailable: {0}")]
    SinkUnavailable(String),

    /// Record serialization failed
    #[error("Telemetry serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Prometheus registry error
    #[error("Prometheus metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl Error {
    /// Shorthand for an [`Error::InvalidArgument`].
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Returns true for errors raised while validating call parameters.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument { .. } | Error::InvalidUri { .. })
    }
}

//! Error types for the verdict library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using verdict's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while collecting telemetry or building a report.
///
/// The scoring and aggregation math itself is total and never errors;
/// failures only arise at the I/O, configuration, and collector
/// boundaries.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input file not found.
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A raw attempt carried a non-finite metric. Raised at the collector
    /// boundary so garbage never reaches the scoring math.
    #[error("Invalid metric {field}: {value}")]
    InvalidMetric { field: &'static str, value: f64 },

    /// A raw attempt declared a schema version this build does not read.
    #[error("Unsupported attempt schema version {found} (supported: {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },

    /// Threshold violation (for CI/CD integration).
    #[error("Threshold violation: {message}")]
    ThresholdViolation { message: String, score: f64 },
}

impl Error {
    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a threshold violation error.
    pub fn threshold_violation(message: impl Into<String>, score: f64) -> Self {
        Self::ThresholdViolation {
            message: message.into(),
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidMetric {
            field: "durationMs",
            value: f64::NAN,
        };
        assert_eq!(err.to_string(), "Invalid metric durationMs: NaN");

        let err = Error::FileNotFound {
            path: PathBuf::from("attempts.json"),
        };
        assert_eq!(err.to_string(), "File not found: attempts.json");
    }

    #[test]
    fn test_threshold_violation() {
        let err = Error::threshold_violation("Score below minimum", 45.0);
        match err {
            Error::ThresholdViolation { message, score } => {
                assert_eq!(message, "Score below minimum");
                assert!((score - 45.0).abs() < f64::EPSILON);
            }
            _ => panic!("Expected ThresholdViolation"),
        }
    }
}

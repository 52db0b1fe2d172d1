//! Error types for a3s-marking
//!
//! Detection and policy decisions never fail. Errors only come from compiling
//! custom patterns, loading configuration, and writing to audit sinks.

use thiserror::Error;

/// Errors that can occur around the classification engine
#[derive(Debug, Error)]
pub enum MarkingError {
    /// A marking pattern failed to compile
    #[error("Invalid marking pattern '{family}': {reason}")]
    InvalidPattern {
        family: String,
        reason: String,
    },

    /// Configuration is malformed or out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Audit sink failed to accept a record
    #[error("Audit sink '{sink}' failed: {reason}")]
    Audit {
        sink: String,
        reason: String,
    },
}

/// Result type alias for marking operations
pub type Result<T> = std::result::Result<T, MarkingError>;

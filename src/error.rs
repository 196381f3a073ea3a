//! Error types for schema comparison

use thiserror::Error;

/// Result type for comparison operations
pub type Result<T> = std::result::Result<T, CompareError>;

/// Comparison errors
///
/// A `false` verdict is never an error. These variants describe situations
/// where no trustworthy verdict exists: a broken rule chain, a relation the
/// active rules cannot decide, or input that could not be turned into nodes.
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Rule chain integrity violated: rule `{rule}` called next() more than once")]
    RuleChainIntegrity { rule: String },

    #[error("Rule chain exhausted without a verdict comparing {left} and {right}")]
    ChainExhausted { left: String, right: String },

    #[error("Cannot determine compatibility between {higher} and {lower}")]
    UndeterminedCompatibility { higher: String, lower: String },

    #[error("Unrecognized schema kind: {0}")]
    UnrecognizedKind(String),

    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    #[error("Invalid schema document: {0}")]
    InvalidDocument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

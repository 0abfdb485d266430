//! Error types for the flight recorder

use thiserror::Error;

/// Main error type for the flight recorder
#[derive(Error, Debug)]
pub enum FlightRecorderError {
    /// I/O error (destination files, capture files, configuration files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decode error when reading capture events
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML decode error when loading configuration
    #[error("Configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid configuration (missing or unknown cleanup policy, bad values)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid start recording command
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Failure reported by the profiling engine
    #[error("Engine error: {0}")]
    Engine(String),

    /// Trigger expression could not be parsed or evaluated
    #[error("Failed to evaluate expression '{expression}': {message}")]
    Expression {
        /// Expression text
        expression: String,
        /// Error message
        message: String,
    },
}

/// Result type alias for flight recorder operations
pub type Result<T> = std::result::Result<T, FlightRecorderError>;

impl FlightRecorderError {
    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid command error
    pub fn invalid_command(msg: impl Into<String>) -> Self {
        Self::InvalidCommand(msg.into())
    }

    /// Create an engine error
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Create an expression error
    pub fn expression(expression: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Expression {
            expression: expression.into(),
            message: msg.into(),
        }
    }
}

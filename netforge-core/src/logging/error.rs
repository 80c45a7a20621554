//! Error types for the logging subsystem

use std::fmt;

/// Errors raised while setting up logging
#[derive(Debug, Clone)]
pub enum LoggingError {
    /// A global subscriber was already installed, or the filter was rejected
    InitializationFailed(String),
    /// Settings that cannot be turned into a subscriber
    InvalidConfiguration(String),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingError::InitializationFailed(msg) => {
                write!(f, "Failed to initialize logging: {}", msg)
            }
            LoggingError::InvalidConfiguration(msg) => {
                write!(f, "Invalid logging configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for LoggingError {}

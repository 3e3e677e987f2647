//! # Error Types
//!
//! Custom error types for Pad Bus using `thiserror`.
//!
//! Only setup paths (configuration loading) are fallible. Sampling, dispatch
//! and state queries never return errors: a missing platform means zero
//! devices, and out-of-range queries answer with benign defaults.

use thiserror::Error;

/// Main error type for Pad Bus
#[derive(Debug, Error)]
pub enum PadBusError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Pad Bus
pub type Result<T> = std::result::Result<T, PadBusError>;

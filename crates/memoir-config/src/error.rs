//! Error types for settings loading.

use thiserror::Error;

/// Errors returned while loading or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value that does not parse.
    #[error("invalid setting {key}: {message}")]
    InvalidField {
        /// Environment variable name.
        key: &'static str,
        /// What went wrong.
        message: String,
    },
}

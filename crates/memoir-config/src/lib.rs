//! Process settings for the memoir memory layer.
//!
//! Loaded once at startup from environment variables and treated as
//! immutable for the process lifetime. Parsing goes through an
//! injectable lookup so tests never touch the process environment.

mod error;
mod settings;

/// Public error type for settings loading.
pub use error::ConfigError;
/// Immutable process settings.
pub use settings::Settings;

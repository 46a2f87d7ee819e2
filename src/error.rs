//! # Configuration Errors
//!
//! Resolving a configuration never fails: every field has a default. The only
//! fallible step is *reading* configuration from text (TOML, environment
//! variables), and those failures are described here.
//!
//! Failures of the wrapped target are not represented in this crate at all.
//! They stay the caller's own error type and pass through untouched.

/// Errors raised while parsing logging configuration from text.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown log level: {0}")]
    UnknownLogLevel(String),
    #[error("Unknown log point: {0}")]
    UnknownLogPoint(String),
    #[error("Invalid boolean for {key}: {value}")]
    InvalidBool { key: String, value: String },
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

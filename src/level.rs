//! # Severity Levels
//!
//! [`LogLevel`] is the severity a lifecycle record is emitted at. It has six
//! steps, from `Trace` to `Critical`. The default sink maps them onto
//! `tracing` levels, folding `Critical` into `ERROR`, which is the highest
//! level `tracing` knows about.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Severity of a lifecycle record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum LogLevel {
    Trace,
    Debug,
    Information,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// The level used when neither the call site nor the process options set one.
    pub const DEFAULT: LogLevel = LogLevel::Debug;

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "Trace",
            LogLevel::Debug => "Debug",
            LogLevel::Information => "Information",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
            LogLevel::Critical => "Critical",
        }
    }

}

impl Default for LogLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "information" | "info" => Ok(LogLevel::Information),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            "critical" => Ok(LogLevel::Critical),
            _ => Err(ConfigError::UnknownLogLevel(s.to_string())),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, ConfigError> {
        value.parse()
    }
}

//! # Configuration Resolution
//!
//! A wrapper's behaviour is described by four fields: level, lifecycle points,
//! whether a correlation id is attached, and an optional prefix. Each field is
//! looked up in three layers, independently of the others:
//!
//! 1. [`LogSettings`] declared on the call site (method settings beat class settings),
//! 2. process-wide [`LoggingOptions`],
//! 3. the built-in defaults (`Debug`, `BeforeAndAfterAndFinally`, correlation id on, no prefix).
//!
//! The first layer that has a value wins. [`EffectiveConfig::resolve`] is a
//! pure function of its two inputs, so resolving twice always gives the same
//! answer and the result can be cached freely.
//!
//! ```rust
//! use aspect_logging::{EffectiveConfig, LogLevel, LogPoints, LogSettings, LoggingOptions};
//!
//! let settings = LogSettings::new().log_points(LogPoints::FINALLY);
//! let options = LoggingOptions {
//!     log_level: Some(LogLevel::Trace),
//!     log_points: Some(LogPoints::ALL),
//!     ..Default::default()
//! };
//!
//! let config = EffectiveConfig::resolve(Some(&settings), Some(&options));
//! assert_eq!(config.log_points, LogPoints::FINALLY); // from the call site
//! assert_eq!(config.log_level, LogLevel::Trace); // from the options
//! assert!(config.include_correlation_id); // default
//! ```

use crate::error::ConfigError;
use crate::level::LogLevel;
use crate::point::LogPoints;
use serde::Deserialize;
use std::sync::Arc;

/// Environment variable prefix read by [`LoggingOptions::from_env`].
pub const ENV_PREFIX: &str = "ASPECT_LOGGING_";

// =============================================================================
// DECLARATIVE SETTINGS
// =============================================================================

/// Settings attached to one class or method. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    pub log_level: Option<LogLevel>,
    pub log_points: Option<LogPoints>,
    pub include_correlation_id: Option<bool>,
    pub prefix: Option<String>,
}

impl LogSettings {
    pub const fn new() -> Self {
        Self {
            log_level: None,
            log_points: None,
            include_correlation_id: None,
            prefix: None,
        }
    }

    pub const fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    pub const fn log_points(mut self, points: LogPoints) -> Self {
        self.log_points = Some(points);
        self
    }

    pub const fn include_correlation_id(mut self, include: bool) -> Self {
        self.include_correlation_id = Some(include);
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Merges class-level settings (`self`) with method-level settings.
    /// The method wins for every field it sets.
    pub fn overridden_by(&self, method: &LogSettings) -> LogSettings {
        LogSettings {
            log_level: method.log_level.or(self.log_level),
            log_points: method.log_points.or(self.log_points),
            include_correlation_id: method.include_correlation_id.or(self.include_correlation_id),
            prefix: method.prefix.clone().or_else(|| self.prefix.clone()),
        }
    }
}

// =============================================================================
// PROCESS-WIDE OPTIONS
// =============================================================================

/// Process-wide options, bound once at startup.
///
/// Deserializes from any serde source. Field names are accepted in
/// `PascalCase` (as written in most settings files) or `snake_case`:
///
/// ```toml
/// Prefix = "svc"
/// LogLevel = "Information"
/// LogPoints = "Before | Finally"
/// IncludeCorrelationId = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct LoggingOptions {
    #[serde(alias = "prefix")]
    pub prefix: Option<String>,
    #[serde(alias = "log_level")]
    pub log_level: Option<LogLevel>,
    #[serde(alias = "log_points")]
    pub log_points: Option<LogPoints>,
    #[serde(alias = "include_correlation_id")]
    pub include_correlation_id: Option<bool>,
}

impl LoggingOptions {
    /// Parses options from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reads options from `ASPECT_LOGGING_*` environment variables.
    /// Unset variables leave the field empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        let include_correlation_id = match get("INCLUDE_CORRELATION_ID") {
            Some(value) => Some(parse_bool("INCLUDE_CORRELATION_ID", &value)?),
            None => None,
        };

        Ok(Self {
            prefix: get("PREFIX"),
            log_level: get("LOG_LEVEL").map(|v| v.parse::<LogLevel>()).transpose()?,
            log_points: get("LOG_POINTS").map(|v| v.parse::<LogPoints>()).transpose()?,
            include_correlation_id,
        })
    }

    /// Returns `self` with every field that `other` sets replaced.
    pub fn overlay(self, other: LoggingOptions) -> LoggingOptions {
        LoggingOptions {
            prefix: other.prefix.or(self.prefix),
            log_level: other.log_level.or(self.log_level),
            log_points: other.log_points.or(self.log_points),
            include_correlation_id: other.include_correlation_id.or(self.include_correlation_id),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key: format!("{ENV_PREFIX}{key}"),
            value: value.to_string(),
        }),
    }
}

// =============================================================================
// EFFECTIVE CONFIGURATION
// =============================================================================

/// The resolved configuration of one wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub log_level: LogLevel,
    pub log_points: LogPoints,
    pub include_correlation_id: bool,
    pub prefix: Option<Arc<str>>,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::DEFAULT,
            log_points: LogPoints::DEFAULT,
            include_correlation_id: true,
            prefix: None,
        }
    }
}

impl EffectiveConfig {
    /// Merges declarative settings, process options and defaults, field by field.
    pub fn resolve(settings: Option<&LogSettings>, options: Option<&LoggingOptions>) -> Self {
        let defaults = Self::default();

        let log_level = settings
            .and_then(|s| s.log_level)
            .or_else(|| options.and_then(|o| o.log_level))
            .unwrap_or(defaults.log_level);

        let log_points = settings
            .and_then(|s| s.log_points)
            .or_else(|| options.and_then(|o| o.log_points))
            .unwrap_or(defaults.log_points);

        let include_correlation_id = settings
            .and_then(|s| s.include_correlation_id)
            .or_else(|| options.and_then(|o| o.include_correlation_id))
            .unwrap_or(defaults.include_correlation_id);

        let prefix = settings
            .and_then(|s| s.prefix.as_deref())
            .or_else(|| options.and_then(|o| o.prefix.as_deref()))
            .map(Arc::from);

        Self {
            log_level,
            log_points,
            include_correlation_id,
            prefix,
        }
    }
}

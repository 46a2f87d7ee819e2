//! # Lifecycle Points
//!
//! A wrapped call passes through up to four points where a record may be
//! emitted:
//!
//! | Point       | When                                  | Label         |
//! |-------------|---------------------------------------|---------------|
//! | `Before`    | right before the target is invoked    | `OnBefore`    |
//! | `After`     | the target returned `Ok`              | `OnAfter`     |
//! | `Exception` | the target returned `Err`             | `OnException` |
//! | `Finally`   | always, once the call is over         | `OnFinally`   |
//!
//! [`LogPoints`] is the bitset saying which of them are enabled.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

/// A single lifecycle point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogPoint {
    Before,
    After,
    Exception,
    Finally,
}

impl LogPoint {
    /// The label written into the message template.
    pub fn label(&self) -> &'static str {
        match self {
            LogPoint::Before => "OnBefore",
            LogPoint::After => "OnAfter",
            LogPoint::Exception => "OnException",
            LogPoint::Finally => "OnFinally",
        }
    }

    fn bit(self) -> u8 {
        match self {
            LogPoint::Before => 0b0001,
            LogPoint::After => 0b0010,
            LogPoint::Finally => 0b0100,
            LogPoint::Exception => 0b1000,
        }
    }
}

impl fmt::Display for LogPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Set of enabled lifecycle points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct LogPoints(u8);

impl LogPoints {
    pub const NONE: LogPoints = LogPoints(0);
    pub const BEFORE: LogPoints = LogPoints(0b0001);
    pub const AFTER: LogPoints = LogPoints(0b0010);
    pub const FINALLY: LogPoints = LogPoints(0b0100);
    pub const EXCEPTION: LogPoints = LogPoints(0b1000);
    pub const BEFORE_AND_AFTER: LogPoints = LogPoints(0b0011);
    pub const BEFORE_AND_AFTER_AND_FINALLY: LogPoints = LogPoints(0b0111);
    pub const ALL: LogPoints = LogPoints(0b1111);

    /// Enabled when nothing else says otherwise.
    pub const DEFAULT: LogPoints = LogPoints::BEFORE_AND_AFTER_AND_FINALLY;

    pub const fn union(self, other: LogPoints) -> LogPoints {
        LogPoints(self.0 | other.0)
    }

    pub fn contains(&self, point: LogPoint) -> bool {
        self.0 & point.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates the enabled points in lifecycle order.
    pub fn iter(&self) -> impl Iterator<Item = LogPoint> + '_ {
        [
            LogPoint::Before,
            LogPoint::After,
            LogPoint::Exception,
            LogPoint::Finally,
        ]
        .into_iter()
        .filter(move |p| self.contains(*p))
    }
}

impl Default for LogPoints {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<LogPoint> for LogPoints {
    fn from(point: LogPoint) -> Self {
        LogPoints(point.bit())
    }
}

impl BitOr for LogPoints {
    type Output = LogPoints;

    fn bitor(self, rhs: LogPoints) -> LogPoints {
        self.union(rhs)
    }
}

impl BitOr<LogPoint> for LogPoints {
    type Output = LogPoints;

    fn bitor(self, rhs: LogPoint) -> LogPoints {
        self.union(rhs.into())
    }
}

impl BitOrAssign for LogPoints {
    fn bitor_assign(&mut self, rhs: LogPoints) {
        *self = self.union(rhs);
    }
}

impl fmt::Display for LogPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }
        if *self == LogPoints::ALL {
            return f.write_str("All");
        }
        let mut first = true;
        for point in self.iter() {
            if !first {
                f.write_str(" | ")?;
            }
            first = false;
            let name = match point {
                LogPoint::Before => "Before",
                LogPoint::After => "After",
                LogPoint::Exception => "Exception",
                LogPoint::Finally => "Finally",
            };
            f.write_str(name)?;
        }
        Ok(())
    }
}

impl FromStr for LogPoints {
    type Err = ConfigError;

    /// Accepts single names, the named combinations, and `|` or `,` separated unions:
    /// `"Finally"`, `"BeforeAndAfter"`, `"Before | Exception"`, `"before,after"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut points = LogPoints::NONE;
        for part in s.split(['|', ',']) {
            let part = part.trim();
            let named = match part.to_ascii_lowercase().as_str() {
                "none" => LogPoints::NONE,
                "before" => LogPoints::BEFORE,
                "after" => LogPoints::AFTER,
                "finally" => LogPoints::FINALLY,
                "exception" => LogPoints::EXCEPTION,
                "beforeandafter" => LogPoints::BEFORE_AND_AFTER,
                "beforeandafterandfinally" => LogPoints::BEFORE_AND_AFTER_AND_FINALLY,
                "all" => LogPoints::ALL,
                _ => return Err(ConfigError::UnknownLogPoint(part.to_string())),
            };
            points |= named;
        }
        Ok(points)
    }
}

impl TryFrom<String> for LogPoints {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, ConfigError> {
        value.parse()
    }
}

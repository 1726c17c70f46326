//! Severity levels, including the synthetic [`Level::Fatal`], and the [`LevelFilter`] threshold
//! compared against them.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::LoggerError;

/// Severity of a log record.
///
/// Levels are totally ordered: `Debug < Info < Warn < Error < Fatal`. A record is emitted only
/// when its level is greater than or equal to the configured threshold.
///
/// [`Level::Fatal`] sits above the conventional `ERROR` ceiling. Emitting a record at this level
/// terminates the process after the record has been written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Diagnostic detail, suppressed unless debug logging was requested.
    Debug,

    /// Routine operational messages.
    Info,

    /// Something unexpected that does not prevent progress.
    Warn,

    /// A failed operation.
    Error,

    /// An unrecoverable condition; the process exits with status 1 after logging.
    Fatal,
}

impl Level {
    /// All levels in ascending order of severity.
    pub const ALL: [Self; 5] = [Self::Debug, Self::Info, Self::Warn, Self::Error, Self::Fatal];

    /// Returns the display name written to log output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }

    /// Returns the numeric rank of the level.
    ///
    /// Built-in levels are four apart so that intermediate levels could be slotted in;
    /// `Fatal` continues the ladder above `Error`.
    pub const fn rank(self) -> i8 {
        match self {
            Self::Debug => -4,
            Self::Info => 0,
            Self::Warn => 4,
            Self::Error => 8,
            Self::Fatal => 12,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| LoggerError::UnknownLevel(s.to_owned()))
    }
}

/// Minimum [`Level`] a logger lets through, or [`LevelFilter::OFF`] to silence it entirely.
///
/// ```
/// use logf::{Level, LevelFilter};
///
/// assert!(LevelFilter::INFO.allows(Level::Fatal));
/// assert!(!LevelFilter::INFO.allows(Level::Debug));
/// assert!(!LevelFilter::OFF.allows(Level::Fatal));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LevelFilter(Option<Level>);

impl LevelFilter {
    /// Lets every level through.
    pub const DEBUG: Self = Self(Some(Level::Debug));
    /// Suppresses `DEBUG`.
    pub const INFO: Self = Self(Some(Level::Info));
    /// Lets `WARN` and above through.
    pub const WARN: Self = Self(Some(Level::Warn));
    /// Lets `ERROR` and `FATAL` through.
    pub const ERROR: Self = Self(Some(Level::Error));
    /// Lets only `FATAL` through.
    pub const FATAL: Self = Self(Some(Level::Fatal));
    /// Suppresses everything, `FATAL` included.
    pub const OFF: Self = Self(None);

    /// Creates a filter with `level` as its threshold.
    pub const fn from_level(level: Level) -> Self {
        Self(Some(level))
    }

    /// Returns the threshold level, or `None` for [`LevelFilter::OFF`].
    pub const fn into_level(self) -> Option<Level> {
        self.0
    }

    /// Returns `true` if a record at `level` passes the filter.
    #[inline]
    pub fn allows(self, level: Level) -> bool {
        self.0.is_some_and(|threshold| level >= threshold)
    }
}

impl Default for LevelFilter {
    fn default() -> Self {
        Self::INFO
    }
}

impl From<Level> for LevelFilter {
    fn from(level: Level) -> Self {
        Self::from_level(level)
    }
}

impl fmt::Display for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(level) => f.write_str(level.as_str()),
            None => f.write_str("OFF"),
        }
    }
}

impl FromStr for LevelFilter {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("off") {
            Ok(Self::OFF)
        } else {
            s.parse().map(Self::from_level)
        }
    }
}

impl Serialize for LevelFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LevelFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        // `TRACE` has no counterpart and folds into `Debug`
        match level {
            tracing::Level::ERROR => Self::Error,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::INFO => Self::Info,
            _ => Self::Debug,
        }
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

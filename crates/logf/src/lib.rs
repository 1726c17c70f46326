//! `logf` is a leveled, structured logging façade writing one line per record to standard
//! output, either as `key=value` text or as JSON.
//!
//! It offers:
//! - [`init_logging`] to configure the process-wide logger from a debug flag and a format
//!   selector.
//! - Ten logging macros, two per severity: [`debug!`], [`info!`], [`warn!`], [`error!`] and
//!   [`fatal!`] attach key/value attributes to a literal message, while [`debugf!`], [`infof!`],
//!   [`warnf!`], [`errorf!`] and [`fatalf!`] build the message from a format string.
//! - A [`Level::Fatal`] severity above `ERROR`; logging at this level exits the process with
//!   status 1 once the record has been written.
//! - An explicit [`Logger`] handle for callers that prefer passing the logger around over the
//!   global one.
//! - A [`LogfLayer`] that renders [`tracing`] events through the same logger.
//!
//! Every record carries the time, level, call-site location and message:
//!
//! ```text
//! time=2023-07-11T17:12:46.649Z level=INFO source=main.rs:29 msg="Entered main." user="peter"
//! {"time":"2023-07-11T17:05:15.924382Z","level":"INFO","source":{"function":"app::main","file":"main.rs","line":29},"msg":"Entered main.","user":"peter"}
//! ```
//!
//! # Example
//!
//! ```
//! use logf::{display, info, infof};
//!
//! logf::init_logging(false, "text").expect("logging is initialized once");
//!
//! info!("Entered main.", "user" => "peter", "attempt" => 3);
//! infof!("Listening on port {}", 8080);
//!
//! let error = std::io::Error::other("connection reset");
//! logf::warn!("Retrying request", "error" => display(&error));
//! ```
//!
//! # Initialization
//!
//! The global logger can be installed once; later calls to [`init_logging`] or
//! [`set_global_logger`] fail with [`LoggerError::AlreadyInitialized`]. Records logged before
//! initialization go to a default logger at `INFO` level writing JSON.

mod bridge;
mod formatter;
mod level;
mod logger;
mod macros;
mod record;

#[cfg(test)]
mod test_utils;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer};

pub use self::{
    bridge::{LogfLayer, tracing_layer},
    level::{Level, LevelFilter},
    logger::{FATAL_EXIT_CODE, Logger, init_logging, logger, set_global_logger},
    record::{Attributes, DebugValue, DisplayValue, Location, Record, debug, display},
};

mod keys {
    use std::sync::LazyLock;

    use rustc_hash::FxHashSet;

    pub(crate) const TIME: &str = "time";
    pub(crate) const LEVEL: &str = "level";
    pub(crate) const SOURCE: &str = "source";
    pub(crate) const MESSAGE: &str = "msg";

    /// Field holding the message of a `tracing` event.
    pub(crate) const TRACING_MESSAGE: &str = "message";

    pub(crate) static RESERVED_KEYS: LazyLock<FxHashSet<&'static str>> =
        LazyLock::new(|| [TIME, LEVEL, SOURCE, MESSAGE].iter().copied().collect());
}

mod env {
    pub(crate) const DEBUG: &str = "LOGF_DEBUG";
    pub(crate) const FORMAT: &str = "LOGF_FORMAT";
}

/// Output format of log lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Space separated `key=value` pairs.
    Text,

    /// One compact JSON object per line.
    #[default]
    Json,
}

impl LogFormat {
    /// Maps a format selector to a format, permissively.
    ///
    /// The selector is compared with `"text"` ignoring ASCII case; every other value, including
    /// typos and the empty string, selects [`LogFormat::Json`]. Use [`str::parse`] to reject
    /// unknown selectors instead.
    ///
    /// ```
    /// use logf::LogFormat;
    ///
    /// assert_eq!(LogFormat::from_selector("TEXT"), LogFormat::Text);
    /// assert_eq!(LogFormat::from_selector("yaml"), LogFormat::Json);
    /// assert!("yaml".parse::<LogFormat>().is_err());
    /// ```
    pub fn from_selector(selector: &str) -> Self {
        if selector.eq_ignore_ascii_case("text") {
            Self::Text
        } else {
            Self::Json
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Text => "text",
            Self::Json => "json",
        };
        f.write_str(repr)
    }
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("text") {
            Ok(Self::Text)
        } else if s.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else {
            Err(LoggerError::UnknownFormat(s.to_owned()))
        }
    }
}

impl<'de> Deserialize<'de> for LogFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let selector = String::deserialize(deserializer)?;
        Ok(Self::from_selector(&selector))
    }
}

/// Configuration of a [`Logger`].
///
/// Missing fields take their defaults when deserialized:
///
/// ```
/// use logf::{LevelFilter, LogFormat, LoggerConfig};
///
/// let config: LoggerConfig = serde_json::from_str(r#"{ "format": "Text" }"#).unwrap();
/// assert_eq!(config.level, LevelFilter::INFO);
/// assert_eq!(config.format, LogFormat::Text);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Minimum level of emitted records.
    pub level: LevelFilter,

    /// Output format of emitted records.
    pub format: LogFormat,
}

impl LoggerConfig {
    /// Builds a configuration from a debug flag and a format selector.
    ///
    /// `debug = true` lets every level through, `debug = false` suppresses `DEBUG`. The format
    /// selector is interpreted by [`LogFormat::from_selector`].
    pub fn from_flags(debug: bool, format: &str) -> Self {
        Self {
            level: if debug {
                LevelFilter::DEBUG
            } else {
                LevelFilter::INFO
            },
            format: LogFormat::from_selector(format),
        }
    }

    /// Builds a configuration from the `LOGF_DEBUG` and `LOGF_FORMAT` environment variables.
    ///
    /// `LOGF_DEBUG` enables debug logging when set to `1`, `true` or `yes` (ignoring case).
    /// `LOGF_FORMAT` is interpreted by [`LogFormat::from_selector`]; when unset, JSON is used.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let debug = lookup(env::DEBUG).is_some_and(|value| {
            ["1", "true", "yes"]
                .iter()
                .any(|enabled| value.trim().eq_ignore_ascii_case(enabled))
        });
        let format = lookup(env::FORMAT).unwrap_or_default();

        Self::from_flags(debug, format.trim())
    }
}

/// Errors that can occur within the logger.
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// The global logger was already installed.
    #[error("The global logger has already been initialized")]
    AlreadyInitialized,

    /// A format selector other than `text` or `json` was parsed strictly.
    #[error("Unknown log format `{0}`, expected `text` or `json`")]
    UnknownFormat(String),

    /// A level name could not be parsed.
    #[error("Unknown log level `{0}`")]
    UnknownLevel(String),

    /// A flat attribute list did not consist of string keys each followed by a value.
    #[error("Invalid attribute list: {0}")]
    InvalidAttributes(String),

    /// Represents an error during JSON serialization.
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Represents an error while formatting the record timestamp.
    #[error("Timestamp formatting error: {0}")]
    TimeFormatting(#[from] time::error::Format),

    /// Represents an error while writing a record to its destination.
    #[error("Failed to write log record: {0}")]
    Io(#[from] std::io::Error),
}

#[doc(hidden)]
pub mod __private {
    pub use crate::record::function_path;
}

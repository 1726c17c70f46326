//! Building blocks of a log record: the call-site [`Location`], the ordered [`Attributes`] and
//! the [`Record`] handed to a renderer.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;
use time::OffsetDateTime;

use crate::{Level, LoggerError};

/// Source location of a logging call.
///
/// Locations are captured at compile time by the logging macros through [`location!`], so they
/// always point at the line that invoked the macro.
///
/// [`location!`]: crate::location
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    function: &'static str,
    file: &'static str,
    line: u32,
}

impl Location {
    /// Creates a location from its parts.
    pub const fn new(function: &'static str, file: &'static str, line: u32) -> Self {
        Self {
            function,
            file,
            line,
        }
    }

    /// Fully qualified path of the enclosing function, e.g. `my_crate::server::run`.
    pub const fn function(&self) -> &'static str {
        self.function
    }

    /// Path of the source file as reported by the compiler.
    pub const fn file(&self) -> &'static str {
        self.file
    }

    /// Source file with its directories stripped.
    pub fn file_name(&self) -> &'static str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file)
    }

    /// One-based line number.
    pub const fn line(&self) -> u32 {
        self.line
    }
}

/// Ordered key/value pairs attached to a record.
///
/// Values are stored as [`serde_json::Value`]s, so anything implementing [`Serialize`] can be
/// attached. A value that fails to serialize is replaced with the string
/// `"<unserializable: {error}>"` instead of dropping the record.
///
/// Error types usually do not implement [`Serialize`]; attach them through [`display`] (or
/// [`debug()`]) instead:
///
/// ```
/// use logf::{Attributes, display};
///
/// let error = std::io::Error::other("disk full");
/// let attributes = Attributes::new()
///     .with("path", "/var/lib/data")
///     .with("error", display(&error));
///
/// let keys: Vec<&str> = attributes.iter().map(|(key, _)| key).collect();
/// assert_eq!(keys, ["path", "error"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<(String, Value)>,
}

impl Attributes {
    /// Creates an empty attribute list.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a pair, returning `self` for chaining.
    #[must_use]
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Serialize,
    {
        self.push(key, &value);
        self
    }

    /// Appends a pair after converting the value to JSON.
    pub fn push<K, V>(&mut self, key: K, value: &V)
    where
        K: Into<String>,
        V: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value)
            .unwrap_or_else(|error| Value::String(format!("<unserializable: {error}>")));
        self.push_value(key, value);
    }

    /// Appends a pair whose value is already a JSON value.
    pub fn push_value(&mut self, key: impl Into<String>, value: Value) {
        self.entries.push((key.into(), value));
    }

    /// Builds attributes from a flat list of alternating keys and values.
    ///
    /// Fails if a key is not a JSON string or if the last key has no value, rather than silently
    /// dropping the dangling element.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidAttributes`] on malformed input.
    pub fn try_from_flat(values: impl IntoIterator<Item = Value>) -> Result<Self, LoggerError> {
        let mut attributes = Self::new();
        let mut values = values.into_iter();

        while let Some(key) = values.next() {
            let key = match key {
                Value::String(key) => key,
                other => {
                    return Err(LoggerError::InvalidAttributes(format!(
                        "expected a string key, found `{other}`"
                    )));
                }
            };
            let Some(value) = values.next() else {
                return Err(LoggerError::InvalidAttributes(format!(
                    "key `{key}` has no value"
                )));
            };
            attributes.push_value(key, value);
        }

        Ok(attributes)
    }

    /// Iterates over the pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no pairs were attached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Serialize,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (key, value) in iter {
            attributes.push(key, &value);
        }
        attributes
    }
}

/// Attribute value serialized through its [`fmt::Display`] implementation.
#[derive(Clone, Copy, Debug)]
pub struct DisplayValue<T>(T);

/// Attribute value serialized through its [`fmt::Debug`] implementation.
#[derive(Clone, Copy, Debug)]
pub struct DebugValue<T>(T);

/// Wraps a value so it is attached as its `Display` string.
pub fn display<T: fmt::Display>(value: T) -> DisplayValue<T> {
    DisplayValue(value)
}

/// Wraps a value so it is attached as its `Debug` string.
pub fn debug<T: fmt::Debug>(value: T) -> DebugValue<T> {
    DebugValue(value)
}

impl<T: fmt::Display> Serialize for DisplayValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<T: fmt::Debug> Serialize for DebugValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{:?}", self.0))
    }
}

/// A single log record, built per call and dropped once rendered.
#[derive(Clone, Copy, Debug)]
pub struct Record<'a> {
    /// Capture time, UTC.
    pub time: OffsetDateTime,

    /// Severity of the record.
    pub level: Level,

    /// Call site that produced the record.
    pub location: Location,

    /// Literal or formatted message.
    pub message: &'a str,

    /// Attached key/value pairs, empty for formatted calls.
    pub attributes: &'a Attributes,
}

impl<'a> Record<'a> {
    /// Creates a record stamped with the current time.
    pub fn new(
        level: Level,
        location: Location,
        message: &'a str,
        attributes: &'a Attributes,
    ) -> Self {
        Self {
            time: OffsetDateTime::now_utc(),
            level,
            location,
            message,
            attributes,
        }
    }
}

/// Reduces the type name of a probe function to the path of the function that declared it.
///
/// Closures nested in the enclosing function are folded into it.
#[doc(hidden)]
pub fn function_path(probe: &'static str) -> &'static str {
    let mut name = probe.strip_suffix("::__logf_probe").unwrap_or(probe);
    while let Some(outer) = name.strip_suffix("::{{closure}}") {
        name = outer;
    }
    name
}

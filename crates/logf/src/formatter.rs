//! Renders [`Record`]s into single output lines, either as `key=value` text or as JSON objects.
//!
//! Both renderers rewrite the well-known fields the same way: the source location is reduced to
//! the file basename and line (plus the function in JSON), and the level is written through the
//! [`Level`](crate::Level) name table so that `FATAL` gets its own name. Attributes whose key
//! collides with one of those fields are kept, under an `attr.` prefix.

use std::{borrow::Cow, io::Write};

use serde::{
    Serialize,
    ser::{SerializeMap, Serializer},
};
use serde_json::Value;
use time::{
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::{Attributes, LogFormat, LoggerError, Record, keys};

/// Timestamp layout of text lines: RFC 3339 in UTC with millisecond precision.
const TEXT_TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
);

/// Prepended to attribute keys that collide with a field written by the renderer.
const COLLIDING_KEY_PREFIX: &str = "attr.";

/// Nested `source` object of JSON lines.
#[derive(Serialize)]
struct Source {
    function: &'static str,
    file: &'static str,
    line: u32,
}

impl LogFormat {
    /// Renders a record into a single line, without the trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError`] if the timestamp or a value cannot be formatted.
    pub fn render(self, record: &Record<'_>) -> Result<Vec<u8>, LoggerError> {
        match self {
            Self::Text => render_text(record),
            Self::Json => render_json(record),
        }
    }
}

fn render_json(record: &Record<'_>) -> Result<Vec<u8>, LoggerError> {
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::new(&mut buffer);
    let mut map_serializer = serializer.serialize_map(None)?;

    let source = Source {
        function: record.location.function(),
        file: record.location.file_name(),
        line: record.location.line(),
    };

    map_serializer.serialize_entry(keys::TIME, &record.time.format(&Rfc3339)?)?;
    map_serializer.serialize_entry(keys::LEVEL, record.level.as_str())?;
    map_serializer.serialize_entry(keys::SOURCE, &source)?;
    map_serializer.serialize_entry(keys::MESSAGE, record.message)?;

    for (key, value) in user_attributes(record.attributes) {
        map_serializer.serialize_entry(key.as_ref(), value)?;
    }

    map_serializer.end()?;
    Ok(buffer)
}

fn render_text(record: &Record<'_>) -> Result<Vec<u8>, LoggerError> {
    let mut buffer = Vec::new();

    write!(
        buffer,
        "{}={} {}={} {}={}:{} {}=",
        keys::TIME,
        record.time.format(TEXT_TIME_FORMAT)?,
        keys::LEVEL,
        record.level,
        keys::SOURCE,
        record.location.file_name(),
        record.location.line(),
        keys::MESSAGE,
    )?;
    serde_json::to_writer(&mut buffer, record.message)?;

    for (key, value) in user_attributes(record.attributes) {
        buffer.push(b' ');
        write_text_key(&mut buffer, &key)?;
        buffer.push(b'=');
        write_text_value(&mut buffer, value)?;
    }

    Ok(buffer)
}

/// Attributes in caller order, with keys that would shadow a field written by the renderer moved
/// under [`COLLIDING_KEY_PREFIX`].
fn user_attributes(attributes: &Attributes) -> impl Iterator<Item = (Cow<'_, str>, &Value)> {
    attributes.iter().map(|(key, value)| {
        if keys::RESERVED_KEYS.contains(key) {
            (Cow::Owned(format!("{COLLIDING_KEY_PREFIX}{key}")), value)
        } else {
            (Cow::Borrowed(key), value)
        }
    })
}

fn write_text_key(buffer: &mut Vec<u8>, key: &str) -> Result<(), LoggerError> {
    if needs_quoting(key) {
        serde_json::to_writer(&mut *buffer, key)?;
    } else {
        buffer.extend_from_slice(key.as_bytes());
    }
    Ok(())
}

fn write_text_value(buffer: &mut Vec<u8>, value: &Value) -> Result<(), LoggerError> {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            serde_json::to_writer(&mut *buffer, value)?;
        }
        // Nested values are embedded as a quoted JSON document so the line stays splittable on
        // spaces.
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_writer(&mut *buffer, &value.to_string())?;
        }
    }
    Ok(())
}

fn needs_quoting(key: &str) -> bool {
    key.is_empty()
        || key
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '=' || c == '"')
}

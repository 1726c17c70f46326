//! Provides a [`tracing_subscriber::Layer`] ([`LogfLayer`]) rendering [`tracing`] events through
//! a [`Logger`], so that libraries instrumented with `tracing` produce the same lines, under the
//! same threshold, as the logging macros.

use std::{fmt, sync::Arc};

use serde_json::Value;
use tracing::{
    Event, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{Layer, layer::Context};

use crate::{Attributes, Level, Location, Logger, Record, keys};

/// A [`tracing_subscriber::Layer`] that writes events through a [`Logger`].
///
/// Event levels map onto [`Level`]s (`TRACE` becomes `DEBUG`), the `message` field becomes the
/// record message and the remaining fields become attributes, in the order they were recorded.
/// Events never exit the process: `tracing` has no level above `ERROR`.
///
/// ```
/// use std::sync::Arc;
///
/// use logf::{LogfLayer, Logger, LoggerConfig};
/// use tracing_subscriber::layer::SubscriberExt;
///
/// let logger = Arc::new(Logger::new(LoggerConfig::from_flags(false, "text")));
/// let subscriber = tracing_subscriber::registry().with(LogfLayer::new(logger));
///
/// tracing::subscriber::with_default(subscriber, || {
///     tracing::info!(user = "peter", "Entered main.");
/// });
/// ```
#[derive(Clone, Debug)]
pub struct LogfLayer {
    logger: Arc<Logger>,
}

impl LogfLayer {
    /// Creates a layer writing through `logger`.
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

/// Returns a layer writing through the global logger.
///
/// Call it after [`init_logging`](crate::init_logging): the layer keeps the logger that was
/// global at the time it was created.
pub fn tracing_layer() -> LogfLayer {
    LogfLayer::new(Arc::clone(crate::logger::global_handle()))
}

/// Message and attributes collected from the fields of an event.
#[derive(Debug, Default)]
struct EventFields {
    message: Option<String>,
    attributes: Attributes,
}

impl EventFields {
    fn record_value(&mut self, field: &Field, value: Value) {
        match field.name() {
            keys::TRACING_MESSAGE => {
                if self.message.is_none() {
                    self.message = Some(match value {
                        Value::String(message) => message,
                        other => other.to_string(),
                    });
                }
            }
            // Skip fields which are already handled
            name if name.starts_with("log.") => (),
            name => {
                let name = name.strip_prefix("r#").unwrap_or(name);
                self.attributes.push_value(name, value);
            }
        }
    }
}

impl Visit for EventFields {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == keys::TRACING_MESSAGE {
            self.message = Some(value.to_owned()); // `record_str()` is preferred for `message`
        } else {
            self.record_value(field, Value::from(value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field, Value::from(format!("{value:?}")));
    }
}

impl<S: Subscriber> Layer<S> for LogfLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = Level::from(*metadata.level());
        if !self.logger.enabled(level) {
            return;
        }

        let mut fields = EventFields::default();
        event.record(&mut fields);

        let location = Location::new(
            metadata.module_path().unwrap_or_else(|| metadata.target()),
            metadata.file().unwrap_or("?"),
            metadata.line().unwrap_or_default(),
        );
        let message = fields
            .message
            .as_deref()
            .unwrap_or_else(|| metadata.target());

        let record = Record::new(level, location, message, &fields.attributes);
        let _ = self.logger.emit(&record);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::indexing_slicing)]

    use tracing_subscriber::layer::SubscriberExt;

    use super::*;
    use crate::{LevelFilter, LogFormat, LoggerConfig, test_utils::CapturedOutput};

    fn with_layer(level: LevelFilter, format: LogFormat, emit: impl FnOnce()) -> CapturedOutput {
        let output = CapturedOutput::default();
        let logger = Logger::with_writer(LoggerConfig { level, format }, output.clone());
        let subscriber = tracing_subscriber::registry().with(LogfLayer::new(Arc::new(logger)));
        tracing::subscriber::with_default(subscriber, emit);
        output
    }

    #[test]
    fn events_render_with_mapped_levels() {
        let output = with_layer(LevelFilter::DEBUG, LogFormat::Json, || {
            tracing::trace!("trace");
            tracing::debug!("debug");
            tracing::info!("info");
            tracing::warn!("warn");
            tracing::error!("error");
        });

        let levels: Vec<String> = output
            .json_lines()
            .iter()
            .map(|line| line["level"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(levels, ["DEBUG", "DEBUG", "INFO", "WARN", "ERROR"]);
    }

    #[test]
    fn threshold_applies_to_events() {
        let output = with_layer(LevelFilter::WARN, LogFormat::Json, || {
            tracing::info!("dropped");
            tracing::warn!("kept");
        });

        let lines = output.json_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["msg"], "kept");
    }

    #[test]
    fn fields_become_ordered_attributes() {
        let output = with_layer(LevelFilter::INFO, LogFormat::Text, || {
            tracing::info!(user = "peter", attempt = 3, ok = true, r#type = "login", "Hello {}", "world");
        });

        let line = output.lines().remove(0);
        assert!(
            line.ends_with(r#"msg="Hello world" user="peter" attempt=3 ok=true type="login""#),
            "{line}"
        );
    }

    #[test]
    fn colliding_fields_are_kept_with_a_prefix() {
        let output = with_layer(LevelFilter::INFO, LogFormat::Json, || {
            tracing::info!(msg = "shadow", source = 3, "outer");
        });

        let line = output.json_lines().remove(0);
        assert_eq!(line["msg"], "outer");
        assert_eq!(line["source"]["file"], "bridge.rs");
        assert_eq!(line["attr.msg"], "shadow");
        assert_eq!(line["attr.source"], 3);
    }

    #[test]
    fn source_comes_from_event_metadata() {
        let expected_line = line!() + 2;
        let output = with_layer(LevelFilter::INFO, LogFormat::Json, || {
            tracing::info!("here");
        });

        let source = output.json_lines().remove(0)["source"].clone();
        assert_eq!(source["file"], "bridge.rs");
        assert_eq!(source["line"], expected_line);
        assert_eq!(source["function"], "logf::bridge::tests");
    }

    #[test]
    fn events_without_message_use_the_target() {
        let output = with_layer(LevelFilter::INFO, LogFormat::Json, || {
            tracing::info!(target: "billing", amount = 10);
        });

        let line = output.json_lines().remove(0);
        assert_eq!(line["msg"], "billing");
        assert_eq!(line["amount"], 10);
    }
}

//! The [`Logger`] handle and the process-wide instance used by the logging macros.

use std::{
    borrow::Cow,
    fmt,
    io::Write,
    sync::{Arc, LazyLock, OnceLock},
};

use tracing_subscriber::fmt::{MakeWriter, writer::BoxMakeWriter};

use crate::{Attributes, Level, Location, LoggerConfig, LoggerError, Record};

/// Status the process exits with after a [`Level::Fatal`] record.
pub const FATAL_EXIT_CODE: i32 = 1;

static GLOBAL_LOGGER: OnceLock<Arc<Logger>> = OnceLock::new();

static DEFAULT_LOGGER: LazyLock<Arc<Logger>> =
    LazyLock::new(|| Arc::new(Logger::new(LoggerConfig::default())));

/// A configured logger: a threshold, an output format and a destination.
///
/// The logging macros use the global logger unless given one explicitly:
///
/// ```
/// use logf::{LevelFilter, LogFormat, Logger, LoggerConfig, info};
///
/// let logger = Logger::new(LoggerConfig {
///     level: LevelFilter::WARN,
///     format: LogFormat::Text,
/// });
///
/// // Below the threshold, nothing is written
/// info!(logger: &logger, "Cache warmed", "entries" => 128);
/// assert!(!logger.enabled(logf::Level::Info));
/// ```
pub struct Logger {
    config: LoggerConfig,
    writer: BoxMakeWriter,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Creates a logger writing to standard output.
    pub fn new(config: LoggerConfig) -> Self {
        Self::with_writer(config, std::io::stdout)
    }

    /// Creates a logger writing to the destinations produced by `writer`.
    ///
    /// A fresh writer is requested for every record and receives the whole line, trailing newline
    /// included, in a single `write_all` call.
    pub fn with_writer<W>(config: LoggerConfig, writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        Self {
            config,
            writer: BoxMakeWriter::new(writer),
        }
    }

    /// Configuration the logger was built with.
    pub fn config(&self) -> LoggerConfig {
        self.config
    }

    /// Returns `true` if records at `level` would be written.
    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        self.config.level.allows(level)
    }

    /// Logs `message` with `attributes` at `level`, as if called from `location`.
    ///
    /// Nothing happens if `level` is disabled. Rendering and write errors are discarded. For
    /// [`Level::Fatal`], the process exits with [`FATAL_EXIT_CODE`] after the write attempt.
    pub fn log(&self, level: Level, location: Location, message: &str, attributes: Attributes) {
        if !self.enabled(level) {
            return;
        }

        let record = Record::new(level, location, message, &attributes);
        let _ = self.emit(&record);

        if level == Level::Fatal {
            std::process::exit(FATAL_EXIT_CODE);
        }
    }

    /// Logs a formatted message at `level`, as if called from `location`.
    ///
    /// The arguments are only formatted if `level` is enabled. Otherwise behaves like
    /// [`Logger::log`] with no attributes.
    pub fn log_fmt(&self, level: Level, location: Location, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }

        let message = match args.as_str() {
            Some(literal) => Cow::Borrowed(literal),
            None => Cow::Owned(args.to_string()),
        };
        self.log(level, location, &message, Attributes::new());
    }

    /// Renders and writes a record regardless of the threshold.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError`] if the record cannot be rendered or written.
    pub fn emit(&self, record: &Record<'_>) -> Result<(), LoggerError> {
        let buffer = self.config.format.render(record)?;
        self.flush(buffer)
    }

    /// Flush memory buffer into an output stream with a trailing newline.
    ///
    /// Should be done by a single `write_all` call to avoid fragmentation of log because of
    /// multithreading.
    fn flush(&self, mut buffer: Vec<u8>) -> Result<(), LoggerError> {
        buffer.push(b'\n');
        let mut writer = self.writer.make_writer();
        writer.write_all(&buffer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Configures the global logger from a debug flag and a format selector, writing to standard
/// output.
///
/// `debug = true` enables all levels, `debug = false` suppresses `DEBUG`. A `format` equal to
/// `"text"` (ignoring case) selects text output; any other value selects JSON.
///
/// # Errors
///
/// Returns [`LoggerError::AlreadyInitialized`] if a global logger was already installed; the
/// existing logger stays in place.
pub fn init_logging(debug: bool, format: &str) -> Result<(), LoggerError> {
    set_global_logger(Logger::new(LoggerConfig::from_flags(debug, format)))
}

/// Installs `logger` as the global logger.
///
/// # Errors
///
/// Returns [`LoggerError::AlreadyInitialized`] if a global logger was already installed.
pub fn set_global_logger(logger: Logger) -> Result<(), LoggerError> {
    GLOBAL_LOGGER
        .set(Arc::new(logger))
        .map_err(|_| LoggerError::AlreadyInitialized)
}

/// Returns the global logger, or the default one if none has been installed yet.
pub fn logger() -> &'static Logger {
    global_handle().as_ref()
}

pub(crate) fn global_handle() -> &'static Arc<Logger> {
    GLOBAL_LOGGER
        .get()
        .unwrap_or_else(|| LazyLock::force(&DEFAULT_LOGGER))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::indexing_slicing)]

    use std::{cell::Cell, io};

    use serde_json::Value;

    use super::*;
    use crate::{
        LevelFilter, LogFormat, test_utils::CapturedOutput, debug, debugf, error, errorf, fatal,
        fatalf, info, infof, location, warn, warnf,
    };

    fn capture(level: LevelFilter, format: LogFormat) -> (Logger, CapturedOutput) {
        let output = CapturedOutput::default();
        let logger = Logger::with_writer(LoggerConfig { level, format }, output.clone());
        (logger, output)
    }

    #[test]
    fn threshold_gates_each_non_fatal_level() {
        for threshold in Level::ALL {
            let (logger, output) = capture(threshold.into(), LogFormat::Json);

            debug!(logger: &logger, "m");
            info!(logger: &logger, "m");
            warn!(logger: &logger, "m");
            error!(logger: &logger, "m");
            debugf!(logger: &logger, "m");
            infof!(logger: &logger, "m");
            warnf!(logger: &logger, "m");
            errorf!(logger: &logger, "m");

            let emitted: Vec<Level> = output
                .json_lines()
                .iter()
                .map(|line| line["level"].as_str().unwrap().parse().unwrap())
                .collect();
            let expected: Vec<Level> = [Level::Debug, Level::Info, Level::Warn, Level::Error]
                .into_iter()
                .filter(|level| *level >= threshold)
                .flat_map(|level| [level, level])
                .collect();

            let mut emitted_sorted = emitted.clone();
            emitted_sorted.sort();
            assert_eq!(emitted_sorted, expected, "threshold {threshold}");
            assert!(logger.enabled(Level::Fatal));
        }
    }

    #[test]
    fn disabled_fatal_returns() {
        let (logger, output) = capture(LevelFilter::OFF, LogFormat::Json);

        fatal!(logger: &logger, "not today", "reason" => "filtered");
        fatalf!(logger: &logger, "not {}", "today");

        assert!(output.lines().is_empty());
    }

    #[test]
    fn info_filter_suppresses_debug_only() {
        let (logger, output) = capture(LevelFilter::INFO, LogFormat::Json);

        debug!(logger: &logger, "x");
        assert!(output.lines().is_empty());

        info!(logger: &logger, "x");
        let lines = output.json_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["level"], "INFO");
    }

    #[test]
    fn source_points_at_the_call_site() {
        let (logger, output) = capture(LevelFilter::DEBUG, LogFormat::Json);

        let here = location!();
        info!(logger: &logger, "first");
        warnf!(logger: &logger, "second");

        let lines = output.json_lines();
        let source = |index: usize| lines[index]["source"].clone();

        assert_eq!(source(0)["line"], here.line() + 1);
        assert_eq!(source(1)["line"], here.line() + 2);
        assert_eq!(source(0)["file"], "logger.rs");
        assert_eq!(
            source(0)["function"],
            "logf::logger::tests::source_points_at_the_call_site"
        );
    }

    #[test]
    fn formatted_and_attribute_forms() {
        let (logger, output) = capture(LevelFilter::INFO, LogFormat::Text);

        infof!(logger: &logger, "Value: {}", 42);
        info!(logger: &logger, "Value", "n" => 42);

        let lines = output.lines();
        assert!(lines[0].ends_with(r#"msg="Value: 42""#), "{}", lines[0]);
        assert!(lines[1].ends_with(r#"msg="Value" n=42"#), "{}", lines[1]);
    }

    #[test]
    fn attribute_form_does_not_interpret_braces() {
        let (logger, output) = capture(LevelFilter::INFO, LogFormat::Json);

        let user = "peter";
        info!(logger: &logger, "literal {user}");
        infof!(logger: &logger, "captured {user}");

        let lines = output.json_lines();
        assert_eq!(lines[0]["msg"], "literal {user}");
        assert_eq!(lines[1]["msg"], "captured peter");
    }

    #[test]
    fn disabled_levels_skip_argument_evaluation() {
        let (logger, output) = capture(LevelFilter::INFO, LogFormat::Json);
        let calls = Cell::new(0);
        let expensive = || {
            calls.set(calls.get() + 1);
            42
        };

        debugf!(logger: &logger, "{}", expensive());
        debug!(logger: &logger, "m", "value" => expensive());
        assert_eq!(calls.get(), 0);

        infof!(logger: &logger, "{}", expensive());
        info!(logger: &logger, "m", "value" => expensive());
        assert_eq!(calls.get(), 2);
        assert_eq!(output.lines().len(), 2);
    }

    #[test]
    fn attributes_keep_call_order() {
        let (logger, output) = capture(LevelFilter::INFO, LogFormat::Json);

        info!(logger: &logger, "m", "a" => 1, "b" => 2,);

        let raw = output.lines().remove(0);
        assert!(raw.ends_with(r#""msg":"m","a":1,"b":2}"#), "{raw}");

        let (logger, output) = capture(LevelFilter::INFO, LogFormat::Text);
        info!(logger: &logger, "m", "a" => 1, "b" => 2);
        assert!(output.lines()[0].ends_with(r#"msg="m" a=1 b=2"#));
    }

    #[test]
    fn accepts_owned_messages_and_runtime_keys() {
        let (logger, output) = capture(LevelFilter::INFO, LogFormat::Json);

        let message = String::from("owned");
        let key = format!("key_{}", 1);
        info!(logger: &logger, message, key => vec![1, 2]);

        let line = output.json_lines().remove(0);
        assert_eq!(line["msg"], "owned");
        assert_eq!(line["key_1"], serde_json::json!([1, 2]));
    }

    #[test]
    fn shared_handles_are_accepted() {
        let output = CapturedOutput::default();
        let logger = Arc::new(Logger::with_writer(LoggerConfig::default(), output.clone()));

        error!(logger: logger, "via arc");

        assert_eq!(output.json_lines()[0]["msg"], "via arc");
    }

    #[derive(Debug)]
    struct ClosedPipe;

    impl io::Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_are_swallowed_by_the_macros() {
        let logger = Logger::with_writer(LoggerConfig::default(), || ClosedPipe);

        error!(logger: &logger, "lost");

        let attributes = Attributes::new();
        let record = Record::new(Level::Error, location!(), "lost", &attributes);
        assert!(matches!(logger.emit(&record), Err(LoggerError::Io(_))));
    }

    #[test]
    fn debug_output_hides_the_writer() {
        let logger = Logger::with_writer(LoggerConfig::default(), io::sink);
        let rendered = format!("{logger:?}");
        assert!(rendered.starts_with("Logger { config: LoggerConfig"));
    }

    #[test]
    fn every_line_is_valid_json() {
        let (logger, output) = capture(LevelFilter::DEBUG, LogFormat::Json);

        debug!(logger: &logger, "with \"quotes\"\nand a newline", "nested" => serde_json::json!({"a": [1]}));
        infof!(logger: &logger, "{:?}", ("tuple", 1));

        let lines = output.lines();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let value: Value = serde_json::from_str(&line).unwrap();
            assert!(value.is_object());
        }
    }
}

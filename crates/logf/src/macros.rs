//! Leveled logging macros.
//!
//! Each severity has two macros. The attribute form takes a literal message followed by
//! `key => value` pairs:
//!
//! ```
//! logf::info!("Hello world!", "Hello" => "Peter Parker", "attempt" => 2);
//! ```
//!
//! The formatted form takes a format string and arguments, like [`format!`]:
//!
//! ```
//! logf::infof!("Hello, {}!", "Peter Parker");
//! ```
//!
//! Both forms accept an explicit logger as their first argument, `logger: <expr>`, where the
//! expression is a [`Logger`](crate::Logger) or anything that dereferences to one. Without it
//! the global logger is used.
//!
//! When the level is disabled the macros return before evaluating the message, the attribute
//! values or the format arguments.

/// Captures the [`Location`](crate::Location) of the macro invocation.
///
/// ```
/// fn handler() -> logf::Location {
///     logf::location!()
/// }
///
/// let location = handler();
/// assert!(location.function().ends_with("handler"));
/// assert!(location.line() > 0);
/// ```
#[macro_export]
macro_rules! location {
    () => {
        $crate::Location::new(
            {
                fn __logf_probe() {}
                fn __type_name_of<T>(_: T) -> &'static str {
                    ::core::any::type_name::<T>()
                }
                $crate::__private::function_path(__type_name_of(__logf_probe))
            },
            ::core::file!(),
            ::core::line!(),
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($logger:expr, $level:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        let __logger: &$crate::Logger = &$logger;
        let __level: $crate::Level = $level;
        if __logger.enabled(__level) {
            #[allow(unused_mut)]
            let mut __attributes = $crate::Attributes::new();
            $( __attributes.push($key, &$value); )*
            __logger.log(__level, $crate::location!(), &$message, __attributes);
        }
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_fmt {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let __logger: &$crate::Logger = &$logger;
        let __level: $crate::Level = $level;
        if __logger.enabled(__level) {
            __logger.log_fmt(__level, $crate::location!(), ::core::format_args!($($arg)+));
        }
    }};
}

/// Logs a message with attributes at [`Level::Debug`](crate::Level::Debug).
///
/// ```
/// logf::debug!("Cache lookup", "key" => "user:42", "hit" => false);
/// ```
#[macro_export]
macro_rules! debug {
    (logger: $logger:expr, $($rest:tt)+) => {
        $crate::__log!($logger, $crate::Level::Debug, $($rest)+)
    };
    ($($rest:tt)+) => {
        $crate::__log!($crate::logger(), $crate::Level::Debug, $($rest)+)
    };
}

/// Logs a formatted message at [`Level::Debug`](crate::Level::Debug).
#[macro_export]
macro_rules! debugf {
    (logger: $logger:expr, $($rest:tt)+) => {
        $crate::__log_fmt!($logger, $crate::Level::Debug, $($rest)+)
    };
    ($($rest:tt)+) => {
        $crate::__log_fmt!($crate::logger(), $crate::Level::Debug, $($rest)+)
    };
}

/// Logs a message with attributes at [`Level::Info`](crate::Level::Info).
///
/// The message is used verbatim; braces in it are not interpreted. Values may be any
/// [`serde::Serialize`] type, attached in the order they are written. Wrap values that only
/// implement `Display` or `Debug`, such as errors, in [`display`](crate::display()) or
/// [`debug`](crate::debug()).
///
/// ```
/// use logf::display;
///
/// let error = std::io::Error::other("connection reset");
/// logf::info!("Request failed", "attempt" => 3, "error" => display(&error));
/// ```
#[macro_export]
macro_rules! info {
    (logger: $logger:expr, $($rest:tt)+) => {
        $crate::__log!($logger, $crate::Level::Info, $($rest)+)
    };
    ($($rest:tt)+) => {
        $crate::__log!($crate::logger(), $crate::Level::Info, $($rest)+)
    };
}

/// Logs a formatted message at [`Level::Info`](crate::Level::Info).
///
/// ```
/// let port = 8080;
/// logf::infof!("Listening on port {port}");
/// ```
#[macro_export]
macro_rules! infof {
    (logger: $logger:expr, $($rest:tt)+) => {
        $crate::__log_fmt!($logger, $crate::Level::Info, $($rest)+)
    };
    ($($rest:tt)+) => {
        $crate::__log_fmt!($crate::logger(), $crate::Level::Info, $($rest)+)
    };
}

/// Logs a message with attributes at [`Level::Warn`](crate::Level::Warn).
#[macro_export]
macro_rules! warn {
    (logger: $logger:expr, $($rest:tt)+) => {
        $crate::__log!($logger, $crate::Level::Warn, $($rest)+)
    };
    ($($rest:tt)+) => {
        $crate::__log!($crate::logger(), $crate::Level::Warn, $($rest)+)
    };
}

/// Logs a formatted message at [`Level::Warn`](crate::Level::Warn).
#[macro_export]
macro_rules! warnf {
    (logger: $logger:expr, $($rest:tt)+) => {
        $crate::__log_fmt!($logger, $crate::Level::Warn, $($rest)+)
    };
    ($($rest:tt)+) => {
        $crate::__log_fmt!($crate::logger(), $crate::Level::Warn, $($rest)+)
    };
}

/// Logs a message with attributes at [`Level::Error`](crate::Level::Error).
#[macro_export]
macro_rules! error {
    (logger: $logger:expr, $($rest:tt)+) => {
        $crate::__log!($logger, $crate::Level::Error, $($rest)+)
    };
    ($($rest:tt)+) => {
        $crate::__log!($crate::logger(), $crate::Level::Error, $($rest)+)
    };
}

/// Logs a formatted message at [`Level::Error`](crate::Level::Error).
#[macro_export]
macro_rules! errorf {
    (logger: $logger:expr, $($rest:tt)+) => {
        $crate::__log_fmt!($logger, $crate::Level::Error, $($rest)+)
    };
    ($($rest:tt)+) => {
        $crate::__log_fmt!($crate::logger(), $crate::Level::Error, $($rest)+)
    };
}

/// Logs a message with attributes at [`Level::Fatal`](crate::Level::Fatal), then exits the
/// process with status 1.
///
/// The record is written and flushed before exiting. If the logger filters out `FATAL`, the
/// macro returns without logging or exiting.
///
/// ```no_run
/// let path = "/etc/app.toml";
/// logf::fatal!("Configuration missing", "path" => path);
/// unreachable!();
/// ```
#[macro_export]
macro_rules! fatal {
    (logger: $logger:expr, $($rest:tt)+) => {
        $crate::__log!($logger, $crate::Level::Fatal, $($rest)+)
    };
    ($($rest:tt)+) => {
        $crate::__log!($crate::logger(), $crate::Level::Fatal, $($rest)+)
    };
}

/// Logs a formatted message at [`Level::Fatal`](crate::Level::Fatal), then exits the process
/// with status 1.
///
/// See [`fatal!`] for the exit behavior.
#[macro_export]
macro_rules! fatalf {
    (logger: $logger:expr, $($rest:tt)+) => {
        $crate::__log_fmt!($logger, $crate::Level::Fatal, $($rest)+)
    };
    ($($rest:tt)+) => {
        $crate::__log_fmt!($crate::logger(), $crate::Level::Fatal, $($rest)+)
    };
}

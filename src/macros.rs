//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`.
//!
//! # Examples
//!
//! ```
//! use rust_tee_logger::{global, info, kvs};
//!
//! let logger = global::logger();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // Alternating key/value pairs
//! logger.infow("request served", &kvs!["status", 200, "path", "/health"]);
//! ```

/// Log a formatted message at an explicit level.
///
/// # Examples
///
/// ```
/// # let logger = rust_tee_logger::global::logger();
/// use rust_tee_logger::{log, LogLevel};
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, &format!($($arg)+), &[])
    };
}

/// Log a debug-level message.
///
/// ```
/// # let logger = rust_tee_logger::global::logger();
/// use rust_tee_logger::debug;
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// ```
/// # let logger = rust_tee_logger::global::logger();
/// use rust_tee_logger::warn;
/// warn!(logger, "Memory usage high: {}%", 85);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Build an alternating key/value list for the `*w` methods.
///
/// ```
/// use rust_tee_logger::{kvs, KvArg};
///
/// let args: Vec<KvArg> = kvs!["elapsedMs", 120, "op", "read"];
/// assert_eq!(args.len(), 4);
/// ```
#[macro_export]
macro_rules! kvs {
    ($($arg:expr),* $(,)?) => {
        vec![$($crate::KvArg::from($arg)),*]
    };
}

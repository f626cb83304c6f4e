//! Routes records of the `log` crate facade into the global logger
//!
//! Installed on first use of the global logger. Libraries that log through
//! `log::info!` and friends end up in the same sinks as everything else.

use crate::core::field::Field;
use crate::core::log_entry::Caller;
use crate::core::log_level::LogLevel;
use crate::global;
use std::sync::Once;

static INSTALL: Once = Once::new();

/// `log::Log` implementation forwarding to [`global::logger`]
#[derive(Debug, Default)]
pub struct LogBridge;

/// Map a `log` level onto ours; `trace` folds into `debug`
pub fn from_log_level(level: log::Level) -> LogLevel {
    match level {
        log::Level::Error => LogLevel::Error,
        log::Level::Warn => LogLevel::Warn,
        log::Level::Info => LogLevel::Info,
        log::Level::Debug | log::Level::Trace => LogLevel::Debug,
    }
}

/// Most verbose `log` filter that can still reach a logger at `level`
pub fn to_level_filter(level: LogLevel) -> log::LevelFilter {
    match level {
        LogLevel::Debug => log::LevelFilter::Debug,
        LogLevel::Info => log::LevelFilter::Info,
        LogLevel::Warn => log::LevelFilter::Warn,
        _ => log::LevelFilter::Error,
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        global::logger().enabled(from_log_level(metadata.level()))
    }

    fn log(&self, record: &log::Record<'_>) {
        let level = from_log_level(record.level());
        let logger = global::logger();
        if !logger.enabled(level) {
            return;
        }

        let caller = match (record.file_static(), record.line()) {
            (Some(file), Some(line)) => Some(Caller { file, line }),
            _ => None,
        };
        let fields = [Field::string("target", record.target())];
        logger.log_record(level, record.args().to_string(), &fields, caller);
    }

    fn flush(&self) {
        if let Err(e) = global::flush() {
            eprintln!("[LOGGER ERROR] flush failed: {}", e);
        }
    }
}

/// Install the bridge once per process and align the `log` max level
///
/// If another `log` implementation is already installed it is left alone.
pub fn install(level: LogLevel) {
    INSTALL.call_once(|| {
        if log::set_boxed_logger(Box::new(LogBridge)).is_err() {
            eprintln!("[LOGGER ERROR] another `log` implementation is already installed");
        }
    });
    log::set_max_level(to_level_filter(level));
}

//! Process-wide logger
//!
//! The first access builds a logger from [`Options::default`] and routes the
//! `log` crate facade into it. [`init`]
//! replaces it; concurrent `init` calls are serialised, and readers always see
//! either the old or the new logger in full.
//!
//! ```
//! use rust_tee_logger::{global, kvs, Field, Options};
//!
//! global::init(Options::new().with_level("debug"));
//! global::info("started", &[Field::int("port", 8080)]);
//! global::debugw("cache warm", &kvs!["entries", 512]);
//! global::with_name("http").warnf(format_args!("slow request: {}ms", 250));
//! let _ = global::flush();
//! ```

use crate::bridge;
use crate::core::config::{build_logger, Options};
use crate::core::error::Result;
use crate::core::field::Field;
use crate::core::key_values::KvArg;
use crate::core::log_level::LogLevel;
use crate::core::logger::{InfoLogger, Logger, StdLogger};
use crate::core::tee::Tee;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::{Arc, OnceLock};

struct State {
    logger: Logger,
    options: Options,
}

static STATE: OnceLock<RwLock<Arc<State>>> = OnceLock::new();
static INIT_LOCK: Mutex<()> = parking_lot::const_mutex(());

fn default_state() -> RwLock<Arc<State>> {
    let options = Options::default();
    let logger = build_logger(&options).unwrap_or_else(|e| {
        eprintln!("[LOGGER ERROR] default logger unavailable: {}", e);
        Logger::new(Arc::new(Tee::new(Vec::new())))
    });
    // Runs inside `STATE` initialisation; installing never logs, so no re-entry
    bridge::install(options.parsed_level());
    RwLock::new(Arc::new(State { logger, options }))
}

fn current() -> Arc<State> {
    Arc::clone(&STATE.get_or_init(default_state).read())
}

/// Replace the global logger
///
/// # Panics
///
/// Panics with the aggregated diagnostic when any output path cannot be
/// opened; a misconfigured logger is not worth running with.
pub fn init(options: Options) {
    if let Err(e) = try_init(options) {
        panic!("failed to initialise logger: {}", e);
    }
}

/// Replace the global logger, reporting configuration errors
///
/// On error the previous logger stays active.
pub fn try_init(options: Options) -> Result<()> {
    let _guard = INIT_LOCK.lock();

    let logger = build_logger(&options)?;
    let level = options.parsed_level();
    let state = Arc::new(State { logger, options });

    let slot = STATE.get_or_init(default_state);
    *slot.write() = state;

    bridge::install(level);
    Ok(())
}

/// Options the active logger was built from
pub fn options() -> Options {
    current().options.clone()
}

/// The active root logger
pub fn logger() -> Logger {
    current().logger.clone()
}

/// Verbosity check for klog-style integer levels: below 5 means info, otherwise debug
pub fn check_int_level(level: i32) -> bool {
    let level = if level < 5 {
        LogLevel::Info
    } else {
        LogLevel::Debug
    };
    current().logger.enabled(level)
}

pub fn v(level: LogLevel) -> Box<dyn InfoLogger> {
    current().logger.v(level)
}

#[track_caller]
pub fn with_values(keys_and_values: &[KvArg]) -> Logger {
    current().logger.with_values(keys_and_values)
}

pub fn with_name(name: &str) -> Logger {
    current().logger.with_name(name)
}

pub fn with_fields(fields: &[Field]) -> Logger {
    current().logger.with_fields(fields)
}

pub fn flush() -> Result<()> {
    current().logger.flush()
}

/// Line logger writing at error level
pub fn std_err_logger() -> StdLogger {
    current().logger.std_logger_at(LogLevel::Error)
}

/// Line logger writing at info level
pub fn std_info_logger() -> StdLogger {
    current().logger.std_logger_at(LogLevel::Info)
}

macro_rules! global_level_fns {
    ($($plain:ident, $formatted:ident, $keyed:ident;)*) => {
        $(
            #[track_caller]
            pub fn $plain(msg: &str, fields: &[Field]) {
                current().logger.$plain(msg, fields);
            }

            #[track_caller]
            pub fn $formatted(args: fmt::Arguments<'_>) {
                current().logger.$formatted(args);
            }

            #[track_caller]
            pub fn $keyed(msg: &str, keys_and_values: &[KvArg]) {
                current().logger.$keyed(msg, keys_and_values);
            }
        )*
    };
}

global_level_fns! {
    debug, debugf, debugw;
    info, infof, infow;
    warn, warnf, warnw;
    error, errorf, errorw;
    dpanic, dpanicf, dpanicw;
}

#[track_caller]
pub fn panic(msg: &str, fields: &[Field]) -> ! {
    current().logger.panic(msg, fields)
}

#[track_caller]
pub fn panicf(args: fmt::Arguments<'_>) -> ! {
    current().logger.panicf(args)
}

#[track_caller]
pub fn panicw(msg: &str, keys_and_values: &[KvArg]) -> ! {
    current().logger.panicw(msg, keys_and_values)
}

#[track_caller]
pub fn fatal(msg: &str, fields: &[Field]) -> ! {
    current().logger.fatal(msg, fields)
}

#[track_caller]
pub fn fatalf(args: fmt::Arguments<'_>) -> ! {
    current().logger.fatalf(args)
}

#[track_caller]
pub fn fatalw(msg: &str, keys_and_values: &[KvArg]) -> ! {
    current().logger.fatalw(msg, keys_and_values)
}

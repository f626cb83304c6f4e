//! Logger facade
//!
//! Every severity comes in three forms:
//! - `info(msg, &[Field])` with typed fields
//! - `infof(format_args!(..))` formatted (see the `info!` macro)
//! - `infow(msg, &kvs![..])` with an alternating key/value list
//!
//! `panic*` and `fatal*` never return: the first panics after writing the
//! record, the second flushes every sink and then runs the [`FatalHook`].

use super::error::Result;
use super::field::Field;
use super::key_values::{normalize, KvArg};
use super::log_entry::{Caller, Entry};
use super::log_level::LogLevel;
use super::tee::Core;
use super::write_syncer::SharedSink;
use std::backtrace::Backtrace;
use std::fmt;
use std::io;
use std::sync::Arc;

/// What a fatal call does once the record is flushed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalHook {
    /// Terminate the process with this exit code
    Exit(i32),
    /// Panic instead of exiting, so tests can observe fatal calls
    Panic,
}

impl Default for FatalHook {
    fn default() -> Self {
        FatalHook::Exit(1)
    }
}

pub(crate) struct Settings {
    pub(crate) development: bool,
    pub(crate) add_caller: bool,
    pub(crate) stacktrace_level: Option<LogLevel>,
    pub(crate) error_output: Option<SharedSink>,
    pub(crate) fatal_hook: FatalHook,
}

/// Ability to log non-error messages at one fixed verbosity
pub trait InfoLogger: Send + Sync {
    fn info(&self, msg: &str, fields: &[Field]);
    fn infof(&self, args: fmt::Arguments<'_>);
    fn infow(&self, msg: &str, keys_and_values: &[KvArg]);

    /// Whether records sent through this view can be emitted at all
    fn enabled(&self) -> bool;
}

/// A verbosity view that was disabled when it was acquired
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInfoLogger;

impl InfoLogger for NoopInfoLogger {
    fn info(&self, _msg: &str, _fields: &[Field]) {}
    fn infof(&self, _args: fmt::Arguments<'_>) {}
    fn infow(&self, _msg: &str, _keys_and_values: &[KvArg]) {}
    fn enabled(&self) -> bool {
        false
    }
}

/// A verbosity view bound to one level of a live logger
#[derive(Clone)]
pub struct LevelLogger {
    level: LogLevel,
    logger: Logger,
}

impl LevelLogger {
    pub fn level(&self) -> LogLevel {
        self.level
    }
}

impl InfoLogger for LevelLogger {
    #[track_caller]
    fn info(&self, msg: &str, fields: &[Field]) {
        self.logger.log_at(self.level, msg.to_string(), fields, Caller::here());
    }

    #[track_caller]
    fn infof(&self, args: fmt::Arguments<'_>) {
        if self.logger.enabled(self.level) {
            self.logger.log_at(self.level, args.to_string(), &[], Caller::here());
        }
    }

    #[track_caller]
    fn infow(&self, msg: &str, keys_and_values: &[KvArg]) {
        if self.logger.enabled(self.level) {
            let fields = self.logger.handle_fields(keys_and_values, &[]);
            self.logger.log_at(self.level, msg.to_string(), &fields, Caller::here());
        }
    }

    fn enabled(&self) -> bool {
        true
    }
}

/// Leveled, structured logger
///
/// Cloning is cheap; derived loggers (`with_name`, `with_values`,
/// `with_fields`) share the backend but never modify the logger they came from.
#[derive(Clone)]
pub struct Logger {
    core: Arc<dyn Core>,
    name: Option<String>,
    context: Arc<Vec<Field>>,
    settings: Arc<Settings>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("context", &self.context)
            .finish()
    }
}

impl Logger {
    pub(crate) fn from_parts(
        core: Arc<dyn Core>,
        name: Option<String>,
        context: Vec<Field>,
        settings: Settings,
    ) -> Self {
        Self {
            core,
            name,
            context: Arc::new(context),
            settings: Arc::new(settings),
        }
    }

    /// Wrap an existing backend with default behaviour (no caller, no stack traces)
    pub fn new(core: Arc<dyn Core>) -> Self {
        Self::from_parts(
            core,
            None,
            Vec::new(),
            Settings {
                development: false,
                add_caller: false,
                stacktrace_level: None,
                error_output: None,
                fatal_hook: FatalHook::default(),
            },
        )
    }

    /// Dotted name of this logger, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Fields attached to every record of this logger
    pub fn context(&self) -> &[Field] {
        &self.context
    }

    /// Whether any sink accepts records at `level`
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.core.enabled(level)
    }

    pub(crate) fn log_at(&self, level: LogLevel, message: String, fields: &[Field], caller: Caller) {
        self.log_record(level, message, fields, Some(caller));
    }

    /// Emit one record whose call site was resolved elsewhere
    pub(crate) fn log_record(
        &self,
        level: LogLevel,
        message: String,
        fields: &[Field],
        caller: Option<Caller>,
    ) {
        if !self.core.enabled(level) {
            return;
        }

        let mut all = Vec::with_capacity(self.context.len() + fields.len());
        all.extend_from_slice(&self.context);
        all.extend_from_slice(fields);

        let entry = Entry::new(level, message)
            .with_name(self.name.clone())
            .with_caller(caller.filter(|_| self.settings.add_caller))
            .with_fields(all)
            .with_stacktrace(self.stacktrace_for(level));

        if let Err(e) = self.core.write(&entry) {
            self.report_internal(&format!("write error: {}", e));
        }
    }

    fn stacktrace_for(&self, level: LogLevel) -> Option<String> {
        let wanted = self
            .settings
            .stacktrace_level
            .is_some_and(|threshold| level >= threshold);
        wanted.then(|| Backtrace::force_capture().to_string())
    }

    /// Record a failure of the logger itself on the error output
    fn report_internal(&self, message: &str) {
        let line = format!(
            "{}\t{}\n",
            chrono::Local::now().format(super::encoder::TIME_FORMAT),
            message
        );
        if let Some(ref sink) = self.settings.error_output {
            let mut sink = sink.lock();
            if sink.write_all(line.as_bytes()).is_ok() {
                let _ = sink.sync();
                return;
            }
        }
        eprintln!("[LOGGER ERROR] {}", message);
    }

    /// Normalize a key/value list, self-logging any contract violation
    #[track_caller]
    pub fn handle_fields(&self, args: &[KvArg], additional: &[Field]) -> Vec<Field> {
        let normalized = normalize(args, additional);
        if let Some(violation) = normalized.violation {
            self.log_at(
                LogLevel::DPanic,
                violation.message().to_string(),
                &[violation.field()],
                Caller::here(),
            );
        }
        normalized.fields
    }

    #[track_caller]
    fn log_fmt(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if self.core.enabled(level) {
            self.log_at(level, args.to_string(), &[], Caller::here());
        }
    }

    #[track_caller]
    fn log_kv(&self, level: LogLevel, msg: &str, keys_and_values: &[KvArg]) {
        if self.core.enabled(level) {
            let fields = self.handle_fields(keys_and_values, &[]);
            self.log_at(level, msg.to_string(), &fields, Caller::here());
        }
    }

    /// Log at an arbitrary non-terminating level
    ///
    /// `DPanic`, `Panic` and `Fatal` records are written at their own level
    /// but never terminate through this method.
    #[track_caller]
    pub fn log(&self, level: LogLevel, msg: &str, fields: &[Field]) {
        self.log_at(level, msg.to_string(), fields, Caller::here());
    }

    #[track_caller]
    pub fn debug(&self, msg: &str, fields: &[Field]) {
        self.log_at(LogLevel::Debug, msg.to_string(), fields, Caller::here());
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Debug, args);
    }

    #[track_caller]
    pub fn debugw(&self, msg: &str, keys_and_values: &[KvArg]) {
        self.log_kv(LogLevel::Debug, msg, keys_and_values);
    }

    #[track_caller]
    pub fn info(&self, msg: &str, fields: &[Field]) {
        self.log_at(LogLevel::Info, msg.to_string(), fields, Caller::here());
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Info, args);
    }

    #[track_caller]
    pub fn infow(&self, msg: &str, keys_and_values: &[KvArg]) {
        self.log_kv(LogLevel::Info, msg, keys_and_values);
    }

    #[track_caller]
    pub fn warn(&self, msg: &str, fields: &[Field]) {
        self.log_at(LogLevel::Warn, msg.to_string(), fields, Caller::here());
    }

    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Warn, args);
    }

    #[track_caller]
    pub fn warnw(&self, msg: &str, keys_and_values: &[KvArg]) {
        self.log_kv(LogLevel::Warn, msg, keys_and_values);
    }

    #[track_caller]
    pub fn error(&self, msg: &str, fields: &[Field]) {
        self.log_at(LogLevel::Error, msg.to_string(), fields, Caller::here());
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Error, args);
    }

    #[track_caller]
    pub fn errorw(&self, msg: &str, keys_and_values: &[KvArg]) {
        self.log_kv(LogLevel::Error, msg, keys_and_values);
    }

    // The record must be on disk before the stack unwinds or the process exits
    fn sync_before_exit(&self) {
        if let Err(e) = self.core.sync() {
            self.report_internal(&format!("sync error: {}", e));
        }
    }

    /// Log at `DPanic`; panics afterwards in development mode only
    #[track_caller]
    pub fn dpanic(&self, msg: &str, fields: &[Field]) {
        self.log_at(LogLevel::DPanic, msg.to_string(), fields, Caller::here());
        if self.settings.development {
            self.sync_before_exit();
            panic!("{}", msg);
        }
    }

    #[track_caller]
    pub fn dpanicf(&self, args: fmt::Arguments<'_>) {
        let msg = args.to_string();
        self.dpanic(&msg, &[]);
    }

    #[track_caller]
    pub fn dpanicw(&self, msg: &str, keys_and_values: &[KvArg]) {
        let fields = self.handle_fields(keys_and_values, &[]);
        self.dpanic(msg, &fields);
    }

    /// Log at `Panic`, then panic with the message
    #[track_caller]
    pub fn panic(&self, msg: &str, fields: &[Field]) -> ! {
        self.log_at(LogLevel::Panic, msg.to_string(), fields, Caller::here());
        self.sync_before_exit();
        panic!("{}", msg);
    }

    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments<'_>) -> ! {
        let msg = args.to_string();
        self.panic(&msg, &[])
    }

    #[track_caller]
    pub fn panicw(&self, msg: &str, keys_and_values: &[KvArg]) -> ! {
        let fields = self.handle_fields(keys_and_values, &[]);
        self.panic(msg, &fields)
    }

    /// Log at `Fatal`, flush every sink, then run the fatal hook
    #[track_caller]
    pub fn fatal(&self, msg: &str, fields: &[Field]) -> ! {
        self.log_at(LogLevel::Fatal, msg.to_string(), fields, Caller::here());
        self.sync_before_exit();
        match self.settings.fatal_hook {
            FatalHook::Exit(code) => std::process::exit(code),
            FatalHook::Panic => panic!("{}", msg),
        }
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        let msg = args.to_string();
        self.fatal(&msg, &[])
    }

    #[track_caller]
    pub fn fatalw(&self, msg: &str, keys_and_values: &[KvArg]) -> ! {
        let fields = self.handle_fields(keys_and_values, &[]);
        self.fatal(msg, &fields)
    }

    /// Verbosity-gated view, decided once at call time
    pub fn v(&self, level: LogLevel) -> Box<dyn InfoLogger> {
        if self.core.enabled(level) {
            Box::new(LevelLogger {
                level,
                logger: self.clone(),
            })
        } else {
            Box::new(NoopInfoLogger)
        }
    }

    /// Child logger whose name gains `name` as a new dotted segment
    #[must_use]
    pub fn with_name(&self, name: &str) -> Logger {
        if name.is_empty() {
            return self.clone();
        }
        let mut child = self.clone();
        child.name = Some(match self.name {
            Some(ref parent) => format!("{}.{}", parent, name),
            None => name.to_string(),
        });
        child
    }

    /// Child logger carrying extra key/value context on every record
    #[must_use]
    #[track_caller]
    pub fn with_values(&self, keys_and_values: &[KvArg]) -> Logger {
        let fields = self.handle_fields(keys_and_values, &[]);
        self.with_fields(&fields)
    }

    /// Child logger carrying extra typed fields on every record
    #[must_use]
    pub fn with_fields(&self, fields: &[Field]) -> Logger {
        if fields.is_empty() {
            return self.clone();
        }
        let mut context = Vec::with_capacity(self.context.len() + fields.len());
        context.extend_from_slice(&self.context);
        context.extend_from_slice(fields);

        let mut child = self.clone();
        child.context = Arc::new(context);
        child
    }

    /// Flush every sink of the shared backend
    pub fn flush(&self) -> Result<()> {
        self.core.sync()
    }

    /// Line-oriented adapter writing each line at `level`
    pub fn std_logger_at(&self, level: LogLevel) -> StdLogger {
        StdLogger {
            logger: self.clone(),
            level,
        }
    }
}

impl InfoLogger for Logger {
    #[track_caller]
    fn info(&self, msg: &str, fields: &[Field]) {
        Logger::info(self, msg, fields);
    }

    #[track_caller]
    fn infof(&self, args: fmt::Arguments<'_>) {
        Logger::infof(self, args);
    }

    #[track_caller]
    fn infow(&self, msg: &str, keys_and_values: &[KvArg]) {
        Logger::infow(self, msg, keys_and_values);
    }

    fn enabled(&self) -> bool {
        self.core.enabled(LogLevel::Info)
    }
}

/// Raw bytes become one info-level message; the full length is always reported
impl io::Write for Logger {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let msg = String::from_utf8_lossy(buf);
        Logger::info(self, &msg, &[]);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.core
            .sync()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }
}

/// Minimal "print a line" logger bound to one level
#[derive(Clone)]
pub struct StdLogger {
    logger: Logger,
    level: LogLevel,
}

impl StdLogger {
    pub fn level(&self) -> LogLevel {
        self.level
    }

    #[track_caller]
    pub fn print(&self, line: &str) {
        let line = line.trim_end_matches(['\r', '\n']);
        self.logger
            .log_at(self.level, line.to_string(), &[], Caller::here());
    }
}

impl io::Write for StdLogger {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        for line in text.lines().filter(|l| !l.is_empty()) {
            self.print(line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.logger
            .flush()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }
}

//! Multiplexed backend assembly
//!
//! A [`Tee`] owns one [`IoCore`] per destination. Every record is offered to
//! each core in order, and a core writes it only when the record's level falls
//! inside that core's [`LevelRange`]. Writes are independent: a failing sink
//! does not undo what the others already wrote.

use super::encoder::Encoder;
use super::error::{LoggerError, Result};
use super::field::{Field, FieldValue};
use super::log_entry::Entry;
use super::log_level::{LevelRange, LogLevel};
use super::logger::{FatalHook, Logger, Settings};
use super::sampling::{LogSampler, SamplingConfig};
use super::write_syncer::SharedSink;
use std::sync::Arc;

/// The backend contract behind a [`Logger`]
pub trait Core: Send + Sync {
    fn enabled(&self, level: LogLevel) -> bool;
    fn write(&self, entry: &Entry) -> Result<()>;
    fn sync(&self) -> Result<()>;
}

/// One encoder writing into one sink for one severity band
pub struct IoCore {
    encoder: Arc<Encoder>,
    sink: SharedSink,
    enabler: LevelRange,
}

impl IoCore {
    pub fn new(encoder: Arc<Encoder>, sink: SharedSink, enabler: LevelRange) -> Self {
        Self {
            encoder,
            sink,
            enabler,
        }
    }

    fn write_encoded(&self, line: &str) -> Result<()> {
        self.sink.lock().write_all(line.as_bytes())
    }
}

impl Core for IoCore {
    fn enabled(&self, level: LogLevel) -> bool {
        self.enabler.enabled(level)
    }

    fn write(&self, entry: &Entry) -> Result<()> {
        if !self.enabled(entry.level) {
            return Ok(());
        }
        self.write_encoded(&self.encoder.encode(entry))
    }

    fn sync(&self) -> Result<()> {
        self.sink.lock().sync()
    }
}

/// Fan-out over several cores
pub struct Tee {
    cores: Vec<IoCore>,
}

impl Tee {
    pub fn new(cores: Vec<IoCore>) -> Self {
        Self { cores }
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }
}

fn collapse(mut errors: Vec<LoggerError>) -> Result<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(LoggerError::writer(
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        )),
    }
}

impl Core for Tee {
    fn enabled(&self, level: LogLevel) -> bool {
        self.cores.iter().any(|c| c.enabled(level))
    }

    fn write(&self, entry: &Entry) -> Result<()> {
        // All cores of one tee share an encoder, so encode at most once
        let mut encoded: Option<String> = None;
        let mut errors = Vec::new();
        for core in self.cores.iter().filter(|c| c.enabled(entry.level)) {
            let line = encoded.get_or_insert_with(|| core.encoder.encode(entry));
            if let Err(e) = core.write_encoded(line) {
                errors.push(e);
            }
        }
        collapse(errors)
    }

    fn sync(&self) -> Result<()> {
        let errors = self
            .cores
            .iter()
            .filter_map(|c| c.sync().err())
            .collect();
        collapse(errors)
    }
}

/// Drops duplicate records past the sampling budget
pub struct SampledCore {
    inner: Box<dyn Core>,
    sampler: LogSampler,
}

impl SampledCore {
    pub fn new(inner: Box<dyn Core>, config: SamplingConfig) -> Self {
        Self {
            inner,
            sampler: LogSampler::new(config),
        }
    }

    pub fn sampler(&self) -> &LogSampler {
        &self.sampler
    }
}

impl Core for SampledCore {
    fn enabled(&self, level: LogLevel) -> bool {
        self.inner.enabled(level)
    }

    fn write(&self, entry: &Entry) -> Result<()> {
        if !self.sampler.should_sample(entry.level, &entry.message) {
            return Ok(());
        }
        self.inner.write(entry)
    }

    fn sync(&self) -> Result<()> {
        self.inner.sync()
    }
}

/// One destination and the severity band it accepts
#[derive(Clone)]
pub struct TeeOption {
    pub sink: SharedSink,
    pub enabler: LevelRange,
}

impl TeeOption {
    pub fn new(sink: SharedSink, enabler: LevelRange) -> Self {
        Self { sink, enabler }
    }
}

/// Cross-cutting behaviour applied to the assembled logger
#[derive(Clone)]
pub struct CoreOptions {
    pub development: bool,
    pub add_caller: bool,
    /// Attach a stack trace at or above this level
    pub stacktrace_level: Option<LogLevel>,
    pub sampling: Option<SamplingConfig>,
    /// Attached to every record, sorted by key at assembly time
    pub initial_fields: Vec<(String, FieldValue)>,
    /// Destination for the logger's own failures
    pub error_output: Option<SharedSink>,
    pub fatal_hook: FatalHook,
    pub name: Option<String>,
}

impl Default for CoreOptions {
    fn default() -> Self {
        Self {
            development: false,
            add_caller: false,
            stacktrace_level: None,
            sampling: None,
            initial_fields: Vec::new(),
            error_output: None,
            fatal_hook: FatalHook::default(),
            name: None,
        }
    }
}

impl CoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn development(mut self, enabled: bool) -> Self {
        self.development = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn add_caller(mut self, enabled: bool) -> Self {
        self.add_caller = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn stacktrace_level(mut self, level: Option<LogLevel>) -> Self {
        self.stacktrace_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sampling(mut self, config: Option<SamplingConfig>) -> Self {
        self.sampling = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn initial_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.initial_fields.push((key.into(), value.into()));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn error_output(mut self, sink: SharedSink) -> Self {
        self.error_output = Some(sink);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn fatal_hook(mut self, hook: FatalHook) -> Self {
        self.fatal_hook = hook;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Combine every (sink, band) pair behind one shared encoder into a logger
pub fn new_tee(topts: Vec<TeeOption>, encoder: Encoder, opts: CoreOptions) -> Logger {
    let encoder = Arc::new(encoder);
    let cores = topts
        .into_iter()
        .map(|t| IoCore::new(Arc::clone(&encoder), t.sink, t.enabler))
        .collect();

    let tee: Box<dyn Core> = Box::new(Tee::new(cores));
    let core: Arc<dyn Core> = match opts.sampling {
        Some(config) => Arc::new(SampledCore::new(tee, config)),
        None => Arc::from(tee),
    };

    let mut initial = opts.initial_fields;
    initial.sort_by(|a, b| a.0.cmp(&b.0));
    let context: Vec<Field> = initial
        .into_iter()
        .map(|(k, v)| Field::new(k, v))
        .collect();

    let settings = Settings {
        development: opts.development,
        add_caller: opts.add_caller,
        stacktrace_level: opts.stacktrace_level,
        error_output: opts.error_output,
        fatal_hook: opts.fatal_hook,
    };

    Logger::from_parts(core, opts.name, context, settings)
}

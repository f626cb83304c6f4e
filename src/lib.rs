//! # Rust Tee Logger
//!
//! A leveled, structured logging facade with severity-banded fan-out.
//!
//! ## Features
//!
//! - **Three call styles**: typed fields, `format_args!` and key/value lists
//! - **Tee output**: records up to `warn` go to the normal outputs, `warn` and above to the error outputs
//! - **File rotation**: size-based with backup pruning and gzip compression
//! - **Global logger**: lazily defaulted, replaceable at runtime, bridged to the `log` crate
//!
//! ```
//! use rust_tee_logger::prelude::*;
//!
//! let options = Options::new()
//!     .with_format(Format::Json)
//!     .with_output_paths(["stdout"]);
//! let logger = build_logger(&options)?;
//! logger.info("started", &[Field::int("port", 8080)]);
//! logger.with_name("db").warnw("slow query", &kvs!["elapsedMs", 120]);
//! # Ok::<(), LoggerError>(())
//! ```

pub mod appenders;
pub mod bridge;
pub mod core;
pub mod global;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        build_logger, level_func, Field, FieldValue, Format, InfoLogger, KvArg, LogLevel, Logger,
        LoggerError, Options, Result, SamplingConfig,
    };
    pub use crate::global;
    pub use crate::kvs;
}

pub use crate::appenders::{ConsoleSink, RotatingFileSink, RotationPolicy};
pub use crate::core::{
    build_logger, level_func, new_tee, try_fields, CoreOptions, Encoder, EncoderConfig, FatalHook,
    Field, FieldValue, Format, InfoLogger, KvArg, LevelRange, LogLevel, LogSampler, Logger,
    LoggerError, Options, Result, SamplerMetrics, SamplingConfig, SharedSink, StdLogger,
    TeeOption, WriteSyncer,
};

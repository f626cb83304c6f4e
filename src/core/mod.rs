//! Core logger types and traits

pub mod config;
pub mod encoder;
pub mod error;
pub mod field;
pub mod key_values;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod sampling;
pub mod tee;
pub mod write_syncer;

pub use config::{
    build_encoder, build_logger, build_logger_with, build_rotation_opts, core_options_from,
    Format, Options, RotationOptions,
};
pub use encoder::{Encoder, EncoderConfig, LevelEncoding, TIME_FORMAT};
pub use error::{LoggerError, Result};
pub use field::{Field, FieldValue};
pub use key_values::{normalize, try_fields, KvArg, KvViolation, Normalized};
pub use log_entry::{Caller, Entry};
pub use log_level::{level_func, LevelRange, LogLevel};
pub use logger::{FatalHook, InfoLogger, LevelLogger, Logger, NoopInfoLogger, StdLogger};
pub use sampling::{LogSampler, SamplerMetrics, SamplingConfig};
pub use tee::{new_tee, Core, CoreOptions, IoCore, SampledCore, Tee, TeeOption};
pub use write_syncer::{shared, SharedSink, WriteSyncer};

//! Logger configuration
//!
//! [`Options`] is plain data with serde support; [`build_logger`] turns it
//! into a [`Logger`] without touching any global state.
//!
//! ```
//! use rust_tee_logger::{build_logger, Options};
//!
//! let options = Options::from_json_str(r#"{"level": "warn", "format": "json"}"#)?;
//! let logger = build_logger(&options)?;
//! assert!(!logger.enabled(rust_tee_logger::LogLevel::Info));
//! # Ok::<(), rust_tee_logger::LoggerError>(())
//! ```

use super::encoder::{Encoder, EncoderConfig, LevelEncoding};
use super::error::{LoggerError, Result};
use super::field::FieldValue;
use super::log_level::{level_func, LogLevel};
use super::logger::{FatalHook, Logger};
use super::sampling::SamplingConfig;
use super::tee::{new_tee, CoreOptions, TeeOption};
use crate::appenders::{build_write_syncer, RotationPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Output encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Format {
    Json,
    #[default]
    Console,
}

impl From<String> for Format {
    fn from(s: String) -> Self {
        if s == "json" {
            Format::Json
        } else {
            Format::Console
        }
    }
}

impl From<Format> for String {
    fn from(format: Format) -> Self {
        format.as_str().to_string()
    }
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Console => "console",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = std::convert::Infallible;

    /// `"json"` selects JSON; every other string selects the console encoder
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Format::from(s.to_string()))
    }
}

/// Everything [`build_logger`] needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Minimum level; unparsable values mean `info`
    pub level: String,
    pub format: Format,
    /// Destinations for records from `level` up to `warn`
    pub output_paths: Vec<String>,
    /// Destinations for `warn` and above, and for the logger's own failures
    pub error_output_paths: Vec<String>,
    #[serde(rename = "maxSizeInMB")]
    pub max_size_in_mb: u64,
    pub max_age_in_days: u64,
    /// Zero keeps every backup
    pub max_backups: usize,
    pub compress: bool,
    pub enable_caller: bool,
    pub disable_stacktrace: bool,
    /// Colour level names; console format only
    pub enable_color: bool,
    pub development: bool,
    /// Duplicate sampling; `None` disables it
    pub sampling: Option<SamplingConfig>,
    /// Attached to every record, in key order
    pub initial_fields: BTreeMap<String, serde_json::Value>,
    /// Root logger name
    pub name: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            level: LogLevel::Info.to_lowercase_str().to_string(),
            format: Format::Console,
            output_paths: vec!["stdout".to_string()],
            error_output_paths: vec!["stderr".to_string()],
            max_size_in_mb: 100,
            max_age_in_days: 7,
            max_backups: 0,
            compress: false,
            enable_caller: true,
            disable_stacktrace: false,
            enable_color: false,
            development: false,
            sampling: Some(SamplingConfig::default()),
            initial_fields: BTreeMap::new(),
            name: None,
        }
    }
}

impl Options {
    /// Options with every documented default
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from JSON; missing keys keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Configured level, falling back to `info`
    pub fn parsed_level(&self) -> LogLevel {
        LogLevel::parse_or_info(&self.level)
    }

    /// Reject settings that would build a logger unable to emit anything
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidConfiguration`] naming the bad setting
    pub fn validate(&self) -> Result<()> {
        if let Some(ref sampling) = self.sampling {
            if sampling.tick.is_zero() {
                return Err(LoggerError::config("sampling", "tick must be longer than zero"));
            }
            if sampling.initial == 0 && sampling.thereafter == 0 {
                return Err(LoggerError::config(
                    "sampling",
                    "initial and thereafter are both zero, every record would be dropped",
                ));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_output_paths<S: Into<String>>(mut self, paths: impl IntoIterator<Item = S>) -> Self {
        self.output_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_error_output_paths<S: Into<String>>(
        mut self,
        paths: impl IntoIterator<Item = S>,
    ) -> Self {
        self.error_output_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_development(mut self, enabled: bool) -> Self {
        self.development = enabled;
        self
    }

    #[must_use]
    pub fn with_sampling(mut self, sampling: Option<SamplingConfig>) -> Self {
        self.sampling = sampling;
        self
    }
}

/// Resolved rotation limits shared by every file sink of one build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationOptions {
    pub max_size_mb: u64,
    pub max_age_days: u64,
    pub max_backups: usize,
    pub compress: bool,
}

impl Default for RotationOptions {
    fn default() -> Self {
        Self {
            max_size_mb: 100,
            max_age_days: 7,
            max_backups: 0,
            compress: false,
        }
    }
}

impl From<RotationOptions> for RotationPolicy {
    fn from(opts: RotationOptions) -> Self {
        RotationPolicy::new()
            .with_max_size_mb(opts.max_size_mb)
            .with_max_age_days(opts.max_age_days)
            .with_max_backups(opts.max_backups)
            .with_compression(opts.compress)
    }
}

pub fn build_rotation_opts(options: Option<&Options>) -> RotationOptions {
    match options {
        None => RotationOptions::default(),
        Some(o) => RotationOptions {
            max_size_mb: o.max_size_in_mb,
            max_age_days: o.max_age_in_days,
            max_backups: o.max_backups,
            compress: o.compress,
        },
    }
}

/// Select the encoder for the configured format
pub fn build_encoder(options: &Options) -> Encoder {
    match options.format {
        Format::Json => Encoder::Json(
            EncoderConfig::default().with_level_encoding(LevelEncoding::Lowercase),
        ),
        Format::Console => {
            let encoding = if options.enable_color {
                LevelEncoding::CapitalColor
            } else {
                LevelEncoding::Capital
            };
            Encoder::Console(EncoderConfig::default().with_level_encoding(encoding))
        }
    }
}

/// Cross-cutting behaviour derived from the options
///
/// Records at `panic` and above always carry a stack trace; with stack
/// traces enabled the threshold drops to `warn` in development mode.
pub fn core_options_from(options: &Options) -> CoreOptions {
    let stacktrace_level = if options.disable_stacktrace || !options.development {
        LogLevel::Panic
    } else {
        LogLevel::Warn
    };

    let mut core = CoreOptions::new()
        .development(options.development)
        .add_caller(options.enable_caller)
        .stacktrace_level(Some(stacktrace_level))
        .sampling(options.sampling.clone())
        .fatal_hook(FatalHook::default());
    if let Some(ref name) = options.name {
        core = core.name(name.clone());
    }
    for (key, value) in &options.initial_fields {
        core = core.initial_field(key.clone(), FieldValue::Json(value.clone()));
    }
    core
}

/// Build a logger from options
///
/// Records from the configured level through `warn` go to `output_paths`;
/// `warn` and above go to `error_output_paths`, which also receive the
/// logger's own failures.
///
/// # Errors
///
/// Returns [`crate::LoggerError::BuildSinks`] when any destination cannot be opened.
pub fn build_logger(options: &Options) -> Result<Logger> {
    build_logger_with(options, core_options_from(options))
}

/// Like [`build_logger`], with the cross-cutting options supplied by the caller
pub fn build_logger_with(options: &Options, core: CoreOptions) -> Result<Logger> {
    options.validate()?;
    let level = options.parsed_level();
    let policy: RotationPolicy = build_rotation_opts(Some(options)).into();

    let normal = build_write_syncer(&options.output_paths, &policy)?;
    let errors = build_write_syncer(&options.error_output_paths, &policy)?;

    let topts = vec![
        TeeOption::new(normal, level_func(level, LogLevel::Warn)),
        TeeOption::new(errors.clone(), level_func(level.max(LogLevel::Warn), LogLevel::Fatal)),
    ];

    Ok(new_tee(topts, build_encoder(options), core.error_output(errors)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_sampling_that_drops_everything() {
        assert!(Options::new().validate().is_ok());
        assert!(Options::new().with_sampling(None).validate().is_ok());
        assert!(Options::new()
            .with_sampling(Some(SamplingConfig::new(10, 0)))
            .validate()
            .is_ok());

        let silent = Options::new().with_sampling(Some(SamplingConfig::new(0, 0)));
        let err = build_logger(&silent).err().expect("silent sampling accepted");
        assert!(matches!(
            err,
            LoggerError::InvalidConfiguration { ref component, .. } if component == "sampling"
        ));

        let frozen = Options::new().with_sampling(Some(
            SamplingConfig::default().with_tick(std::time::Duration::ZERO),
        ));
        assert!(matches!(
            frozen.validate(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_defaults() {
        let opts = Options::new();
        assert_eq!(opts.level, "info");
        assert_eq!(opts.format, Format::Console);
        assert_eq!(opts.output_paths, vec!["stdout"]);
        assert_eq!(opts.error_output_paths, vec!["stderr"]);
        assert_eq!(opts.max_size_in_mb, 100);
        assert_eq!(opts.max_age_in_days, 7);
        assert_eq!(opts.max_backups, 0);
        assert!(!opts.compress);
        assert!(opts.enable_caller);
        assert!(!opts.disable_stacktrace);
        assert!(!opts.enable_color);
    }

    #[test]
    fn test_from_json_keeps_defaults_for_missing_keys() {
        let opts = Options::from_json_str(
            r#"{"level":"debug","format":"json","maxSizeInMB":1,"outputPaths":["/tmp/x.log"]}"#,
        )
        .unwrap();
        assert_eq!(opts.parsed_level(), LogLevel::Debug);
        assert_eq!(opts.format, Format::Json);
        assert_eq!(opts.max_size_in_mb, 1);
        assert_eq!(opts.max_age_in_days, 7);
        assert_eq!(opts.error_output_paths, vec!["stderr"]);
    }

    #[test]
    fn test_unknown_format_means_console() {
        let opts = Options::from_json_str(r#"{"format":"text"}"#).unwrap();
        assert_eq!(opts.format, Format::Console);
        assert_eq!("text".parse::<Format>(), Ok(Format::Console));
        assert_eq!("json".parse::<Format>(), Ok(Format::Json));
    }

    #[test]
    fn test_unparsable_level_falls_back_to_info() {
        let opts = Options::new().with_level("loud");
        assert_eq!(opts.parsed_level(), LogLevel::Info);
    }

    #[test]
    fn test_rotation_opts() {
        assert_eq!(build_rotation_opts(None), RotationOptions::default());
        let mut opts = Options::new();
        opts.max_backups = 3;
        opts.compress = true;
        let rot = build_rotation_opts(Some(&opts));
        assert_eq!(rot.max_backups, 3);
        assert!(rot.compress);
        assert_eq!(rot.max_size_mb, 100);
    }

    #[test]
    fn test_encoder_selection() {
        let json = build_encoder(&Options::new().with_format(Format::Json));
        assert!(matches!(json, Encoder::Json(_)));
        assert_eq!(json.config().level_encoding, LevelEncoding::Lowercase);

        let mut opts = Options::new();
        assert_eq!(build_encoder(&opts).config().level_encoding, LevelEncoding::Capital);
        opts.enable_color = true;
        assert_eq!(build_encoder(&opts).config().level_encoding, LevelEncoding::CapitalColor);
    }

    #[test]
    fn test_stacktrace_threshold() {
        let prod = core_options_from(&Options::new());
        assert_eq!(prod.stacktrace_level, Some(LogLevel::Panic));

        let dev = core_options_from(&Options::new().with_development(true));
        assert_eq!(dev.stacktrace_level, Some(LogLevel::Warn));

        let mut disabled = Options::new().with_development(true);
        disabled.disable_stacktrace = true;
        assert_eq!(core_options_from(&disabled).stacktrace_level, Some(LogLevel::Panic));
    }

    #[test]
    fn test_initial_fields_and_name() {
        let opts = Options::from_json_str(
            r#"{"name":"svc","initialFields":{"zone":"eu","app":"api"},"outputPaths":[],"errorOutputPaths":[]}"#,
        )
        .unwrap();
        let logger = build_logger(&opts).unwrap();
        assert_eq!(logger.name(), Some("svc"));
        let keys: Vec<_> = logger.context().iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["app", "zone"]);
    }

    #[test]
    fn test_level_above_warn_silences_normal_band() {
        let opts = Options::new()
            .with_level("error")
            .with_output_paths(Vec::<String>::new())
            .with_error_output_paths(Vec::<String>::new());
        let logger = build_logger(&opts).unwrap();
        assert!(!logger.enabled(LogLevel::Warn));
        assert!(logger.enabled(LogLevel::Error));
    }
}

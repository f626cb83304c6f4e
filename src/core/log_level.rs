//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
#[repr(i8)]
pub enum LogLevel {
    Debug = -1,
    #[default]
    Info = 0,
    Warn = 1,
    Error = 2,
    /// Panics in development mode, logs like `Error` otherwise
    DPanic = 3,
    Panic = 4,
    Fatal = 5,
}

impl LogLevel {
    /// Every level, least severe first
    pub const ALL: [LogLevel; 7] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::DPanic,
        LogLevel::Panic,
        LogLevel::Fatal,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::DPanic => "DPANIC",
            LogLevel::Panic => "PANIC",
            LogLevel::Fatal => "FATAL",
        }
    }

    pub fn to_lowercase_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::DPanic => "dpanic",
            LogLevel::Panic => "panic",
            LogLevel::Fatal => "fatal",
        }
    }

    /// Parse a level name, falling back to `Info` for anything unrecognised
    #[must_use]
    pub fn parse_or_info(s: &str) -> Self {
        s.parse().unwrap_or(LogLevel::Info)
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Debug => Magenta,
            LogLevel::Info => Blue,
            LogLevel::Warn => Yellow,
            LogLevel::Error | LogLevel::DPanic | LogLevel::Panic | LogLevel::Fatal => Red,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "DPANIC" => Ok(LogLevel::DPanic),
            "PANIC" => Ok(LogLevel::Panic),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

/// Inclusive severity band deciding which levels a sink accepts
///
/// An inverted band (`min > max`) accepts nothing, ever.
///
/// ```
/// use rust_tee_logger::{level_func, LogLevel};
///
/// let normal = level_func(LogLevel::Info, LogLevel::Warn);
/// assert!(normal.enabled(LogLevel::Warn));
/// assert!(!normal.enabled(LogLevel::Error));
///
/// let broken = level_func(LogLevel::Error, LogLevel::Info);
/// assert!(!broken.enabled(LogLevel::Error));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRange {
    min: LogLevel,
    max: LogLevel,
}

impl LevelRange {
    pub fn new(min: LogLevel, max: LogLevel) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> LogLevel {
        self.min
    }

    pub fn max(&self) -> LogLevel {
        self.max
    }

    /// Whether the band is well formed; a malformed band rejects every level
    pub fn is_valid(&self) -> bool {
        self.min <= self.max && self.max <= LogLevel::Fatal
    }

    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.is_valid() && self.min <= level && level <= self.max
    }
}

/// Build the severity predicate for one sink
pub fn level_func(min: LogLevel, max: LogLevel) -> LevelRange {
    LevelRange::new(min, max)
}

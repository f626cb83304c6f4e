//! Log entry structure

use super::field::Field;
use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use std::fmt;
use std::panic::Location;

/// Call site of a log statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub file: &'static str,
    pub line: u32,
}

impl Caller {
    #[track_caller]
    pub fn here() -> Self {
        Self::from(Location::caller())
    }

    /// Trim the path down to the last directory and the file name
    pub fn short_file(&self) -> &'static str {
        let file = self.file;
        let trimmed = file.trim_end_matches(['/', '\\']);
        let mut seps = trimmed.rmatch_indices(['/', '\\']);
        match (seps.next(), seps.next()) {
            (Some(_), Some((idx, _))) => &file[idx + 1..],
            _ => file,
        }
    }
}

impl From<&'static Location<'static>> for Caller {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.short_file(), self.line)
    }
}

/// A fully assembled record, ready for encoding
#[derive(Debug, Clone)]
pub struct Entry {
    pub level: LogLevel,
    pub time: DateTime<Local>,
    pub logger_name: Option<String>,
    pub caller: Option<Caller>,
    pub message: String,
    pub fields: Vec<Field>,
    pub stacktrace: Option<String>,
}

impl Entry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            time: Local::now(),
            logger_name: None,
            caller: None,
            message: message.into(),
            fields: Vec::new(),
            stacktrace: None,
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.logger_name = name;
        self
    }

    pub fn with_caller(mut self, caller: Option<Caller>) -> Self {
        self.caller = caller;
        self
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_stacktrace(mut self, stacktrace: Option<String>) -> Self {
        self.stacktrace = stacktrace;
        self
    }
}

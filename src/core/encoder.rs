//! Record encoders
//!
//! Two encodings share one key-naming scheme:
//! - Json: one object per line, for machines
//! - Console: tab-separated columns, fields as a trailing JSON object

use super::field::Field;
use super::log_entry::Entry;
use super::log_level::LogLevel;

/// Timestamp layout used by both encoders
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// How level names are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelEncoding {
    /// `info`
    Lowercase,
    /// `INFO`
    Capital,
    /// `INFO` wrapped in terminal colour codes
    CapitalColor,
}

impl LevelEncoding {
    fn encode(&self, level: LogLevel) -> String {
        match self {
            LevelEncoding::Lowercase => level.to_lowercase_str().to_string(),
            LevelEncoding::Capital => level.to_str().to_string(),
            #[cfg(feature = "console")]
            LevelEncoding::CapitalColor => {
                use colored::Colorize;
                level.to_str().color(level.color_code()).to_string()
            }
            #[cfg(not(feature = "console"))]
            LevelEncoding::CapitalColor => level.to_str().to_string(),
        }
    }
}

/// Key names and value renderings shared by every encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    pub time_key: &'static str,
    pub level_key: &'static str,
    pub name_key: &'static str,
    pub caller_key: &'static str,
    pub message_key: &'static str,
    pub stacktrace_key: &'static str,
    pub line_ending: &'static str,
    pub level_encoding: LevelEncoding,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            time_key: "time",
            level_key: "level",
            name_key: "logger",
            caller_key: "caller",
            message_key: "msg",
            stacktrace_key: "stacktrace",
            line_ending: "\n",
            level_encoding: LevelEncoding::Capital,
        }
    }
}

impl EncoderConfig {
    #[must_use]
    pub fn with_level_encoding(mut self, encoding: LevelEncoding) -> Self {
        self.level_encoding = encoding;
        self
    }
}

/// Encoder selected from the configured format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoder {
    Json(EncoderConfig),
    Console(EncoderConfig),
}

impl Encoder {
    pub fn config(&self) -> &EncoderConfig {
        match self {
            Encoder::Json(cfg) | Encoder::Console(cfg) => cfg,
        }
    }

    /// Encode one record into a single line (plus an optional stack trace)
    pub fn encode(&self, entry: &Entry) -> String {
        match self {
            Encoder::Json(cfg) => encode_json(cfg, entry),
            Encoder::Console(cfg) => encode_console(cfg, entry),
        }
    }
}

fn push_json_pair(out: &mut String, first: &mut bool, key: &str, value: &serde_json::Value) {
    if !*first {
        out.push(',');
    }
    *first = false;
    // Serializing a str or Value cannot fail
    out.push_str(&serde_json::to_string(key).unwrap_or_default());
    out.push(':');
    out.push_str(&serde_json::to_string(value).unwrap_or_default());
}

fn encode_json(cfg: &EncoderConfig, entry: &Entry) -> String {
    use serde_json::Value;

    let mut out = String::with_capacity(128);
    let mut first = true;
    out.push('{');

    push_json_pair(
        &mut out,
        &mut first,
        cfg.level_key,
        &Value::String(cfg.level_encoding.encode(entry.level)),
    );
    push_json_pair(
        &mut out,
        &mut first,
        cfg.time_key,
        &Value::String(entry.time.format(TIME_FORMAT).to_string()),
    );
    if let Some(ref name) = entry.logger_name {
        push_json_pair(&mut out, &mut first, cfg.name_key, &Value::String(name.clone()));
    }
    if let Some(caller) = entry.caller {
        push_json_pair(
            &mut out,
            &mut first,
            cfg.caller_key,
            &Value::String(caller.to_string()),
        );
    }
    push_json_pair(
        &mut out,
        &mut first,
        cfg.message_key,
        &Value::String(entry.message.clone()),
    );
    for field in &entry.fields {
        push_json_pair(&mut out, &mut first, &field.key, &field.value.to_json_value());
    }
    if let Some(ref stack) = entry.stacktrace {
        push_json_pair(
            &mut out,
            &mut first,
            cfg.stacktrace_key,
            &Value::String(stack.clone()),
        );
    }

    out.push('}');
    out.push_str(cfg.line_ending);
    out
}

fn fields_json(fields: &[Field]) -> String {
    let mut out = String::from("{");
    let mut first = true;
    for field in fields {
        push_json_pair(&mut out, &mut first, &field.key, &field.value.to_json_value());
    }
    out.push('}');
    out
}

fn encode_console(cfg: &EncoderConfig, entry: &Entry) -> String {
    let mut columns = vec![
        entry.time.format(TIME_FORMAT).to_string(),
        cfg.level_encoding.encode(entry.level),
    ];
    if let Some(ref name) = entry.logger_name {
        columns.push(name.clone());
    }
    if let Some(caller) = entry.caller {
        columns.push(caller.to_string());
    }
    columns.push(entry.message.clone());
    if !entry.fields.is_empty() {
        columns.push(fields_json(&entry.fields));
    }

    let mut out = columns.join("\t");
    if let Some(ref stack) = entry.stacktrace {
        out.push('\n');
        out.push_str(stack.trim_end());
    }
    out.push_str(cfg.line_ending);
    out
}

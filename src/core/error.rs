//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// A configured destination could not be opened
    #[error("Failed to open sink '{path}': {message}")]
    SinkOpen { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotation { path: String, message: String },

    /// A single write larger than the rotation limit
    #[error("Write length {length} exceeds maximum file size {max}")]
    WriteTooLarge { length: u64, max: u64 },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Every failure collected while building one set of sinks
    #[error("Failed to build sinks: [{}]", join_errors(.0))]
    BuildSinks(Vec<LoggerError>),

    /// Malformed alternating key/value list
    #[error("Invalid key-value arguments at index {index}: {reason}")]
    InvalidKeyValues { index: usize, reason: String },
}

fn join_errors(errors: &[LoggerError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a sink open error
    pub fn sink_open(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::SinkOpen {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a key-value contract error
    pub fn invalid_key_values(index: usize, reason: impl Into<String>) -> Self {
        LoggerError::InvalidKeyValues {
            index,
            reason: reason.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }
}

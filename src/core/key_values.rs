//! Alternating key/value argument lists
//!
//! The `*w` logging methods accept a flat list such as
//! `kvs!["elapsedMs", 120, "op", "read"]`. Keys must be strings; anything
//! else stops normalization at that point and the rest of the list is dropped.

use super::error::{LoggerError, Result};
use super::field::{Field, FieldValue};

/// One element of an alternating key/value list
#[derive(Debug, Clone, PartialEq)]
pub enum KvArg {
    Value(FieldValue),
    /// A pre-typed field; never valid in a key/value list
    Field(Field),
}

macro_rules! kv_arg_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for KvArg {
                fn from(v: $ty) -> Self {
                    KvArg::Value(v.into())
                }
            }
        )*
    };
}

kv_arg_from!(
    FieldValue,
    String,
    &str,
    i64,
    i32,
    u64,
    u32,
    u16,
    usize,
    f64,
    bool,
    std::time::Duration,
    serde_json::Value,
);

impl From<Field> for KvArg {
    fn from(f: Field) -> Self {
        KvArg::Field(f)
    }
}

/// Why normalization stopped early
#[derive(Debug, Clone, PartialEq)]
pub enum KvViolation {
    /// A pre-typed field sat where a key was expected
    TypedField { index: usize, field: Field },
    /// The list ended with a key that has no value
    OddCount { index: usize, ignored_key: FieldValue },
    /// A key position held a non-string value
    NonStringKey { index: usize, invalid_key: FieldValue },
}

impl KvViolation {
    /// Message used for the diagnostic self-log
    pub fn message(&self) -> &'static str {
        match self {
            KvViolation::TypedField { .. } => "strongly-typed field passed as a key-value argument",
            KvViolation::OddCount { .. } => {
                "odd number of arguments passed as key-value pairs for logging"
            }
            KvViolation::NonStringKey { .. } => {
                "non-string key argument passed to logging, ignoring all later arguments"
            }
        }
    }

    /// The offending argument, as a field for the diagnostic record
    pub fn field(&self) -> Field {
        match self {
            KvViolation::TypedField { field, .. } => {
                Field::string("typed field", field.to_string())
            }
            KvViolation::OddCount { ignored_key, .. } => {
                Field::new("ignored key", ignored_key.clone())
            }
            KvViolation::NonStringKey { invalid_key, .. } => {
                Field::new("invalid key", invalid_key.clone())
            }
        }
    }

    pub fn index(&self) -> usize {
        match self {
            KvViolation::TypedField { index, .. }
            | KvViolation::OddCount { index, .. }
            | KvViolation::NonStringKey { index, .. } => *index,
        }
    }
}

/// Result of lenient normalization
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub fields: Vec<Field>,
    pub violation: Option<KvViolation>,
}

/// Convert a key/value list into fields, keeping the well-formed prefix
///
/// `additional` is appended after the converted pairs whatever happens.
pub fn normalize(args: &[KvArg], additional: &[Field]) -> Normalized {
    if args.is_empty() {
        return Normalized {
            fields: additional.to_vec(),
            violation: None,
        };
    }

    let mut fields = Vec::with_capacity(args.len() / 2 + additional.len());
    let mut violation = None;
    let mut i = 0;
    while i < args.len() {
        let key = match &args[i] {
            KvArg::Field(field) => {
                violation = Some(KvViolation::TypedField {
                    index: i,
                    field: field.clone(),
                });
                break;
            }
            KvArg::Value(key) => key,
        };

        if i == args.len() - 1 {
            violation = Some(KvViolation::OddCount {
                index: i,
                ignored_key: key.clone(),
            });
            break;
        }

        let Some(key) = key.as_str() else {
            violation = Some(KvViolation::NonStringKey {
                index: i,
                invalid_key: key.clone(),
            });
            break;
        };

        let value = match &args[i + 1] {
            KvArg::Value(v) => v.clone(),
            KvArg::Field(f) => FieldValue::String(f.to_string()),
        };
        fields.push(Field::new(key, value));
        i += 2;
    }

    fields.extend_from_slice(additional);
    Normalized { fields, violation }
}

/// Strict conversion: any malformed list is an error instead of being truncated
pub fn try_fields(args: &[KvArg]) -> Result<Vec<Field>> {
    let normalized = normalize(args, &[]);
    match normalized.violation {
        None => Ok(normalized.fields),
        Some(v) => Err(LoggerError::invalid_key_values(v.index(), v.message())),
    }
}

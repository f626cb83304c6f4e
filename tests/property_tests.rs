//! Property-based tests for rust_tee_logger using proptest

use parking_lot::Mutex;
use proptest::prelude::*;
use rust_tee_logger::core::key_values::normalize;
use rust_tee_logger::prelude::*;
use rust_tee_logger::core::write_syncer::shared;
use rust_tee_logger::{new_tee, CoreOptions, Encoder, EncoderConfig, TeeOption, WriteSyncer};
use std::sync::Arc;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop::sample::select(LogLevel::ALL.to_vec())
}

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    fn line_count(&self) -> usize {
        String::from_utf8_lossy(&self.0.lock()).lines().count()
    }
}

impl WriteSyncer for Buffer {
    fn write_all(&mut self, buf: &[u8]) -> rust_tee_logger::Result<()> {
        self.0.lock().extend_from_slice(buf);
        Ok(())
    }
    fn sync(&mut self) -> rust_tee_logger::Result<()> {
        Ok(())
    }
    fn name(&self) -> &str {
        "buffer"
    }
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Level names parse back to the same level, in any case
    #[test]
    fn test_log_level_str_roundtrip(level in any_level(), lower in any::<bool>()) {
        let name = if lower { level.to_lowercase_str().to_string() } else { level.to_str().to_string() };
        let parsed: LogLevel = name.parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Unknown names always fall back to info
    #[test]
    fn test_unknown_level_is_info(name in "[a-z]{8,12}") {
        prop_assume!(name.parse::<LogLevel>().is_err());
        prop_assert_eq!(LogLevel::parse_or_info(&name), LogLevel::Info);
    }

    /// A band accepts exactly the levels between its bounds, and nothing when inverted
    #[test]
    fn test_level_func_band(min in any_level(), max in any_level(), level in any_level()) {
        let band = level_func(min, max);
        prop_assert_eq!(band.enabled(level), min <= max && min <= level && level <= max);
    }
}

// ============================================================================
// Level Gating Tests
// ============================================================================

proptest! {
    /// A record is emitted iff its level is at or above the configured minimum
    #[test]
    fn test_level_gating_is_monotonic(min in any_level(), level in prop::sample::select(vec![
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ])) {
        let out = Buffer::default();
        let logger = new_tee(
            vec![TeeOption::new(shared(out.clone()), level_func(min, LogLevel::Fatal))],
            Encoder::Console(EncoderConfig::default()),
            CoreOptions::new(),
        );

        logger.log(level, "probe", &[]);
        prop_assert_eq!(out.line_count(), usize::from(level >= min));
        prop_assert_eq!(logger.enabled(level), level >= min);
    }
}

// ============================================================================
// Key/Value Normalization Tests
// ============================================================================

fn kv_element() -> impl Strategy<Value = KvArg> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(KvArg::from),
        any::<i64>().prop_map(KvArg::from),
        any::<bool>().prop_map(KvArg::from),
    ]
}

proptest! {
    /// An empty list returns the pre-built fields unchanged
    #[test]
    fn test_empty_list_returns_additional(keys in prop::collection::vec("[a-z]{1,6}", 0..5)) {
        let additional: Vec<Field> = keys.iter().map(|k| Field::bool(k.as_str(), true)).collect();
        let normalized = normalize(&[], &additional);
        prop_assert_eq!(normalized.fields, additional);
        prop_assert!(normalized.violation.is_none());
    }

    /// Output is always the well-formed prefix followed by the pre-built fields
    #[test]
    fn test_normalize_keeps_well_formed_prefix(args in prop::collection::vec(kv_element(), 0..12)) {
        let additional = vec![Field::string("extra", "tail")];
        let normalized = normalize(&args, &additional);

        let mut expected = Vec::new();
        let mut malformed = false;
        for pair in args.chunks(2) {
            match pair {
                [KvArg::Value(FieldValue::String(key)), KvArg::Value(value)] => {
                    expected.push(Field::new(key.as_str(), value.clone()));
                }
                _ => {
                    malformed = true;
                    break;
                }
            }
        }
        expected.extend(additional.iter().cloned());

        prop_assert_eq!(normalized.fields, expected);
        prop_assert_eq!(normalized.violation.is_some(), malformed);
    }

    /// Well-formed lists are accepted by the strict converter
    #[test]
    fn test_try_fields_accepts_pairs(pairs in prop::collection::vec(("[a-z]{1,6}", any::<i64>()), 0..6)) {
        let args: Vec<KvArg> = pairs
            .iter()
            .flat_map(|(k, v)| [KvArg::from(k.as_str()), KvArg::from(*v)])
            .collect();
        let fields = rust_tee_logger::try_fields(&args).unwrap();
        prop_assert_eq!(fields.len(), pairs.len());
    }
}

//! Log sampling for high-volume scenarios
//!
//! Within each tick, the first `initial` records carrying the same level and
//! message are kept; after that only every `thereafter`-th duplicate is.
//! Messages are counted in a fixed table indexed by a hash of the message, so
//! memory stays bounded and rare collisions share a counter.
//!
//! # Example
//!
//! ```
//! use rust_tee_logger::{LogLevel, LogSampler, SamplingConfig};
//!
//! let sampler = LogSampler::new(SamplingConfig::new(2, 3));
//! let kept: Vec<bool> = (0..6)
//!     .map(|_| sampler.should_sample(LogLevel::Info, "tick"))
//!     .collect();
//! assert_eq!(kept, vec![true, true, false, false, true, false]);
//! ```

use super::log_level::LogLevel;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

const COUNTERS_PER_LEVEL: usize = 4096;

fn default_tick() -> Duration {
    Duration::from_secs(1)
}

/// Configuration for duplicate-record sampling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Length of one counting window
    #[serde(skip, default = "default_tick")]
    pub tick: Duration,

    /// Duplicates always kept at the start of each tick
    pub initial: u64,

    /// After `initial`, keep one duplicate in this many
    ///
    /// Zero drops every duplicate past `initial`.
    pub thereafter: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            tick: default_tick(),
            initial: 100,
            thereafter: 100,
        }
    }
}

impl SamplingConfig {
    pub fn new(initial: u64, thereafter: u64) -> Self {
        Self {
            initial,
            thereafter,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }
}

/// Metrics for sampling observability
///
/// ```
/// use rust_tee_logger::SamplerMetrics;
///
/// let metrics = SamplerMetrics::new();
/// assert_eq!(metrics.sampled_count(), 0);
/// assert_eq!(metrics.dropped_count(), 0);
/// ```
#[derive(Debug)]
pub struct SamplerMetrics {
    sampled_count: AtomicU64,
    dropped_count: AtomicU64,
}

impl SamplerMetrics {
    pub const fn new() -> Self {
        Self {
            sampled_count: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn sampled_count(&self) -> u64 {
        self.sampled_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn total_count(&self) -> u64 {
        self.sampled_count() + self.dropped_count()
    }

    #[inline]
    fn record_sampled(&self) {
        self.sampled_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_dropped(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.sampled_count.store(0, Ordering::Relaxed);
        self.dropped_count.store(0, Ordering::Relaxed);
    }
}

impl Default for SamplerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct Window {
    started: Instant,
    counts: Box<[u64]>,
}

/// 32-bit FNV-1a
fn fnv32a(s: &str) -> u32 {
    s.bytes().fold(0x811c_9dc5_u32, |hash, b| {
        (hash ^ u32::from(b)).wrapping_mul(0x0100_0193)
    })
}

fn counter_index(level: LogLevel, message: &str) -> usize {
    let level_slot = (level as i8 - LogLevel::Debug as i8) as usize;
    level_slot * COUNTERS_PER_LEVEL + fnv32a(message) as usize % COUNTERS_PER_LEVEL
}

/// Decides, per record, whether a duplicate survives sampling
#[derive(Debug)]
pub struct LogSampler {
    config: SamplingConfig,
    window: Mutex<Window>,
    metrics: SamplerMetrics,
}

impl LogSampler {
    pub fn new(config: SamplingConfig) -> Self {
        Self {
            config,
            window: Mutex::new(Window {
                started: Instant::now(),
                counts: vec![0; LogLevel::ALL.len() * COUNTERS_PER_LEVEL].into_boxed_slice(),
            }),
            metrics: SamplerMetrics::new(),
        }
    }

    /// Count this record and report whether it should be written
    pub fn should_sample(&self, level: LogLevel, message: &str) -> bool {
        let n = {
            let mut window = self.window.lock();
            if window.started.elapsed() >= self.config.tick {
                window.started = Instant::now();
                window.counts.fill(0);
            }
            let count = &mut window.counts[counter_index(level, message)];
            *count += 1;
            *count
        };

        let keep = n <= self.config.initial
            || (self.config.thereafter > 0
                && (n - self.config.initial) % self.config.thereafter == 0);

        if keep {
            self.metrics.record_sampled();
        } else {
            self.metrics.record_dropped();
        }
        keep
    }

    pub fn metrics(&self) -> &SamplerMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampling_config_default() {
        let config = SamplingConfig::default();
        assert_eq!(config.initial, 100);
        assert_eq!(config.thereafter, 100);
        assert_eq!(config.tick, Duration::from_secs(1));
    }

    #[test]
    fn test_first_initial_always_kept() {
        let sampler = LogSampler::new(SamplingConfig::new(100, 100));
        for _ in 0..100 {
            assert!(sampler.should_sample(LogLevel::Info, "same"));
        }
        // 101..=199 dropped, 200 kept
        for _ in 101..200 {
            assert!(!sampler.should_sample(LogLevel::Info, "same"));
        }
        assert!(sampler.should_sample(LogLevel::Info, "same"));
        assert_eq!(sampler.metrics().sampled_count(), 101);
        assert_eq!(sampler.metrics().dropped_count(), 99);
    }

    #[test]
    fn test_distinct_messages_and_levels_counted_separately() {
        let sampler = LogSampler::new(SamplingConfig::new(1, 0));
        assert!(sampler.should_sample(LogLevel::Info, "a"));
        assert!(sampler.should_sample(LogLevel::Info, "b"));
        assert!(sampler.should_sample(LogLevel::Warn, "a"));
        assert!(!sampler.should_sample(LogLevel::Info, "a"));
    }

    #[test]
    fn test_counters_reset_each_tick() {
        let sampler = LogSampler::new(SamplingConfig::new(1, 0).with_tick(Duration::from_millis(20)));
        assert!(sampler.should_sample(LogLevel::Info, "x"));
        assert!(!sampler.should_sample(LogLevel::Info, "x"));
        std::thread::sleep(Duration::from_millis(30));
        assert!(sampler.should_sample(LogLevel::Info, "x"));
    }

    #[test]
    fn test_counter_table_is_bounded() {
        let sampler = LogSampler::new(SamplingConfig::new(1, 0));
        for i in 0..10_000 {
            sampler.should_sample(LogLevel::Info, &format!("request {}", i));
        }
        assert_eq!(sampler.window.lock().counts.len(), LogLevel::ALL.len() * COUNTERS_PER_LEVEL);
        assert!(counter_index(LogLevel::Fatal, "x") < LogLevel::ALL.len() * COUNTERS_PER_LEVEL);
        assert_eq!(sampler.metrics().total_count(), 10_000);
    }

    #[test]
    fn test_fnv32a_reference_values() {
        assert_eq!(fnv32a(""), 0x811c_9dc5);
        assert_eq!(fnv32a("a"), 0xe40c_292c);
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = SamplerMetrics::new();
        metrics.record_sampled();
        metrics.record_dropped();
        assert_eq!(metrics.total_count(), 2);
        metrics.reset();
        assert_eq!(metrics.total_count(), 0);
    }
}

//! Per-window accumulation of block features.
//!
//! Block-level feature values are appended as they arrive. `finalize`
//! reduces them to a [`WindowStatistics`] snapshot and clears the sequences
//! in the same call, so no value ever leaks into the next window.
//!
//! Variance is the population variance (divide by N), computed with
//! Welford's update. Mean and variance of an empty sequence are both 0.0,
//! which keeps NaN out of the comparator.

use serde::{Deserialize, Serialize};

/// Window-level statistics, immutable once produced
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowStatistics {
    pub avg_amplitude: f64,
    pub var_amplitude: f64,
    /// Mean spectral centroid, as a bin index
    pub avg_frequency: f64,
    pub var_frequency: f64,
    pub avg_zcr: f64,
    /// Completion time in milliseconds since the UNIX epoch
    pub timestamp: u64,
}

/// Mean and population variance in one pass (Welford)
///
/// The running update leaves a constant sequence with a mean equal to that
/// constant and a variance of exactly 0.0, whatever its length.
pub fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for (i, &x) in values.iter().enumerate() {
        let delta = x - mean;
        mean += delta / (i + 1) as f64;
        m2 += delta * (x - mean);
    }

    if values.is_empty() {
        (0.0, 0.0)
    } else {
        (mean, m2 / values.len() as f64)
    }
}

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    mean_and_variance(values).0
}

/// Population variance; 0.0 for an empty slice
pub fn variance(values: &[f64]) -> f64 {
    mean_and_variance(values).1
}

/// Feature samples collected for the window in progress
#[derive(Debug, Default)]
pub struct WindowAccumulator {
    amplitudes: Vec<f64>,
    frequencies: Vec<f64>,
    zcrs: Vec<f64>,
}

impl WindowAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_amplitude(&mut self, value: f64) {
        self.amplitudes.push(value);
    }

    pub fn add_frequency(&mut self, value: f64) {
        self.frequencies.push(value);
    }

    pub fn add_zcr(&mut self, value: f64) {
        self.zcrs.push(value);
    }

    pub fn amplitude_count(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn frequency_count(&self) -> usize {
        self.frequencies.len()
    }

    /// Reduce the collected samples to statistics stamped with `now_ms`
    ///
    /// The sequences are emptied as part of the call; their capacity is
    /// kept for the next window.
    pub fn finalize(&mut self, now_ms: u64) -> WindowStatistics {
        let (avg_amplitude, var_amplitude) = mean_and_variance(&self.amplitudes);
        let (avg_frequency, var_frequency) = mean_and_variance(&self.frequencies);
        let stats = WindowStatistics {
            avg_amplitude,
            var_amplitude,
            avg_frequency,
            var_frequency,
            avg_zcr: mean(&self.zcrs),
            timestamp: now_ms,
        };

        self.amplitudes.clear();
        self.frequencies.clear();
        self.zcrs.clear();

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_variance() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < 1e-12);
        // Population variance, not sample variance (which would be 32/7)
        assert!((variance(&values) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_sequences_are_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(variance(&[]), 0.0);
    }

    #[test]
    fn test_variance_of_constant_is_exactly_zero() {
        for len in [1usize, 2, 7, 100, 1_000] {
            let values = vec![0.137; len];
            assert_eq!(variance(&values), 0.0, "len {}", len);
        }
    }

    #[test]
    fn test_finalize_computes_statistics() {
        let mut acc = WindowAccumulator::new();
        for value in [0.1, 0.3] {
            acc.add_amplitude(value);
        }
        acc.add_frequency(10.0);
        acc.add_frequency(30.0);
        acc.add_zcr(0.2);

        let stats = acc.finalize(42);
        assert!((stats.avg_amplitude - 0.2).abs() < 1e-12);
        assert!((stats.var_amplitude - 0.01).abs() < 1e-12);
        assert_eq!(stats.avg_frequency, 20.0);
        assert_eq!(stats.var_frequency, 100.0);
        assert_eq!(stats.avg_zcr, 0.2);
        assert_eq!(stats.timestamp, 42);
    }

    #[test]
    fn test_finalize_resets_sequences() {
        let mut acc = WindowAccumulator::new();
        acc.add_amplitude(1.0);
        acc.add_frequency(5.0);
        acc.finalize(1);

        assert_eq!(acc.amplitude_count(), 0);
        assert_eq!(acc.frequency_count(), 0);

        let stats = acc.finalize(2);
        assert_eq!(stats.avg_amplitude, 0.0);
        assert_eq!(stats.var_amplitude, 0.0);
        assert_eq!(stats.avg_frequency, 0.0);
        assert_eq!(stats.var_frequency, 0.0);
        assert_eq!(stats.avg_zcr, 0.0);
    }

    #[test]
    fn test_window_without_frequency_samples() {
        let mut acc = WindowAccumulator::new();
        acc.add_amplitude(0.5);
        let stats = acc.finalize(0);
        assert_eq!(stats.avg_frequency, 0.0);
        assert!(!stats.var_frequency.is_nan());
    }

    #[test]
    fn test_statistics_serialize_camel_case() {
        let stats = WindowStatistics {
            avg_amplitude: 1.0,
            var_amplitude: 0.0,
            avg_frequency: 2.0,
            var_frequency: 0.0,
            avg_zcr: 0.1,
            timestamp: 7,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["avgAmplitude"], 1.0);
        assert_eq!(json["varFrequency"], 0.0);
        assert_eq!(json["avgZcr"], 0.1);
        assert_eq!(json["timestamp"], 7);
    }
}

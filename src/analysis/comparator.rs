//! Percent-change comparison of the newest window against its two predecessors.

use serde::{Deserialize, Serialize};

use super::window::{mean, WindowStatistics};
use crate::config::HISTORY_SIZE;

/// Percent change of the newest window relative to the mean of the two
/// windows before it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRecord {
    pub amp_pct: f64,
    pub freq_pct: f64,
    pub var_amp_pct: f64,
    pub var_freq_pct: f64,
}

/// Relative change from `old` to `new`, in percent
///
/// A zero baseline reports 0.0 ("no change") instead of an infinite or
/// undefined ratio.
pub fn percent_diff(old: f64, new: f64) -> f64 {
    if old == 0.0 {
        return 0.0;
    }
    (new - old) / old * 100.0
}

/// Stateless comparator over a full window history
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowComparator;

impl WindowComparator {
    pub fn new() -> Self {
        Self
    }

    /// Compare `w3` against the mean of `w1` and `w2`
    ///
    /// # Arguments
    /// * `history` - Records oldest first, as returned by
    ///   [`super::history::WindowHistory::snapshot`]
    ///
    /// # Returns
    /// `None` unless exactly three records are supplied
    pub fn compare(&self, history: &[WindowStatistics]) -> Option<ComparisonRecord> {
        if history.len() != HISTORY_SIZE {
            return None;
        }
        let (w1, w2, w3) = (&history[0], &history[1], &history[2]);

        let baseline_amp = mean(&[w1.avg_amplitude, w2.avg_amplitude]);
        let baseline_freq = mean(&[w1.avg_frequency, w2.avg_frequency]);
        let baseline_var_amp = mean(&[w1.var_amplitude, w2.var_amplitude]);
        let baseline_var_freq = mean(&[w1.var_frequency, w2.var_frequency]);

        Some(ComparisonRecord {
            amp_pct: percent_diff(baseline_amp, w3.avg_amplitude),
            freq_pct: percent_diff(baseline_freq, w3.avg_frequency),
            var_amp_pct: percent_diff(baseline_var_amp, w3.var_amplitude),
            var_freq_pct: percent_diff(baseline_var_freq, w3.var_frequency),
        })
    }
}

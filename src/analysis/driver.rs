//! StreamDriver - owns all per-stream state and runs the block pipeline.
//!
//! Per block: RMS and ZCR always, spectral centroid when the throttle admits
//! it, then a window-boundary check against the block's arrival time. A
//! boundary finalizes the accumulator, rolls the history and, once three
//! windows exist, compares the newest against the two before it.
//!
//! Boundaries are detected on block arrival, so a window can run up to one
//! block longer than `window_duration_ms`. That drift is not corrected.

use serde::{Deserialize, Serialize};

use super::clock::{Clock, SystemClock};
use super::comparator::{ComparisonRecord, WindowComparator};
use super::features::FeatureExtractor;
use super::history::WindowHistory;
use super::throttle::SpectralThrottle;
use super::window::{WindowAccumulator, WindowStatistics};
use crate::config::MonitorConfig;
use crate::error::{log_config_error, ConfigError};

/// Everything produced when a window completes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowReport {
    pub statistics: WindowStatistics,
    /// Present from the third completed window onward
    pub comparison: Option<ComparisonRecord>,
}

/// Synchronous entry point for sample blocks
///
/// Not internally synchronized: callers must deliver blocks one at a time.
/// [`crate::engine::spawn_driver_thread`] does that for live capture.
pub struct StreamDriver<C: Clock = SystemClock> {
    clock: C,
    window_duration_ms: u64,
    extractor: FeatureExtractor,
    throttle: SpectralThrottle,
    accumulator: WindowAccumulator,
    history: WindowHistory,
    comparator: WindowComparator,
    window_start_ms: u64,
    windows_completed: u64,
}

impl StreamDriver<SystemClock> {
    /// Create a driver timed by the wall clock
    pub fn new(config: &MonitorConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> StreamDriver<C> {
    /// Create a driver timed by `clock`
    ///
    /// The first window starts at `clock.now_ms()`.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found by [`MonitorConfig::validate`].
    pub fn with_clock(config: &MonitorConfig, clock: C) -> Result<Self, ConfigError> {
        if let Err(err) = config.validate() {
            log_config_error(&err, "StreamDriver::with_clock");
            return Err(err);
        }

        let window_start_ms = clock.now_ms();
        tracing::debug!(
            "[StreamDriver] Created: window {} ms, fft {} every {} ms, start {}",
            config.window.window_duration_ms,
            config.spectral.fft_size,
            config.spectral.fft_interval_ms,
            window_start_ms
        );

        Ok(Self {
            clock,
            window_duration_ms: config.window.window_duration_ms,
            extractor: FeatureExtractor::new(config.spectral.fft_size)?,
            throttle: SpectralThrottle::new(config.spectral.fft_interval_ms),
            accumulator: WindowAccumulator::new(),
            history: WindowHistory::new(),
            comparator: WindowComparator::new(),
            window_start_ms,
            windows_completed: 0,
        })
    }

    /// Process one block, timed by the driver's clock
    pub fn on_block(&mut self, samples: &[f32]) -> Option<WindowReport> {
        let now_ms = self.clock.now_ms();
        self.on_block_at(samples, now_ms)
    }

    /// Process one block that arrived at `now_ms`
    ///
    /// # Returns
    /// A report when this block closed a window, otherwise `None`. Empty
    /// blocks are ignored entirely, including for the boundary check.
    pub fn on_block_at(&mut self, samples: &[f32], now_ms: u64) -> Option<WindowReport> {
        if samples.is_empty() {
            return None;
        }

        self.accumulator
            .add_amplitude(self.extractor.compute_rms(samples));
        self.accumulator.add_zcr(self.extractor.compute_zcr(samples));

        if self.throttle.should_compute(now_ms) {
            self.accumulator
                .add_frequency(self.extractor.compute_spectral_centroid(samples));
            self.throttle.mark_computed(now_ms);
        }

        if now_ms.saturating_sub(self.window_start_ms) >= self.window_duration_ms {
            let report = self.complete_window(now_ms);
            self.window_start_ms = now_ms;
            return Some(report);
        }

        None
    }

    fn complete_window(&mut self, now_ms: u64) -> WindowReport {
        let amplitude_samples = self.accumulator.amplitude_count();
        let frequency_samples = self.accumulator.frequency_count();

        let statistics = self.accumulator.finalize(now_ms);
        self.history.push(statistics);
        let comparison = self.comparator.compare(&self.history.snapshot());
        self.windows_completed += 1;

        tracing::debug!(
            "[StreamDriver] Window {} closed after {} ms: {} amplitude / {} frequency samples, avg amp {:.4}, avg centroid bin {:.1}",
            self.windows_completed,
            now_ms.saturating_sub(self.window_start_ms),
            amplitude_samples,
            frequency_samples,
            statistics.avg_amplitude,
            statistics.avg_frequency
        );

        if let Some(ref cmp) = comparison {
            tracing::info!(
                "[StreamDriver] Shift vs previous two windows: amp {:+.1}%, freq {:+.1}%, var amp {:+.1}%, var freq {:+.1}%",
                cmp.amp_pct,
                cmp.freq_pct,
                cmp.var_amp_pct,
                cmp.var_freq_pct
            );
        }

        WindowReport {
            statistics,
            comparison,
        }
    }

    pub fn window_start_ms(&self) -> u64 {
        self.window_start_ms
    }

    pub fn windows_completed(&self) -> u64 {
        self.windows_completed
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

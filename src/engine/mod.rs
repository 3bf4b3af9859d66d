//! Engine module - threaded live pipeline around the StreamDriver.
//!
//! Capture code (a cpal callback, a test, a file pump) submits blocks through
//! a [`CaptureSource`], which stamps each block with its arrival time and
//! hands it to the driver thread over lock-free queues. Window reports are
//! broadcast to any number of subscribers.
//!
//! ```text
//! capture ──CaptureSource──▶ BufferPool ──▶ driver thread ──▶ broadcast<WindowReport>
//! ```

pub mod buffer_pool;
#[cfg(feature = "capture")]
pub mod cpal_capture;
mod driver_thread;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::sync::broadcast;

use crate::analysis::{Clock, StreamDriver, SystemClock, WindowReport};
use crate::config::MonitorConfig;
use crate::error::{log_audio_error, AudioError};

pub use buffer_pool::{AudioBlock, BufferPool, CaptureChannels, DriverThreadChannels};
#[cfg(feature = "capture")]
pub use cpal_capture::CpalCapture;
pub use driver_thread::spawn_driver_thread;

/// Broadcast capacity for window reports
const REPORT_CHANNEL_CAPACITY: usize = 64;

/// Convert one signed 16-bit PCM sample to a float in [-1.0, 1.0)
#[inline]
pub fn i16_to_f32(sample: i16) -> f32 {
    sample as f32 / 32768.0
}

/// Capture-side handle returned by [`MonitorEngine::start`]
///
/// Every submitted block is stamped with `clock.now_ms()` at the moment of
/// submission. Submission never blocks or allocates: if the driver thread
/// has fallen behind the block is dropped and counted, and anything past
/// `block_size` samples is cut off and counted.
pub struct CaptureSource<C: Clock = SystemClock> {
    channels: CaptureChannels,
    clock: C,
    truncated_reported: u64,
}

impl<C: Clock> CaptureSource<C> {
    pub fn new(channels: CaptureChannels, clock: C) -> Self {
        Self {
            channels,
            clock,
            truncated_reported: 0,
        }
    }

    /// Submit a mono block of float samples
    pub fn submit(&mut self, samples: &[f32]) -> bool {
        let arrived_at_ms = self.clock.now_ms();
        let queued = self.channels.submit(samples, arrived_at_ms);
        self.note_drop(queued)
    }

    /// Submit a mono block of signed 16-bit PCM samples
    pub fn submit_i16(&mut self, samples: &[i16]) -> bool {
        let arrived_at_ms = self.clock.now_ms();
        let queued = self.channels.submit_with(arrived_at_ms, |buffer, limit| {
            buffer.extend(samples.iter().take(limit).map(|&s| i16_to_f32(s)));
            samples.len()
        });
        self.note_drop(queued)
    }

    /// Submit interleaved frames, keeping only the first channel
    pub fn submit_frames<T, F>(&mut self, data: &[T], channel_count: usize, convert: F) -> bool
    where
        T: Copy,
        F: Fn(T) -> f32,
    {
        let stride = channel_count.max(1);
        let arrived_at_ms = self.clock.now_ms();
        let queued = self.channels.submit_with(arrived_at_ms, |buffer, limit| {
            buffer.extend(data.iter().step_by(stride).take(limit).map(|&s| convert(s)));
            data.len().div_ceil(stride)
        });
        self.note_drop(queued)
    }

    /// Blocks dropped because the pool was exhausted
    pub fn dropped_blocks(&self) -> u64 {
        self.channels.dropped_blocks()
    }

    /// Blocks cut to `block_size` samples
    pub fn truncated_blocks(&self) -> u64 {
        self.channels.truncated_blocks()
    }

    fn note_drop(&mut self, queued: bool) -> bool {
        let truncated = self.channels.truncated_blocks();
        if truncated != self.truncated_reported {
            self.truncated_reported = truncated;
            if truncated == 1 || truncated % 100 == 0 {
                tracing::warn!(
                    "[CaptureSource] Device delivered more than block_size frames, {} blocks truncated so far",
                    truncated
                );
            }
        }
        if !queued {
            let dropped = self.channels.dropped_blocks();
            // Rate-limited: first drop, then every 100th
            if dropped == 1 || dropped % 100 == 0 {
                tracing::warn!(
                    "[CaptureSource] Driver thread behind, {} blocks dropped so far",
                    dropped
                );
            }
        }
        queued
    }
}

/// Live monitor: one driver thread plus a report broadcast
///
/// # Lifecycle
/// `start()` spawns the driver thread and returns the [`CaptureSource`] to
/// feed it; `stop()` lets the thread drain whatever is queued and joins it.
/// A stopped engine may be started again, beginning with a fresh window
/// history.
pub struct MonitorEngine<C: Clock + Clone + 'static = SystemClock> {
    config: MonitorConfig,
    clock: C,
    report_tx: broadcast::Sender<WindowReport>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl MonitorEngine<SystemClock> {
    /// Create an engine timed by the wall clock
    pub fn new(config: MonitorConfig) -> Result<Self, AudioError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock + Clone + 'static> MonitorEngine<C> {
    /// Create an engine timed by `clock`
    ///
    /// # Errors
    /// Returns [`AudioError::InvalidConfig`] if the configuration is invalid.
    pub fn with_clock(config: MonitorConfig, clock: C) -> Result<Self, AudioError> {
        config.validate()?;
        let (report_tx, _) = broadcast::channel(REPORT_CHANNEL_CAPACITY);

        Ok(Self {
            config,
            clock,
            report_tx,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Receive every window report produced after this call
    pub fn subscribe(&self) -> broadcast::Receiver<WindowReport> {
        self.report_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Spawn the driver thread and return the capture side
    ///
    /// The first window starts at the clock's current time.
    ///
    /// # Errors
    /// Returns [`AudioError::AlreadyRunning`] if the engine is running.
    pub fn start(&mut self) -> Result<CaptureSource<C>, AudioError> {
        if self.running.swap(true, Ordering::SeqCst) {
            let err = AudioError::AlreadyRunning;
            log_audio_error(&err, "MonitorEngine::start");
            return Err(err);
        }

        let driver = match StreamDriver::with_clock(&self.config, self.clock.clone()) {
            Ok(driver) => driver,
            Err(err) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(err.into());
            }
        };

        let (capture_channels, driver_channels) = BufferPool::new(
            self.config.audio.buffer_pool_size,
            self.config.audio.block_size,
        )
        .split_for_threads();

        self.worker = Some(spawn_driver_thread(
            driver_channels,
            driver,
            self.report_tx.clone(),
            Arc::clone(&self.running),
        ));

        tracing::info!(
            "[MonitorEngine] Started: {} Hz, {} samples/block, {} ms windows",
            self.config.audio.sample_rate,
            self.config.audio.block_size,
            self.config.window.window_duration_ms
        );

        Ok(CaptureSource::new(capture_channels, self.clock.clone()))
    }

    /// Stop the driver thread after it drains queued blocks
    ///
    /// # Errors
    /// Returns [`AudioError::NotRunning`] if the engine was not started, or
    /// [`AudioError::StreamFailure`] if the driver thread panicked.
    pub fn stop(&mut self) -> Result<(), AudioError> {
        if !self.running.swap(false, Ordering::SeqCst) {
            let err = AudioError::NotRunning;
            log_audio_error(&err, "MonitorEngine::stop");
            return Err(err);
        }

        if let Some(worker) = self.worker.take() {
            worker.join().map_err(|_| AudioError::StreamFailure {
                reason: "driver thread panicked".to_string(),
            })?;
        }

        tracing::info!("[MonitorEngine] Stopped");
        Ok(())
    }
}

impl<C: Clock + Clone + 'static> Drop for MonitorEngine<C> {
    fn drop(&mut self) {
        if self.is_running() {
            let _ = self.stop();
        }
    }
}

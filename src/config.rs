//! Configuration management for the monitor pipeline
//!
//! This module provides runtime configuration loading from JSON files so the
//! window length, spectral throttle and capture block size can be tuned
//! without recompilation. Every config is validated once, before a stream
//! starts; nothing in the analysis core re-checks it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Number of completed windows the comparator works over
pub const HISTORY_SIZE: usize = 3;

/// Complete monitor configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub spectral: SpectralConfig,
}

/// Capture-side parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Samples per delivered block
    pub block_size: usize,
    /// Number of pre-allocated blocks between capture and driver thread
    pub buffer_pool_size: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            block_size: 1024,
            buffer_pool_size: 32,
        }
    }
}

/// Window aggregation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Nominal window length in milliseconds
    pub window_duration_ms: u64,
    /// Rolling history length; the comparator assumes exactly 3
    pub history_size: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_duration_ms: 8000,
            history_size: HISTORY_SIZE,
        }
    }
}

/// Spectral analysis parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralConfig {
    /// Transform length `F`; blocks shorter than this yield a 0.0 centroid
    pub fft_size: usize,
    /// Minimum spacing between spectral computations in milliseconds
    pub fft_interval_ms: u64,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            fft_interval_ms: 100,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or the defaults if the file is missing or
    /// its JSON is invalid. The result is not validated here.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the bundled assets directory
    pub fn load() -> Self {
        Self::load_from_file("assets/monitor_config.json")
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audio.sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate {
                sample_rate: self.audio.sample_rate,
            });
        }
        if self.audio.block_size == 0 {
            return Err(ConfigError::InvalidBlockSize {
                block_size: self.audio.block_size,
            });
        }
        if self.audio.buffer_pool_size == 0 {
            return Err(ConfigError::InvalidBufferPoolSize {
                buffer_pool_size: self.audio.buffer_pool_size,
            });
        }
        if self.window.window_duration_ms == 0 {
            return Err(ConfigError::InvalidWindowDuration {
                window_duration_ms: self.window.window_duration_ms,
            });
        }
        if self.window.history_size != HISTORY_SIZE {
            return Err(ConfigError::UnsupportedHistorySize {
                history_size: self.window.history_size,
            });
        }
        if self.spectral.fft_size < 2 {
            return Err(ConfigError::InvalidFftSize {
                fft_size: self.spectral.fft_size,
            });
        }
        Ok(())
    }

    /// Width of one spectral bin in Hz
    ///
    /// The driver reports centroids as bin indices; multiply by this to get Hz.
    pub fn bin_width_hz(&self) -> f64 {
        self.audio.sample_rate as f64 / self.spectral.fft_size as f64
    }
}

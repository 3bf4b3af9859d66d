// Configuration error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Configuration error code constants
///
/// Error code range: 2001-2006
pub struct ConfigErrorCodes {}

impl ConfigErrorCodes {
    /// Sample rate must be greater than 0
    pub const INVALID_SAMPLE_RATE: i32 = 2001;

    /// Block size must be greater than 0
    pub const INVALID_BLOCK_SIZE: i32 = 2002;

    /// Window duration must be greater than 0 ms
    pub const INVALID_WINDOW_DURATION: i32 = 2003;

    /// FFT size must be at least 2
    pub const INVALID_FFT_SIZE: i32 = 2004;

    /// History size other than 3 was requested
    pub const UNSUPPORTED_HISTORY_SIZE: i32 = 2005;

    /// Buffer pool must hold at least one block
    pub const INVALID_BUFFER_POOL_SIZE: i32 = 2006;
}

/// Log a configuration error with structured context
pub fn log_config_error(err: &ConfigError, context: &str) {
    error!(
        "Config error in {}: code={}, component=MonitorConfig, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Misconfiguration detected while validating a [`crate::config::MonitorConfig`]
///
/// These are rejected at construction time; none of them can occur once a
/// stream is running.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Sample rate is zero
    InvalidSampleRate { sample_rate: u32 },

    /// Block size is zero
    InvalidBlockSize { block_size: usize },

    /// Window duration is zero
    InvalidWindowDuration { window_duration_ms: u64 },

    /// FFT size is too small to produce a spectrum
    InvalidFftSize { fft_size: usize },

    /// The comparator is defined over exactly three windows
    UnsupportedHistorySize { history_size: usize },

    /// Buffer pool is empty
    InvalidBufferPoolSize { buffer_pool_size: usize },
}

impl ErrorCode for ConfigError {
    fn code(&self) -> i32 {
        match self {
            ConfigError::InvalidSampleRate { .. } => ConfigErrorCodes::INVALID_SAMPLE_RATE,
            ConfigError::InvalidBlockSize { .. } => ConfigErrorCodes::INVALID_BLOCK_SIZE,
            ConfigError::InvalidWindowDuration { .. } => {
                ConfigErrorCodes::INVALID_WINDOW_DURATION
            }
            ConfigError::InvalidFftSize { .. } => ConfigErrorCodes::INVALID_FFT_SIZE,
            ConfigError::UnsupportedHistorySize { .. } => {
                ConfigErrorCodes::UNSUPPORTED_HISTORY_SIZE
            }
            ConfigError::InvalidBufferPoolSize { .. } => {
                ConfigErrorCodes::INVALID_BUFFER_POOL_SIZE
            }
        }
    }

    fn message(&self) -> String {
        match self {
            ConfigError::InvalidSampleRate { sample_rate } => {
                format!("Sample rate must be greater than 0 (got {})", sample_rate)
            }
            ConfigError::InvalidBlockSize { block_size } => {
                format!("Block size must be greater than 0 (got {})", block_size)
            }
            ConfigError::InvalidWindowDuration { window_duration_ms } => {
                format!(
                    "Window duration must be greater than 0 ms (got {})",
                    window_duration_ms
                )
            }
            ConfigError::InvalidFftSize { fft_size } => {
                format!("FFT size must be at least 2 (got {})", fft_size)
            }
            ConfigError::UnsupportedHistorySize { history_size } => {
                format!(
                    "History size is fixed at 3 windows (got {})",
                    history_size
                )
            }
            ConfigError::InvalidBufferPoolSize { buffer_pool_size } => {
                format!(
                    "Buffer pool size must be greater than 0 (got {})",
                    buffer_pool_size
                )
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConfigError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ConfigError {}

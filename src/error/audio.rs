// Audio error types and constants

use crate::error::{ConfigError, ErrorCode};
use log::error;
use std::fmt;

/// Audio error code constants
///
/// Error code range: 1001-1006
pub struct AudioErrorCodes {}

impl AudioErrorCodes {
    /// Monitor engine is already running
    pub const ALREADY_RUNNING: i32 = 1001;

    /// Monitor engine is not running
    pub const NOT_RUNNING: i32 = 1002;

    /// Hardware error occurred
    pub const HARDWARE_ERROR: i32 = 1003;

    /// Failed to open audio stream
    pub const STREAM_OPEN_FAILED: i32 = 1004;

    /// Audio stream or channel failed unexpectedly
    pub const STREAM_FAILURE: i32 = 1005;

    /// Engine was started with an invalid configuration
    pub const INVALID_CONFIG: i32 = 1006;
}

/// Log an audio error with structured context
///
/// The logging is non-blocking and will not panic on failure.
pub fn log_audio_error(err: &AudioError, context: &str) {
    error!(
        "Audio error in {}: code={}, component=MonitorEngine, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Audio-related errors
///
/// These errors cover the capture boundary and the engine lifecycle.
/// The windowed analysis core itself never fails.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// Monitor engine is already running
    AlreadyRunning,

    /// Monitor engine is not running
    NotRunning,

    /// Hardware error occurred
    HardwareError { details: String },

    /// Failed to open audio stream
    StreamOpenFailed { reason: String },

    /// Stream or channel failed unexpectedly
    StreamFailure { reason: String },

    /// Configuration rejected before the engine started
    InvalidConfig(ConfigError),
}

impl ErrorCode for AudioError {
    fn code(&self) -> i32 {
        match self {
            AudioError::AlreadyRunning => AudioErrorCodes::ALREADY_RUNNING,
            AudioError::NotRunning => AudioErrorCodes::NOT_RUNNING,
            AudioError::HardwareError { .. } => AudioErrorCodes::HARDWARE_ERROR,
            AudioError::StreamOpenFailed { .. } => AudioErrorCodes::STREAM_OPEN_FAILED,
            AudioError::StreamFailure { .. } => AudioErrorCodes::STREAM_FAILURE,
            AudioError::InvalidConfig(_) => AudioErrorCodes::INVALID_CONFIG,
        }
    }

    fn message(&self) -> String {
        match self {
            AudioError::AlreadyRunning => {
                "Monitor engine already running. Call stop() first.".to_string()
            }
            AudioError::NotRunning => {
                "Monitor engine not running. Call start() first.".to_string()
            }
            AudioError::HardwareError { details } => {
                format!("Hardware error: {}", details)
            }
            AudioError::StreamOpenFailed { reason } => {
                format!("Failed to open audio stream: {}", reason)
            }
            AudioError::StreamFailure { reason } => {
                format!("Audio stream failed: {}", reason)
            }
            AudioError::InvalidConfig(err) => {
                format!("Invalid configuration: {}", err.message())
            }
        }
    }
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AudioError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AudioError {}

impl From<ConfigError> for AudioError {
    fn from(err: ConfigError) -> Self {
        AudioError::InvalidConfig(err)
    }
}

impl From<std::io::Error> for AudioError {
    fn from(err: std::io::Error) -> Self {
        AudioError::HardwareError {
            details: err.to_string(),
        }
    }
}

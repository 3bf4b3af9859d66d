// Audio Shift Monitor - windowed loudness and spectral-centroid drift detection
// Fixed-duration windows over a block stream, compared against the two windows before

// Module declarations
pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod replay;

// Re-exports for convenience
pub use analysis::{
    Clock, ComparisonRecord, ManualClock, StreamDriver, SystemClock, WindowReport,
    WindowStatistics,
};
pub use config::MonitorConfig;
pub use engine::{CaptureSource, MonitorEngine};
pub use error::{AudioError, ConfigError, ErrorCode};

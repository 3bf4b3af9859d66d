// Analysis module - windowed feature extraction and comparison
//
// This module is the numeric core: it turns a stream of sample blocks into
// one statistics record per window and, from the third window onward, a
// percent-change comparison against the two windows before it.
//
// Architecture:
// - StreamDriver: owns all per-stream state, fed one block at a time
// - Pipeline: FeatureExtractor → SpectralThrottle → WindowAccumulator
//             → (on boundary) WindowHistory → WindowComparator
// - Output: WindowReport returned to the caller (the engine broadcasts it)

pub mod clock;
pub mod comparator;
pub mod driver;
pub mod features;
pub mod history;
pub mod throttle;
pub mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use comparator::{percent_diff, ComparisonRecord, WindowComparator};
pub use driver::{StreamDriver, WindowReport};
pub use features::FeatureExtractor;
pub use history::WindowHistory;
pub use throttle::SpectralThrottle;
pub use window::{WindowAccumulator, WindowStatistics};

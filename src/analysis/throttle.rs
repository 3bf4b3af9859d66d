//! Wall-clock rate limiter for spectral analysis.

/// Default minimum spacing between spectral computations
pub const DEFAULT_FFT_INTERVAL_MS: u64 = 100;

/// Gate that admits at most one spectral computation per interval
///
/// The decision (`should_compute`) is separate from the state update
/// (`mark_computed`) so the feature extractor can stay side-effect free.
/// A skipped call simply means one fewer frequency sample in the window.
#[derive(Debug, Clone)]
pub struct SpectralThrottle {
    interval_ms: u64,
    last_computed_at_ms: Option<u64>,
}

impl SpectralThrottle {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_computed_at_ms: None,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// True once `interval_ms` has elapsed since the last computation, or if
    /// nothing has been computed yet
    pub fn should_compute(&self, now_ms: u64) -> bool {
        self.last_computed_at_ms
            .map(|last| now_ms.saturating_sub(last) >= self.interval_ms)
            .unwrap_or(true)
    }

    pub fn mark_computed(&mut self, now_ms: u64) {
        self.last_computed_at_ms = Some(now_ms);
    }
}

impl Default for SpectralThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_FFT_INTERVAL_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_is_admitted() {
        let throttle = SpectralThrottle::default();
        assert!(throttle.should_compute(0));
        assert!(throttle.should_compute(1_700_000_000_000));
    }

    #[test]
    fn test_interval_is_enforced() {
        let mut throttle = SpectralThrottle::new(100);
        throttle.mark_computed(1_000);

        assert!(!throttle.should_compute(1_000));
        assert!(!throttle.should_compute(1_099));
        assert!(throttle.should_compute(1_100));
        assert!(throttle.should_compute(1_250));
    }

    #[test]
    fn test_decision_has_no_side_effect() {
        let mut throttle = SpectralThrottle::new(100);
        throttle.mark_computed(0);
        assert!(throttle.should_compute(150));
        // Not marked, so it stays open
        assert!(throttle.should_compute(160));
        throttle.mark_computed(160);
        assert!(!throttle.should_compute(200));
    }

    #[test]
    fn test_clock_going_backwards_does_not_admit() {
        let mut throttle = SpectralThrottle::new(100);
        throttle.mark_computed(5_000);
        assert!(!throttle.should_compute(4_000));
    }

    #[test]
    fn test_zero_interval_admits_every_call() {
        let mut throttle = SpectralThrottle::new(0);
        throttle.mark_computed(10);
        assert!(throttle.should_compute(10));
    }
}

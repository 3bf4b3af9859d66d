// FeatureExtractor - per-block scalar features for window aggregation
//
// This module converts one block of mono samples into the scalar features
// that the window accumulator collects. Every method is a pure function of
// its input; the only thing held across calls is the pre-planned FFT.
//
// Module organization:
// - fft: magnitude spectrum of the leading FFT_SIZE samples
// - spectral: bin-index spectral centroid
// - temporal: RMS loudness and zero-crossing rate
// - mod.rs: Coordinator (FeatureExtractor)
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

mod fft;
mod spectral;
mod temporal;

pub use fft::FFT_SIZE;
pub use spectral::bin_centroid;

use fft::FftProcessor;

use crate::error::ConfigError;

/// FeatureExtractor coordinates per-block feature computation
pub struct FeatureExtractor {
    fft_processor: FftProcessor,
}

impl FeatureExtractor {
    /// Create a new FeatureExtractor
    ///
    /// # Arguments
    /// * `fft_size` - Transform length `F` used for the spectral centroid
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidFftSize`] when `fft_size < 2`, so a bad
    /// size fails here instead of on the first spectral block.
    pub fn new(fft_size: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            fft_processor: FftProcessor::new(fft_size)?,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_processor.fft_size()
    }

    /// Root-mean-square loudness of the block (0.0 for an empty block)
    pub fn compute_rms(&self, audio: &[f32]) -> f64 {
        temporal::rms(audio)
    }

    /// Zero-crossing rate of the block (0.0 for fewer than 2 samples)
    pub fn compute_zcr(&self, audio: &[f32]) -> f64 {
        temporal::zero_crossing_rate(audio)
    }

    /// Spectral centroid of the block as a bin index
    ///
    /// Only the first `fft_size` samples are analysed; anything after them
    /// is ignored. Blocks shorter than `fft_size` and silent blocks both
    /// return 0.0.
    pub fn compute_spectral_centroid(&self, audio: &[f32]) -> f64 {
        match self.fft_processor.compute_magnitude_spectrum(audio) {
            Some(spectrum) => bin_centroid(&spectrum),
            None => 0.0,
        }
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self {
            fft_processor: FftProcessor::planned(FFT_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sine wave whose period divides FFT_SIZE exactly, so all energy lands in `bin`
    fn generate_bin_tone(bin: usize, fft_size: usize, duration_samples: usize) -> Vec<f32> {
        (0..duration_samples)
            .map(|i| {
                let phase = 2.0 * std::f64::consts::PI * bin as f64 * i as f64 / fft_size as f64;
                (0.8 * phase.sin()) as f32
            })
            .collect()
    }

    /// Generate white noise for testing
    fn generate_white_noise(duration_samples: usize) -> Vec<f32> {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        (0..duration_samples)
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect()
    }

    #[test]
    fn test_zero_fft_size_rejected_at_construction() {
        assert!(matches!(
            FeatureExtractor::new(0),
            Err(ConfigError::InvalidFftSize { fft_size: 0 })
        ));
        assert!(FeatureExtractor::new(1).is_err());

        // Smallest valid transform: bins 0 and 1 carry |0.1 + 0.2| and |0.1 - 0.2|
        let extractor = FeatureExtractor::new(2).unwrap();
        let centroid = extractor.compute_spectral_centroid(&[0.1, 0.2]);
        assert!((centroid - 0.25).abs() < 1e-9, "got {}", centroid);
    }

    #[test]
    fn test_rms_of_silence_is_zero() {
        let extractor = FeatureExtractor::default();
        assert_eq!(extractor.compute_rms(&vec![0.0; 1024]), 0.0);
        assert_eq!(extractor.compute_rms(&[]), 0.0);
    }

    #[test]
    fn test_rms_sign_invariant() {
        let extractor = FeatureExtractor::default();
        let signal = generate_white_noise(1024);
        let negated: Vec<f32> = signal.iter().map(|s| -s).collect();
        assert_eq!(extractor.compute_rms(&signal), extractor.compute_rms(&negated));
    }

    #[test]
    fn test_rms_full_scale_sine() {
        let extractor = FeatureExtractor::default();
        let signal: Vec<f32> = (0..FFT_SIZE)
            .map(|i| (2.0 * std::f64::consts::PI * 8.0 * i as f64 / FFT_SIZE as f64).sin() as f32)
            .collect();
        let rms = extractor.compute_rms(&signal);
        assert!(
            (rms - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-4,
            "Expected RMS ~0.707, got {}",
            rms
        );
    }

    #[test]
    fn test_centroid_of_pure_tone_matches_bin() {
        let extractor = FeatureExtractor::new(1024).unwrap();

        for bin in [5usize, 37, 100, 300] {
            let signal = generate_bin_tone(bin, 1024, 2048);
            let centroid = extractor.compute_spectral_centroid(&signal);
            assert!(
                (centroid - bin as f64).abs() < 0.05,
                "Expected centroid ~{} for tone at bin {}, got {}",
                bin,
                bin,
                centroid
            );
        }
    }

    #[test]
    fn test_centroid_uses_only_leading_slice() {
        let extractor = FeatureExtractor::new(1024).unwrap();

        let mut signal = generate_bin_tone(20, 1024, 1024);
        signal.extend(generate_bin_tone(400, 1024, 1024));
        let centroid = extractor.compute_spectral_centroid(&signal);
        assert!((centroid - 20.0).abs() < 0.05, "got {}", centroid);
    }

    #[test]
    fn test_centroid_short_block_is_zero() {
        let extractor = FeatureExtractor::new(1024).unwrap();
        let signal = generate_bin_tone(50, 1024, 512);
        assert_eq!(extractor.compute_spectral_centroid(&signal), 0.0);
    }

    #[test]
    fn test_centroid_silence_is_zero() {
        let extractor = FeatureExtractor::new(1024).unwrap();
        assert_eq!(extractor.compute_spectral_centroid(&vec![0.0; 1024]), 0.0);
    }

    #[test]
    fn test_centroid_noise_is_mid_band() {
        let extractor = FeatureExtractor::new(1024).unwrap();
        let centroid = extractor.compute_spectral_centroid(&generate_white_noise(1024));
        // Flat spectrum over 513 bins centres near 256
        assert!(
            centroid > 180.0 && centroid < 330.0,
            "Expected mid-band centroid for white noise, got {}",
            centroid
        );
    }

    #[test]
    fn test_brighter_tone_has_higher_centroid() {
        let extractor = FeatureExtractor::new(1024).unwrap();
        let low = extractor.compute_spectral_centroid(&generate_bin_tone(10, 1024, 1024));
        let high = extractor.compute_spectral_centroid(&generate_bin_tone(200, 1024, 1024));
        assert!(high > low);
    }

    #[test]
    fn test_zcr_sine_vs_noise() {
        let extractor = FeatureExtractor::default();

        let sine_zcr = extractor.compute_zcr(&generate_bin_tone(4, 1024, 1024));
        let noise_zcr = extractor.compute_zcr(&generate_white_noise(1024));

        assert!(sine_zcr < 0.05, "Expected low sine ZCR, got {}", sine_zcr);
        assert!(noise_zcr > 0.3, "Expected noise ZCR > 0.3, got {}", noise_zcr);
    }
}

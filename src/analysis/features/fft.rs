// FFT module - Fast Fourier Transform computation
//
// Computes the magnitude spectrum of the leading `fft_size` samples of a
// block. No analysis window is applied: the centroid is defined over the
// plain DFT of the slice.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::error::ConfigError;

/// Default transform length for spectral analysis
pub const FFT_SIZE: usize = 1024;

/// FFT processor that computes magnitude spectra from audio blocks
pub struct FftProcessor {
    fft: Arc<dyn Fft<f64>>,
    fft_size: usize,
}

impl FftProcessor {
    /// Create a new FFT processor
    ///
    /// The forward plan is built once here so per-block calls only allocate
    /// the working buffer.
    ///
    /// # Arguments
    /// * `fft_size` - Transform length `F`, at least 2
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidFftSize`] for `fft_size < 2`, which has
    /// no non-DC bin to weight.
    pub fn new(fft_size: usize) -> Result<Self, ConfigError> {
        if fft_size < 2 {
            return Err(ConfigError::InvalidFftSize { fft_size });
        }
        Ok(Self::planned(fft_size))
    }

    /// Plan a transform whose size is already known to be valid
    pub(crate) fn planned(fft_size: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(fft_size);
        Self { fft, fft_size }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Compute magnitude spectrum of the first `fft_size` samples
    ///
    /// Returns `None` when fewer than `fft_size` samples are available;
    /// short blocks are never zero-padded.
    ///
    /// # Returns
    /// Magnitudes for bins `0..=fft_size / 2` (the non-negative frequencies
    /// of a real-input transform)
    pub fn compute_magnitude_spectrum(&self, audio: &[f32]) -> Option<Vec<f64>> {
        if audio.len() < self.fft_size {
            return None;
        }

        let mut buffer: Vec<Complex<f64>> = audio[..self.fft_size]
            .iter()
            .map(|&sample| Complex::new(sample as f64, 0.0))
            .collect();

        self.fft.process(&mut buffer);

        Some(
            buffer[..self.fft_size / 2 + 1]
                .iter()
                .map(|c| c.norm())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_sizes_rejected() {
        for fft_size in [0, 1] {
            assert_eq!(
                FftProcessor::new(fft_size).err(),
                Some(ConfigError::InvalidFftSize { fft_size })
            );
        }
        assert!(FftProcessor::new(2).is_ok());
    }

    #[test]
    fn test_short_block_has_no_spectrum() {
        let processor = FftProcessor::new(FFT_SIZE).unwrap();
        assert!(processor
            .compute_magnitude_spectrum(&vec![0.5; FFT_SIZE - 1])
            .is_none());
    }

    #[test]
    fn test_spectrum_length() {
        let processor = FftProcessor::new(FFT_SIZE).unwrap();
        let spectrum = processor
            .compute_magnitude_spectrum(&vec![0.0; FFT_SIZE * 2])
            .unwrap();
        assert_eq!(spectrum.len(), FFT_SIZE / 2 + 1);
    }

    #[test]
    fn test_dc_signal_lands_in_bin_zero() {
        let processor = FftProcessor::new(64).unwrap();
        let spectrum = processor.compute_magnitude_spectrum(&[0.25; 64]).unwrap();
        assert!((spectrum[0] - 16.0).abs() < 1e-9);
        assert!(spectrum[1..].iter().all(|&mag| mag < 1e-9));
    }
}

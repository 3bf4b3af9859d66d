// Spectral module - Frequency-domain feature extraction
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

/// Compute spectral centroid as a bin index
///
/// Formula: centroid = Σ(i × |X[i]|) / Σ|X[i]|
///
/// The result is the magnitude-weighted mean bin index, not Hz. Multiply by
/// `sample_rate / fft_size` to convert.
///
/// # Returns
/// Centroid bin index, or 0.0 when the spectrum carries no energy
pub fn bin_centroid(spectrum: &[f64]) -> f64 {
    let weighted_sum: f64 = spectrum
        .iter()
        .enumerate()
        .map(|(i, &mag)| i as f64 * mag)
        .sum();

    let magnitude_sum: f64 = spectrum.iter().sum();

    if magnitude_sum > 0.0 {
        weighted_sum / magnitude_sum
    } else {
        0.0
    }
}

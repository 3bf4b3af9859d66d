// Temporal module - Time-domain feature extraction
//
// Loudness and zero-crossing rate, computed directly on the block.

/// Root-mean-square of a block
///
/// Accumulates in f64 so long blocks of small samples keep precision.
/// An empty block has an RMS of 0.0.
pub fn rms(audio: &[f32]) -> f64 {
    if audio.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = audio
        .iter()
        .map(|&sample| (sample as f64) * (sample as f64))
        .sum();
    (sum_squares / audio.len() as f64).sqrt()
}

/// Zero-crossing rate of a block
///
/// Counts sign changes between consecutive samples (a sample `>= 0.0` is
/// non-negative) and normalizes by the block length.
pub fn zero_crossing_rate(audio: &[f32]) -> f64 {
    if audio.len() < 2 {
        return 0.0;
    }

    let crossings = audio
        .windows(2)
        .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
        .count();

    crossings as f64 / audio.len() as f64
}

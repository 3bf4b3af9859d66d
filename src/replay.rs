//! Offline replay of recorded audio through the StreamDriver.
//!
//! A WAV file is cut into `block_size` chunks and fed to a driver whose clock
//! is advanced by each chunk's duration, so window boundaries land exactly
//! where they would for a live stream of the same audio, independent of how
//! fast the file is processed.

use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::analysis::{Clock, ManualClock, StreamDriver, WindowReport};
use crate::config::MonitorConfig;

/// Read a mono WAV file as float samples plus its sample rate
///
/// 16-bit PCM is scaled by 1/32768 to match live 16-bit capture; 24 and
/// 32-bit PCM by 1/2^(bits-1).
pub fn read_wav(path: &Path) -> Result<(Vec<f32>, u32)> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    if spec.channels != 1 {
        return Err(anyhow!(
            "Recording {} must be mono (found {} channels)",
            path.display(),
            spec.channels
        ));
    }

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| sample.map_err(|err| anyhow!(err)))
            .collect::<Result<Vec<f32>>>()?,
        hound::SampleFormat::Int => match spec.bits_per_sample {
            16 => reader
                .samples::<i16>()
                .map(|sample| {
                    sample
                        .map(crate::engine::i16_to_f32)
                        .map_err(|err| anyhow!(err))
                })
                .collect::<Result<Vec<f32>>>()?,
            bits @ (24 | 32) => {
                let scale = (1i64 << (bits - 1)) as f64;
                reader
                    .samples::<i32>()
                    .map(|sample| {
                        sample
                            .map(|value| (value as f64 / scale) as f32)
                            .map_err(|err| anyhow!(err))
                    })
                    .collect::<Result<Vec<f32>>>()?
            }
            other => {
                return Err(anyhow!(
                    "Unsupported bits per sample {} in {}",
                    other,
                    path.display()
                ))
            }
        },
    };

    log::debug!(
        "Loaded {} samples at {} Hz from {}",
        samples.len(),
        spec.sample_rate,
        path.display()
    );

    Ok((samples, spec.sample_rate))
}

/// Runs recorded samples through a fresh driver
pub struct ReplayProcessor {
    config: MonitorConfig,
}

impl ReplayProcessor {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }

    /// Feed `samples` block by block and collect every window report
    ///
    /// Each block is timed at the moment its last sample would have been
    /// captured. The trailing partial block, if any, is delivered as is.
    ///
    /// # Errors
    /// Fails if the configuration (with `sample_rate` substituted) is invalid.
    pub fn run(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<WindowReport>> {
        let mut config = self.config.clone();
        config.audio.sample_rate = sample_rate;

        let clock = ManualClock::new(0);
        let mut driver = StreamDriver::with_clock(&config, clock.clone())
            .context("invalid replay configuration")?;

        let mut reports = Vec::new();
        let mut consumed: u64 = 0;
        for block in samples.chunks(config.audio.block_size) {
            consumed += block.len() as u64;
            clock.set(consumed * 1000 / sample_rate as u64);
            if let Some(report) = driver.on_block(block) {
                reports.push(report);
            }
        }

        log::info!(
            "Replayed {} samples ({} ms) into {} windows",
            samples.len(),
            clock.now_ms(),
            reports.len()
        );

        Ok(reports)
    }

    /// Read `path` and replay it
    pub fn run_file(&self, path: &Path) -> Result<Vec<WindowReport>> {
        let (samples, sample_rate) = read_wav(path)?;
        self.run(&samples, sample_rate)
    }
}

// CpalCapture - desktop microphone capture feeding a MonitorEngine
//
// Opens the default input device, preferring a supported config that
// covers the configured sample rate and falling back to the device default.
// Fixed `block_size` buffers are requested only when the device allows that
// size. The first channel of each callback is submitted as one block through
// a CaptureSource.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::{i16_to_f32, CaptureSource};
use crate::analysis::Clock;
use crate::config::AudioConfig;
use crate::error::AudioError;

/// Running input stream; capture stops when this is dropped
pub struct CpalCapture {
    stream: cpal::Stream,
    sample_rate: u32,
}

impl CpalCapture {
    /// Open the default input device and start delivering blocks to `source`
    ///
    /// # Errors
    /// Returns [`AudioError::StreamOpenFailed`] when no device or supported
    /// format is available, [`AudioError::HardwareError`] when playback of
    /// the stream cannot start.
    pub fn start<C: Clock + 'static>(
        audio: &AudioConfig,
        source: CaptureSource<C>,
    ) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| AudioError::StreamOpenFailed {
                reason: "No default input device found".to_string(),
            })?;

        let supported = select_input_config(&device, audio.sample_rate)?;

        let stream_config = cpal::StreamConfig {
            channels: supported.channels(),
            sample_rate: supported.sample_rate(),
            buffer_size: choose_buffer_size(supported.buffer_size(), audio.block_size),
        };
        let channel_count = stream_config.channels as usize;
        let sample_rate = stream_config.sample_rate.0;

        tracing::info!(
            "[CpalCapture] Opening {:?}: {} ch, {} Hz, {:?}, {:?}",
            device.name().unwrap_or_default(),
            channel_count,
            sample_rate,
            supported.sample_format(),
            stream_config.buffer_size
        );

        let err_fn = |err| tracing::error!("[CpalCapture] Input stream error: {}", err);
        let mut source = source;

        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    source.submit_frames(data, channel_count, |s| s);
                },
                err_fn,
                None,
            ),
            cpal::SampleFormat::I16 => device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    source.submit_frames(data, channel_count, i16_to_f32);
                },
                err_fn,
                None,
            ),
            other => {
                return Err(AudioError::StreamOpenFailed {
                    reason: format!("Unsupported input sample format {:?}", other),
                })
            }
        }
        .map_err(|e| AudioError::StreamOpenFailed {
            reason: format!("{:?}", e),
        })?;

        stream.play().map_err(|e| AudioError::HardwareError {
            details: format!("Failed to start input stream: {:?}", e),
        })?;

        Ok(Self {
            stream,
            sample_rate,
        })
    }

    /// Sample rate the device actually runs at
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Pause the stream and release the device
    pub fn stop(self) -> Result<(), AudioError> {
        self.stream.pause().map_err(|e| AudioError::HardwareError {
            details: format!("Failed to pause input stream: {:?}", e),
        })
    }
}

fn is_handled_format(format: cpal::SampleFormat) -> bool {
    matches!(format, cpal::SampleFormat::F32 | cpal::SampleFormat::I16)
}

/// Pick an input config running at `sample_rate`, else the device default
///
/// F32 ranges are preferred over I16 ones. When no range covers the rate the
/// default config is used and its rate logged, since spectral bins then map
/// to different frequencies.
fn select_input_config(
    device: &cpal::Device,
    sample_rate: u32,
) -> Result<cpal::SupportedStreamConfig, AudioError> {
    let wanted = cpal::SampleRate(sample_rate);

    match device.supported_input_configs() {
        Ok(ranges) => {
            let mut covering: Vec<cpal::SupportedStreamConfigRange> = ranges
                .filter(|range| {
                    is_handled_format(range.sample_format())
                        && range.min_sample_rate() <= wanted
                        && wanted <= range.max_sample_rate()
                })
                .collect();
            covering.sort_by_key(|range| range.sample_format() != cpal::SampleFormat::F32);
            if let Some(range) = covering.into_iter().next() {
                return Ok(range.with_sample_rate(wanted));
            }
        }
        Err(e) => {
            tracing::warn!("[CpalCapture] Could not list input configs: {:?}", e);
        }
    }

    let fallback = device
        .default_input_config()
        .map_err(|e| AudioError::StreamOpenFailed {
            reason: format!("Failed to get default input config: {:?}", e),
        })?;
    tracing::warn!(
        "[CpalCapture] {} Hz not supported by device, using default {} Hz",
        sample_rate,
        fallback.sample_rate().0
    );
    Ok(fallback)
}

/// Request fixed `block_size` buffers only when the device allows that size
fn choose_buffer_size(supported: &cpal::SupportedBufferSize, block_size: usize) -> cpal::BufferSize {
    match (supported, u32::try_from(block_size)) {
        (cpal::SupportedBufferSize::Range { min, max }, Ok(frames))
            if (*min..=*max).contains(&frames) =>
        {
            cpal::BufferSize::Fixed(frames)
        }
        _ => cpal::BufferSize::Default,
    }
}

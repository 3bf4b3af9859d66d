//! Replay integration tests
//!
//! These tests write small WAV recordings to the temp directory with hound and
//! run them through the public replay API, checking window timing and the
//! shift comparison end to end.
//!
//! All recordings use 16 kHz with 1600-sample blocks, so every block is
//! exactly 100 ms of audio and window boundaries are deterministic.

use std::path::PathBuf;

use audio_shift_monitor::config::MonitorConfig;
use audio_shift_monitor::replay::{read_wav, ReplayProcessor};

const SAMPLE_RATE: u32 = 16_000;
const PERIOD: usize = 32;

fn monitor_config() -> MonitorConfig {
    let mut config = MonitorConfig::default();
    config.audio.block_size = 1600;
    config.window.window_duration_ms = 1000;
    config
}

fn temp_wav(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "audio_shift_monitor_{}_{}.wav",
        name,
        std::process::id()
    ))
}

fn tone(len: usize, amplitude: f32) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let phase = 2.0 * std::f64::consts::PI * (i % PERIOD) as f64 / PERIOD as f64;
            amplitude * phase.sin() as f32
        })
        .collect()
}

fn write_float_wav(path: &PathBuf, channels: u16, samples: &[f32]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    for &sample in samples {
        writer.write_sample(sample).expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}

#[test]
fn test_loudness_step_detected_in_third_window() {
    let path = temp_wav("loudness_step");
    let mut samples = tone(32_000, 0.25);
    samples.extend(tone(16_000, 0.5));
    write_float_wav(&path, 1, &samples);

    let reports = ReplayProcessor::new(monitor_config())
        .run_file(&path)
        .expect("replay succeeds");
    let _ = std::fs::remove_file(&path);

    assert_eq!(reports.len(), 3);
    assert!(reports[0].comparison.is_none());
    assert!(reports[1].comparison.is_none());

    let cmp = reports[2].comparison.expect("third window compares");
    assert!(
        (cmp.amp_pct - 100.0).abs() < 1e-4,
        "Doubling amplitude should read +100%, got {}",
        cmp.amp_pct
    );
    assert!(cmp.freq_pct.abs() < 1e-4, "Centroid should not move, got {}", cmp.freq_pct);
    assert_eq!(cmp.var_amp_pct, 0.0);
}

#[test]
fn test_pitch_step_moves_centroid() {
    let path = temp_wav("pitch_step");
    // Period 32 → bin 32; period 16 → bin 64
    let mut samples = tone(32_000, 0.3);
    samples.extend((0..16_000).map(|i| {
        let phase = 2.0 * std::f64::consts::PI * (i % 16) as f64 / 16.0;
        0.3 * phase.sin() as f32
    }));
    write_float_wav(&path, 1, &samples);

    let reports = ReplayProcessor::new(monitor_config())
        .run_file(&path)
        .expect("replay succeeds");
    let _ = std::fs::remove_file(&path);

    let cmp = reports[2].comparison.expect("third window compares");
    assert!(
        (cmp.freq_pct - 100.0).abs() < 0.5,
        "Centroid should double, got {}",
        cmp.freq_pct
    );
    assert!(cmp.amp_pct.abs() < 1e-3, "Loudness unchanged, got {}", cmp.amp_pct);
}

#[test]
fn test_sixteen_bit_pcm_scaled_by_32768() {
    let path = temp_wav("pcm16");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).expect("create wav");
    for i in 0..16_000 {
        let value: i16 = if i % 2 == 0 { 16384 } else { -16384 };
        writer.write_sample(value).expect("write sample");
    }
    writer.finalize().expect("finalize wav");

    let (samples, sample_rate) = read_wav(&path).expect("read wav");
    let reports = ReplayProcessor::new(monitor_config())
        .run(&samples, sample_rate)
        .expect("replay succeeds");
    let _ = std::fs::remove_file(&path);

    assert_eq!(sample_rate, SAMPLE_RATE);
    assert_eq!(samples[0], 0.5);
    assert_eq!(samples[1], -0.5);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].statistics.avg_amplitude, 0.5);
    // Alternating signs cross zero on every step
    assert!((reports[0].statistics.avg_zcr - 1599.0 / 1600.0).abs() < 1e-9);
}

#[test]
fn test_stereo_recording_rejected() {
    let path = temp_wav("stereo");
    write_float_wav(&path, 2, &tone(3_200, 0.5));

    let err = read_wav(&path).expect_err("stereo must be rejected");
    let _ = std::fs::remove_file(&path);
    assert!(err.to_string().contains("must be mono"), "got: {err}");
}

#[test]
fn test_missing_file_reports_path() {
    let path = temp_wav("does_not_exist");
    let err = read_wav(&path).expect_err("missing file");
    assert!(format!("{err:#}").contains("does_not_exist"));
}

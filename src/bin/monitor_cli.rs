use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use audio_shift_monitor::analysis::WindowReport;
use audio_shift_monitor::config::MonitorConfig;
use audio_shift_monitor::replay::{read_wav, ReplayProcessor};
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "monitor_cli",
    about = "Windowed loudness and spectral-centroid shift monitor"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a mono WAV recording and report every completed window
    Replay {
        #[arg(long)]
        wav: PathBuf,
        /// JSON config file (defaults apply for anything missing)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write a JSON report here instead of streaming JSON lines to stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Monitor the default input device until Ctrl-C (needs the `capture` feature)
    Live {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the default configuration
    DumpConfig,
}

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries reports only
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            wav,
            config,
            output,
        } => run_replay(&wav, load_config(config.as_deref()), output),
        Commands::Live { config } => run_live(load_config(config.as_deref())),
        Commands::DumpConfig => run_dump_config(),
    }
}

fn load_config(path: Option<&Path>) -> MonitorConfig {
    match path {
        Some(path) => MonitorConfig::load_from_file(path),
        None => MonitorConfig::default(),
    }
}

fn run_replay(wav: &Path, config: MonitorConfig, output_path: Option<PathBuf>) -> Result<ExitCode> {
    let (samples, sample_rate) = read_wav(wav)?;
    let reports = ReplayProcessor::new(config.clone())
        .run(&samples, sample_rate)
        .with_context(|| format!("replaying {}", wav.display()))?;

    match output_path {
        Some(path) => {
            let mut effective = config;
            effective.audio.sample_rate = sample_rate;
            let payload = ReplayReportPayload {
                recording: wav.display().to_string(),
                sample_rate,
                bin_width_hz: effective.bin_width_hz(),
                window_count: reports.len(),
                reports: &reports,
            };
            let json = serde_json::to_string_pretty(&payload)?;
            fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        }
        None => {
            for report in &reports {
                println!("{}", serde_json::to_string(report)?);
            }
        }
    }

    Ok(ExitCode::from(0))
}

#[cfg(feature = "capture")]
fn run_live(config: MonitorConfig) -> Result<ExitCode> {
    live::run_live(config)
}

#[cfg(not(feature = "capture"))]
fn run_live(_config: MonitorConfig) -> Result<ExitCode> {
    anyhow::bail!("live capture is not available: rebuild with `--features capture`")
}

fn run_dump_config() -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(&MonitorConfig::default())?);
    Ok(ExitCode::from(0))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplayReportPayload<'a> {
    recording: String,
    sample_rate: u32,
    bin_width_hz: f64,
    window_count: usize,
    reports: &'a [WindowReport],
}

#[cfg(feature = "capture")]
mod live {
    use std::process::ExitCode;

    use anyhow::{Context, Result};
    use audio_shift_monitor::config::MonitorConfig;
    use audio_shift_monitor::engine::{CpalCapture, MonitorEngine};
    use tokio::sync::broadcast::error::RecvError;

    pub fn run_live(config: MonitorConfig) -> Result<ExitCode> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("building runtime")?;

        let mut engine = MonitorEngine::new(config.clone())?;
        let mut reports = engine.subscribe();
        let source = engine.start()?;
        let capture = CpalCapture::start(&config.audio, source)?;
        eprintln!(
            "Monitoring default input at {} Hz, Ctrl-C to stop",
            capture.sample_rate()
        );

        let result = runtime.block_on(async {
            let shutdown = tokio::signal::ctrl_c();
            tokio::pin!(shutdown);
            loop {
                tokio::select! {
                    _ = &mut shutdown => break,
                    received = reports.recv() => match received {
                        Ok(report) => println!("{}", serde_json::to_string(&report)?),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!("Report printer lagged, skipped {} reports", skipped)
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
            Ok::<(), anyhow::Error>(())
        });

        capture.stop()?;
        engine.stop()?;
        result?;
        Ok(ExitCode::from(0))
    }
}

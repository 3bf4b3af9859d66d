// Driver thread - drains captured blocks into a StreamDriver
//
// The thread is the only owner of the StreamDriver, so blocks are processed
// strictly one at a time in arrival order without any locking. Window
// reports fan out through a tokio broadcast channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rtrb::PopError;
use tokio::sync::broadcast;

use super::buffer_pool::DriverThreadChannels;
use crate::analysis::{Clock, StreamDriver, WindowReport};

struct DriverWorker<C: Clock> {
    channels: DriverThreadChannels,
    driver: StreamDriver<C>,
    report_tx: broadcast::Sender<WindowReport>,
    running: Arc<AtomicBool>,
    blocks_processed: u64,
}

/// Outcome of one pass over the data queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Processed,
    Idle,
    Drained,
}

impl<C: Clock> DriverWorker<C> {
    fn run(mut self) {
        tracing::info!("[DriverThread] Starting driver loop");

        loop {
            // Sample the flag before popping: an empty pop after the flag
            // cleared means every block submitted before stop() is done
            let stopping = !self.running.load(Ordering::SeqCst);
            match self.step(stopping) {
                Step::Processed => {}
                Step::Idle => thread::sleep(Duration::from_millis(1)),
                Step::Drained => {
                    tracing::info!("[DriverThread] Stopped and queue empty, exiting");
                    break;
                }
            }
        }

        tracing::info!(
            "[DriverThread] Processed {} blocks, {} windows completed",
            self.blocks_processed,
            self.driver.windows_completed()
        );
    }

    fn step(&mut self, stopping: bool) -> Step {
        let block = match self.channels.data_consumer.pop() {
            Ok(block) => block,
            Err(PopError::Empty) if stopping => return Step::Drained,
            Err(PopError::Empty) => return Step::Idle,
        };

        self.blocks_processed += 1;

        if let Some(report) = self
            .driver
            .on_block_at(&block.samples, block.arrived_at_ms)
        {
            if self.report_tx.send(report).is_err() {
                tracing::debug!("[DriverThread] Window report dropped: no subscribers");
            }
        }

        if self.channels.pool_producer.push(block).is_err() {
            tracing::warn!("[DriverThread] Pool queue full, block not recycled");
        }

        Step::Processed
    }
}

/// Spawn the thread that feeds captured blocks to `driver`
///
/// Each block is timed by its stamped arrival time, not by when the thread
/// gets to it. The thread exits once `running` is cleared and every queued
/// block has been processed.
pub fn spawn_driver_thread<C: Clock + 'static>(
    channels: DriverThreadChannels,
    driver: StreamDriver<C>,
    report_tx: broadcast::Sender<WindowReport>,
    running: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let worker = DriverWorker {
            channels,
            driver,
            report_tx,
            running,
            blocks_processed: 0,
        };
        worker.run();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ManualClock;
    use crate::config::MonitorConfig;
    use crate::engine::buffer_pool::BufferPool;

    fn worker_with_window(
        window_duration_ms: u64,
    ) -> (
        DriverWorker<ManualClock>,
        crate::engine::CaptureChannels,
        broadcast::Receiver<WindowReport>,
    ) {
        let mut config = MonitorConfig::default();
        config.window.window_duration_ms = window_duration_ms;
        let driver = StreamDriver::with_clock(&config, ManualClock::new(0)).unwrap();
        let (capture, channels) = BufferPool::new(4, 1024).split_for_threads();
        let (report_tx, report_rx) = broadcast::channel(4);

        let worker = DriverWorker {
            channels,
            driver,
            report_tx,
            running: Arc::new(AtomicBool::new(true)),
            blocks_processed: 0,
        };
        (worker, capture, report_rx)
    }

    #[test]
    fn test_block_submitted_during_idle_pass_survives_stop() {
        let (mut worker, mut capture, mut rx) = worker_with_window(1000);

        // Pass sees the engine running and an empty queue
        assert_eq!(worker.step(false), Step::Idle);

        // A window-closing block lands, then stop() clears the flag
        assert!(capture.submit(&[0.5; 1024], 1000));
        assert_eq!(worker.step(true), Step::Processed);
        assert_eq!(worker.step(true), Step::Drained);

        let report = rx.try_recv().expect("late block still closes its window");
        assert_eq!(report.statistics.timestamp, 1000);
    }

    #[test]
    fn test_empty_queue_idles_while_running() {
        let (mut worker, _capture, _rx) = worker_with_window(1000);
        assert_eq!(worker.step(false), Step::Idle);
        assert_eq!(worker.blocks_processed, 0);
    }
}

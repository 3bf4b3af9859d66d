// BufferPool - lock-free block pool with dual SPSC queues
//
// Two lock-free SPSC (Single Producer Single Consumer) ring buffers move
// pre-allocated blocks between the capture callback and the driver thread,
// so the callback never allocates and blocks reach the driver strictly one
// at a time, in arrival order.
//
// Architecture:
// - DATA_QUEUE: capture side pushes filled blocks, driver thread consumes
// - POOL_QUEUE: driver thread returns empty blocks, capture side recycles
//
// Block flow:
// 1. Capture side pops an empty block from POOL_QUEUE
// 2. Capture side fills it (up to its pre-allocated capacity) and stamps
//    its arrival time
// 3. Capture side pushes it to DATA_QUEUE
// 4. Driver thread pops it, runs the StreamDriver, pushes it back to POOL_QUEUE

use rtrb::{Consumer, Producer};

/// Configuration constants for buffer pool
pub const DEFAULT_BUFFER_COUNT: usize = 32;
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// One captured block plus the time it arrived
#[derive(Debug, Clone)]
pub struct AudioBlock {
    pub samples: Vec<f32>,
    /// Arrival time in milliseconds, from the capture side's clock
    pub arrived_at_ms: u64,
}

/// Split buffer pool channels for producer/consumer separation
pub struct BufferPoolChannels {
    /// Producer for sending filled blocks to the driver thread
    pub data_producer: Producer<AudioBlock>,
    /// Consumer for receiving filled blocks in the driver thread
    pub data_consumer: Consumer<AudioBlock>,
    /// Producer for returning empty blocks from the driver thread
    pub pool_producer: Producer<AudioBlock>,
    /// Consumer for retrieving empty blocks on the capture side
    pub pool_consumer: Consumer<AudioBlock>,
    /// Sample capacity of every pooled block
    pub buffer_size: usize,
}

impl BufferPoolChannels {
    /// Hand each side only the queue ends it uses
    pub fn split_for_threads(self) -> (CaptureChannels, DriverThreadChannels) {
        (
            CaptureChannels {
                data_producer: self.data_producer,
                pool_consumer: self.pool_consumer,
                buffer_size: self.buffer_size,
                dropped_blocks: 0,
                truncated_blocks: 0,
            },
            DriverThreadChannels {
                data_consumer: self.data_consumer,
                pool_producer: self.pool_producer,
            },
        )
    }
}

/// Capture-side queue ends
pub struct CaptureChannels {
    data_producer: Producer<AudioBlock>,
    pool_consumer: Consumer<AudioBlock>,
    buffer_size: usize,
    dropped_blocks: u64,
    truncated_blocks: u64,
}

impl CaptureChannels {
    /// Fill a pooled block via `fill` and queue it for the driver
    ///
    /// `fill` receives the block and its sample capacity, must write at most
    /// that many samples, and returns how many samples it was offered. Extra
    /// samples are cut off rather than growing the block, and the cut is
    /// counted.
    ///
    /// Never blocks or allocates. If no empty block is available (the driver
    /// has fallen behind) the data is dropped, counted, and `false` is
    /// returned.
    pub fn submit_with<F>(&mut self, arrived_at_ms: u64, fill: F) -> bool
    where
        F: FnOnce(&mut Vec<f32>, usize) -> usize,
    {
        let mut block = match self.pool_consumer.pop() {
            Ok(block) => block,
            Err(_) => {
                self.dropped_blocks += 1;
                return false;
            }
        };

        block.samples.clear();
        let offered = fill(&mut block.samples, self.buffer_size);
        if offered > self.buffer_size {
            self.truncated_blocks += 1;
        }
        block.arrived_at_ms = arrived_at_ms;

        match self.data_producer.push(block) {
            Ok(()) => true,
            Err(_) => {
                self.dropped_blocks += 1;
                false
            }
        }
    }

    /// Copy up to `buffer_size` samples into a pooled block and queue it
    pub fn submit(&mut self, samples: &[f32], arrived_at_ms: u64) -> bool {
        self.submit_with(arrived_at_ms, |buffer, limit| {
            buffer.extend_from_slice(&samples[..samples.len().min(limit)]);
            samples.len()
        })
    }

    /// Blocks lost because the pool was exhausted
    pub fn dropped_blocks(&self) -> u64 {
        self.dropped_blocks
    }

    /// Blocks cut short because they exceeded `buffer_size`
    pub fn truncated_blocks(&self) -> u64 {
        self.truncated_blocks
    }
}

/// Driver-thread queue ends
pub struct DriverThreadChannels {
    pub data_consumer: Consumer<AudioBlock>,
    pub pool_producer: Producer<AudioBlock>,
}

/// Lock-free block pool using dual SPSC ring buffers
///
/// # Example
/// ```ignore
/// let (mut capture, mut driver_side) = BufferPool::new(32, 1024).split_for_threads();
///
/// // Capture callback:
/// capture.submit(&samples, clock.now_ms());
///
/// // Driver thread:
/// if let Ok(block) = driver_side.data_consumer.pop() {
///     driver.on_block_at(&block.samples, block.arrived_at_ms);
///     driver_side.pool_producer.push(block).ok();
/// }
/// ```
pub struct BufferPool;

impl BufferPool {
    /// Create a new BufferPool with specified block count and capacity
    ///
    /// # Arguments
    /// * `buffer_count` - Number of blocks to pre-allocate
    /// * `buffer_size` - Sample capacity of each block
    ///
    /// # Panics
    /// Panics if buffer_count is 0 or buffer_size is 0
    #[allow(clippy::new_ret_no_self)]
    pub fn new(buffer_count: usize, buffer_size: usize) -> BufferPoolChannels {
        assert!(buffer_count > 0, "buffer_count must be greater than 0");
        assert!(buffer_size > 0, "buffer_size must be greater than 0");

        let (mut pool_producer, pool_consumer) = rtrb::RingBuffer::new(buffer_count);
        let (data_producer, data_consumer) = rtrb::RingBuffer::new(buffer_count);

        // This is the only place where block storage is allocated
        for _ in 0..buffer_count {
            let block = AudioBlock {
                samples: Vec::with_capacity(buffer_size),
                arrived_at_ms: 0,
            };
            pool_producer
                .push(block)
                .expect("Failed to push block to pool queue during initialization");
        }

        BufferPoolChannels {
            data_producer,
            data_consumer,
            pool_producer,
            pool_consumer,
            buffer_size,
        }
    }
}

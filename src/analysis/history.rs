//! Rolling history of completed windows.

use std::collections::VecDeque;

use super::window::WindowStatistics;
use crate::config::HISTORY_SIZE;

/// Fixed-capacity FIFO of the most recent window statistics, oldest first
#[derive(Debug, Clone)]
pub struct WindowHistory {
    records: VecDeque<WindowStatistics>,
}

impl WindowHistory {
    pub fn new() -> Self {
        Self {
            records: VecDeque::with_capacity(HISTORY_SIZE),
        }
    }

    /// Append a record, evicting the oldest once the history is full
    pub fn push(&mut self, record: WindowStatistics) {
        if self.records.len() == HISTORY_SIZE {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Copy of the current records, oldest first
    ///
    /// Returned by value so callers never hold a view into the live buffer.
    pub fn snapshot(&self) -> Vec<WindowStatistics> {
        self.records.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() == HISTORY_SIZE
    }
}

impl Default for WindowHistory {
    fn default() -> Self {
        Self::new()
    }
}

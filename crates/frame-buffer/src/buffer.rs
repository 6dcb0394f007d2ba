//! Bounded Frame FIFO

use crate::Patch;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Default capacity (10 s window at 40 fps)
pub const DEFAULT_CAPACITY: usize = 400;

/// Face patch with its capture time
#[derive(Debug, Clone)]
pub struct FrameSample {
    pub patch: Patch,
    pub captured_at_ms: i64,
}

/// Bounded FIFO of frame samples, oldest evicted first.
///
/// Timestamps never decrease: an older timestamp is clamped to the newest
/// stored one.
#[derive(Debug)]
pub struct FrameBuffer {
    data: VecDeque<Arc<FrameSample>>,
    capacity: usize,
    total_written: u64,
}

impl FrameBuffer {
    /// Create a buffer holding at most `capacity` frames (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
            total_written: 0,
        }
    }

    /// Size the buffer for a capture window
    pub fn for_window(window_secs: u64, capture_fps: u32) -> Self {
        Self::new(window_secs as usize * capture_fps as usize)
    }

    /// Append a patch, evicting the oldest frame when full
    pub fn append(&mut self, patch: Patch, at_ms: i64) {
        let captured_at_ms = match self.data.back() {
            Some(newest) if at_ms < newest.captured_at_ms => {
                debug!(
                    at_ms,
                    newest = newest.captured_at_ms,
                    "Clamping out-of-order frame timestamp"
                );
                newest.captured_at_ms
            }
            _ => at_ms,
        };

        if self.data.len() >= self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(Arc::new(FrameSample {
            patch,
            captured_at_ms,
        }));
        self.total_written += 1;
    }

    /// Frames captured at or after `start_ms`, oldest first
    pub fn slice_since(&self, start_ms: i64) -> Vec<Arc<FrameSample>> {
        let first = self
            .data
            .partition_point(|sample| sample.captured_at_ms < start_ms);
        self.data.range(first..).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Occupied share of the capacity
    pub fn fill_ratio(&self) -> f64 {
        self.data.len() as f64 / self.capacity as f64
    }

    /// Frames appended since creation or the last `clear`
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.total_written = 0;
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

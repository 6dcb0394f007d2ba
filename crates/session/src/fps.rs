//! Capture rate meter

use std::collections::VecDeque;

/// Timestamps kept by the meter
pub const FPS_HISTORY: usize = 3600;

/// Rolling record of processed-frame timestamps
#[derive(Debug, Clone)]
pub struct FpsMeter {
    stamps: VecDeque<i64>,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self {
            stamps: VecDeque::with_capacity(FPS_HISTORY),
        }
    }

    /// Record one processed frame
    pub fn log(&mut self, at_ms: i64) {
        if self.stamps.len() >= FPS_HISTORY {
            self.stamps.pop_front();
        }
        self.stamps.push_back(at_ms);
    }

    /// Frames per second over `(start_ms, end_ms)`.
    ///
    /// The span runs from the first frame inside the window to `end_ms`, in
    /// whole seconds. Returns 0 for an empty window or a span under half a
    /// second.
    pub fn fps(&self, start_ms: i64, end_ms: i64) -> u32 {
        let mut inside = self.stamps.iter().filter(|&&t| t > start_ms && t < end_ms);
        let Some(&first) = inside.next() else {
            return 0;
        };
        let count = 1 + inside.count();

        let span_secs = ((end_ms - first) as f64 / 1000.0).round();
        if span_secs <= 0.0 {
            return 0;
        }
        (count as f64 / span_secs).round() as u32
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new()
    }
}

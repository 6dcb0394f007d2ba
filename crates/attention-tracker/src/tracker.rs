//! Attention sample history

use crate::head_shake::head_shake_count;
use crate::AttentionSample;
use dsp::round2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Maximum samples kept
    pub capacity: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self { capacity: 400 }
    }
}

impl TrackerConfig {
    /// Capacity for a capture window
    pub fn for_window(window_secs: u64, capture_fps: u32) -> Self {
        Self {
            capacity: window_secs as usize * capture_fps as usize,
        }
    }
}

/// Window summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttentionStats {
    /// Share of frames with a face, rounded to two decimals
    pub present_fraction: f64,
    pub head_shake_count: u32,
}

impl AttentionStats {
    /// Summarize a window of samples; an empty window is all zeros
    pub fn from_samples(window: &[AttentionSample]) -> Self {
        if window.is_empty() {
            return Self::default();
        }

        let present: f64 = window.iter().map(AttentionSample::presence).sum();
        let yaw: Vec<f64> = window.iter().map(|s| s.yaw_degrees).collect();

        Self {
            present_fraction: round2(present / window.len() as f64),
            head_shake_count: head_shake_count(&yaw),
        }
    }
}

/// Bounded, time-ordered attention samples
#[derive(Debug)]
pub struct AttentionTracker {
    data: VecDeque<AttentionSample>,
    capacity: usize,
}

impl AttentionTracker {
    pub fn new(config: TrackerConfig) -> Self {
        let capacity = config.capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest when full
    pub fn append(&mut self, mut sample: AttentionSample) {
        if let Some(newest) = self.data.back() {
            if sample.at_ms < newest.at_ms {
                debug!(at_ms = sample.at_ms, newest = newest.at_ms, "Clamping out-of-order attention sample");
                sample.at_ms = newest.at_ms;
            }
        }
        if self.data.len() >= self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(sample);
    }

    /// Yaw of the newest sample, 0.0 when empty
    pub fn newest_yaw(&self) -> f64 {
        self.data.back().map(|s| s.yaw_degrees).unwrap_or(0.0)
    }

    /// Samples strictly inside `(start_ms, end_ms)`
    pub fn query(&self, start_ms: i64, end_ms: i64) -> Vec<AttentionSample> {
        self.data
            .iter()
            .filter(|s| s.at_ms > start_ms && s.at_ms < end_ms)
            .copied()
            .collect()
    }

    /// Presence fraction and head-shake count over `(start_ms, end_ms)`
    pub fn stat(&self, start_ms: i64, end_ms: i64) -> AttentionStats {
        AttentionStats::from_samples(&self.query(start_ms, end_ms))
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

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

impl Default for AttentionTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

//! Attention samples

use serde::{Deserialize, Serialize};

/// One processed camera frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttentionSample {
    pub at_ms: i64,
    pub yaw_degrees: f64,
    pub face_present: bool,
}

impl AttentionSample {
    /// Frame with a tracked face
    pub fn present(at_ms: i64, yaw_degrees: f64) -> Self {
        Self {
            at_ms,
            yaw_degrees,
            face_present: true,
        }
    }

    /// Frame without a face; yaw is carried from the previous sample
    pub fn absent(at_ms: i64, carried_yaw: f64) -> Self {
        Self {
            at_ms,
            yaw_degrees: carried_yaw,
            face_present: false,
        }
    }

    /// Presence as 0.0 or 1.0
    pub fn presence(&self) -> f64 {
        if self.face_present {
            1.0
        } else {
            0.0
        }
    }
}

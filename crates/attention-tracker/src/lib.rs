//! Attention Tracker
//!
//! Per-frame presence and yaw samples for a session:
//! - Bounded sample history with windowed queries
//! - Presence fraction and head-shake count per window
//! - Yaw estimation from face-mesh landmarks

pub mod head_shake;
mod pose;
mod sample;
mod tracker;

pub use head_shake::head_shake_count;
pub use pose::{yaw_from_landmarks, FaceMesh, Landmark};
pub use sample::AttentionSample;
pub use tracker::{AttentionStats, AttentionTracker, TrackerConfig};

use thiserror::Error;

/// Landmark input errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LandmarkError {
    #[error("Face mesh has {actual} points, need at least {required}")]
    TooFewLandmarks { required: usize, actual: usize },

    #[error("Landmark {0} is not finite")]
    NonFinite(usize),
}

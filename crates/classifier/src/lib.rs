//! Emotion Classifier
//!
//! Combines a stress level and an attention score into one of four
//! emotion states, or `Unknown` when either input is unusable.

mod decision;
mod state;

pub use decision::{attention_type, classify, quantize_stress, Classifier, ClassifierThresholds};
pub use state::{AttentionType, EmotionState, StressLevel};

//! Classification states

use serde::{Deserialize, Serialize};

/// Quantized stress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StressLevel {
    Low,
    Moderate,
    High,
    Invalid,
}

impl StressLevel {
    /// Wire code
    pub fn code(&self) -> u16 {
        match self {
            StressLevel::Low => 1,
            StressLevel::Moderate => 2,
            StressLevel::High => 3,
            StressLevel::Invalid => 999,
        }
    }
}

/// Quantized attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttentionType {
    Inattentive,
    Attentive,
    Invalid,
}

impl AttentionType {
    /// Wire code
    pub fn code(&self) -> u16 {
        match self {
            AttentionType::Inattentive => 0,
            AttentionType::Attentive => 1,
            AttentionType::Invalid => 999,
        }
    }
}

/// Emotion/engagement state dispatched once per window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EmotionState {
    /// Attentive, low or moderate stress
    Calm,
    /// Attentive, high stress
    Mild,
    /// Inattentive, low or moderate stress
    Tense,
    /// Inattentive, high stress
    Distressed,
    #[default]
    Unknown,
}

impl EmotionState {
    /// Wire code (1-4, 999 for unknown)
    pub fn code(&self) -> u16 {
        match self {
            EmotionState::Calm => 1,
            EmotionState::Mild => 2,
            EmotionState::Tense => 3,
            EmotionState::Distressed => 4,
            EmotionState::Unknown => 999,
        }
    }
}

//! Decision rules

use crate::{AttentionType, EmotionState, StressLevel};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Quantization thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Stress below this is low
    pub stress_low: f64,
    /// Stress up to this is moderate
    pub stress_moderate: f64,
    /// Stress up to this is high; above is invalid
    pub stress_max: f64,
    /// Minimum presence for a valid attention reading
    pub present_min: f64,
    /// Minimum attention score for an attentive reading
    pub attention_min: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            stress_low: 0.4,
            stress_moderate: 0.8,
            stress_max: 1.0,
            present_min: 0.6,
            attention_min: 0.6,
        }
    }
}

/// Emotion classifier with configurable thresholds
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    thresholds: ClassifierThresholds,
}

impl Classifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    pub fn quantize_stress(&self, stress: f64) -> StressLevel {
        let t = &self.thresholds;
        if stress < t.stress_low {
            StressLevel::Low
        } else if stress <= t.stress_moderate {
            StressLevel::Moderate
        } else if stress <= t.stress_max {
            StressLevel::High
        } else {
            // NaN lands here as well
            StressLevel::Invalid
        }
    }

    pub fn attention_type(&self, attention: f64, present: f64) -> AttentionType {
        let t = &self.thresholds;
        // NaN fails both comparisons and falls through
        if present < t.present_min {
            AttentionType::Invalid
        } else if attention >= t.attention_min {
            AttentionType::Attentive
        } else {
            AttentionType::Inattentive
        }
    }

    /// Final decision for one window
    pub fn classify(&self, stress: f64, attention: f64, present: f64) -> EmotionState {
        let stress_level = self.quantize_stress(stress);
        let attention_type = self.attention_type(attention, present);

        let state = match (attention_type, stress_level) {
            (AttentionType::Invalid, _) | (_, StressLevel::Invalid) => EmotionState::Unknown,
            (AttentionType::Attentive, StressLevel::Low | StressLevel::Moderate) => EmotionState::Calm,
            (AttentionType::Attentive, StressLevel::High) => EmotionState::Mild,
            (AttentionType::Inattentive, StressLevel::Low | StressLevel::Moderate) => EmotionState::Tense,
            (AttentionType::Inattentive, StressLevel::High) => EmotionState::Distressed,
        };

        debug!(?stress_level, ?attention_type, ?state, "Classified window");
        state
    }
}

/// Quantize stress with the default thresholds
pub fn quantize_stress(stress: f64) -> StressLevel {
    Classifier::default().quantize_stress(stress)
}

/// Attention type with the default thresholds
pub fn attention_type(attention: f64, present: f64) -> AttentionType {
    Classifier::default().attention_type(attention, present)
}

/// Classify with the default thresholds
pub fn classify(stress: f64, attention: f64, present: f64) -> EmotionState {
    Classifier::default().classify(stress, attention, present)
}

//! Attention score

/// Steepness of the head-shake penalty
const HALF_POINT: f64 = 5.0;

/// Fuse presence and head shakes into a score in `[0, 1]`.
///
/// `p · (1 + e^-5) / (1 + e^(shakes - 5p))`, which is 1 for a fully present
/// subject without shakes. Non-finite results map to 0.5.
pub fn attention_score(present_fraction: f64, head_shake_count: u32) -> f64 {
    let p = present_fraction;
    let score = p * (1.0 + (-HALF_POINT).exp()) / (1.0 + (head_shake_count as f64 - HALF_POINT * p).exp());
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.5
    }
}

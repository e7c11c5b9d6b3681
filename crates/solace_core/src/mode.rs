//! Support-mode selection.
//!
//! An ordered decision list: the first matching rule wins, so crisis routing
//! always overrides mood-based routing. The order is load-bearing — do not
//! reorder the arms.

use crate::mood::SupportMode;
use crate::risk::CRISIS_THRESHOLD;

/// Map `(risk_score, dominant_mood)` onto a response strategy.
pub fn select(risk_score: f32, dominant_mood: &str) -> SupportMode {
    if risk_score >= CRISIS_THRESHOLD {
        return SupportMode::CrisisAware;
    }
    match dominant_mood {
        "sad" | "anxious" | "overwhelmed" => SupportMode::Calming,
        "tired" | "exhausted" => SupportMode::Stability,
        "neutral" => SupportMode::Listening,
        _ => SupportMode::Motivation,
    }
}

//! Risk evaluation: derive crisis flags from a fused mood plus explicit
//! lexical crisis signals. Pure function of its inputs.

use crate::mood::{MoodState, RiskFlags};

/// Risk at or above this is a crisis. Shared with the fusion engine's
/// `Fragile` stability threshold; keep the two consistent.
pub const CRISIS_THRESHOLD: f32 = 0.6;

/// Risk at or above this marks the mood as overwhelmed.
pub const OVERWHELM_THRESHOLD: f32 = 0.3;

/// Explicit crisis language forces risk at least this high. It overrides a
/// lower fused score but never lowers a higher one.
pub const KEYWORD_RISK_FLOOR: f32 = 0.7;

/// Build [`RiskFlags`] from a mood state and the crisis keywords spotted in
/// the user's text. Deterministic, no side effects.
pub fn evaluate(mood: &MoodState, crisis_keywords: &[String]) -> RiskFlags {
    let mut risk_score = mood.risk_score.max(0.0);

    if !crisis_keywords.is_empty() {
        risk_score = risk_score.max(KEYWORD_RISK_FLOOR);
    }

    let risk_score = risk_score.min(1.0);

    RiskFlags {
        crisis_keywords: crisis_keywords.to_vec(),
        risk_score,
        is_crisis: risk_score >= CRISIS_THRESHOLD,
    }
}

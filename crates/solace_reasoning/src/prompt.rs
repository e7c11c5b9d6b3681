//! Prompt assembly: persona, per-mode instructions, mood summary and history
//! splicing.

use serde_json::{json, Value};
use solace_core::mood::{MoodState, Role, SupportMode};
use solace_core::GenerationRequest;

pub const SYSTEM_PROMPT: &str = "\
You are a warm, empathetic, and emotionally intelligent support companion.

IMPORTANT BOUNDARIES:
- You are NOT a medical professional, therapist, or doctor.
- You do NOT diagnose mental illness or prescribe medication.
- You ONLY provide emotional support, wellness guidance, and healthy coping suggestions.
- If someone shows signs of self-harm or severe distress, encourage them to contact real human help immediately.

YOUR PERSONALITY:
- Speak like a caring, intelligent friend, warm, genuine, and human-like.
- Be conversational and natural, not clinical or robotic.
- Match the user's energy level: if they're brief, be brief; if they're sharing deeply, engage more.
- Avoid corporate jargon, buzzwords, or overly formal language.

RESPONSE STYLE:
- Write naturally, as if texting a friend who needs support.
- Vary your sentence length and structure.
- Use contractions naturally (I'm, you're, it's).
- Be specific and personal, not generic.";

/// Shown to the model when the triggering event carried no text.
pub const NONVERBAL_NUDGE: &str = "The user did not type anything but shared nonverbal \
signals. Please respond briefly and gently based on the mood context.";

/// Mode-specific steering appended to the system prompt. Crisis instructions
/// win whenever the risk evaluator raised the flag, whatever mode was picked.
pub fn mode_instructions(mode: SupportMode, is_crisis: bool) -> &'static str {
    if is_crisis || mode == SupportMode::CrisisAware {
        return "CRISIS-AWARE MODE:\n\
            - Express concern and care clearly.\n\
            - Encourage the user to contact trusted people or local emergency/helplines.\n\
            - Do NOT attempt to diagnose or treat. Do NOT give step-by-step instructions.\n\
            - Focus on safety, grounding, and reaching real humans.";
    }
    match mode {
        SupportMode::Listening => {
            "LISTENING MODE:\n\
            - Reflect the user's emotions and show you understand.\n\
            - Ask 1-2 gentle open questions.\n\
            - Do not rush to solutions."
        }
        SupportMode::Calming => {
            "CALMING MODE:\n\
            - Use short, soothing sentences.\n\
            - Offer simple grounding or breathing exercises.\n\
            - Avoid long lectures; keep it light and steady."
        }
        SupportMode::Motivation => {
            "MOTIVATION MODE:\n\
            - Acknowledge how hard things feel.\n\
            - Suggest 1-2 tiny, achievable actions.\n\
            - Avoid toxic positivity; be realistic but encouraging."
        }
        SupportMode::Stability => {
            "STABILITY MODE:\n\
            - Normalize their emotions.\n\
            - Gently suggest routines: sleep, food, water, small breaks, light movement.\n\
            - Focus on reducing overwhelm."
        }
        SupportMode::CrisisAware => unreachable!("handled above"),
    }
}

/// One-line mood summary injected as context.
pub fn summarize_mood(mood: &MoodState) -> String {
    format!(
        "Detected mood: {}, energy: {:?}, stability: {:?}, risk_score: {:.2}.",
        mood.dominant_mood,
        mood.energy_level,
        mood.stability,
        mood.risk_score,
    )
}

/// Build the chat-completions message list for one generation request.
pub fn build_messages(request: &GenerationRequest<'_>) -> Vec<Value> {
    let system_prompt = format!(
        "{}\n\n{}",
        SYSTEM_PROMPT,
        mode_instructions(request.mode, request.is_crisis)
    );

    let mut messages = vec![
        json!({"role": "system", "content": system_prompt}),
        json!({
            "role": "system",
            "content": format!("Mood context: {}", summarize_mood(request.mood)),
        }),
    ];

    for turn in request.history {
        let role = match turn.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        messages.push(json!({"role": role, "content": turn.content}));
    }

    match request.user_text {
        Some(text) => messages.push(json!({"role": "user", "content": text})),
        None => messages.push(json!({"role": "user", "content": NONVERBAL_NUDGE})),
    }

    messages
}

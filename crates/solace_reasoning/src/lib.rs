//! The response-generation boundary.
//!
//! Assembles a mood-aware prompt and calls an OpenRouter-compatible chat
//! completions API. Generation never fails outward: outages produce a
//! safety-oriented fallback message instead.

pub mod generate;
pub mod prompt;

pub use generate::OpenRouterGenerator;

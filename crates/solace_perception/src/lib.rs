//! Modality analyzers.
//!
//! Text analysis is a local lexicon heuristic; face and voice go through a
//! Gemini-compatible multimodal endpoint. All three honor the no-fail
//! contract: any internal problem yields the documented neutral fallback.

pub mod gemini;
pub mod text;
pub mod vision;
pub mod voice;

pub use text::LexiconTextAnalyzer;
pub use vision::GeminiFaceAnalyzer;
pub use voice::GeminiVoiceAnalyzer;

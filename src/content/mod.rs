pub mod bundled;
#[cfg(feature = "network")]
pub mod remote;
pub mod schema;

use thiserror::Error;

use crate::model::lesson::{GrammarLesson, GrammarLevel};
use crate::model::sentence::{Difficulty, Sentence};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("content request failed: {0}")]
    Request(String),
    #[error("content payload rejected: {0}")]
    InvalidPayload(#[from] schema::SchemaError),
    #[error("provider returned no usable content")]
    Empty,
}

/// Boundary to the external content generator. Every call is a single
/// request-response with possible failure; the core never retries — a failed
/// call is surfaced once and leaves the engine in its prior stable state.
pub trait ContentProvider {
    /// Up to `count` playable sentences; may return fewer. Every returned
    /// sentence satisfies the model invariants (validated at this boundary).
    fn session_sentences(
        &mut self,
        difficulty: Difficulty,
        count: usize,
        focus_code: Option<u8>,
    ) -> Result<Vec<Sentence>, ProviderError>;

    /// Parse learner-supplied free text into playable sentences.
    fn parse_text(&mut self, text: &str) -> Result<Vec<Sentence>, ProviderError>;

    /// Best-effort guiding question for a misclassified modifier. Never
    /// fails: implementations substitute a generic fallback internally.
    fn socratic_hint(&mut self, modifier_text: &str, correct_code: u8, wrong_code: u8) -> String;

    fn grammar_lesson(
        &mut self,
        topic: &str,
        level: GrammarLevel,
    ) -> Result<GrammarLesson, ProviderError>;

    /// Raw 24 kHz mono s16le audio for the given text, or None when speech is
    /// unavailable — absence degrades silently in the UI.
    fn speech_audio(&mut self, text: &str) -> Option<Vec<u8>>;
}

pub const HINT_FALLBACK: &str = "이 문맥에서 어떤 의미가 더 자연스러운지 생각해보세요.";

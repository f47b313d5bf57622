use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::catalog;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

/// A contiguous post-noun modifier span, tagged with one of the 17
/// grammatical category codes. Owned by its Sentence and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    pub id: String,
    pub start_index: usize,
    pub end_index: usize,
    pub type_code: u8,
}

impl Modifier {
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index <= self.end_index
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    pub id: String,
    pub tokens: Vec<String>,
    pub head_noun_index: usize,
    pub main_verb_index: usize,
    #[serde(default)]
    pub distractor_indices: Vec<usize>,
    pub modifiers: Vec<Modifier>,
    #[serde(default = "default_subject_type")]
    pub subject_type: u8,
    pub translation: String,
    pub difficulty: Difficulty,
}

fn default_subject_type() -> u8 {
    1
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SentenceError {
    #[error("sentence has no tokens")]
    EmptyTokens,
    #[error("head noun index {0} out of range")]
    HeadNounOutOfRange(usize),
    #[error("main verb index {0} out of range")]
    MainVerbOutOfRange(usize),
    #[error("head noun and main verb share index {0}")]
    NounVerbCollision(usize),
    #[error("modifier {id} has inverted span {start}..{end}")]
    InvertedSpan { id: String, start: usize, end: usize },
    #[error("modifier {id} extends past the last token")]
    SpanOutOfRange { id: String },
    #[error("modifier {id} has unknown type code {code}")]
    UnknownTypeCode { id: String, code: u8 },
    #[error("modifiers are not sorted by start index")]
    UnsortedModifiers,
    #[error("modifiers {a} and {b} overlap")]
    OverlappingModifiers { a: String, b: String },
    #[error("distractor index {0} out of range")]
    DistractorOutOfRange(usize),
    #[error("distractor index {0} collides with a sentence anchor")]
    DistractorOnAnchor(usize),
}

impl Sentence {
    /// Enforce every structural invariant the analysis engine assumes.
    /// Provider payloads must pass this before a sentence reaches the engine.
    pub fn validate(&self) -> Result<(), SentenceError> {
        let len = self.tokens.len();
        if len == 0 {
            return Err(SentenceError::EmptyTokens);
        }
        if self.head_noun_index >= len {
            return Err(SentenceError::HeadNounOutOfRange(self.head_noun_index));
        }
        if self.main_verb_index >= len {
            return Err(SentenceError::MainVerbOutOfRange(self.main_verb_index));
        }
        if self.head_noun_index == self.main_verb_index {
            return Err(SentenceError::NounVerbCollision(self.head_noun_index));
        }

        for m in &self.modifiers {
            if m.start_index > m.end_index {
                return Err(SentenceError::InvertedSpan {
                    id: m.id.clone(),
                    start: m.start_index,
                    end: m.end_index,
                });
            }
            if m.end_index >= len {
                return Err(SentenceError::SpanOutOfRange { id: m.id.clone() });
            }
            if catalog::modifier_type(m.type_code).is_none() {
                return Err(SentenceError::UnknownTypeCode {
                    id: m.id.clone(),
                    code: m.type_code,
                });
            }
        }
        for pair in self.modifiers.windows(2) {
            if pair[1].start_index < pair[0].start_index {
                return Err(SentenceError::UnsortedModifiers);
            }
            if pair[1].start_index <= pair[0].end_index {
                return Err(SentenceError::OverlappingModifiers {
                    a: pair[0].id.clone(),
                    b: pair[1].id.clone(),
                });
            }
        }

        for &d in &self.distractor_indices {
            if d >= len {
                return Err(SentenceError::DistractorOutOfRange(d));
            }
            if d == self.head_noun_index || d == self.main_verb_index {
                return Err(SentenceError::DistractorOnAnchor(d));
            }
        }

        Ok(())
    }

    pub fn is_distractor(&self, index: usize) -> bool {
        self.distractor_indices.contains(&index)
    }

    pub fn in_any_modifier(&self, index: usize) -> bool {
        self.modifiers.iter().any(|m| m.contains(index))
    }

    pub fn modifier_text(&self, modifier: &Modifier) -> String {
        self.tokens[modifier.start_index..=modifier.end_index].join(" ")
    }

    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }
}

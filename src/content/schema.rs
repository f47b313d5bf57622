//! Wire shapes for generated content, and their promotion into validated
//! model types. Schema violations are rejected here, at the boundary — the
//! analysis engine assumes the model invariants hold unconditionally.

use serde::Deserialize;
use thiserror::Error;

use crate::model::lesson::{GrammarLesson, GrammarLevel};
use crate::model::sentence::{Difficulty, Modifier, Sentence, SentenceError};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("sentence {index}: {source}")]
    InvalidSentence {
        index: usize,
        #[source]
        source: SentenceError,
    },
    #[error("lesson quiz {index}: {reason}")]
    InvalidQuiz { index: usize, reason: String },
    #[error("lesson puzzle {index}: {reason}")]
    InvalidPuzzle { index: usize, reason: String },
    #[error("lesson has no {0}")]
    MissingSection(&'static str),
}

#[derive(Debug, Deserialize)]
pub struct RawSentenceBatch {
    pub sentences: Vec<RawSentence>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSentence {
    pub tokens: Vec<String>,
    pub head_noun_index: usize,
    pub main_verb_index: usize,
    #[serde(default)]
    pub distractor_indices: Vec<usize>,
    pub modifiers: Vec<RawModifier>,
    #[serde(default = "default_subject_type")]
    pub subject_type: u8,
    pub translation: String,
}

fn default_subject_type() -> u8 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawModifier {
    pub start_index: usize,
    pub end_index: usize,
    pub type_code: u8,
}

/// Promote a generated batch into validated sentences. Modifier order is
/// normalized (ascending start index) before validation; any remaining
/// violation rejects the whole batch as a provider failure.
pub fn sentences_from_batch(
    batch: RawSentenceBatch,
    id_prefix: &str,
    difficulty: Difficulty,
) -> Result<Vec<Sentence>, SchemaError> {
    let mut out = Vec::with_capacity(batch.sentences.len());
    for (index, raw) in batch.sentences.into_iter().enumerate() {
        let mut modifiers: Vec<Modifier> = raw
            .modifiers
            .into_iter()
            .enumerate()
            .map(|(m_index, m)| Modifier {
                id: format!("mod-{index}-{m_index}"),
                start_index: m.start_index,
                end_index: m.end_index,
                type_code: m.type_code,
            })
            .collect();
        modifiers.sort_by_key(|m| m.start_index);

        let sentence = Sentence {
            id: format!("{id_prefix}-{index}"),
            tokens: raw.tokens,
            head_noun_index: raw.head_noun_index,
            main_verb_index: raw.main_verb_index,
            distractor_indices: raw.distractor_indices,
            modifiers,
            subject_type: raw.subject_type,
            translation: raw.translation,
            difficulty,
        };
        sentence
            .validate()
            .map_err(|source| SchemaError::InvalidSentence { index, source })?;
        out.push(sentence);
    }
    Ok(out)
}

pub const QUIZ_OPTION_COUNT: usize = 5;

/// Validate a generated lesson: non-empty sections, five options per quiz
/// with a matching answer and per-option rationale, puzzles whose trays can
/// actually rebuild the target, distractors outside the correct order.
pub fn validate_lesson(lesson: &GrammarLesson, level: GrammarLevel) -> Result<(), SchemaError> {
    if lesson.quizzes.is_empty() {
        return Err(SchemaError::MissingSection("quizzes"));
    }
    if lesson.puzzles.is_empty() {
        return Err(SchemaError::MissingSection("puzzles"));
    }

    for (index, quiz) in lesson.quizzes.iter().enumerate() {
        if quiz.options.len() != QUIZ_OPTION_COUNT {
            return Err(SchemaError::InvalidQuiz {
                index,
                reason: format!("expected {QUIZ_OPTION_COUNT} options, got {}", quiz.options.len()),
            });
        }
        if !quiz.options.contains(&quiz.answer) {
            return Err(SchemaError::InvalidQuiz {
                index,
                reason: "answer is not among the options".to_string(),
            });
        }
        if quiz.distractor_hints.len() != quiz.options.len() {
            return Err(SchemaError::InvalidQuiz {
                index,
                reason: "one rationale required per option".to_string(),
            });
        }
    }

    for (index, puzzle) in lesson.puzzles.iter().enumerate() {
        if puzzle.correct_order.is_empty() {
            return Err(SchemaError::InvalidPuzzle {
                index,
                reason: "empty correct order".to_string(),
            });
        }
        let mut chunks = puzzle.chunks.clone();
        chunks.sort();
        let mut order = puzzle.correct_order.clone();
        order.sort();
        if chunks != order {
            return Err(SchemaError::InvalidPuzzle {
                index,
                reason: "chunks do not rebuild the correct order".to_string(),
            });
        }
        if let Some(distractor) = &puzzle.distractor {
            if puzzle.correct_order.iter().any(|c| c == distractor) {
                return Err(SchemaError::InvalidPuzzle {
                    index,
                    reason: "distractor appears in the correct order".to_string(),
                });
            }
        } else if level == GrammarLevel::Advanced {
            return Err(SchemaError::InvalidPuzzle {
                index,
                reason: "advanced puzzles require a distractor chunk".to_string(),
            });
        }
    }

    Ok(())
}

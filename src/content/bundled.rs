//! Offline content source. Ships a curated sentence bank and two full grammar
//! lessons as embedded assets, so the game is playable without network access
//! and tests run against deterministic content.

use std::collections::HashMap;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rust_embed::Embed;

use crate::content::{ContentProvider, HINT_FALLBACK, ProviderError, schema};
use crate::model::catalog;
use crate::model::lesson::{GrammarLesson, GrammarLevel};
use crate::model::sentence::{Difficulty, Sentence};

#[derive(Embed)]
#[folder = "assets/content/"]
struct ContentAssets;

pub struct BundledProvider {
    bank: Vec<Sentence>,
    lessons: HashMap<String, GrammarLesson>,
    rng: SmallRng,
}

impl BundledProvider {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    pub fn with_rng(rng: SmallRng) -> Self {
        Self {
            bank: load_bank(),
            lessons: load_lessons(),
            rng,
        }
    }

    pub fn bank(&self) -> &[Sentence] {
        &self.bank
    }
}

impl Default for BundledProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn load_json<T: serde::de::DeserializeOwned + Default>(name: &str) -> T {
    let Some(file) = ContentAssets::get(name) else {
        return T::default();
    };
    serde_json::from_slice(file.data.as_ref()).unwrap_or_default()
}

fn load_bank() -> Vec<Sentence> {
    let bank: Vec<Sentence> = load_json("sentences.json");
    // First-party data, but hold it to the same boundary contract as
    // generated content: anything invalid never reaches the engine.
    bank.into_iter().filter(|s| s.validate().is_ok()).collect()
}

fn load_lessons() -> HashMap<String, GrammarLesson> {
    load_json("lessons.json")
}

impl ContentProvider for BundledProvider {
    fn session_sentences(
        &mut self,
        difficulty: Difficulty,
        count: usize,
        focus_code: Option<u8>,
    ) -> Result<Vec<Sentence>, ProviderError> {
        let mut pool: Vec<Sentence> = self
            .bank
            .iter()
            .filter(|s| s.difficulty == difficulty)
            .cloned()
            .collect();
        if pool.is_empty() {
            return Err(ProviderError::Empty);
        }
        // Fisher-Yates, then stable-sort focused sentences to the front so a
        // weakness hand-off drills its code first.
        for i in (1..pool.len()).rev() {
            let j = self.rng.gen_range(0..=i);
            pool.swap(i, j);
        }
        if let Some(code) = focus_code {
            pool.sort_by_key(|s| !s.modifiers.iter().any(|m| m.type_code == code));
        }
        pool.truncate(count);
        Ok(pool)
    }

    fn parse_text(&mut self, _text: &str) -> Result<Vec<Sentence>, ProviderError> {
        Err(ProviderError::Request(
            "custom text parsing needs the network provider".to_string(),
        ))
    }

    fn socratic_hint(&mut self, modifier_text: &str, correct_code: u8, wrong_code: u8) -> String {
        match (
            catalog::modifier_type(correct_code),
            catalog::modifier_type(wrong_code),
        ) {
            (Some(correct), Some(wrong)) => format!(
                "'{modifier_text}'가 정말 {}({})일까요? {} 단서를 찾아보세요: {}",
                wrong.name, wrong.hint, correct.question, correct.hint
            ),
            _ => HINT_FALLBACK.to_string(),
        }
    }

    fn grammar_lesson(
        &mut self,
        topic: &str,
        level: GrammarLevel,
    ) -> Result<GrammarLesson, ProviderError> {
        let lesson = self.lessons.get(topic).cloned().ok_or(ProviderError::Empty)?;
        schema::validate_lesson(&lesson, level)?;
        Ok(lesson)
    }

    fn speech_audio(&mut self, _text: &str) -> Option<Vec<u8>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> BundledProvider {
        BundledProvider::with_rng(SmallRng::seed_from_u64(11))
    }

    #[test]
    fn every_bank_sentence_satisfies_the_invariants() {
        let p = provider();
        assert!(!p.bank().is_empty());
        for sentence in p.bank() {
            assert_eq!(sentence.validate(), Ok(()), "bad sentence {}", sentence.id);
        }
    }

    #[test]
    fn bank_covers_all_difficulties() {
        let p = provider();
        for difficulty in Difficulty::ALL {
            assert!(
                p.bank().iter().any(|s| s.difficulty == difficulty),
                "no {difficulty:?} sentences"
            );
        }
    }

    #[test]
    fn session_respects_count_and_difficulty() {
        let mut p = provider();
        let sentences = p
            .session_sentences(Difficulty::Beginner, 2, None)
            .unwrap();
        assert!(sentences.len() <= 2);
        assert!(!sentences.is_empty());
        assert!(sentences.iter().all(|s| s.difficulty == Difficulty::Beginner));
    }

    #[test]
    fn focus_code_sentences_come_first() {
        let mut p = provider();
        let sentences = p
            .session_sentences(Difficulty::Beginner, 10, Some(4))
            .unwrap();
        let first = &sentences[0];
        assert!(first.modifiers.iter().any(|m| m.type_code == 4));
    }

    #[test]
    fn bundled_lessons_validate_for_both_levels() {
        let mut p = provider();
        for topic in ["participle", "rel_pronoun"] {
            for level in [GrammarLevel::Beginner, GrammarLevel::Advanced] {
                let lesson = p.grammar_lesson(topic, level).unwrap();
                assert!(!lesson.quizzes.is_empty());
                assert!(!lesson.puzzles.is_empty());
            }
        }
    }

    #[test]
    fn unknown_topic_fails_cleanly() {
        let mut p = provider();
        assert!(matches!(
            p.grammar_lesson("no_such_topic", GrammarLevel::Beginner),
            Err(ProviderError::Empty)
        ));
    }

    #[test]
    fn hint_is_deterministic_and_mentions_the_phrase() {
        let mut p = provider();
        let a = p.socratic_hint("running in the park", 4, 5);
        let b = p.socratic_hint("running in the park", 4, 5);
        assert_eq!(a, b);
        assert!(a.contains("running in the park"));
        let fallback = p.socratic_hint("x", 0, 99);
        assert_eq!(fallback, HINT_FALLBACK);
    }

    #[test]
    fn speech_is_silently_unavailable() {
        let mut p = provider();
        assert!(p.speech_audio("The boy runs.").is_none());
    }
}

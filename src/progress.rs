use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Difficulty;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MistakeKind {
    Range,
    Code,
    Noun,
    Verb,
    Trap,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub sentence_id: String,
    pub correct: bool,
    pub mistake: Option<MistakeKind>,
    pub modifier_code: Option<u8>,
    pub timestamp: DateTime<Utc>,
}

/// Retry-queue item. An entry exists if and only if the sentence currently
/// needs review; two consecutive correct completions evict it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LandfillEntry {
    pub sentence_id: String,
    pub wrong_code: Option<u8>,
    pub wrong_count: u32,
    pub consecutive_correct: u32,
    pub last_attempt: DateTime<Utc>,
}

pub const BASE_EXP: u64 = 10;
pub const COMBO_EXP: u64 = 2;
const LANDFILL_EVICT_AT: u32 = 2;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressState {
    pub exp: u64,
    pub combo: u32,
    pub landfill: HashMap<String, LandfillEntry>,
    pub history: Vec<AttemptRecord>,
    pub tutorial_completed: bool,
    pub unlocked_levels: Vec<Difficulty>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            exp: 0,
            combo: 0,
            landfill: HashMap::new(),
            history: Vec::new(),
            tutorial_completed: false,
            unlocked_levels: Difficulty::ALL.to_vec(),
        }
    }
}

impl ProgressState {
    /// Append one attempt to the history log. Failures carry their mistake
    /// kind; range/code attempts also carry the active modifier's type code.
    pub fn record_attempt(
        &mut self,
        sentence_id: &str,
        correct: bool,
        mistake: MistakeKind,
        modifier_code: Option<u8>,
    ) {
        self.history.push(AttemptRecord {
            sentence_id: sentence_id.to_string(),
            correct,
            mistake: if correct { None } else { Some(mistake) },
            modifier_code,
            timestamp: Utc::now(),
        });
    }

    /// Register one qualifying mistake against a sentence. Creates the entry
    /// on first call, otherwise bumps `wrong_count` and resets the
    /// consecutive-correct streak.
    pub fn enqueue_landfill(&mut self, sentence_id: &str, wrong_code: Option<u8>) {
        let entry = self
            .landfill
            .entry(sentence_id.to_string())
            .or_insert_with(|| LandfillEntry {
                sentence_id: sentence_id.to_string(),
                wrong_code: None,
                wrong_count: 0,
                consecutive_correct: 0,
                last_attempt: Utc::now(),
            });
        entry.wrong_count += 1;
        entry.consecutive_correct = 0;
        entry.last_attempt = Utc::now();
        if wrong_code.is_some() {
            entry.wrong_code = wrong_code;
        }
    }

    /// Credit a completed review of a landfill sentence. No-op when the
    /// sentence is not in the queue; evicts the entry after two consecutive
    /// successes.
    pub fn mark_landfill_success(&mut self, sentence_id: &str) {
        let Some(entry) = self.landfill.get_mut(sentence_id) else {
            return;
        };
        entry.consecutive_correct += 1;
        entry.last_attempt = Utc::now();
        if entry.consecutive_correct >= LANDFILL_EVICT_AT {
            self.landfill.remove(sentence_id);
        }
    }

    pub fn break_combo(&mut self) {
        self.combo = 0;
    }

    /// Award experience for a completed sentence: base plus the combo bonus
    /// computed from the streak *before* this success.
    pub fn award_success(&mut self) -> u64 {
        let gained = BASE_EXP + COMBO_EXP * self.combo as u64;
        self.exp += gained;
        self.combo += 1;
        gained
    }

    /// Landfill ids ordered oldest-attempt first, for review-session assembly.
    pub fn landfill_ids(&self) -> Vec<String> {
        let mut entries: Vec<&LandfillEntry> = self.landfill.values().collect();
        entries.sort_by_key(|e| e.last_attempt);
        entries.iter().map(|e| e.sentence_id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_enqueue_creates_entry() {
        let mut p = ProgressState::default();
        p.enqueue_landfill("s1", None);
        let e = &p.landfill["s1"];
        assert_eq!(e.wrong_count, 1);
        assert_eq!(e.consecutive_correct, 0);
        assert_eq!(e.wrong_code, None);
    }

    #[test]
    fn repeat_enqueue_bumps_count_and_resets_streak() {
        let mut p = ProgressState::default();
        p.enqueue_landfill("s1", None);
        p.mark_landfill_success("s1");
        assert_eq!(p.landfill["s1"].consecutive_correct, 1);
        p.enqueue_landfill("s1", Some(7));
        let e = &p.landfill["s1"];
        assert_eq!(e.wrong_count, 2);
        assert_eq!(e.consecutive_correct, 0);
        assert_eq!(e.wrong_code, Some(7));
    }

    #[test]
    fn two_successes_evict_then_third_is_noop() {
        let mut p = ProgressState::default();
        p.enqueue_landfill("s1", None);
        p.mark_landfill_success("s1");
        assert!(p.landfill.contains_key("s1"));
        p.mark_landfill_success("s1");
        assert!(!p.landfill.contains_key("s1"));
        p.mark_landfill_success("s1");
        assert!(!p.landfill.contains_key("s1"));
    }

    #[test]
    fn success_on_unknown_sentence_does_not_create_entry() {
        let mut p = ProgressState::default();
        p.mark_landfill_success("never-seen");
        assert!(p.landfill.is_empty());
    }

    #[test]
    fn exp_scales_with_prior_combo_and_never_decreases() {
        let mut p = ProgressState::default();
        assert_eq!(p.award_success(), 10);
        assert_eq!(p.combo, 1);
        assert_eq!(p.award_success(), 12);
        assert_eq!(p.award_success(), 14);
        assert_eq!(p.exp, 36);
        p.break_combo();
        assert_eq!(p.combo, 0);
        assert_eq!(p.exp, 36);
        assert_eq!(p.award_success(), 10);
    }

    #[test]
    fn failed_attempt_keeps_mistake_kind_successful_drops_it() {
        let mut p = ProgressState::default();
        p.record_attempt("s1", true, MistakeKind::Noun, None);
        p.record_attempt("s1", false, MistakeKind::Range, Some(4));
        assert_eq!(p.history.len(), 2);
        assert_eq!(p.history[0].mistake, None);
        assert_eq!(p.history[1].mistake, Some(MistakeKind::Range));
        assert_eq!(p.history[1].modifier_code, Some(4));
    }

    #[test]
    fn all_levels_start_unlocked() {
        let p = ProgressState::default();
        assert_eq!(p.unlocked_levels.len(), 3);
    }
}

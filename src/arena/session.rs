use crate::arena::diagnosis::{self, Diagnosis};
use crate::model::catalog;
use crate::model::sentence::{Difficulty, Modifier, Sentence};
use crate::progress::{MistakeKind, ProgressState};

/// Per-sentence interaction phases, plus the session-terminal `Diagnosis`.
/// Linear except for the modifier loop: `SelectModifierSpan` and
/// `ClassifyModifier` repeat once per modifier, left to right.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArenaPhase {
    SelectHeadNoun,
    ImplicitQuestion,
    SelectModifierSpan,
    ClassifyModifier,
    FindMainVerb,
    SentenceResult,
    Diagnosis,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionKind {
    Standard(Difficulty),
    LandfillReview,
    Custom,
}

/// Learner inputs the reducer understands. The UI layer translates cursor
/// movement and key presses into these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArenaInput {
    Token(usize),
    Code(u8),
    Advance,
}

/// Deferred phase change. `epoch` pins the session state the timer was
/// scheduled against; `resolve` ignores the pending action if the session
/// has moved on since.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pending {
    pub epoch: u64,
    pub delay_ms: u64,
    advance: Advance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Advance {
    BeginModifierSearch,
    ToResult,
}

pub const QUESTION_DELAY_MS: u64 = 1500;
pub const RESULT_DELAY_MS: u64 = 800;

const RANGE_MISTAKE_LIMIT: u32 = 3;
const CODE_MISTAKE_LIMIT: u32 = 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MistakeCounters {
    pub range: u32,
    pub code: u32,
}

pub struct HintRequest {
    pub modifier_text: String,
    pub correct_code: u8,
    pub wrong_code: u8,
}

/// Result of feeding one input (or resolving one timer) into the reducer.
#[derive(Default)]
pub struct Outcome {
    pub message: Option<String>,
    pub error: bool,
    pub pending: Option<Pending>,
    pub hint: Option<HintRequest>,
    /// Entering the result view requests a one-shot sentence read-aloud.
    pub speak: bool,
    /// Set once, when `Advance` on the last sentence enters `Diagnosis`.
    pub session_over: bool,
}

impl Outcome {
    fn noop() -> Self {
        Outcome::default()
    }

    fn info(text: &str) -> Self {
        Outcome {
            message: Some(text.to_string()),
            ..Outcome::default()
        }
    }

    fn fail(text: &str) -> Self {
        Outcome {
            message: Some(text.to_string()),
            error: true,
            ..Outcome::default()
        }
    }
}

pub struct ArenaSession {
    sentences: Vec<Sentence>,
    pub kind: SessionKind,
    pub index: usize,
    pub phase: ArenaPhase,
    pub modifier_index: usize,
    pub cleaned: Vec<usize>,
    pub selection_start: Option<usize>,
    pub selection_end: Option<usize>,
    pub mistakes: MistakeCounters,
    pub diagnosis: Option<Diagnosis>,
    /// Bumped on every phase change; stale timers compare against it.
    epoch: u64,
}

impl ArenaSession {
    /// Returns None for an empty queue: generation failure is the caller's
    /// signal to stay on the selection screen, never the engine's to crash.
    pub fn new(sentences: Vec<Sentence>, kind: SessionKind) -> Option<Self> {
        if sentences.is_empty() {
            return None;
        }
        Some(Self {
            sentences,
            kind,
            index: 0,
            phase: ArenaPhase::SelectHeadNoun,
            modifier_index: 0,
            cleaned: Vec::new(),
            selection_start: None,
            selection_end: None,
            mistakes: MistakeCounters::default(),
            diagnosis: None,
            epoch: 0,
        })
    }

    pub fn sentence(&self) -> &Sentence {
        &self.sentences[self.index]
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    pub fn session_ids(&self) -> Vec<String> {
        self.sentences.iter().map(|s| s.id.clone()).collect()
    }

    pub fn active_modifier(&self) -> Option<&Modifier> {
        self.sentence().modifiers.get(self.modifier_index)
    }

    pub fn is_cleaned(&self, token_index: usize) -> bool {
        self.cleaned.iter().any(|&mi| {
            self.sentence()
                .modifiers
                .get(mi)
                .is_some_and(|m| m.contains(token_index))
        })
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn enter(&mut self, phase: ArenaPhase) {
        self.phase = phase;
        self.epoch += 1;
    }

    fn schedule(&self, delay_ms: u64, advance: Advance) -> Pending {
        Pending {
            epoch: self.epoch,
            delay_ms,
            advance,
        }
    }

    pub fn apply(&mut self, input: ArenaInput, progress: &mut ProgressState) -> Outcome {
        match input {
            ArenaInput::Token(index) => self.click_token(index, progress),
            ArenaInput::Code(code) => self.select_code(code, progress),
            ArenaInput::Advance => self.advance_sentence(progress),
        }
    }

    /// Apply a previously scheduled transition. Returns None when the timer
    /// is stale (the session already moved past the state that scheduled it).
    pub fn resolve(&mut self, pending: Pending) -> Option<Outcome> {
        if pending.epoch != self.epoch {
            return None;
        }
        match pending.advance {
            Advance::BeginModifierSearch => {
                if self.sentence().modifiers.is_empty() {
                    self.enter(ArenaPhase::FindMainVerb);
                    Some(Outcome::info(MSG_FIND_VERB))
                } else {
                    self.enter(ArenaPhase::SelectModifierSpan);
                    Some(Outcome::info(MSG_SELECT_SPAN))
                }
            }
            Advance::ToResult => {
                self.enter(ArenaPhase::SentenceResult);
                let mut outcome = Outcome::info(MSG_RESULT);
                outcome.speak = true;
                Some(outcome)
            }
        }
    }

    fn click_token(&mut self, index: usize, progress: &mut ProgressState) -> Outcome {
        if index >= self.sentence().tokens.len() {
            return Outcome::noop();
        }
        match self.phase {
            ArenaPhase::SelectHeadNoun => self.pick_noun(index, progress),
            ArenaPhase::SelectModifierSpan => self.pick_span_mark(index, progress),
            ArenaPhase::FindMainVerb => self.pick_verb(index, progress),
            // ImplicitQuestion is timer-driven; ClassifyModifier takes codes;
            // the result and diagnosis views take no token input.
            _ => Outcome::noop(),
        }
    }

    fn pick_noun(&mut self, index: usize, progress: &mut ProgressState) -> Outcome {
        let sentence_id = self.sentence().id.clone();
        if index == self.sentence().head_noun_index {
            progress.record_attempt(&sentence_id, true, MistakeKind::Noun, None);
            self.enter(ArenaPhase::ImplicitQuestion);
            let mut outcome = Outcome::info(MSG_NOUN_OK);
            outcome.pending = Some(self.schedule(QUESTION_DELAY_MS, Advance::BeginModifierSearch));
            outcome
        } else {
            progress.record_attempt(&sentence_id, false, MistakeKind::Noun, None);
            progress.break_combo();
            Outcome::fail(MSG_NOUN_WRONG)
        }
    }

    fn pick_span_mark(&mut self, index: usize, progress: &mut ProgressState) -> Outcome {
        // Retired spans never again accept clicks as selection targets.
        if self.is_cleaned(index) {
            return Outcome::noop();
        }
        let Some(start) = self.selection_start else {
            self.selection_start = Some(index);
            return Outcome::info(MSG_SELECT_SPAN_END);
        };

        let (lo, hi) = (start.min(index), start.max(index));
        self.selection_end = Some(index);

        let modifier = self
            .active_modifier()
            .expect("span phase requires an active modifier");
        let (want_lo, want_hi) = (modifier.start_index, modifier.end_index);
        let code = modifier.type_code;
        let sentence_id = self.sentence().id.clone();

        if (lo, hi) == (want_lo, want_hi) {
            progress.record_attempt(&sentence_id, true, MistakeKind::Range, Some(code));
            self.enter(ArenaPhase::ClassifyModifier);
            Outcome::info(MSG_SELECT_CODE)
        } else {
            progress.record_attempt(&sentence_id, false, MistakeKind::Range, Some(code));
            progress.break_combo();
            self.selection_start = None;
            self.selection_end = None;
            self.mistakes.range += 1;
            self.report_mistake_burst(self.mistakes.range, RANGE_MISTAKE_LIMIT, None, progress);
            Outcome::fail(MSG_RANGE_WRONG)
        }
    }

    fn select_code(&mut self, code: u8, progress: &mut ProgressState) -> Outcome {
        if self.phase != ArenaPhase::ClassifyModifier || catalog::modifier_type(code).is_none() {
            return Outcome::noop();
        }
        let modifier = self
            .active_modifier()
            .expect("classify phase requires an active modifier");
        let correct_code = modifier.type_code;
        let modifier_text = self.sentence().modifier_text(modifier);
        let sentence_id = self.sentence().id.clone();

        if code == correct_code {
            progress.record_attempt(&sentence_id, true, MistakeKind::Code, Some(code));
            self.cleaned.push(self.modifier_index);
            self.selection_start = None;
            self.selection_end = None;
            self.mistakes = MistakeCounters::default();
            if self.modifier_index + 1 < self.sentence().modifiers.len() {
                self.modifier_index += 1;
                self.enter(ArenaPhase::SelectModifierSpan);
                Outcome::info(MSG_NEXT_MODIFIER)
            } else {
                self.enter(ArenaPhase::FindMainVerb);
                Outcome::info(MSG_FIND_VERB)
            }
        } else {
            progress.record_attempt(&sentence_id, false, MistakeKind::Code, Some(correct_code));
            progress.break_combo();
            self.mistakes.code += 1;
            self.report_mistake_burst(self.mistakes.code, CODE_MISTAKE_LIMIT, Some(code), progress);
            let mut outcome = Outcome::fail(MSG_CODE_WRONG);
            outcome.hint = Some(HintRequest {
                modifier_text,
                correct_code,
                wrong_code: code,
            });
            outcome
        }
    }

    fn pick_verb(&mut self, index: usize, progress: &mut ProgressState) -> Outcome {
        let sentence = self.sentence();
        let sentence_id = sentence.id.clone();

        if index == sentence.main_verb_index {
            progress.record_attempt(&sentence_id, true, MistakeKind::Verb, None);
            if self.kind == SessionKind::LandfillReview {
                progress.mark_landfill_success(&sentence_id);
            }
            progress.award_success();
            let mut outcome = Outcome::info(MSG_VERB_OK);
            outcome.pending = Some(self.schedule(RESULT_DELAY_MS, Advance::ToResult));
            return outcome;
        }

        // Distractor check outranks the inside-a-modifier check: traps are a
        // distinct mistake category fed into the diagnosis decision table.
        let outcome = if sentence.is_distractor(index) {
            progress.record_attempt(&sentence_id, false, MistakeKind::Trap, None);
            Outcome::fail(MSG_VERB_TRAP)
        } else {
            progress.record_attempt(&sentence_id, false, MistakeKind::Verb, None);
            if sentence.in_any_modifier(index) {
                Outcome::fail(MSG_VERB_IN_MODIFIER)
            } else if index == sentence.head_noun_index {
                Outcome::fail(MSG_VERB_IS_SUBJECT)
            } else {
                Outcome::fail(MSG_VERB_WRONG)
            }
        };
        progress.break_combo();
        outcome
    }

    fn advance_sentence(&mut self, progress: &mut ProgressState) -> Outcome {
        if self.phase != ArenaPhase::SentenceResult {
            return Outcome::noop();
        }
        if self.index + 1 < self.sentences.len() {
            self.index += 1;
            self.modifier_index = 0;
            self.cleaned.clear();
            self.selection_start = None;
            self.selection_end = None;
            self.mistakes = MistakeCounters::default();
            self.enter(ArenaPhase::SelectHeadNoun);
            Outcome::info(MSG_FIND_NOUN)
        } else {
            let ids = self.session_ids();
            self.diagnosis = Some(diagnosis::diagnose(
                &progress.history,
                &ids,
                self.sentences.len(),
            ));
            self.enter(ArenaPhase::Diagnosis);
            let mut outcome = Outcome::noop();
            outcome.session_over = true;
            outcome
        }
    }

    /// Landfill reporting for per-modifier mistake counters. Crossing the
    /// threshold flushes one enqueue per accumulated mistake in the burst
    /// (a fresh entry then shows the full wrong count); later mistakes in the
    /// same burst enqueue one at a time.
    fn report_mistake_burst(
        &self,
        count: u32,
        threshold: u32,
        wrong_code: Option<u8>,
        progress: &mut ProgressState,
    ) {
        let id = &self.sentence().id;
        if count == threshold {
            for _ in 0..threshold {
                progress.enqueue_landfill(id, wrong_code);
            }
        } else if count > threshold {
            progress.enqueue_landfill(id, wrong_code);
        }
    }
}

const MSG_FIND_NOUN: &str = "주인공 명사를 찾아 터치하세요!";
const MSG_NOUN_OK: &str = "정답! 주인공을 찾았습니다.";
const MSG_NOUN_WRONG: &str = "이 단어는 주인공(명사)이 아닙니다.";
const MSG_SELECT_SPAN: &str = "수식어의 [시작]과 [끝] 단어를 터치하세요.";
const MSG_SELECT_SPAN_END: &str = "이제 끝 단어를 터치하세요.";
const MSG_RANGE_WRONG: &str = "범위가 틀렸습니다.";
const MSG_SELECT_CODE: &str = "우측 패널에서 수식어 코드를 선택하세요.";
const MSG_CODE_WRONG: &str = "틀렸습니다. 힌트를 준비하고 있습니다...";
const MSG_NEXT_MODIFIER: &str = "다음 수식어를 찾아주세요.";
const MSG_FIND_VERB: &str = "마지막 단계: 주어와 짝이 되는 [진짜 동사]를 찾으세요!";
const MSG_VERB_OK: &str = "완벽합니다! 주어-동사 연결 성공.";
const MSG_VERB_TRAP: &str = "함정 카드 발동! 그건 동사가 아니라 '준동사'입니다!";
const MSG_VERB_IN_MODIFIER: &str = "그건 수식어(쓰레기) 안에 있는 동사입니다!";
const MSG_VERB_IS_SUBJECT: &str = "그건 주어입니다. 동사를 찾으세요.";
const MSG_VERB_WRONG: &str = "진짜 동사가 아닙니다.";
const MSG_RESULT: &str = "문장 청소 완료! 구문이 한눈에 보입니다.";

/// First prompt of every fresh sentence, re-exported for the driver.
pub const MSG_SESSION_START: &str = MSG_FIND_NOUN;

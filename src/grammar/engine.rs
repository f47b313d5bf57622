use rand::Rng;
use rand::rngs::SmallRng;

use crate::model::catalog;
use crate::model::lesson::{GrammarLesson, GrammarLevel, Puzzle, Quiz};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LessonPhase {
    Concept,
    Quiz,
    Puzzle,
    Diagnosis,
}

pub const QUIZ_ADVANCE_DELAY_MS: u64 = 2500;
pub const PUZZLE_ADVANCE_DELAY_MS: u64 = 1000;

pub const QUIZ_MASTERY_PERCENT: u32 = 70;
pub const PUZZLE_MASTERY_PERCENT: u32 = 80;

/// Deferred advance after a correct answer, epoch-guarded like the arena's
/// timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LessonPending {
    pub epoch: u64,
    pub delay_ms: u64,
    advance: LessonAdvance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LessonAdvance {
    NextQuiz,
    NextPuzzle,
}

pub struct QuizState {
    pub index: usize,
    pub selected: Option<usize>,
    pub feedback: Option<(bool, String)>,
    pub first_try_correct: u32,
    mistakes_this_question: u32,
    locked: bool,
}

pub struct PuzzleState {
    pub index: usize,
    pub available: Vec<String>,
    pub placed: Vec<String>,
    pub feedback: Option<(bool, String)>,
    pub first_try_correct: u32,
    mistakes_this_puzzle: u32,
    pub solved: bool,
}

pub struct LessonReport {
    pub quiz_score: u32,
    pub puzzle_score: u32,
    pub mastered: bool,
    /// Arena hand-off target when mastered, from the topic bridge.
    pub focus_code: Option<u8>,
}

pub struct GrammarSession {
    pub topic: String,
    pub level: GrammarLevel,
    lesson: GrammarLesson,
    pub phase: LessonPhase,
    pub quiz: QuizState,
    pub puzzle: PuzzleState,
    epoch: u64,
}

#[derive(Default)]
pub struct LessonOutcome {
    pub pending: Option<LessonPending>,
}

const MSG_QUIZ_DEFAULT_HINT: &str = "오답입니다. 다시 생각해보세요.";
const MSG_QUIZ_CORRECT: &str = "정답입니다!";
const MSG_PUZZLE_TRAP: &str = "함정 카드 발동! 문법적으로 어색한 단어(Trap)가 섞여 있습니다.";
const MSG_PUZZLE_WRONG: &str = "순서가 틀렸거나 블록이 부족합니다. 해석을 다시 참고하세요.";
const MSG_PUZZLE_CORRECT: &str = "Perfect! 다음 문장으로 넘어갑니다.";

impl GrammarSession {
    /// `resume_at_puzzle` is the retry entry: same topic, fresh content,
    /// straight back to the drill that failed mastery.
    pub fn new(
        topic: &str,
        level: GrammarLevel,
        lesson: GrammarLesson,
        rng: &mut SmallRng,
        resume_at_puzzle: bool,
    ) -> Option<Self> {
        if lesson.quizzes.is_empty() || lesson.puzzles.is_empty() {
            return None;
        }
        let mut session = Self {
            topic: topic.to_string(),
            level,
            phase: if resume_at_puzzle {
                LessonPhase::Puzzle
            } else {
                LessonPhase::Concept
            },
            quiz: QuizState {
                index: 0,
                selected: None,
                feedback: None,
                first_try_correct: 0,
                mistakes_this_question: 0,
                locked: false,
            },
            puzzle: PuzzleState {
                index: 0,
                available: Vec::new(),
                placed: Vec::new(),
                feedback: None,
                first_try_correct: 0,
                mistakes_this_puzzle: 0,
                solved: false,
            },
            lesson,
            epoch: 0,
        };
        session.prepare_puzzle(rng);
        Some(session)
    }

    pub fn lesson(&self) -> &GrammarLesson {
        &self.lesson
    }

    pub fn current_quiz(&self) -> &Quiz {
        &self.lesson.quizzes[self.quiz.index]
    }

    pub fn current_puzzle(&self) -> &Puzzle {
        &self.lesson.puzzles[self.puzzle.index]
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn bump(&mut self) {
        self.epoch += 1;
    }

    pub fn begin_quiz(&mut self) {
        if self.phase == LessonPhase::Concept {
            self.phase = LessonPhase::Quiz;
            self.bump();
        }
    }

    /// Shuffle the current puzzle's chunks (plus its distractor at advanced
    /// level) into the source tray.
    fn prepare_puzzle(&mut self, rng: &mut SmallRng) {
        let puzzle = &self.lesson.puzzles[self.puzzle.index];
        let mut chunks = puzzle.chunks.clone();
        if self.level == GrammarLevel::Advanced {
            if let Some(distractor) = &puzzle.distractor {
                chunks.push(distractor.clone());
            }
        }
        // Fisher-Yates
        for i in (1..chunks.len()).rev() {
            let j = rng.gen_range(0..=i);
            chunks.swap(i, j);
        }
        self.puzzle.available = chunks;
        self.puzzle.placed.clear();
        self.puzzle.feedback = None;
        self.puzzle.solved = false;
    }

    /// Answer the current quiz question. Only a first-attempt success counts
    /// toward the score; wrong picks surface that option's rationale without
    /// revealing the answer.
    pub fn answer_quiz(&mut self, option_index: usize) -> LessonOutcome {
        if self.phase != LessonPhase::Quiz || self.quiz.locked {
            return LessonOutcome::default();
        }
        let quiz = &self.lesson.quizzes[self.quiz.index];
        let Some(option) = quiz.options.get(option_index) else {
            return LessonOutcome::default();
        };
        self.quiz.selected = Some(option_index);

        if *option == quiz.answer {
            if self.quiz.mistakes_this_question == 0 {
                self.quiz.first_try_correct += 1;
            }
            self.quiz.feedback = Some((
                true,
                format!("{MSG_QUIZ_CORRECT}\n{}", quiz.final_explanation),
            ));
            self.quiz.locked = true;
            LessonOutcome {
                pending: Some(LessonPending {
                    epoch: self.epoch,
                    delay_ms: QUIZ_ADVANCE_DELAY_MS,
                    advance: LessonAdvance::NextQuiz,
                }),
            }
        } else {
            self.quiz.mistakes_this_question += 1;
            let hint = quiz
                .distractor_hints
                .get(option_index)
                .cloned()
                .unwrap_or_else(|| MSG_QUIZ_DEFAULT_HINT.to_string());
            self.quiz.feedback = Some((false, hint));
            LessonOutcome::default()
        }
    }

    pub fn place_block(&mut self, available_index: usize) {
        if self.phase != LessonPhase::Puzzle || self.puzzle.solved {
            return;
        }
        if available_index < self.puzzle.available.len() {
            let block = self.puzzle.available.remove(available_index);
            self.puzzle.placed.push(block);
            self.puzzle.feedback = None;
        }
    }

    pub fn remove_last_block(&mut self) {
        if self.phase != LessonPhase::Puzzle || self.puzzle.solved {
            return;
        }
        if let Some(block) = self.puzzle.placed.pop() {
            self.puzzle.available.push(block);
            self.puzzle.feedback = None;
        }
    }

    pub fn reset_puzzle(&mut self) {
        if self.phase != LessonPhase::Puzzle || self.puzzle.solved {
            return;
        }
        let placed = std::mem::take(&mut self.puzzle.placed);
        self.puzzle.available.extend(placed);
        self.puzzle.feedback = None;
    }

    /// Check the placed sequence. A placed distractor chunk fails the attempt
    /// outright, before any order comparison.
    pub fn check_puzzle(&mut self) -> LessonOutcome {
        if self.phase != LessonPhase::Puzzle || self.puzzle.solved {
            return LessonOutcome::default();
        }
        let puzzle = &self.lesson.puzzles[self.puzzle.index];

        if let Some(distractor) = &puzzle.distractor {
            if self.puzzle.placed.iter().any(|b| b == distractor) {
                self.puzzle.mistakes_this_puzzle += 1;
                self.puzzle.feedback = Some((false, MSG_PUZZLE_TRAP.to_string()));
                return LessonOutcome::default();
            }
        }

        let attempt = normalize(&self.puzzle.placed.join(" "));
        let correct = normalize(&puzzle.correct_order.join(" "));
        if attempt == correct {
            if self.puzzle.mistakes_this_puzzle == 0 {
                self.puzzle.first_try_correct += 1;
            }
            self.puzzle.solved = true;
            self.puzzle.feedback = Some((true, MSG_PUZZLE_CORRECT.to_string()));
            LessonOutcome {
                pending: Some(LessonPending {
                    epoch: self.epoch,
                    delay_ms: PUZZLE_ADVANCE_DELAY_MS,
                    advance: LessonAdvance::NextPuzzle,
                }),
            }
        } else {
            self.puzzle.mistakes_this_puzzle += 1;
            self.puzzle.feedback = Some((false, MSG_PUZZLE_WRONG.to_string()));
            LessonOutcome::default()
        }
    }

    /// Apply a scheduled advance; stale timers are dropped.
    pub fn resolve(&mut self, pending: LessonPending, rng: &mut SmallRng) -> bool {
        if pending.epoch != self.epoch {
            return false;
        }
        match pending.advance {
            LessonAdvance::NextQuiz => {
                if self.quiz.index + 1 < self.lesson.quizzes.len() {
                    self.quiz.index += 1;
                    self.quiz.selected = None;
                    self.quiz.feedback = None;
                    self.quiz.mistakes_this_question = 0;
                    self.quiz.locked = false;
                } else {
                    self.phase = LessonPhase::Puzzle;
                }
                self.bump();
            }
            LessonAdvance::NextPuzzle => {
                if self.puzzle.index + 1 < self.lesson.puzzles.len() {
                    self.puzzle.index += 1;
                    self.puzzle.mistakes_this_puzzle = 0;
                    self.prepare_puzzle(rng);
                } else {
                    self.phase = LessonPhase::Diagnosis;
                }
                self.bump();
            }
        }
        true
    }

    pub fn report(&self) -> LessonReport {
        let quiz_total = self.lesson.quizzes.len() as u32;
        let puzzle_total = self.lesson.puzzles.len() as u32;
        let quiz_score = percent(self.quiz.first_try_correct, quiz_total);
        let puzzle_score = percent(self.puzzle.first_try_correct, puzzle_total);
        let mastered =
            puzzle_score >= PUZZLE_MASTERY_PERCENT && quiz_score >= QUIZ_MASTERY_PERCENT;
        LessonReport {
            quiz_score,
            puzzle_score,
            mastered,
            focus_code: if mastered {
                catalog::code_for_topic(&self.topic)
            } else {
                None
            },
        }
    }
}

fn percent(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::lesson::{Concept, StudyGuide};
    use rand::SeedableRng;

    fn quiz(question: &str, answer: &str) -> Quiz {
        Quiz {
            question: question.to_string(),
            options: ["A", "B", "C", "D", "E"].iter().map(|o| o.to_string()).collect(),
            answer: answer.to_string(),
            distractor_hints: (1..=5).map(|i| format!("힌트 {i}")).collect(),
            final_explanation: "해설".to_string(),
        }
    }

    fn puzzle(id: &str, order: &[&str], distractor: Option<&str>) -> Puzzle {
        Puzzle {
            id: id.to_string(),
            sentence_translation: "해석".to_string(),
            chunks: order.iter().map(|c| c.to_string()).collect(),
            correct_order: order.iter().map(|c| c.to_string()).collect(),
            distractor: distractor.map(|d| d.to_string()),
        }
    }

    fn lesson() -> GrammarLesson {
        GrammarLesson {
            concept: Concept {
                title: "분사".to_string(),
                summary: vec!["요약".to_string()],
                key_distinction: "구분".to_string(),
                exam_tip: "함정".to_string(),
                example: "the man running fast".to_string(),
            },
            quizzes: vec![quiz("q1", "B"), quiz("q2", "A")],
            puzzles: vec![
                puzzle("p1", &["The man", "running fast", "is my coach."], Some("ran")),
                puzzle("p2", &["The letter", "written by Tom", "arrived."], None),
            ],
            study_guide: StudyGuide {
                weakness_analysis: "분석".to_string(),
                review_recommendation: "복습".to_string(),
                next_step: "다음".to_string(),
            },
        }
    }

    fn session(level: GrammarLevel) -> (GrammarSession, SmallRng) {
        let mut rng = SmallRng::seed_from_u64(7);
        let s = GrammarSession::new("participle", level, lesson(), &mut rng, false).unwrap();
        (s, rng)
    }

    fn place_in_order(s: &mut GrammarSession, order: &[&str]) {
        for chunk in order {
            let idx = s
                .puzzle
                .available
                .iter()
                .position(|b| b == chunk)
                .expect("chunk available");
            s.place_block(idx);
        }
    }

    #[test]
    fn lesson_without_puzzles_is_rejected() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut empty = lesson();
        empty.puzzles.clear();
        assert!(
            GrammarSession::new("participle", GrammarLevel::Beginner, empty, &mut rng, false)
                .is_none()
        );
    }

    #[test]
    fn first_attempt_success_scores_retry_does_not() {
        let (mut s, mut rng) = session(GrammarLevel::Beginner);
        s.begin_quiz();

        // Q1: wrong then right — no score.
        let out = s.answer_quiz(0);
        assert!(out.pending.is_none());
        assert_eq!(s.quiz.feedback.as_ref().unwrap().0, false);
        assert_eq!(s.quiz.feedback.as_ref().unwrap().1, "힌트 1");
        let out = s.answer_quiz(1);
        let pending = out.pending.unwrap();
        assert_eq!(s.quiz.first_try_correct, 0);
        assert!(s.resolve(pending, &mut rng));

        // Q2: right away — scores.
        let out = s.answer_quiz(0);
        assert_eq!(s.quiz.first_try_correct, 1);
        assert!(s.resolve(out.pending.unwrap(), &mut rng));
        assert_eq!(s.phase, LessonPhase::Puzzle);
    }

    #[test]
    fn locked_quiz_ignores_further_answers() {
        let (mut s, _rng) = session(GrammarLevel::Beginner);
        s.begin_quiz();
        s.answer_quiz(1);
        let before = s.quiz.first_try_correct;
        let out = s.answer_quiz(1);
        assert!(out.pending.is_none());
        assert_eq!(s.quiz.first_try_correct, before);
    }

    #[test]
    fn beginner_tray_omits_the_distractor() {
        let (mut s, _rng) = session(GrammarLevel::Beginner);
        s.phase = LessonPhase::Puzzle;
        assert_eq!(s.puzzle.available.len(), 3);
        assert!(!s.puzzle.available.iter().any(|b| b == "ran"));
    }

    #[test]
    fn placed_distractor_fails_regardless_of_order() {
        let (mut s, _rng) = session(GrammarLevel::Advanced);
        s.phase = LessonPhase::Puzzle;
        assert_eq!(s.puzzle.available.len(), 4);

        place_in_order(&mut s, &["The man", "running fast", "is my coach.", "ran"]);
        let out = s.check_puzzle();
        assert!(out.pending.is_none());
        let (ok, text) = s.puzzle.feedback.clone().unwrap();
        assert!(!ok);
        assert_eq!(text, MSG_PUZZLE_TRAP);
        assert!(!s.puzzle.solved);
    }

    #[test]
    fn correct_order_solves_and_first_try_scores() {
        let (mut s, mut rng) = session(GrammarLevel::Advanced);
        s.phase = LessonPhase::Puzzle;
        place_in_order(&mut s, &["The man", "running fast", "is my coach."]);
        let out = s.check_puzzle();
        assert!(s.puzzle.solved);
        assert_eq!(s.puzzle.first_try_correct, 1);

        assert!(s.resolve(out.pending.unwrap(), &mut rng));
        assert_eq!(s.puzzle.index, 1);
        assert!(!s.puzzle.solved);
        assert_eq!(s.puzzle.available.len(), 2);
    }

    #[test]
    fn wrong_order_then_correct_does_not_score() {
        let (mut s, mut rng) = session(GrammarLevel::Beginner);
        s.phase = LessonPhase::Puzzle;
        place_in_order(&mut s, &["running fast", "The man", "is my coach."]);
        s.check_puzzle();
        assert!(!s.puzzle.solved);

        s.reset_puzzle();
        assert!(s.puzzle.placed.is_empty());
        assert_eq!(s.puzzle.available.len(), 3);
        place_in_order(&mut s, &["The man", "running fast", "is my coach."]);
        let out = s.check_puzzle();
        assert!(s.puzzle.solved);
        assert_eq!(s.puzzle.first_try_correct, 0);
        s.resolve(out.pending.unwrap(), &mut rng);
    }

    #[test]
    fn stale_pending_is_dropped() {
        let (mut s, mut rng) = session(GrammarLevel::Beginner);
        s.begin_quiz();
        let out = s.answer_quiz(1);
        let pending = out.pending.unwrap();
        assert!(s.resolve(pending, &mut rng));
        assert!(!s.resolve(pending, &mut rng));
    }

    #[test]
    fn mastery_gates_the_arena_handoff() {
        let (mut s, mut rng) = session(GrammarLevel::Beginner);
        s.begin_quiz();
        for answer in [1usize, 0] {
            let out = s.answer_quiz(answer);
            s.resolve(out.pending.unwrap(), &mut rng);
        }
        for order in [
            ["The man", "running fast", "is my coach."].as_slice(),
            ["The letter", "written by Tom", "arrived."].as_slice(),
        ] {
            place_in_order(&mut s, order);
            let out = s.check_puzzle();
            s.resolve(out.pending.unwrap(), &mut rng);
        }
        assert_eq!(s.phase, LessonPhase::Diagnosis);

        let report = s.report();
        assert_eq!(report.quiz_score, 100);
        assert_eq!(report.puzzle_score, 100);
        assert!(report.mastered);
        assert_eq!(report.focus_code, Some(4));
    }

    #[test]
    fn below_threshold_scores_withhold_the_handoff() {
        let (mut s, mut rng) = session(GrammarLevel::Beginner);
        s.begin_quiz();
        // Both questions answered wrong first: quiz score 0.
        for answer in [1usize, 0] {
            s.answer_quiz(4);
            let out = s.answer_quiz(answer);
            s.resolve(out.pending.unwrap(), &mut rng);
        }
        for order in [
            ["The man", "running fast", "is my coach."].as_slice(),
            ["The letter", "written by Tom", "arrived."].as_slice(),
        ] {
            place_in_order(&mut s, order);
            let out = s.check_puzzle();
            s.resolve(out.pending.unwrap(), &mut rng);
        }
        let report = s.report();
        assert_eq!(report.quiz_score, 0);
        assert_eq!(report.puzzle_score, 100);
        assert!(!report.mastered);
        assert_eq!(report.focus_code, None);
    }

    #[test]
    fn retry_entry_starts_at_the_puzzle_phase() {
        let mut rng = SmallRng::seed_from_u64(3);
        let s = GrammarSession::new(
            "participle",
            GrammarLevel::Beginner,
            lesson(),
            &mut rng,
            true,
        )
        .unwrap();
        assert_eq!(s.phase, LessonPhase::Puzzle);
    }
}

//! End-to-end drives of the analysis engine against bundled content: the
//! full happy path, the trap taxonomy, landfill accumulation and eviction,
//! and the diagnosis snapshot at session end.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use sweepr::arena::diagnosis;
use sweepr::arena::session::{ArenaInput, ArenaPhase, ArenaSession, SessionKind};
use sweepr::content::ContentProvider;
use sweepr::content::bundled::BundledProvider;
use sweepr::model::sentence::{Difficulty, Modifier, Sentence};
use sweepr::progress::{MistakeKind, ProgressState};

fn park_sentence() -> Sentence {
    Sentence {
        id: "s1".to_string(),
        tokens: [
            "The", "boy", "running", "in", "the", "park", "is", "my", "brother.",
        ]
        .iter()
        .map(|t| t.to_string())
        .collect(),
        head_noun_index: 1,
        main_verb_index: 6,
        distractor_indices: vec![2],
        modifiers: vec![Modifier {
            id: "m1".to_string(),
            start_index: 2,
            end_index: 5,
            type_code: 4,
        }],
        subject_type: 1,
        translation: "공원에서 달리고 있는 그 소년은 나의 남동생이다.".to_string(),
        difficulty: Difficulty::Beginner,
    }
}

/// Run a sentence to completion on the happy path, resolving each scheduled
/// transition as the driver's tick loop would.
fn sweep_sentence(session: &mut ArenaSession, progress: &mut ProgressState) {
    let sentence = session.sentence().clone();

    let outcome = session.apply(ArenaInput::Token(sentence.head_noun_index), progress);
    session
        .resolve(outcome.pending.expect("question timer"))
        .expect("fresh timer");

    for modifier in &sentence.modifiers {
        session.apply(ArenaInput::Token(modifier.start_index), progress);
        session.apply(ArenaInput::Token(modifier.end_index), progress);
        session.apply(ArenaInput::Code(modifier.type_code), progress);
    }

    let outcome = session.apply(ArenaInput::Token(sentence.main_verb_index), progress);
    session
        .resolve(outcome.pending.expect("result timer"))
        .expect("fresh timer");
    assert_eq!(session.phase, ArenaPhase::SentenceResult);
}

#[test]
fn scenario_from_the_park_sentence() {
    let mut progress = ProgressState::default();
    let mut session = ArenaSession::new(
        vec![park_sentence()],
        SessionKind::Standard(Difficulty::Beginner),
    )
    .unwrap();

    // Noun click enters the timed question, which resolves into span work.
    let outcome = session.apply(ArenaInput::Token(1), &mut progress);
    assert_eq!(session.phase, ArenaPhase::ImplicitQuestion);
    session.resolve(outcome.pending.unwrap()).unwrap();
    assert_eq!(session.phase, ArenaPhase::SelectModifierSpan);

    // Clicks in either order form the candidate range (2, 5).
    session.apply(ArenaInput::Token(3), &mut progress);
    session.apply(ArenaInput::Token(2), &mut progress);
    assert_eq!(session.phase, ArenaPhase::SelectModifierSpan);
    session.apply(ArenaInput::Token(5), &mut progress);
    assert_eq!(session.phase, ArenaPhase::SelectModifierSpan);

    // (3, 2) was wrong, marks cleared; redo the span correctly.
    assert_eq!(session.selection_start, Some(5));
    session.apply(ArenaInput::Token(2), &mut progress);
    assert_eq!(session.phase, ArenaPhase::ClassifyModifier);

    session.apply(ArenaInput::Code(4), &mut progress);
    assert_eq!(session.phase, ArenaPhase::FindMainVerb);

    let prior_combo = progress.combo;
    let outcome = session.apply(ArenaInput::Token(6), &mut progress);
    assert_eq!(progress.exp, 10 + 2 * prior_combo as u64);
    session.resolve(outcome.pending.unwrap()).unwrap();
    assert_eq!(session.phase, ArenaPhase::SentenceResult);

    let outcome = session.apply(ArenaInput::Advance, &mut progress);
    assert!(outcome.session_over);
    assert_eq!(session.phase, ArenaPhase::Diagnosis);
}

#[test]
fn trap_and_verb_mistakes_are_distinct_categories() {
    let mut progress = ProgressState::default();
    let mut session = ArenaSession::new(
        vec![park_sentence()],
        SessionKind::Standard(Difficulty::Beginner),
    )
    .unwrap();

    let outcome = session.apply(ArenaInput::Token(1), &mut progress);
    session.resolve(outcome.pending.unwrap()).unwrap();
    session.apply(ArenaInput::Token(2), &mut progress);
    session.apply(ArenaInput::Token(5), &mut progress);
    session.apply(ArenaInput::Code(4), &mut progress);
    assert_eq!(session.phase, ArenaPhase::FindMainVerb);

    progress.combo = 4;
    // Index 2 sits inside the cleaned span AND on the distractor list: the
    // trap category wins.
    session.apply(ArenaInput::Token(2), &mut progress);
    assert_eq!(
        progress.history.last().unwrap().mistake,
        Some(MistakeKind::Trap)
    );
    assert_eq!(progress.combo, 0);

    // Index 3 is inside the span but not a distractor: plain verb mistake.
    session.apply(ArenaInput::Token(3), &mut progress);
    assert_eq!(
        progress.history.last().unwrap().mistake,
        Some(MistakeKind::Verb)
    );
}

#[test]
fn landfill_fills_on_repeat_mistakes_and_drains_on_review() {
    let mut progress = ProgressState::default();
    let mut session = ArenaSession::new(
        vec![park_sentence()],
        SessionKind::Standard(Difficulty::Beginner),
    )
    .unwrap();

    let outcome = session.apply(ArenaInput::Token(1), &mut progress);
    session.resolve(outcome.pending.unwrap()).unwrap();

    // Three wrong spans put the sentence in the landfill with the full count.
    for _ in 0..3 {
        session.apply(ArenaInput::Token(2), &mut progress);
        session.apply(ArenaInput::Token(4), &mut progress);
    }
    assert_eq!(progress.landfill["s1"].wrong_count, 3);
    assert_eq!(progress.landfill["s1"].consecutive_correct, 0);

    // Two clean review passes evict the entry.
    for pass in 0..2 {
        let mut review =
            ArenaSession::new(vec![park_sentence()], SessionKind::LandfillReview).unwrap();
        sweep_sentence(&mut review, &mut progress);
        if pass == 0 {
            assert_eq!(progress.landfill["s1"].consecutive_correct, 1);
        }
    }
    assert!(!progress.landfill.contains_key("s1"));
}

#[test]
fn full_bundled_session_reaches_a_clean_diagnosis() {
    let mut provider = BundledProvider::with_rng(SmallRng::seed_from_u64(21));
    let sentences = provider
        .session_sentences(Difficulty::Beginner, 3, None)
        .unwrap();
    let count = sentences.len();
    assert!(count >= 2);

    let mut progress = ProgressState::default();
    let mut session =
        ArenaSession::new(sentences, SessionKind::Standard(Difficulty::Beginner)).unwrap();

    for i in 0..count {
        sweep_sentence(&mut session, &mut progress);
        let outcome = session.apply(ArenaInput::Advance, &mut progress);
        assert_eq!(outcome.session_over, i + 1 == count);
    }

    let diagnosis = session.diagnosis.as_ref().unwrap();
    assert_eq!(diagnosis.total_questions, count);
    assert!((diagnosis.accuracy - 100.0).abs() < f64::EPSILON);
    assert_eq!(diagnosis.weakest_modifier_code, None);
    assert_eq!(diagnosis.feedback, diagnosis::FEEDBACK_MASTERY);
    assert_eq!(progress.combo, count as u32);
}

#[test]
fn provider_outputs_always_satisfy_model_invariants() {
    let mut provider = BundledProvider::with_rng(SmallRng::seed_from_u64(5));
    for difficulty in Difficulty::ALL {
        for count in [1, 4, 50] {
            for focus in [None, Some(4), Some(7), Some(17)] {
                let sentences = provider
                    .session_sentences(difficulty, count, focus)
                    .unwrap();
                assert!(sentences.len() <= count);
                for sentence in &sentences {
                    assert_eq!(sentence.validate(), Ok(()), "bad {}", sentence.id);
                    assert_eq!(sentence.difficulty, difficulty);
                }
            }
        }
    }
}

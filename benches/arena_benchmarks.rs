use criterion::{Criterion, black_box, criterion_group, criterion_main};

use sweepr::arena::diagnosis::diagnose;
use sweepr::arena::session::{ArenaInput, ArenaSession, SessionKind};
use sweepr::model::sentence::{Difficulty, Modifier, Sentence};
use sweepr::progress::{MistakeKind, ProgressState};

fn bench_sentence(index: usize) -> Sentence {
    Sentence {
        id: format!("bench-{index}"),
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
            id: format!("bench-{index}-m1"),
            start_index: 2,
            end_index: 5,
            type_code: 4,
        }],
        subject_type: 1,
        translation: "공원에서 달리고 있는 그 소년은 나의 남동생이다.".to_string(),
        difficulty: Difficulty::Beginner,
    }
}

fn bench_full_session(c: &mut Criterion) {
    c.bench_function("arena_full_session_10_sentences", |b| {
        b.iter(|| {
            let sentences: Vec<Sentence> = (0..10).map(bench_sentence).collect();
            let mut progress = ProgressState::default();
            let mut session =
                ArenaSession::new(sentences, SessionKind::Standard(Difficulty::Beginner)).unwrap();
            for _ in 0..10 {
                let outcome = session.apply(ArenaInput::Token(1), &mut progress);
                session.resolve(outcome.pending.unwrap());
                session.apply(ArenaInput::Token(2), &mut progress);
                session.apply(ArenaInput::Token(5), &mut progress);
                session.apply(ArenaInput::Code(4), &mut progress);
                let outcome = session.apply(ArenaInput::Token(6), &mut progress);
                session.resolve(outcome.pending.unwrap());
                session.apply(ArenaInput::Advance, &mut progress);
            }
            black_box(progress.exp)
        })
    });
}

fn bench_diagnose(c: &mut Criterion) {
    let mut progress = ProgressState::default();
    let session_ids: Vec<String> = (0..10).map(|i| format!("bench-{i}")).collect();
    for i in 0..10_000u32 {
        let id = format!("bench-{}", i % 10);
        let correct = i % 3 == 0;
        progress.record_attempt(
            &id,
            correct,
            match i % 5 {
                0 => MistakeKind::Range,
                1 => MistakeKind::Code,
                2 => MistakeKind::Noun,
                3 => MistakeKind::Verb,
                _ => MistakeKind::Trap,
            },
            Some((i % 17 + 1) as u8),
        );
    }

    c.bench_function("diagnose_10k_history", |b| {
        b.iter(|| black_box(diagnose(&progress.history, &session_ids, 10)))
    });
}

criterion_group!(benches, bench_full_session, bench_diagnose);
criterion_main!(benches);

use crate::progress::{AttemptRecord, MistakeKind};

/// End-of-session report. Derived on demand from the attempt history; never
/// stored.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnosis {
    pub total_questions: usize,
    pub accuracy: f64,
    pub weakest_modifier_code: Option<u8>,
    pub feedback: &'static str,
}

pub const FEEDBACK_MASTERY: &str = "완벽합니다! 다음 레벨로 넘어갈 준비가 되었습니다.";
pub const FEEDBACK_TRAP: &str =
    "진짜 동사와 '가짜 동사(준동사)'를 구별하는 연습이 필요합니다. 함정에 주의하세요!";
pub const FEEDBACK_RANGE: &str =
    "수식어의 범위(어디서부터 어디까지인지)를 찾는 연습이 더 필요해 보입니다.";
pub const FEEDBACK_CODE: &str =
    "수식어의 종류(코드 번호)를 헷갈려하고 있습니다. 힌트 기능을 적극 활용해보세요.";

/// Pure function of the history and the session's sentence-id set.
pub fn diagnose(history: &[AttemptRecord], session_ids: &[String], total_questions: usize) -> Diagnosis {
    let session: Vec<&AttemptRecord> = history
        .iter()
        .filter(|r| session_ids.iter().any(|id| *id == r.sentence_id))
        .collect();

    let total_attempts = session.len();
    let corrects = session.iter().filter(|r| r.correct).count();
    let accuracy = if total_attempts > 0 {
        corrects as f64 / total_attempts as f64 * 100.0
    } else {
        0.0
    };

    // Most-missed modifier code. Counts are kept in first-encounter order so
    // ties break deterministically on the earliest-seen code.
    let mut counts: Vec<(u8, u32)> = Vec::new();
    for record in session.iter().filter(|r| !r.correct) {
        if let Some(code) = record.modifier_code {
            match counts.iter_mut().find(|(c, _)| *c == code) {
                Some((_, n)) => *n += 1,
                None => counts.push((code, 1)),
            }
        }
    }
    let weakest_modifier_code = counts
        .iter()
        .fold(None::<(u8, u32)>, |best, &(code, n)| match best {
            Some((_, max)) if n <= max => best,
            _ => Some((code, n)),
        })
        .map(|(code, _)| code);

    Diagnosis {
        total_questions,
        accuracy,
        weakest_modifier_code,
        feedback: pick_feedback(&session),
    }
}

/// Fixed decision table: mastery when flawless, then traps, then span-finding
/// trouble when range misses outnumber code misses, otherwise classification.
fn pick_feedback(session: &[&AttemptRecord]) -> &'static str {
    let mistakes: Vec<MistakeKind> = session
        .iter()
        .filter(|r| !r.correct)
        .filter_map(|r| r.mistake)
        .collect();
    if mistakes.is_empty() {
        return FEEDBACK_MASTERY;
    }
    let count = |kind: MistakeKind| mistakes.iter().filter(|&&m| m == kind).count();
    if count(MistakeKind::Trap) > 0 {
        FEEDBACK_TRAP
    } else if count(MistakeKind::Range) > count(MistakeKind::Code) {
        FEEDBACK_RANGE
    } else {
        FEEDBACK_CODE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(
        sentence_id: &str,
        correct: bool,
        mistake: Option<MistakeKind>,
        code: Option<u8>,
    ) -> AttemptRecord {
        AttemptRecord {
            sentence_id: sentence_id.to_string(),
            correct,
            mistake,
            modifier_code: code,
            timestamp: Utc::now(),
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_history_yields_zero_accuracy_not_nan() {
        let d = diagnose(&[], &ids(&["s1"]), 10);
        assert_eq!(d.accuracy, 0.0);
        assert_eq!(d.weakest_modifier_code, None);
        assert_eq!(d.feedback, FEEDBACK_MASTERY);
        assert_eq!(d.total_questions, 10);
    }

    #[test]
    fn accuracy_counts_only_session_records() {
        let history = vec![
            record("s1", true, None, None),
            record("s1", false, Some(MistakeKind::Code), Some(4)),
            record("other", false, Some(MistakeKind::Trap), None),
        ];
        let d = diagnose(&history, &ids(&["s1"]), 1);
        assert!((d.accuracy - 50.0).abs() < f64::EPSILON);
        // The out-of-session trap must not hijack the feedback table.
        assert_eq!(d.feedback, FEEDBACK_CODE);
    }

    #[test]
    fn weakest_code_is_highest_failure_count() {
        let history = vec![
            record("s1", false, Some(MistakeKind::Code), Some(4)),
            record("s1", false, Some(MistakeKind::Code), Some(7)),
            record("s1", false, Some(MistakeKind::Range), Some(7)),
            record("s1", true, None, Some(4)),
        ];
        let d = diagnose(&history, &ids(&["s1"]), 1);
        assert_eq!(d.weakest_modifier_code, Some(7));
    }

    #[test]
    fn weakest_code_tie_breaks_on_first_encounter() {
        let history = vec![
            record("s1", false, Some(MistakeKind::Code), Some(12)),
            record("s1", false, Some(MistakeKind::Code), Some(4)),
            record("s1", false, Some(MistakeKind::Code), Some(4)),
            record("s1", false, Some(MistakeKind::Range), Some(12)),
        ];
        let d = diagnose(&history, &ids(&["s1"]), 1);
        assert_eq!(d.weakest_modifier_code, Some(12));
    }

    #[test]
    fn successful_records_never_count_toward_weakness() {
        let history = vec![
            record("s1", true, None, Some(4)),
            record("s1", true, None, Some(4)),
            record("s1", false, Some(MistakeKind::Code), Some(7)),
        ];
        let d = diagnose(&history, &ids(&["s1"]), 1);
        assert_eq!(d.weakest_modifier_code, Some(7));
    }

    #[test]
    fn feedback_priority_trap_over_range_over_code() {
        let base = vec![
            record("s1", false, Some(MistakeKind::Range), Some(4)),
            record("s1", false, Some(MistakeKind::Range), Some(4)),
            record("s1", false, Some(MistakeKind::Code), Some(4)),
        ];
        let d = diagnose(&base, &ids(&["s1"]), 1);
        assert_eq!(d.feedback, FEEDBACK_RANGE);

        let mut with_trap = base.clone();
        with_trap.push(record("s1", false, Some(MistakeKind::Trap), None));
        let d = diagnose(&with_trap, &ids(&["s1"]), 1);
        assert_eq!(d.feedback, FEEDBACK_TRAP);

        let balanced = vec![
            record("s1", false, Some(MistakeKind::Range), Some(4)),
            record("s1", false, Some(MistakeKind::Code), Some(4)),
        ];
        let d = diagnose(&balanced, &ids(&["s1"]), 1);
        assert_eq!(d.feedback, FEEDBACK_CODE);

        let noun_only = vec![record("s1", false, Some(MistakeKind::Noun), None)];
        let d = diagnose(&noun_only, &ids(&["s1"]), 1);
        assert_eq!(d.feedback, FEEDBACK_CODE);
    }

    #[test]
    fn diagnosis_is_deterministic() {
        let history = vec![
            record("s1", false, Some(MistakeKind::Code), Some(4)),
            record("s2", true, None, None),
            record("s2", false, Some(MistakeKind::Range), Some(7)),
        ];
        let session_ids = ids(&["s1", "s2"]);
        let a = diagnose(&history, &session_ids, 2);
        let b = diagnose(&history, &session_ids, 2);
        assert_eq!(a, b);
    }
}

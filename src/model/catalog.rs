//! Static reference data: the 17 modifier categories, the 12 subject types,
//! and the bridge between arena codes and grammar-lesson topics. Loaded once
//! into the binary, never mutated.

pub struct ModifierType {
    pub code: u8,
    pub name: &'static str,
    pub full_name: &'static str,
    pub question: &'static str,
    pub hint: &'static str,
    pub example: &'static str,
}

pub const MODIFIER_TYPES: [ModifierType; 17] = [
    ModifierType {
        code: 1,
        name: "전치사구",
        full_name: "Prepositional Phrase",
        question: "어떤?",
        hint: "전치사(in, on, at...)로 시작",
        example: "the book [on the desk]",
    },
    ModifierType {
        code: 2,
        name: "to부정사(형)",
        full_name: "To-infinitive (Adj)",
        question: "어떤?",
        hint: "to + 동사 (명사 수식)",
        example: "the plan [to succeed]",
    },
    ModifierType {
        code: 3,
        name: "to부정사(부)",
        full_name: "To-infinitive (Adv)",
        question: "왜/결과",
        hint: "to + 동사 (동사 수식)",
        example: "came [to see you]",
    },
    ModifierType {
        code: 4,
        name: "현재분사",
        full_name: "Present Participle",
        question: "어떤?",
        hint: "~ing (능동/진행)",
        example: "the man [running fast]",
    },
    ModifierType {
        code: 5,
        name: "과거분사",
        full_name: "Past Participle",
        question: "어떤?",
        hint: "p.p (수동/완료)",
        example: "the letter [written by Tom]",
    },
    ModifierType {
        code: 6,
        name: "형용사구",
        full_name: "Adjective Phrase",
        question: "어떤?",
        hint: "형용사 + 전치사",
        example: "something [useful for you]",
    },
    ModifierType {
        code: 7,
        name: "관계사(주)",
        full_name: "Rel. Pro (Subject)",
        question: "어떤?",
        hint: "who/which/that + V",
        example: "the man [who loves her]",
    },
    ModifierType {
        code: 8,
        name: "관계사(목)",
        full_name: "Rel. Pro (Object)",
        question: "어떤?",
        hint: "명사 + [S + V]",
        example: "the movie [that I watched]",
    },
    ModifierType {
        code: 9,
        name: "관계사(소)",
        full_name: "Rel. Pro (Possessive)",
        question: "어떤?",
        hint: "whose + 명사",
        example: "the man [whose car is red]",
    },
    ModifierType {
        code: 10,
        name: "관계부사",
        full_name: "Relative Adverb",
        question: "어떤?",
        hint: "when/where/why/how",
        example: "the place [where I live]",
    },
    ModifierType {
        code: 11,
        name: "복합관계사",
        full_name: "Compound Relative",
        question: "누구든",
        hint: "whoever, whatever",
        example: "[whatever you want]",
    },
    ModifierType {
        code: 12,
        name: "동격 that",
        full_name: "Appositive That",
        question: "무슨?",
        hint: "추상명사 + that + 완전한 문장",
        example: "the fact [that he lied]",
    },
    ModifierType {
        code: 13,
        name: "동격 명사",
        full_name: "Appositive Noun",
        question: "즉?",
        hint: "명사, 명사",
        example: "Seoul, [the capital]",
    },
    ModifierType {
        code: 14,
        name: "분사구문",
        full_name: "Participial Construction",
        question: "~하면서",
        hint: "콤마(,) 분사구",
        example: "[Walking home], I saw him",
    },
    ModifierType {
        code: 15,
        name: "관계형용사",
        full_name: "Relative Adjective",
        question: "어떤",
        hint: "which + 명사",
        example: "He failed, [which fact]...",
    },
    ModifierType {
        code: 16,
        name: "삽입절",
        full_name: "Parenthetical",
        question: "참고로",
        hint: "S+V가 중간에 삽입",
        example: "who, [I believe], is honest",
    },
    ModifierType {
        code: 17,
        name: "유사관계사",
        full_name: "Quasi-Relative",
        question: "그리고",
        hint: "as, than, but",
        example: "such people [as know him]",
    },
];

pub fn modifier_type(code: u8) -> Option<&'static ModifierType> {
    MODIFIER_TYPES.iter().find(|m| m.code == code)
}

pub struct SubjectType {
    pub id: u8,
    pub name: &'static str,
    pub structure: &'static str,
}

pub const SUBJECT_TYPES: [SubjectType; 12] = [
    SubjectType { id: 1, name: "일반명사(단수)", structure: "Simple Noun (S)" },
    SubjectType { id: 2, name: "일반명사(복수)", structure: "Simple Noun (P)" },
    SubjectType { id: 3, name: "To부정사구", structure: "To + V" },
    SubjectType { id: 4, name: "동명사구", structure: "V-ing" },
    SubjectType { id: 5, name: "That절", structure: "That + S + V" },
    SubjectType { id: 6, name: "What절", structure: "What + (S) + V" },
    SubjectType { id: 7, name: "Whether절", structure: "Whether + S + V" },
    SubjectType { id: 8, name: "의문사절", structure: "Wh- + S + V" },
    SubjectType { id: 9, name: "The + 형용사", structure: "The + Adj (People)" },
    SubjectType { id: 10, name: "The + 형용사(추상)", structure: "The + Adj (Abstract)" },
    SubjectType { id: 11, name: "수량표현", structure: "Part of / Most of..." },
    SubjectType { id: 12, name: "상관접속사", structure: "Either A or B..." },
];

pub fn subject_type(id: u8) -> Option<&'static SubjectType> {
    SUBJECT_TYPES.iter().find(|s| s.id == id)
}

pub struct GrammarTopic {
    pub id: &'static str,
    pub label: &'static str,
    pub label_en: &'static str,
}

pub struct GrammarZone {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub topics: &'static [GrammarTopic],
}

pub const GRAMMAR_ZONES: [GrammarZone; 3] = [
    GrammarZone {
        title: "동사의 변신 (Verbals)",
        subtitle: "동사가 가면을 쓰고 명사/형용사로 변신!",
        topics: &[
            GrammarTopic { id: "to_inf_noun", label: "To부정사 (명사적)", label_en: "To-Inf (Noun)" },
            GrammarTopic { id: "to_inf_adj", label: "To부정사 (형용사/부사)", label_en: "To-Inf (Adj/Adv)" },
            GrammarTopic { id: "gerund", label: "동명사", label_en: "Gerund" },
            GrammarTopic { id: "participle", label: "분사 (현재/과거)", label_en: "Participle" },
        ],
    },
    GrammarZone {
        title: "문장 연결고리 (Connectors)",
        subtitle: "짧은 문장을 길게 이어 붙이는 마법",
        topics: &[
            GrammarTopic { id: "rel_pronoun", label: "관계대명사 (주격/목적격)", label_en: "Rel. Pronoun" },
            GrammarTopic { id: "rel_adverb", label: "관계부사 (Where/When)", label_en: "Rel. Adverb" },
            GrammarTopic { id: "conjunctions", label: "접속사 (If/Because)", label_en: "Conjunctions" },
            GrammarTopic { id: "rel_what", label: "관계대명사 What", label_en: "Rel. What" },
        ],
    },
    GrammarZone {
        title: "문장의 맛 (Voice & Mood)",
        subtitle: "문장의 느낌과 태도를 바꿔보자!",
        topics: &[
            GrammarTopic { id: "passive", label: "수동태", label_en: "Passive Voice" },
            GrammarTopic { id: "subjunctive", label: "가정법 과거", label_en: "Subjunctive Past" },
            GrammarTopic { id: "comparison", label: "비교급과 최상급", label_en: "Comparison" },
            GrammarTopic { id: "auxiliary", label: "조동사", label_en: "Auxiliary Verbs" },
        ],
    },
];

pub fn grammar_topic(id: &str) -> Option<&'static GrammarTopic> {
    GRAMMAR_ZONES
        .iter()
        .flat_map(|z| z.topics.iter())
        .find(|t| t.id == id)
}

// Bridge between arena modifier codes and grammar-lesson topics. Several
// codes share one topic; the reverse map picks the topic's canonical code.
const CODE_TO_TOPIC: [(u8, &str); 9] = [
    (2, "to_inf_adj"),
    (3, "to_inf_adj"),
    (4, "participle"),
    (5, "participle"),
    (7, "rel_pronoun"),
    (8, "rel_pronoun"),
    (9, "rel_pronoun"),
    (10, "rel_adverb"),
    (12, "conjunctions"),
];

const TOPIC_TO_CODE: [(&str, u8); 5] = [
    ("to_inf_adj", 2),
    ("participle", 4),
    ("rel_pronoun", 7),
    ("rel_adverb", 10),
    ("rel_what", 11),
];

pub fn topic_for_code(code: u8) -> Option<&'static str> {
    CODE_TO_TOPIC
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, t)| *t)
}

pub fn code_for_topic(topic: &str) -> Option<u8> {
    TOPIC_TO_CODE
        .iter()
        .find(|(t, _)| *t == topic)
        .map(|(_, c)| *c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_codes_1_through_17() {
        for code in 1..=17u8 {
            assert!(modifier_type(code).is_some(), "missing code {code}");
        }
        assert!(modifier_type(0).is_none());
        assert!(modifier_type(18).is_none());
    }

    #[test]
    fn catalog_codes_are_unique_and_ordered() {
        for (i, m) in MODIFIER_TYPES.iter().enumerate() {
            assert_eq!(m.code as usize, i + 1);
        }
    }

    #[test]
    fn topic_bridge_round_trips_canonical_codes() {
        for (topic, code) in TOPIC_TO_CODE {
            assert_eq!(code_for_topic(topic), Some(code));
            if let Some(back) = topic_for_code(code) {
                assert_eq!(back, topic);
            }
        }
    }

    #[test]
    fn every_bridged_topic_exists_in_a_zone() {
        for (_, topic) in CODE_TO_TOPIC {
            assert!(grammar_topic(topic).is_some(), "unknown topic {topic}");
        }
    }
}

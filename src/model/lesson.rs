use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrammarLevel {
    Beginner,
    Advanced,
}

impl GrammarLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            GrammarLevel::Beginner => "beginner",
            GrammarLevel::Advanced => "advanced",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Concept {
    pub title: String,
    pub summary: Vec<String>,
    pub key_distinction: String,
    pub exam_tip: String,
    pub example: String,
}

/// A 5-option single-answer question. `distractor_hints` carries one
/// rationale per option; `final_explanation` is shown only after success.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quiz {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    pub distractor_hints: Vec<String>,
    pub final_explanation: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Puzzle {
    pub id: String,
    pub sentence_translation: String,
    pub chunks: Vec<String>,
    pub correct_order: Vec<String>,
    #[serde(default)]
    pub distractor: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StudyGuide {
    pub weakness_analysis: String,
    pub review_recommendation: String,
    pub next_step: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GrammarLesson {
    pub concept: Concept,
    pub quizzes: Vec<Quiz>,
    pub puzzles: Vec<Puzzle>,
    pub study_guide: StudyGuide,
}

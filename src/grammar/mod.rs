pub mod engine;

pub use engine::{GrammarSession, LessonPhase};

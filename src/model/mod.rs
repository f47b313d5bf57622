pub mod catalog;
pub mod lesson;
pub mod sentence;

pub use sentence::{Difficulty, Modifier, Sentence};

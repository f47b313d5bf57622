pub mod diagnosis_view;
pub mod keypad;
pub mod lesson_view;
pub mod lobby;
pub mod materials_sheet;
pub mod sentence_view;

//! Lesson, material and subtitle models, re-exported from the
//! `learnhub-models` crate.

pub use learnhub_models::LessonType;
pub use learnhub_models::lessons::*;

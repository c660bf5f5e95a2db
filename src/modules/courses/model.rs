//! Course and module models, re-exported from the `learnhub-models` crate.

pub use learnhub_models::CourseAudience;
pub use learnhub_models::courses::*;

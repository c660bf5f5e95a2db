//! Enrollment and progress models, re-exported from the `learnhub-models`
//! crate.

pub use learnhub_models::enrollments::*;

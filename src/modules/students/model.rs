//! Student data models and DTOs.
//!
//! This module re-exports student models from the `learnhub-models` crate.

pub use learnhub_models::students::*;
pub use learnhub_models::{AdhdType, SchoolYear};

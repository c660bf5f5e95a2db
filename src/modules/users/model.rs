//! User data models and DTOs.
//!
//! This module re-exports user models from the `learnhub-models` crate.

pub use learnhub_models::users::*;
pub use learnhub_models::{Email, Role, RoleFlags};

//! Support ticket models, re-exported from the `learnhub-models` crate.

pub use learnhub_models::TicketStatus;
pub use learnhub_models::support::*;

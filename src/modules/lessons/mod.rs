pub mod model;
pub mod service;

pub use model::*;
pub use service::{LessonService, MaterialService, SubtitleService};

//! Lessons and their attachments (materials and subtitle tracks).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::choices::LessonType;
use crate::ids::{LessonId, MaterialId, ModuleId, SubtitleId};
use learnhub_core::serde::deserialize_nullable;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub id: LessonId,
    pub public_id: Uuid,
    pub module_id: ModuleId,
    pub title: String,
    pub lesson_order: i32,
    pub lesson_type: LessonType,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreateLessonDto {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(range(min = 0))]
    pub lesson_order: i32,
    #[serde(default)]
    pub lesson_type: Option<LessonType>,
    pub content: Option<String>,
    #[validate(url, length(max = 255))]
    pub video_url: Option<String>,
    #[validate(range(min = 0))]
    pub duration_seconds: Option<i32>,
}

#[derive(Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateLessonDto {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(range(min = 0))]
    pub lesson_order: Option<i32>,
    pub lesson_type: Option<LessonType>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub content: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[validate(url, length(max = 255))]
    pub video_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[validate(range(min = 0))]
    pub duration_seconds: Option<Option<i32>>,
}

/// Downloadable file attached to a lesson.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Material {
    pub id: MaterialId,
    pub public_id: Uuid,
    pub lesson_id: LessonId,
    pub title: String,
    pub file_url: String,
    /// Free-form type tag such as `pdf` or `worksheet`
    pub file_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreateMaterialDto {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(url, length(max = 255))]
    pub file_url: String,
    #[validate(length(min = 1, max = 50))]
    pub file_type: String,
}

/// Subtitle track of a lesson; one per language.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Subtitle {
    pub id: SubtitleId,
    pub public_id: Uuid,
    pub lesson_id: LessonId,
    pub language_code: String,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreateSubtitleDto {
    /// e.g. `en`, `pt-BR`
    #[validate(length(min = 2, max = 10))]
    pub language_code: String,
    #[validate(url, length(max = 255))]
    pub file_url: String,
}

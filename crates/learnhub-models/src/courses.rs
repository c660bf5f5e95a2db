//! Courses and their modules.
//!
//! A course owns an ordered list of modules; each module owns an ordered list
//! of lessons (see [`crate::lessons`]). `module_order` is unique per course.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::choices::CourseAudience;
use crate::ids::{CourseId, ModuleId};
use crate::lessons::Lesson;
use learnhub_core::PaginationParams;
use learnhub_core::serde::deserialize_nullable;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub public_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub audience: CourseAudience,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// A course without a publication timestamp is a draft.
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct CourseModule {
    pub id: ModuleId,
    pub public_id: Uuid,
    pub course_id: CourseId,
    pub title: String,
    pub module_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreateCourseDto {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    #[validate(url, length(max = 255))]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub audience: Option<CourseAudience>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Partial update. Publication state is changed through publish/unpublish.
/// `Some(None)` clears a nullable column.
#[derive(Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateCourseDto {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[validate(url, length(max = 255))]
    pub thumbnail_url: Option<Option<String>>,
    pub audience: Option<CourseAudience>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CourseFilterParams {
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
    pub audience: Option<CourseAudience>,
    /// `Some(true)` keeps published courses only, `Some(false)` drafts only.
    pub published: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreateModuleDto {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(range(min = 0))]
    pub module_order: i32,
}

#[derive(Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateModuleDto {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(range(min = 0))]
    pub module_order: Option<i32>,
}

/// A course with its modules and their lessons, each list in display order.
#[derive(Serialize, Debug, Clone)]
pub struct CourseOutline {
    pub course: Course,
    pub modules: Vec<ModuleOutline>,
}

#[derive(Serialize, Debug, Clone)]
pub struct ModuleOutline {
    pub module: CourseModule,
    pub lessons: Vec<Lesson>,
}

impl CourseOutline {
    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }
}

//! Enrollments and per-lesson progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::ids::{CourseId, EnrollmentId, LessonId, LessonProgressId, StudentId};

/// A student's registration in a course. One per (student, course).
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub public_id: Uuid,
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Enrollment {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Completion record of one lesson by one student.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct LessonProgress {
    pub id: LessonProgressId,
    pub public_id: Uuid,
    pub student_id: StudentId,
    pub lesson_id: LessonId,
    pub completed_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseProgress {
    pub completed_lessons: i64,
    pub total_lessons: i64,
}

impl CourseProgress {
    /// Whole-number percentage, 0 for a course without lessons.
    pub fn percent(&self) -> u8 {
        if self.total_lessons <= 0 {
            return 0;
        }
        let pct = self.completed_lessons.clamp(0, self.total_lessons) * 100 / self.total_lessons;
        pct as u8
    }

    pub fn is_finished(&self) -> bool {
        self.total_lessons > 0 && self.completed_lessons >= self.total_lessons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        let p = CourseProgress {
            completed_lessons: 1,
            total_lessons: 3,
        };
        assert_eq!(p.percent(), 33);
        assert!(!p.is_finished());

        let done = CourseProgress {
            completed_lessons: 3,
            total_lessons: 3,
        };
        assert_eq!(done.percent(), 100);
        assert!(done.is_finished());
    }

    #[test]
    fn test_percent_empty_course() {
        let p = CourseProgress {
            completed_lessons: 0,
            total_lessons: 0,
        };
        assert_eq!(p.percent(), 0);
        assert!(!p.is_finished());
    }
}

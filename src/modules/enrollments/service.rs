use learnhub_core::AppError;
use learnhub_db::map_db_error;
use learnhub_models::{CourseId, EnrollmentId, LessonId, StudentId};
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::modules::enrollments::model::{CourseProgress, Enrollment, LessonProgress};

const ENROLLMENT_COLUMNS: &str = "id, public_id, student_id, course_id, enrolled_at, completed_at";

const PROGRESS_COLUMNS: &str = "id, public_id, student_id, lesson_id, completed_at";

pub struct EnrollmentService;

impl EnrollmentService {
    /// Enrolls a student in a course. Enrolling the same pair twice is a
    /// conflict; the existing row is left untouched.
    #[instrument(skip(db))]
    pub async fn enroll(
        db: &PgPool,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Enrollment, AppError> {
        let sql = format!(
            r#"INSERT INTO enrollments (public_id, student_id, course_id)
               VALUES ($1, $2, $3)
               RETURNING {ENROLLMENT_COLUMNS}"#
        );

        let enrollment = sqlx::query_as::<_, Enrollment>(&sql)
            .bind(Uuid::new_v4())
            .bind(student_id)
            .bind(course_id)
            .fetch_one(db)
            .await
            .map_err(map_db_error)?;

        info!(enrollment_id = %enrollment.id, "Student enrolled");
        Ok(enrollment)
    }

    #[instrument(skip(db))]
    pub async fn get_enrollment(db: &PgPool, id: EnrollmentId) -> Result<Enrollment, AppError> {
        let sql = format!("SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = $1");
        sqlx::query_as::<_, Enrollment>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Enrollment {} not found", id)))
    }

    /// Marks the enrollment completed. The timestamp is set once; completing
    /// again is a validation failure.
    #[instrument(skip(db))]
    pub async fn complete_enrollment(
        db: &PgPool,
        id: EnrollmentId,
    ) -> Result<Enrollment, AppError> {
        let sql = format!(
            r#"UPDATE enrollments SET completed_at = NOW()
               WHERE id = $1 AND completed_at IS NULL
               RETURNING {ENROLLMENT_COLUMNS}"#
        );

        let updated = sqlx::query_as::<_, Enrollment>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(map_db_error)?;

        match updated {
            Some(enrollment) => {
                info!(enrollment_id = %id, "Enrollment completed");
                Ok(enrollment)
            }
            None => {
                // Either the row is missing or it was already completed
                let existing = Self::get_enrollment(db, id).await?;
                warn!(enrollment_id = %id, completed_at = ?existing.completed_at, "Enrollment already completed");
                Err(AppError::validation(anyhow::anyhow!(
                    "Enrollment {} is already completed",
                    id
                )))
            }
        }
    }

    /// Enrollments of a student, oldest first.
    #[instrument(skip(db))]
    pub async fn list_for_student(
        db: &PgPool,
        student_id: StudentId,
    ) -> Result<Vec<Enrollment>, AppError> {
        let sql = format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE student_id = $1 ORDER BY enrolled_at, id"
        );
        sqlx::query_as::<_, Enrollment>(&sql)
            .bind(student_id)
            .fetch_all(db)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(db))]
    pub async fn list_for_course(
        db: &PgPool,
        course_id: CourseId,
    ) -> Result<Vec<Enrollment>, AppError> {
        let sql = format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE course_id = $1 ORDER BY enrolled_at, id"
        );
        sqlx::query_as::<_, Enrollment>(&sql)
            .bind(course_id)
            .fetch_all(db)
            .await
            .map_err(map_db_error)
    }

    /// Removes the enrollment. Lesson progress is kept.
    #[instrument(skip(db))]
    pub async fn unenroll(
        db: &PgPool,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM enrollments WHERE student_id = $1 AND course_id = $2")
            .bind(student_id)
            .bind(course_id)
            .execute(db)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!(
                "Student {} is not enrolled in course {}",
                student_id,
                course_id
            )));
        }

        info!(student_id = %student_id, course_id = %course_id, "Student unenrolled");
        Ok(())
    }

    /// Records that the student completed a lesson, stamped now. Recording
    /// the same pair twice is a conflict.
    #[instrument(skip(db))]
    pub async fn record_lesson_completion(
        db: &PgPool,
        student_id: StudentId,
        lesson_id: LessonId,
    ) -> Result<LessonProgress, AppError> {
        let sql = format!(
            r#"INSERT INTO lesson_progress (public_id, student_id, lesson_id)
               VALUES ($1, $2, $3)
               RETURNING {PROGRESS_COLUMNS}"#
        );

        let progress = sqlx::query_as::<_, LessonProgress>(&sql)
            .bind(Uuid::new_v4())
            .bind(student_id)
            .bind(lesson_id)
            .fetch_one(db)
            .await
            .map_err(map_db_error)?;

        info!(student_id = %student_id, lesson_id = %lesson_id, "Lesson completed");
        Ok(progress)
    }

    /// Progress rows of a student, most recent first.
    #[instrument(skip(db))]
    pub async fn list_lesson_progress(
        db: &PgPool,
        student_id: StudentId,
    ) -> Result<Vec<LessonProgress>, AppError> {
        let sql = format!(
            "SELECT {PROGRESS_COLUMNS} FROM lesson_progress WHERE student_id = $1 \
             ORDER BY completed_at DESC, id DESC"
        );
        sqlx::query_as::<_, LessonProgress>(&sql)
            .bind(student_id)
            .fetch_all(db)
            .await
            .map_err(map_db_error)
    }

    /// Lessons the student completed in a course against the course's total.
    #[instrument(skip(db))]
    pub async fn course_progress(
        db: &PgPool,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<CourseProgress, AppError> {
        let progress = sqlx::query_as::<_, CourseProgress>(
            r#"SELECT
                COUNT(lp.id) AS completed_lessons,
                COUNT(l.id) AS total_lessons
               FROM lessons l
               JOIN modules m ON m.id = l.module_id
               LEFT JOIN lesson_progress lp ON lp.lesson_id = l.id AND lp.student_id = $1
               WHERE m.course_id = $2"#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(db)
        .await
        .map_err(map_db_error)?;

        Ok(progress)
    }
}

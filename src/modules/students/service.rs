use learnhub_core::{AppError, Page};
use learnhub_db::{contains_pattern, map_db_error};
use learnhub_models::{StudentId, UserId};
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::modules::students::model::{
    CreateStudentDto, Student, StudentFilterParams, StudentWithUser, UpdateStudentDto,
};

const STUDENT_COLUMNS: &str = "id, public_id, user_id, nickname, birth_date, school_year, \
     adhd_type, created_at, updated_at";

pub struct StudentService;

impl StudentService {
    /// Creates a student profile owned by `user_id`.
    #[instrument(skip(db, dto))]
    pub async fn create_student(
        db: &PgPool,
        user_id: UserId,
        dto: CreateStudentDto,
    ) -> Result<Student, AppError> {
        dto.validate().map_err(AppError::invalid)?;

        let sql = format!(
            r#"INSERT INTO students (public_id, user_id, nickname, birth_date, school_year, adhd_type)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {STUDENT_COLUMNS}"#
        );

        let student = sqlx::query_as::<_, Student>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(dto.nickname.trim())
            .bind(dto.birth_date)
            .bind(dto.school_year)
            .bind(dto.adhd_type.unwrap_or_default())
            .fetch_one(db)
            .await
            .map_err(map_db_error)?;

        info!(student_id = %student.id, user_id = %user_id, "Student created");
        Ok(student)
    }

    #[instrument(skip(db))]
    pub async fn get_student(db: &PgPool, id: StudentId) -> Result<Student, AppError> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1");
        sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student {} not found", id)))
    }

    #[instrument(skip(db))]
    pub async fn get_student_by_public_id(
        db: &PgPool,
        public_id: Uuid,
    ) -> Result<Student, AppError> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE public_id = $1");
        sqlx::query_as::<_, Student>(&sql)
            .bind(public_id)
            .fetch_optional(db)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student {} not found", public_id)))
    }

    /// Students of one account, by nickname.
    #[instrument(skip(db))]
    pub async fn list_for_user(db: &PgPool, user_id: UserId) -> Result<Vec<Student>, AppError> {
        let sql = format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE user_id = $1 ORDER BY nickname, id"
        );
        sqlx::query_as::<_, Student>(&sql)
            .bind(user_id)
            .fetch_all(db)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(db))]
    pub async fn list_students(
        db: &PgPool,
        filters: StudentFilterParams,
    ) -> Result<Page<StudentWithUser>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        // $1 is always the optional owner; text params start at $2
        let mut where_clause = String::from(" WHERE ($1::BIGINT IS NULL OR s.user_id = $1)");
        let user_id = filters.user_id;
        let mut texts: Vec<String> = Vec::new();

        if let Some(year) = filters.school_year {
            texts.push(year.as_str().to_string());
            where_clause.push_str(&format!(" AND s.school_year = ${}", texts.len() + 1));
        }
        if let Some(search) = filters.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            texts.push(contains_pattern(search));
            let n = texts.len() + 1;
            where_clause.push_str(&format!(" AND (s.nickname ILIKE ${n} OR u.email ILIKE ${n})"));
        }

        let count_query = format!(
            "SELECT COUNT(*) FROM students s JOIN users u ON u.id = s.user_id{}",
            where_clause
        );
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query).bind(user_id);
        for text in &texts {
            count_sql = count_sql.bind(text);
        }
        let total = count_sql.fetch_one(db).await.map_err(map_db_error)?;

        let data_query = format!(
            r#"SELECT s.id, s.public_id, s.user_id, s.nickname, s.birth_date, s.school_year,
                      s.adhd_type, s.created_at, s.updated_at, u.email AS user_email
               FROM students s
               JOIN users u ON u.id = s.user_id{}
               ORDER BY s.nickname, s.id
               LIMIT {} OFFSET {}"#,
            where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, StudentWithUser>(&data_query).bind(user_id);
        for text in texts {
            data_sql = data_sql.bind(text);
        }
        let students = data_sql.fetch_all(db).await.map_err(map_db_error)?;

        Ok(Page::new(students, &filters.pagination, total))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_student(
        db: &PgPool,
        id: StudentId,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        dto.validate().map_err(AppError::invalid)?;

        let existing = Self::get_student(db, id).await?;

        let nickname = dto
            .nickname
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.nickname);
        let birth_date = dto.birth_date.unwrap_or(existing.birth_date);
        let school_year = dto.school_year.unwrap_or(existing.school_year);
        let adhd_type = dto.adhd_type.unwrap_or(existing.adhd_type);

        let sql = format!(
            r#"UPDATE students
               SET nickname = $1, birth_date = $2, school_year = $3, adhd_type = $4, updated_at = NOW()
               WHERE id = $5
               RETURNING {STUDENT_COLUMNS}"#
        );

        let student = sqlx::query_as::<_, Student>(&sql)
            .bind(nickname)
            .bind(birth_date)
            .bind(school_year)
            .bind(adhd_type)
            .bind(id)
            .fetch_one(db)
            .await
            .map_err(map_db_error)?;

        info!(student_id = %id, "Student updated");
        Ok(student)
    }

    /// Deletes the student together with its enrollments and progress.
    #[instrument(skip(db))]
    pub async fn delete_student(db: &PgPool, id: StudentId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Student {} not found", id)));
        }

        info!(student_id = %id, "Student deleted");
        Ok(())
    }
}

use std::collections::HashMap;

use learnhub_core::{AppError, Page};
use learnhub_db::{contains_pattern, map_db_error};
use learnhub_models::{CourseId, Lesson, ModuleId};
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::modules::courses::model::{
    Course, CourseFilterParams, CourseModule, CourseOutline, CreateCourseDto, CreateModuleDto,
    ModuleOutline, UpdateCourseDto, UpdateModuleDto,
};
use crate::modules::lessons::service::LESSON_COLUMNS;

const COURSE_COLUMNS: &str = "id, public_id, title, description, thumbnail_url, audience, \
     published_at, created_at, updated_at";

const MODULE_COLUMNS: &str =
    "id, public_id, course_id, title, module_order, created_at, updated_at";

pub struct CourseService;

impl CourseService {
    #[instrument(skip(db, dto), fields(title = %dto.title))]
    pub async fn create_course(db: &PgPool, dto: CreateCourseDto) -> Result<Course, AppError> {
        dto.validate().map_err(AppError::invalid)?;

        let sql = format!(
            r#"INSERT INTO courses (public_id, title, description, thumbnail_url, audience, published_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {COURSE_COLUMNS}"#
        );

        let course = sqlx::query_as::<_, Course>(&sql)
            .bind(Uuid::new_v4())
            .bind(dto.title.trim())
            .bind(&dto.description)
            .bind(&dto.thumbnail_url)
            .bind(dto.audience.unwrap_or_default())
            .bind(dto.published_at)
            .fetch_one(db)
            .await
            .map_err(map_db_error)?;

        info!(course_id = %course.id, "Course created");
        Ok(course)
    }

    #[instrument(skip(db))]
    pub async fn get_course(db: &PgPool, id: CourseId) -> Result<Course, AppError> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Course {} not found", id)))
    }

    #[instrument(skip(db))]
    pub async fn get_course_by_public_id(db: &PgPool, public_id: Uuid) -> Result<Course, AppError> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE public_id = $1");
        sqlx::query_as::<_, Course>(&sql)
            .bind(public_id)
            .fetch_optional(db)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Course {} not found", public_id)))
    }

    /// Lists courses, newest first.
    #[instrument(skip(db))]
    pub async fn list_courses(
        db: &PgPool,
        filters: CourseFilterParams,
    ) -> Result<Page<Course>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(search) = filters.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(contains_pattern(search));
            let n = params.len();
            where_clause.push_str(&format!(" AND (title ILIKE ${n} OR description ILIKE ${n})"));
        }
        if let Some(audience) = filters.audience {
            params.push(audience.as_str().to_string());
            where_clause.push_str(&format!(" AND audience = ${}", params.len()));
        }
        match filters.published {
            Some(true) => where_clause.push_str(" AND published_at IS NOT NULL"),
            Some(false) => where_clause.push_str(" AND published_at IS NULL"),
            None => {}
        }

        let count_query = format!("SELECT COUNT(*) FROM courses{}", where_clause);
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await.map_err(map_db_error)?;

        let data_query = format!(
            "SELECT {COURSE_COLUMNS} FROM courses{} ORDER BY created_at DESC, id DESC LIMIT {} OFFSET {}",
            where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, Course>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let courses = data_sql.fetch_all(db).await.map_err(map_db_error)?;

        Ok(Page::new(courses, &filters.pagination, total))
    }

    /// Published courses, most recently published first.
    #[instrument(skip(db))]
    pub async fn list_published(db: &PgPool) -> Result<Vec<Course>, AppError> {
        let sql = format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE published_at IS NOT NULL \
             ORDER BY published_at DESC, id DESC"
        );
        sqlx::query_as::<_, Course>(&sql)
            .fetch_all(db)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_course(
        db: &PgPool,
        id: CourseId,
        dto: UpdateCourseDto,
    ) -> Result<Course, AppError> {
        dto.validate().map_err(AppError::invalid)?;

        let existing = Self::get_course(db, id).await?;

        let title = dto
            .title
            .map(|t| t.trim().to_string())
            .unwrap_or(existing.title);
        let description = dto.description.unwrap_or(existing.description);
        let thumbnail_url = dto.thumbnail_url.unwrap_or(existing.thumbnail_url);
        let audience = dto.audience.unwrap_or(existing.audience);

        let sql = format!(
            r#"UPDATE courses
               SET title = $1, description = $2, thumbnail_url = $3, audience = $4, updated_at = NOW()
               WHERE id = $5
               RETURNING {COURSE_COLUMNS}"#
        );

        let course = sqlx::query_as::<_, Course>(&sql)
            .bind(title)
            .bind(description)
            .bind(thumbnail_url)
            .bind(audience)
            .bind(id)
            .fetch_one(db)
            .await
            .map_err(map_db_error)?;

        info!(course_id = %id, "Course updated");
        Ok(course)
    }

    /// Stamps `published_at` with the current time. Republishing moves the
    /// stamp forward.
    #[instrument(skip(db))]
    pub async fn publish(db: &PgPool, id: CourseId) -> Result<Course, AppError> {
        let sql = format!(
            "UPDATE courses SET published_at = NOW(), updated_at = NOW() WHERE id = $1 \
             RETURNING {COURSE_COLUMNS}"
        );
        let course = sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Course {} not found", id)))?;

        info!(course_id = %id, "Course published");
        Ok(course)
    }

    /// Returns the course to draft.
    #[instrument(skip(db))]
    pub async fn unpublish(db: &PgPool, id: CourseId) -> Result<Course, AppError> {
        let sql = format!(
            "UPDATE courses SET published_at = NULL, updated_at = NOW() WHERE id = $1 \
             RETURNING {COURSE_COLUMNS}"
        );
        let course = sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Course {} not found", id)))?;

        info!(course_id = %id, "Course unpublished");
        Ok(course)
    }

    /// Deletes the course and everything under it, enrollments included.
    #[instrument(skip(db))]
    pub async fn delete_course(db: &PgPool, id: CourseId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Course {} not found", id)));
        }

        info!(course_id = %id, "Course deleted");
        Ok(())
    }

    /// The course with its modules by `module_order`, each with its lessons
    /// by `lesson_order`.
    #[instrument(skip(db))]
    pub async fn outline(db: &PgPool, id: CourseId) -> Result<CourseOutline, AppError> {
        let course = Self::get_course(db, id).await?;
        let modules = ModuleService::list_for_course(db, id).await?;

        let module_ids: Vec<ModuleId> = modules.iter().map(|m| m.id).collect();
        let sql = format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE module_id = ANY($1) \
             ORDER BY module_id, lesson_order"
        );
        let lessons = sqlx::query_as::<_, Lesson>(&sql)
            .bind(module_ids)
            .fetch_all(db)
            .await
            .map_err(map_db_error)?;

        let mut by_module: HashMap<ModuleId, Vec<Lesson>> = HashMap::new();
        for lesson in lessons {
            by_module.entry(lesson.module_id).or_default().push(lesson);
        }

        let modules = modules
            .into_iter()
            .map(|module| {
                let lessons = by_module.remove(&module.id).unwrap_or_default();
                ModuleOutline { module, lessons }
            })
            .collect();

        Ok(CourseOutline { course, modules })
    }
}

pub struct ModuleService;

impl ModuleService {
    /// Adds a module to `course_id`. `module_order` must be free within the
    /// course.
    #[instrument(skip(db, dto))]
    pub async fn create_module(
        db: &PgPool,
        course_id: CourseId,
        dto: CreateModuleDto,
    ) -> Result<CourseModule, AppError> {
        dto.validate().map_err(AppError::invalid)?;

        let sql = format!(
            r#"INSERT INTO modules (public_id, course_id, title, module_order)
               VALUES ($1, $2, $3, $4)
               RETURNING {MODULE_COLUMNS}"#
        );

        let module = sqlx::query_as::<_, CourseModule>(&sql)
            .bind(Uuid::new_v4())
            .bind(course_id)
            .bind(dto.title.trim())
            .bind(dto.module_order)
            .fetch_one(db)
            .await
            .map_err(map_db_error)?;

        info!(module_id = %module.id, course_id = %course_id, "Module created");
        Ok(module)
    }

    #[instrument(skip(db))]
    pub async fn get_module(db: &PgPool, id: ModuleId) -> Result<CourseModule, AppError> {
        let sql = format!("SELECT {MODULE_COLUMNS} FROM modules WHERE id = $1");
        sqlx::query_as::<_, CourseModule>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Module {} not found", id)))
    }

    #[instrument(skip(db))]
    pub async fn list_for_course(
        db: &PgPool,
        course_id: CourseId,
    ) -> Result<Vec<CourseModule>, AppError> {
        let sql = format!(
            "SELECT {MODULE_COLUMNS} FROM modules WHERE course_id = $1 ORDER BY module_order"
        );
        sqlx::query_as::<_, CourseModule>(&sql)
            .bind(course_id)
            .fetch_all(db)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_module(
        db: &PgPool,
        id: ModuleId,
        dto: UpdateModuleDto,
    ) -> Result<CourseModule, AppError> {
        dto.validate().map_err(AppError::invalid)?;

        let existing = Self::get_module(db, id).await?;
        let title = dto
            .title
            .map(|t| t.trim().to_string())
            .unwrap_or(existing.title);
        let module_order = dto.module_order.unwrap_or(existing.module_order);

        let sql = format!(
            r#"UPDATE modules SET title = $1, module_order = $2, updated_at = NOW()
               WHERE id = $3
               RETURNING {MODULE_COLUMNS}"#
        );

        let module = sqlx::query_as::<_, CourseModule>(&sql)
            .bind(title)
            .bind(module_order)
            .bind(id)
            .fetch_one(db)
            .await
            .map_err(map_db_error)?;

        info!(module_id = %id, "Module updated");
        Ok(module)
    }

    #[instrument(skip(db))]
    pub async fn delete_module(db: &PgPool, id: ModuleId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Module {} not found", id)));
        }

        info!(module_id = %id, "Module deleted");
        Ok(())
    }
}

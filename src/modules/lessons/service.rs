use learnhub_core::AppError;
use learnhub_db::map_db_error;
use learnhub_models::{LessonId, MaterialId, ModuleId, SubtitleId};
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::modules::lessons::model::{
    CreateLessonDto, CreateMaterialDto, CreateSubtitleDto, Lesson, Material, Subtitle,
    UpdateLessonDto,
};

pub(crate) const LESSON_COLUMNS: &str = "id, public_id, module_id, title, lesson_order, \
     lesson_type, content, video_url, duration_seconds, created_at, updated_at";

const MATERIAL_COLUMNS: &str =
    "id, public_id, lesson_id, title, file_url, file_type, created_at, updated_at";

const SUBTITLE_COLUMNS: &str =
    "id, public_id, lesson_id, language_code, file_url, created_at, updated_at";

pub struct LessonService;

impl LessonService {
    /// Adds a lesson to `module_id`. `lesson_order` must be free within the
    /// module.
    #[instrument(skip(db, dto))]
    pub async fn create_lesson(
        db: &PgPool,
        module_id: ModuleId,
        dto: CreateLessonDto,
    ) -> Result<Lesson, AppError> {
        dto.validate().map_err(AppError::invalid)?;

        let sql = format!(
            r#"INSERT INTO lessons
                (public_id, module_id, title, lesson_order, lesson_type, content, video_url, duration_seconds)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {LESSON_COLUMNS}"#
        );

        let lesson = sqlx::query_as::<_, Lesson>(&sql)
            .bind(Uuid::new_v4())
            .bind(module_id)
            .bind(dto.title.trim())
            .bind(dto.lesson_order)
            .bind(dto.lesson_type.unwrap_or_default())
            .bind(&dto.content)
            .bind(&dto.video_url)
            .bind(dto.duration_seconds)
            .fetch_one(db)
            .await
            .map_err(map_db_error)?;

        info!(lesson_id = %lesson.id, module_id = %module_id, "Lesson created");
        Ok(lesson)
    }

    #[instrument(skip(db))]
    pub async fn get_lesson(db: &PgPool, id: LessonId) -> Result<Lesson, AppError> {
        let sql = format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = $1");
        sqlx::query_as::<_, Lesson>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Lesson {} not found", id)))
    }

    #[instrument(skip(db))]
    pub async fn list_for_module(db: &PgPool, module_id: ModuleId) -> Result<Vec<Lesson>, AppError> {
        let sql = format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE module_id = $1 ORDER BY lesson_order"
        );
        sqlx::query_as::<_, Lesson>(&sql)
            .bind(module_id)
            .fetch_all(db)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_lesson(
        db: &PgPool,
        id: LessonId,
        dto: UpdateLessonDto,
    ) -> Result<Lesson, AppError> {
        dto.validate().map_err(AppError::invalid)?;

        let existing = Self::get_lesson(db, id).await?;
        let title = dto
            .title
            .map(|t| t.trim().to_string())
            .unwrap_or(existing.title);
        let lesson_order = dto.lesson_order.unwrap_or(existing.lesson_order);
        let lesson_type = dto.lesson_type.unwrap_or(existing.lesson_type);
        let content = dto.content.unwrap_or(existing.content);
        let video_url = dto.video_url.unwrap_or(existing.video_url);
        let duration_seconds = dto.duration_seconds.unwrap_or(existing.duration_seconds);

        let sql = format!(
            r#"UPDATE lessons
               SET title = $1, lesson_order = $2, lesson_type = $3, content = $4,
                   video_url = $5, duration_seconds = $6, updated_at = NOW()
               WHERE id = $7
               RETURNING {LESSON_COLUMNS}"#
        );

        let lesson = sqlx::query_as::<_, Lesson>(&sql)
            .bind(title)
            .bind(lesson_order)
            .bind(lesson_type)
            .bind(content)
            .bind(video_url)
            .bind(duration_seconds)
            .bind(id)
            .fetch_one(db)
            .await
            .map_err(map_db_error)?;

        info!(lesson_id = %id, "Lesson updated");
        Ok(lesson)
    }

    #[instrument(skip(db))]
    pub async fn delete_lesson(db: &PgPool, id: LessonId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Lesson {} not found", id)));
        }

        info!(lesson_id = %id, "Lesson deleted");
        Ok(())
    }
}

pub struct MaterialService;

impl MaterialService {
    #[instrument(skip(db, dto))]
    pub async fn add_material(
        db: &PgPool,
        lesson_id: LessonId,
        dto: CreateMaterialDto,
    ) -> Result<Material, AppError> {
        dto.validate().map_err(AppError::invalid)?;

        let sql = format!(
            r#"INSERT INTO materials (public_id, lesson_id, title, file_url, file_type)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {MATERIAL_COLUMNS}"#
        );

        let material = sqlx::query_as::<_, Material>(&sql)
            .bind(Uuid::new_v4())
            .bind(lesson_id)
            .bind(dto.title.trim())
            .bind(&dto.file_url)
            .bind(dto.file_type.trim())
            .fetch_one(db)
            .await
            .map_err(map_db_error)?;

        info!(material_id = %material.id, lesson_id = %lesson_id, "Material added");
        Ok(material)
    }

    /// Materials of a lesson, oldest first.
    #[instrument(skip(db))]
    pub async fn list_for_lesson(db: &PgPool, lesson_id: LessonId) -> Result<Vec<Material>, AppError> {
        let sql = format!(
            "SELECT {MATERIAL_COLUMNS} FROM materials WHERE lesson_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Material>(&sql)
            .bind(lesson_id)
            .fetch_all(db)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(db))]
    pub async fn delete_material(db: &PgPool, id: MaterialId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM materials WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Material {} not found", id)));
        }

        info!(material_id = %id, "Material deleted");
        Ok(())
    }
}

pub struct SubtitleService;

impl SubtitleService {
    /// Adds a subtitle track. A lesson holds at most one per language.
    #[instrument(skip(db, dto), fields(language = %dto.language_code))]
    pub async fn add_subtitle(
        db: &PgPool,
        lesson_id: LessonId,
        dto: CreateSubtitleDto,
    ) -> Result<Subtitle, AppError> {
        dto.validate().map_err(AppError::invalid)?;

        let sql = format!(
            r#"INSERT INTO subtitles (public_id, lesson_id, language_code, file_url)
               VALUES ($1, $2, $3, $4)
               RETURNING {SUBTITLE_COLUMNS}"#
        );

        let subtitle = sqlx::query_as::<_, Subtitle>(&sql)
            .bind(Uuid::new_v4())
            .bind(lesson_id)
            .bind(dto.language_code.trim())
            .bind(&dto.file_url)
            .fetch_one(db)
            .await
            .map_err(map_db_error)?;

        info!(subtitle_id = %subtitle.id, lesson_id = %lesson_id, "Subtitle added");
        Ok(subtitle)
    }

    #[instrument(skip(db))]
    pub async fn list_for_lesson(db: &PgPool, lesson_id: LessonId) -> Result<Vec<Subtitle>, AppError> {
        let sql = format!(
            "SELECT {SUBTITLE_COLUMNS} FROM subtitles WHERE lesson_id = $1 ORDER BY language_code"
        );
        sqlx::query_as::<_, Subtitle>(&sql)
            .bind(lesson_id)
            .fetch_all(db)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(db))]
    pub async fn delete_subtitle(db: &PgPool, id: SubtitleId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM subtitles WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Subtitle {} not found", id)));
        }

        info!(subtitle_id = %id, "Subtitle deleted");
        Ok(())
    }
}

pub mod seeder;

use learnhub_core::AppError;
use serde::Serialize;
use sqlx::PgPool;

use crate::modules::users::model::{CreateSuperuserDto, User};
use crate::modules::users::service::UserService;

/// Creates a superuser from the operator's answers.
pub async fn create_superuser(
    db: &PgPool,
    email: &str,
    full_name: &str,
    password: &str,
) -> Result<User, AppError> {
    UserService::create_superuser(
        db,
        CreateSuperuserDto {
            email: email.to_string(),
            full_name: full_name.to_string(),
            password: password.to_string(),
            is_staff: None,
            is_superuser: None,
            agreed_to_terms: None,
        },
    )
    .await
}

/// Parses a `field=value` change-list filter argument.
pub fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got '{}'", raw)),
    }
}

pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to serialize output: {}", e)))
}

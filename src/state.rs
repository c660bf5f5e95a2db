use learnhub_config::AppConfig;
use learnhub_core::AppError;
use learnhub_db::init_db_pool;
use sqlx::PgPool;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub config: AppConfig,
}

pub async fn init_app_state(config: AppConfig) -> Result<AppState, AppError> {
    Ok(AppState {
        db: init_db_pool(&config.database).await?,
        config,
    })
}

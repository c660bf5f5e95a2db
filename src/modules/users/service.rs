use learnhub_core::{AppError, Page, hash_password, verify_password};
use learnhub_db::{contains_pattern, map_db_error};
use sqlx::{PgExecutor, PgPool};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::modules::users::model::{
    CreateSuperuserDto, CreateUserDto, Email, Role, RoleFlags, SetPasswordDto, UpdateUserDto,
    User, UserCredentials, UserFilterParams,
};
use learnhub_models::UserId;

pub(crate) const USER_COLUMNS: &str = "id, public_id, email, full_name, role, is_staff, \
     is_superuser, is_active, agreed_to_terms, created_at, updated_at";

/// Fully resolved account row, ready to be written.
///
/// `flags` is written as given. Callers derive it from `role`; the table
/// rejects any mismatch.
#[derive(Debug, Clone)]
pub(crate) struct AccountRecord {
    pub email: Email,
    pub full_name: String,
    pub role: Role,
    pub flags: RoleFlags,
    pub is_active: bool,
    pub agreed_to_terms: bool,
}

pub(crate) fn parse_email(raw: &str) -> Result<Email, AppError> {
    Email::parse(raw).map_err(AppError::validation)
}

pub struct UserService;

impl UserService {
    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
        dto.validate().map_err(AppError::invalid)?;

        let role = dto.role.unwrap_or_default();
        let record = AccountRecord {
            email: parse_email(&dto.email)?,
            full_name: dto.full_name.trim().to_string(),
            role,
            flags: role.flags(),
            is_active: dto.is_active.unwrap_or(true),
            agreed_to_terms: dto.agreed_to_terms.unwrap_or(false),
        };

        let password_hash = hash_password(&dto.password)?;
        Self::insert_account(db, &record, &password_hash).await
    }

    /// Creates a superuser. Both permission flags are always set; passing
    /// either one explicitly as `false` is refused before anything is written.
    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn create_superuser(db: &PgPool, dto: CreateSuperuserDto) -> Result<User, AppError> {
        if dto.is_staff == Some(false) {
            warn!("Refused superuser creation with is_staff=false");
            return Err(AppError::validation(anyhow::anyhow!(
                "Superuser must have is_staff=true"
            )));
        }
        if dto.is_superuser == Some(false) {
            warn!("Refused superuser creation with is_superuser=false");
            return Err(AppError::validation(anyhow::anyhow!(
                "Superuser must have is_superuser=true"
            )));
        }
        dto.validate().map_err(AppError::invalid)?;

        let record = AccountRecord {
            email: parse_email(&dto.email)?,
            full_name: dto.full_name.trim().to_string(),
            role: Role::Superuser,
            flags: Role::Superuser.flags(),
            is_active: true,
            agreed_to_terms: dto.agreed_to_terms.unwrap_or(true),
        };

        let password_hash = hash_password(&dto.password)?;
        Self::insert_account(db, &record, &password_hash).await
    }

    pub(crate) async fn insert_account(
        db: &PgPool,
        record: &AccountRecord,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let sql = format!(
            r#"INSERT INTO users
                (public_id, email, full_name, role, password, is_staff, is_superuser, is_active, agreed_to_terms)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING {USER_COLUMNS}"#
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(record.email.as_str())
            .bind(&record.full_name)
            .bind(record.role)
            .bind(password_hash)
            .bind(record.flags.is_staff)
            .bind(record.flags.is_superuser)
            .bind(record.is_active)
            .bind(record.agreed_to_terms)
            .fetch_one(db)
            .await
            .map_err(map_db_error)?;

        info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Writes every column of `record` over the row `id`.
    ///
    /// With a `scope`, only a row currently holding that role is written;
    /// any other row is reported as not found.
    pub(crate) async fn store_account<'e, E>(
        db: E,
        id: UserId,
        scope: Option<Role>,
        record: &AccountRecord,
    ) -> Result<User, AppError>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            r#"UPDATE users
               SET email = $1, full_name = $2, role = $3, is_staff = $4, is_superuser = $5,
                   is_active = $6, agreed_to_terms = $7, updated_at = NOW()
               WHERE id = $8 AND ($9::TEXT IS NULL OR role = $9)
               RETURNING {USER_COLUMNS}"#
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(record.email.as_str())
            .bind(&record.full_name)
            .bind(record.role)
            .bind(record.flags.is_staff)
            .bind(record.flags.is_superuser)
            .bind(record.is_active)
            .bind(record.agreed_to_terms)
            .bind(id)
            .bind(scope.map(|role| role.as_str()))
            .fetch_optional(db)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User {} not found", id)))?;

        info!(user_id = %user.id, role = %user.role, "User updated");
        Ok(user)
    }

    /// Replaces the stored password hash of `id`.
    pub(crate) async fn store_password<'e, E>(
        db: E,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), AppError>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("UPDATE users SET password = $1, updated_at = NOW() WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(db)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("User {} not found", id)));
        }

        info!(user_id = %id, "Password changed");
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn get_user(db: &PgPool, id: UserId) -> Result<User, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User {} not found", id)))
    }

    #[instrument(skip(db))]
    pub async fn get_user_by_public_id(db: &PgPool, public_id: Uuid) -> Result<User, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE public_id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(public_id)
            .fetch_optional(db)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User {} not found", public_id)))
    }

    /// Looks a user up by email, normalizing it the way it was stored.
    #[instrument(skip(db))]
    pub async fn get_user_by_email(db: &PgPool, email: &str) -> Result<User, AppError> {
        let email = parse_email(email)?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(email.as_str())
            .fetch_optional(db)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User {} not found", email)))
    }

    /// Lists users ordered by email.
    #[instrument(skip(db))]
    pub async fn list_users(db: &PgPool, filters: UserFilterParams) -> Result<Page<User>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(role) = filters.role {
            params.push(role.as_str().to_string());
            where_clause.push_str(&format!(" AND role = ${}", params.len()));
        }
        if let Some(search) = filters.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(contains_pattern(search));
            let n = params.len();
            where_clause.push_str(&format!(" AND (email ILIKE ${n} OR full_name ILIKE ${n})"));
        }
        if let Some(is_active) = filters.is_active {
            where_clause.push_str(if is_active {
                " AND is_active = TRUE"
            } else {
                " AND is_active = FALSE"
            });
        }

        let count_query = format!("SELECT COUNT(*) FROM users{}", where_clause);
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await.map_err(map_db_error)?;

        let data_query = format!(
            "SELECT {USER_COLUMNS} FROM users{} ORDER BY email LIMIT {} OFFSET {}",
            where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, User>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let users = data_sql.fetch_all(db).await.map_err(map_db_error)?;

        Ok(Page::new(users, &filters.pagination, total))
    }

    /// Applies a partial update. Changing the role re-derives both flags.
    #[instrument(skip(db, dto))]
    pub async fn update_user(
        db: &PgPool,
        id: UserId,
        dto: UpdateUserDto,
    ) -> Result<User, AppError> {
        dto.validate().map_err(AppError::invalid)?;

        let existing = Self::get_user(db, id).await?;

        let email = match dto.email.as_deref() {
            Some(raw) => parse_email(raw)?,
            None => parse_email(&existing.email)?,
        };
        let role = dto.role.unwrap_or(existing.role);
        let record = AccountRecord {
            email,
            full_name: dto
                .full_name
                .map(|n| n.trim().to_string())
                .unwrap_or(existing.full_name),
            role,
            flags: role.flags(),
            is_active: dto.is_active.unwrap_or(existing.is_active),
            agreed_to_terms: dto.agreed_to_terms.unwrap_or(existing.agreed_to_terms),
        };

        Self::store_account(db, id, None, &record).await
    }

    #[instrument(skip(db, dto))]
    pub async fn set_password(db: &PgPool, id: UserId, dto: SetPasswordDto) -> Result<(), AppError> {
        dto.validate().map_err(AppError::invalid)?;
        let password_hash = hash_password(&dto.password)?;
        Self::store_password(db, id, &password_hash).await
    }

    /// Verifies a login. Returns `None` for an unknown email, a wrong
    /// password, or an inactive account.
    #[instrument(skip(db, password))]
    pub async fn check_password(
        db: &PgPool,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(None);
        };

        let sql = format!("SELECT {USER_COLUMNS}, password FROM users WHERE email = $1");
        let credentials = sqlx::query_as::<_, UserCredentials>(&sql)
            .bind(email.as_str())
            .fetch_optional(db)
            .await
            .map_err(map_db_error)?;

        let Some(credentials) = credentials else {
            return Ok(None);
        };

        if !credentials.user.is_active {
            warn!(user_id = %credentials.user.id, "Login attempt on inactive account");
            return Ok(None);
        }

        if !verify_password(password, &credentials.password)? {
            return Ok(None);
        }

        Ok(Some(credentials.user))
    }

    /// Deletes the account. Its students go with it; its support tickets
    /// stay, detached.
    #[instrument(skip(db))]
    pub async fn delete_user(db: &PgPool, id: UserId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("User {} not found", id)));
        }

        info!(user_id = %id, "User deleted");
        Ok(())
    }
}

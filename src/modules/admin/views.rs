//! Role-scoped user views.
//!
//! Each [`RoleView`] lists only the users of its role and pre-fills new
//! forms with that role. Saving always goes through [`enforce_role_flags`],
//! so the stored permission flags follow the saved role whatever the form
//! carried.

use learnhub_core::{AppError, Page, PaginationParams, hash_password};
use learnhub_db::map_db_error;
use learnhub_models::UserId;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, instrument};
use validator::Validate;

use crate::modules::admin::config::{ModelAdmin, USER_ADMIN};
use crate::modules::users::model::{Role, User, UserFilterParams};
use crate::modules::users::service::{AccountRecord, UserService, parse_email};

/// Edit form of a user as the admin views handle it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct UserAdminForm {
    #[validate(length(min = 1, max = 200))]
    pub email: String,
    #[validate(length(min = 1, max = 300))]
    pub full_name: String,
    /// Required when creating; when updating, `None` keeps the current one.
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    pub role: Role,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub agreed_to_terms: bool,
}

/// Pre-save hook: overwrites both flags with what `form.role` implies.
pub fn enforce_role_flags(form: &mut UserAdminForm) {
    let flags = form.role.flags();
    form.is_staff = flags.is_staff;
    form.is_superuser = flags.is_superuser;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleView {
    pub role: Role,
}

impl RoleView {
    pub const GUARDIANS: RoleView = RoleView {
        role: Role::Guardian,
    };
    pub const ADMINS: RoleView = RoleView { role: Role::Admin };
    pub const SUPERUSERS: RoleView = RoleView {
        role: Role::Superuser,
    };

    pub const ALL: [RoleView; 3] = [Self::GUARDIANS, Self::ADMINS, Self::SUPERUSERS];

    pub fn for_role(role: Role) -> Self {
        Self { role }
    }

    pub fn admin(&self) -> &'static ModelAdmin {
        &USER_ADMIN
    }

    /// Users of this view's role, by email.
    #[instrument(skip(db))]
    pub async fn list(
        &self,
        db: &PgPool,
        search: Option<String>,
        pagination: PaginationParams,
    ) -> Result<Page<User>, AppError> {
        UserService::list_users(
            db,
            UserFilterParams {
                role: Some(self.role),
                search,
                is_active: None,
                pagination,
            },
        )
        .await
    }

    /// A blank form for a new user of this view's role.
    pub fn initial_data(&self) -> UserAdminForm {
        let flags = self.role.flags();
        UserAdminForm {
            email: String::new(),
            full_name: String::new(),
            password: None,
            role: self.role,
            is_staff: flags.is_staff,
            is_superuser: flags.is_superuser,
            is_active: true,
            agreed_to_terms: false,
        }
    }

    /// Creates a user from the form.
    #[instrument(skip(self, db, form), fields(view = %self.role, email = %form.email))]
    pub async fn save(&self, db: &PgPool, mut form: UserAdminForm) -> Result<User, AppError> {
        enforce_role_flags(&mut form);
        form.validate().map_err(AppError::invalid)?;

        let password = form
            .password
            .as_deref()
            .ok_or_else(|| AppError::validation(anyhow::anyhow!("Password is required")))?;
        let password_hash = hash_password(password)?;

        let record = record_from(&form)?;
        let user = UserService::insert_account(db, &record, &password_hash).await?;

        info!(user_id = %user.id, "User saved through admin view");
        Ok(user)
    }

    /// Overwrites an existing user of this view's role with the form. The
    /// form may move the user to another role. A user outside the view is
    /// not found, and nothing is written unless every column, password
    /// included, is.
    #[instrument(skip(self, db, form), fields(view = %self.role))]
    pub async fn update(
        &self,
        db: &PgPool,
        id: UserId,
        mut form: UserAdminForm,
    ) -> Result<User, AppError> {
        enforce_role_flags(&mut form);
        form.validate().map_err(AppError::invalid)?;

        let record = record_from(&form)?;
        let password_hash = form.password.as_deref().map(hash_password).transpose()?;

        let mut tx = db.begin().await.map_err(map_db_error)?;

        let user = UserService::store_account(&mut *tx, id, Some(self.role), &record).await?;
        if let Some(password_hash) = password_hash {
            UserService::store_password(&mut *tx, id, &password_hash).await?;
        }

        tx.commit().await.map_err(map_db_error)?;

        info!(user_id = %user.id, "User updated through admin view");
        Ok(user)
    }
}

fn record_from(form: &UserAdminForm) -> Result<AccountRecord, AppError> {
    Ok(AccountRecord {
        email: parse_email(&form.email)?,
        full_name: form.full_name.trim().to_string(),
        role: form.role,
        flags: learnhub_models::RoleFlags {
            is_staff: form.is_staff,
            is_superuser: form.is_superuser,
        },
        is_active: form.is_active,
        agreed_to_terms: form.agreed_to_terms,
    })
}

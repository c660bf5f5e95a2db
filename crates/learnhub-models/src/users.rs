//! User accounts and account DTOs.
//!
//! # Core Types
//!
//! - [`User`] - account row without the password hash
//! - [`UserCredentials`] - account row with the hash, for password checks
//!
//! # Request DTOs
//!
//! - [`CreateUserDto`] - create a guardian, admin or superuser account
//! - [`CreateSuperuserDto`] - create a superuser, refusing demoted flags
//! - [`UpdateUserDto`] - partial update; never carries the permission flags
//! - [`UserFilterParams`] - list filters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::choices::{Role, RoleFlags};
use crate::ids::UserId;
use learnhub_core::PaginationParams;

/// An account.
///
/// `is_staff` and `is_superuser` always equal `role.flags()`; every write
/// path recomputes them and the table rejects any other combination.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub public_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub agreed_to_terms: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn flags(&self) -> RoleFlags {
        RoleFlags {
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
        }
    }

    /// True when the stored flags match what the role implies.
    pub fn has_consistent_flags(&self) -> bool {
        self.flags() == self.role.flags()
    }
}

/// Account row including the bcrypt hash.
#[derive(FromRow, Debug, Clone)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub user: User,
    pub password: String,
}

/// Account creation input.
///
/// Field validation covers lengths only; the email's format is checked when
/// it is normalized into an [`Email`](crate::Email).
#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreateUserDto {
    #[validate(length(min = 1, max = 200))]
    pub email: String,
    #[validate(length(min = 1, max = 300))]
    pub full_name: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// Defaults to [`Role::Guardian`].
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub agreed_to_terms: Option<bool>,
}

/// Superuser creation input.
///
/// The flags are accepted only so an explicit `false` can be refused; the
/// created account always has both set.
#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreateSuperuserDto {
    #[validate(length(min = 1, max = 200))]
    pub email: String,
    #[validate(length(min = 1, max = 300))]
    pub full_name: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[serde(default)]
    pub is_staff: Option<bool>,
    #[serde(default)]
    pub is_superuser: Option<bool>,
    /// Defaults to `true` for superusers.
    #[serde(default)]
    pub agreed_to_terms: Option<bool>,
}

#[derive(Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, max = 200))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 300))]
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub agreed_to_terms: Option<bool>,
}

#[derive(Deserialize, Debug, Clone, Validate)]
pub struct SetPasswordDto {
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Filters for listing users. All are optional and combine with AND.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct UserFilterParams {
    pub role: Option<Role>,
    /// Case-insensitive substring of email or full name
    pub search: Option<String>,
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

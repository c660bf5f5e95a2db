//! Administrative configuration layer.
//!
//! - [`config`]: per-entity [`ModelAdmin`] declarations
//! - [`changelist`]: executes a declaration's search, filters and ordering
//! - [`views`]: guardian, admin and superuser views over users

pub mod changelist;
pub mod config;
pub mod views;

pub use changelist::{ChangeListQuery, changelist};
pub use config::{AdminEntity, ModelAdmin, registry};
pub use views::{RoleView, UserAdminForm, enforce_role_flags};

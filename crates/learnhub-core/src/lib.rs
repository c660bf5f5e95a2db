//! # learnhub-core
//!
//! Foundational types shared by every learnhub crate:
//!
//! - [`errors`]: the [`AppError`] taxonomy returned by all write paths
//! - [`pagination`]: list windows and page metadata
//! - [`password`]: bcrypt hashing and verification
//! - [`serde`]: deserializers for partial-update payloads
//!
//! # Example
//!
//! ```ignore
//! use learnhub_core::{AppError, hash_password};
//!
//! let hash = hash_password("secure_password")?;
//! let error = AppError::not_found(anyhow::anyhow!("Course not found"));
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod serde;

pub use errors::{AppError, AppResult, ErrorKind};
pub use pagination::{Page, PaginationMeta, PaginationParams};
pub use password::{hash_password, hash_password_with_cost, verify_password};

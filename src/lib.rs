//! # Learnhub
//!
//! The data model and administration core of a learning platform for
//! children: guardian accounts and their students, a course → module →
//! lesson content tree, enrollment and progress tracking, and support
//! tickets, backed by PostgreSQL.
//!
//! ## Architecture
//!
//! ```text
//! crates/
//! ├── learnhub-core/     # AppError, pagination, password hashing
//! ├── learnhub-config/   # Environment configuration
//! ├── learnhub-db/       # Pool, migrations, database error mapping
//! └── learnhub-models/   # Entities, stored enums, typed ids, DTOs
//! src/
//! ├── cli/               # Operator commands and the seeder
//! ├── modules/           # Feature modules
//! │   ├── users/         # Accounts and role-derived flags
//! │   ├── students/      # Student profiles
//! │   ├── courses/       # Courses and modules
//! │   ├── lessons/       # Lessons, materials, subtitles
//! │   ├── enrollments/   # Enrollments and lesson progress
//! │   ├── support/       # Support tickets
//! │   └── admin/         # Admin declarations, change lists, role views
//! ├── logging.rs
//! └── state.rs
//! ```
//!
//! Each feature module has a `model.rs` re-exporting its types from
//! `learnhub-models` and a `service.rs` holding a unit struct whose async
//! functions take a `&PgPool` and return `Result<_, AppError>`.
//!
//! ## Roles
//!
//! | Role | is_staff | is_superuser |
//! |------|----------|--------------|
//! | guardian | false | false |
//! | admin | true | false |
//! | superuser | true | true |
//!
//! The flags are never set independently: every write derives them from the
//! role, and the `users` table rejects any other combination.
//!
//! ## Errors
//!
//! Every operation fails with an [`AppError`](learnhub_core::AppError) whose
//! kind is one of validation failure, uniqueness conflict, referential
//! integrity violation, not found, or internal.

pub mod cli;
pub mod logging;
pub mod modules;
pub mod state;

// Re-export workspace crates for convenience
pub use learnhub_config;
pub use learnhub_core;
pub use learnhub_db;
pub use learnhub_models;

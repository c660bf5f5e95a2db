//! # Learnhub Models
//!
//! Domain models and DTOs for learnhub.
//!
//! This crate holds every persisted entity, the categorical values stored
//! with them, typed internal keys, and the request DTOs the services accept.
//!
//! # Modules
//!
//! - [`choices`]: stored enumerations (role, school year, ticket status, ...)
//! - [`courses`]: courses, modules and course outlines
//! - [`enrollments`]: enrollments and lesson progress
//! - [`ids`]: typed `BIGSERIAL` keys
//! - [`lessons`]: lessons, materials and subtitles
//! - [`students`]: student profiles
//! - [`support`]: support tickets
//! - [`users`]: user accounts
//! - [`value_types`]: validated primitives such as [`Email`]
//!
//! # Example
//!
//! ```ignore
//! use learnhub_models::{Role, CreateUserDto};
//!
//! let flags = Role::Admin.flags();
//! assert!(flags.is_staff && !flags.is_superuser);
//! ```

pub mod choices;
pub mod courses;
pub mod enrollments;
pub mod ids;
pub mod lessons;
pub mod students;
pub mod support;
pub mod users;
pub mod value_types;

pub use choices::{
    AdhdType, CourseAudience, LessonType, Role, RoleFlags, SchoolYear, TicketStatus, UnknownChoice,
};

pub use courses::{
    Course, CourseFilterParams, CourseModule, CourseOutline, CreateCourseDto, CreateModuleDto,
    ModuleOutline, UpdateCourseDto, UpdateModuleDto,
};

pub use enrollments::{CourseProgress, Enrollment, LessonProgress};

pub use ids::{
    CourseId, EnrollmentId, LessonId, LessonProgressId, MaterialId, ModuleId, StudentId,
    SubtitleId, TicketId, UserId,
};

pub use lessons::{
    CreateLessonDto, CreateMaterialDto, CreateSubtitleDto, Lesson, Material, Subtitle,
    UpdateLessonDto,
};

pub use students::{
    CreateStudentDto, Student, StudentFilterParams, StudentWithUser, UpdateStudentDto,
};

pub use support::{OpenTicketDto, SupportTicket, TicketFilterParams};

pub use users::{
    CreateSuperuserDto, CreateUserDto, SetPasswordDto, UpdateUserDto, User, UserCredentials,
    UserFilterParams,
};

pub use value_types::{Email, ValueTypeError};

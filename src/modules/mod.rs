pub mod admin;
pub mod courses;
pub mod enrollments;
pub mod lessons;
pub mod students;
pub mod support;
pub mod users;

pub use self::users::model::User;

#![allow(dead_code)]

use learnhub::modules::courses::{
    Course, CourseModule, CourseService, CreateCourseDto, CreateModuleDto, ModuleService,
};
use learnhub::modules::lessons::{CreateLessonDto, Lesson, LessonService};
use learnhub::modules::students::{CreateStudentDto, SchoolYear, Student, StudentService};
use learnhub::modules::users::{CreateUserDto, Role, User, UserService};
use sqlx::PgPool;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "testpass123";

pub fn generate_unique_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4())
}

pub async fn create_test_user(db: &PgPool, role: Role) -> User {
    UserService::create_user(
        db,
        CreateUserDto {
            email: generate_unique_email(),
            full_name: "Test User".to_string(),
            password: TEST_PASSWORD.to_string(),
            role: Some(role),
            is_active: None,
            agreed_to_terms: Some(true),
        },
    )
    .await
    .unwrap()
}

pub async fn create_test_student(db: &PgPool, guardian: &User, nickname: &str) -> Student {
    StudentService::create_student(
        db,
        guardian.id,
        CreateStudentDto {
            nickname: nickname.to_string(),
            birth_date: None,
            school_year: SchoolYear::Year3,
            adhd_type: None,
        },
    )
    .await
    .unwrap()
}

pub async fn create_test_course(db: &PgPool, title: &str) -> Course {
    CourseService::create_course(
        db,
        CreateCourseDto {
            title: title.to_string(),
            description: Some(format!("About {}", title)),
            thumbnail_url: None,
            audience: None,
            published_at: None,
        },
    )
    .await
    .unwrap()
}

pub async fn create_test_module(db: &PgPool, course: &Course, order: i32) -> CourseModule {
    ModuleService::create_module(
        db,
        course.id,
        CreateModuleDto {
            title: format!("Module {}", order),
            module_order: order,
        },
    )
    .await
    .unwrap()
}

pub async fn create_test_lesson(db: &PgPool, module: &CourseModule, order: i32) -> Lesson {
    LessonService::create_lesson(
        db,
        module.id,
        CreateLessonDto {
            title: format!("Lesson {}", order),
            lesson_order: order,
            lesson_type: None,
            content: None,
            video_url: None,
            duration_seconds: Some(300),
        },
    )
    .await
    .unwrap()
}

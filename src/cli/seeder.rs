use chrono::NaiveDate;
use fake::Fake;
use fake::faker::lorem::en::{Paragraph, Sentence};
use fake::faker::name::en::{FirstName, LastName};
use learnhub_core::{AppError, hash_password_with_cost};
use learnhub_db::map_db_error;
use learnhub_models::{AdhdType, LessonType, SchoolYear, TicketStatus};
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

/// Seeded accounts use this local-part tag so `clear-seed` can find them.
const SEED_EMAIL_PATTERN: &str = "%+seed%@example.com";
/// Seeded courses point their thumbnail here.
const SEED_THUMBNAIL_PREFIX: &str = "https://cdn.example.com/seed/";
pub const SEED_PASSWORD: &str = "password123";

// Rows per multi-value INSERT; keeps every statement well under the
// 65535 bind parameter limit.
const BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy)]
pub struct SeedSizes {
    pub guardians: usize,
    pub students_per_guardian: usize,
    pub courses: usize,
    pub modules_per_course: usize,
    pub lessons_per_module: usize,
    pub tickets: usize,
}

impl Default for SeedSizes {
    fn default() -> Self {
        Self {
            guardians: 20,
            students_per_guardian: 2,
            courses: 5,
            modules_per_course: 3,
            lessons_per_module: 4,
            tickets: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub guardians: usize,
    pub students: usize,
    pub courses: usize,
    pub lessons: usize,
    pub enrollments: usize,
    pub tickets: usize,
}

struct GuardianSeed {
    full_name: String,
    email: String,
}

struct StudentSeed {
    user_id: i64,
    nickname: String,
    birth_date: Option<NaiveDate>,
    school_year: SchoolYear,
    adhd_type: AdhdType,
}

struct LessonSeed {
    module_id: i64,
    title: String,
    lesson_order: i32,
    lesson_type: LessonType,
    duration_seconds: Option<i32>,
}

struct TicketSeed {
    user_id: i64,
    subject: String,
    message: String,
    status: TicketStatus,
}

/// Builds `($1, $2), ($3, $4)` for `rows` tuples of `width` parameters.
fn values_placeholders(rows: usize, width: usize) -> String {
    (0..rows)
        .map(|row| {
            let params = (1..=width)
                .map(|col| format!("${}", row * width + col))
                .collect::<Vec<_>>()
                .join(", ");
            format!("({})", params)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn pick<T: Copy>(choices: &[T]) -> T {
    choices[(0..choices.len()).fake::<usize>()]
}

/// Fills the database with fake guardians, students, courses, enrollments
/// and tickets. Every seeded account shares [`SEED_PASSWORD`].
pub async fn seed_database(db: &PgPool, sizes: SeedSizes) -> Result<SeedSummary, AppError> {
    let start_time = Instant::now();
    info!(?sizes, "Seeding database");

    // One cheap hash for every seeded account
    let password_hash = hash_password_with_cost(SEED_PASSWORD, 4)?;

    let guardians = generate_guardians(sizes.guardians);
    let mut tx = db.begin().await.map_err(map_db_error)?;

    let mut user_ids = Vec::with_capacity(guardians.len());
    for chunk in guardians.chunks(BATCH_SIZE) {
        user_ids.extend(insert_guardians(&mut tx, chunk, &password_hash).await?);
    }

    let students = generate_students(&user_ids, sizes.students_per_guardian);
    let mut student_ids = Vec::with_capacity(students.len());
    for chunk in students.chunks(BATCH_SIZE) {
        student_ids.extend(insert_students(&mut tx, chunk).await?);
    }

    let course_ids = insert_courses(&mut tx, sizes.courses).await?;
    let module_ids = insert_modules(&mut tx, &course_ids, sizes.modules_per_course).await?;

    let lessons = generate_lessons(&module_ids, sizes.lessons_per_module);
    for chunk in lessons.chunks(BATCH_SIZE) {
        insert_lessons(&mut tx, chunk).await?;
    }

    // One course per student, round robin, so pairs never repeat
    let enrollments: Vec<(i64, i64)> = if course_ids.is_empty() {
        Vec::new()
    } else {
        student_ids
            .iter()
            .enumerate()
            .map(|(i, &student)| (student, course_ids[i % course_ids.len()]))
            .collect()
    };
    for chunk in enrollments.chunks(BATCH_SIZE) {
        insert_enrollments(&mut tx, chunk).await?;
    }

    let tickets = generate_tickets(&user_ids, sizes.tickets);
    for chunk in tickets.chunks(BATCH_SIZE) {
        insert_tickets(&mut tx, chunk).await?;
    }

    tx.commit().await.map_err(map_db_error)?;

    let summary = SeedSummary {
        guardians: user_ids.len(),
        students: student_ids.len(),
        courses: course_ids.len(),
        lessons: lessons.len(),
        enrollments: enrollments.len(),
        tickets: tickets.len(),
    };
    info!(?summary, elapsed = ?start_time.elapsed(), "Seeding complete");
    Ok(summary)
}

fn email_part(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase()
}

fn generate_guardians(count: usize) -> Vec<GuardianSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            GuardianSeed {
                email: format!(
                    "{}.{}+seed{}@example.com",
                    email_part(&first_name),
                    email_part(&last_name),
                    idx
                ),
                full_name: format!("{} {}", first_name, last_name),
            }
        })
        .collect()
}

fn generate_students(user_ids: &[i64], per_guardian: usize) -> Vec<StudentSeed> {
    user_ids
        .par_iter()
        .flat_map_iter(|&user_id| {
            (0..per_guardian).map(move |_| {
                let year = (2012..2020).fake::<i32>();
                let month = (1..13).fake::<u32>();
                let day = (1..29).fake::<u32>();
                StudentSeed {
                    user_id,
                    nickname: FirstName().fake(),
                    birth_date: NaiveDate::from_ymd_opt(year, month, day),
                    school_year: pick(SchoolYear::ALL),
                    adhd_type: pick(AdhdType::ALL),
                }
            })
        })
        .collect()
}

fn generate_lessons(module_ids: &[i64], per_module: usize) -> Vec<LessonSeed> {
    module_ids
        .par_iter()
        .flat_map_iter(|&module_id| {
            (1..=per_module).map(move |order| {
                let lesson_type = pick(LessonType::ALL);
                LessonSeed {
                    module_id,
                    title: Sentence(2..5).fake(),
                    lesson_order: order as i32,
                    lesson_type,
                    duration_seconds: (lesson_type == LessonType::Video)
                        .then(|| (60..900).fake::<i32>()),
                }
            })
        })
        .collect()
}

fn generate_tickets(user_ids: &[i64], count: usize) -> Vec<TicketSeed> {
    if user_ids.is_empty() {
        return Vec::new();
    }
    (0..count)
        .into_par_iter()
        .map(|_| TicketSeed {
            user_id: pick(user_ids),
            subject: Sentence(3..7).fake(),
            message: Paragraph(1..3).fake(),
            status: pick(TicketStatus::ALL),
        })
        .collect()
}

async fn insert_guardians(
    tx: &mut Transaction<'_, Postgres>,
    guardians: &[GuardianSeed],
    password_hash: &str,
) -> Result<Vec<i64>, AppError> {
    if guardians.is_empty() {
        return Ok(Vec::new());
    }

    let query = format!(
        "INSERT INTO users (public_id, email, full_name, password, role) VALUES {} RETURNING id",
        values_placeholders(guardians.len(), 5)
    );
    let mut q = sqlx::query_scalar::<_, i64>(&query);
    for guardian in guardians {
        q = q
            .bind(Uuid::new_v4())
            .bind(&guardian.email)
            .bind(&guardian.full_name)
            .bind(password_hash)
            .bind("guardian");
    }

    q.fetch_all(&mut **tx).await.map_err(map_db_error)
}

async fn insert_students(
    tx: &mut Transaction<'_, Postgres>,
    students: &[StudentSeed],
) -> Result<Vec<i64>, AppError> {
    if students.is_empty() {
        return Ok(Vec::new());
    }

    let query = format!(
        "INSERT INTO students (public_id, user_id, nickname, birth_date, school_year, adhd_type) \
         VALUES {} RETURNING id",
        values_placeholders(students.len(), 6)
    );
    let mut q = sqlx::query_scalar::<_, i64>(&query);
    for student in students {
        q = q
            .bind(Uuid::new_v4())
            .bind(student.user_id)
            .bind(&student.nickname)
            .bind(student.birth_date)
            .bind(student.school_year)
            .bind(student.adhd_type);
    }

    q.fetch_all(&mut **tx).await.map_err(map_db_error)
}

async fn insert_courses(
    tx: &mut Transaction<'_, Postgres>,
    count: usize,
) -> Result<Vec<i64>, AppError> {
    let mut ids = Vec::with_capacity(count);
    for idx in 0..count {
        let title: String = Sentence(2..4).fake();
        let description: String = Paragraph(1..3).fake();
        // Roughly two thirds published
        let published = idx % 3 != 2;

        let id = sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO courses (public_id, title, description, thumbnail_url, published_at)
               VALUES ($1, $2, $3, $4, CASE WHEN $5 THEN NOW() END)
               RETURNING id"#,
        )
        .bind(Uuid::new_v4())
        .bind(title.trim_end_matches('.'))
        .bind(description)
        .bind(format!("{}{}.png", SEED_THUMBNAIL_PREFIX, idx))
        .bind(published)
        .fetch_one(&mut **tx)
        .await
        .map_err(map_db_error)?;
        ids.push(id);
    }
    Ok(ids)
}

async fn insert_modules(
    tx: &mut Transaction<'_, Postgres>,
    course_ids: &[i64],
    per_course: usize,
) -> Result<Vec<i64>, AppError> {
    let rows: Vec<(i64, i32)> = course_ids
        .iter()
        .flat_map(|&course_id| (1..=per_course).map(move |order| (course_id, order as i32)))
        .collect();

    let mut ids = Vec::with_capacity(rows.len());
    for chunk in rows.chunks(BATCH_SIZE) {
        let query = format!(
            "INSERT INTO modules (public_id, course_id, title, module_order) VALUES {} RETURNING id",
            values_placeholders(chunk.len(), 4)
        );
        let mut q = sqlx::query_scalar::<_, i64>(&query);
        for (course_id, order) in chunk {
            q = q
                .bind(Uuid::new_v4())
                .bind(course_id)
                .bind(format!("Module {}", order))
                .bind(order);
        }
        ids.extend(q.fetch_all(&mut **tx).await.map_err(map_db_error)?);
    }
    Ok(ids)
}

async fn insert_lessons(
    tx: &mut Transaction<'_, Postgres>,
    lessons: &[LessonSeed],
) -> Result<(), AppError> {
    if lessons.is_empty() {
        return Ok(());
    }

    let query = format!(
        "INSERT INTO lessons (public_id, module_id, title, lesson_order, lesson_type, duration_seconds) \
         VALUES {}",
        values_placeholders(lessons.len(), 6)
    );
    let mut q = sqlx::query(&query);
    for lesson in lessons {
        q = q
            .bind(Uuid::new_v4())
            .bind(lesson.module_id)
            .bind(&lesson.title)
            .bind(lesson.lesson_order)
            .bind(lesson.lesson_type)
            .bind(lesson.duration_seconds);
    }

    q.execute(&mut **tx).await.map_err(map_db_error)?;
    Ok(())
}

async fn insert_enrollments(
    tx: &mut Transaction<'_, Postgres>,
    pairs: &[(i64, i64)],
) -> Result<(), AppError> {
    if pairs.is_empty() {
        return Ok(());
    }

    let query = format!(
        "INSERT INTO enrollments (public_id, student_id, course_id) VALUES {}",
        values_placeholders(pairs.len(), 3)
    );
    let mut q = sqlx::query(&query);
    for (student_id, course_id) in pairs {
        q = q.bind(Uuid::new_v4()).bind(student_id).bind(course_id);
    }

    q.execute(&mut **tx).await.map_err(map_db_error)?;
    Ok(())
}

async fn insert_tickets(
    tx: &mut Transaction<'_, Postgres>,
    tickets: &[TicketSeed],
) -> Result<(), AppError> {
    for ticket in tickets {
        sqlx::query(
            r#"INSERT INTO support_tickets (public_id, user_id, subject, message, status, resolved_at)
               VALUES ($1, $2, $3, $4, $5, CASE WHEN $6 THEN NOW() END)"#,
        )
        .bind(Uuid::new_v4())
        .bind(ticket.user_id)
        .bind(&ticket.subject)
        .bind(&ticket.message)
        .bind(ticket.status)
        .bind(ticket.status == TicketStatus::Resolved)
        .execute(&mut **tx)
        .await
        .map_err(map_db_error)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearSummary {
    pub users: u64,
    pub tickets: u64,
    pub courses: u64,
}

/// Deletes seeded accounts (with their students and tickets) and seeded
/// courses. Rows created any other way are kept.
pub async fn clear_seeded_data(db: &PgPool) -> Result<ClearSummary, AppError> {
    let mut tx = db.begin().await.map_err(map_db_error)?;

    let tickets = sqlx::query(
        "DELETE FROM support_tickets WHERE user_id IN (SELECT id FROM users WHERE email LIKE $1)",
    )
    .bind(SEED_EMAIL_PATTERN)
    .execute(&mut *tx)
    .await
    .map_err(map_db_error)?
    .rows_affected();

    let users = sqlx::query("DELETE FROM users WHERE email LIKE $1 AND role = 'guardian'")
        .bind(SEED_EMAIL_PATTERN)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected();

    let courses = sqlx::query("DELETE FROM courses WHERE thumbnail_url LIKE $1")
        .bind(format!("{}%", SEED_THUMBNAIL_PREFIX))
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected();

    tx.commit().await.map_err(map_db_error)?;

    let summary = ClearSummary {
        users,
        tickets,
        courses,
    };
    info!(?summary, "Seeded data cleared");
    Ok(summary)
}

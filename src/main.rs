use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use learnhub::cli::seeder::{SEED_PASSWORD, SeedSizes, clear_seeded_data, seed_database};
use learnhub::cli::{create_superuser, parse_filter, to_pretty_json};
use learnhub::logging::init_logging;
use learnhub::modules::admin::{AdminEntity, ChangeListQuery, RoleView, changelist};
use learnhub::modules::users::{CreateUserDto, Role, UserService};
use learnhub::state::{AppState, init_app_state};
use learnhub_config::AppConfig;
use learnhub_core::{AppError, PaginationParams};
use learnhub_db::run_migrations;

#[derive(Parser)]
#[command(name = "learnhub")]
#[command(about = "Learnhub - administrative tools for the learnhub database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create a superuser account
    CreateSuperuser {
        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Full name
        #[arg(short = 'n', long)]
        full_name: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Create an account with the given role
    CreateUser {
        #[arg(short = 'e', long)]
        email: String,

        #[arg(short = 'n', long)]
        full_name: String,

        /// guardian, admin or superuser
        #[arg(short = 'r', long, default_value = "guardian")]
        role: Role,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// List the users of one role
    Users {
        #[arg(short = 'r', long)]
        role: Role,

        /// Case-insensitive match on email or full name
        #[arg(short = 's', long)]
        search: Option<String>,

        #[arg(long, default_value = "1")]
        page: i64,

        #[arg(long, default_value = "25")]
        limit: i64,
    },
    /// Print an admin change list as JSON
    Changelist {
        /// student, user, course, module, lesson, enrollment, lesson_progress or support_ticket
        entity: String,

        #[arg(short = 's', long)]
        search: Option<String>,

        /// FIELD=VALUE, repeatable
        #[arg(short = 'f', long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,

        #[arg(long, default_value = "1")]
        page: i64,

        #[arg(long, default_value = "25")]
        limit: i64,
    },
    /// Seed the database with fake guardians, students, courses and tickets
    Seed {
        #[arg(long, default_value = "20")]
        guardians: usize,

        /// Students per guardian
        #[arg(long, default_value = "2")]
        students: usize,

        #[arg(long, default_value = "5")]
        courses: usize,

        /// Modules per course
        #[arg(long, default_value = "3")]
        modules: usize,

        /// Lessons per module
        #[arg(long, default_value = "4")]
        lessons: usize,

        #[arg(long, default_value = "10")]
        tickets: usize,
    },
    /// Delete seeded data (accounts created by `seed` and their courses)
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let _log_guard = init_logging(&config.logging);

    let state = match init_app_state(config).await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Migrate => handle_migrate(&state).await,
        Commands::CreateSuperuser {
            email,
            full_name,
            password,
        } => handle_create_superuser(&state, email, full_name, password).await,
        Commands::CreateUser {
            email,
            full_name,
            role,
            password,
        } => handle_create_user(&state, email, full_name, role, password).await,
        Commands::Users {
            role,
            search,
            page,
            limit,
        } => handle_users(&state, role, search, PaginationParams::paged(page, limit)).await,
        Commands::Changelist {
            entity,
            search,
            filters,
            page,
            limit,
        } => {
            let query = ChangeListQuery {
                search,
                filters,
                pagination: PaginationParams::paged(page, limit),
            };
            handle_changelist(&state, &entity, query).await
        }
        Commands::Seed {
            guardians,
            students,
            courses,
            modules,
            lessons,
            tickets,
        } => {
            let sizes = SeedSizes {
                guardians,
                students_per_guardian: students,
                courses,
                modules_per_course: modules,
                lessons_per_module: lessons,
                tickets,
            };
            handle_seed(&state, sizes).await
        }
        Commands::ClearSeed => handle_clear_seed(&state).await,
    };

    if let Err(e) = result {
        eprintln!("\n❌ {}", e);
        std::process::exit(1);
    }
}

fn prompt_password(password: Option<String>) -> Result<String, AppError> {
    match password {
        Some(password) => Ok(password),
        None => Ok(Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?),
    }
}

async fn handle_migrate(state: &AppState) -> Result<(), AppError> {
    run_migrations(&state.db).await?;
    println!("✅ Migrations applied");
    Ok(())
}

async fn handle_create_superuser(
    state: &AppState,
    email: Option<String>,
    full_name: Option<String>,
    password: Option<String>,
) -> Result<(), AppError> {
    let email = match email {
        Some(email) => email,
        None => Input::new().with_prompt("Email address").interact_text()?,
    };
    let full_name = match full_name {
        Some(full_name) => full_name,
        None => Input::new().with_prompt("Full name").interact_text()?,
    };
    let password = prompt_password(password)?;

    let user = create_superuser(&state.db, &email, &full_name, &password).await?;

    println!("\n✅ Superuser created successfully!");
    println!("   Email: {}", user.email);
    println!("   Name: {}", user.full_name);
    Ok(())
}

async fn handle_create_user(
    state: &AppState,
    email: String,
    full_name: String,
    role: Role,
    password: Option<String>,
) -> Result<(), AppError> {
    let password = prompt_password(password)?;

    let user = UserService::create_user(
        &state.db,
        CreateUserDto {
            email,
            full_name,
            password,
            role: Some(role),
            is_active: None,
            agreed_to_terms: None,
        },
    )
    .await?;

    println!("\n✅ User created successfully!");
    println!("   Email: {}", user.email);
    println!("   Role: {}", user.role.label());
    Ok(())
}

async fn handle_users(
    state: &AppState,
    role: Role,
    search: Option<String>,
    pagination: PaginationParams,
) -> Result<(), AppError> {
    let page = RoleView::for_role(role)
        .list(&state.db, search, pagination)
        .await?;

    println!(
        "{:<40} {:<30} {:<10} {:<6} {:<9}",
        "EMAIL", "FULL NAME", "ROLE", "STAFF", "SUPERUSER"
    );
    for user in &page.data {
        println!(
            "{:<40} {:<30} {:<10} {:<6} {:<9}",
            user.email,
            user.full_name,
            user.role.as_str(),
            user.is_staff,
            user.is_superuser
        );
    }
    println!(
        "\n{} of {} {} users",
        page.len(),
        page.meta.total,
        role.label().to_lowercase()
    );
    Ok(())
}

async fn handle_changelist(
    state: &AppState,
    entity: &str,
    query: ChangeListQuery,
) -> Result<(), AppError> {
    let entity: AdminEntity = entity.parse()?;
    let page = changelist(&state.db, entity.admin(), &query).await?;
    println!("{}", to_pretty_json(&page)?);
    Ok(())
}

async fn handle_seed(state: &AppState, sizes: SeedSizes) -> Result<(), AppError> {
    println!("🌱 Seeding database...");
    let summary = seed_database(&state.db, sizes).await?;

    println!("\n✅ Seeding complete!");
    println!("   - Guardians: {}", summary.guardians);
    println!("   - Students: {}", summary.students);
    println!("   - Courses: {} ({} lessons)", summary.courses, summary.lessons);
    println!("   - Enrollments: {}", summary.enrollments);
    println!("   - Tickets: {}", summary.tickets);
    println!("\n📝 Default password for all seeded accounts: {}", SEED_PASSWORD);
    Ok(())
}

async fn handle_clear_seed(state: &AppState) -> Result<(), AppError> {
    let summary = clear_seeded_data(&state.db).await?;
    println!(
        "✅ Deleted {} accounts, {} tickets and {} courses",
        summary.users, summary.tickets, summary.courses
    );
    Ok(())
}

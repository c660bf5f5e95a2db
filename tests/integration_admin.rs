mod common;

use common::{
    TEST_PASSWORD, create_test_course, create_test_lesson, create_test_module, create_test_student,
    create_test_user, generate_unique_email,
};
use learnhub::modules::admin::{AdminEntity, ChangeListQuery, RoleView, changelist};
use learnhub::modules::courses::CourseService;
use learnhub::modules::support::{OpenTicketDto, SupportService, TicketStatus};
use learnhub::modules::users::{Role, UserService};
use learnhub_core::{ErrorKind, PaginationParams};
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_role_views_list_only_their_role(pool: PgPool) {
    create_test_user(&pool, Role::Guardian).await;
    create_test_user(&pool, Role::Guardian).await;
    create_test_user(&pool, Role::Admin).await;
    create_test_user(&pool, Role::Superuser).await;

    let guardians = RoleView::GUARDIANS
        .list(&pool, None, PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(guardians.meta.total, 2);

    for view in RoleView::ALL {
        let page = view
            .list(&pool, None, PaginationParams::default())
            .await
            .unwrap();
        assert!(page.data.iter().all(|u| u.role == view.role));
        assert!(page.data.iter().all(|u| u.flags() == view.role.flags()));
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_save_overrides_submitted_flags(pool: PgPool) {
    let view = RoleView::ADMINS;
    let mut form = view.initial_data();
    form.email = generate_unique_email();
    form.full_name = "Staff Member".to_string();
    form.password = Some(TEST_PASSWORD.to_string());
    form.is_staff = false;
    form.is_superuser = true;

    let user = view.save(&pool, form).await.unwrap();

    assert_eq!(user.role, Role::Admin);
    assert!(user.is_staff);
    assert!(!user.is_superuser);
    assert!(
        UserService::check_password(&pool, &user.email, TEST_PASSWORD)
            .await
            .unwrap()
            .is_some()
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_save_requires_password(pool: PgPool) {
    let view = RoleView::GUARDIANS;
    let mut form = view.initial_data();
    form.email = generate_unique_email();
    form.full_name = "No Password".to_string();

    let err = view.save(&pool, form).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ValidationFailure);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_save_through_each_view(pool: PgPool) {
    for view in RoleView::ALL {
        let mut form = view.initial_data();
        form.email = generate_unique_email();
        form.full_name = format!("{} account", view.role);
        form.password = Some(TEST_PASSWORD.to_string());
        form.is_staff = !form.is_staff;
        form.is_superuser = !form.is_superuser;

        let user = view.save(&pool, form).await.unwrap();

        assert_eq!(user.role, view.role);
        assert_eq!(user.flags(), view.role.flags());

        let listed = view
            .list(&pool, Some(user.email.clone()), PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(listed.meta.total, 1);
        assert_eq!(listed.data[0].id, user.id);
    }

    let superusers = RoleView::SUPERUSERS
        .list(&pool, None, PaginationParams::default())
        .await
        .unwrap();
    assert!(superusers.data.iter().all(|u| u.is_staff && u.is_superuser));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_outside_view_is_not_found(pool: PgPool) {
    let user = create_test_user(&pool, Role::Guardian).await;

    let view = RoleView::SUPERUSERS;
    let mut form = view.initial_data();
    form.email = user.email.clone();
    form.full_name = "Promoted".to_string();
    form.agreed_to_terms = true;

    let err = view.update(&pool, user.id, form).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let unchanged = UserService::get_user(&pool, user.id).await.unwrap();
    assert_eq!(unchanged.role, Role::Guardian);
    assert!(!unchanged.is_staff);
    assert!(!unchanged.is_superuser);
    assert_eq!(unchanged.full_name, user.full_name);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_guardian_view_cannot_edit_admin(pool: PgPool) {
    let admin = create_test_user(&pool, Role::Admin).await;

    let mut form = RoleView::GUARDIANS.initial_data();
    form.email = admin.email.clone();
    form.full_name = "Demoted".to_string();
    form.password = Some("replacement-pass".to_string());

    let err = RoleView::GUARDIANS
        .update(&pool, admin.id, form)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let unchanged = UserService::get_user(&pool, admin.id).await.unwrap();
    assert_eq!(unchanged.role, Role::Admin);
    assert!(unchanged.is_staff);
    assert!(
        UserService::check_password(&pool, &admin.email, TEST_PASSWORD)
            .await
            .unwrap()
            .is_some()
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_role_change_within_view(pool: PgPool) {
    let user = create_test_user(&pool, Role::Guardian).await;

    let view = RoleView::GUARDIANS;
    let mut form = view.initial_data();
    form.email = user.email.clone();
    form.full_name = "Promoted".to_string();
    form.role = Role::Admin;
    form.is_staff = false;
    form.is_superuser = true;
    form.agreed_to_terms = true;

    let updated = view.update(&pool, user.id, form).await.unwrap();
    assert_eq!(updated.role, Role::Admin);
    assert!(updated.is_staff);
    assert!(!updated.is_superuser);
    assert_eq!(updated.full_name, "Promoted");

    // Password untouched when the form leaves it empty
    assert!(
        UserService::check_password(&pool, &user.email, TEST_PASSWORD)
            .await
            .unwrap()
            .is_some()
    );

    // The user has left the guardian view
    let guardians = view
        .list(&pool, None, PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(guardians.meta.total, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_with_password(pool: PgPool) {
    let user = create_test_user(&pool, Role::Superuser).await;

    let view = RoleView::SUPERUSERS;
    let mut form = view.initial_data();
    form.email = user.email.clone();
    form.full_name = user.full_name.clone();
    form.password = Some("another-secret".to_string());

    view.update(&pool, user.id, form).await.unwrap();

    assert!(
        UserService::check_password(&pool, &user.email, "another-secret")
            .await
            .unwrap()
            .is_some()
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_failed_update_keeps_password(pool: PgPool) {
    let user = create_test_user(&pool, Role::Admin).await;
    let taken = create_test_user(&pool, Role::Guardian).await;

    let view = RoleView::ADMINS;
    let mut form = view.initial_data();
    form.email = taken.email.clone();
    form.full_name = user.full_name.clone();
    form.password = Some("another-secret".to_string());

    let err = view.update(&pool, user.id, form).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::UniquenessConflict);

    assert!(
        UserService::check_password(&pool, &user.email, TEST_PASSWORD)
            .await
            .unwrap()
            .is_some()
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_changelist_search_by_guardian_email(pool: PgPool) {
    let guardian = create_test_user(&pool, Role::Guardian).await;
    let other = create_test_user(&pool, Role::Guardian).await;
    create_test_student(&pool, &guardian, "Lia").await;
    create_test_student(&pool, &guardian, "Davi").await;
    create_test_student(&pool, &other, "Lia").await;

    let admin = AdminEntity::Student.admin();

    let page = changelist(&pool, admin, &ChangeListQuery::search(guardian.email.clone()))
        .await
        .unwrap();
    assert_eq!(page.meta.total, 2);
    assert!(page.data.iter().all(|row| row["user"] == guardian.email));

    let page = changelist(&pool, admin, &ChangeListQuery::search("lia"))
        .await
        .unwrap();
    assert_eq!(page.meta.total, 2);
    assert!(page.data.iter().all(|row| row["nickname"] == "Lia"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_ticket_changelist_status_filter(pool: PgPool) {
    let guardian = create_test_user(&pool, Role::Guardian).await;
    let mut ids = Vec::new();
    for subject in ["Crash", "Sound", "Login"] {
        let ticket = SupportService::open_ticket(
            &pool,
            OpenTicketDto {
                user_id: Some(guardian.id),
                subject: subject.to_string(),
                message: "Please help".to_string(),
            },
        )
        .await
        .unwrap();
        ids.push(ticket.id);
    }
    SupportService::update_status(&pool, ids[1], TicketStatus::Resolved)
        .await
        .unwrap();

    let admin = AdminEntity::SupportTicket.admin();
    let query = ChangeListQuery::default().filter("status", "resolved");
    let page = changelist(&pool, admin, &query).await.unwrap();

    assert_eq!(page.meta.total, 1);
    assert_eq!(page.data[0]["subject"], "Sound");
    assert_eq!(page.data[0]["status"], "resolved");

    let query = ChangeListQuery::default().filter("created_at", "today");
    let page = changelist(&pool, admin, &query).await.unwrap();
    assert_eq!(page.meta.total, 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_course_changelist_published_filter(pool: PgPool) {
    let published = create_test_course(&pool, "Published course").await;
    create_test_course(&pool, "Draft course").await;
    CourseService::publish(&pool, published.id).await.unwrap();

    let admin = AdminEntity::Course.admin();

    let page = changelist(
        &pool,
        admin,
        &ChangeListQuery::default().filter("published_at", "no_date"),
    )
    .await
    .unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.data[0]["title"], "Draft course");

    let page = changelist(
        &pool,
        admin,
        &ChangeListQuery::default().filter("published_at", "past_7_days"),
    )
    .await
    .unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.data[0]["public_id"], published.public_id.to_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_changelist_rejects_undeclared_filter(pool: PgPool) {
    let err = changelist(
        &pool,
        AdminEntity::User.admin(),
        &ChangeListQuery::default().filter("password", "x"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ValidationFailure);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_changelist_pagination(pool: PgPool) {
    for _ in 0..5 {
        create_test_user(&pool, Role::Guardian).await;
    }

    let query = ChangeListQuery {
        pagination: PaginationParams::paged(2, 2),
        ..Default::default()
    };
    let page = changelist(&pool, AdminEntity::User.admin(), &query)
        .await
        .unwrap();

    assert_eq!(page.meta.total, 5);
    assert_eq!(page.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_module_changelist_default_ordering(pool: PgPool) {
    let first = create_test_course(&pool, "Alphabet").await;
    let second = create_test_course(&pool, "Numbers").await;
    create_test_module(&pool, &second, 1).await;
    for order in [3, 1, 2] {
        create_test_module(&pool, &first, order).await;
    }

    let page = changelist(&pool, AdminEntity::Module.admin(), &ChangeListQuery::default())
        .await
        .unwrap();

    let rows: Vec<(String, i64)> = page
        .data
        .iter()
        .map(|row| {
            (
                row["course"].as_str().unwrap().to_string(),
                row["module_order"].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Alphabet".to_string(), 1),
            ("Alphabet".to_string(), 2),
            ("Alphabet".to_string(), 3),
            ("Numbers".to_string(), 1),
        ]
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_lesson_changelist_default_ordering(pool: PgPool) {
    let course = create_test_course(&pool, "Shapes").await;
    let module = create_test_module(&pool, &course, 1).await;
    for order in [2, 3, 1] {
        create_test_lesson(&pool, &module, order).await;
    }

    let page = changelist(&pool, AdminEntity::Lesson.admin(), &ChangeListQuery::default())
        .await
        .unwrap();

    let orders: Vec<i64> = page
        .data
        .iter()
        .map(|row| row["lesson_order"].as_i64().unwrap())
        .collect();
    assert_eq!(orders, vec![1, 2, 3]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_ticket_changelist_newest_first(pool: PgPool) {
    for subject in ["Oldest", "Middle", "Newest"] {
        SupportService::open_ticket(
            &pool,
            OpenTicketDto {
                user_id: None,
                subject: subject.to_string(),
                message: "Please help".to_string(),
            },
        )
        .await
        .unwrap();
    }

    let page = changelist(
        &pool,
        AdminEntity::SupportTicket.admin(),
        &ChangeListQuery::default(),
    )
    .await
    .unwrap();

    let subjects: Vec<&str> = page
        .data
        .iter()
        .map(|row| row["subject"].as_str().unwrap())
        .collect();
    assert_eq!(subjects, vec!["Newest", "Middle", "Oldest"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_changelist_search_wildcards_are_literal(pool: PgPool) {
    create_test_course(&pool, "Discounts 50% off").await;
    create_test_course(&pool, "Percentages").await;

    let page = changelist(&pool, AdminEntity::Course.admin(), &ChangeListQuery::search("50%"))
        .await
        .unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.data[0]["title"], "Discounts 50% off");

    let page = changelist(&pool, AdminEntity::Course.admin(), &ChangeListQuery::search("_"))
        .await
        .unwrap();
    assert_eq!(page.meta.total, 0);
}

mod common;

use common::create_test_user;
use learnhub::modules::support::{OpenTicketDto, SupportService, TicketFilterParams, TicketStatus};
use learnhub::modules::users::Role;
use learnhub_core::ErrorKind;
use learnhub_models::ids::UserId;
use sqlx::PgPool;

fn ticket(user_id: Option<UserId>, subject: &str) -> OpenTicketDto {
    OpenTicketDto {
        user_id,
        subject: subject.to_string(),
        message: format!("Details about {}", subject),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_open_ticket_starts_new(pool: PgPool) {
    let guardian = create_test_user(&pool, Role::Guardian).await;

    let opened = SupportService::open_ticket(&pool, ticket(Some(guardian.id), "Login"))
        .await
        .unwrap();

    assert_eq!(opened.status, TicketStatus::New);
    assert!(opened.resolved_at.is_none());
    assert_eq!(opened.user_id, Some(guardian.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_anonymous_ticket(pool: PgPool) {
    let opened = SupportService::open_ticket(&pool, ticket(None, "Pricing"))
        .await
        .unwrap();
    assert!(opened.user_id.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_ticket_for_missing_user_is_reference_error(pool: PgPool) {
    let err = SupportService::open_ticket(&pool, ticket(Some(UserId::new(999_999)), "Ghost"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ReferentialIntegrityViolation);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_empty_subject_rejected(pool: PgPool) {
    let err = SupportService::open_ticket(&pool, ticket(None, ""))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ValidationFailure);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_resolved_at_follows_status(pool: PgPool) {
    let opened = SupportService::open_ticket(&pool, ticket(None, "Audio"))
        .await
        .unwrap();

    let in_progress = SupportService::update_status(&pool, opened.id, TicketStatus::InProgress)
        .await
        .unwrap();
    assert!(in_progress.resolved_at.is_none());

    let resolved = SupportService::update_status(&pool, opened.id, TicketStatus::Resolved)
        .await
        .unwrap();
    assert!(resolved.is_resolved());
    let stamped = resolved.resolved_at.unwrap();

    // Resolving again keeps the first timestamp
    let again = SupportService::update_status(&pool, opened.id, TicketStatus::Resolved)
        .await
        .unwrap();
    assert_eq!(again.resolved_at, Some(stamped));

    let reopened = SupportService::update_status(&pool, opened.id, TicketStatus::New)
        .await
        .unwrap();
    assert!(reopened.resolved_at.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_tickets_newest_first_with_filters(pool: PgPool) {
    let guardian = create_test_user(&pool, Role::Guardian).await;
    let first = SupportService::open_ticket(&pool, ticket(Some(guardian.id), "Video freezes"))
        .await
        .unwrap();
    let second = SupportService::open_ticket(&pool, ticket(None, "Billing question"))
        .await
        .unwrap();
    let third = SupportService::open_ticket(&pool, ticket(Some(guardian.id), "Subtitles"))
        .await
        .unwrap();
    SupportService::update_status(&pool, third.id, TicketStatus::Resolved)
        .await
        .unwrap();

    let all = SupportService::list_tickets(&pool, TicketFilterParams::default())
        .await
        .unwrap();
    let ids: Vec<_> = all.data.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);

    let mine = SupportService::list_tickets(
        &pool,
        TicketFilterParams {
            user_id: Some(guardian.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(mine.meta.total, 2);

    let open = SupportService::list_tickets(
        &pool,
        TicketFilterParams {
            status: Some(TicketStatus::New),
            search: Some("video".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open.data[0].id, first.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_ticket(pool: PgPool) {
    let opened = SupportService::open_ticket(&pool, ticket(None, "Spam"))
        .await
        .unwrap();

    SupportService::delete_ticket(&pool, opened.id).await.unwrap();

    let err = SupportService::get_ticket(&pool, opened.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

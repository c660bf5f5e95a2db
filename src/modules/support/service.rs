use learnhub_core::{AppError, Page};
use learnhub_db::{contains_pattern, map_db_error};
use learnhub_models::TicketId;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::modules::support::model::{
    OpenTicketDto, SupportTicket, TicketFilterParams, TicketStatus,
};

const TICKET_COLUMNS: &str =
    "id, public_id, user_id, subject, message, status, created_at, resolved_at";

pub struct SupportService;

impl SupportService {
    /// Opens a ticket in status `new`. The opener is optional.
    #[instrument(skip(db, dto), fields(user_id = ?dto.user_id))]
    pub async fn open_ticket(db: &PgPool, dto: OpenTicketDto) -> Result<SupportTicket, AppError> {
        dto.validate().map_err(AppError::invalid)?;

        let sql = format!(
            r#"INSERT INTO support_tickets (public_id, user_id, subject, message, status)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {TICKET_COLUMNS}"#
        );

        let ticket = sqlx::query_as::<_, SupportTicket>(&sql)
            .bind(Uuid::new_v4())
            .bind(dto.user_id)
            .bind(dto.subject.trim())
            .bind(&dto.message)
            .bind(TicketStatus::New)
            .fetch_one(db)
            .await
            .map_err(map_db_error)?;

        info!(ticket_id = %ticket.id, "Support ticket opened");
        Ok(ticket)
    }

    #[instrument(skip(db))]
    pub async fn get_ticket(db: &PgPool, id: TicketId) -> Result<SupportTicket, AppError> {
        let sql = format!("SELECT {TICKET_COLUMNS} FROM support_tickets WHERE id = $1");
        sqlx::query_as::<_, SupportTicket>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Ticket {} not found", id)))
    }

    /// Lists tickets, newest first.
    #[instrument(skip(db))]
    pub async fn list_tickets(
        db: &PgPool,
        filters: TicketFilterParams,
    ) -> Result<Page<SupportTicket>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        // $1 is always the optional user; text params start at $2
        let mut where_clause = String::from(" WHERE ($1::BIGINT IS NULL OR user_id = $1)");
        let mut texts: Vec<String> = Vec::new();

        if let Some(status) = filters.status {
            texts.push(status.as_str().to_string());
            where_clause.push_str(&format!(" AND status = ${}", texts.len() + 1));
        }
        if let Some(search) = filters.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            texts.push(contains_pattern(search));
            let n = texts.len() + 1;
            where_clause.push_str(&format!(" AND (subject ILIKE ${n} OR message ILIKE ${n})"));
        }

        let count_query = format!("SELECT COUNT(*) FROM support_tickets{}", where_clause);
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query).bind(filters.user_id);
        for text in &texts {
            count_sql = count_sql.bind(text);
        }
        let total = count_sql.fetch_one(db).await.map_err(map_db_error)?;

        let data_query = format!(
            "SELECT {TICKET_COLUMNS} FROM support_tickets{} ORDER BY created_at DESC, id DESC LIMIT {} OFFSET {}",
            where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, SupportTicket>(&data_query).bind(filters.user_id);
        for text in texts {
            data_sql = data_sql.bind(text);
        }
        let tickets = data_sql.fetch_all(db).await.map_err(map_db_error)?;

        Ok(Page::new(tickets, &filters.pagination, total))
    }

    /// Moves a ticket to `status`. Any transition is allowed.
    ///
    /// Entering `resolved` stamps `resolved_at` unless it is already set;
    /// any other status clears it.
    #[instrument(skip(db))]
    pub async fn update_status(
        db: &PgPool,
        id: TicketId,
        status: TicketStatus,
    ) -> Result<SupportTicket, AppError> {
        let sql = format!(
            r#"UPDATE support_tickets
               SET status = $1,
                   resolved_at = CASE WHEN $2 THEN COALESCE(resolved_at, NOW()) ELSE NULL END
               WHERE id = $3
               RETURNING {TICKET_COLUMNS}"#
        );

        let ticket = sqlx::query_as::<_, SupportTicket>(&sql)
            .bind(status)
            .bind(status == TicketStatus::Resolved)
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Ticket {} not found", id)))?;

        info!(ticket_id = %id, status = %status, "Ticket status changed");
        Ok(ticket)
    }

    #[instrument(skip(db))]
    pub async fn delete_ticket(db: &PgPool, id: TicketId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM support_tickets WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Ticket {} not found", id)));
        }

        info!(ticket_id = %id, "Ticket deleted");
        Ok(())
    }
}

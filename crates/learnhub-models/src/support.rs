//! Support tickets.
//!
//! A ticket outlives the account that opened it: deleting the user nulls
//! `user_id` and keeps the ticket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::choices::TicketStatus;
use crate::ids::{TicketId, UserId};
use learnhub_core::PaginationParams;

/// `resolved_at` is set exactly when `status` is [`TicketStatus::Resolved`].
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct SupportTicket {
    pub id: TicketId,
    pub public_id: Uuid,
    pub user_id: Option<UserId>,
    pub subject: String,
    pub message: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl SupportTicket {
    pub fn is_resolved(&self) -> bool {
        self.status == TicketStatus::Resolved
    }
}

#[derive(Deserialize, Debug, Clone, Validate)]
pub struct OpenTicketDto {
    pub user_id: Option<UserId>,
    #[validate(length(min = 1, max = 255))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub message: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct TicketFilterParams {
    pub status: Option<TicketStatus>,
    pub user_id: Option<UserId>,
    /// Case-insensitive substring of subject or message
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

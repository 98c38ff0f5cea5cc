use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::user::{Role, UserRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TicketCategory {
    Bug,
    Feature,
    Support,
    Question,
}

/// Joined row shape: ticket columns plus the creator and (optional) assignee
/// projections resolved in the same query.
#[derive(Debug, Clone, FromRow)]
pub struct TicketRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub category: TicketCategory,
    pub created_at: i64,
    pub updated_at: i64,
    pub creator_id: i64,
    pub creator_name: String,
    pub creator_email: String,
    pub creator_role: Role,
    pub assignee_id: Option<i64>,
    pub assignee_name: Option<String>,
    pub assignee_email: Option<String>,
    pub assignee_role: Option<Role>,
}

/// Wire shape of a ticket, with references resolved to user projections.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub category: TicketCategory,
    pub created_by: UserRef,
    pub assigned_to: Option<UserRef>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<TicketRow> for TicketView {
    fn from(row: TicketRow) -> Self {
        let assigned_to = match (
            row.assignee_id,
            row.assignee_name,
            row.assignee_email,
            row.assignee_role,
        ) {
            (Some(id), Some(name), Some(email), Some(role)) => Some(UserRef {
                id,
                name,
                email,
                role,
            }),
            _ => None,
        };

        TicketView {
            id: row.id,
            title: row.title,
            description: row.description,
            status: row.status,
            priority: row.priority,
            category: row.category,
            created_by: UserRef {
                id: row.creator_id,
                name: row.creator_name,
                email: row.creator_email,
                role: row.creator_role,
            },
            assigned_to,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateTicketReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TicketPriority>,
    pub category: Option<TicketCategory>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTicketReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub category: Option<TicketCategory>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTicketReq {
    pub assigned_to: Option<i64>,
}

/// Optional list filters; values are matched verbatim against the stored
/// column, so an unknown value simply matches nothing.
#[derive(Debug, Default, Deserialize)]
pub struct ListTicketsQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
}

/// Ticket counts grouped by status, zero-filled so all four statuses are
/// always present.
#[derive(Debug, Default, Serialize)]
pub struct TicketStats {
    pub open: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub closed: i64,
}

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::now_epoch;
use crate::error::{ApiError, ApiResult};
use crate::models::ticket::{
    AssignTicketReq, CreateTicketReq, ListTicketsQuery, TicketCategory, TicketPriority,
    TicketRow, TicketStats, TicketStatus, TicketView, UpdateTicketReq,
};
use crate::policy;
use crate::rbac::AuthUser;

const TICKET_SELECT: &str = "SELECT t.id, t.title, t.description, t.status, t.priority, \
    t.category, t.created_at, t.updated_at, \
    c.id AS creator_id, c.name AS creator_name, c.email AS creator_email, c.role AS creator_role, \
    a.id AS assignee_id, a.name AS assignee_name, a.email AS assignee_email, a.role AS assignee_role \
    FROM tickets t \
    JOIN users c ON c.id = t.created_by \
    LEFT JOIN users a ON a.id = t.assigned_to";

/// Creates a ticket owned by the caller. The creator always comes from the
/// authenticated identity, never from the request body.
pub async fn create_ticket(
    pool: &SqlitePool,
    user: &AuthUser,
    req: CreateTicketReq,
) -> ApiResult<TicketView> {
    let title = req
        .title
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("Title is required".into()))?;
    let description = req
        .description
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::InvalidInput("Description is required".into()))?;

    let priority = req.priority.unwrap_or(TicketPriority::Medium);
    let category = req.category.unwrap_or(TicketCategory::Support);
    let now = now_epoch();

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO tickets (title, description, status, priority, category, created_by, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(title)
    .bind(description)
    .bind(TicketStatus::Open)
    .bind(priority)
    .bind(category)
    .bind(user.id)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    fetch_ticket(pool, id)
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("ticket {id} missing after insert")))
}

/// Lists tickets visible to the caller, newest first. Consultants are pinned
/// to their own tickets no matter what filters the request carries.
pub async fn list_tickets(
    pool: &SqlitePool,
    user: &AuthUser,
    query: &ListTicketsQuery,
) -> ApiResult<Vec<TicketView>> {
    let mut qb = QueryBuilder::<Sqlite>::new(TICKET_SELECT);
    qb.push(" WHERE 1 = 1");

    if let Some(owner) = policy::list_scope(user.role, user.id) {
        qb.push(" AND t.created_by = ").push_bind(owner);
    }
    if let Some(status) = &query.status {
        qb.push(" AND t.status = ").push_bind(status.clone());
    }
    if let Some(priority) = &query.priority {
        qb.push(" AND t.priority = ").push_bind(priority.clone());
    }
    if let Some(category) = &query.category {
        qb.push(" AND t.category = ").push_bind(category.clone());
    }
    qb.push(" ORDER BY t.created_at DESC, t.id DESC");

    let rows: Vec<TicketRow> = qb.build_query_as().fetch_all(pool).await?;
    Ok(rows.into_iter().map(TicketView::from).collect())
}

pub async fn get_ticket(pool: &SqlitePool, user: &AuthUser, raw_id: &str) -> ApiResult<TicketView> {
    let id = parse_ticket_id(raw_id)?;
    let ticket = fetch_ticket(pool, id).await?.ok_or_else(ticket_not_found)?;

    if !policy::can_access(user.role, user.id, ticket.created_by.id) {
        return Err(ApiError::Forbidden(
            "Not authorized to view this ticket".into(),
        ));
    }
    Ok(ticket)
}

/// Applies the role's field allow-list and writes the surviving changes.
/// Fields outside the allow-list are dropped silently; the assignee cannot be
/// touched through this operation.
pub async fn update_ticket(
    pool: &SqlitePool,
    user: &AuthUser,
    raw_id: &str,
    req: UpdateTicketReq,
) -> ApiResult<TicketView> {
    let id = parse_ticket_id(raw_id)?;
    let existing = fetch_ticket(pool, id).await?.ok_or_else(ticket_not_found)?;

    if !policy::can_access(user.role, user.id, existing.created_by.id) {
        return Err(ApiError::Forbidden(
            "Not authorized to modify this ticket".into(),
        ));
    }

    let changes = policy::filter_update(user.role, req);

    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE tickets SET updated_at = ");
    qb.push_bind(now_epoch());
    if let Some(title) = changes.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(ApiError::InvalidInput("Title cannot be empty".into()));
        }
        qb.push(", title = ").push_bind(title);
    }
    if let Some(description) = changes.description {
        qb.push(", description = ").push_bind(description);
    }
    if let Some(status) = changes.status {
        qb.push(", status = ").push_bind(status);
    }
    if let Some(priority) = changes.priority {
        qb.push(", priority = ").push_bind(priority);
    }
    if let Some(category) = changes.category {
        qb.push(", category = ").push_bind(category);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.build().execute(pool).await?;

    fetch_ticket(pool, id).await?.ok_or_else(ticket_not_found)
}

/// Sets the assignee reference. The target user id is stored as given; it is
/// not checked against the users table, so a dangling id resolves to a null
/// assignee on read.
pub async fn assign_ticket(
    pool: &SqlitePool,
    raw_id: &str,
    req: AssignTicketReq,
) -> ApiResult<TicketView> {
    let assignee = req
        .assigned_to
        .ok_or_else(|| ApiError::InvalidInput("assignedTo is required".into()))?;
    let id = parse_ticket_id(raw_id)?;

    let result = sqlx::query("UPDATE tickets SET assigned_to = ?, updated_at = ? WHERE id = ?")
        .bind(assignee)
        .bind(now_epoch())
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ticket_not_found());
    }

    fetch_ticket(pool, id).await?.ok_or_else(ticket_not_found)
}

pub async fn delete_ticket(pool: &SqlitePool, raw_id: &str) -> ApiResult<i64> {
    let id = parse_ticket_id(raw_id)?;

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM tickets WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    if existing.is_none() {
        return Err(ticket_not_found());
    }

    sqlx::query("DELETE FROM tickets WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(id)
}

/// Counts tickets per status across the whole store. Unlike list, this is not
/// scoped to the caller: a consultant's stats cover everyone's tickets.
pub async fn ticket_stats(pool: &SqlitePool) -> ApiResult<TicketStats> {
    let rows: Vec<(TicketStatus, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM tickets GROUP BY status")
            .fetch_all(pool)
            .await?;

    let mut stats = TicketStats::default();
    for (status, count) in rows {
        match status {
            TicketStatus::Open => stats.open = count,
            TicketStatus::InProgress => stats.in_progress = count,
            TicketStatus::Resolved => stats.resolved = count,
            TicketStatus::Closed => stats.closed = count,
        }
    }
    Ok(stats)
}

async fn fetch_ticket(pool: &SqlitePool, id: i64) -> ApiResult<Option<TicketView>> {
    let row: Option<TicketRow> = sqlx::query_as(&format!("{TICKET_SELECT} WHERE t.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(TicketView::from))
}

// Malformed ids behave like missing tickets.
fn parse_ticket_id(raw: &str) -> ApiResult<i64> {
    raw.parse().map_err(|_| ticket_not_found())
}

fn ticket_not_found() -> ApiError {
    ApiError::NotFound("Ticket not found".into())
}

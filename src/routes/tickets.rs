use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde_json::json;

use crate::error::ApiResult;
use crate::models::ticket::{
    AssignTicketReq, CreateTicketReq, ListTicketsQuery, UpdateTicketReq,
};
use crate::rbac::{AuthUser, ManagerUser, StaffUser};
use crate::services::ticket_service;
use crate::AppState;

/// GET /api/tickets
async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListTicketsQuery>,
) -> ApiResult<impl IntoResponse> {
    let tickets = ticket_service::list_tickets(&state.pool, &user, &query).await?;
    Ok(Json(json!({
        "success": true,
        "count": tickets.len(),
        "tickets": tickets,
    })))
}

/// POST /api/tickets
async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateTicketReq>,
) -> ApiResult<impl IntoResponse> {
    let ticket = ticket_service::create_ticket(&state.pool, &user, req).await?;
    tracing::info!(ticket = ticket.id, by = user.id, "ticket created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "ticket": ticket })),
    ))
}

/// GET /api/tickets/stats
async fn stats(State(state): State<AppState>, _user: AuthUser) -> ApiResult<impl IntoResponse> {
    let stats = ticket_service::ticket_stats(&state.pool).await?;
    Ok(Json(json!({ "success": true, "stats": stats })))
}

/// GET /api/tickets/:id
async fn get_one(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let ticket = ticket_service::get_ticket(&state.pool, &user, &id).await?;
    Ok(Json(json!({ "success": true, "ticket": ticket })))
}

/// PUT /api/tickets/:id
async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateTicketReq>,
) -> ApiResult<impl IntoResponse> {
    let ticket = ticket_service::update_ticket(&state.pool, &user, &id, req).await?;
    Ok(Json(json!({ "success": true, "ticket": ticket })))
}

/// PUT /api/tickets/:id/assign — manager/dev; the role gate runs in the
/// extractor, the service does not re-check it.
async fn assign(
    State(state): State<AppState>,
    StaffUser(actor): StaffUser,
    Path(id): Path<String>,
    Json(req): Json<AssignTicketReq>,
) -> ApiResult<impl IntoResponse> {
    let ticket = ticket_service::assign_ticket(&state.pool, &id, req).await?;
    tracing::info!(ticket = ticket.id, by = actor.id, "ticket assigned");
    Ok(Json(json!({ "success": true, "ticket": ticket })))
}

/// DELETE /api/tickets/:id — manager only.
async fn delete_one(
    State(state): State<AppState>,
    ManagerUser(actor): ManagerUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let ticket_id = ticket_service::delete_ticket(&state.pool, &id).await?;
    tracing::info!(ticket = ticket_id, by = actor.id, "ticket deleted");
    Ok(Json(json!({
        "success": true,
        "message": "Ticket deleted",
        "ticketId": ticket_id,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        // registered ahead of /:id so "stats" is never read as a ticket id
        .route("/stats", get(stats))
        .route("/:id", get(get_one).put(update).delete(delete_one))
        .route("/:id/assign", put(assign))
}

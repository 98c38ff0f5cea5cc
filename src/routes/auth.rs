use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::models::user::{LoginReq, RegisterReq, UserRef};
use crate::rbac::AuthUser;
use crate::services::auth_service;
use crate::AppState;

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterReq>,
) -> ApiResult<impl IntoResponse> {
    let user = auth_service::register_user(&state.pool, req).await?;
    let token = state.jwt.issue(user.id, &user.email, user.role)?;
    tracing::info!(email = %user.email, role = %user.role, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "token": token,
            "user": UserRef::from(&user),
        })),
    ))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginReq>,
) -> ApiResult<impl IntoResponse> {
    let (email, password) = match (req.email.as_deref(), req.password.as_deref()) {
        (Some(e), Some(p)) if !e.is_empty() && !p.is_empty() => (e, p),
        _ => {
            return Err(ApiError::InvalidInput(
                "Email and password are required".into(),
            ))
        }
    };

    let user = auth_service::verify_user(&state.pool, email, password)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("Invalid credentials".into()))?;
    let token = state.jwt.issue(user.id, &user.email, user.role)?;
    tracing::debug!(email = %user.email, "login");

    Ok(Json(json!({
        "success": true,
        "token": token,
        "user": UserRef::from(&user),
    })))
}

/// GET /api/auth/me
async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<impl IntoResponse> {
    let current = auth_service::find_user(&state.pool, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(json!({
        "success": true,
        "user": current,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

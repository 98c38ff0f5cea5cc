pub mod auth;
pub mod tickets;

use axum::{routing::get, Router};

use crate::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .nest("/api/auth", auth::router())
        .nest("/api/tickets", tickets::router())
}

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod policy;
pub mod rbac;
pub mod routes;
pub mod services;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::services::token_service::JwtService;

/// Shared handler state: the store client and the token service, both
/// constructed once in `main` and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt: JwtService,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for JwtService {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

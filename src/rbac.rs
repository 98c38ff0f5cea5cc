use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use sqlx::SqlitePool;

use crate::error::ApiError;
use crate::models::user::Role;
use crate::services::token_service::JwtService;

/// Identity decoded from a verified bearer token, attached to the request by
/// the extractor below.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtService: FromRef<S>,
    SqlitePool: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok());

        // A header without the "Bearer " prefix takes the same rejection path
        // as a missing header.
        let token = match header.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(t) => t.trim(),
            None => {
                return Err(ApiError::Unauthenticated(
                    "Not authorized, no token".into(),
                ))
            }
        };

        let jwt = JwtService::from_ref(state);
        let mut user = jwt.verify(token)?;

        // The role in the token is the role at login time. With re-validation
        // enabled, the current stored role wins.
        if jwt.revalidate_role() {
            let pool = SqlitePool::from_ref(state);
            let role: Option<Role> = sqlx::query_scalar("SELECT role FROM users WHERE id = ?")
                .bind(user.id)
                .fetch_optional(&pool)
                .await?;
            match role {
                Some(role) => user.role = role,
                None => {
                    return Err(ApiError::Unauthenticated(
                        "Not authorized, unknown user".into(),
                    ))
                }
            }
        }

        Ok(user)
    }
}

/// Allow-list role check; the rejection names the caller's role.
pub fn authorize(user: &AuthUser, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "Role {} is not authorized for this operation",
            user.role
        )))
    }
}

/// Manager or dev, for the assignment route.
pub struct StaffUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
    JwtService: FromRef<S>,
    SqlitePool: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        authorize(&user, &[Role::Manager, Role::Dev])?;
        Ok(StaffUser(user))
    }
}

/// Manager only, for deletion.
pub struct ManagerUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for ManagerUser
where
    S: Send + Sync,
    JwtService: FromRef<S>,
    SqlitePool: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        authorize(&user, &[Role::Manager])?;
        Ok(ManagerUser(user))
    }
}

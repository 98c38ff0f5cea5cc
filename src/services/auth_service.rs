use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::SqlitePool;

use crate::db::now_epoch;
use crate::error::{ApiError, ApiResult};
use crate::models::user::{RegisterReq, Role, User};

pub async fn register_user(pool: &SqlitePool, req: RegisterReq) -> ApiResult<User> {
    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("Name is required".into()))?;
    let email = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("Email is required".into()))?
        .to_lowercase();
    let password = req
        .password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("Password is required".into()))?;

    if !email_looks_valid(&email) {
        return Err(ApiError::InvalidInput("Invalid email address".into()));
    }
    if password.len() < 6 {
        return Err(ApiError::InvalidInput(
            "Password must be at least 6 characters".into(),
        ));
    }

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Err(ApiError::InvalidInput("Email is already in use".into()));
    }

    let password_hash = hash(password, DEFAULT_COST).map_err(|e| ApiError::Internal(e.into()))?;
    let role = req.role.unwrap_or(Role::Consultant);
    let now = now_epoch();

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (name, email, password_hash, role, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(&email)
    .bind(&password_hash)
    .bind(role)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_user(pool, id)
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("user {id} missing after insert")))
}

/// Checks the password against the stored hash. Unknown email and wrong
/// password are indistinguishable to the caller.
pub async fn verify_user(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> ApiResult<Option<User>> {
    let email = email.trim().to_lowercase();
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(pool)
        .await?;

    if let Some(user) = user {
        if verify(password, &user.password_hash).map_err(|e| ApiError::Internal(e.into()))? {
            return Ok(Some(user));
        }
    }
    Ok(None)
}

pub async fn find_user(pool: &SqlitePool, id: i64) -> ApiResult<Option<User>> {
    let user = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Rehashes and stores a new password for the user.
pub async fn set_password(pool: &SqlitePool, id: i64, password: &str) -> ApiResult<()> {
    if password.len() < 6 {
        return Err(ApiError::InvalidInput(
            "Password must be at least 6 characters".into(),
        ));
    }
    let password_hash = hash(password, DEFAULT_COST).map_err(|e| ApiError::Internal(e.into()))?;
    sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(&password_hash)
        .bind(now_epoch())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

fn email_looks_valid(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}

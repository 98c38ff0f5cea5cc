//! Signed, expiring identity tokens carrying {id, email, role}.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::user::Role;
use crate::rbac::AuthUser;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    role: Role,
    iat: i64,
    exp: i64,
}

/// HS256 token issue/verify. Stateless; nothing is retained between calls.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    expire_secs: i64,
    revalidate_role: bool,
}

impl JwtService {
    pub fn new(secret: &str, expire_secs: i64, revalidate_role: bool) -> Self {
        if secret.len() < 32 {
            tracing::warn!("JWT secret is shorter than recommended (32 bytes)");
        }
        JwtService {
            encoding_key: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding_key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            expire_secs,
            revalidate_role,
        }
    }

    pub fn issue(&self, id: i64, email: &str, role: Role) -> Result<String, ApiError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: id.to_string(),
            email: email.to_string(),
            role,
            iat: now,
            exp: now + self.expire_secs,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("failed to sign token: {e}")))
    }

    /// Invalid signature, malformed token and expired token all collapse to
    /// the same unauthenticated rejection.
    pub fn verify(&self, token: &str) -> Result<AuthUser, ApiError> {
        let invalid = || ApiError::Unauthenticated("Not authorized, invalid token".into());
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| invalid())?;
        let id = data.claims.sub.parse().map_err(|_| invalid())?;
        Ok(AuthUser {
            id,
            email: data.claims.email,
            role: data.claims.role,
        })
    }

    pub fn revalidate_role(&self) -> bool {
        self.revalidate_role
    }

    pub fn expire_secs(&self) -> i64 {
        self.expire_secs
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("expire_secs", &self.expire_secs)
            .field("revalidate_role", &self.revalidate_role)
            .finish()
    }
}

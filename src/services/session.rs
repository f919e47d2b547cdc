//! Session management and the identity gateway.
//!
//! ARCHITECTURE
//! ============
//! Browsers hold a random session token in an `HttpOnly` cookie. Only the
//! SHA-256 hash of the token is stored, so a leaked `sessions` table cannot
//! be replayed. Route guards resolve the cookie through [`IdentityGateway`],
//! which the Postgres-backed [`PgIdentity`] implements and tests mock.

use std::fmt::Write;

use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Hex SHA-256 of a session token, as stored in `sessions.token_hash`.
#[must_use]
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    bytes_to_hex(&digest)
}

/// Profile row returned from session validation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SessionUser {
    /// Unique user identifier; scopes every bookmark query.
    pub id: Uuid,
    /// Account email shown in the dashboard header.
    pub email: Option<String>,
    pub name: String,
}

impl SessionUser {
    /// Label for the dashboard header: the email, else the display name.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.name)
    }
}

/// Create a session for the given user, returning the raw token.
pub async fn create_session(pool: &PgPool, user_id: Uuid, ttl_days: i32) -> Result<String, sqlx::Error> {
    let token = generate_token();
    sqlx::query(
        "INSERT INTO sessions (token_hash, user_id, expires_at)
         VALUES ($1, $2, now() + make_interval(days => $3))",
    )
    .bind(hash_token(&token))
    .bind(user_id)
    .bind(ttl_days)
    .execute(pool)
    .await?;
    Ok(token)
}

/// Validate a session token and return the associated user.
pub async fn validate_session(pool: &PgPool, token: &str) -> Result<Option<SessionUser>, sqlx::Error> {
    let row = sqlx::query(
        r"SELECT p.id, p.email, p.name
          FROM sessions s
          JOIN profiles p ON p.id = s.user_id
          WHERE s.token_hash = $1 AND s.expires_at > now()",
    )
    .bind(hash_token(token))
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| SessionUser { id: r.get("id"), email: r.get("email"), name: r.get("name") }))
}

/// Delete a session by token.
pub async fn delete_session(pool: &PgPool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
        .bind(hash_token(token))
        .execute(pool)
        .await?;
    Ok(())
}

// =============================================================================
// IDENTITY GATEWAY
// =============================================================================

/// Verifies the current user and issues or revokes sessions.
#[async_trait::async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Resolve a session token to its user. `None` if unknown or expired.
    async fn get_user(&self, token: &str) -> Result<Option<SessionUser>, sqlx::Error>;

    /// Start a session for `user_id` and return the token for the cookie.
    async fn sign_in(&self, user_id: Uuid) -> Result<String, sqlx::Error>;

    /// Terminate the session identified by `token`.
    async fn sign_out(&self, token: &str) -> Result<(), sqlx::Error>;
}

/// [`IdentityGateway`] backed by the `sessions` and `profiles` tables.
pub struct PgIdentity {
    pool: PgPool,
    ttl_days: i32,
}

impl PgIdentity {
    #[must_use]
    pub fn new(pool: PgPool, ttl_days: i32) -> Self {
        Self { pool, ttl_days }
    }
}

#[async_trait::async_trait]
impl IdentityGateway for PgIdentity {
    async fn get_user(&self, token: &str) -> Result<Option<SessionUser>, sqlx::Error> {
        validate_session(&self.pool, token).await
    }

    async fn sign_in(&self, user_id: Uuid) -> Result<String, sqlx::Error> {
        create_session(&self.pool, user_id, self.ttl_days).await
    }

    async fn sign_out(&self, token: &str) -> Result<(), sqlx::Error> {
        delete_session(&self.pool, token).await
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

//! Bookmark store: owner-scoped create/list/delete of bookmark rows.
//!
//! DESIGN
//! ======
//! Handlers and components talk to the store through the [`BookmarkStore`]
//! trait so they can be exercised against an in-memory double. The Postgres
//! implementation scopes every statement by `user_id`; a user can never read
//! or delete another user's rows through this API.
//!
//! ERROR HANDLING
//! ==============
//! Database errors are classified once, here. A missing `bookmarks` relation
//! (SQLSTATE `42P01`, or any message mentioning a relation) becomes
//! [`StoreError::MissingRelation`] so the UI can show a setup instruction.
//! Other server-reported errors keep their raw message; transport and pool
//! failures become [`StoreError::Unavailable`].

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

/// SQLSTATE for `undefined_table`.
pub const UNDEFINED_TABLE: &str = "42P01";

// =============================================================================
// TYPES
// =============================================================================

/// A stored bookmark. Mirrors the `bookmarks` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Insert payload. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookmark {
    pub user_id: Uuid,
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("bookmarks table missing: {0}")]
    MissingRelation(String),
    #[error("{0}")]
    Backend(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("bookmark not found: {0}")]
    NotFound(Uuid),
}

impl StoreError {
    /// Classify a server-reported database error by SQLSTATE and message.
    #[must_use]
    pub fn from_database(code: Option<&str>, message: &str) -> Self {
        if is_missing_relation(code, message) {
            Self::MissingRelation(message.to_owned())
        } else {
            Self::Backend(message.to_owned())
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => Self::from_database(db.code().as_deref(), db.message()),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

/// True when an error indicates the backing table has not been created.
#[must_use]
pub fn is_missing_relation(code: Option<&str>, message: &str) -> bool {
    code == Some(UNDEFINED_TABLE) || message.contains("relation")
}

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Owner-scoped bookmark persistence. Enables mocking in tests.
#[async_trait::async_trait]
pub trait BookmarkStore: Send + Sync {
    /// All bookmarks owned by `owner`, newest first.
    async fn list(&self, owner: Uuid) -> Result<Vec<Bookmark>, StoreError>;

    /// Insert a bookmark and return the stored row.
    async fn insert(&self, row: NewBookmark) -> Result<Bookmark, StoreError>;

    /// Delete one bookmark owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no row with that id belongs to `owner`.
    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError>;
}

// =============================================================================
// POSTGRES
// =============================================================================

/// [`BookmarkStore`] backed by the shared SQLx pool.
pub struct PgBookmarkStore {
    pool: PgPool,
}

impl PgBookmarkStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type BookmarkTuple = (Uuid, Uuid, String, String, OffsetDateTime);

fn from_tuple((id, user_id, url, title, created_at): BookmarkTuple) -> Bookmark {
    Bookmark { id, user_id, url, title, created_at }
}

#[async_trait::async_trait]
impl BookmarkStore for PgBookmarkStore {
    async fn list(&self, owner: Uuid) -> Result<Vec<Bookmark>, StoreError> {
        let rows = sqlx::query_as::<_, BookmarkTuple>(
            "SELECT id, user_id, url, title, created_at
             FROM bookmarks
             WHERE user_id = $1
             ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(from_tuple).collect())
    }

    async fn insert(&self, row: NewBookmark) -> Result<Bookmark, StoreError> {
        let stored = sqlx::query_as::<_, BookmarkTuple>(
            "INSERT INTO bookmarks (user_id, url, title)
             VALUES ($1, $2, $3)
             RETURNING id, user_id, url, title, created_at",
        )
        .bind(row.user_id)
        .bind(&row.url)
        .bind(&row.title)
        .fetch_one(&self.pool)
        .await?;

        Ok(from_tuple(stored))
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "bookmarks_test.rs"]
mod tests;

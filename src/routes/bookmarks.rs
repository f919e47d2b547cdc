//! Bookmark JSON API, the scriptable twin of the dashboard forms.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use crate::components::add_form::{AddBookmarkForm, FormError};
use crate::components::bookmark_list::{DELETE_FAILED, LOAD_FAILED, NOT_SET_UP, sort_newest_first};
use crate::routes::auth::AuthUser;
use crate::services::bookmarks::{Bookmark, StoreError};
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("Bookmark not found")]
    NotFound,
    #[error("{}", NOT_SET_UP)]
    NotSetUp,
    #[error("{0}")]
    Failed(&'static str),
}

impl ApiError {
    /// Map a store error, using `failed` as the message for generic failures.
    fn from_store(err: StoreError, failed: &'static str) -> Self {
        match err {
            StoreError::NotFound(_) => Self::NotFound,
            StoreError::MissingRelation(_) => Self::NotSetUp,
            StoreError::Backend(_) | StoreError::Unavailable(_) => Self::Failed(failed),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Form(e) => form_error_to_status(e),
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::NotSetUp => StatusCode::SERVICE_UNAVAILABLE,
            Self::Failed(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Status for a failed add: validation is the caller's fault, the rest is ours.
pub(crate) fn form_error_to_status(err: &FormError) -> StatusCode {
    match err {
        e if e.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
        FormError::NotSetUp => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBookmarkBody {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

/// `GET /api/bookmarks`: the caller's bookmarks, newest first.
pub async fn list_bookmarks(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Vec<Bookmark>>, ApiError> {
    let mut rows = state.store.list(auth.user.id).await.map_err(|e| {
        error!(error = %e, user_id = %auth.user.id, "error fetching bookmarks");
        ApiError::from_store(e, LOAD_FAILED)
    })?;
    sort_newest_first(&mut rows);
    Ok(Json(rows))
}

/// `POST /api/bookmarks`: validate and insert, same rules as the form.
pub async fn create_bookmark(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateBookmarkBody>,
) -> Result<(StatusCode, Json<Bookmark>), ApiError> {
    let mut form = AddBookmarkForm::with_input(body.title, body.url);
    let created = form.submit(state.store.as_ref(), auth.user.id, || {}).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `DELETE /api/bookmarks/:id`: remove one of the caller's bookmarks.
pub async fn delete_bookmark(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(auth.user.id, id).await.map_err(|e| {
        if !matches!(e, StoreError::NotFound(_)) {
            error!(error = %e, bookmark_id = %id, "error deleting bookmark");
        }
        ApiError::from_store(e, DELETE_FAILED)
    })?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "bookmarks_test.rs"]
mod tests;

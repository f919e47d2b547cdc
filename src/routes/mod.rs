//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Server-rendered pages and their form posts live at the root, the JSON API
//! lives under `/api` with permissive CORS, and the stylesheet and the small
//! progressive-enhancement script are served from `/static`.

pub mod auth;
pub mod bookmarks;
pub mod pages;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// JSON endpoints used by scripts and non-browser clients.
fn api_routes() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/bookmarks", get(bookmarks::list_bookmarks).post(bookmarks::create_bookmark))
        .route("/api/bookmarks/{id}", delete(bookmarks::delete_bookmark))
        .layer(cors)
}

/// Pages, auth flow, and the dashboard's form posts.
fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::landing))
        .route("/dashboard", get(pages::dashboard))
        .route("/dashboard/bookmarks", post(pages::add_bookmark))
        .route("/dashboard/bookmarks/{id}/delete", post(pages::delete_bookmark))
        .route("/auth/signout", post(auth::sign_out))
        .route("/auth/google", get(auth::google_redirect))
        .route("/auth/google/callback", get(auth::google_callback))
        .route("/auth/dev", post(auth::dev_sign_in))
}

/// Full application router.
pub fn app(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .merge(page_routes())
        .merge(api_routes())
        .route("/healthz", get(healthz))
        .nest_service("/static", static_files)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

//! Server-rendered pages: landing, dashboard, and the dashboard's form posts.
//!
//! Every page handler starts with an auth guard: the landing page sends
//! signed-in visitors to `/dashboard`, everything else sends anonymous
//! visitors to `/`. Each request mounts a fresh [`DashboardContent`].

use axum::Form;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::components::dashboard::DashboardContent;
use crate::config::Config;
use crate::html::{escape, render_template};
use crate::routes::auth::MaybeUser;
use crate::routes::bookmarks::form_error_to_status;
use crate::services::bookmarks::StoreError;
use crate::services::session::SessionUser;
use crate::state::AppState;

const LAYOUT_TEMPLATE: &str = include_str!("../../templates/layout.html");
const LANDING_TEMPLATE: &str = include_str!("../../templates/landing.html");
const DASHBOARD_TEMPLATE: &str = include_str!("../../templates/dashboard.html");

fn layout(title: &str, body: &str) -> Html<String> {
    let title = escape(title);
    Html(render_template(LAYOUT_TEMPLATE, &[("TITLE", title.as_str()), ("BODY", body)]))
}

/// Sign-in controls for whichever methods are enabled.
fn sign_in_controls(config: &Config) -> String {
    let mut out = String::new();
    if config.google.is_some() {
        out.push_str(r#"      <a class="btn btn-primary btn-block" href="/auth/google">Sign in with Google</a>"#);
        out.push('\n');
    }
    if config.dev_auth_bypass {
        out.push_str(
            r#"      <form method="post" action="/auth/dev" class="stack dev-sign-in">
        <label for="email">Developer sign-in</label>
        <input type="email" id="email" name="email" placeholder="you@example.com" required>
        <button type="submit" class="btn btn-secondary">Continue</button>
      </form>
"#,
        );
    }
    if out.is_empty() {
        out.push_str(r#"      <p class="alert alert-error" role="alert">Sign-in is not configured on this server.</p>"#);
    }
    out
}

#[must_use]
pub fn render_landing(config: &Config) -> Html<String> {
    let controls = sign_in_controls(config);
    let body = render_template(LANDING_TEMPLATE, &[("SIGN_IN", controls.as_str())]);
    layout("Smart Bookmarks", &body)
}

#[must_use]
pub fn render_dashboard(user: &SessionUser, content: &DashboardContent) -> Html<String> {
    let email = escape(user.display_label());
    let cards = content.render();
    let body = render_template(DASHBOARD_TEMPLATE, &[("EMAIL", email.as_str()), ("CONTENT", cards.as_str())]);
    layout("My Bookmarks · Smart Bookmarks", &body)
}

/// `GET /`: marketing page, or straight to the dashboard when signed in.
pub async fn landing(State(state): State<AppState>, MaybeUser(auth): MaybeUser) -> Response {
    if auth.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    render_landing(&state.config).into_response()
}

/// `GET /dashboard`: header plus the form and the caller's bookmarks.
pub async fn dashboard(State(state): State<AppState>, MaybeUser(auth): MaybeUser) -> Response {
    let Some(auth) = auth else {
        return Redirect::to("/").into_response();
    };

    let mut content = DashboardContent::new(auth.user.id);
    content.mount(state.store.as_ref()).await;
    render_dashboard(&auth.user, &content).into_response()
}

#[derive(Debug, Deserialize)]
pub struct AddBookmarkBody {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

/// `POST /dashboard/bookmarks`: submit the add form and re-render.
pub async fn add_bookmark(
    State(state): State<AppState>,
    MaybeUser(auth): MaybeUser,
    Form(body): Form<AddBookmarkBody>,
) -> Response {
    let Some(auth) = auth else {
        return Redirect::to("/").into_response();
    };

    let store = state.store.as_ref();
    let mut content = DashboardContent::new(auth.user.id);
    let status = match content.add_bookmark(store, &body.title, &body.url).await {
        Ok(_) => StatusCode::OK,
        Err(e) => form_error_to_status(&e),
    };
    content.mount(store).await;

    (status, render_dashboard(&auth.user, &content)).into_response()
}

/// `POST /dashboard/bookmarks/:id/delete`: delete one row and re-render.
pub async fn delete_bookmark(
    State(state): State<AppState>,
    MaybeUser(auth): MaybeUser,
    Path(id): Path<Uuid>,
) -> Response {
    let Some(auth) = auth else {
        return Redirect::to("/").into_response();
    };

    let mut content = DashboardContent::new(auth.user.id);
    let status = match content.delete_bookmark(state.store.as_ref(), id).await {
        Ok(()) => StatusCode::OK,
        Err(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        Err(_) => StatusCode::BAD_GATEWAY,
    };

    (status, render_dashboard(&auth.user, &content)).into_response()
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;

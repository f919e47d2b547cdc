//! Auth routes: Google OAuth flow, dev sign-in, session cookie management.

use std::convert::Infallible;

use axum::Form;
use axum::extract::{FromRef, FromRequestParts, Query, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;
use tracing::{error, info, warn};

use crate::services::{auth as auth_svc, session};
use crate::state::AppState;

pub const COOKIE_NAME: &str = "session_token";
pub const OAUTH_STATE_COOKIE_NAME: &str = "oauth_state";

fn build_cookie(name: &'static str, value: String, secure: bool, max_age: Duration) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

/// Session cookie that lives as long as the server-side session row.
pub(crate) fn session_cookie(token: String, secure: bool, ttl_days: i32) -> Cookie<'static> {
    build_cookie(COOKIE_NAME, token, secure, Duration::days(i64::from(ttl_days)))
}

/// Expired, empty cookie that makes the browser drop `name`.
pub(crate) fn clear_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    build_cookie(name, String::new(), secure, Duration::ZERO)
}

// =============================================================================
// AUTH EXTRACTORS
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: session::SessionUser,
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        let app_state = AppState::from_ref(state);
        let user = app_state
            .identity
            .get_user(token)
            .await
            .map_err(|e| {
                error!(error = %e, "session lookup failed");
                StatusCode::INTERNAL_SERVER_ERROR
            })?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self { user, token: token.to_owned() })
    }
}

/// Optional session for pages that redirect instead of rejecting.
/// A failed lookup counts as signed out.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(AuthUser::from_request_parts(parts, state).await.ok()))
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /auth/signout`: end the session (if any), clear the cookie, go home.
pub async fn sign_out(State(state): State<AppState>, MaybeUser(auth): MaybeUser) -> Response {
    if let Some(auth) = auth {
        match state.identity.sign_out(&auth.token).await {
            Ok(()) => info!(user_id = %auth.user.id, "signed out"),
            Err(e) => error!(error = %e, user_id = %auth.user.id, "sign-out failed"),
        }
    }

    let jar = CookieJar::new().add(clear_cookie(COOKIE_NAME, state.config.cookie_secure));
    (jar, Redirect::to("/")).into_response()
}

/// `GET /api/auth/me`: return the current user.
pub async fn me(auth: AuthUser) -> Json<session::SessionUser> {
    Json(auth.user)
}

/// `POST /api/auth/logout`: delete the session, clear the cookie.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(e) = state.identity.sign_out(&auth.token).await {
        error!(error = %e, user_id = %auth.user.id, "logout failed");
    }

    let jar = CookieJar::new().add(clear_cookie(COOKIE_NAME, state.config.cookie_secure));
    (jar, StatusCode::NO_CONTENT)
}

/// `GET /auth/google`: redirect to Google's consent page.
pub async fn google_redirect(State(state): State<AppState>) -> Response {
    let Some(google) = &state.config.google else {
        return (StatusCode::SERVICE_UNAVAILABLE, "Google sign-in not configured").into_response();
    };

    let oauth_state = session::generate_token();
    let cookie = build_cookie(
        OAUTH_STATE_COOKIE_NAME,
        oauth_state.clone(),
        state.config.cookie_secure,
        Duration::minutes(10),
    );

    let jar = CookieJar::new().add(cookie);
    (jar, Redirect::temporary(&google.authorize_url(&oauth_state))).into_response()
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// `GET /auth/google/callback`: exchange the code, upsert the profile,
/// open a session, and land on the dashboard.
pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackQuery>,
) -> Response {
    let Some(google) = &state.config.google else {
        return (StatusCode::SERVICE_UNAVAILABLE, "Google sign-in not configured").into_response();
    };
    let secure = state.config.cookie_secure;

    if let Some(reason) = params.error.as_deref() {
        warn!(reason, "google sign-in cancelled or denied");
        return Redirect::to("/").into_response();
    }
    let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
        return Redirect::to("/").into_response();
    };

    // Verify OAuth CSRF state from cookie.
    let expected_state = jar.get(OAUTH_STATE_COOKIE_NAME).map(Cookie::value).unwrap_or_default();
    if expected_state.is_empty() || params.state.as_deref() != Some(expected_state) {
        return (StatusCode::UNAUTHORIZED, "invalid oauth state").into_response();
    }

    let access_token = match auth_svc::exchange_code(google, code).await {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "oauth code exchange failed");
            return (StatusCode::BAD_GATEWAY, "OAuth code exchange failed").into_response();
        }
    };

    let google_user = match auth_svc::fetch_google_user(&access_token).await {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "google profile fetch failed");
            return (StatusCode::BAD_GATEWAY, "Failed to fetch Google profile").into_response();
        }
    };

    let user_id = match auth_svc::upsert_google_profile(&state.pool, &google_user).await {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, "profile upsert failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create profile").into_response();
        }
    };

    let token = match state.identity.sign_in(user_id).await {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "session creation failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session").into_response();
        }
    };
    info!(%user_id, "signed in with google");

    let jar = jar
        .add(session_cookie(token, secure, state.config.session_ttl_days))
        .add(clear_cookie(OAUTH_STATE_COOKIE_NAME, secure));
    (jar, Redirect::to("/dashboard")).into_response()
}

#[derive(Debug, Deserialize)]
pub struct DevSignInBody {
    #[serde(default)]
    email: String,
}

/// `POST /auth/dev`: local sign-in by email, no OAuth round trip.
///
/// Enabled only when `DEV_AUTH_BYPASS=true`.
pub async fn dev_sign_in(State(state): State<AppState>, Form(body): Form<DevSignInBody>) -> Response {
    if !state.config.dev_auth_bypass {
        return StatusCode::NOT_FOUND.into_response();
    }
    let Some(email) = auth_svc::normalize_email(&body.email) else {
        return (StatusCode::UNPROCESSABLE_ENTITY, "Please enter a valid email").into_response();
    };

    let user_id = match auth_svc::upsert_email_profile(&state.pool, &email).await {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, "dev profile upsert failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create profile").into_response();
        }
    };

    let token = match state.identity.sign_in(user_id).await {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "session creation failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session").into_response();
        }
    };
    info!(%user_id, "signed in with dev bypass");

    let jar = CookieJar::new().add(session_cookie(token, state.config.cookie_secure, state.config.session_ttl_days));
    (jar, Redirect::to("/dashboard")).into_response()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

//! Google OAuth service: code exchange, profile fetch, profile upsert.

use sqlx::{PgPool, Row};
use url::form_urlencoded;
use uuid::Uuid;

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const GOOGLE_SCOPE: &str = "openid email profile";

/// Google OAuth configuration loaded from environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl GoogleConfig {
    /// Load from `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`, `GOOGLE_REDIRECT_URI`.
    /// Returns `None` if any are missing (sign-in will be disabled).
    pub fn from_lookup<F>(lookup: &F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = lookup("GOOGLE_CLIENT_ID").filter(|v| !v.is_empty())?;
        let client_secret = lookup("GOOGLE_CLIENT_SECRET").filter(|v| !v.is_empty())?;
        let redirect_uri = lookup("GOOGLE_REDIRECT_URI").filter(|v| !v.is_empty())?;
        Some(Self { client_id, client_secret, redirect_uri })
    }

    /// Build the Google authorization URL carrying the CSRF `state`.
    #[must_use]
    pub fn authorize_url(&self, state: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", GOOGLE_SCOPE)
            .append_pair("state", state)
            .append_pair("prompt", "select_account")
            .finish();
        format!("{GOOGLE_AUTHORIZE_URL}?{query}")
    }
}

#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Subset of the OpenID Connect userinfo document.
#[derive(Debug, serde::Deserialize)]
pub struct GoogleUser {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("google token exchange failed: {0}")]
    TokenExchange(String),
    #[error("google api error: {0}")]
    GoogleApi(String),
    #[error("invalid email")]
    InvalidEmail,
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Exchange an OAuth code for an access token.
pub async fn exchange_code(config: &GoogleConfig, code: &str) -> Result<String, AuthError> {
    let client = reqwest::Client::new();
    let resp = client
        .post(GOOGLE_TOKEN_URL)
        .header("Accept", "application/json")
        .form(&[
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

    let body = resp
        .text()
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))?;
    let token_resp: TokenResponse =
        serde_json::from_str(&body).map_err(|_| AuthError::TokenExchange(format!("unexpected response: {body}")))?;
    Ok(token_resp.access_token)
}

/// Fetch the authenticated Google user's profile.
pub async fn fetch_google_user(access_token: &str) -> Result<GoogleUser, AuthError> {
    let client = reqwest::Client::new();
    let resp = client
        .get(GOOGLE_USERINFO_URL)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| AuthError::GoogleApi(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(AuthError::GoogleApi(format!("{status}: {body}")));
    }

    resp.json::<GoogleUser>()
        .await
        .map_err(|e| AuthError::GoogleApi(e.to_string()))
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(normalized)
}

fn name_from_email(email: &str) -> String {
    email
        .split('@')
        .next()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("user")
        .to_owned()
}

/// Upsert a profile from a Google identity. Returns the profile's UUID.
///
/// A profile that already holds the email but has no Google identity (dev
/// sign-in) is linked to `google.sub`. Any other profile holding the email
/// gives it up, since Google now reports it for this account.
pub async fn upsert_google_profile(pool: &PgPool, google: &GoogleUser) -> Result<Uuid, AuthError> {
    let email = google.email.as_deref().and_then(normalize_email);
    let name = google
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .or_else(|| email.as_deref().map(name_from_email))
        .unwrap_or_else(|| "user".to_owned());

    let mut tx = pool.begin().await?;

    if let Some(email) = email.as_deref() {
        sqlx::query(
            r"UPDATE profiles SET google_id = $1
              WHERE email = $2 AND google_id IS NULL
                AND NOT EXISTS (SELECT 1 FROM profiles WHERE google_id = $1)",
        )
        .bind(&google.sub)
        .bind(email)
        .execute(tx.as_mut())
        .await?;

        sqlx::query("UPDATE profiles SET email = NULL WHERE email = $1 AND google_id IS DISTINCT FROM $2")
            .bind(email)
            .bind(&google.sub)
            .execute(tx.as_mut())
            .await?;
    }

    let row = sqlx::query(
        r"INSERT INTO profiles (google_id, email, name)
          VALUES ($1, $2, $3)
          ON CONFLICT (google_id) DO UPDATE SET email = EXCLUDED.email, name = EXCLUDED.name
          RETURNING id",
    )
    .bind(&google.sub)
    .bind(email)
    .bind(name)
    .fetch_one(tx.as_mut())
    .await?;

    tx.commit().await?;
    Ok(row.get("id"))
}

/// Upsert a profile keyed by email (dev sign-in). Returns the profile's UUID.
pub async fn upsert_email_profile(pool: &PgPool, email: &str) -> Result<Uuid, AuthError> {
    let normalized = normalize_email(email).ok_or(AuthError::InvalidEmail)?;
    let row = sqlx::query(
        r"INSERT INTO profiles (email, name)
          VALUES ($1, $2)
          ON CONFLICT (email) DO UPDATE SET name = profiles.name
          RETURNING id",
    )
    .bind(&normalized)
    .bind(name_from_email(&normalized))
    .fetch_one(pool)
    .await?;
    Ok(row.get("id"))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

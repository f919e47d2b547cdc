use super::*;

// =============================================================================
// bytes_to_hex
// =============================================================================

#[test]
fn bytes_to_hex_empty() {
    assert_eq!(bytes_to_hex(&[]), "");
}

#[test]
fn bytes_to_hex_leading_zero() {
    assert_eq!(bytes_to_hex(&[0x0a]), "0a");
}

#[test]
fn bytes_to_hex_multi_byte() {
    assert_eq!(bytes_to_hex(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
}

// =============================================================================
// generate_token / hash_token
// =============================================================================

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_two_calls_differ() {
    assert_ne!(generate_token(), generate_token());
}

#[test]
fn hash_token_is_deterministic_sha256_hex() {
    let a = hash_token("abc");
    assert_eq!(a, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    assert_eq!(a, hash_token("abc"));
}

#[test]
fn hash_token_differs_from_token() {
    let token = generate_token();
    let hashed = hash_token(&token);
    assert_eq!(hashed.len(), 64);
    assert_ne!(hashed, token);
}

// =============================================================================
// SessionUser
// =============================================================================

#[test]
fn display_label_prefers_email() {
    let user = SessionUser { id: Uuid::nil(), email: Some("ada@example.com".into()), name: "ada".into() };
    assert_eq!(user.display_label(), "ada@example.com");
}

#[test]
fn display_label_falls_back_to_name() {
    let user = SessionUser { id: Uuid::nil(), email: None, name: "grace".into() };
    assert_eq!(user.display_label(), "grace");
}

#[test]
fn session_user_serializes_null_email() {
    let user = SessionUser { id: Uuid::nil(), email: None, name: "dave".into() };
    let json = serde_json::to_value(&user).unwrap();
    assert!(json["email"].is_null());
    assert_eq!(json["name"], "dave");
}

// =============================================================================
// PgIdentity (live Postgres)
// =============================================================================

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::state::test_helpers::{live_pool, live_profile};

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn sign_in_get_user_sign_out_round_trip() {
        let pool = live_pool().await;
        let user_id = live_profile(&pool).await;
        let identity = PgIdentity::new(pool.clone(), 30);

        let token = identity.sign_in(user_id).await.expect("sign_in should succeed");
        let user = identity.get_user(&token).await.expect("get_user should succeed");
        assert_eq!(user.map(|u| u.id), Some(user_id));

        let stored: i64 = sqlx::query_scalar("SELECT count(*) FROM sessions WHERE token_hash = $1")
            .bind(hash_token(&token))
            .fetch_one(&pool)
            .await
            .expect("count should succeed");
        assert_eq!(stored, 1);

        identity.sign_out(&token).await.expect("sign_out should succeed");
        assert_eq!(identity.get_user(&token).await.expect("get_user should succeed"), None);
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn expired_and_unknown_tokens_resolve_to_none() {
        let pool = live_pool().await;
        let user_id = live_profile(&pool).await;
        let token = create_session(&pool, user_id, 30).await.expect("create_session should succeed");

        sqlx::query("UPDATE sessions SET expires_at = now() - interval '1 second' WHERE token_hash = $1")
            .bind(hash_token(&token))
            .execute(&pool)
            .await
            .expect("expire should succeed");

        assert_eq!(validate_session(&pool, &token).await.expect("validate should succeed"), None);
        assert_eq!(validate_session(&pool, &generate_token()).await.expect("validate should succeed"), None);
    }
}

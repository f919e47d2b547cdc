use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

// =============================================================================
// parse_bool
// =============================================================================

#[test]
fn parse_bool_true_variants() {
    for val in ["1", "true", "yes", "on", "TRUE", "On", "  yes  "] {
        assert_eq!(parse_bool(val), Some(true), "expected true for {val:?}");
    }
}

#[test]
fn parse_bool_false_variants() {
    for val in ["0", "false", "no", "off", "FALSE", " Off "] {
        assert_eq!(parse_bool(val), Some(false), "expected false for {val:?}");
    }
}

#[test]
fn parse_bool_invalid_returns_none() {
    assert_eq!(parse_bool("maybe"), None);
    assert_eq!(parse_bool(""), None);
}

// =============================================================================
// Config::from_lookup
// =============================================================================

#[test]
fn missing_database_url_is_an_error() {
    let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
    assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    assert_eq!(err.to_string(), "DATABASE_URL required");
}

#[test]
fn blank_database_url_is_an_error() {
    let err = Config::from_lookup(lookup_from(&[("DATABASE_URL", "   ")])).unwrap_err();
    assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
}

#[test]
fn defaults_apply_when_only_database_url_is_set() {
    let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/bm")])).unwrap();
    assert_eq!(config.database_url, "postgres://localhost/bm");
    assert_eq!(config.port, 3000);
    assert_eq!(config.db_max_connections, 5);
    assert_eq!(config.session_ttl_days, 30);
    assert!(!config.cookie_secure);
    assert!(!config.dev_auth_bypass);
    assert!(config.google.is_none());
    assert!(config.static_dir.ends_with("static"));
}

#[test]
fn invalid_port_is_an_error() {
    let err = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x"), ("PORT", "eighty")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    assert!(err.to_string().contains("eighty"));
}

#[test]
fn malformed_numeric_settings_fall_back_to_defaults() {
    let config = Config::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://x"),
        ("DB_MAX_CONNECTIONS", "lots"),
        ("SESSION_TTL_DAYS", "-4"),
    ]))
    .unwrap();
    assert_eq!(config.db_max_connections, 5);
    assert_eq!(config.session_ttl_days, 1);
}

#[test]
fn cookie_secure_inferred_from_https_redirect() {
    let config = Config::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://x"),
        ("GOOGLE_CLIENT_ID", "cid"),
        ("GOOGLE_CLIENT_SECRET", "secret"),
        ("GOOGLE_REDIRECT_URI", "https://bookmarks.example.com/auth/google/callback"),
    ]))
    .unwrap();
    assert!(config.google.is_some());
    assert!(config.cookie_secure);
}

#[test]
fn cookie_secure_explicit_value_wins() {
    let config = Config::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://x"),
        ("COOKIE_SECURE", "off"),
        ("GOOGLE_CLIENT_ID", "cid"),
        ("GOOGLE_CLIENT_SECRET", "secret"),
        ("GOOGLE_REDIRECT_URI", "https://bookmarks.example.com/auth/google/callback"),
    ]))
    .unwrap();
    assert!(!config.cookie_secure);
}

#[test]
fn dev_auth_bypass_and_static_dir_overrides() {
    let config = Config::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://x"),
        ("DEV_AUTH_BYPASS", "yes"),
        ("STATIC_DIR", "/srv/static"),
        ("PORT", "8080"),
    ]))
    .unwrap();
    assert!(config.dev_auth_bypass);
    assert_eq!(config.static_dir, PathBuf::from("/srv/static"));
    assert_eq!(config.port, 8080);
}

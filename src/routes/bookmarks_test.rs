use super::*;
use crate::state::test_helpers::{dummy_user, test_app};
use axum::body::to_bytes;

fn auth_for(user: &crate::services::session::SessionUser) -> AuthUser {
    AuthUser { user: user.clone(), token: "test-token".into() }
}

async fn error_body(resp: Response) -> (StatusCode, String) {
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json["error"].as_str().unwrap_or_default().to_owned())
}

// =============================================================================
// status mapping
// =============================================================================

#[test]
fn form_errors_map_to_statuses() {
    assert_eq!(form_error_to_status(&FormError::MissingFields), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(form_error_to_status(&FormError::InvalidUrl), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(form_error_to_status(&FormError::NotSetUp), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(form_error_to_status(&FormError::Rejected("x".into())), StatusCode::BAD_GATEWAY);
    assert_eq!(form_error_to_status(&FormError::Unexpected), StatusCode::BAD_GATEWAY);
}

#[test]
fn store_errors_map_to_api_errors() {
    let id = Uuid::new_v4();
    assert!(matches!(ApiError::from_store(StoreError::NotFound(id), LOAD_FAILED), ApiError::NotFound));
    assert!(matches!(
        ApiError::from_store(StoreError::MissingRelation("relation".into()), LOAD_FAILED),
        ApiError::NotSetUp
    ));
    assert!(matches!(
        ApiError::from_store(StoreError::Unavailable("timeout".into()), DELETE_FAILED),
        ApiError::Failed(DELETE_FAILED)
    ));
}

#[tokio::test]
async fn api_error_body_is_json() {
    let (status, msg) = error_body(ApiError::NotSetUp.into_response()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(msg, NOT_SET_UP);
}

// =============================================================================
// handlers
// =============================================================================

#[tokio::test]
async fn list_returns_only_callers_rows_newest_first() {
    let app = test_app();
    let user = dummy_user();
    app.store.seed(user.id, "old", "https://a.example");
    app.store.seed(Uuid::new_v4(), "someone else", "https://b.example");
    app.store.seed(user.id, "new", "https://c.example");

    let Json(rows) = list_bookmarks(State(app.state.clone()), auth_for(&user)).await.unwrap();

    let titles: Vec<&str> = rows.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, ["new", "old"]);
}

#[tokio::test]
async fn list_failure_is_bad_gateway() {
    let app = test_app();
    app.store.fail_list(StoreError::Unavailable("down".into()));

    let err = list_bookmarks(State(app.state.clone()), auth_for(&dummy_user())).await.unwrap_err();
    let (status, msg) = error_body(err.into_response()).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(msg, LOAD_FAILED);
}

#[tokio::test]
async fn create_returns_created_row() {
    let app = test_app();
    let user = dummy_user();
    let body = CreateBookmarkBody { title: " Example ".into(), url: "https://example.com".into() };

    let (status, Json(row)) = create_bookmark(State(app.state.clone()), auth_for(&user), Json(body)).await.unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(row.title, "Example");
    assert_eq!(row.user_id, user.id);
}

#[tokio::test]
async fn create_invalid_url_is_unprocessable_without_store_call() {
    let app = test_app();
    let body = CreateBookmarkBody { title: "Bad".into(), url: "not-a-url".into() };

    let err = create_bookmark(State(app.state.clone()), auth_for(&dummy_user()), Json(body)).await.unwrap_err();
    let (status, msg) = error_body(err.into_response()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(msg, "Please enter a valid URL");
    assert_eq!(app.store.insert_calls(), 0);
}

#[tokio::test]
async fn create_with_missing_table_is_unavailable() {
    let app = test_app();
    app.store.fail_insert(StoreError::MissingRelation("relation \"bookmarks\" does not exist".into()));
    let body = CreateBookmarkBody { title: "x".into(), url: "https://x.example".into() };

    let err = create_bookmark(State(app.state.clone()), auth_for(&dummy_user()), Json(body)).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn delete_own_row_is_no_content() {
    let app = test_app();
    let user = dummy_user();
    let row = app.store.seed(user.id, "x", "https://x.example");

    let status = delete_bookmark(State(app.state.clone()), auth_for(&user), Path(row.id)).await.unwrap();

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.store.rows().is_empty());
}

#[tokio::test]
async fn delete_other_users_row_is_not_found() {
    let app = test_app();
    let row = app.store.seed(Uuid::new_v4(), "theirs", "https://x.example");

    let err = delete_bookmark(State(app.state.clone()), auth_for(&dummy_user()), Path(row.id)).await.unwrap_err();

    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.store.rows().len(), 1);
}

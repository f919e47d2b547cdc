use super::*;
use crate::state::test_helpers::MemoryStore;

#[test]
fn refresh_token_increments() {
    let mut token = RefreshToken::default();
    assert_eq!(token, RefreshToken(0));
    token.bump();
    token.bump();
    assert_eq!(token, RefreshToken(2));
    assert!(token > RefreshToken::default());
    assert!(token.next() > token);
    assert!(RefreshToken(u64::MAX).next() >= RefreshToken(u64::MAX));
}

#[tokio::test]
async fn mount_fetches_once() {
    let store = MemoryStore::new();
    let user = Uuid::new_v4();
    store.seed(user, "a", "https://a.example");
    let mut dash = DashboardContent::new(user);

    dash.mount(&store).await;
    dash.mount(&store).await;

    assert_eq!(store.list_calls(), 1);
    assert_eq!(dash.list.items().len(), 1);
}

#[tokio::test]
async fn successful_add_bumps_token_and_refreshes_list() {
    let store = MemoryStore::new();
    let user = Uuid::new_v4();
    let mut dash = DashboardContent::new(user);
    dash.mount(&store).await;
    let before = dash.refresh_token();

    dash.add_bookmark(&store, "Example", "https://example.com").await.unwrap();

    assert_eq!(dash.refresh_token(), before.next());
    assert_eq!(store.list_calls(), 2);
    assert_eq!(dash.list.items()[0].title, "Example");
    assert_eq!(dash.form, AddBookmarkForm::default());
}

#[tokio::test]
async fn failed_add_leaves_token_and_list_alone() {
    let store = MemoryStore::new();
    let user = Uuid::new_v4();
    let mut dash = DashboardContent::new(user);
    dash.mount(&store).await;

    let err = dash.add_bookmark(&store, "Bad", "not-a-url").await.unwrap_err();

    assert_eq!(err, FormError::InvalidUrl);
    assert_eq!(dash.refresh_token(), RefreshToken::default());
    assert_eq!(store.list_calls(), 1);
    assert_eq!(dash.form.title, "Bad");
}

#[tokio::test]
async fn add_on_fresh_dashboard_fetches_list() {
    let store = MemoryStore::new();
    let user = Uuid::new_v4();
    store.seed(user, "existing", "https://a.example");
    let mut dash = DashboardContent::new(user);

    dash.add_bookmark(&store, "new", "https://b.example").await.unwrap();

    let titles: Vec<&str> = dash.list.items().iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, ["new", "existing"]);
}

#[tokio::test]
async fn delete_goes_through_list() {
    let store = MemoryStore::new();
    let user = Uuid::new_v4();
    let row = store.seed(user, "gone", "https://a.example");
    let mut dash = DashboardContent::new(user);

    dash.delete_bookmark(&store, row.id).await.unwrap();

    assert!(dash.list.items().is_empty());
    assert!(store.rows().is_empty());
}

#[tokio::test]
async fn render_contains_both_cards() {
    let store = MemoryStore::new();
    let mut dash = DashboardContent::new(Uuid::new_v4());
    dash.mount(&store).await;

    let html = dash.render();
    let form_at = html.find("id=\"add-bookmark\"").unwrap();
    let list_at = html.find("id=\"bookmarks\"").unwrap();
    assert!(form_at < list_at);
}

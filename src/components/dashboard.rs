//! Dashboard content: the add form and the list, wired through a refresh token.
//!
//! DESIGN
//! ======
//! The form and list never reference each other. The container owns a
//! monotonically increasing [`RefreshToken`]; the form's success callback
//! bumps it and the list re-fetches whenever the token it last saw differs.

use uuid::Uuid;

use super::add_form::{AddBookmarkForm, FormError};
use super::bookmark_list::BookmarkList;
use crate::services::bookmarks::{Bookmark, BookmarkStore, StoreError};

/// Counter that changes once per successful add.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefreshToken(u64);

impl RefreshToken {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub fn bump(&mut self) {
        *self = self.next();
    }
}

#[derive(Debug, Clone)]
pub struct DashboardContent {
    user_id: Uuid,
    pub form: AddBookmarkForm,
    pub list: BookmarkList,
    refresh: RefreshToken,
}

impl DashboardContent {
    #[must_use]
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            form: AddBookmarkForm::default(),
            list: BookmarkList::new(user_id),
            refresh: RefreshToken::default(),
        }
    }

    #[must_use]
    pub fn refresh_token(&self) -> RefreshToken {
        self.refresh
    }

    /// Initial fetch for the list. No-op once the list is in sync.
    pub async fn mount(&mut self, store: &dyn BookmarkStore) {
        self.list.sync(store, self.user_id, self.refresh).await;
    }

    /// Submit the form with `title`/`url`; on success the list re-fetches.
    ///
    /// # Errors
    ///
    /// Returns the form's error; the list and token are left untouched.
    pub async fn add_bookmark(
        &mut self,
        store: &dyn BookmarkStore,
        title: &str,
        url: &str,
    ) -> Result<Bookmark, FormError> {
        self.form.title = title.to_owned();
        self.form.url = url.to_owned();

        let owner = self.user_id;
        let refresh = &mut self.refresh;
        let added = self.form.submit(store, owner, || refresh.bump()).await?;

        self.list.sync(store, owner, self.refresh).await;
        Ok(added)
    }

    /// Make sure the list has been fetched, then delete `id` through it.
    ///
    /// # Errors
    ///
    /// Returns the store error; the list shows a notice.
    pub async fn delete_bookmark(&mut self, store: &dyn BookmarkStore, id: Uuid) -> Result<(), StoreError> {
        self.mount(store).await;
        self.list.delete(store, id).await
    }

    /// Form card followed by the list card.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "<div class=\"dashboard-content\">\n{}\n{}\n</div>",
            self.form.render(),
            self.list.render()
        )
    }
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;

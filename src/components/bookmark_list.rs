//! Bookmark list: fetch, render, and delete the current user's bookmarks.
//!
//! DESIGN
//! ======
//! The displayed set is only ever replaced by a full re-fetch; nothing is
//! removed optimistically. A fetch happens on first sync and whenever the
//! owner or the refresh token handed down by the dashboard changes.
//!
//! ERROR HANDLING
//! ==============
//! A failed fetch keeps the previous rows and sets a notice. A failed delete
//! sets a notice and does not re-fetch; the row stays as it was.

use time::OffsetDateTime;
use tracing::{error, warn};
use uuid::Uuid;

use super::dashboard::RefreshToken;
use crate::html::{escape, safe_href};
use crate::services::bookmarks::{Bookmark, BookmarkStore, StoreError};

pub const NOT_SET_UP: &str = "Database not set up. Please run the SQL setup scripts.";
pub const LOAD_FAILED: &str = "Failed to load bookmarks. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete bookmark. Please try again.";
pub const DELETING_LABEL: &str = "Deleting...";

/// What the list currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListView<'a> {
    Loading,
    Empty,
    Populated(&'a [Bookmark]),
}

#[derive(Debug, Clone)]
pub struct BookmarkList {
    owner: Uuid,
    trigger: RefreshToken,
    fetched: bool,
    loading: bool,
    items: Vec<Bookmark>,
    deleting: Option<Uuid>,
    notice: Option<String>,
}

impl BookmarkList {
    /// A list for `owner` that has not fetched yet (renders as loading).
    #[must_use]
    pub fn new(owner: Uuid) -> Self {
        Self {
            owner,
            trigger: RefreshToken::default(),
            fetched: false,
            loading: true,
            items: Vec::new(),
            deleting: None,
            notice: None,
        }
    }

    /// Re-fetch if this is the first sync or `owner`/`trigger` changed.
    /// Returns whether a fetch was issued.
    pub async fn sync(&mut self, store: &dyn BookmarkStore, owner: Uuid, trigger: RefreshToken) -> bool {
        if self.fetched && owner == self.owner && trigger == self.trigger {
            return false;
        }
        self.owner = owner;
        self.trigger = trigger;
        self.fetch(store).await;
        true
    }

    /// Fetch all bookmarks for the owner and replace the displayed set.
    pub async fn fetch(&mut self, store: &dyn BookmarkStore) {
        self.loading = true;
        match store.list(self.owner).await {
            Ok(mut rows) => {
                sort_newest_first(&mut rows);
                self.items = rows;
                self.notice = None;
            }
            Err(e @ StoreError::MissingRelation(_)) => {
                warn!(error = %e, "bookmarks table missing; run the SQL setup migrations");
                self.notice = Some(NOT_SET_UP.to_owned());
            }
            Err(e) => {
                error!(error = %e, owner = %self.owner, "error fetching bookmarks");
                self.notice = Some(LOAD_FAILED.to_owned());
            }
        }
        self.fetched = true;
        self.loading = false;
    }

    /// Delete one bookmark, then re-fetch on success.
    ///
    /// # Errors
    ///
    /// Returns the store error; the list keeps its rows and shows a notice.
    pub async fn delete(&mut self, store: &dyn BookmarkStore, id: Uuid) -> Result<(), StoreError> {
        self.deleting = Some(id);
        let result = store.delete(self.owner, id).await;
        match &result {
            Ok(()) => self.fetch(store).await,
            Err(e) => {
                error!(error = %e, bookmark_id = %id, "error deleting bookmark");
                self.notice = Some(DELETE_FAILED.to_owned());
            }
        }
        self.deleting = None;
        result
    }

    #[must_use]
    pub fn view(&self) -> ListView<'_> {
        if self.loading {
            ListView::Loading
        } else if self.items.is_empty() {
            ListView::Empty
        } else {
            ListView::Populated(&self.items)
        }
    }

    #[must_use]
    pub fn items(&self) -> &[Bookmark] {
        &self.items
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    #[must_use]
    pub fn is_deleting(&self, id: Uuid) -> bool {
        self.deleting == Some(id)
    }

    /// Render the list card for the current view.
    #[must_use]
    pub fn render(&self) -> String {
        let notice = self
            .notice
            .as_deref()
            .map(|n| format!(r#"<div class="alert alert-error" role="alert">{}</div>"#, escape(n)))
            .unwrap_or_default();

        match self.view() {
            ListView::Loading => format!(
                r#"<section class="card" id="bookmarks">{notice}<p class="muted loading">Loading bookmarks...</p></section>"#
            ),
            ListView::Empty => format!(
                r#"<section class="card empty" id="bookmarks">{notice}
  <h3>No bookmarks yet</h3>
  <p class="muted">Add your first bookmark to get started!</p>
</section>"#
            ),
            ListView::Populated(items) => {
                let rows: String = items.iter().map(|b| self.render_row(b)).collect();
                format!(
                    r#"<section class="card" id="bookmarks">
  <h2 class="card-title"><span>Your Bookmarks</span><span class="count">{count}</span></h2>
  {notice}
  <ul class="bookmarks">
{rows}  </ul>
</section>"#,
                    count = count_label(items.len()),
                )
            }
        }
    }

    fn render_row(&self, bookmark: &Bookmark) -> String {
        let title = escape(&bookmark.title);
        let url_text = escape(&bookmark.url);
        let link = match safe_href(&bookmark.url) {
            Some(href) => format!(r#"<a href="{href}" target="_blank" rel="noopener noreferrer">{url_text}</a>"#),
            None => format!(r#"<span class="url">{url_text}</span>"#),
        };
        let (disabled, label) = if self.is_deleting(bookmark.id) { (" disabled", DELETING_LABEL) } else { ("", "Delete") };

        format!(
            r#"    <li class="bookmark" id="bookmark-{id}">
      <div class="bookmark-body">
        <h3>{title}</h3>
        {link}
        <p class="meta">Added {added}</p>
      </div>
      <form method="post" action="/dashboard/bookmarks/{id}/delete">
        <button type="submit" class="btn btn-danger" title="Delete bookmark" data-busy-label="{busy_label}"{disabled}>{label}</button>
      </form>
    </li>
"#,
            id = bookmark.id,
            added = format_date(bookmark.created_at),
            busy_label = DELETING_LABEL,
        )
    }
}

/// Stable sort by `created_at`, newest first.
pub fn sort_newest_first(rows: &mut [Bookmark]) {
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// "1 bookmark" / "N bookmarks".
#[must_use]
pub fn count_label(n: usize) -> String {
    if n == 1 { "1 bookmark".to_owned() } else { format!("{n} bookmarks") }
}

/// `M/D/YYYY`, as shown under each entry.
#[must_use]
pub fn format_date(at: OffsetDateTime) -> String {
    format!("{}/{}/{}", u8::from(at.month()), at.day(), at.year())
}

#[cfg(test)]
#[path = "bookmark_list_test.rs"]
mod tests;

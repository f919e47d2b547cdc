//! Add-bookmark form: validation, submission, and its HTML fragment.
//!
//! DESIGN
//! ======
//! Validation runs before any store call. A successful insert clears both
//! fields and invokes the caller's `on_added` callback; that callback is the
//! only way the form talks to its siblings.

use tracing::{error, warn};
use uuid::Uuid;

use crate::html::escape;
use crate::services::bookmarks::{Bookmark, BookmarkStore, NewBookmark, StoreError};

/// Submit label while an add is in flight. `static/app.js` swaps it in from
/// `data-busy-label` as soon as the browser posts the form.
pub const ADDING_LABEL: &str = "Adding...";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Please enter a valid URL")]
    InvalidUrl,
    #[error("Database not set up. Please run the SQL setup scripts.")]
    NotSetUp,
    #[error("Failed to add bookmark: {0}")]
    Rejected(String),
    #[error("Failed to add bookmark. Please try again.")]
    Unexpected,
}

impl FormError {
    /// True for errors caught before any store call.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingFields | Self::InvalidUrl)
    }
}

impl From<StoreError> for FormError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingRelation(_) => Self::NotSetUp,
            StoreError::Backend(message) if message.trim().is_empty() => Self::Rejected("Unknown error".into()),
            StoreError::Backend(message) => Self::Rejected(message),
            StoreError::Unavailable(_) | StoreError::NotFound(_) => Self::Unexpected,
        }
    }
}

/// Title and URL that passed validation, already trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkDraft {
    pub title: String,
    pub url: String,
}

/// Validate raw form input.
///
/// # Errors
///
/// [`FormError::MissingFields`] if either field is blank, otherwise
/// [`FormError::InvalidUrl`] if the URL does not parse.
pub fn validate(title: &str, url: &str) -> Result<BookmarkDraft, FormError> {
    if url.trim().is_empty() || title.trim().is_empty() {
        return Err(FormError::MissingFields);
    }
    if url::Url::parse(url).is_err() {
        return Err(FormError::InvalidUrl);
    }
    Ok(BookmarkDraft { title: title.trim().to_owned(), url: url.trim().to_owned() })
}

/// Form state: current input, last error, and the in-flight flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddBookmarkForm {
    pub title: String,
    pub url: String,
    pub error: Option<FormError>,
    /// Set only for the duration of `submit`. A page render never sees it
    /// set; the browser shows the same state from the button's
    /// `data-busy-label` until the response arrives.
    pub busy: bool,
}

impl AddBookmarkForm {
    #[must_use]
    pub fn with_input(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self { title: title.into(), url: url.into(), ..Self::default() }
    }

    /// Validate and insert the current input on behalf of `owner`.
    ///
    /// # Errors
    ///
    /// Returns the [`FormError`] that is also stored in `self.error`.
    pub async fn submit<F>(&mut self, store: &dyn BookmarkStore, owner: Uuid, on_added: F) -> Result<Bookmark, FormError>
    where
        F: FnOnce(),
    {
        self.error = None;

        let draft = match validate(&self.title, &self.url) {
            Ok(draft) => draft,
            Err(e) => {
                self.error = Some(e.clone());
                return Err(e);
            }
        };

        self.busy = true;
        let result = store
            .insert(NewBookmark { user_id: owner, url: draft.url, title: draft.title })
            .await;
        self.busy = false;

        match result {
            Ok(bookmark) => {
                self.title.clear();
                self.url.clear();
                on_added();
                Ok(bookmark)
            }
            Err(e) => {
                match &e {
                    StoreError::MissingRelation(_) => {
                        warn!(error = %e, "bookmarks table missing; run the SQL setup migrations");
                    }
                    _ => error!(error = %e, %owner, "error adding bookmark"),
                }
                let form_error = FormError::from(e);
                self.error = Some(form_error.clone());
                Err(form_error)
            }
        }
    }

    /// Render the form card.
    #[must_use]
    pub fn render(&self) -> String {
        let disabled = if self.busy { " disabled" } else { "" };
        let button_label = if self.busy { ADDING_LABEL } else { "Add Bookmark" };
        let error = self
            .error
            .as_ref()
            .map(|e| format!(r#"<div class="alert alert-error" role="alert">{}</div>"#, escape(&e.to_string())))
            .unwrap_or_default();

        format!(
            r#"<section class="card" id="add-bookmark">
  <h2 class="card-title">Add New Bookmark</h2>
  <form method="post" action="/dashboard/bookmarks" class="stack" novalidate>
    <label for="title">Title</label>
    <input type="text" id="title" name="title" value="{title}" placeholder="My Awesome Website"{disabled}>
    <label for="url">URL</label>
    <input type="text" id="url" name="url" value="{url}" placeholder="https://example.com"{disabled}>
    {error}
    <button type="submit" class="btn btn-primary" data-busy-label="{busy_label}"{disabled}>{button_label}</button>
  </form>
</section>"#,
            title = escape(&self.title),
            url = escape(&self.url),
            busy_label = ADDING_LABEL,
        )
    }
}

#[cfg(test)]
#[path = "add_form_test.rs"]
mod tests;

//! Server-side UI components. Each one is plain state plus a `render`
//! method; page handlers drive them once per request.

pub mod add_form;
pub mod bookmark_list;
pub mod dashboard;

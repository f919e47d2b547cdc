//! Domain services used by HTTP routes and page components.
//!
//! ARCHITECTURE
//! ============
//! Service modules own persistence and third-party concerns so route
//! handlers can stay focused on request translation and auth plumbing.

pub mod auth;
pub mod bookmarks;
pub mod session;

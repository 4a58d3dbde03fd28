//! HTTP server for gitpad.
//!
//! Exposes the document store as a small JSON API for the browser editor.

pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;

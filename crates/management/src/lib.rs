//! Tenant-facing dashboard API: instance lifecycle, contacts and lists,
//! campaign CRUD and triggering, media storage, and the dashboard read
//! endpoints.

pub mod actions;
pub mod auth;
pub mod handlers;
pub mod models;
pub mod router;

pub use actions::AppState;
pub use router::api_router;

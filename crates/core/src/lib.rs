//! Shared types, error taxonomy, configuration, and collaborator seams for
//! the CampZap campaign dashboard backend.

pub mod config;
pub mod error;
pub mod sources;
pub mod types;

pub use config::AppConfig;
pub use error::{DashboardError, DashboardResult};
pub use sources::{ContactCounter, DispatchEventSource};

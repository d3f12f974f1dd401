//! Tenant-scoped data store and realtime change feed.
//!
//! In-memory DashMap tables for development and testing; the API surface is
//! the row-level-security contract a PostgreSQL deployment would enforce.

pub mod changes;
pub mod seed;
pub mod store;

pub use changes::{InstanceChange, InstanceMirror};
pub use seed::seed_demo_tenant;
pub use store::{CampaignPatch, NewCampaign, NewContact, TenantStore};

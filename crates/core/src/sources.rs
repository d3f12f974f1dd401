//! Collaborator seams shared across crates.
//!
//! Modules accept `Arc<dyn ...>` handles instead of module-level client
//! singletons, so every operation runs against an explicitly injected,
//! request-scoped dependency and tests can swap in failing fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DashboardResult;
use crate::types::DispatchEvent;

/// Read access to the tenant-scoped dispatch-event log.
///
/// The reporting layer treats every failure from this seam as transient and
/// degrades to empty/zero results instead of propagating.
#[async_trait]
pub trait DispatchEventSource: Send + Sync {
    /// Count of events whose sent timestamp is non-null.
    async fn count_sent(&self, tenant_id: Uuid) -> DashboardResult<u64>;

    /// Count of events whose delivered timestamp is non-null.
    async fn count_delivered(&self, tenant_id: Uuid) -> DashboardResult<u64>;

    /// Count of events whose read timestamp is non-null.
    async fn count_read(&self, tenant_id: Uuid) -> DashboardResult<u64>;

    /// All events created at or after `start`, ascending by creation time.
    async fn events_since(
        &self,
        tenant_id: Uuid,
        start: DateTime<Utc>,
    ) -> DashboardResult<Vec<DispatchEvent>>;

    /// Most recent events, descending by creation time.
    async fn recent(&self, tenant_id: Uuid, limit: usize) -> DashboardResult<Vec<DispatchEvent>>;
}

/// Lazy contact-count lookup used by the dispatch wizard when the user
/// advances past the list-selection step.
#[async_trait]
pub trait ContactCounter: Send + Sync {
    /// Number of contacts in the given list. Errors when the list does not
    /// belong to the tenant.
    async fn count_list_contacts(&self, tenant_id: Uuid, list_id: Uuid) -> DashboardResult<u64>;
}

//! Dashboard aggregation over the dispatch-event log.
//!
//! Read paths are fail-soft: a failing source is logged and degrades to
//! zeros/empty results, favoring availability over error transparency.

use std::sync::Arc;

use chrono::{Duration, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use campzap_core::sources::DispatchEventSource;

use crate::activity::{self, RecentActivityItem};
use crate::chart::{bucket_events, ChartPoint};

pub const DEFAULT_CHART_DAYS: u32 = 7;
/// Upper bound on the chart window. `days` arrives from the client; an
/// unbounded value would overflow the timestamp arithmetic and allocate one
/// bucket per requested day.
pub const MAX_CHART_DAYS: u32 = 365;
const RECENT_ACTIVITY_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_sent: u64,
    pub delivered: u64,
    pub read: u64,
    pub delivery_rate: f64,
    pub read_rate: f64,
}

pub struct DashboardReporter {
    events: Arc<dyn DispatchEventSource>,
}

impl DashboardReporter {
    pub fn new(events: Arc<dyn DispatchEventSource>) -> Self {
        Self { events }
    }

    /// Sent/delivered/read counts and derived rates for a tenant.
    ///
    /// Counts are strictly per column: an event with `read_at` set but
    /// `delivered_at` null counts toward read and not delivered.
    pub async fn stats(&self, tenant_id: Uuid) -> DashboardStats {
        let (sent, delivered, read) = tokio::join!(
            self.events.count_sent(tenant_id),
            self.events.count_delivered(tenant_id),
            self.events.count_read(tenant_id),
        );

        let (sent, delivered, read) = match (sent, delivered, read) {
            (Ok(s), Ok(d), Ok(r)) => (s, d, r),
            (s, d, r) => {
                let e = [s.err(), d.err(), r.err()]
                    .into_iter()
                    .flatten()
                    .next()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                error!(tenant_id = %tenant_id, error = %e, "Error fetching dashboard stats");
                return DashboardStats::default();
            }
        };

        DashboardStats {
            total_sent: sent,
            delivered,
            read,
            delivery_rate: if sent > 0 {
                delivered as f64 / sent as f64 * 100.0
            } else {
                0.0
            },
            read_rate: if delivered > 0 {
                read as f64 / delivered as f64 * 100.0
            } else {
                0.0
            },
        }
    }

    /// One chart entry per day of the trailing window, oldest first.
    /// Days are bucketed at display granularity (server-local calendar day).
    /// The window is clamped to `1..=MAX_CHART_DAYS`.
    pub async fn chart_data(&self, tenant_id: Uuid, days: u32) -> Vec<ChartPoint> {
        let days = days.clamp(1, MAX_CHART_DAYS);
        // Over-fetch by up to a day; bucketing drops out-of-window rows.
        let start = Utc::now() - Duration::days(days as i64);
        let events = match self.events.events_since(tenant_id, start).await {
            Ok(events) => events,
            Err(e) => {
                error!(tenant_id = %tenant_id, error = %e, "Error fetching chart data");
                return Vec::new();
            }
        };

        let today = Local::now().date_naive();
        bucket_events(&events, today, days, |event| {
            event.created_at.with_timezone(&Local).date_naive()
        })
    }

    /// The five most recent dispatch events, resolved to display rows.
    pub async fn recent_activity(&self, tenant_id: Uuid) -> Vec<RecentActivityItem> {
        match self.events.recent(tenant_id, RECENT_ACTIVITY_LIMIT).await {
            Ok(events) => events.iter().map(activity::resolve).collect(),
            Err(e) => {
                error!(tenant_id = %tenant_id, error = %e, "Error fetching recent activity");
                Vec::new()
            }
        }
    }
}

//! Dashboard analytics — delivery stats, time-bucketed charts, and recent
//! activity, aggregated from the tenant's dispatch-event log.

pub mod activity;
pub mod chart;
pub mod dashboard;

pub use activity::RecentActivityItem;
pub use chart::ChartPoint;
pub use dashboard::{DashboardReporter, DashboardStats, DEFAULT_CHART_DAYS, MAX_CHART_DAYS};

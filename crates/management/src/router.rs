//! API router — mounts the dashboard endpoints under /api/v1.

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::actions::AppState;
use crate::auth::auth_middleware;
use crate::handlers;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Dashboard
        .route("/api/v1/dashboard/overview", get(handlers::dashboard_overview))
        .route("/api/v1/dashboard/stats", get(handlers::dashboard_stats))
        .route("/api/v1/dashboard/chart", get(handlers::dashboard_chart))
        .route("/api/v1/dashboard/activity", get(handlers::dashboard_activity))
        // Instances
        .route("/api/v1/instances", get(handlers::list_instances).post(handlers::create_instance))
        .route("/api/v1/instances/{id}", delete(handlers::delete_instance))
        .route("/api/v1/instances/{id}/start", post(handlers::start_instance))
        .route("/api/v1/instances/{id}/pause", post(handlers::pause_instance))
        .route("/api/v1/instances/{id}/status", post(handlers::update_instance_status))
        // Contacts & lists
        .route("/api/v1/contacts", get(handlers::list_contacts))
        .route("/api/v1/contacts/upload", post(handlers::upload_contacts))
        .route("/api/v1/contact-lists", get(handlers::list_contact_lists).post(handlers::create_contact_list))
        .route("/api/v1/contact-lists/{id}", delete(handlers::delete_contact_list))
        .route("/api/v1/contact-lists/{id}/count", get(handlers::contact_list_count))
        // Campaigns
        .route("/api/v1/campaigns", get(handlers::list_campaigns).post(handlers::create_campaign))
        .route("/api/v1/campaigns/{id}", get(handlers::get_campaign).put(handlers::update_campaign).delete(handlers::delete_campaign))
        .route("/api/v1/campaigns/trigger", post(handlers::trigger_campaign))
        // Media storage
        .route("/api/v1/files", get(handlers::list_files).delete(handlers::delete_file))
        .route("/api/v1/files/presign", post(handlers::presign_upload))
        .layer(middleware::from_fn(auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

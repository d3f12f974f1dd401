//! Axum REST handlers. Thin extract/delegate/respond wrappers around
//! [`AppState`]; tenant identity always comes from the auth extension.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use campzap_core::error::DashboardError;
use campzap_core::types::{Campaign, Contact, ContactList, InstanceAction};
use campzap_reporting::{ChartPoint, DashboardStats, RecentActivityItem, DEFAULT_CHART_DAYS};
use campzap_storage::{PresignedUpload, StorageFile};

use crate::actions::AppState;
use crate::auth::TenantId;
use crate::models::*;

type ApiError = (StatusCode, Json<ActionResult>);

fn reject(e: DashboardError) -> ApiError {
    let status = match e {
        DashboardError::TenantNotIdentified | DashboardError::Unauthorized => {
            StatusCode::UNAUTHORIZED
        }
        DashboardError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DashboardError::NotFound => StatusCode::NOT_FOUND,
        DashboardError::Webhook(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ActionResult::err(e.user_message())))
}

// ─── Health ────────────────────────────────────────────────────────────────

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

// ─── Dashboard reads ───────────────────────────────────────────────────────

pub async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
) -> Json<DashboardStats> {
    Json(state.reporter.stats(tenant).await)
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub days: Option<u32>,
}

pub async fn dashboard_chart(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
    Query(query): Query<ChartQuery>,
) -> Json<Vec<ChartPoint>> {
    let days = query.days.unwrap_or(DEFAULT_CHART_DAYS);
    Json(state.reporter.chart_data(tenant, days).await)
}

pub async fn dashboard_activity(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
) -> Json<Vec<RecentActivityItem>> {
    Json(state.reporter.recent_activity(tenant).await)
}

#[derive(Debug, Serialize)]
pub struct DashboardOverview {
    pub stats: DashboardStats,
    pub chart: Vec<ChartPoint>,
    pub recent_activity: Vec<RecentActivityItem>,
}

/// The three dashboard reads in one response, fetched concurrently.
pub async fn dashboard_overview(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
) -> Json<DashboardOverview> {
    let (stats, chart, recent_activity) = tokio::join!(
        state.reporter.stats(tenant),
        state.reporter.chart_data(tenant, DEFAULT_CHART_DAYS),
        state.reporter.recent_activity(tenant),
    );
    Json(DashboardOverview {
        stats,
        chart,
        recent_activity,
    })
}

// ─── Instances ─────────────────────────────────────────────────────────────

pub async fn list_instances(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
) -> Json<Vec<InstanceView>> {
    Json(
        state
            .store
            .list_instances(tenant)
            .into_iter()
            .map(InstanceView::from)
            .collect(),
    )
}

pub async fn create_instance(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
    Json(req): Json<CreateInstanceRequest>,
) -> Result<(StatusCode, Json<InstanceView>), ApiError> {
    let instance = state.create_instance(tenant, &req.name).map_err(reject)?;
    metrics::counter!("campzap.instances.created").increment(1);
    Ok((StatusCode::CREATED, Json(instance.into())))
}

pub async fn start_instance(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResult>, ApiError> {
    state
        .sync_instance(tenant, id, InstanceAction::Qrcode)
        .await
        .map_err(reject)?;
    Ok(Json(ActionResult::ok()))
}

pub async fn pause_instance(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResult>, ApiError> {
    state
        .sync_instance(tenant, id, InstanceAction::Pause)
        .await
        .map_err(reject)?;
    Ok(Json(ActionResult::ok()))
}

pub async fn delete_instance(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResult>, ApiError> {
    state.delete_instance(tenant, id).await.map_err(reject)?;
    metrics::counter!("campzap.instances.deleted").increment(1);
    Ok(Json(ActionResult::ok()))
}

/// Status callback from the integration service.
pub async fn update_instance_status(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
    Path(id): Path<Uuid>,
    Json(req): Json<InstanceStatusUpdate>,
) -> Result<Json<InstanceView>, ApiError> {
    state
        .store
        .update_instance_status(tenant, id, req.status, req.phone, req.qr_code)
        .map(|instance| Json(instance.into()))
        .ok_or_else(|| reject(DashboardError::NotFound))
}

// ─── Contacts & lists ──────────────────────────────────────────────────────

pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
) -> Json<Vec<Contact>> {
    Json(state.store.list_contacts(tenant))
}

pub async fn list_contact_lists(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
) -> Json<Vec<ContactList>> {
    Json(state.store.list_contact_lists(tenant))
}

pub async fn create_contact_list(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
    Json(req): Json<CreateListRequest>,
) -> Result<(StatusCode, Json<ContactList>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(reject(DashboardError::Validation(
            "List name is required.".to_string(),
        )));
    }
    let list = state.store.insert_contact_list(tenant, req.name.trim());
    Ok((StatusCode::CREATED, Json(list)))
}

pub async fn contact_list_count(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ListContactCount>, ApiError> {
    use campzap_core::sources::ContactCounter;
    let count = state
        .store
        .count_list_contacts(tenant, id)
        .await
        .map_err(reject)?;
    Ok(Json(ListContactCount { list_id: id, count }))
}

pub async fn delete_contact_list(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResult>, ApiError> {
    if state.store.delete_contact_list(tenant, id) {
        Ok(Json(ActionResult::ok()))
    } else {
        Err(reject(DashboardError::NotFound))
    }
}

/// Multipart contact upload: a `file` part plus an optional `list_name`.
pub async fn upload_contacts(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut list_name = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        reject(DashboardError::Validation(format!("Bad upload: {e}")))
    })? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or("contacts.csv").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    reject(DashboardError::Validation(format!("Bad upload: {e}")))
                })?;
                file = Some((name, bytes.to_vec()));
            }
            Some("list_name") => {
                list_name = field.text().await.ok().filter(|t| !t.is_empty());
            }
            _ => {}
        }
    }

    let (file_name, file_bytes) = file.ok_or_else(|| {
        reject(DashboardError::Validation(
            "A contact file is required.".to_string(),
        ))
    })?;

    let summary = state
        .upload_contacts(tenant, list_name, file_name, file_bytes)
        .await
        .map_err(reject)?;
    metrics::counter!("campzap.contacts.imports").increment(1);
    Ok(Json(summary))
}

// ─── Campaigns ─────────────────────────────────────────────────────────────

pub async fn list_campaigns(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
) -> Json<Vec<Campaign>> {
    Json(state.store.list_campaigns(tenant))
}

pub async fn get_campaign(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
    Path(id): Path<Uuid>,
) -> Result<Json<Campaign>, ApiError> {
    state
        .store
        .get_campaign(tenant, id)
        .map(Json)
        .ok_or_else(|| reject(DashboardError::NotFound))
}

pub async fn create_campaign(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
    Json(req): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<Campaign>), ApiError> {
    let campaign = state.create_campaign(tenant, req).map_err(reject)?;
    metrics::counter!("campzap.campaigns.created").increment(1);
    Ok((StatusCode::CREATED, Json(campaign)))
}

pub async fn update_campaign(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCampaignRequest>,
) -> Result<Json<Campaign>, ApiError> {
    state.update_campaign(tenant, id, req).map(Json).map_err(reject)
}

pub async fn delete_campaign(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResult>, ApiError> {
    state.delete_campaign(tenant, id).await.map_err(reject)?;
    metrics::counter!("campzap.campaigns.deleted").increment(1);
    Ok(Json(ActionResult::ok()))
}

pub async fn trigger_campaign(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
    Json(req): Json<TriggerCampaignRequest>,
) -> Result<Json<Campaign>, ApiError> {
    let campaign = state.trigger_campaign(tenant, req).await.map_err(reject)?;
    metrics::counter!("campzap.campaigns.triggered").increment(1);
    Ok(Json(campaign))
}

// ─── Media storage ─────────────────────────────────────────────────────────

pub async fn list_files(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
) -> Json<Vec<StorageFile>> {
    Json(state.list_files(tenant).await)
}

pub async fn presign_upload(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
    Json(req): Json<PresignRequest>,
) -> Json<PresignedUpload> {
    Json(state.presign_upload(tenant, &req.file_name, &req.content_type))
}

pub async fn delete_file(
    State(state): State<AppState>,
    Extension(TenantId(tenant)): Extension<TenantId>,
    Json(req): Json<DeleteFileRequest>,
) -> Result<Json<ActionResult>, ApiError> {
    state.delete_file(tenant, &req.key).await.map_err(reject)?;
    Ok(Json(ActionResult::ok()))
}

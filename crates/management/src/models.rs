//! Request and response shapes for the dashboard API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use campzap_core::types::{Instance, InstanceStatus, MessageType};

/// Uniform mutation result: `{"success": true}` or `{"error": "..."}`.
/// Read endpoints return their data shapes directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionResult {
    Success { success: bool },
    Failure { error: String },
}

impl ActionResult {
    pub fn ok() -> Self {
        ActionResult::Success { success: true }
    }

    pub fn err(message: impl Into<String>) -> Self {
        ActionResult::Failure {
            error: message.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInstanceRequest {
    pub name: String,
}

/// Instance row plus its display name (the stored name minus the tenant
/// suffix), which is what the dashboard renders.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceView {
    #[serde(flatten)]
    pub instance: Instance,
    pub display_name: String,
}

impl From<Instance> for InstanceView {
    fn from(instance: Instance) -> Self {
        let display_name = instance.display_name().to_string();
        Self {
            instance,
            display_name,
        }
    }
}

/// Status callback posted by the integration service.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceStatusUpdate {
    pub status: InstanceStatus,
    pub phone: Option<String>,
    pub qr_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateListRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub message_template: String,
    pub message_type: MessageType,
    pub message_url: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCampaignRequest {
    pub name: Option<String>,
    pub message_template: Option<String>,
    pub message_type: Option<MessageType>,
    pub message_url: Option<String>,
}

/// The confirmed output of the trigger wizard. `instance_id` is required
/// unless `rotate` is set.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerCampaignRequest {
    pub campaign_id: Uuid,
    pub list_id: Uuid,
    pub instance_id: Option<Uuid>,
    #[serde(default)]
    pub rotate: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresignRequest {
    pub file_name: String,
    pub content_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteFileRequest {
    pub key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListContactCount {
    pub list_id: Uuid,
    pub count: u64,
}

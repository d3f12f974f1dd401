//! Outbound webhook collaborator.
//!
//! Three fixed HTTPS endpoints on the external automation service: instance
//! lifecycle, contact-list import, and campaign dispatch. All calls are
//! synchronous acknowledgments only; the far side does the actual sending
//! asynchronously. No retries anywhere; the user re-triggers on failure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use campzap_core::config::WebhookConfig;
use campzap_core::error::{DashboardError, DashboardResult};
use campzap_core::types::InstanceAction;

/// Rotation flag, serialized the way the automation service expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alternate {
    Yes,
    No,
}

impl From<bool> for Alternate {
    fn from(rotate: bool) -> Self {
        if rotate {
            Alternate::Yes
        } else {
            Alternate::No
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceSyncRequest {
    pub tenant_id: Uuid,
    pub instance_id: Uuid,
    pub action: InstanceAction,
}

#[derive(Debug, Clone)]
pub struct ContactImportRequest {
    pub tenant_id: Uuid,
    pub list_name: Option<String>,
    pub file_name: String,
    pub file_bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignDispatchRequest {
    pub tenant_id: Uuid,
    pub list_id: Uuid,
    pub template_id: Uuid,
    pub instance_ids: Vec<Uuid>,
    pub alternate: Alternate,
}

#[async_trait]
pub trait WebhookClient: Send + Sync {
    /// Instance lifecycle: qrcode / pause / delete.
    async fn sync_instance(&self, req: &InstanceSyncRequest) -> DashboardResult<()>;

    /// Forward an uploaded contact file for parsing and list creation.
    /// Returns the far side's import summary.
    async fn import_contacts(&self, req: ContactImportRequest)
        -> DashboardResult<serde_json::Value>;

    /// Hand a campaign off for asynchronous sending.
    async fn dispatch_campaign(&self, req: &CampaignDispatchRequest) -> DashboardResult<()>;
}

pub struct HttpWebhookClient {
    client: reqwest::Client,
    config: WebhookConfig,
}

impl HttpWebhookClient {
    pub fn new(config: WebhookConfig) -> DashboardResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| DashboardError::Webhook(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl WebhookClient for HttpWebhookClient {
    async fn sync_instance(&self, req: &InstanceSyncRequest) -> DashboardResult<()> {
        let response = self
            .client
            .post(&self.config.sync_url)
            .json(req)
            .send()
            .await
            .map_err(|e| DashboardError::Webhook(e.to_string()))?;

        response
            .error_for_status()
            .map_err(|e| DashboardError::Webhook(e.to_string()))?;
        Ok(())
    }

    async fn import_contacts(
        &self,
        req: ContactImportRequest,
    ) -> DashboardResult<serde_json::Value> {
        let mut form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(req.file_bytes).file_name(req.file_name),
            )
            .text("tenant_id", req.tenant_id.to_string());
        if let Some(list_name) = req.list_name {
            form = form.text("list_name", list_name);
        }

        let response = self
            .client
            .post(&self.config.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DashboardError::Webhook(e.to_string()))?
            .error_for_status()
            .map_err(|e| DashboardError::Webhook(e.to_string()))?;

        response
            .json()
            .await
            .map_err(|e| DashboardError::Webhook(e.to_string()))
    }

    async fn dispatch_campaign(&self, req: &CampaignDispatchRequest) -> DashboardResult<()> {
        tracing::info!(
            tenant_id = %req.tenant_id,
            template_id = %req.template_id,
            instances = req.instance_ids.len(),
            alternate = ?req.alternate,
            "Dispatching campaign"
        );
        let response = self
            .client
            .post(&self.config.dispatch_url)
            .json(req)
            .send()
            .await
            .map_err(|e| DashboardError::Webhook(e.to_string()))?;

        response
            .error_for_status()
            .map_err(|e| DashboardError::Webhook(e.to_string()))?;
        Ok(())
    }
}

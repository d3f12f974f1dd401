//! Mutation orchestration: everything a handler does beyond extract/respond.
//!
//! Cross-system deletes here are deliberately best-effort: the local row is
//! the source of truth, so a failing webhook or bucket never strands it.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use campzap_core::error::{DashboardError, DashboardResult};
use campzap_core::types::{Campaign, CampaignStatus, Instance, InstanceAction};
use campzap_dispatch::wizard::DispatchWizard;
use campzap_dispatch::webhook::{ContactImportRequest, InstanceSyncRequest, WebhookClient};
use campzap_reporting::DashboardReporter;
use campzap_storage::{FileKind, MediaLibrary, PresignedUpload, StorageFile};
use campzap_store::{CampaignPatch, NewCampaign, TenantStore};

use crate::models::{
    CreateCampaignRequest, TriggerCampaignRequest, UpdateCampaignRequest,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TenantStore>,
    pub media: Arc<MediaLibrary>,
    pub webhook: Arc<dyn WebhookClient>,
    pub reporter: Arc<DashboardReporter>,
}

impl AppState {
    // ─── Instances ─────────────────────────────────────────────────────────

    pub fn create_instance(&self, tenant_id: Uuid, name: &str) -> DashboardResult<Instance> {
        self.store.insert_instance(tenant_id, name)
    }

    /// Forward a lifecycle action (qrcode / pause) to the integration
    /// service. The resulting status change comes back through the status
    /// callback, not from this call.
    pub async fn sync_instance(
        &self,
        tenant_id: Uuid,
        instance_id: Uuid,
        action: InstanceAction,
    ) -> DashboardResult<()> {
        if self.store.get_instance(tenant_id, instance_id).is_none() {
            return Err(DashboardError::NotFound);
        }
        self.webhook
            .sync_instance(&InstanceSyncRequest {
                tenant_id,
                instance_id,
                action,
            })
            .await
    }

    /// Delete an instance. The webhook tears down the remote session; a
    /// webhook failure is logged and the local row is removed regardless, so
    /// the dashboard never shows a connection the user already deleted.
    pub async fn delete_instance(&self, tenant_id: Uuid, instance_id: Uuid) -> DashboardResult<()> {
        if self.store.get_instance(tenant_id, instance_id).is_none() {
            return Err(DashboardError::NotFound);
        }

        let sync = InstanceSyncRequest {
            tenant_id,
            instance_id,
            action: InstanceAction::Delete,
        };
        if let Err(e) = self.webhook.sync_instance(&sync).await {
            warn!(tenant_id = %tenant_id, instance_id = %instance_id, error = %e,
                "Instance delete webhook failed; deleting local row anyway");
        }

        if self.store.delete_instance(tenant_id, instance_id) {
            Ok(())
        } else {
            Err(DashboardError::NotFound)
        }
    }

    // ─── Contacts & lists ──────────────────────────────────────────────────

    /// Forward an uploaded contact file to the import webhook. Parsing and
    /// row creation happen on the far side.
    pub async fn upload_contacts(
        &self,
        tenant_id: Uuid,
        list_name: Option<String>,
        file_name: String,
        file_bytes: Vec<u8>,
    ) -> DashboardResult<serde_json::Value> {
        if file_bytes.is_empty() {
            return Err(DashboardError::Validation("The file is empty.".to_string()));
        }
        self.webhook
            .import_contacts(ContactImportRequest {
                tenant_id,
                list_name,
                file_name,
                file_bytes,
            })
            .await
    }

    // ─── Campaigns ─────────────────────────────────────────────────────────

    pub fn create_campaign(
        &self,
        tenant_id: Uuid,
        req: CreateCampaignRequest,
    ) -> DashboardResult<Campaign> {
        if req.name.trim().is_empty() {
            return Err(DashboardError::Validation(
                "Campaign name is required.".to_string(),
            ));
        }
        Ok(self.store.insert_campaign(
            tenant_id,
            NewCampaign {
                name: req.name,
                message_template: req.message_template,
                message_type: req.message_type,
                message_url: req.message_url,
                scheduled_at: req.scheduled_at,
            },
        ))
    }

    pub fn update_campaign(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        req: UpdateCampaignRequest,
    ) -> DashboardResult<Campaign> {
        self.store
            .update_campaign(
                tenant_id,
                id,
                CampaignPatch {
                    name: req.name,
                    message_template: req.message_template,
                    message_type: req.message_type,
                    message_url: req.message_url,
                },
            )
            .ok_or(DashboardError::NotFound)
    }

    /// Two-phase campaign delete: the attached media object first,
    /// best-effort, then the row. Phase one failing never blocks phase two.
    pub async fn delete_campaign(&self, tenant_id: Uuid, id: Uuid) -> DashboardResult<()> {
        let campaign = self
            .store
            .get_campaign(tenant_id, id)
            .ok_or(DashboardError::NotFound)?;

        if let Some(media) = campaign.media_ref() {
            if let Err(e) = self.media.delete_file(tenant_id, &media.key).await {
                warn!(tenant_id = %tenant_id, campaign_id = %id, key = %media.key, error = %e,
                    "Campaign media delete failed; deleting row anyway");
            }
        }

        if self.store.delete_campaign(tenant_id, id) {
            Ok(())
        } else {
            Err(DashboardError::NotFound)
        }
    }

    /// Run the trigger wizard end to end from a confirmed selection and hand
    /// the campaign to the dispatch webhook. The wizard is the single
    /// validation authority for triggering; this path gets no shortcuts.
    pub async fn trigger_campaign(
        &self,
        tenant_id: Uuid,
        req: TriggerCampaignRequest,
    ) -> DashboardResult<Campaign> {
        let campaign = self
            .store
            .get_campaign(tenant_id, req.campaign_id)
            .ok_or(DashboardError::NotFound)?;

        let mut wizard =
            DispatchWizard::open(tenant_id, self.store.clone(), self.webhook.clone());
        wizard.select_template(campaign.id)?;
        wizard.confirm_template()?;
        wizard.select_list(req.list_id)?;
        wizard.confirm_list().await?;
        if req.rotate {
            wizard.set_rotate(true)?;
        } else {
            let instance_id = req.instance_id.ok_or_else(|| {
                DashboardError::Validation("Select a sending instance first.".to_string())
            })?;
            wizard.select_instance(instance_id)?;
        }
        wizard.confirm_instances(&self.store.list_instances(tenant_id))?;
        wizard.send().await?;

        info!(tenant_id = %tenant_id, campaign_id = %campaign.id, "Campaign triggered");
        self.store
            .update_campaign_status(tenant_id, campaign.id, CampaignStatus::Sending)
            .ok_or(DashboardError::NotFound)
    }

    // ─── Media storage ─────────────────────────────────────────────────────

    /// List the tenant's media library. Campaigns referencing an object lend
    /// it their message type, so a video stored as `.bin` still shows as
    /// video.
    pub async fn list_files(&self, tenant_id: Uuid) -> Vec<StorageFile> {
        let mut hints: HashMap<String, FileKind> = HashMap::new();
        for campaign in self.store.list_campaigns(tenant_id) {
            if let Some(media) = campaign.media_ref() {
                hints.insert(media.key, FileKind::from_message_type(campaign.message_type));
            }
        }
        self.media.list_files(tenant_id, &hints).await
    }

    pub async fn delete_file(&self, tenant_id: Uuid, key: &str) -> DashboardResult<()> {
        self.media.delete_file(tenant_id, key).await.map_err(|e| {
            error!(tenant_id = %tenant_id, key = %key, error = %e, "File delete failed");
            e
        })
    }

    pub fn presign_upload(
        &self,
        tenant_id: Uuid,
        file_name: &str,
        content_type: &str,
    ) -> PresignedUpload {
        self.media.presign_upload(tenant_id, file_name, content_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use campzap_core::config::StorageConfig;
    use campzap_core::types::{InstanceStatus, MessageType};
    use campzap_dispatch::webhook::CampaignDispatchRequest;
    use campzap_storage::{MemoryBucket, ObjectStore, StoredObject};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RecordingWebhook {
        fail: bool,
        syncs: AtomicUsize,
        dispatches: AtomicUsize,
    }

    impl RecordingWebhook {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                fail,
                syncs: AtomicUsize::new(0),
                dispatches: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl WebhookClient for RecordingWebhook {
        async fn sync_instance(&self, _req: &InstanceSyncRequest) -> DashboardResult<()> {
            self.syncs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DashboardError::Webhook("timeout".to_string()));
            }
            Ok(())
        }
        async fn import_contacts(
            &self,
            _req: ContactImportRequest,
        ) -> DashboardResult<serde_json::Value> {
            if self.fail {
                return Err(DashboardError::Webhook("timeout".to_string()));
            }
            Ok(serde_json::json!({"imported": 2}))
        }
        async fn dispatch_campaign(&self, _req: &CampaignDispatchRequest) -> DashboardResult<()> {
            if self.fail {
                return Err(DashboardError::Webhook("timeout".to_string()));
            }
            self.dispatches.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Bucket whose delete always fails, for the two-phase delete tests.
    struct BrokenBucket;

    #[async_trait]
    impl ObjectStore for BrokenBucket {
        async fn list(&self, _prefix: &str) -> DashboardResult<Vec<StoredObject>> {
            Err(DashboardError::Storage("bucket down".to_string()))
        }
        async fn put(
            &self,
            _key: &str,
            _content_type: Option<String>,
            _bytes: Vec<u8>,
        ) -> DashboardResult<()> {
            Err(DashboardError::Storage("bucket down".to_string()))
        }
        async fn delete(&self, _key: &str) -> DashboardResult<()> {
            Err(DashboardError::Storage("bucket down".to_string()))
        }
    }

    fn state_with(webhook: Arc<RecordingWebhook>, bucket: Arc<dyn ObjectStore>) -> AppState {
        let store = Arc::new(TenantStore::new());
        AppState {
            reporter: Arc::new(DashboardReporter::new(store.clone())),
            media: Arc::new(MediaLibrary::new(bucket, StorageConfig::default())),
            webhook,
            store,
        }
    }

    fn campaign_req(message_url: Option<String>) -> CreateCampaignRequest {
        CreateCampaignRequest {
            name: "Promo".to_string(),
            message_template: "Hi {{name}}".to_string(),
            message_type: MessageType::Image,
            message_url,
            scheduled_at: None,
        }
    }

    #[tokio::test]
    async fn test_instance_delete_proceeds_when_webhook_fails() {
        let webhook = RecordingWebhook::new(true);
        let state = state_with(webhook.clone(), Arc::new(MemoryBucket::new()));
        let tenant = Uuid::new_v4();
        let inst = state.create_instance(tenant, "main").unwrap();

        state.delete_instance(tenant, inst.id).await.unwrap();
        assert_eq!(webhook.syncs.load(Ordering::SeqCst), 1);
        assert!(state.store.get_instance(tenant, inst.id).is_none());
    }

    #[tokio::test]
    async fn test_sync_instance_propagates_webhook_failure() {
        let state = state_with(RecordingWebhook::new(true), Arc::new(MemoryBucket::new()));
        let tenant = Uuid::new_v4();
        let inst = state.create_instance(tenant, "main").unwrap();

        let result = state
            .sync_instance(tenant, inst.id, InstanceAction::Qrcode)
            .await;
        assert!(matches!(result, Err(DashboardError::Webhook(_))));
        // The row is untouched; status changes only arrive via the callback.
        assert!(state.store.get_instance(tenant, inst.id).is_some());
    }

    #[tokio::test]
    async fn test_campaign_delete_proceeds_when_bucket_fails() {
        let state = state_with(RecordingWebhook::new(false), Arc::new(BrokenBucket));
        let tenant = Uuid::new_v4();
        let url = format!("https://media.campzap.local/{tenant}/pic.png");
        let campaign = state.create_campaign(tenant, campaign_req(Some(url))).unwrap();

        state.delete_campaign(tenant, campaign.id).await.unwrap();
        assert!(state.store.get_campaign(tenant, campaign.id).is_none());
    }

    #[tokio::test]
    async fn test_cross_tenant_campaign_delete_is_not_found() {
        let state = state_with(RecordingWebhook::new(false), Arc::new(MemoryBucket::new()));
        let owner = Uuid::new_v4();
        let campaign = state.create_campaign(owner, campaign_req(None)).unwrap();

        let result = state.delete_campaign(Uuid::new_v4(), campaign.id).await;
        assert!(matches!(result, Err(DashboardError::NotFound)));
        assert!(state.store.get_campaign(owner, campaign.id).is_some());
    }

    #[tokio::test]
    async fn test_trigger_campaign_marks_sending() {
        let webhook = RecordingWebhook::new(false);
        let state = state_with(webhook.clone(), Arc::new(MemoryBucket::new()));
        let tenant = Uuid::new_v4();

        let campaign = state.create_campaign(tenant, campaign_req(None)).unwrap();
        let list = state.store.insert_contact_list(tenant, "Leads");
        let inst = state.create_instance(tenant, "main").unwrap();
        state
            .store
            .update_instance_status(tenant, inst.id, InstanceStatus::Working, None, None)
            .unwrap();

        let triggered = state
            .trigger_campaign(
                tenant,
                TriggerCampaignRequest {
                    campaign_id: campaign.id,
                    list_id: list.id,
                    instance_id: Some(inst.id),
                    rotate: false,
                },
            )
            .await
            .unwrap();

        assert_eq!(triggered.status, CampaignStatus::Sending);
        assert_eq!(webhook.dispatches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_trigger_rejects_stopped_instance() {
        let state = state_with(RecordingWebhook::new(false), Arc::new(MemoryBucket::new()));
        let tenant = Uuid::new_v4();

        let campaign = state.create_campaign(tenant, campaign_req(None)).unwrap();
        let list = state.store.insert_contact_list(tenant, "Leads");
        let inst = state.create_instance(tenant, "main").unwrap();

        let result = state
            .trigger_campaign(
                tenant,
                TriggerCampaignRequest {
                    campaign_id: campaign.id,
                    list_id: list.id,
                    instance_id: Some(inst.id),
                    rotate: false,
                },
            )
            .await;
        assert!(matches!(result, Err(DashboardError::Validation(_))));
        // Status stays Draft after a failed trigger.
        let unchanged = state.store.get_campaign(tenant, campaign.id).unwrap();
        assert_eq!(unchanged.status, CampaignStatus::Draft);
    }

    #[tokio::test]
    async fn test_trigger_rejects_foreign_list() {
        let state = state_with(RecordingWebhook::new(false), Arc::new(MemoryBucket::new()));
        let tenant = Uuid::new_v4();
        let other = Uuid::new_v4();

        let campaign = state.create_campaign(tenant, campaign_req(None)).unwrap();
        let foreign_list = state.store.insert_contact_list(other, "Theirs");
        let inst = state.create_instance(tenant, "main").unwrap();
        state
            .store
            .update_instance_status(tenant, inst.id, InstanceStatus::Working, None, None)
            .unwrap();

        let result = state
            .trigger_campaign(
                tenant,
                TriggerCampaignRequest {
                    campaign_id: campaign.id,
                    list_id: foreign_list.id,
                    instance_id: Some(inst.id),
                    rotate: false,
                },
            )
            .await;
        assert!(matches!(result, Err(DashboardError::NotFound)));
    }

    #[tokio::test]
    async fn test_file_list_uses_campaign_type_hints() {
        let bucket = Arc::new(MemoryBucket::new());
        let state = state_with(RecordingWebhook::new(false), bucket.clone());
        let tenant = Uuid::new_v4();

        let key = format!("{tenant}/clip.bin");
        bucket.put(&key, None, vec![1, 2]).await.unwrap();
        let url = format!("https://media.campzap.local/{key}");
        let req = CreateCampaignRequest {
            message_type: MessageType::Video,
            ..campaign_req(Some(url))
        };
        state.create_campaign(tenant, req).unwrap();

        let files = state.list_files(tenant).await;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].kind, FileKind::Video);
    }
}

//! In-memory tenant store backed by DashMap.
//!
//! Production: replace with PostgreSQL (sqlx) behind the same API surface.
//! Every read filters by tenant id and every mutation matches rows on
//! `(id, tenant_id)`, so a request naming another tenant's row affects zero
//! rows instead of leaking data.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use campzap_core::error::{DashboardError, DashboardResult};
use campzap_core::sources::{ContactCounter, DispatchEventSource};
use campzap_core::types::{
    Campaign, CampaignStatus, Contact, ContactList, DispatchEvent, Instance, InstanceStatus,
    MessageType,
};

use crate::changes::InstanceChange;

/// Fields for a new campaign row; id, status, and timestamps are assigned
/// by the store.
#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub name: String,
    pub message_template: String,
    pub message_type: MessageType,
    pub message_url: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Fields for a new contact row.
#[derive(Debug, Clone)]
pub struct NewContact {
    pub name: Option<String>,
    pub phone: String,
    pub tags: Vec<String>,
    pub subscribed: bool,
    pub list_id: Option<Uuid>,
}

/// Partial campaign update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CampaignPatch {
    pub name: Option<String>,
    pub message_template: Option<String>,
    pub message_type: Option<MessageType>,
    pub message_url: Option<String>,
}

pub struct TenantStore {
    instances: DashMap<Uuid, Instance>,
    contacts: DashMap<Uuid, Contact>,
    contact_lists: DashMap<Uuid, ContactList>,
    campaigns: DashMap<Uuid, Campaign>,
    dispatch_events: DashMap<Uuid, DispatchEvent>,
    instance_changes: broadcast::Sender<InstanceChange>,
}

impl TenantStore {
    pub fn new() -> Self {
        let (instance_changes, _) = broadcast::channel(64);
        info!("Tenant store initialized (in-memory, development mode)");
        Self {
            instances: DashMap::new(),
            contacts: DashMap::new(),
            contact_lists: DashMap::new(),
            campaigns: DashMap::new(),
            dispatch_events: DashMap::new(),
            instance_changes,
        }
    }

    /// Subscribe to instance insert/update/delete notifications.
    pub fn subscribe_instances(&self) -> broadcast::Receiver<InstanceChange> {
        self.instance_changes.subscribe()
    }

    fn publish(&self, change: InstanceChange) {
        // No receivers is fine; the feed is best-effort.
        let _ = self.instance_changes.send(change);
    }

    // ─── Instances ─────────────────────────────────────────────────────────

    pub fn list_instances(&self, tenant_id: Uuid) -> Vec<Instance> {
        let mut rows: Vec<Instance> = self
            .instances
            .iter()
            .filter(|r| r.value().tenant_id == tenant_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }

    pub fn get_instance(&self, tenant_id: Uuid, id: Uuid) -> Option<Instance> {
        self.instances
            .get(&id)
            .filter(|r| r.value().tenant_id == tenant_id)
            .map(|r| r.value().clone())
    }

    /// Create an instance in the `Stopped` state. The stored name is the
    /// user-entered name suffixed with the tenant id for global uniqueness.
    pub fn insert_instance(&self, tenant_id: Uuid, name: &str) -> DashboardResult<Instance> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DashboardError::Validation(
                "Name may only contain letters, numbers, hyphens and underscores.".to_string(),
            ));
        }

        let stored_name = format!("{name}_{tenant_id}");
        if self.instances.iter().any(|r| r.value().name == stored_name) {
            return Err(DashboardError::Validation(
                "An instance with this name already exists.".to_string(),
            ));
        }

        let instance = Instance {
            id: Uuid::new_v4(),
            tenant_id,
            name: stored_name,
            status: InstanceStatus::Stopped,
            phone: None,
            profile_pic_url: None,
            qr_code: None,
            created_at: Utc::now(),
        };
        self.instances.insert(instance.id, instance.clone());
        info!(tenant_id = %tenant_id, instance_id = %instance.id, "Instance created");
        self.publish(InstanceChange::Inserted(instance.clone()));
        Ok(instance)
    }

    /// Apply a webhook-originated status update. Returns `None` when the row
    /// does not exist or belongs to another tenant.
    pub fn update_instance_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        status: InstanceStatus,
        phone: Option<String>,
        qr_code: Option<String>,
    ) -> Option<Instance> {
        let mut entry = self.instances.get_mut(&id)?;
        if entry.value().tenant_id != tenant_id {
            return None;
        }
        let row = entry.value_mut();
        row.status = status;
        if phone.is_some() {
            row.phone = phone;
        }
        row.qr_code = qr_code;
        let updated = row.clone();
        drop(entry);
        self.publish(InstanceChange::Updated(updated.clone()));
        Some(updated)
    }

    pub fn delete_instance(&self, tenant_id: Uuid, id: Uuid) -> bool {
        let removed = self
            .instances
            .remove_if(&id, |_, row| row.tenant_id == tenant_id)
            .is_some();
        if removed {
            info!(tenant_id = %tenant_id, instance_id = %id, "Instance deleted");
            self.publish(InstanceChange::Deleted(id));
        }
        removed
    }

    // ─── Contacts & Lists ──────────────────────────────────────────────────

    pub fn list_contacts(&self, tenant_id: Uuid) -> Vec<Contact> {
        let mut rows: Vec<Contact> = self
            .contacts
            .iter()
            .filter(|r| r.value().tenant_id == tenant_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }

    pub fn insert_contact(&self, tenant_id: Uuid, new: NewContact) -> Contact {
        let contact = Contact {
            id: Uuid::new_v4(),
            tenant_id,
            name: new.name,
            phone: new.phone,
            tags: new.tags,
            subscribed: new.subscribed,
            list_id: new.list_id,
            created_at: Utc::now(),
        };
        self.contacts.insert(contact.id, contact.clone());
        contact
    }

    /// Insert the rows of a completed list import in one call.
    pub fn insert_contacts(&self, tenant_id: Uuid, rows: Vec<NewContact>) -> Vec<Contact> {
        rows.into_iter()
            .map(|new| self.insert_contact(tenant_id, new))
            .collect()
    }

    pub fn list_contact_lists(&self, tenant_id: Uuid) -> Vec<ContactList> {
        let mut rows: Vec<ContactList> = self
            .contact_lists
            .iter()
            .filter(|r| r.value().tenant_id == tenant_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }

    pub fn get_contact_list(&self, tenant_id: Uuid, id: Uuid) -> Option<ContactList> {
        self.contact_lists
            .get(&id)
            .filter(|r| r.value().tenant_id == tenant_id)
            .map(|r| r.value().clone())
    }

    pub fn insert_contact_list(&self, tenant_id: Uuid, name: &str) -> ContactList {
        let list = ContactList {
            id: Uuid::new_v4(),
            tenant_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.contact_lists.insert(list.id, list.clone());
        list
    }

    /// Delete a list and its member contacts. Single least-privilege path:
    /// both the list and the members are matched against the caller's tenant.
    pub fn delete_contact_list(&self, tenant_id: Uuid, id: Uuid) -> bool {
        let removed = self
            .contact_lists
            .remove_if(&id, |_, row| row.tenant_id == tenant_id)
            .is_some();
        if removed {
            let member_ids: Vec<Uuid> = self
                .contacts
                .iter()
                .filter(|r| r.value().tenant_id == tenant_id && r.value().list_id == Some(id))
                .map(|r| *r.key())
                .collect();
            for cid in member_ids {
                self.contacts.remove(&cid);
            }
            info!(tenant_id = %tenant_id, list_id = %id, "Contact list deleted");
        }
        removed
    }

    // ─── Campaigns ─────────────────────────────────────────────────────────

    pub fn list_campaigns(&self, tenant_id: Uuid) -> Vec<Campaign> {
        let mut rows: Vec<Campaign> = self
            .campaigns
            .iter()
            .filter(|r| r.value().tenant_id == tenant_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }

    pub fn get_campaign(&self, tenant_id: Uuid, id: Uuid) -> Option<Campaign> {
        self.campaigns
            .get(&id)
            .filter(|r| r.value().tenant_id == tenant_id)
            .map(|r| r.value().clone())
    }

    pub fn insert_campaign(&self, tenant_id: Uuid, new: NewCampaign) -> Campaign {
        let campaign = Campaign {
            id: Uuid::new_v4(),
            tenant_id,
            name: new.name,
            message_template: new.message_template,
            message_type: new.message_type,
            message_url: new.message_url,
            status: CampaignStatus::Draft,
            scheduled_at: new.scheduled_at,
            created_at: Utc::now(),
        };
        self.campaigns.insert(campaign.id, campaign.clone());
        info!(tenant_id = %tenant_id, campaign_id = %campaign.id, "Campaign created");
        campaign
    }

    pub fn update_campaign(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        patch: CampaignPatch,
    ) -> Option<Campaign> {
        let mut entry = self.campaigns.get_mut(&id)?;
        if entry.value().tenant_id != tenant_id {
            return None;
        }
        let row = entry.value_mut();
        if let Some(name) = patch.name {
            row.name = name;
        }
        if let Some(template) = patch.message_template {
            row.message_template = template;
        }
        if let Some(message_type) = patch.message_type {
            row.message_type = message_type;
        }
        if let Some(url) = patch.message_url {
            row.message_url = Some(url);
        }
        Some(row.clone())
    }

    pub fn update_campaign_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        status: CampaignStatus,
    ) -> Option<Campaign> {
        let mut entry = self.campaigns.get_mut(&id)?;
        if entry.value().tenant_id != tenant_id {
            return None;
        }
        entry.value_mut().status = status;
        Some(entry.value().clone())
    }

    pub fn delete_campaign(&self, tenant_id: Uuid, id: Uuid) -> bool {
        let removed = self
            .campaigns
            .remove_if(&id, |_, row| row.tenant_id == tenant_id)
            .is_some();
        if removed {
            info!(tenant_id = %tenant_id, campaign_id = %id, "Campaign deleted");
        }
        removed
    }

    // ─── Dispatch events ───────────────────────────────────────────────────

    pub fn insert_dispatch_event(&self, event: DispatchEvent) {
        self.dispatch_events.insert(event.id, event);
    }

    fn count_events<F>(&self, tenant_id: Uuid, pred: F) -> u64
    where
        F: Fn(&DispatchEvent) -> bool,
    {
        self.dispatch_events
            .iter()
            .filter(|r| r.value().tenant_id == tenant_id && pred(r.value()))
            .count() as u64
    }
}

impl Default for TenantStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DispatchEventSource for TenantStore {
    async fn count_sent(&self, tenant_id: Uuid) -> DashboardResult<u64> {
        Ok(self.count_events(tenant_id, |e| e.sent_at.is_some()))
    }

    async fn count_delivered(&self, tenant_id: Uuid) -> DashboardResult<u64> {
        Ok(self.count_events(tenant_id, |e| e.delivered_at.is_some()))
    }

    async fn count_read(&self, tenant_id: Uuid) -> DashboardResult<u64> {
        Ok(self.count_events(tenant_id, |e| e.read_at.is_some()))
    }

    async fn events_since(
        &self,
        tenant_id: Uuid,
        start: DateTime<Utc>,
    ) -> DashboardResult<Vec<DispatchEvent>> {
        let mut rows: Vec<DispatchEvent> = self
            .dispatch_events
            .iter()
            .filter(|r| r.value().tenant_id == tenant_id && r.value().created_at >= start)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn recent(&self, tenant_id: Uuid, limit: usize) -> DashboardResult<Vec<DispatchEvent>> {
        let mut rows: Vec<DispatchEvent> = self
            .dispatch_events
            .iter()
            .filter(|r| r.value().tenant_id == tenant_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit);
        Ok(rows)
    }
}

#[async_trait]
impl ContactCounter for TenantStore {
    async fn count_list_contacts(&self, tenant_id: Uuid, list_id: Uuid) -> DashboardResult<u64> {
        if self.get_contact_list(tenant_id, list_id).is_none() {
            return Err(DashboardError::NotFound);
        }
        Ok(self.count_contacts_in_list(tenant_id, list_id))
    }
}

impl TenantStore {
    fn count_contacts_in_list(&self, tenant_id: Uuid, list_id: Uuid) -> u64 {
        self.contacts
            .iter()
            .filter(|r| r.value().tenant_id == tenant_id && r.value().list_id == Some(list_id))
            .count() as u64
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One managed WhatsApp connection record. Lifecycle transitions are driven
/// by the external integration service; this system only observes them
/// through store updates and the realtime change feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Stored name, suffixed with the tenant id for global uniqueness.
    pub name: String,
    pub status: InstanceStatus,
    pub phone: Option<String>,
    pub profile_pic_url: Option<String>,
    pub qr_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Instance {
    /// Name as entered by the user, without the tenant suffix. User names
    /// may themselves contain underscores, so only the exact `_{tenant_id}`
    /// suffix is stripped.
    pub fn display_name(&self) -> &str {
        self.name
            .strip_suffix(&format!("_{}", self.tenant_id))
            .unwrap_or(&self.name)
    }

    /// Only `Working` instances may send campaigns.
    pub fn is_active(&self) -> bool {
        self.status == InstanceStatus::Working
    }
}

/// Session status as reported by the integration service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    Stopped,
    Starting,
    ScanQrCode,
    Working,
    Failed,
}

/// Action forwarded to the instance-lifecycle webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceAction {
    Qrcode,
    Pause,
    Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: Option<String>,
    pub phone: String,
    pub tags: Vec<String>,
    /// Opt-in flag for campaign sends.
    pub subscribed: bool,
    pub list_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactList {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    Image,
    Video,
    Audio,
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Sending,
    Sent,
    Paused,
}

/// A reusable message template plus its send state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub message_template: String,
    pub message_type: MessageType,
    /// Absolute public URL of the media object in the bucket, if any.
    pub message_url: Option<String>,
    pub status: CampaignStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    /// Typed view of the campaign's media reference, when present and valid.
    pub fn media_ref(&self) -> Option<MediaRef> {
        self.message_url.as_deref().and_then(MediaRef::parse)
    }
}

/// Typed reference from a campaign to an object in the media bucket.
///
/// Campaigns store the absolute public URL; the object key is the URL path.
/// There is no referential integrity across the two systems, so deletion
/// code must delete both sides explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: String,
    pub key: String,
}

impl MediaRef {
    /// Parse a public bucket URL of the form `https://{domain}/{key}`.
    pub fn parse(raw: &str) -> Option<Self> {
        let parsed = url::Url::parse(raw).ok()?;
        let key = parsed.path().trim_start_matches('/').to_string();
        if key.is_empty() {
            return None;
        }
        Some(Self {
            url: raw.to_string(),
            key,
        })
    }
}

/// Display status of a dispatch event: the most advanced non-null timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Delivered,
    Read,
}

/// One row recording the sent/delivered/read lifecycle of a single outbound
/// message to a single contact. Timestamps progress monotonically and are
/// never cleared once set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchEvent {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub contact_id: Option<Uuid>,
    pub contact_name: Option<String>,
    pub contact_phone: String,
    pub message_type: MessageType,
    pub sent_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl DispatchEvent {
    /// Resolve the current display status by priority: read > delivered > sent.
    pub fn current_status(&self) -> DeliveryStatus {
        if self.read_at.is_some() {
            DeliveryStatus::Read
        } else if self.delivered_at.is_some() {
            DeliveryStatus::Delivered
        } else {
            DeliveryStatus::Sent
        }
    }

    /// Timestamp matching the current status, falling back to the row's
    /// creation time when even the sent timestamp is absent.
    pub fn status_timestamp(&self) -> DateTime<Utc> {
        match self.current_status() {
            DeliveryStatus::Read => self.read_at.unwrap_or(self.created_at),
            DeliveryStatus::Delivered => self.delivered_at.unwrap_or(self.created_at),
            DeliveryStatus::Sent => self.sent_at.unwrap_or(self.created_at),
        }
    }

    /// Contact display name, falling back to the phone number, then to a
    /// literal placeholder.
    pub fn display_name(&self) -> String {
        self.contact_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| {
                if self.contact_phone.is_empty() {
                    "unknown".to_string()
                } else {
                    self.contact_phone.clone()
                }
            })
    }
}

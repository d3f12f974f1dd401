//! Recent-activity resolution: one display status per dispatch event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use campzap_core::types::{DeliveryStatus, DispatchEvent, MessageType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentActivityItem {
    pub id: Uuid,
    pub contact_name: String,
    pub contact_phone: String,
    pub message_type: MessageType,
    pub status: DeliveryStatus,
    pub timestamp: DateTime<Utc>,
}

/// Collapse an event's three timestamp columns into a single display row.
pub fn resolve(event: &DispatchEvent) -> RecentActivityItem {
    RecentActivityItem {
        id: event.id,
        contact_name: event.display_name(),
        contact_phone: event.contact_phone.clone(),
        message_type: event.message_type,
        status: event.current_status(),
        timestamp: event.status_timestamp(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_resolution_prefers_read_timestamp() {
        let sent = Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap();
        let read = Utc.with_ymd_and_hms(2026, 8, 1, 11, 0, 0).unwrap();
        let event = DispatchEvent {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            contact_id: None,
            contact_name: None,
            contact_phone: "+5511999990000".to_string(),
            message_type: MessageType::Image,
            sent_at: Some(sent),
            delivered_at: Some(sent),
            read_at: Some(read),
            created_at: sent,
        };

        let item = resolve(&event);
        assert_eq!(item.status, DeliveryStatus::Read);
        assert_eq!(item.timestamp, read);
        assert_eq!(item.contact_name, "+5511999990000");
    }
}

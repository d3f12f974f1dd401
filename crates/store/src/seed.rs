//! Demo data for local development.

use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use campzap_core::types::{DispatchEvent, InstanceStatus, MessageType};

use crate::store::{NewCampaign, NewContact, TenantStore};

/// Seed one demo tenant with instances, a contact list, a campaign, and a
/// few days of dispatch events. Returns the tenant id so the caller can
/// print a usable dev token.
pub fn seed_demo_tenant(store: &TenantStore) -> Uuid {
    let tenant = Uuid::new_v4();
    let now = Utc::now();

    let main = store
        .insert_instance(tenant, "main")
        .expect("seed instance name is valid");
    store.update_instance_status(
        tenant,
        main.id,
        InstanceStatus::Working,
        Some("+5511988880000".to_string()),
        None,
    );
    store
        .insert_instance(tenant, "backup")
        .expect("seed instance name is valid");

    let list = store.insert_contact_list(tenant, "Launch leads");
    let phones = [
        ("Ana", "+5511999990001"),
        ("Bruno", "+5511999990002"),
        ("Carla", "+5511999990003"),
        ("Diego", "+5511999990004"),
    ];
    store.insert_contacts(
        tenant,
        phones
            .iter()
            .map(|(name, phone)| NewContact {
                name: Some((*name).to_string()),
                phone: (*phone).to_string(),
                tags: vec!["launch".to_string()],
                subscribed: true,
                list_id: Some(list.id),
            })
            .collect(),
    );

    store.insert_campaign(
        tenant,
        NewCampaign {
            name: "August promo".to_string(),
            message_template: "Hi {{name}}, our launch discount ends Friday!".to_string(),
            message_type: MessageType::Text,
            message_url: None,
            scheduled_at: None,
        },
    );

    // A few days of dispatch history with decaying read-through.
    for day in 0..5i64 {
        for (i, (name, phone)) in phones.iter().enumerate() {
            let created = now - Duration::days(day) - Duration::minutes(i as i64);
            let delivered = i % 4 != 3;
            let read = delivered && i % 2 == 0;
            store.insert_dispatch_event(DispatchEvent {
                id: Uuid::new_v4(),
                tenant_id: tenant,
                contact_id: None,
                contact_name: Some((*name).to_string()),
                contact_phone: (*phone).to_string(),
                message_type: MessageType::Text,
                sent_at: Some(created),
                delivered_at: delivered.then(|| created + Duration::minutes(1)),
                read_at: read.then(|| created + Duration::minutes(5)),
                created_at: created,
            });
        }
    }

    info!(tenant_id = %tenant, "Demo tenant seeded");
    tenant
}

//! Campaign dispatch — the multi-step trigger wizard and the outbound
//! webhook collaborator that performs the actual WhatsApp sending.

pub mod webhook;
pub mod wizard;

pub use webhook::{
    Alternate, CampaignDispatchRequest, ContactImportRequest, HttpWebhookClient,
    InstanceSyncRequest, WebhookClient,
};
pub use wizard::{DispatchTargets, DispatchWizard, WizardState};

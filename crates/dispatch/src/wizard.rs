//! Campaign trigger wizard.
//!
//! A four-step flow modeled as a typed state machine: pick a template, pick a
//! contact list, pick the sending instance(s), confirm. Each state carries
//! exactly the data accumulated so far, so skipping a step or confirming with
//! a half-filled selection is unrepresentable. Closing the wizard drops the
//! state wholesale, which is what resets every selection.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use campzap_core::error::{DashboardError, DashboardResult};
use campzap_core::sources::ContactCounter;
use campzap_core::types::Instance;

use crate::webhook::{Alternate, CampaignDispatchRequest, WebhookClient};

/// Which instances a confirmed dispatch will use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchTargets {
    Single(Uuid),
    /// Round-robin across every connected instance.
    Rotation(Vec<Uuid>),
}

impl DispatchTargets {
    pub fn instance_ids(&self) -> Vec<Uuid> {
        match self {
            DispatchTargets::Single(id) => vec![*id],
            DispatchTargets::Rotation(ids) => ids.clone(),
        }
    }

    pub fn is_rotation(&self) -> bool {
        matches!(self, DispatchTargets::Rotation(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardState {
    SelectTemplate {
        template_id: Option<Uuid>,
    },
    SelectList {
        template_id: Uuid,
        list_id: Option<Uuid>,
    },
    SelectInstance {
        template_id: Uuid,
        list_id: Uuid,
        contact_count: u64,
        instance_id: Option<Uuid>,
        rotate: bool,
    },
    Confirm {
        template_id: Uuid,
        list_id: Uuid,
        contact_count: u64,
        targets: DispatchTargets,
    },
    Closed,
}

impl WizardState {
    pub fn step(&self) -> u8 {
        match self {
            WizardState::SelectTemplate { .. } => 1,
            WizardState::SelectList { .. } => 2,
            WizardState::SelectInstance { .. } => 3,
            WizardState::Confirm { .. } => 4,
            WizardState::Closed => 0,
        }
    }
}

pub struct DispatchWizard {
    tenant_id: Uuid,
    state: WizardState,
    contacts: Arc<dyn ContactCounter>,
    webhook: Arc<dyn WebhookClient>,
}

impl DispatchWizard {
    pub fn open(
        tenant_id: Uuid,
        contacts: Arc<dyn ContactCounter>,
        webhook: Arc<dyn WebhookClient>,
    ) -> Self {
        Self {
            tenant_id,
            state: WizardState::SelectTemplate { template_id: None },
            contacts,
            webhook,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    // ─── Step 1: template ───

    pub fn select_template(&mut self, id: Uuid) -> DashboardResult<()> {
        match &mut self.state {
            WizardState::SelectTemplate { template_id } => {
                *template_id = Some(id);
                Ok(())
            }
            _ => Err(DashboardError::Validation(
                "Not on the template step.".to_string(),
            )),
        }
    }

    pub fn confirm_template(&mut self) -> DashboardResult<()> {
        match self.state {
            WizardState::SelectTemplate {
                template_id: Some(template_id),
            } => {
                self.state = WizardState::SelectList {
                    template_id,
                    list_id: None,
                };
                Ok(())
            }
            WizardState::SelectTemplate { template_id: None } => Err(DashboardError::Validation(
                "Select a message template first.".to_string(),
            )),
            _ => Err(DashboardError::Validation(
                "Not on the template step.".to_string(),
            )),
        }
    }

    // ─── Step 2: contact list ───

    pub fn select_list(&mut self, id: Uuid) -> DashboardResult<()> {
        match &mut self.state {
            WizardState::SelectList { list_id, .. } => {
                *list_id = Some(id);
                Ok(())
            }
            _ => Err(DashboardError::Validation(
                "Not on the list step.".to_string(),
            )),
        }
    }

    /// Advances to instance selection, resolving the list's contact count.
    /// On a count failure the wizard stays on the list step.
    pub async fn confirm_list(&mut self) -> DashboardResult<()> {
        let (template_id, list_id) = match self.state {
            WizardState::SelectList {
                template_id,
                list_id: Some(list_id),
            } => (template_id, list_id),
            WizardState::SelectList { list_id: None, .. } => {
                return Err(DashboardError::Validation(
                    "Select a contact list first.".to_string(),
                ))
            }
            _ => {
                return Err(DashboardError::Validation(
                    "Not on the list step.".to_string(),
                ))
            }
        };

        let contact_count = self
            .contacts
            .count_list_contacts(self.tenant_id, list_id)
            .await?;

        self.state = WizardState::SelectInstance {
            template_id,
            list_id,
            contact_count,
            instance_id: None,
            rotate: false,
        };
        Ok(())
    }

    // ─── Step 3: instance(s) ───

    /// Picking a concrete instance turns rotation off.
    pub fn select_instance(&mut self, id: Uuid) -> DashboardResult<()> {
        match &mut self.state {
            WizardState::SelectInstance {
                instance_id,
                rotate,
                ..
            } => {
                *instance_id = Some(id);
                *rotate = false;
                Ok(())
            }
            _ => Err(DashboardError::Validation(
                "Not on the instance step.".to_string(),
            )),
        }
    }

    /// Enabling rotation discards any single-instance pick.
    pub fn set_rotate(&mut self, on: bool) -> DashboardResult<()> {
        match &mut self.state {
            WizardState::SelectInstance {
                instance_id,
                rotate,
                ..
            } => {
                *rotate = on;
                if on {
                    *instance_id = None;
                }
                Ok(())
            }
            _ => Err(DashboardError::Validation(
                "Not on the instance step.".to_string(),
            )),
        }
    }

    /// Validates the selection against the tenant's currently connected
    /// instances and moves to confirmation.
    pub fn confirm_instances(&mut self, connected: &[Instance]) -> DashboardResult<()> {
        let (template_id, list_id, contact_count, instance_id, rotate) = match self.state {
            WizardState::SelectInstance {
                template_id,
                list_id,
                contact_count,
                instance_id,
                rotate,
            } => (template_id, list_id, contact_count, instance_id, rotate),
            _ => {
                return Err(DashboardError::Validation(
                    "Not on the instance step.".to_string(),
                ))
            }
        };

        let active: Vec<Uuid> = connected
            .iter()
            .filter(|i| i.is_active())
            .map(|i| i.id)
            .collect();

        let targets = if rotate {
            if active.is_empty() {
                return Err(DashboardError::Validation(
                    "No connected instances available for rotation.".to_string(),
                ));
            }
            DispatchTargets::Rotation(active)
        } else {
            let id = instance_id.ok_or_else(|| {
                DashboardError::Validation("Select a sending instance first.".to_string())
            })?;
            if !active.contains(&id) {
                return Err(DashboardError::Validation(
                    "The selected instance is not connected.".to_string(),
                ));
            }
            DispatchTargets::Single(id)
        };

        self.state = WizardState::Confirm {
            template_id,
            list_id,
            contact_count,
            targets,
        };
        Ok(())
    }

    // ─── Step 4: confirm and send ───

    /// Hands the campaign off to the dispatch webhook. On failure the wizard
    /// stays on confirmation so the user can retry; on success it closes.
    pub async fn send(&mut self) -> DashboardResult<()> {
        let (template_id, list_id, targets) = match &self.state {
            WizardState::Confirm {
                template_id,
                list_id,
                targets,
                ..
            } => (*template_id, *list_id, targets.clone()),
            _ => {
                return Err(DashboardError::Validation(
                    "Nothing to send yet.".to_string(),
                ))
            }
        };

        let request = CampaignDispatchRequest {
            tenant_id: self.tenant_id,
            list_id,
            template_id,
            instance_ids: targets.instance_ids(),
            alternate: Alternate::from(targets.is_rotation()),
        };
        self.webhook.dispatch_campaign(&request).await?;

        self.state = WizardState::Closed;
        Ok(())
    }

    /// Closing at any step resets the wizard entirely.
    pub fn cancel(&mut self) {
        if !matches!(self.state, WizardState::Closed) {
            warn!(tenant_id = %self.tenant_id, step = self.state.step(), "Dispatch wizard cancelled");
        }
        self.state = WizardState::Closed;
    }

    /// Steps backward one screen, keeping the selections already made.
    pub fn back(&mut self) -> DashboardResult<()> {
        self.state = match std::mem::replace(&mut self.state, WizardState::Closed) {
            WizardState::SelectList {
                template_id,
                list_id: _,
            } => WizardState::SelectTemplate {
                template_id: Some(template_id),
            },
            WizardState::SelectInstance {
                template_id,
                list_id,
                ..
            } => WizardState::SelectList {
                template_id,
                list_id: Some(list_id),
            },
            WizardState::Confirm {
                template_id,
                list_id,
                contact_count,
                targets,
            } => {
                let (instance_id, rotate) = match &targets {
                    DispatchTargets::Single(id) => (Some(*id), false),
                    DispatchTargets::Rotation(_) => (None, true),
                };
                WizardState::SelectInstance {
                    template_id,
                    list_id,
                    contact_count,
                    instance_id,
                    rotate,
                }
            }
            other => {
                self.state = other;
                return Err(DashboardError::Validation(
                    "Cannot go back from here.".to_string(),
                ));
            }
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use campzap_core::types::{Instance, InstanceStatus};
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::webhook::{ContactImportRequest, InstanceSyncRequest};

    struct FakeCounter {
        count: DashboardResult<u64>,
    }

    #[async_trait]
    impl ContactCounter for FakeCounter {
        async fn count_list_contacts(
            &self,
            _tenant_id: Uuid,
            _list_id: Uuid,
        ) -> DashboardResult<u64> {
            match &self.count {
                Ok(n) => Ok(*n),
                Err(_) => Err(DashboardError::Database("down".to_string())),
            }
        }
    }

    struct FakeWebhook {
        fail: bool,
        sent: AtomicUsize,
    }

    impl FakeWebhook {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                sent: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WebhookClient for FakeWebhook {
        async fn sync_instance(&self, _req: &InstanceSyncRequest) -> DashboardResult<()> {
            Ok(())
        }
        async fn import_contacts(
            &self,
            _req: ContactImportRequest,
        ) -> DashboardResult<serde_json::Value> {
            Ok(serde_json::json!({}))
        }
        async fn dispatch_campaign(&self, _req: &CampaignDispatchRequest) -> DashboardResult<()> {
            if self.fail {
                return Err(DashboardError::Webhook("503".to_string()));
            }
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn instance(status: InstanceStatus) -> Instance {
        let tenant_id = Uuid::new_v4();
        Instance {
            id: Uuid::new_v4(),
            tenant_id,
            name: format!("main_{tenant_id}"),
            status,
            phone: None,
            profile_pic_url: None,
            qr_code: None,
            created_at: Utc::now(),
        }
    }

    fn wizard(counter: FakeCounter, webhook: FakeWebhook) -> DispatchWizard {
        DispatchWizard::open(Uuid::new_v4(), Arc::new(counter), Arc::new(webhook))
    }

    async fn advance_to_instance_step(w: &mut DispatchWizard) {
        w.select_template(Uuid::new_v4()).unwrap();
        w.confirm_template().unwrap();
        w.select_list(Uuid::new_v4()).unwrap();
        w.confirm_list().await.unwrap();
    }

    #[tokio::test]
    async fn test_cannot_skip_steps() {
        let mut w = wizard(FakeCounter { count: Ok(3) }, FakeWebhook::new(false));
        assert!(w.select_list(Uuid::new_v4()).is_err());
        assert!(w.select_instance(Uuid::new_v4()).is_err());
        assert!(w.send().await.is_err());
        assert!(w.confirm_template().is_err(), "no template selected yet");
    }

    #[tokio::test]
    async fn test_rotation_targets_all_working_instances() {
        let mut w = wizard(FakeCounter { count: Ok(10) }, FakeWebhook::new(false));
        advance_to_instance_step(&mut w).await;

        let connected = vec![
            instance(InstanceStatus::Working),
            instance(InstanceStatus::Stopped),
            instance(InstanceStatus::Working),
        ];
        w.set_rotate(true).unwrap();
        w.confirm_instances(&connected).unwrap();

        match w.state() {
            WizardState::Confirm { targets, .. } => match targets {
                DispatchTargets::Rotation(ids) => {
                    assert_eq!(ids.len(), 2);
                    assert_eq!(ids[0], connected[0].id);
                    assert_eq!(ids[1], connected[2].id);
                }
                other => panic!("expected rotation, got {other:?}"),
            },
            other => panic!("expected Confirm, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_single_instance_must_be_working() {
        let mut w = wizard(FakeCounter { count: Ok(10) }, FakeWebhook::new(false));
        advance_to_instance_step(&mut w).await;

        let stopped = instance(InstanceStatus::Stopped);
        w.select_instance(stopped.id).unwrap();
        assert!(w.confirm_instances(std::slice::from_ref(&stopped)).is_err());
        assert_eq!(w.state().step(), 3);
    }

    #[tokio::test]
    async fn test_rotation_requires_a_working_instance() {
        let mut w = wizard(FakeCounter { count: Ok(10) }, FakeWebhook::new(false));
        advance_to_instance_step(&mut w).await;

        w.set_rotate(true).unwrap();
        let stopped = instance(InstanceStatus::Stopped);
        assert!(w.confirm_instances(std::slice::from_ref(&stopped)).is_err());
    }

    #[tokio::test]
    async fn test_selecting_instance_clears_rotation() {
        let mut w = wizard(FakeCounter { count: Ok(10) }, FakeWebhook::new(false));
        advance_to_instance_step(&mut w).await;

        w.set_rotate(true).unwrap();
        let active = instance(InstanceStatus::Working);
        w.select_instance(active.id).unwrap();
        w.confirm_instances(std::slice::from_ref(&active)).unwrap();

        match w.state() {
            WizardState::Confirm { targets, .. } => {
                assert_eq!(*targets, DispatchTargets::Single(active.id));
            }
            other => panic!("expected Confirm, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_count_failure_stays_on_list_step() {
        let mut w = wizard(
            FakeCounter {
                count: Err(DashboardError::Database("down".to_string())),
            },
            FakeWebhook::new(false),
        );
        w.select_template(Uuid::new_v4()).unwrap();
        w.confirm_template().unwrap();
        w.select_list(Uuid::new_v4()).unwrap();
        assert!(w.confirm_list().await.is_err());
        assert_eq!(w.state().step(), 2);
    }

    #[tokio::test]
    async fn test_send_failure_keeps_confirmation() {
        let mut w = wizard(FakeCounter { count: Ok(10) }, FakeWebhook::new(true));
        advance_to_instance_step(&mut w).await;
        let active = instance(InstanceStatus::Working);
        w.select_instance(active.id).unwrap();
        w.confirm_instances(std::slice::from_ref(&active)).unwrap();

        assert!(w.send().await.is_err());
        assert_eq!(w.state().step(), 4, "retry stays possible");
    }

    #[tokio::test]
    async fn test_send_success_closes() {
        let mut w = wizard(FakeCounter { count: Ok(10) }, FakeWebhook::new(false));
        advance_to_instance_step(&mut w).await;
        let active = instance(InstanceStatus::Working);
        w.select_instance(active.id).unwrap();
        w.confirm_instances(std::slice::from_ref(&active)).unwrap();

        w.send().await.unwrap();
        assert_eq!(*w.state(), WizardState::Closed);
    }

    #[tokio::test]
    async fn test_cancel_resets_everything() {
        let mut w = wizard(FakeCounter { count: Ok(10) }, FakeWebhook::new(false));
        advance_to_instance_step(&mut w).await;
        w.cancel();
        assert_eq!(*w.state(), WizardState::Closed);
    }

    #[tokio::test]
    async fn test_back_preserves_selections() {
        let mut w = wizard(FakeCounter { count: Ok(7) }, FakeWebhook::new(false));
        let template = Uuid::new_v4();
        let list = Uuid::new_v4();
        w.select_template(template).unwrap();
        w.confirm_template().unwrap();
        w.select_list(list).unwrap();
        w.confirm_list().await.unwrap();

        let active = instance(InstanceStatus::Working);
        w.select_instance(active.id).unwrap();
        w.confirm_instances(std::slice::from_ref(&active)).unwrap();

        w.back().unwrap();
        match w.state() {
            WizardState::SelectInstance {
                template_id,
                list_id,
                contact_count,
                instance_id,
                rotate,
            } => {
                assert_eq!(*template_id, template);
                assert_eq!(*list_id, list);
                assert_eq!(*contact_count, 7);
                assert_eq!(*instance_id, Some(active.id));
                assert!(!rotate);
            }
            other => panic!("expected SelectInstance, got {other:?}"),
        }

        w.back().unwrap();
        assert!(matches!(
            w.state(),
            WizardState::SelectList { list_id: Some(l), .. } if *l == list
        ));

        w.back().unwrap();
        assert!(matches!(
            w.state(),
            WizardState::SelectTemplate { template_id: Some(t) } if *t == template
        ));

        assert!(w.back().is_err());
    }
}

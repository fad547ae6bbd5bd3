//! Integration tests for settings writes: serialization, failures and auditing

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use leadpipe_campaigns::{
    campaign::AddCampaign,
    card::GetCard,
    field::{AddCustomField, Confirmation, DeleteCustomField, SetFieldVisibility, SetPrimaryField},
    fields::{CampaignSettings, FieldType},
    Campaign, CampaignId, CampaignStore, Client, Execute, FileCampaignStore, MemoryCampaignStore,
    Result, SettingsContext, SettingsError, SettingsOperationProcessor, WritePolicy,
};
use tempfile::TempDir;
use tokio::sync::{Notify, Semaphore};
use tokio_test::{assert_err, assert_ok};

/// Memory store whose settings writes can be slowed, paused or failed.
#[derive(Default)]
struct ControlledStore {
    inner: MemoryCampaignStore,
    delay: Option<Duration>,
    gate: Option<(Notify, Semaphore)>,
    fail: AtomicBool,
}

impl ControlledStore {
    fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    fn gated() -> Self {
        Self {
            gate: Some((Notify::new(), Semaphore::new(0))),
            ..Default::default()
        }
    }

    async fn wait_for_write(&self) {
        if let Some((entered, _)) = &self.gate {
            entered.notified().await;
        }
    }

    fn release_write(&self) {
        if let Some((_, permits)) = &self.gate {
            permits.add_permits(1);
        }
    }
}

#[async_trait]
impl CampaignStore for ControlledStore {
    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>> {
        self.inner.fetch_campaigns().await
    }

    async fn fetch_clients(&self) -> Result<Vec<Client>> {
        self.inner.fetch_clients().await
    }

    async fn fetch_campaign(&self, id: &CampaignId) -> Result<Campaign> {
        self.inner.fetch_campaign(id).await
    }

    async fn update_campaign_settings(
        &self,
        id: &CampaignId,
        settings: CampaignSettings,
    ) -> Result<Campaign> {
        if let Some((entered, permits)) = &self.gate {
            entered.notify_one();
            let _permit = permits
                .acquire()
                .await
                .map_err(|e| SettingsError::store(e.to_string()))?;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(SettingsError::store("backend unavailable"));
        }
        self.inner.update_campaign_settings(id, settings).await
    }

    async fn create_campaign(&self, campaign: Campaign) -> Result<Campaign> {
        self.inner.create_campaign(campaign).await
    }

    async fn create_client(&self, client: Client) -> Result<Client> {
        self.inner.create_client(client).await
    }
}

async fn context_over(store: Arc<ControlledStore>) -> SettingsContext {
    let ctx = SettingsContext::new(store);
    AddCampaign::new("Spring")
        .with_id("spring")
        .execute(&ctx)
        .await
        .into_result()
        .unwrap();
    ctx
}

#[tokio::test]
async fn test_queued_writes_both_apply() {
    let store = Arc::new(ControlledStore::slow(Duration::from_millis(20)));
    let ctx = context_over(store.clone()).await;

    let first = AddCustomField::new("spring", "score", "Score", FieldType::Number);
    let second = AddCustomField::new("spring", "industry", "Industry", FieldType::Text);
    let (a, b) = tokio::join!(first.execute(&ctx), second.execute(&ctx));
    assert_ok!(a.into_result());
    assert_ok!(b.into_result());

    let stored = store.fetch_campaign(&"spring".into()).await.unwrap();
    assert!(stored.settings.custom_field("score").is_some());
    assert!(stored.settings.custom_field("industry").is_some());
}

#[tokio::test]
async fn test_reject_policy_reports_busy() {
    let store = Arc::new(ControlledStore::gated());
    let ctx = Arc::new(
        context_over(store.clone())
            .await
            .with_write_policy(WritePolicy::Reject),
    );

    let background = {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            SetFieldVisibility::hide("spring", "phone")
                .execute(ctx.as_ref())
                .await
                .into_result()
        })
    };
    store.wait_for_write().await;

    let busy = SetFieldVisibility::hide("spring", "email")
        .execute(ctx.as_ref())
        .await
        .into_result();
    match busy {
        Err(e) => {
            assert!(matches!(e, SettingsError::LockBusy { .. }));
            assert!(e.is_retryable());
        }
        Ok(_) => panic!("expected LockBusy"),
    }

    store.release_write();
    background.await.unwrap().unwrap();

    let card = GetCard::new("spring")
        .execute(ctx.as_ref())
        .await
        .into_result()
        .unwrap();
    assert_eq!(card["body"], serde_json::json!(["email"]));
}

#[tokio::test]
async fn test_failing_store_leaves_cache() {
    let store = Arc::new(ControlledStore::default());
    let ctx = context_over(store.clone()).await;
    let before = ctx.campaign(&"spring".into()).await.unwrap();

    store.fail.store(true, Ordering::SeqCst);
    let result = SetPrimaryField::new("spring", "email")
        .execute(&ctx)
        .await
        .into_result();
    assert!(matches!(result, Err(SettingsError::Store { .. })));

    assert_eq!(ctx.cached_campaign(&"spring".into()).await.unwrap(), before);
    let card = GetCard::new("spring")
        .execute(&ctx)
        .await
        .into_result()
        .unwrap();
    assert_eq!(card["primary"], "full_name");

    store.fail.store(false, Ordering::SeqCst);
    SetPrimaryField::new("spring", "email")
        .execute(&ctx)
        .await
        .into_result()
        .unwrap();
    let card = GetCard::new("spring")
        .execute(&ctx)
        .await
        .into_result()
        .unwrap();
    assert_eq!(card["primary"], "email");
}

#[tokio::test]
async fn test_unconfirmed_delete_writes_nothing() {
    let store = Arc::new(ControlledStore::default());
    let ctx = context_over(store.clone()).await;
    AddCustomField::new("spring", "score", "Score", FieldType::Number)
        .execute(&ctx)
        .await
        .into_result()
        .unwrap();
    let before = store.fetch_campaign(&"spring".into()).await.unwrap();

    for confirmation in [
        Confirmation::default(),
        Confirmation::new("Score", "scor"),
        Confirmation::new("SCORE", "score"),
    ] {
        let result = DeleteCustomField::new("spring", "score", confirmation)
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(
            result,
            Err(SettingsError::ConfirmationMismatch { .. })
        ));
    }

    let after = store.fetch_campaign(&"spring".into()).await.unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_activity_log_end_to_end() {
    let temp = TempDir::new().unwrap();
    let store = FileCampaignStore::open(temp.path().join("data")).await.unwrap();
    let ctx = SettingsContext::new(Arc::new(store)).with_activity_limit(10);
    let processor = SettingsOperationProcessor::with_actor("ana[session123]");

    processor
        .process(&AddCampaign::new("Spring").with_id("spring"), &ctx)
        .await
        .unwrap();
    processor
        .process(
            &AddCustomField::new("spring", "tier", "Tier", FieldType::Select)
                .with_options(["Low", "High"]),
            &ctx,
        )
        .await
        .unwrap();
    processor
        .process(&SetFieldVisibility::show("spring", "tier"), &ctx)
        .await
        .unwrap();
    // Unlogged read
    processor
        .process(&GetCard::new("spring"), &ctx)
        .await
        .unwrap();
    // Failed write is logged too
    assert_err!(
        processor
            .process(
                &DeleteCustomField::new("spring", "tier", Confirmation::new("tier", "tier")),
                &ctx,
            )
            .await
    );

    let entries = ctx.activity(None).await;
    let ops: Vec<&str> = entries.iter().map(|e| e.op.as_str()).collect();
    assert_eq!(
        ops,
        vec!["delete field", "show field", "add field", "add campaign"]
    );
    assert!(entries[0].is_failure());
    assert!(entries
        .iter()
        .all(|e| e.actor.as_deref() == Some("ana[session123]")));
    assert_eq!(entries[1].input["key"], "tier");

    // Settings survived on disk
    let reopened = FileCampaignStore::new(temp.path().join("data"));
    let stored = reopened.fetch_campaign(&"spring".into()).await.unwrap();
    assert_eq!(
        stored.settings.card_field_order,
        vec!["email".to_string(), "phone".to_string(), "tier".to_string()]
    );
}

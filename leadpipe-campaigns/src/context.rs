//! SettingsContext - store access, write serialization and the activity log
//!
//! The context holds no business logic. Commands compute new settings with
//! the pure functions in `leadpipe_fields::mutation` and hand them to
//! [`SettingsContext::mutate_settings`], which owns the read-apply-submit
//! cycle for one campaign.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use leadpipe_fields::{AliasPolicy, CampaignSettings, SystemFieldCatalog};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info, warn};

use crate::config::{LeadpipeConfig, WritePolicy};
use crate::error::{Result, SettingsError};
use crate::store::{CampaignStore, FileCampaignStore};
use crate::types::{Campaign, CampaignId, Client, LogEntry};

/// Outcome of [`SettingsContext::mutate_settings`]
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsUpdate {
    /// Authoritative campaign after the call
    pub campaign: Campaign,
    /// False when the derived settings equaled the stored ones and nothing was written
    pub changed: bool,
}

/// Context passed to every command
pub struct SettingsContext {
    store: Arc<dyn CampaignStore>,
    catalog: SystemFieldCatalog,
    write_policy: WritePolicy,
    lock_timeout: Option<Duration>,
    alias_policy: AliasPolicy,
    activity_limit: usize,
    /// Last authoritative campaign seen per id
    cache: RwLock<HashMap<CampaignId, Campaign>>,
    /// One write lock per campaign, present only while a write holds or waits on it
    locks: Mutex<HashMap<CampaignId, Arc<Mutex<()>>>>,
    /// Newest first
    activity: Mutex<VecDeque<LogEntry>>,
}

impl SettingsContext {
    /// Create a context over a store with the built-in catalog and default policies
    pub fn new(store: Arc<dyn CampaignStore>) -> Self {
        let defaults = LeadpipeConfig::default();
        Self {
            store,
            catalog: SystemFieldCatalog::builtin().clone(),
            write_policy: defaults.write_policy,
            lock_timeout: defaults.lock_timeout(),
            alias_policy: defaults.alias_policy,
            activity_limit: defaults.activity_limit,
            cache: RwLock::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
            activity: Mutex::new(VecDeque::new()),
        }
    }

    /// Open the file store and catalog a configuration points at
    pub async fn from_config(config: &LeadpipeConfig) -> Result<Self> {
        let store = FileCampaignStore::open(&config.data_dir).await?;
        let catalog = config.system_catalog()?;
        Ok(Self::new(Arc::new(store))
            .with_catalog(catalog)
            .with_config(config))
    }

    /// Adopt the policy settings of a configuration
    pub fn with_config(mut self, config: &LeadpipeConfig) -> Self {
        self.write_policy = config.write_policy;
        self.lock_timeout = config.lock_timeout();
        self.alias_policy = config.alias_policy;
        self.activity_limit = config.activity_limit;
        self
    }

    pub fn with_catalog(mut self, catalog: SystemFieldCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.write_policy = policy;
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    pub fn with_alias_policy(mut self, policy: AliasPolicy) -> Self {
        self.alias_policy = policy;
        self
    }

    pub fn with_activity_limit(mut self, limit: usize) -> Self {
        self.activity_limit = limit;
        self
    }

    pub fn catalog(&self) -> &SystemFieldCatalog {
        &self.catalog
    }

    pub fn alias_policy(&self) -> AliasPolicy {
        self.alias_policy
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    pub fn store(&self) -> &Arc<dyn CampaignStore> {
        &self.store
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// A campaign from the cache, fetched from the store on a miss
    pub async fn campaign(&self, id: &CampaignId) -> Result<Campaign> {
        if let Some(campaign) = self.cached_campaign(id).await {
            return Ok(campaign);
        }
        let campaign = self.store.fetch_campaign(id).await?;
        self.adopt(campaign.clone()).await;
        Ok(campaign)
    }

    /// The cached campaign, without touching the store
    pub async fn cached_campaign(&self, id: &CampaignId) -> Option<Campaign> {
        self.cache.read().await.get(id).cloned()
    }

    /// Fetch every campaign and refresh the cache with the result
    pub async fn load_campaigns(&self) -> Result<Vec<Campaign>> {
        let campaigns = self.store.fetch_campaigns().await?;
        let mut cache = self.cache.write().await;
        cache.clear();
        for campaign in &campaigns {
            cache.insert(campaign.id.clone(), campaign.clone());
        }
        debug!(count = campaigns.len(), "loaded campaigns");
        Ok(campaigns)
    }

    pub async fn clients(&self) -> Result<Vec<Client>> {
        self.store.fetch_clients().await
    }

    // =========================================================================
    // Writes
    // =========================================================================

    pub async fn create_campaign(&self, campaign: Campaign) -> Result<Campaign> {
        let created = self.store.create_campaign(campaign).await?;
        self.adopt(created.clone()).await;
        Ok(created)
    }

    pub async fn create_client(&self, client: Client) -> Result<Client> {
        self.store.create_client(client).await
    }

    /// Replace a campaign's settings with `apply(current)`.
    ///
    /// Runs under the campaign's write lock. `current` is read from the store,
    /// not the cache, so a queued write always builds on the previous one.
    /// On any failure the cache keeps its last authoritative value.
    pub async fn mutate_settings<F>(&self, id: &CampaignId, apply: F) -> Result<SettingsUpdate>
    where
        F: FnOnce(&SystemFieldCatalog, &CampaignSettings) -> Result<CampaignSettings> + Send,
    {
        let result = self.write_locked(id, apply).await;
        self.release_lock(id).await;
        result
    }

    async fn write_locked<F>(&self, id: &CampaignId, apply: F) -> Result<SettingsUpdate>
    where
        F: FnOnce(&SystemFieldCatalog, &CampaignSettings) -> Result<CampaignSettings> + Send,
    {
        let _guard = self.acquire(id).await?;

        let current = self.store.fetch_campaign(id).await?;
        let next = apply(&self.catalog, &current.settings)?;
        if next == current.settings {
            debug!(campaign = %id, "settings unchanged, skipping write");
            self.adopt(current.clone()).await;
            return Ok(SettingsUpdate {
                campaign: current,
                changed: false,
            });
        }

        let stored = match self.store.update_campaign_settings(id, next).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(campaign = %id, error = %e, "settings write failed");
                return Err(e);
            }
        };
        info!(campaign = %id, "settings updated");
        self.adopt(stored.clone()).await;
        Ok(SettingsUpdate {
            campaign: stored,
            changed: true,
        })
    }

    /// Drop a campaign's lock entry once nobody holds or waits on it
    async fn release_lock(&self, id: &CampaignId) {
        let mut locks = self.locks.lock().await;
        if locks
            .get(id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(id);
        }
    }

    /// Take the write lock for one campaign according to the write policy
    pub(crate) async fn acquire(&self, id: &CampaignId) -> Result<OwnedMutexGuard<()>> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(id.clone()).or_default().clone()
        };

        match self.write_policy {
            WritePolicy::Reject => lock.try_lock_owned().map_err(|_| {
                warn!(campaign = %id, "rejected concurrent settings write");
                SettingsError::LockBusy { id: id.to_string() }
            }),
            WritePolicy::Queue => match self.lock_timeout {
                None => Ok(lock.lock_owned().await),
                Some(timeout) => {
                    let start = Instant::now();
                    tokio::time::timeout(timeout, lock.lock_owned())
                        .await
                        .map_err(|_| SettingsError::LockTimeout {
                            elapsed_ms: start.elapsed().as_millis() as u64,
                        })
                }
            },
        }
    }

    async fn adopt(&self, campaign: Campaign) {
        self.cache
            .write()
            .await
            .insert(campaign.id.clone(), campaign);
    }

    // =========================================================================
    // Activity log
    // =========================================================================

    /// Append an entry, dropping the oldest past the activity limit
    pub async fn record(&self, entry: LogEntry) {
        let mut activity = self.activity.lock().await;
        activity.push_front(entry);
        activity.truncate(self.activity_limit);
    }

    /// Recent entries, newest first
    pub async fn activity(&self, limit: Option<usize>) -> Vec<LogEntry> {
        let activity = self.activity.lock().await;
        let limit = limit.unwrap_or(activity.len());
        activity.iter().take(limit).cloned().collect()
    }

    /// Recent entries for one campaign, newest first
    pub async fn campaign_activity(&self, id: &CampaignId, limit: Option<usize>) -> Vec<LogEntry> {
        let activity = self.activity.lock().await;
        activity
            .iter()
            .filter(|e| e.campaign_id.as_ref() == Some(id))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCampaignStore;
    use leadpipe_fields::mutation::set_primary_field;
    use serde_json::json;

    async fn setup() -> (SettingsContext, CampaignId) {
        let ctx = SettingsContext::new(Arc::new(MemoryCampaignStore::new()));
        let campaign = ctx
            .create_campaign(Campaign::new("Spring").with_id("spring"))
            .await
            .unwrap();
        (ctx, campaign.id)
    }

    #[tokio::test]
    async fn test_mutate_adopts_store_echo() {
        let (ctx, id) = setup().await;
        let stored = ctx
            .mutate_settings(&id, |_, s| Ok(set_primary_field(s, "email")))
            .await
            .unwrap();

        assert!(stored.changed);
        assert_eq!(stored.campaign.settings.primary_field(), "email");
        let cached = ctx.cached_campaign(&id).await.unwrap();
        assert_eq!(cached, stored.campaign);
    }

    #[tokio::test]
    async fn test_failed_apply_leaves_cache() {
        let (ctx, id) = setup().await;
        let before = ctx.campaign(&id).await.unwrap();

        let result = ctx
            .mutate_settings(&id, |_, _| {
                Err(leadpipe_fields::FieldsError::not_found("ghost").into())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(ctx.cached_campaign(&id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_unchanged_settings_skip_write() {
        let (ctx, id) = setup().await;
        let before = ctx.campaign(&id).await.unwrap();
        let after = ctx.mutate_settings(&id, |_, s| Ok(s.clone())).await.unwrap();
        assert!(!after.changed);
        assert_eq!(before.updated_at, after.campaign.updated_at);
    }

    #[tokio::test]
    async fn test_missing_campaign() {
        let (ctx, _) = setup().await;
        let result = ctx
            .mutate_settings(&CampaignId::from_string("nope"), |_, s| Ok(s.clone()))
            .await;
        assert!(matches!(result, Err(SettingsError::CampaignNotFound { .. })));
        assert!(ctx.locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_lock_entries_released_after_writes() {
        let (ctx, id) = setup().await;
        ctx.mutate_settings(&id, |_, s| Ok(set_primary_field(s, "email")))
            .await
            .unwrap();
        let _ = ctx
            .mutate_settings(&id, |_, _| {
                Err(leadpipe_fields::FieldsError::not_found("ghost").into())
            })
            .await;
        assert!(ctx.locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_lock_entry_kept_while_held() {
        let (ctx, id) = setup().await;
        let ctx = ctx.with_write_policy(WritePolicy::Reject);

        let held = ctx.acquire(&id).await.unwrap();
        let busy = ctx
            .mutate_settings(&id, |_, s| Ok(set_primary_field(s, "email")))
            .await;
        assert!(matches!(busy, Err(SettingsError::LockBusy { .. })));
        assert!(ctx.locks.lock().await.contains_key(&id));

        drop(held);
        ctx.mutate_settings(&id, |_, s| Ok(set_primary_field(s, "email")))
            .await
            .unwrap();
        assert!(ctx.locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_reject_policy_fails_fast() {
        let (ctx, id) = setup().await;
        let ctx = ctx.with_write_policy(WritePolicy::Reject);

        let _held = ctx.acquire(&id).await.unwrap();
        let result = ctx.acquire(&id).await;
        assert!(matches!(result, Err(SettingsError::LockBusy { .. })));

        // Other campaigns are unaffected
        assert!(ctx.acquire(&CampaignId::from_string("other")).await.is_ok());
    }

    #[tokio::test]
    async fn test_queue_policy_times_out() {
        let (ctx, id) = setup().await;
        let ctx = ctx.with_lock_timeout(Duration::from_millis(20));

        let _held = ctx.acquire(&id).await.unwrap();
        let result = ctx.acquire(&id).await;
        assert!(matches!(result, Err(SettingsError::LockTimeout { .. })));
    }

    #[tokio::test]
    async fn test_activity_is_newest_first_and_bounded() {
        let (ctx, id) = setup().await;
        let ctx = ctx.with_activity_limit(2);

        for op in ["show field", "hide field", "reorder field"] {
            ctx.record(LogEntry::new(op, json!({}), json!({}), 0).for_campaign(id.clone()))
                .await;
        }

        let ops: Vec<String> = ctx.activity(None).await.into_iter().map(|e| e.op).collect();
        assert_eq!(ops, vec!["reorder field", "hide field"]);
        assert_eq!(ctx.activity(Some(1)).await.len(), 1);
        assert_eq!(ctx.campaign_activity(&id, None).await.len(), 2);
        assert!(ctx
            .campaign_activity(&CampaignId::from_string("other"), None)
            .await
            .is_empty());
    }
}

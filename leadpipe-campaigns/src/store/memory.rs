//! In-memory store, used by tests and as a scratch backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use leadpipe_fields::CampaignSettings;
use tokio::sync::RwLock;

use super::CampaignStore;
use crate::error::{Result, SettingsError};
use crate::types::{Campaign, CampaignId, Client, ClientId};

#[derive(Default)]
pub struct MemoryCampaignStore {
    campaigns: RwLock<BTreeMap<CampaignId, Campaign>>,
    clients: RwLock<BTreeMap<ClientId, Client>>,
}

impl MemoryCampaignStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing campaigns, replacing any with the same id.
    pub async fn with_campaigns(self, campaigns: impl IntoIterator<Item = Campaign>) -> Self {
        {
            let mut map = self.campaigns.write().await;
            for campaign in campaigns {
                map.insert(campaign.id.clone(), campaign);
            }
        }
        self
    }
}

#[async_trait]
impl CampaignStore for MemoryCampaignStore {
    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>> {
        Ok(self.campaigns.read().await.values().cloned().collect())
    }

    async fn fetch_clients(&self) -> Result<Vec<Client>> {
        Ok(self.clients.read().await.values().cloned().collect())
    }

    async fn fetch_campaign(&self, id: &CampaignId) -> Result<Campaign> {
        self.campaigns
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SettingsError::CampaignNotFound { id: id.to_string() })
    }

    async fn update_campaign_settings(
        &self,
        id: &CampaignId,
        settings: CampaignSettings,
    ) -> Result<Campaign> {
        let mut map = self.campaigns.write().await;
        let campaign = map
            .get_mut(id)
            .ok_or_else(|| SettingsError::CampaignNotFound { id: id.to_string() })?;
        campaign.settings = settings;
        campaign.updated_at = Utc::now();
        Ok(campaign.clone())
    }

    async fn create_campaign(&self, campaign: Campaign) -> Result<Campaign> {
        let mut map = self.campaigns.write().await;
        if map.contains_key(&campaign.id) {
            return Err(SettingsError::duplicate_id("campaign", campaign.id.to_string()));
        }
        map.insert(campaign.id.clone(), campaign.clone());
        Ok(campaign)
    }

    async fn create_client(&self, client: Client) -> Result<Client> {
        let mut map = self.clients.write().await;
        if map.contains_key(&client.id) {
            return Err(SettingsError::duplicate_id("client", client.id.to_string()));
        }
        map.insert(client.id.clone(), client.clone());
        Ok(client)
    }
}

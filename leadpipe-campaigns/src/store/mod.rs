//! Persistence collaborators for campaigns and clients.
//!
//! The store is authoritative. `update_campaign_settings` replaces the whole
//! settings object and echoes the stored campaign back; callers adopt the
//! echo rather than their own provisional value.

mod file;
mod memory;

pub use file::FileCampaignStore;
pub use memory::MemoryCampaignStore;

use async_trait::async_trait;
use leadpipe_fields::CampaignSettings;

use crate::error::{Result, SettingsError};
use crate::types::{Campaign, CampaignId, Client};

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>>;

    async fn fetch_clients(&self) -> Result<Vec<Client>>;

    /// Replace a campaign's settings wholesale and return the stored campaign.
    async fn update_campaign_settings(
        &self,
        id: &CampaignId,
        settings: CampaignSettings,
    ) -> Result<Campaign>;

    async fn create_campaign(&self, campaign: Campaign) -> Result<Campaign>;

    async fn create_client(&self, client: Client) -> Result<Client>;

    async fn fetch_campaign(&self, id: &CampaignId) -> Result<Campaign> {
        self.fetch_campaigns()
            .await?
            .into_iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| SettingsError::CampaignNotFound { id: id.to_string() })
    }
}

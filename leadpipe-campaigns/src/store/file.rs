//! JSON-file store.
//!
//! Layout under the data directory:
//!
//! ```text
//! campaigns/<id>.json
//! clients/<id>.json
//! ```
//!
//! Every write goes to a temp file next to the target and is renamed into
//! place. Files that fail to parse are skipped with a warning when listing.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use leadpipe_fields::CampaignSettings;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tracing::{debug, warn};

use super::CampaignStore;
use crate::error::{Result, SettingsError};
use crate::types::{Campaign, CampaignId, Client, ClientId};

pub struct FileCampaignStore {
    root: PathBuf,
}

impl FileCampaignStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open a store, creating its directories if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(root);
        fs::create_dir_all(store.campaigns_dir()).await?;
        fs::create_dir_all(store.clients_dir()).await?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn campaigns_dir(&self) -> PathBuf {
        self.root.join("campaigns")
    }

    pub fn clients_dir(&self) -> PathBuf {
        self.root.join("clients")
    }

    /// Path of a campaign document. Fails for ids that would leave `campaigns/`.
    pub fn campaign_path(&self, id: &CampaignId) -> Result<PathBuf> {
        Ok(self.campaigns_dir().join(file_name("campaign", id.as_str())?))
    }

    /// Path of a client document. Fails for ids that would leave `clients/`.
    pub fn client_path(&self, id: &ClientId) -> Result<PathBuf> {
        Ok(self.clients_dir().join(file_name("client", id.as_str())?))
    }

    async fn read_campaign(&self, id: &CampaignId) -> Result<Campaign> {
        let path = self.campaign_path(id)?;
        if !path.exists() {
            return Err(SettingsError::CampaignNotFound { id: id.to_string() });
        }
        let content = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    async fn write_campaign(&self, campaign: &Campaign) -> Result<()> {
        write_json(&self.campaign_path(&campaign.id)?, campaign).await
    }
}

#[async_trait]
impl CampaignStore for FileCampaignStore {
    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>> {
        read_all(&self.campaigns_dir()).await
    }

    async fn fetch_clients(&self) -> Result<Vec<Client>> {
        read_all(&self.clients_dir()).await
    }

    async fn fetch_campaign(&self, id: &CampaignId) -> Result<Campaign> {
        self.read_campaign(id).await
    }

    async fn update_campaign_settings(
        &self,
        id: &CampaignId,
        settings: CampaignSettings,
    ) -> Result<Campaign> {
        let mut campaign = self.read_campaign(id).await?;
        campaign.settings = settings;
        campaign.updated_at = Utc::now();
        self.write_campaign(&campaign).await?;
        debug!(campaign = %id, "wrote campaign settings");
        Ok(campaign)
    }

    async fn create_campaign(&self, campaign: Campaign) -> Result<Campaign> {
        if self.campaign_path(&campaign.id)?.exists() {
            return Err(SettingsError::duplicate_id("campaign", campaign.id.to_string()));
        }
        self.write_campaign(&campaign).await?;
        Ok(campaign)
    }

    async fn create_client(&self, client: Client) -> Result<Client> {
        let path = self.client_path(&client.id)?;
        if path.exists() {
            return Err(SettingsError::duplicate_id("client", client.id.to_string()));
        }
        write_json(&path, &client).await?;
        Ok(client)
    }
}

/// `<id>.json`, provided the id is a single plain path component.
fn file_name(item_type: &str, id: &str) -> Result<String> {
    if id.is_empty() || id.contains("..") || id.contains(['/', '\\', '\0']) {
        warn!(item_type, id, "refusing unsafe id");
        return Err(SettingsError::InvalidId {
            item_type: item_type.to_string(),
            id: id.to_string(),
        });
    }
    Ok(format!("{id}.json"))
}

/// Read every `*.json` file in a directory, sorted by file name.
async fn read_all<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut items = Vec::with_capacity(paths.len());
    for path in paths {
        let content = fs::read_to_string(&path).await?;
        match serde_json::from_str(&content) {
            Ok(item) => items.push(item),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable file"),
        }
    }
    Ok(items)
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    atomic_write(path, content.as_bytes()).await
}

/// Write via temp file and rename.
async fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).await?;
    fs::rename(&temp_path, path).await?;
    Ok(())
}

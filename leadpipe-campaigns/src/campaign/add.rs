//! AddCampaign command

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::card::campaign_view;
use crate::context::SettingsContext;
use crate::error::SettingsError;
use crate::operation::{logged, operation, Execute, ExecutionResult};
use crate::types::{Campaign, CampaignId, ClientId};

/// Create a campaign with starter settings
#[derive(Debug, Deserialize, Serialize)]
pub struct AddCampaign {
    /// Explicit id; a ULID is generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CampaignId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
}

operation!(
    AddCampaign,
    verb = "add",
    noun = "campaign",
    description = "Create a campaign"
);

impl AddCampaign {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            client_id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<CampaignId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_client(mut self, client_id: impl Into<ClientId>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for AddCampaign {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        let start = Instant::now();
        let mut campaign = Campaign::new(&self.name);
        if let Some(id) = &self.id {
            campaign = campaign.with_id(id.clone());
        }
        let campaign_id = campaign.id.clone();

        let result = async {
            if self.name.trim().is_empty() {
                return Err(SettingsError::missing_field("name"));
            }
            if let Some(client_id) = &self.client_id {
                let clients = ctx.clients().await?;
                if !clients.iter().any(|c| &c.id == client_id) {
                    return Err(SettingsError::ClientNotFound {
                        id: client_id.to_string(),
                    });
                }
                campaign = campaign.with_client(client_id.clone());
            }
            let created = ctx.create_campaign(campaign).await?;
            campaign_view(ctx.catalog(), &created)
        }
        .await;
        logged(self, Some(&campaign_id), start, result)
    }
}

//! GetCampaign command

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::card::campaign_view;
use crate::context::SettingsContext;
use crate::error::SettingsError;
use crate::operation::{operation, unlogged, Execute, ExecutionResult};
use crate::types::CampaignId;

/// Get one campaign with its settings and derived card
#[derive(Debug, Deserialize, Serialize)]
pub struct GetCampaign {
    pub id: CampaignId,
}

operation!(
    GetCampaign,
    verb = "get",
    noun = "campaign",
    description = "Get a campaign by ID"
);

impl GetCampaign {
    pub fn new(id: impl Into<CampaignId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for GetCampaign {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        unlogged(
            async {
                let campaign = ctx.campaign(&self.id).await?;
                campaign_view(ctx.catalog(), &campaign)
            }
            .await,
        )
    }
}

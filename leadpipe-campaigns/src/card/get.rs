//! GetCard command

use async_trait::async_trait;
use leadpipe_fields::FieldResolver;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::SettingsContext;
use crate::error::SettingsError;
use crate::operation::{operation, unlogged, Execute, ExecutionResult};
use crate::types::CampaignId;

/// Derive a campaign's card: headline, body, hidden and client fields
#[derive(Debug, Deserialize, Serialize)]
pub struct GetCard {
    pub campaign_id: CampaignId,
}

operation!(
    GetCard,
    verb = "get",
    noun = "card",
    description = "Show the card layout for a campaign"
);

impl GetCard {
    pub fn new(campaign_id: impl Into<CampaignId>) -> Self {
        Self {
            campaign_id: campaign_id.into(),
        }
    }
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for GetCard {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        unlogged(
            async {
                let campaign = ctx.campaign(&self.campaign_id).await?;
                let resolver = FieldResolver::new(ctx.catalog(), &campaign.settings);
                let layout = resolver.card_layout();

                // Display names for every key the card mentions
                let mut labels = Map::new();
                let keys = layout.body.iter().chain(layout.hidden.iter());
                for key in keys {
                    if let Some(detail) = resolver.resolve_field(key) {
                        labels.insert(key.clone(), Value::String(detail.name().to_string()));
                    }
                }

                let mut value = serde_json::to_value(&layout)?;
                value["labels"] = Value::Object(labels);
                Ok(value)
            }
            .await,
        )
    }
}

//! PurgeCard command

use std::time::Instant;

use async_trait::async_trait;
use leadpipe_fields::mutation::purge_stale_card_fields;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::update_view;
use crate::context::SettingsContext;
use crate::error::SettingsError;
use crate::operation::{logged, operation, Execute, ExecutionResult};
use crate::types::CampaignId;

/// Drop inactive keys and the primary field from the stored card order.
///
/// Reads already filter these out; this rewrites the stored list to match.
#[derive(Debug, Deserialize, Serialize)]
pub struct PurgeCard {
    pub campaign_id: CampaignId,
}

operation!(
    PurgeCard,
    verb = "purge",
    noun = "card",
    description = "Remove stale keys from a campaign's card order"
);

impl PurgeCard {
    pub fn new(campaign_id: impl Into<CampaignId>) -> Self {
        Self {
            campaign_id: campaign_id.into(),
        }
    }
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for PurgeCard {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        let start = Instant::now();
        let result = async {
            let stored = ctx
                .mutate_settings(&self.campaign_id, |catalog, settings| {
                    Ok(purge_stale_card_fields(catalog, settings))
                })
                .await?;
            update_view(ctx.catalog(), &stored)
        }
        .await;
        logged(self, Some(&self.campaign_id), start, result)
    }
}

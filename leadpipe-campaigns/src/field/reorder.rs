//! ReorderField command

use std::time::Instant;

use async_trait::async_trait;
use leadpipe_fields::mutation::reorder_field;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::card::update_view;
use crate::context::SettingsContext;
use crate::error::SettingsError;
use crate::operation::{logged, operation, Execute, ExecutionResult};
use crate::types::CampaignId;

/// Move a card body field to a new position (the drop target of a drag).
///
/// `target_index` is clamped to the end of the list.
#[derive(Debug, Deserialize, Serialize)]
pub struct ReorderField {
    pub campaign_id: CampaignId,
    pub key: String,
    pub target_index: usize,
}

operation!(
    ReorderField,
    verb = "reorder",
    noun = "field",
    description = "Move a card body field to a new position"
);

impl ReorderField {
    pub fn new(
        campaign_id: impl Into<CampaignId>,
        key: impl Into<String>,
        target_index: usize,
    ) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            key: key.into(),
            target_index,
        }
    }
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for ReorderField {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        let start = Instant::now();
        let result = async {
            let stored = ctx
                .mutate_settings(&self.campaign_id, |_, settings| {
                    Ok(reorder_field(settings, &self.key, self.target_index)?)
                })
                .await?;
            update_view(ctx.catalog(), &stored)
        }
        .await;
        logged(self, Some(&self.campaign_id), start, result)
    }
}

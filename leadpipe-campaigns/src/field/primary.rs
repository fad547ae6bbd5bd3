//! SetPrimaryField command

use std::time::Instant;

use async_trait::async_trait;
use leadpipe_fields::mutation::set_primary_field;
use leadpipe_fields::FieldResolver;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::require_active;
use crate::card::update_view;
use crate::context::SettingsContext;
use crate::error::SettingsError;
use crate::operation::{logged, operation, Execute, ExecutionResult};
use crate::types::CampaignId;

/// Choose the field shown as a card's headline.
///
/// The key must be active. It is taken off the card body so it never
/// renders twice.
#[derive(Debug, Deserialize, Serialize)]
pub struct SetPrimaryField {
    pub campaign_id: CampaignId,
    pub key: String,
}

operation!(
    SetPrimaryField,
    verb = "set",
    noun = "primary",
    description = "Choose the card headline field"
);

impl SetPrimaryField {
    pub fn new(campaign_id: impl Into<CampaignId>, key: impl Into<String>) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            key: key.into(),
        }
    }
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for SetPrimaryField {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        let start = Instant::now();
        let result = async {
            let stored = ctx
                .mutate_settings(&self.campaign_id, |catalog, settings| {
                    require_active(&FieldResolver::new(catalog, settings), &self.key)?;
                    Ok(set_primary_field(settings, &self.key))
                })
                .await?;
            update_view(ctx.catalog(), &stored)
        }
        .await;
        logged(self, Some(&self.campaign_id), start, result)
    }
}

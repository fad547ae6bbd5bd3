//! SetDiscoveredFields command

use std::time::Instant;

use async_trait::async_trait;
use leadpipe_fields::mutation::set_discovered_fields;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::card::update_view;
use crate::context::SettingsContext;
use crate::error::SettingsError;
use crate::operation::{logged, operation, Execute, ExecutionResult};
use crate::types::CampaignId;

/// Record the field names an ingestion source sends, replacing the previous list
#[derive(Debug, Deserialize, Serialize)]
pub struct SetDiscoveredFields {
    pub campaign_id: CampaignId,
    pub fields: Vec<String>,
}

operation!(
    SetDiscoveredFields,
    verb = "discover",
    noun = "fields",
    description = "Record external field names seen from a lead source"
);

impl SetDiscoveredFields {
    pub fn new<I, S>(campaign_id: impl Into<CampaignId>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            campaign_id: campaign_id.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for SetDiscoveredFields {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        let start = Instant::now();
        let result = async {
            let stored = ctx
                .mutate_settings(&self.campaign_id, |_, settings| {
                    Ok(set_discovered_fields(settings, self.fields.iter().cloned()))
                })
                .await?;
            update_view(ctx.catalog(), &stored)
        }
        .await;
        logged(self, Some(&self.campaign_id), start, result)
    }
}

//! SetFieldVisibility command

use std::time::Instant;

use async_trait::async_trait;
use leadpipe_fields::mutation::set_field_visibility;
use leadpipe_fields::FieldResolver;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::require_active;
use crate::card::update_view;
use crate::context::SettingsContext;
use crate::error::SettingsError;
use crate::operation::{logged, Execute, ExecutionResult, Operation};
use crate::types::CampaignId;

/// Show a field on the card body (appended at the end) or hide it.
///
/// Showing requires an active field; hiding always succeeds.
#[derive(Debug, Deserialize, Serialize)]
pub struct SetFieldVisibility {
    pub campaign_id: CampaignId,
    pub key: String,
    pub show: bool,
}

impl SetFieldVisibility {
    pub fn new(campaign_id: impl Into<CampaignId>, key: impl Into<String>, show: bool) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            key: key.into(),
            show,
        }
    }

    pub fn show(campaign_id: impl Into<CampaignId>, key: impl Into<String>) -> Self {
        Self::new(campaign_id, key, true)
    }

    pub fn hide(campaign_id: impl Into<CampaignId>, key: impl Into<String>) -> Self {
        Self::new(campaign_id, key, false)
    }
}

impl Operation for SetFieldVisibility {
    fn verb(&self) -> &'static str {
        if self.show {
            "show"
        } else {
            "hide"
        }
    }

    fn noun(&self) -> &'static str {
        "field"
    }

    fn description(&self) -> &'static str {
        "Show or hide a field on the card body"
    }
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for SetFieldVisibility {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        let start = Instant::now();
        let result = async {
            let stored = ctx
                .mutate_settings(&self.campaign_id, |catalog, settings| {
                    if self.show {
                        require_active(&FieldResolver::new(catalog, settings), &self.key)?;
                    }
                    Ok(set_field_visibility(settings, &self.key, self.show))
                })
                .await?;
            update_view(ctx.catalog(), &stored)
        }
        .await;
        logged(self, Some(&self.campaign_id), start, result)
    }
}

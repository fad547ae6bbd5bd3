//! SetSystemFieldPublic command

use std::time::Instant;

use async_trait::async_trait;
use leadpipe_fields::mutation::set_system_field_public;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::card::update_view;
use crate::context::SettingsContext;
use crate::error::SettingsError;
use crate::operation::{logged, Execute, ExecutionResult, Operation};
use crate::types::CampaignId;

/// Expose an active system field to the client portal, or withdraw it.
///
/// Custom fields carry their own visibility; use `UpdateCustomField` for those.
#[derive(Debug, Deserialize, Serialize)]
pub struct SetSystemFieldPublic {
    pub campaign_id: CampaignId,
    pub key: String,
    pub public: bool,
}

impl SetSystemFieldPublic {
    pub fn new(campaign_id: impl Into<CampaignId>, key: impl Into<String>, public: bool) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            key: key.into(),
            public,
        }
    }
}

impl Operation for SetSystemFieldPublic {
    fn verb(&self) -> &'static str {
        if self.public {
            "publish"
        } else {
            "unpublish"
        }
    }

    fn noun(&self) -> &'static str {
        "system field"
    }

    fn description(&self) -> &'static str {
        "Show or hide a system field in the client portal"
    }
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for SetSystemFieldPublic {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        let start = Instant::now();
        let result = async {
            let stored = ctx
                .mutate_settings(&self.campaign_id, |catalog, settings| {
                    Ok(set_system_field_public(
                        catalog,
                        settings,
                        &self.key,
                        self.public,
                    )?)
                })
                .await?;
            update_view(ctx.catalog(), &stored)
        }
        .await;
        logged(self, Some(&self.campaign_id), start, result)
    }
}

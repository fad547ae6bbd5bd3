//! ListCampaigns command

use async_trait::async_trait;
use leadpipe_fields::FieldResolver;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::context::SettingsContext;
use crate::error::SettingsError;
use crate::operation::{operation, unlogged, Execute, ExecutionResult};
use crate::types::ClientId;

/// List campaigns, optionally for one client
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ListCampaigns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
}

operation!(
    ListCampaigns,
    verb = "list",
    noun = "campaigns",
    description = "List campaigns"
);

impl ListCampaigns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_client(mut self, client_id: impl Into<ClientId>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for ListCampaigns {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        unlogged(
            async {
                let campaigns = ctx.load_campaigns().await?;
                let summaries: Vec<Value> = campaigns
                    .iter()
                    .filter(|c| {
                        self.client_id.is_none() || c.client_id.as_ref() == self.client_id.as_ref()
                    })
                    .map(|c| {
                        let resolver = FieldResolver::new(ctx.catalog(), &c.settings);
                        json!({
                            "id": c.id,
                            "name": c.name,
                            "client_id": c.client_id,
                            "primary": c.settings.primary_field(),
                            "active_fields": resolver.active_field_keys().len(),
                            "custom_fields": c.settings.custom_fields.len(),
                            "updated_at": c.updated_at,
                        })
                    })
                    .collect();
                Ok(json!({ "campaigns": summaries, "count": summaries.len() }))
            }
            .await,
        )
    }
}

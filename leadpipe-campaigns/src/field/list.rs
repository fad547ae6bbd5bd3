//! GetFields command

use async_trait::async_trait;
use leadpipe_fields::{FieldDetail, FieldResolver};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::context::SettingsContext;
use crate::error::SettingsError;
use crate::operation::{operation, unlogged, Execute, ExecutionResult};
use crate::types::CampaignId;

/// List every field a campaign knows about, system fields first.
#[derive(Debug, Deserialize, Serialize)]
pub struct GetFields {
    pub campaign_id: CampaignId,
    /// Only fields switched on for the campaign
    #[serde(default)]
    pub active_only: bool,
}

operation!(
    GetFields,
    verb = "list",
    noun = "fields",
    description = "List a campaign's system and custom fields"
);

impl GetFields {
    pub fn new(campaign_id: impl Into<CampaignId>) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            active_only: false,
        }
    }

    pub fn active_only(mut self) -> Self {
        self.active_only = true;
        self
    }
}

fn field_json(detail: &FieldDetail<'_>, resolver: &FieldResolver<'_>) -> Value {
    let settings = resolver.settings();
    let key = detail.key();
    let options: Vec<&str> = detail.options().iter().map(|o| o.display_label()).collect();
    json!({
        "key": key,
        "name": detail.name(),
        "type": detail.field_type(),
        "system": detail.is_system(),
        "active": detail.is_active(),
        "public": detail.is_public(),
        "required": detail.is_required(),
        "primary": settings.primary_field() == key,
        "on_card": resolver.visible_card_fields().contains(&key),
        "aliases": detail.aliases(),
        "options": options,
    })
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for GetFields {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        unlogged(
            async {
                let campaign = ctx.campaign(&self.campaign_id).await?;
                let resolver = FieldResolver::new(ctx.catalog(), &campaign.settings);
                let fields: Vec<Value> = resolver
                    .all_fields()
                    .iter()
                    .filter(|d| !self.active_only || d.is_active())
                    .map(|d| field_json(d, &resolver))
                    .collect();
                Ok(json!({
                    "fields": fields,
                    "count": fields.len(),
                    "alias_collisions": resolver.alias_collisions(),
                }))
            }
            .await,
        )
    }
}

//! MapDiscoveredFields and MapRecord commands

use async_trait::async_trait;
use leadpipe_fields::FieldResolver;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::context::SettingsContext;
use crate::error::SettingsError;
use crate::operation::{operation, unlogged, Execute, ExecutionResult};
use crate::types::CampaignId;

/// Resolve a campaign's discovered field names against its aliases
#[derive(Debug, Deserialize, Serialize)]
pub struct MapDiscoveredFields {
    pub campaign_id: CampaignId,
}

operation!(
    MapDiscoveredFields,
    verb = "map",
    noun = "fields",
    description = "Show how discovered field names map onto campaign fields"
);

impl MapDiscoveredFields {
    pub fn new(campaign_id: impl Into<CampaignId>) -> Self {
        Self {
            campaign_id: campaign_id.into(),
        }
    }
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for MapDiscoveredFields {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        unlogged(
            async {
                let campaign = ctx.campaign(&self.campaign_id).await?;
                let resolver = FieldResolver::new(ctx.catalog(), &campaign.settings);
                let mappings: Vec<Value> = resolver
                    .map_discovered_fields()
                    .into_iter()
                    .map(|(external, mapping)| {
                        json!({
                            "external": external,
                            "key": mapping.key(),
                            "name": mapping.name(),
                        })
                    })
                    .collect();
                Ok(json!({
                    "mappings": mappings,
                    "unmapped": resolver.unmapped_discovered_fields(),
                }))
            }
            .await,
        )
    }
}

/// Split one incoming lead payload into mapped and unmapped values
#[derive(Debug, Deserialize, Serialize)]
pub struct MapRecord {
    pub campaign_id: CampaignId,
    pub record: Map<String, Value>,
}

operation!(
    MapRecord,
    verb = "map",
    noun = "record",
    description = "Map an incoming lead record onto campaign fields"
);

impl MapRecord {
    pub fn new(campaign_id: impl Into<CampaignId>, record: Map<String, Value>) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            record,
        }
    }
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for MapRecord {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        unlogged(
            async {
                let campaign = ctx.campaign(&self.campaign_id).await?;
                let resolver = FieldResolver::new(ctx.catalog(), &campaign.settings);
                Ok(serde_json::to_value(resolver.map_record(&self.record))?)
            }
            .await,
        )
    }
}

//! DeleteCustomField command

use std::time::Instant;

use async_trait::async_trait;
use leadpipe_fields::mutation::delete_custom_field;
use leadpipe_fields::CustomFieldDef;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::card::update_view;
use crate::context::SettingsContext;
use crate::error::SettingsError;
use crate::operation::{logged, operation, Execute, ExecutionResult};
use crate::types::CampaignId;

/// The field's display name and key, typed back by the user.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Confirmation {
    pub name: String,
    pub key: String,
}

impl Confirmation {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }

    /// Exact, case-sensitive match on both name and key
    pub fn matches(&self, def: &CustomFieldDef) -> bool {
        self.name == def.name && self.key == def.key
    }
}

/// Delete a custom field and scrub its key from the campaign.
///
/// Removes the definition, card position, any system lists holding the key,
/// and reassigns the primary field if it pointed here. Nothing is written
/// unless the confirmation matches the definition being deleted.
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteCustomField {
    pub campaign_id: CampaignId,
    pub key: String,
    pub confirmation: Confirmation,
}

operation!(
    DeleteCustomField,
    verb = "delete",
    noun = "field",
    description = "Delete a custom field from a campaign"
);

impl DeleteCustomField {
    pub fn new(
        campaign_id: impl Into<CampaignId>,
        key: impl Into<String>,
        confirmation: Confirmation,
    ) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            key: key.into(),
            confirmation,
        }
    }
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for DeleteCustomField {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        let start = Instant::now();
        let result = async {
            let stored = ctx
                .mutate_settings(&self.campaign_id, |catalog, settings| {
                    if let Some(def) = settings.custom_field(&self.key) {
                        if !self.confirmation.matches(def) {
                            return Err(SettingsError::ConfirmationMismatch {
                                key: def.key.clone(),
                                name: def.name.clone(),
                            });
                        }
                    }
                    Ok(delete_custom_field(catalog, settings, &self.key)?)
                })
                .await?;
            update_view(ctx.catalog(), &stored)
        }
        .await;
        logged(self, Some(&self.campaign_id), start, result)
    }
}

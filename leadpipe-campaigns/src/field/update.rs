//! UpdateCustomField command

use std::time::Instant;

use async_trait::async_trait;
use leadpipe_fields::mutation::update_custom_field;
use leadpipe_fields::{CustomFieldPatch, FieldType, SelectOption, Visibility};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::card::update_view;
use crate::context::SettingsContext;
use crate::error::SettingsError;
use crate::operation::{logged, operation, Execute, ExecutionResult};
use crate::types::CampaignId;

/// Edit a custom field's definition. The key itself cannot change.
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateCustomField {
    pub campaign_id: CampaignId,
    pub key: String,
    #[serde(default)]
    pub patch: CustomFieldPatch,
}

operation!(
    UpdateCustomField,
    verb = "update",
    noun = "field",
    description = "Edit a custom field definition"
);

impl UpdateCustomField {
    pub fn new(campaign_id: impl Into<CampaignId>, key: impl Into<String>) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            key: key.into(),
            patch: CustomFieldPatch::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.patch.name = Some(name.into());
        self
    }

    pub fn with_type(mut self, type_: FieldType) -> Self {
        self.patch.type_ = Some(type_);
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.patch.required = Some(required);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.patch.visibility = Some(visibility);
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patch.options = Some(options.into_iter().map(SelectOption::new).collect());
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patch.aliases = Some(aliases.into_iter().map(Into::into).collect());
        self
    }
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for UpdateCustomField {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        let start = Instant::now();
        let policy = ctx.alias_policy();
        let result = async {
            let stored = ctx
                .mutate_settings(&self.campaign_id, |catalog, settings| {
                    Ok(update_custom_field(
                        catalog,
                        settings,
                        &self.key,
                        &self.patch,
                        policy,
                    )?)
                })
                .await?;
            update_view(ctx.catalog(), &stored)
        }
        .await;
        logged(self, Some(&self.campaign_id), start, result)
    }
}

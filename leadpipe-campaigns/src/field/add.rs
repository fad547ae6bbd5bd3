//! AddCustomField command

use std::time::Instant;

use async_trait::async_trait;
use leadpipe_fields::mutation::add_custom_field;
use leadpipe_fields::{CustomFieldDef, FieldType, Visibility};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::card::update_view;
use crate::context::SettingsContext;
use crate::error::SettingsError;
use crate::operation::{logged, operation, Execute, ExecutionResult};
use crate::types::CampaignId;

/// Define a new custom field for a campaign
#[derive(Debug, Deserialize, Serialize)]
pub struct AddCustomField {
    pub campaign_id: CampaignId,
    pub field: CustomFieldDef,
}

operation!(
    AddCustomField,
    verb = "add",
    noun = "field",
    description = "Add a custom field to a campaign"
);

impl AddCustomField {
    pub fn new(
        campaign_id: impl Into<CampaignId>,
        key: impl Into<String>,
        name: impl Into<String>,
        type_: FieldType,
    ) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            field: CustomFieldDef::new(key, name, type_),
        }
    }

    /// Add a fully built definition
    pub fn from_def(campaign_id: impl Into<CampaignId>, field: CustomFieldDef) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            field,
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field = self.field.with_aliases(aliases);
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field = self.field.with_options(options);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.field = self.field.with_visibility(visibility);
        self
    }

    pub fn required(mut self) -> Self {
        self.field = self.field.required();
        self
    }
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for AddCustomField {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        let start = Instant::now();
        let policy = ctx.alias_policy();
        let result = async {
            let stored = ctx
                .mutate_settings(&self.campaign_id, |catalog, settings| {
                    Ok(add_custom_field(catalog, settings, self.field.clone(), policy)?)
                })
                .await?;
            update_view(ctx.catalog(), &stored)
        }
        .await;
        logged(self, Some(&self.campaign_id), start, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCampaignStore;
    use crate::types::Campaign;
    use leadpipe_fields::{AliasPolicy, FieldsError};
    use std::sync::Arc;

    async fn setup() -> SettingsContext {
        let ctx = SettingsContext::new(Arc::new(MemoryCampaignStore::new()));
        ctx.create_campaign(Campaign::new("Spring").with_id("spring"))
            .await
            .unwrap();
        ctx
    }

    #[tokio::test]
    async fn test_add_field() {
        let ctx = setup().await;
        let value = AddCustomField::new("spring", "budget_tier", "Budget Tier", FieldType::Select)
            .with_options(["Low", "High"])
            .with_aliases(["tier"])
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        let fields = &value["settings"]["custom_fields"];
        assert_eq!(fields[0]["key"], "budget_tier");
        assert_eq!(fields[0]["type"], "select");
        assert_eq!(fields[0]["is_active"], true);
        // New fields start hidden
        assert!(value["card"]["hidden"]
            .as_array()
            .unwrap()
            .contains(&Value::from("budget_tier")));
    }

    #[tokio::test]
    async fn test_duplicate_key_rejected() {
        let ctx = setup().await;
        let result = AddCustomField::new("spring", "email", "Email 2", FieldType::Email)
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(
            result,
            Err(SettingsError::Fields(FieldsError::DuplicateKey { .. }))
        ));
    }

    #[tokio::test]
    async fn test_alias_policy_comes_from_context() {
        let ctx = setup().await;
        let cmd = AddCustomField::new("spring", "alt_phone", "Alt Phone", FieldType::Tel)
            .with_aliases(["mobile"]);

        let rejected = cmd.execute(&ctx).await.into_result();
        assert!(matches!(
            rejected,
            Err(SettingsError::Fields(FieldsError::AliasCollision { .. }))
        ));

        let ctx = ctx.with_alias_policy(AliasPolicy::Allow);
        assert!(cmd.execute(&ctx).await.into_result().is_ok());
    }
}

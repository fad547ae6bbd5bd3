//! SetCustomFieldActive and SetSystemFieldActive commands

use std::time::Instant;

use async_trait::async_trait;
use leadpipe_fields::mutation::{set_custom_field_active, set_system_field_active};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::card::update_view;
use crate::context::SettingsContext;
use crate::error::SettingsError;
use crate::operation::{logged, Execute, ExecutionResult, Operation};
use crate::types::CampaignId;

/// Switch a custom field on or off.
///
/// Deactivating takes the field off the card and, if it was the headline,
/// hands the headline to the next active field.
#[derive(Debug, Deserialize, Serialize)]
pub struct SetCustomFieldActive {
    pub campaign_id: CampaignId,
    pub key: String,
    pub active: bool,
}

impl SetCustomFieldActive {
    pub fn new(campaign_id: impl Into<CampaignId>, key: impl Into<String>, active: bool) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            key: key.into(),
            active,
        }
    }
}

impl Operation for SetCustomFieldActive {
    fn verb(&self) -> &'static str {
        if self.active {
            "activate"
        } else {
            "deactivate"
        }
    }

    fn noun(&self) -> &'static str {
        "custom field"
    }

    fn description(&self) -> &'static str {
        "Switch a custom field on or off"
    }
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for SetCustomFieldActive {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        let start = Instant::now();
        let result = async {
            let stored = ctx
                .mutate_settings(&self.campaign_id, |catalog, settings| {
                    Ok(set_custom_field_active(
                        catalog,
                        settings,
                        &self.key,
                        self.active,
                    )?)
                })
                .await?;
            update_view(ctx.catalog(), &stored)
        }
        .await;
        logged(self, Some(&self.campaign_id), start, result)
    }
}

/// Switch a system field on or off for one campaign.
///
/// Deactivating also withdraws it from the client portal.
#[derive(Debug, Deserialize, Serialize)]
pub struct SetSystemFieldActive {
    pub campaign_id: CampaignId,
    pub key: String,
    pub active: bool,
}

impl SetSystemFieldActive {
    pub fn new(campaign_id: impl Into<CampaignId>, key: impl Into<String>, active: bool) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            key: key.into(),
            active,
        }
    }
}

impl Operation for SetSystemFieldActive {
    fn verb(&self) -> &'static str {
        if self.active {
            "activate"
        } else {
            "deactivate"
        }
    }

    fn noun(&self) -> &'static str {
        "system field"
    }

    fn description(&self) -> &'static str {
        "Switch a system field on or off"
    }
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for SetSystemFieldActive {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        let start = Instant::now();
        let result = async {
            let stored = ctx
                .mutate_settings(&self.campaign_id, |catalog, settings| {
                    Ok(set_system_field_active(
                        catalog,
                        settings,
                        &self.key,
                        self.active,
                    )?)
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
    use leadpipe_fields::{CampaignSettings, CustomFieldDef, FieldType, FieldsError};
    use serde_json::json;
    use std::sync::Arc;

    async fn setup() -> SettingsContext {
        let settings = CampaignSettings {
            active_system_fields: vec!["full_name".into(), "email".into(), "phone".into()],
            public_system_fields: vec!["phone".into()],
            custom_fields: vec![CustomFieldDef::new("score", "Score", FieldType::Number)],
            card_field_order: vec!["score".into(), "phone".into()],
            card_primary_field: Some("email".into()),
            ..Default::default()
        };
        let ctx = SettingsContext::new(Arc::new(MemoryCampaignStore::new()));
        ctx.create_campaign(
            Campaign::new("Spring")
                .with_id("spring")
                .with_settings(settings),
        )
        .await
        .unwrap();
        ctx
    }

    #[test]
    fn test_op_strings() {
        assert_eq!(
            SetCustomFieldActive::new("c", "k", false).op_string(),
            "deactivate custom field"
        );
        assert_eq!(
            SetSystemFieldActive::new("c", "k", true).op_string(),
            "activate system field"
        );
    }

    #[tokio::test]
    async fn test_deactivate_custom_leaves_card() {
        let ctx = setup().await;
        let value = SetCustomFieldActive::new("spring", "score", false)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(value["card"]["body"], json!(["phone"]));
        assert_eq!(value["settings"]["custom_fields"][0]["is_active"], false);

        let value = SetCustomFieldActive::new("spring", "score", true)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        // Reactivated fields come back hidden
        assert!(value["card"]["hidden"]
            .as_array()
            .unwrap()
            .contains(&json!("score")));
    }

    #[tokio::test]
    async fn test_deactivate_primary_system_field() {
        let ctx = setup().await;
        let value = SetSystemFieldActive::new("spring", "email", false)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(value["card"]["primary"], "full_name");
    }

    #[tokio::test]
    async fn test_deactivate_withdraws_public() {
        let ctx = setup().await;
        let value = SetSystemFieldActive::new("spring", "phone", false)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(value["settings"]["public_system_fields"], json!([]));
        assert_eq!(value["card"]["body"], json!(["score"]));
    }

    #[tokio::test]
    async fn test_activate_system_field() {
        let ctx = setup().await;
        let value = SetSystemFieldActive::new("spring", "company", true)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert!(value["settings"]["active_system_fields"]
            .as_array()
            .unwrap()
            .contains(&json!("company")));
    }

    #[tokio::test]
    async fn test_unknown_keys() {
        let ctx = setup().await;
        let custom = SetCustomFieldActive::new("spring", "email", false)
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(
            custom,
            Err(SettingsError::Fields(FieldsError::NotFound { .. }))
        ));

        let system = SetSystemFieldActive::new("spring", "score", true)
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(
            system,
            Err(SettingsError::Fields(FieldsError::NotFound { .. }))
        ));
    }
}

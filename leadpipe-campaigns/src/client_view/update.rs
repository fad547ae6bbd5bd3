//! UpdateClientView command

use std::time::Instant;

use async_trait::async_trait;
use leadpipe_fields::mutation::set_client_view;
use leadpipe_fields::ClientView;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::card::update_view;
use crate::context::SettingsContext;
use crate::error::SettingsError;
use crate::operation::{logged, operation, Execute, ExecutionResult};
use crate::types::CampaignId;

/// Toggle client portal surfaces. Unset toggles keep their current value.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UpdateClientView {
    pub campaign_id: CampaignId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_dashboard: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_kanban: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_list: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_kpi: Option<bool>,
}

operation!(
    UpdateClientView,
    verb = "update",
    noun = "client view",
    description = "Choose which portal surfaces a client may open"
);

impl UpdateClientView {
    pub fn new(campaign_id: impl Into<CampaignId>) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            ..Default::default()
        }
    }

    pub fn with_dashboard(mut self, show: bool) -> Self {
        self.show_dashboard = Some(show);
        self
    }

    pub fn with_kanban(mut self, show: bool) -> Self {
        self.show_kanban = Some(show);
        self
    }

    pub fn with_list(mut self, show: bool) -> Self {
        self.show_list = Some(show);
        self
    }

    pub fn with_kpi(mut self, show: bool) -> Self {
        self.show_kpi = Some(show);
        self
    }

    fn apply(&self, mut view: ClientView) -> ClientView {
        if let Some(show) = self.show_dashboard {
            view.show_dashboard = show;
        }
        if let Some(show) = self.show_kanban {
            view.show_kanban = show;
        }
        if let Some(show) = self.show_list {
            view.show_list = show;
        }
        if let Some(show) = self.show_kpi {
            view.show_kpi = show;
        }
        view
    }
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for UpdateClientView {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        let start = Instant::now();
        let result = async {
            let stored = ctx
                .mutate_settings(&self.campaign_id, |_, settings| {
                    Ok(set_client_view(settings, self.apply(settings.client_view)))
                })
                .await?;
            update_view(ctx.catalog(), &stored)
        }
        .await;
        logged(self, Some(&self.campaign_id), start, result)
    }
}

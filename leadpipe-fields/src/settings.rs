//! Per-campaign settings aggregate.
//!
//! `CampaignSettings` is a plain value. It is replaced wholesale on every
//! change: read it, derive the next value with a function from
//! [`crate::mutation`], submit the replacement.

use serde::{Deserialize, Serialize};

use crate::types::CustomFieldDef;

/// Primary card field used when a campaign has never chosen one.
pub const DEFAULT_PRIMARY_FIELD: &str = "full_name";

/// Surfaces of the client portal a client user may open.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientView {
    #[serde(default = "default_true")]
    pub show_dashboard: bool,
    #[serde(default = "default_true")]
    pub show_kanban: bool,
    #[serde(default = "default_true")]
    pub show_list: bool,
    #[serde(default = "default_true")]
    pub show_kpi: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ClientView {
    fn default() -> Self {
        Self {
            show_dashboard: true,
            show_kanban: true,
            show_list: true,
            show_kpi: true,
        }
    }
}

impl ClientView {
    /// Names of the enabled surfaces, in a fixed order.
    pub fn enabled_surfaces(&self) -> Vec<&'static str> {
        [
            ("dashboard", self.show_dashboard),
            ("kanban", self.show_kanban),
            ("list", self.show_list),
            ("kpi", self.show_kpi),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }
}

/// Field schema and card layout for one campaign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CampaignSettings {
    /// System field keys switched on for this campaign
    #[serde(default)]
    pub active_system_fields: Vec<String>,
    /// Active system field keys exposed to the client portal
    #[serde(default)]
    pub public_system_fields: Vec<String>,
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldDef>,
    /// Card body fields, in display order
    #[serde(default)]
    pub card_field_order: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_primary_field: Option<String>,
    /// External field names seen from an ingestion source, pending mapping
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discovered_fields: Vec<String>,
    #[serde(default)]
    pub client_view: ClientView,
}

impl CampaignSettings {
    /// Settings for a freshly created campaign: name, email and phone collected,
    /// name as the headline, email and phone in the card body.
    pub fn starter() -> Self {
        Self {
            active_system_fields: vec![
                DEFAULT_PRIMARY_FIELD.to_string(),
                "email".to_string(),
                "phone".to_string(),
            ],
            card_field_order: vec!["email".to_string(), "phone".to_string()],
            card_primary_field: Some(DEFAULT_PRIMARY_FIELD.to_string()),
            ..Default::default()
        }
    }

    /// The effective card headline field.
    pub fn primary_field(&self) -> &str {
        self.card_primary_field
            .as_deref()
            .unwrap_or(DEFAULT_PRIMARY_FIELD)
    }

    pub fn custom_field(&self, key: &str) -> Option<&CustomFieldDef> {
        self.custom_fields.iter().find(|f| f.key == key)
    }

    pub(crate) fn custom_field_mut(&mut self, key: &str) -> Option<&mut CustomFieldDef> {
        self.custom_fields.iter_mut().find(|f| f.key == key)
    }

    pub fn is_system_active(&self, key: &str) -> bool {
        self.active_system_fields.iter().any(|k| k == key)
    }

    pub fn is_system_public(&self, key: &str) -> bool {
        self.public_system_fields.iter().any(|k| k == key)
    }

    pub fn is_on_card(&self, key: &str) -> bool {
        self.card_field_order.iter().any(|k| k == key)
    }
}

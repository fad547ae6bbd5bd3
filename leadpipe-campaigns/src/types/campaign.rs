//! Campaign and client records

use super::ids::{CampaignId, ClientId};
use chrono::{DateTime, Utc};
use leadpipe_fields::CampaignSettings;
use serde::{Deserialize, Serialize};

/// A client's lead pipeline, with its own field schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
    #[serde(default)]
    pub settings: CampaignSettings,
    /// Set by the store on every write
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Create a campaign with starter settings
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CampaignId::new(),
            name: name.into(),
            client_id: None,
            settings: CampaignSettings::starter(),
            updated_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<CampaignId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_client(mut self, client_id: impl Into<ClientId>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_settings(mut self, settings: CampaignSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// An agency's customer; owns zero or more campaigns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Client {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ClientId::new(),
            name: name.into(),
            email: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<ClientId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

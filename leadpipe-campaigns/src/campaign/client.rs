//! AddClient and ListClients commands

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::context::SettingsContext;
use crate::error::SettingsError;
use crate::operation::{logged, operation, unlogged, Execute, ExecutionResult};
use crate::types::{Client, ClientId};

/// Register a client
#[derive(Debug, Deserialize, Serialize)]
pub struct AddClient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ClientId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

operation!(
    AddClient,
    verb = "add",
    noun = "client",
    description = "Register a client"
);

impl AddClient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<ClientId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[async_trait]
impl Execute<SettingsContext, SettingsError> for AddClient {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        let start = Instant::now();
        let result = async {
            if self.name.trim().is_empty() {
                return Err(SettingsError::missing_field("name"));
            }
            let mut client = Client::new(&self.name);
            if let Some(id) = &self.id {
                client = client.with_id(id.clone());
            }
            if let Some(email) = &self.email {
                client = client.with_email(email);
            }
            let created = ctx.create_client(client).await?;
            Ok(serde_json::to_value(&created)?)
        }
        .await;
        logged(self, None, start, result)
    }
}

/// List registered clients
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ListClients;

operation!(
    ListClients,
    verb = "list",
    noun = "clients",
    description = "List clients"
);

#[async_trait]
impl Execute<SettingsContext, SettingsError> for ListClients {
    async fn execute(&self, ctx: &SettingsContext) -> ExecutionResult<Value, SettingsError> {
        unlogged(
            async {
                let clients = ctx.clients().await?;
                Ok(json!({ "clients": clients, "count": clients.len() }))
            }
            .await,
        )
    }
}

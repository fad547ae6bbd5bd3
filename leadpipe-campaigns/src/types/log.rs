//! Activity log entries for settings changes

use super::ids::{CampaignId, LogEntryId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One recorded settings operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: LogEntryId,
    pub timestamp: DateTime<Utc>,
    /// Canonical op string (e.g. "reorder field")
    pub op: String,
    /// Campaign the operation targeted, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<CampaignId>,
    /// The operation's own parameters
    pub input: Value,
    /// The result, or `{"error": ...}`
    pub output: Value,
    /// Who performed the operation: "user_id" or "user_id[session]"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub duration_ms: u64,
}

impl LogEntry {
    pub fn new(op: impl Into<String>, input: Value, output: Value, duration_ms: u64) -> Self {
        Self {
            id: LogEntryId::new(),
            timestamp: Utc::now(),
            op: op.into(),
            campaign_id: None,
            input,
            output,
            actor: None,
            duration_ms,
        }
    }

    /// Entry for a failed operation
    pub fn failure(op: impl Into<String>, input: Value, error: &str, duration_ms: u64) -> Self {
        Self::new(op, input, serde_json::json!({ "error": error }), duration_ms)
    }

    pub fn for_campaign(mut self, campaign_id: CampaignId) -> Self {
        self.campaign_id = Some(campaign_id);
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn is_failure(&self) -> bool {
        self.output.get("error").is_some()
    }
}

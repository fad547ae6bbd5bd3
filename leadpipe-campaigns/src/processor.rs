//! Runs commands and feeds their log entries to the activity log.

use serde_json::Value;
use tracing::debug;

use crate::context::SettingsContext;
use crate::error::{Result, SettingsError};
use crate::operation::Execute;

/// Executes operations on behalf of one actor.
#[derive(Debug, Clone, Default)]
pub struct SettingsOperationProcessor {
    /// `user_id` or `user_id[session]`
    actor: Option<String>,
}

impl SettingsOperationProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actor(actor: impl Into<String>) -> Self {
        Self {
            actor: Some(actor.into()),
        }
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    pub async fn process<O>(&self, op: &O, ctx: &SettingsContext) -> Result<Value>
    where
        O: Execute<SettingsContext, SettingsError>,
    {
        let (result, log_entry) = op.execute(ctx).await.split();
        if let Some(mut entry) = log_entry {
            if let Some(actor) = &self.actor {
                entry = entry.with_actor(actor.clone());
            }
            debug!(op = %entry.op, failed = entry.is_failure(), "recorded operation");
            ctx.record(entry).await;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{GetFields, SetFieldVisibility, SetPrimaryField};
    use crate::store::MemoryCampaignStore;
    use crate::types::Campaign;
    use std::sync::Arc;

    async fn setup() -> SettingsContext {
        let ctx = SettingsContext::new(Arc::new(MemoryCampaignStore::new()));
        ctx.create_campaign(Campaign::new("Spring").with_id("spring"))
            .await
            .unwrap();
        ctx
    }

    #[tokio::test]
    async fn test_mutation_is_recorded_with_actor() {
        let ctx = setup().await;
        let processor = SettingsOperationProcessor::with_actor("ana[tab2]");

        processor
            .process(&SetPrimaryField::new("spring", "email"), &ctx)
            .await
            .unwrap();

        let activity = ctx.activity(None).await;
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].op, "set primary");
        assert_eq!(activity[0].actor.as_deref(), Some("ana[tab2]"));
    }

    #[tokio::test]
    async fn test_failure_is_recorded() {
        let ctx = setup().await;
        let processor = SettingsOperationProcessor::new();

        let result = processor
            .process(&SetPrimaryField::new("spring", "ghost"), &ctx)
            .await;

        assert!(result.is_err());
        let activity = ctx.activity(None).await;
        assert_eq!(activity.len(), 1);
        assert!(activity[0].is_failure());
    }

    #[tokio::test]
    async fn test_repeated_change_recorded_as_unchanged() {
        let ctx = setup().await;
        let processor = SettingsOperationProcessor::new();
        let hide = SetFieldVisibility::hide("spring", "phone");

        let first = processor.process(&hide, &ctx).await.unwrap();
        let second = processor.process(&hide, &ctx).await.unwrap();
        assert_eq!(first["changed"], true);
        assert_eq!(second["changed"], false);

        let activity = ctx.activity(None).await;
        assert_eq!(activity.len(), 2);
        assert_eq!(activity[0].output["changed"], false);
        assert_eq!(activity[1].output["changed"], true);
    }

    #[tokio::test]
    async fn test_reads_are_not_recorded() {
        let ctx = setup().await;
        SettingsOperationProcessor::new()
            .process(&GetFields::new("spring"), &ctx)
            .await
            .unwrap();
        assert!(ctx.activity(None).await.is_empty());
    }
}

//! Operation and Execute traits.
//!
//! Operations are structs whose fields ARE the parameters. Each one names
//! itself with a verb and a noun ("reorder field", "delete field") and
//! implements [`Execute`] against a context. Mutations come back as
//! [`ExecutionResult::Logged`] so the processor can append them to the
//! activity log; reads come back unlogged.

use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::SettingsError;
use crate::types::{CampaignId, LogEntry};

/// Self-describing operation metadata.
pub trait Operation: Send + Sync {
    fn verb(&self) -> &'static str;
    fn noun(&self) -> &'static str;
    fn description(&self) -> &'static str;

    /// Canonical "verb noun" string used in logs
    fn op_string(&self) -> String {
        format!("{} {}", self.verb(), self.noun())
    }
}

/// Run an operation against a context.
#[async_trait]
pub trait Execute<C: Send + Sync, E>: Operation {
    async fn execute(&self, ctx: &C) -> ExecutionResult<Value, E>;
}

/// Result of executing an operation
///
/// Distinguishes between:
/// - Logged: settings changed and the change should be audited
/// - Unlogged: read-only operations with no side effects
/// - Failed: errors (logged when a change was attempted)
#[derive(Debug)]
pub enum ExecutionResult<T, E> {
    Logged { value: T, log_entry: LogEntry },
    Unlogged { value: T },
    Failed {
        error: E,
        log_entry: Option<LogEntry>,
    },
}

impl<T, E> ExecutionResult<T, E> {
    /// Extract the result (Ok or Err)
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Logged { value, .. } | Self::Unlogged { value } => Ok(value),
            Self::Failed { error, .. } => Err(error),
        }
    }

    /// Get the value and log entry separately
    pub fn split(self) -> (Result<T, E>, Option<LogEntry>) {
        match self {
            Self::Logged { value, log_entry } => (Ok(value), Some(log_entry)),
            Self::Unlogged { value } => (Ok(value), None),
            Self::Failed { error, log_entry } => (Err(error), log_entry),
        }
    }

    pub fn should_log(&self) -> bool {
        matches!(
            self,
            Self::Logged { .. }
                | Self::Failed {
                    log_entry: Some(_),
                    ..
                }
        )
    }
}

/// Wrap the outcome of a settings change, building its log entry.
pub(crate) fn logged<O>(
    op: &O,
    campaign_id: Option<&CampaignId>,
    started: Instant,
    result: crate::Result<Value>,
) -> ExecutionResult<Value, SettingsError>
where
    O: Operation + Serialize,
{
    let duration_ms = started.elapsed().as_millis() as u64;
    let input = serde_json::to_value(op).unwrap_or(Value::Null);
    match result {
        Ok(value) => ExecutionResult::Logged {
            log_entry: scoped(
                LogEntry::new(op.op_string(), input, value.clone(), duration_ms),
                campaign_id,
            ),
            value,
        },
        Err(error) => {
            let entry = LogEntry::failure(op.op_string(), input, &error.to_string(), duration_ms);
            ExecutionResult::Failed {
                error,
                log_entry: Some(scoped(entry, campaign_id)),
            }
        }
    }
}

fn scoped(entry: LogEntry, campaign_id: Option<&CampaignId>) -> LogEntry {
    match campaign_id {
        Some(id) => entry.for_campaign(id.clone()),
        None => entry,
    }
}

/// Wrap the outcome of a read.
pub(crate) fn unlogged(result: crate::Result<Value>) -> ExecutionResult<Value, SettingsError> {
    match result {
        Ok(value) => ExecutionResult::Unlogged { value },
        Err(error) => ExecutionResult::Failed {
            error,
            log_entry: None,
        },
    }
}

/// Implement [`Operation`] for a command struct.
macro_rules! operation {
    ($ty:ty, verb = $verb:expr, noun = $noun:expr, description = $desc:expr) => {
        impl $crate::operation::Operation for $ty {
            fn verb(&self) -> &'static str {
                $verb
            }
            fn noun(&self) -> &'static str {
                $noun
            }
            fn description(&self) -> &'static str {
                $desc
            }
        }
    };
}
pub(crate) use operation;

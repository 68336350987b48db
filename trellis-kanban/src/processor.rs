//! KanbanOperationProcessor - runs commands and records activity

use crate::context::KanbanContext;
use crate::error::KanbanError;
use serde_json::Value;
use tracing::{debug, warn};
use trellis_operations::{async_trait, Execute, OperationProcessor};

/// Executes commands and appends their log entries to the store's activity
/// log, newest first on read.
///
/// Entries are attributed to the configured actor, or to the context's user
/// when no actor was set.
#[derive(Debug, Clone, Default)]
pub struct KanbanOperationProcessor {
    actor: Option<String>,
}

impl KanbanOperationProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute every entry to `actor`, e.g. `"alice[session42]"`
    pub fn with_actor(actor: impl Into<String>) -> Self {
        Self {
            actor: Some(actor.into()),
        }
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }
}

#[async_trait]
impl OperationProcessor<KanbanContext, KanbanError> for KanbanOperationProcessor {
    async fn process<O>(&self, operation: &O, ctx: &KanbanContext) -> Result<Value, KanbanError>
    where
        O: Execute<KanbanContext, KanbanError> + Send + Sync,
    {
        let (result, log_entry) = operation.execute(ctx).await.split();

        if let Some(entry) = log_entry {
            if ctx.config().record_activity {
                let actor = self
                    .actor
                    .clone()
                    .unwrap_or_else(|| ctx.user().to_string());
                let entry = entry.with_actor(actor);
                debug!(op = %entry.op, failed = entry.is_failure(), "Recording activity");
                if let Err(error) = ctx.store().append_activity(entry).await {
                    warn!(%error, "Failed to record activity");
                }
            }
        }

        result
    }
}

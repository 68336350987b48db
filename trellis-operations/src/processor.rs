//! Operation processing with audit logging

use crate::Execute;
use async_trait::async_trait;
use serde_json::Value;

/// Runs operations and routes their log entries somewhere durable.
///
/// Implementations own the actor attribution and the log sink; operations
/// only decide whether they produce a log entry at all.
#[async_trait]
pub trait OperationProcessor<C, E>: Send + Sync
where
    C: Send + Sync,
    E: Send,
{
    /// Execute the operation, persist its log entry (if any) and return the value
    async fn process<O>(&self, operation: &O, ctx: &C) -> Result<Value, E>
    where
        O: Execute<C, E> + Send + Sync;
}

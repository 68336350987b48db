//! Operation metadata and execution traits

use crate::{ExecutionResult, ParamMeta};
use async_trait::async_trait;
use serde_json::Value;

/// Static metadata about an operation, derived by `#[operation]`
pub trait Operation: Send + Sync {
    /// Intent tag as it appears on the wire (e.g. "moveItem")
    fn intent(&self) -> &'static str;

    /// The kind of entity the operation targets (e.g. "item")
    fn entity(&self) -> &'static str;

    /// Human readable description
    fn description(&self) -> &'static str;

    /// Parameter table, in field declaration order
    fn parameters(&self) -> &'static [ParamMeta];

    /// Canonical op string used in logs, e.g. "moveItem item"
    fn op_string(&self) -> String {
        format!("{} {}", self.intent(), self.entity())
    }

    /// Wire names of the required parameters
    fn required_parameters(&self) -> Vec<&'static str> {
        self.parameters()
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect()
    }
}

/// Execute an operation against a context
///
/// `C` is whatever the operation needs to reach storage; `E` is the
/// crate's error type.
#[async_trait]
pub trait Execute<C, E>: Operation
where
    C: Send + Sync,
    E: Send,
{
    async fn execute(&self, ctx: &C) -> ExecutionResult<Value, E>;
}

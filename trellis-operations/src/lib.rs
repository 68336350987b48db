//! # Trellis Operations
//!
//! This crate provides the `Operation` trait for defining board mutations.
//! Operations are structs where the fields ARE the parameters - the wire
//! payload, the required-field table and the executable command are one type.
//!
//! ## Example
//!
//! ```ignore
//! use trellis_operations::*;
//!
//! #[operation(intent = "deleteColumn", entity = "column", description = "Delete a column and its items")]
//! #[derive(Debug, Deserialize, Serialize)]
//! #[serde(rename_all = "camelCase")]
//! pub struct DeleteColumn {
//!     /// The column to delete
//!     pub column_id: ColumnId,
//! }
//!
//! #[async_trait]
//! impl Execute<KanbanContext, KanbanError> for DeleteColumn {
//!     async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
//!         // implementation returns ExecutionResult::Logged or Unlogged
//!     }
//! }
//! ```

mod execution_result;
mod log;
mod operation;
mod parameter;
mod processor;

pub use execution_result::ExecutionResult;
pub use log::LogEntry;
pub use operation::{Execute, Operation};
pub use parameter::{ParamMeta, ParamType};
pub use processor::OperationProcessor;

// Re-export proc macros
pub use trellis_operations_macros::operation;

// Re-export for use in implementations
pub use async_trait::async_trait;
pub use serde_json::Value;

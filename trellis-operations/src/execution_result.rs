//! Execution result types for operations

use crate::LogEntry;
use serde_json::Value;
use std::time::Instant;

/// Result of executing an operation
///
/// Distinguishes between:
/// - Logged: mutations that should land in the activity log
/// - Unlogged: read-only operations with no side effects
/// - Failed: errors (optionally logged)
pub enum ExecutionResult<T, E> {
    /// Operation succeeded and should be logged
    Logged { value: T, log_entry: LogEntry },
    /// Operation succeeded but no logging needed (read-only)
    Unlogged { value: T },
    /// Operation failed
    Failed {
        error: E,
        log_entry: Option<LogEntry>,
    },
}

impl<E: std::fmt::Display> ExecutionResult<Value, E> {
    /// Wrap the outcome of a mutation, logging success and failure alike.
    ///
    /// `started` is taken before the mutation ran; the log entry carries the
    /// elapsed time.
    pub fn logged(op: String, input: Value, started: Instant, result: Result<Value, E>) -> Self {
        let duration_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(value) => Self::Logged {
                log_entry: LogEntry::new(op, input, value.clone(), None, duration_ms),
                value,
            },
            Err(error) => {
                let message = error.to_string();
                Self::Failed {
                    error,
                    log_entry: Some(LogEntry::failure(op, input, &message, duration_ms)),
                }
            }
        }
    }

    /// Wrap the outcome of a read; only failures are reported, never logged
    pub fn unlogged(result: Result<Value, E>) -> Self {
        match result {
            Ok(value) => Self::Unlogged { value },
            Err(error) => Self::Failed {
                error,
                log_entry: None,
            },
        }
    }
}

impl<T, E> ExecutionResult<T, E> {
    /// Extract the result (Ok or Err)
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Logged { value, .. } => Ok(value),
            Self::Unlogged { value } => Ok(value),
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

    /// Check if this should be logged
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

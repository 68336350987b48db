//! Required-field checks shared by commands
//!
//! Commands built in Rust skip the boundary parser, so each command repeats
//! the cheap shape checks itself before touching the store.

use crate::error::{KanbanError, Result};

/// Reject blank text for a required field
pub fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(KanbanError::malformed(format!(
            "missing required field: {field}"
        )));
    }
    Ok(())
}

/// Reject a blank id
pub fn require_id(field: &str, value: &impl AsRef<str>) -> Result<()> {
    require_text(field, value.as_ref())
}

/// Orders must be real numbers
pub fn require_finite(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(KanbanError::malformed(format!(
            "{field} must be a finite number"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemId;

    #[test]
    fn test_blank_text_is_malformed() {
        let err = require_text("name", "   ").unwrap_err();
        assert_eq!(err.to_string(), "malformed request: missing required field: name");
        assert!(require_text("name", "Todo").is_ok());
    }

    #[test]
    fn test_ids_and_numbers() {
        assert!(require_id("itemId", &ItemId::from("")).is_err());
        assert!(require_finite("order", f64::NAN).is_err());
        assert!(require_finite("order", f64::INFINITY).is_err());
        assert!(require_finite("order", 0.25).is_ok());
    }
}

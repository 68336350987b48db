//! Parameter metadata for operation payloads
//!
//! Derived from struct fields by `#[operation]`, never written by hand in
//! command modules. The boundary parser uses it to report every missing
//! required field at once.

/// Parameter type as seen on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
}

/// Metadata about a parameter - derived from struct fields
#[derive(Debug, Clone)]
pub struct ParamMeta {
    /// Wire name (camelCase)
    pub name: &'static str,
    /// Description (from doc comment)
    pub description: &'static str,
    /// Parameter type
    pub param_type: ParamType,
    /// Whether required (non-Option field without a serde default)
    pub required: bool,
}

impl ParamMeta {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            description: "",
            param_type: ParamType::String,
            required: false,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn description(mut self, desc: &'static str) -> Self {
        self.description = desc;
        self
    }

    pub const fn param_type(mut self, t: ParamType) -> Self {
        self.param_type = t;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        const META: ParamMeta = ParamMeta::new("columnId")
            .description("Target column")
            .param_type(ParamType::String)
            .required();

        assert!(META.required);
        assert_eq!(META.name, "columnId");
        assert_eq!(META.description, "Target column");
        assert_eq!(META.param_type, ParamType::String);

        const OPTIONAL: ParamMeta = ParamMeta::new("boardId");
        assert!(!OPTIONAL.required);
    }
}

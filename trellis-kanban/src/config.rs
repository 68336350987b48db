//! Engine configuration loaded with figment
//!
//! Sources, later overriding earlier:
//! 1. Built-in defaults
//! 2. An optional config file (TOML, YAML or JSON, picked by extension)
//! 3. `TRELLIS_` environment variables (`__` separates nested keys, e.g.
//!    `TRELLIS_BOARD_NAME__MAX=80`)

use crate::error::{FieldError, Result};
use crate::types::DEFAULT_BOARD_COLOR;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "TRELLIS_";

/// Activity entries kept when the config does not say otherwise
pub const DEFAULT_ACTIVITY_LIMIT: usize = 1000;

/// Inclusive character-count bounds for a text field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBounds {
    pub min: usize,
    pub max: usize,
}

impl LengthBounds {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Check `value`, naming `field` in the error
    pub fn check(&self, field: &str, value: &str) -> Option<FieldError> {
        let len = value.chars().count();
        if len < self.min {
            Some(FieldError::new(
                field,
                format!("must be at least {} character(s)", self.min),
            ))
        } else if len > self.max {
            Some(FieldError::new(
                field,
                format!("must be at most {} characters", self.max),
            ))
        } else {
            None
        }
    }
}

/// Tunables for the board engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KanbanConfig {
    /// Color for boards created without one
    pub default_board_color: String,
    /// Bounds on board names
    pub board_name: LengthBounds,
    /// Bounds on board colors
    pub board_color: LengthBounds,
    /// Append a log entry to the store's activity log for every mutation
    pub record_activity: bool,
    /// Most activity entries a store keeps; the oldest are dropped first.
    /// `None` keeps everything.
    pub activity_limit: Option<usize>,
}

impl Default for KanbanConfig {
    fn default() -> Self {
        Self {
            default_board_color: DEFAULT_BOARD_COLOR.to_string(),
            board_name: LengthBounds::new(1, 100),
            board_color: LengthBounds::new(1, 10),
            record_activity: true,
            activity_limit: Some(DEFAULT_ACTIVITY_LIMIT),
        }
    }
}

impl KanbanConfig {
    /// Load from defaults and environment
    pub fn load() -> Result<Self> {
        Self::extract(Self::figment())
    }

    /// Load from defaults, the given file, then environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading kanban config from {}", path.display());

        let file = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Figment::from(Toml::file(path)),
            Some("json") => Figment::from(Json::file(path)),
            _ => Figment::from(Yaml::file(path)),
        };

        Self::extract(
            Figment::from(Serialized::defaults(Self::default()))
                .merge(file)
                .merge(Self::env()),
        )
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default())).merge(Self::env())
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract()?;
        debug!(?config, "Resolved kanban config");
        Ok(config)
    }

    /// Validate board editor fields, collecting every violation
    pub fn validate_board(&self, name: &str, color: &str) -> Vec<FieldError> {
        [
            self.board_name.check("name", name),
            self.board_color.check("color", color),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

//! Reconciler Configuration
//!
//! Loaded from JSON; every field has a default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Safety-net lifetime of a pending override
pub const DEFAULT_PENDING_TTL_MS: i64 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReconcileConfig {
    /// How long a pending override may shadow snapshots without an ack
    pub pending_ttl_ms: i64,
    /// Attributed as the actor of emitted move events
    pub actor_id: String,
    /// Default `tracing` filter directive, `RUST_LOG` wins when set
    pub log_filter: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            pending_ttl_ms: DEFAULT_PENDING_TTL_MS,
            actor_id: "local".to_string(),
            log_filter: "kanban_sync=info".to_string(),
        }
    }
}

impl ReconcileConfig {
    pub fn with_actor(actor_id: &str) -> Self {
        Self {
            actor_id: actor_id.to_string(),
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pending_ttl_ms <= 0 {
            return Err(ConfigError::Invalid(format!(
                "pendingTtlMs must be positive, got {}",
                self.pending_ttl_ms
            )));
        }
        if self.actor_id.trim().is_empty() {
            return Err(ConfigError::Invalid("actorId must not be empty".to_string()));
        }
        Ok(())
    }
}

//! Error types for configuration loading.
//!
//! The state machine itself never fails: degraded inputs (no player, no
//! waypoints, no walkable surface) are tolerated. Errors only exist where
//! external data enters the system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse enemy config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid enemy config `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

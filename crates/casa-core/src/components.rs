//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Behavior lives in the AI crate and the simulation systems.

use serde::{Deserialize, Serialize};

/// Marks an entity as a wandering enemy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Enemy {
    /// Stable id used by commands and snapshots.
    pub enemy_id: u32,
}

/// Marks the entity controlled by the human player.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Player;

// `Pose` (types.rs) doubles as the transform component.

//! Commands sent from the host game (or a script) to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimCommand {
    // --- Player ---
    /// Spawn the player, or teleport them if already present.
    PlacePlayer { position: Vec3, forward: Vec3 },
    /// Remove the player (death, level transition).
    RemovePlayer,

    // --- Sound ---
    /// A noise at `position`; `loud` for urgent reactions.
    EmitSound { position: Vec3, loud: bool },

    // --- Enemy control ---
    /// Camera flash hit an enemy.
    StunEnemy { enemy_id: u32 },
    /// Send an enemy to check a point.
    Investigate {
        enemy_id: u32,
        position: Vec3,
        urgent: bool,
    },
    /// Replace an enemy's patrol route.
    SetWaypoints { enemy_id: u32, waypoints: Vec<Vec3> },
}

//! World snapshot: the complete visible state handed to the host each tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::EnemyState;
use crate::events::EnemyEvent;
use crate::types::{PlayerSample, SimTime};

/// Complete simulation state after a tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub time: SimTime,
    pub player: Option<PlayerSample>,
    pub enemies: Vec<EnemyView>,
    /// Events raised by enemies during this tick, in emission order.
    pub events: Vec<EnemyEventRecord>,
}

/// One enemy as seen by debug overlays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub enemy_id: u32,
    pub state: EnemyState,
    /// Detection meter in `[0, 1]`.
    pub detection: f32,
    pub position: Vec3,
    pub forward: Vec3,
    /// Current navigation target, if any.
    pub destination: Option<Vec3>,
    /// Seconds spent in the current state.
    pub state_time: f32,
    pub waypoint_index: Option<usize>,
}

/// An event tagged with the enemy that raised it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyEventRecord {
    pub enemy_id: u32,
    pub tick: u64,
    pub event: EnemyEvent,
}

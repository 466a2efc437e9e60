//! Events flowing into and out of the enemy AI.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::{AudioCue, EnemyState};

/// A noise somewhere in the level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundEvent {
    pub position: Vec3,
    /// Loud sounds (dropped props, slammed doors) make the enemy hurry.
    pub loud: bool,
}

impl SoundEvent {
    pub fn soft(position: Vec3) -> Self {
        Self {
            position,
            loud: false,
        }
    }

    pub fn loud(position: Vec3) -> Self {
        Self {
            position,
            loud: true,
        }
    }
}

/// Notifications emitted by an enemy for UI, audio and debug overlays.
/// They are never control inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EnemyEvent {
    StateChanged { from: EnemyState, to: EnemyState },
    /// Detection meter as a fraction of the threshold, in `[0, 1]`.
    DetectionChanged { normalized: f32 },
    AudioCue { cue: AudioCue },
}

//! Simulation-only components.
//!
//! Vocabulary components (`Enemy`, `Player`, `Pose`) live in casa-core;
//! these wrap AI and movement state that only the headless world owns.

use casa_enemy_ai::EnemyAgent;

pub use crate::navigator::NavBody;

/// Decision-making state of an enemy.
#[derive(Debug, Clone)]
pub struct EnemyBrain {
    pub agent: EnemyAgent,
}

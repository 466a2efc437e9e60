//! Enumeration types used throughout the enemy AI.

use serde::{Deserialize, Serialize};

/// Behavior state of a wandering enemy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    /// Walking the waypoint route.
    #[default]
    Patrol,
    /// Walking to a point of interest. Superseded by `Alert`; only reachable
    /// when forced by tooling.
    Investigate,
    /// Pursuing a detected player.
    Chase,
    /// Knocked out by the player's camera flash. Blind and deaf.
    Stunned,
    /// Sweeping a circle of points around the last known player position.
    Search,
    /// Sweeping around the source of a sound.
    Alert,
    /// Shadowing the player from behind at a distance.
    Stalking,
    /// Walking back to the patrol route after a stun.
    PostStunRetreat,
}

impl EnemyState {
    /// Whether perception and hearing are suspended in this state.
    pub fn is_incapacitated(self) -> bool {
        matches!(self, EnemyState::Stunned | EnemyState::PostStunRetreat)
    }

    /// Whether a heard sound may interrupt this state.
    pub fn reacts_to_sound(self) -> bool {
        !matches!(
            self,
            EnemyState::Chase | EnemyState::Stunned | EnemyState::PostStunRetreat
        )
    }
}

/// Direction of travel along the waypoint list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatrolDirection {
    #[default]
    Forward,
    Backward,
}

impl PatrolDirection {
    pub fn reversed(self) -> Self {
        match self {
            PatrolDirection::Forward => PatrolDirection::Backward,
            PatrolDirection::Backward => PatrolDirection::Forward,
        }
    }
}

/// How the route behaves at its ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Traversal {
    /// 0, 1, .., n-1, n-2, .., 0, 1, ..
    #[default]
    PingPong,
    /// 0, 1, .., n-1, 0, 1, ..
    Cyclic,
}

/// Vocal cues the enemy makes when entering a state, for an external audio layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCue {
    PatrolMutter,
    InvestigateGrowl,
    UrgentGrowl,
    ChaseScream,
    StunYelp,
}

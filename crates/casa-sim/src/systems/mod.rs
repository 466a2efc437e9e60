//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are free functions over `&mut World` (or `&World` for read-only).
//! Run order per tick: hearing, enemy AI, movement, then the snapshot.

pub mod enemy_ai;
pub mod hearing;
pub mod movement;
pub mod snapshot;

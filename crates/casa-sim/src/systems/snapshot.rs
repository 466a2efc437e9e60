//! Snapshot system: queries the ECS world and builds a `WorldSnapshot`.
//!
//! This system is read-only; it never modifies the world.

use hecs::World;

use casa_core::components::Enemy;
use casa_core::state::{EnemyEventRecord, EnemyView, WorldSnapshot};
use casa_core::types::SimTime;

use crate::components::{EnemyBrain, NavBody};
use crate::systems::enemy_ai::find_player;

pub fn build_snapshot(world: &World, time: &SimTime, events: Vec<EnemyEventRecord>) -> WorldSnapshot {
    WorldSnapshot {
        time: *time,
        player: find_player(world),
        enemies: build_enemies(world),
        events,
    }
}

/// One view per enemy, ordered by id.
fn build_enemies(world: &World) -> Vec<EnemyView> {
    let mut enemies: Vec<EnemyView> = world
        .query::<(&Enemy, &EnemyBrain, &NavBody)>()
        .iter()
        .map(|(_, (enemy, brain, body))| EnemyView {
            enemy_id: enemy.enemy_id,
            state: brain.agent.state(),
            detection: brain.agent.detection().normalized(),
            position: body.position,
            forward: body.forward,
            destination: body.destination,
            state_time: brain.agent.state_timer(),
            waypoint_index: brain.agent.route().index(),
        })
        .collect();
    enemies.sort_by_key(|e| e.enemy_id);
    enemies
}

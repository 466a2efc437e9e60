//! Entity spawn factories for the headless world.

use glam::Vec3;
use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use casa_core::components::{Enemy, Player};
use casa_core::config::EnemyConfig;
use casa_core::types::Pose;
use casa_enemy_ai::waypoints;
use casa_enemy_ai::EnemyAgent;

use crate::components::{EnemyBrain, NavBody};
use crate::scenario::RouteSpec;

/// Spawn an enemy with its brain and body. The agent's own RNG is seeded
/// from the world RNG so runs stay reproducible.
pub fn spawn_enemy(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    enemy_id: u32,
    pose: Pose,
    waypoints: Vec<Vec3>,
    config: EnemyConfig,
) -> hecs::Entity {
    let agent = EnemyAgent::new(config, pose, waypoints, rng.gen());
    world.spawn((Enemy { enemy_id }, EnemyBrain { agent }, NavBody::new(pose)))
}

/// Place the player, spawning them if absent.
pub fn place_player(world: &mut World, pose: Pose) -> hecs::Entity {
    let existing = world
        .query_mut::<&Player>()
        .into_iter()
        .map(|(entity, _)| entity)
        .next();
    match existing {
        Some(entity) => {
            if let Ok(mut current) = world.get::<&mut Pose>(entity) {
                *current = pose;
            }
            entity
        }
        None => world.spawn((Player, pose)),
    }
}

/// Remove every player entity. Returns how many were removed.
pub fn remove_player(world: &mut World) -> usize {
    let players: Vec<hecs::Entity> = world
        .query_mut::<&Player>()
        .into_iter()
        .map(|(entity, _)| entity)
        .collect();
    for &entity in &players {
        let _ = world.despawn(entity);
    }
    players.len()
}

/// Expand a route description into concrete points.
pub fn resolve_route(route: &RouteSpec, rng: &mut ChaCha8Rng) -> Vec<Vec3> {
    match route {
        RouteSpec::Fixed { points } => points.clone(),
        RouteSpec::Circular {
            center,
            count,
            radius,
        } => waypoints::circular(*center, *count, *radius),
        RouteSpec::Random {
            center,
            count,
            radius,
        } => waypoints::random(*center, *count, *radius, rng),
    }
}

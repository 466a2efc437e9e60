//! Tests for the simulation engine and the enemy pipeline end to end.

use glam::Vec3;

use casa_core::commands::SimCommand;
use casa_core::config::EnemyConfig;
use casa_core::constants::TICK_RATE;
use casa_core::enums::EnemyState;
use casa_core::events::EnemyEvent;
use casa_core::state::WorldSnapshot;
use casa_core::types::Pose;
use casa_enemy_ai::SoundEmitter;

use crate::engine::{SimConfig, SimulationEngine};
use crate::floorplan::{Floorplan, Obstacle};
use crate::scenario::Scenario;

fn seconds(s: f32) -> usize {
    (s * TICK_RATE as f32).round() as usize
}

/// One enemy at the origin facing +z in an open room.
fn lone_enemy(waypoints: Vec<Vec3>) -> SimulationEngine {
    let mut engine = SimulationEngine::new(SimConfig::default(), Floorplan::open(30.0));
    engine
        .spawn_enemy(Pose::new(Vec3::ZERO, Vec3::Z), waypoints, EnemyConfig::default())
        .unwrap();
    engine
}

fn run(engine: &mut SimulationEngine, ticks: usize) -> Vec<WorldSnapshot> {
    (0..ticks).map(|_| engine.tick()).collect()
}

fn state_changes(snapshots: &[WorldSnapshot]) -> Vec<(EnemyState, EnemyState)> {
    snapshots
        .iter()
        .flat_map(|s| s.events.iter())
        .filter_map(|r| match r.event {
            EnemyEvent::StateChanged { from, to } => Some((from, to)),
            _ => None,
        })
        .collect()
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let scenario = Scenario::hallway();
    let config = SimConfig {
        seed: 12345,
        ..Default::default()
    };
    let mut engine_a = SimulationEngine::from_scenario(&scenario, config).unwrap();
    let mut engine_b = SimulationEngine::from_scenario(&scenario, config).unwrap();

    for _ in 0..scenario.ticks {
        let snap_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let snap_b = serde_json::to_string(&engine_b.tick()).unwrap();
        assert_eq!(snap_a, snap_b);
    }
}

#[test]
fn test_time_advances() {
    let mut engine = lone_enemy(Vec::new());
    let snapshots = run(&mut engine, 60);
    assert_eq!(snapshots[59].time.tick, 60);
    assert!((engine.time().elapsed_secs - 1.0).abs() < 1e-3);
}

// ---- Patrol ----

#[test]
fn test_enemy_walks_its_route() {
    let mut engine = lone_enemy(vec![Vec3::new(0.0, 0.0, 6.0), Vec3::new(6.0, 0.0, 6.0)]);
    let start = engine.enemy_position(0).unwrap();
    run(&mut engine, seconds(2.0));
    let moved = engine.enemy_position(0).unwrap();
    // Patrol speed 2 m/s along +z.
    assert!(moved.z > start.z + 3.0, "enemy barely moved: {moved:?}");
    assert_eq!(engine.enemy_state(0), Some(EnemyState::Patrol));
}

// ---- Sound ----

#[test]
fn test_emitted_sound_triggers_alert_same_tick() {
    let mut engine = lone_enemy(Vec::new());
    engine.tick();
    engine.queue_command(SimCommand::EmitSound {
        position: Vec3::new(5.0, 0.0, 0.0),
        loud: true,
    });
    let snap = engine.tick();
    assert_eq!(snap.enemies[0].state, EnemyState::Alert);
    assert!(snap.events.iter().any(|r| matches!(
        r.event,
        EnemyEvent::StateChanged {
            to: EnemyState::Alert,
            ..
        }
    )));
}

#[test]
fn test_distant_sound_is_ignored() {
    let mut engine = lone_enemy(Vec::new());
    engine.queue_command(SimCommand::EmitSound {
        position: Vec3::new(25.0, 0.0, 0.0),
        loud: true,
    });
    let snap = engine.tick();
    assert_eq!(snap.enemies[0].state, EnemyState::Patrol);
}

#[test]
fn test_prop_collision_makes_noise() {
    let mut engine = lone_enemy(Vec::new());
    engine.tick();
    let vase = SoundEmitter::new(Vec3::new(2.0, 1.0, 2.0), false);
    assert!(!engine.collide(&vase, 0.5));
    engine.tick();
    assert_eq!(engine.enemy_state(0), Some(EnemyState::Patrol));

    assert!(engine.collide(&vase, 4.0));
    engine.tick();
    assert_eq!(engine.enemy_state(0), Some(EnemyState::Alert));
}

// ---- Detection ----

#[test]
fn test_visible_player_is_chased() {
    let mut engine = lone_enemy(Vec::new());
    engine.queue_command(SimCommand::PlacePlayer {
        position: Vec3::new(0.0, 0.0, 8.0),
        forward: Vec3::Z,
    });
    let snapshots = run(&mut engine, seconds(4.0));
    assert_eq!(engine.enemy_state(0), Some(EnemyState::Chase));

    // Detection stays normalized and is full on the tick the chase begins.
    let detection: Vec<f32> = snapshots.iter().map(|s| s.enemies[0].detection).collect();
    assert!(detection.iter().all(|d| (0.0..=1.0).contains(d)));
    let chase_tick = snapshots
        .iter()
        .position(|s| s.enemies[0].state == EnemyState::Chase)
        .unwrap();
    assert_eq!(detection[chase_tick], 1.0);
}

#[test]
fn test_wall_hides_player() {
    let wall = Obstacle::new(Vec3::new(-5.0, 0.0, 3.9), Vec3::new(5.0, 3.0, 4.1));
    let mut engine = SimulationEngine::new(
        SimConfig::default(),
        Floorplan::open(30.0).with_obstacle(wall),
    );
    engine
        .spawn_enemy(Pose::new(Vec3::ZERO, Vec3::Z), Vec::new(), EnemyConfig::default())
        .unwrap();
    engine.queue_command(SimCommand::PlacePlayer {
        position: Vec3::new(0.0, 0.0, 8.0),
        forward: Vec3::Z,
    });
    let snapshots = run(&mut engine, seconds(4.0));
    assert!(snapshots.iter().all(|s| s.enemies[0].detection == 0.0));
    assert_eq!(engine.enemy_state(0), Some(EnemyState::Patrol));
}

#[test]
fn test_lost_player_never_returns_straight_to_patrol() {
    let mut engine = lone_enemy(vec![Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -10.0)]);
    engine.queue_command(SimCommand::PlacePlayer {
        position: Vec3::new(0.0, 0.0, 8.0),
        forward: Vec3::Z,
    });
    let mut snapshots = run(&mut engine, seconds(3.0));
    assert_eq!(engine.enemy_state(0), Some(EnemyState::Chase));

    engine.queue_command(SimCommand::RemovePlayer);
    snapshots.extend(run(&mut engine, seconds(40.0)));

    let changes = state_changes(&snapshots);
    assert!(!changes.contains(&(EnemyState::Chase, EnemyState::Patrol)));
    assert!(changes
        .iter()
        .any(|&(from, to)| from == EnemyState::Chase
            && matches!(to, EnemyState::Search | EnemyState::Stalking)));
    assert!(snapshots.last().unwrap().player.is_none());
}

// ---- Commands ----

#[test]
fn test_stun_command_stops_enemy() {
    let mut engine = lone_enemy(vec![Vec3::new(0.0, 0.0, 20.0)]);
    run(&mut engine, 10);
    engine.queue_command(SimCommand::StunEnemy { enemy_id: 0 });
    let snap = engine.tick();
    assert_eq!(snap.enemies[0].state, EnemyState::Stunned);

    let frozen_at = engine.enemy_position(0).unwrap();
    run(&mut engine, seconds(2.0));
    assert_eq!(engine.enemy_position(0).unwrap(), frozen_at);

    run(&mut engine, seconds(1.5));
    assert_eq!(engine.enemy_state(0), Some(EnemyState::PostStunRetreat));
}

#[test]
fn test_investigate_command_sends_enemy_to_point() {
    let mut engine = lone_enemy(Vec::new());
    let target = Vec3::new(4.0, 0.0, 4.0);
    engine.queue_command(SimCommand::Investigate {
        enemy_id: 0,
        position: target,
        urgent: false,
    });
    let snap = engine.tick();
    assert_eq!(snap.enemies[0].state, EnemyState::Alert);
    assert_eq!(snap.enemies[0].destination, Some(target));
}

#[test]
fn test_set_waypoints_command_redirects_patrol() {
    let mut engine = lone_enemy(vec![Vec3::new(0.0, 0.0, 10.0)]);
    engine.tick();
    let fresh = Vec3::new(-10.0, 0.0, 0.0);
    engine.queue_command(SimCommand::SetWaypoints {
        enemy_id: 0,
        waypoints: vec![fresh, Vec3::new(-10.0, 0.0, 10.0)],
    });
    let snap = engine.tick();
    assert_eq!(snap.enemies[0].destination, Some(fresh));
    assert_eq!(snap.enemies[0].waypoint_index, Some(0));
}

#[test]
fn test_command_for_unknown_enemy_is_harmless() {
    let mut engine = lone_enemy(Vec::new());
    engine.queue_command(SimCommand::StunEnemy { enemy_id: 99 });
    let snap = engine.tick();
    assert_eq!(snap.enemies.len(), 1);
    assert_eq!(snap.enemies[0].state, EnemyState::Patrol);
}

#[test]
fn test_spawn_rejects_invalid_config() {
    let mut engine = SimulationEngine::new(SimConfig::default(), Floorplan::open(30.0));
    let mut config = EnemyConfig::default();
    config.patrol.min_wait = 5.0;
    config.patrol.max_wait = 1.0;
    assert!(engine
        .spawn_enemy(Pose::new(Vec3::ZERO, Vec3::Z), Vec::new(), config)
        .is_err());

    let mut config = EnemyConfig::default();
    config.stalking.probability = 1.5;
    assert!(engine
        .spawn_enemy(Pose::new(Vec3::ZERO, Vec3::Z), Vec::new(), config)
        .is_err());

    // Nothing was half-spawned.
    assert!(engine.tick().enemies.is_empty());
    let id = engine
        .spawn_enemy(Pose::new(Vec3::ZERO, Vec3::Z), Vec::new(), EnemyConfig::default())
        .unwrap();
    assert_eq!(id, 0);
}

// ---- Scenario ----

#[test]
fn test_hallway_scenario_runs_to_completion() {
    let scenario = Scenario::hallway();
    let mut engine = SimulationEngine::from_scenario(&scenario, SimConfig::default()).unwrap();
    let snapshots = run(&mut engine, scenario.ticks as usize);

    assert_eq!(snapshots.last().unwrap().enemies.len(), 2);
    assert!(!state_changes(&snapshots).is_empty());
    // The scripted stun always lands on enemy 0.
    assert!(snapshots.iter().flat_map(|s| s.events.iter()).any(|r| r.enemy_id == 0
        && matches!(
            r.event,
            EnemyEvent::StateChanged {
                to: EnemyState::Stunned,
                ..
            }
        )));
    for snap in &snapshots {
        for enemy in &snap.enemies {
            assert!(engine.floorplan().is_walkable(enemy.position));
        }
    }
}

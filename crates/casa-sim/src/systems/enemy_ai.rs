//! Enemy AI system: ticks every enemy's state machine.
//!
//! Reads the player, builds each enemy's senses from its body, ticks the
//! agent against a navigator over that body, and collects the events the
//! agent raised.

use hecs::World;

use casa_core::components::{Enemy, Player};
use casa_core::state::EnemyEventRecord;
use casa_core::types::{PlayerSample, Pose};
use casa_enemy_ai::Senses;

use crate::components::{EnemyBrain, NavBody};
use crate::floorplan::Floorplan;
use crate::navigator::KinematicNavigator;

/// The player as enemies perceive it, if present.
pub fn find_player(world: &World) -> Option<PlayerSample> {
    world
        .query::<(&Player, &Pose)>()
        .iter()
        .next()
        .map(|(_, (_, pose))| PlayerSample::new(pose.position, pose.forward))
}

pub fn run(
    world: &mut World,
    floorplan: &Floorplan,
    dt: f32,
    current_tick: u64,
    events: &mut Vec<EnemyEventRecord>,
) {
    let player = find_player(world);

    for (_entity, (enemy, brain, body)) in
        world.query_mut::<(&Enemy, &mut EnemyBrain, &mut NavBody)>()
    {
        let senses = Senses {
            pose: body.pose(),
            player,
            occluder: floorplan,
        };
        let mut nav = KinematicNavigator::new(body, floorplan);
        brain.agent.tick(dt, &senses, &mut nav);

        events.extend(
            brain
                .agent
                .drain_events()
                .into_iter()
                .map(|event| EnemyEventRecord {
                    enemy_id: enemy.enemy_id,
                    tick: current_tick,
                    event,
                }),
        );
    }
}

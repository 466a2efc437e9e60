//! Hearing system: hands queued sounds to each enemy before it thinks.

use std::collections::HashMap;

use hecs::World;
use tracing::trace;

use casa_core::components::Enemy;
use casa_enemy_ai::SoundInbox;

use crate::components::{EnemyBrain, NavBody};
use crate::floorplan::Floorplan;
use crate::navigator::KinematicNavigator;

/// Drain each enemy's inbox into its agent. Returns how many sounds
/// triggered a reaction.
pub fn run(world: &mut World, floorplan: &Floorplan, inboxes: &HashMap<u32, SoundInbox>) -> usize {
    let mut reactions = 0;
    for (_entity, (enemy, brain, body)) in
        world.query_mut::<(&Enemy, &mut EnemyBrain, &mut NavBody)>()
    {
        let Some(inbox) = inboxes.get(&enemy.enemy_id) else {
            continue;
        };
        for sound in inbox.drain() {
            let mut nav = KinematicNavigator::new(body, floorplan);
            if brain.agent.hear(&sound, &mut nav) {
                reactions += 1;
            } else {
                trace!(enemy_id = enemy.enemy_id, ?sound, "sound ignored");
            }
        }
    }
    reactions
}

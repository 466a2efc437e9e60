//! Kinematic movement system: steps every body toward its destination.

use hecs::World;

use crate::components::NavBody;
use crate::floorplan::Floorplan;

pub fn run(world: &mut World, floorplan: &Floorplan, dt: f32) {
    for (_entity, body) in world.query_mut::<&mut NavBody>() {
        body.advance(dt, floorplan);
    }
}

//! Ports to the host world: pathfinding and line-of-sight occlusion.

use glam::Vec3;

/// Movement capability the state machine drives.
///
/// Implemented by the host's navigation agent (navmesh, kinematic stepper,
/// or a test double). Commands are fire-and-forget; progress is polled.
pub trait NavigationPort {
    /// Start moving toward `point`, replacing any previous destination.
    fn set_destination(&mut self, point: Vec3);

    /// Distance left along the current path, in meters.
    fn remaining_distance(&self) -> f32;

    /// True while a path request is still being computed.
    fn path_pending(&self) -> bool;

    fn stop(&mut self);

    fn resume(&mut self);

    fn is_stopped(&self) -> bool;

    fn set_speed(&mut self, speed: f32);

    /// Nearest walkable point within `radius` of `near`, if any.
    fn sample_point_on_surface(&self, near: Vec3, radius: f32) -> Option<Vec3>;
}

/// Blocks line of sight between two points.
pub trait Occluder {
    fn blocks(&self, from: Vec3, to: Vec3) -> bool;
}

/// Occluder for an empty world.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSpace;

impl Occluder for OpenSpace {
    fn blocks(&self, _from: Vec3, _to: Vec3) -> bool {
        false
    }
}

/// Whether the agent has reached its destination.
pub fn has_arrived(nav: &dyn NavigationPort, arrival_distance: f32) -> bool {
    !nav.path_pending() && nav.remaining_distance() < arrival_distance
}

/// Snap `point` onto the walkable surface, keeping it unchanged when
/// sampling fails.
pub fn snap_or_keep(nav: &dyn NavigationPort, point: Vec3, radius: f32) -> Vec3 {
    nav.sample_point_on_surface(point, radius).unwrap_or(point)
}

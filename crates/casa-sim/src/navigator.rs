//! Straight-line navigation for the headless world.
//!
//! `NavBody` is the per-enemy movement component. `KinematicNavigator`
//! borrows a body together with the floorplan and exposes it to the AI
//! through [`NavigationPort`]. Paths are straight lines, so a path is never
//! pending; a body that would step into an obstacle stays where it is.

use glam::Vec3;

use casa_core::types::{flatten, Pose};
use casa_enemy_ai::navigation::NavigationPort;

use crate::floorplan::Floorplan;

/// Movement state of one enemy.
#[derive(Debug, Clone, PartialEq)]
pub struct NavBody {
    pub position: Vec3,
    pub forward: Vec3,
    pub destination: Option<Vec3>,
    pub speed: f32,
    pub stopped: bool,
    /// Set when the last step was refused by an obstacle.
    pub blocked: bool,
}

impl NavBody {
    pub fn new(pose: Pose) -> Self {
        Self {
            position: pose.position,
            forward: pose.forward,
            destination: None,
            speed: 0.0,
            stopped: false,
            blocked: false,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.forward)
    }

    pub fn remaining_distance(&self) -> f32 {
        self.destination
            .map_or(0.0, |d| flatten(d - self.position).length())
    }

    /// Move up to `speed * dt` toward the destination.
    pub fn advance(&mut self, dt: f32, floorplan: &Floorplan) {
        if self.stopped {
            return;
        }
        let Some(destination) = self.destination else {
            return;
        };
        let offset = flatten(destination - self.position);
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return;
        }
        let direction = offset / distance;
        let step = (self.speed * dt).min(distance);
        let next = if step >= distance {
            Vec3::new(destination.x, self.position.y, destination.z)
        } else {
            self.position + direction * step
        };
        self.forward = direction;
        if floorplan.is_walkable(next) {
            self.position = next;
            self.blocked = false;
        } else {
            self.blocked = true;
        }
    }
}

/// [`NavigationPort`] over a body and the level it walks in.
pub struct KinematicNavigator<'a> {
    body: &'a mut NavBody,
    floorplan: &'a Floorplan,
}

impl<'a> KinematicNavigator<'a> {
    pub fn new(body: &'a mut NavBody, floorplan: &'a Floorplan) -> Self {
        Self { body, floorplan }
    }
}

impl NavigationPort for KinematicNavigator<'_> {
    fn set_destination(&mut self, point: Vec3) {
        self.body.destination = Some(point);
    }

    fn remaining_distance(&self) -> f32 {
        self.body.remaining_distance()
    }

    fn path_pending(&self) -> bool {
        false
    }

    fn stop(&mut self) {
        self.body.stopped = true;
    }

    fn resume(&mut self) {
        self.body.stopped = false;
    }

    fn is_stopped(&self) -> bool {
        self.body.stopped
    }

    fn set_speed(&mut self, speed: f32) {
        self.body.speed = speed.max(0.0);
    }

    fn sample_point_on_surface(&self, near: Vec3, radius: f32) -> Option<Vec3> {
        self.floorplan.sample_walkable(near, radius)
    }
}

//! Level geometry for the headless world.
//!
//! A floorplan is a rectangular walkable area on the x/z plane with box
//! obstacles (walls, furniture). Obstacles block both movement (by their
//! footprint) and sight (by their full 3D extent).

use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use casa_enemy_ai::navigation::Occluder;

/// Spacing between candidate points when searching for walkable ground.
const SAMPLE_STEP: f32 = 0.25;

/// Axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub min: Vec3,
    pub max: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floorplan {
    /// Walkable bounds; only x and z are used.
    pub min: Vec3,
    pub max: Vec3,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
}

impl Obstacle {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Whether the ground footprint covers `p` (height ignored).
    pub fn covers(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.z >= self.min.z && p.z <= self.max.z
    }

    /// Slab test: does the segment `from -> to` pass through the box?
    pub fn intersects_segment(&self, from: Vec3, to: Vec3) -> bool {
        let dir = to - from;
        let mut t_enter = 0.0_f32;
        let mut t_exit = 1.0_f32;
        for axis in 0..3 {
            let origin = from[axis];
            let delta = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if delta.abs() < f32::EPSILON {
                if origin < lo || origin > hi {
                    return false;
                }
                continue;
            }
            let inv = 1.0 / delta;
            let (mut t0, mut t1) = ((lo - origin) * inv, (hi - origin) * inv);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return false;
            }
        }
        true
    }
}

impl Default for Floorplan {
    fn default() -> Self {
        Self::open(50.0)
    }
}

impl Floorplan {
    /// Empty square room centered on the origin.
    pub fn open(half_extent: f32) -> Self {
        Self {
            min: Vec3::new(-half_extent, 0.0, -half_extent),
            max: Vec3::new(half_extent, 0.0, half_extent),
            obstacles: Vec::new(),
        }
    }

    pub fn with_obstacle(mut self, obstacle: Obstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    pub fn in_bounds(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.z >= self.min.z && p.z <= self.max.z
    }

    pub fn is_walkable(&self, p: Vec3) -> bool {
        self.in_bounds(p) && !self.obstacles.iter().any(|o| o.covers(p))
    }

    /// Nearest walkable point within `radius` of `near`, searched on rings
    /// of increasing radius. Keeps the height of `near`.
    pub fn sample_walkable(&self, near: Vec3, radius: f32) -> Option<Vec3> {
        if self.is_walkable(near) {
            return Some(near);
        }
        let rings = (radius / SAMPLE_STEP).floor() as usize;
        for ring in 1..=rings {
            let r = ring as f32 * SAMPLE_STEP;
            let count = ((TAU * r / SAMPLE_STEP).ceil() as usize).max(8);
            for i in 0..count {
                let angle = i as f32 * TAU / count as f32;
                let candidate = near + Vec3::new(angle.cos(), 0.0, angle.sin()) * r;
                if self.is_walkable(candidate) {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

impl Occluder for Floorplan {
    fn blocks(&self, from: Vec3, to: Vec3) -> bool {
        self.obstacles.iter().any(|o| o.intersects_segment(from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> Obstacle {
        // Thin wall across the z axis at x = 5, three meters tall.
        Obstacle::new(Vec3::new(4.9, 0.0, -10.0), Vec3::new(5.1, 3.0, 10.0))
    }

    #[test]
    fn test_segment_through_wall_is_blocked() {
        let plan = Floorplan::open(20.0).with_obstacle(wall());
        assert!(plan.blocks(Vec3::new(0.0, 1.0, 0.0), Vec3::new(10.0, 1.0, 0.0)));
        assert!(!plan.blocks(Vec3::new(0.0, 1.0, 0.0), Vec3::new(4.0, 1.0, 3.0)));
    }

    #[test]
    fn test_segment_over_low_obstacle_is_clear() {
        let table = Obstacle::new(Vec3::new(2.0, 0.0, -1.0), Vec3::new(3.0, 0.8, 1.0));
        let plan = Floorplan::open(20.0).with_obstacle(table);
        // Eye height 1.0 to a standing player's head.
        assert!(!plan.blocks(Vec3::new(0.0, 1.0, 0.0), Vec3::new(6.0, 1.5, 0.0)));
        // Down to the floor behind it.
        assert!(plan.blocks(Vec3::new(0.0, 1.0, 0.0), Vec3::new(6.0, 0.0, 0.0)));
    }

    #[test]
    fn test_walkable_excludes_footprints_and_outside() {
        let plan = Floorplan::open(10.0).with_obstacle(wall());
        assert!(plan.is_walkable(Vec3::new(0.0, 0.0, 0.0)));
        assert!(!plan.is_walkable(Vec3::new(5.0, 0.0, 0.0)));
        assert!(!plan.is_walkable(Vec3::new(11.0, 0.0, 0.0)));
    }

    #[test]
    fn test_sample_walkable_snaps_out_of_obstacle() {
        let plan = Floorplan::open(20.0).with_obstacle(wall());
        let snapped = plan
            .sample_walkable(Vec3::new(5.0, 0.0, 2.0), 1.0)
            .expect("free ground within a meter");
        assert!(plan.is_walkable(snapped));
        assert!(snapped.distance(Vec3::new(5.0, 0.0, 2.0)) <= 1.0 + 1e-4);
    }

    #[test]
    fn test_sample_walkable_fails_when_nothing_in_reach() {
        let plan = Floorplan::open(5.0);
        assert_eq!(plan.sample_walkable(Vec3::new(30.0, 0.0, 0.0), 2.0), None);
    }
}

//! Fundamental geometric and simulation types.
//!
//! Coordinates follow the host engine convention: y is up, the ground
//! plane is x/z, and an unrotated actor faces +z.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Position and facing of an actor in world space (meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    /// Facing direction. Not required to be normalized; a zero vector means
    /// the facing is unknown.
    pub forward: Vec3,
}

/// What the enemy may know about the player on a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSample {
    pub position: Vec3,
    #[serde(default)]
    pub forward: Vec3,
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::Z,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self { position, forward }
    }

    /// Distance to a point in meters (3D).
    pub fn range_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }

    /// Unsigned angle in degrees between the facing and the direction to `point`.
    pub fn angle_to(&self, point: Vec3) -> f32 {
        angle_between_deg(self.forward, point - self.position)
    }

    /// Point `height` meters above the position, used as the line-of-sight origin.
    pub fn eye(&self, height: f32) -> Vec3 {
        self.position + Vec3::Y * height
    }
}

impl PlayerSample {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self { position, forward }
    }

    /// A player whose facing is not known.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            forward: Vec3::ZERO,
        }
    }
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}

/// Unsigned angle between two vectors in degrees, in `[0, 180]`.
///
/// Returns 0 when either vector has zero length.
pub fn angle_between_deg(a: Vec3, b: Vec3) -> f32 {
    let denom = (a.length_squared() * b.length_squared()).sqrt();
    if denom <= f32::EPSILON {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Linear interpolation with `t` clamped to `[0, 1]`.
pub fn lerp_clamped(a: f32, b: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    a + (b - a) * t
}

/// Project onto the ground plane (drops the vertical component).
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

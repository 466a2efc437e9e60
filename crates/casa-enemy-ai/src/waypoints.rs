//! Patrol routes.
//!
//! A route is an ordered list of points walked either back and forth
//! (ping-pong) or in a loop (cyclic). After an interruption the enemy
//! rejoins the route at the point that best matches where it is facing,
//! and walks on in whichever direction that facing suggests.

use glam::Vec3;
use rand::Rng;

use casa_core::constants::{WAYPOINT_MIN_COUNT, WAYPOINT_MIN_RADIUS};
use casa_core::enums::{PatrolDirection, Traversal};
use casa_core::types::flatten;

use crate::search::ring;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaypointRoute {
    points: Vec<Vec3>,
    index: usize,
    direction: PatrolDirection,
    traversal: Traversal,
}

impl WaypointRoute {
    pub fn new(points: Vec<Vec3>, traversal: Traversal) -> Self {
        Self {
            points,
            index: 0,
            direction: PatrolDirection::Forward,
            traversal,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Index of the current target, `None` for an empty route.
    pub fn index(&self) -> Option<usize> {
        (!self.points.is_empty()).then_some(self.index)
    }

    pub fn direction(&self) -> PatrolDirection {
        self.direction
    }

    pub fn traversal(&self) -> Traversal {
        self.traversal
    }

    pub fn current(&self) -> Option<Vec3> {
        self.points.get(self.index).copied()
    }

    /// Replace the points and restart from the first one.
    pub fn set_points(&mut self, points: Vec<Vec3>) {
        self.points = points;
        self.index = 0;
        self.direction = PatrolDirection::Forward;
    }

    /// Step to the next point and return it.
    pub fn advance(&mut self) -> Option<Vec3> {
        let n = self.points.len();
        if n == 0 {
            return None;
        }
        if n == 1 {
            self.index = 0;
            return self.current();
        }
        self.index = match (self.traversal, self.direction) {
            (Traversal::Cyclic, PatrolDirection::Forward) => (self.index + 1) % n,
            (Traversal::Cyclic, PatrolDirection::Backward) => (self.index + n - 1) % n,
            (Traversal::PingPong, PatrolDirection::Forward) => {
                if self.index + 1 < n {
                    self.index + 1
                } else {
                    self.direction = self.direction.reversed();
                    self.index - 1
                }
            }
            (Traversal::PingPong, PatrolDirection::Backward) => {
                if self.index > 0 {
                    self.index - 1
                } else {
                    self.direction = self.direction.reversed();
                    self.index + 1
                }
            }
        };
        self.current()
    }

    /// Index of the point best aligned with `forward` from `position`.
    ///
    /// Score is the dot product of the facing with the unit direction to the
    /// point, minus `distance_penalty` per meter. A zero facing degenerates
    /// to picking the nearest point.
    pub fn best_aligned(&self, position: Vec3, forward: Vec3, distance_penalty: f32) -> Option<usize> {
        let facing = flatten(forward).normalize_or_zero();
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let offset = flatten(*p - position);
                let score = facing.dot(offset.normalize_or_zero()) - offset.length() * distance_penalty;
                (i, score)
            })
            .fold(None, |best: Option<(usize, f32)>, (i, score)| match best {
                Some((_, top)) if top >= score => best,
                _ => Some((i, score)),
            })
            .map(|(i, _)| i)
    }

    /// Rejoin the route at the best-aligned point, inferring the direction
    /// of travel from the neighbour that better matches the facing.
    pub fn resume_from(&mut self, position: Vec3, forward: Vec3, distance_penalty: f32) -> Option<Vec3> {
        let index = self.best_aligned(position, forward, distance_penalty)?;
        self.index = index;
        self.direction = self.infer_direction(index, forward);
        self.current()
    }

    fn infer_direction(&self, index: usize, forward: Vec3) -> PatrolDirection {
        let n = self.points.len();
        let (next, prev) = match self.traversal {
            Traversal::Cyclic if n > 1 => (Some((index + 1) % n), Some((index + n - 1) % n)),
            _ => (
                (index + 1 < n).then_some(index + 1),
                index.checked_sub(1),
            ),
        };
        let facing = flatten(forward).normalize_or_zero();
        let alignment =
            |j: usize| facing.dot(flatten(self.points[j] - self.points[index]).normalize_or_zero());
        match (next, prev) {
            (Some(a), Some(b)) if alignment(b) > alignment(a) => PatrolDirection::Backward,
            (None, Some(_)) => PatrolDirection::Backward,
            _ => PatrolDirection::Forward,
        }
    }
}

/// Points evenly spaced on a circle. `count` is raised to at least 2 and
/// `radius` to at least 1.
pub fn circular(center: Vec3, count: usize, radius: f32) -> Vec<Vec3> {
    ring(
        center,
        count.max(WAYPOINT_MIN_COUNT),
        radius.max(WAYPOINT_MIN_RADIUS),
    )
}

/// Points in random directions at distances in `[radius / 2, radius]`,
/// with the same clamping as [`circular`].
pub fn random<R: Rng>(center: Vec3, count: usize, radius: f32, rng: &mut R) -> Vec<Vec3> {
    let radius = radius.max(WAYPOINT_MIN_RADIUS);
    (0..count.max(WAYPOINT_MIN_COUNT))
        .map(|_| {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let distance = rng.gen_range(radius / 2.0..=radius);
            center + Vec3::new(angle.cos(), 0.0, angle.sin()) * distance
        })
        .collect()
}

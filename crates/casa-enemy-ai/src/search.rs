//! Point generation for searching, alert sweeps and stalking.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use casa_core::types::{flatten, PlayerSample};

use crate::navigation::NavigationPort;

/// `count` points evenly spaced on a horizontal circle around `center`,
/// starting on the +x axis.
pub fn ring(center: Vec3, count: usize, radius: f32) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let angle = i as f32 * TAU / count as f32;
            center + Vec3::new(angle.cos(), 0.0, angle.sin()) * radius
        })
        .collect()
}

/// Search points around `center`, each snapped to the walkable surface.
///
/// A point whose sample fails, or lands further than `radius` from the
/// center, falls back to the center itself.
pub fn search_points(
    center: Vec3,
    count: usize,
    radius: f32,
    nav: &dyn NavigationPort,
) -> Vec<Vec3> {
    ring(center, count, radius)
        .into_iter()
        .map(|p| match nav.sample_point_on_surface(p, radius) {
            Some(snapped) if snapped.distance(center) <= radius + 1e-3 => snapped,
            _ => center,
        })
        .collect()
}

/// Spot `distance` behind the player.
///
/// Behind means opposite the player's facing; with no known facing, the
/// spot is on the line toward the stalker instead.
pub fn stalking_anchor(player: &PlayerSample, stalker: Vec3, distance: f32) -> Vec3 {
    let behind = flatten(player.forward)
        .try_normalize()
        .map(|f| -f)
        .or_else(|| flatten(stalker - player.position).try_normalize())
        .unwrap_or(Vec3::NEG_Z);
    player.position + behind * distance
}

/// Offset `point` horizontally by up to `amount` on each axis.
pub fn jitter<R: Rng>(point: Vec3, amount: f32, rng: &mut R) -> Vec3 {
    if amount <= 0.0 {
        return point;
    }
    let dx = rng.gen_range(-amount..=amount);
    let dz = rng.gen_range(-amount..=amount);
    point + Vec3::new(dx, 0.0, dz)
}

//! Player detection.
//!
//! Each tick the agent samples what it can perceive of the player (vision
//! cone with occlusion, or raw proximity) and integrates that into a meter.
//! The meter rises faster the closer the player is and decays when nothing
//! is perceived. A full meter means the player has been spotted.

use casa_core::config::{DetectionConfig, PerceptionConfig};
use casa_core::types::{lerp_clamped, PlayerSample, Pose};

use crate::navigation::Occluder;

/// Instantaneous perception of the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    pub can_see: bool,
    pub in_proximity: bool,
    /// Distance to the player in meters (infinite when absent).
    pub distance: f32,
    /// Angle between facing and the direction to the player, in degrees.
    pub angle_deg: f32,
}

impl Perception {
    /// Nothing perceived.
    pub const NONE: Perception = Perception {
        can_see: false,
        in_proximity: false,
        distance: f32::INFINITY,
        angle_deg: 180.0,
    };

    /// Visible or close enough to be felt.
    pub fn perceptible(&self) -> bool {
        self.can_see || self.in_proximity
    }
}

impl Default for Perception {
    fn default() -> Self {
        Self::NONE
    }
}

/// Vision check: in range, inside the cone, and not occluded from eye level.
pub fn can_see(
    pose: &Pose,
    player: &PlayerSample,
    config: &PerceptionConfig,
    occluder: &dyn Occluder,
) -> bool {
    if pose.range_to(player.position) > config.vision_range {
        return false;
    }
    if pose.angle_to(player.position) > config.vision_angle_deg / 2.0 {
        return false;
    }
    !occluder.blocks(pose.eye(config.eye_height), player.position)
}

pub fn in_proximity(pose: &Pose, player: &PlayerSample, config: &PerceptionConfig) -> bool {
    pose.range_to(player.position) <= config.proximity_radius
}

/// Sample perception for this tick. A missing player is never perceived.
pub fn perceive(
    pose: &Pose,
    player: Option<&PlayerSample>,
    config: &PerceptionConfig,
    occluder: &dyn Occluder,
) -> Perception {
    let Some(player) = player else {
        return Perception::NONE;
    };
    Perception {
        can_see: can_see(pose, player, config, occluder),
        in_proximity: in_proximity(pose, player, config),
        distance: pose.range_to(player.position),
        angle_deg: pose.angle_to(player.position),
    }
}

/// Meter gain per second for a perception sample. Zero when nothing is
/// perceived.
pub fn accrual_rate(
    perception: &Perception,
    perception_config: &PerceptionConfig,
    config: &DetectionConfig,
) -> f32 {
    if !perception.perceptible() {
        return 0.0;
    }
    let closeness = lerp_clamped(
        config.near_factor,
        1.0,
        perception.distance / perception_config.vision_range,
    );
    let multiplier = if perception.can_see {
        1.0
    } else if perception.angle_deg <= config.front_half_angle_deg {
        config.front_multiplier
    } else {
        config.rear_multiplier
    };
    config.base_rate * multiplier * closeness
}

/// Detection meter clamped to `[0, threshold]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionMeter {
    value: f32,
    threshold: f32,
}

impl DetectionMeter {
    pub fn new(threshold: f32) -> Self {
        Self {
            value: 0.0,
            threshold,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Meter as a fraction of the threshold, in `[0, 1]`.
    pub fn normalized(&self) -> f32 {
        if self.threshold <= 0.0 {
            return 0.0;
        }
        self.value / self.threshold
    }

    pub fn is_full(&self) -> bool {
        self.value >= self.threshold
    }

    /// Integrate one tick of perception. Returns the new value.
    pub fn update(
        &mut self,
        perception: &Perception,
        perception_config: &PerceptionConfig,
        config: &DetectionConfig,
        dt: f32,
    ) -> f32 {
        let next = if perception.perceptible() {
            self.value + accrual_rate(perception, perception_config, config) * dt
        } else {
            self.value - config.decay_rate * dt
        };
        self.value = next.clamp(0.0, self.threshold);
        self.value
    }

    /// Jump straight to the threshold.
    pub fn fill(&mut self) {
        self.value = self.threshold;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::OpenSpace;
    use glam::Vec3;

    struct Wall;

    impl Occluder for Wall {
        fn blocks(&self, _from: Vec3, _to: Vec3) -> bool {
            true
        }
    }

    fn facing_north() -> Pose {
        Pose::new(Vec3::ZERO, Vec3::Z)
    }

    fn player_at(x: f32, z: f32) -> PlayerSample {
        PlayerSample::at(Vec3::new(x, 0.0, z))
    }

    #[test]
    fn test_can_see_inside_cone() {
        let config = PerceptionConfig::default();
        assert!(can_see(&facing_north(), &player_at(0.0, 10.0), &config, &OpenSpace));
        // 45 degrees off-axis is outside a 60-degree cone.
        assert!(!can_see(&facing_north(), &player_at(5.0, 5.0), &config, &OpenSpace));
    }

    #[test]
    fn test_can_see_respects_range_and_occlusion() {
        let config = PerceptionConfig::default();
        assert!(!can_see(&facing_north(), &player_at(0.0, 20.0), &config, &OpenSpace));
        assert!(!can_see(&facing_north(), &player_at(0.0, 5.0), &config, &Wall));
    }

    #[test]
    fn test_proximity_ignores_walls_and_facing() {
        let config = PerceptionConfig::default();
        let p = perceive(&facing_north(), Some(&player_at(0.0, -2.0)), &config, &Wall);
        assert!(!p.can_see);
        assert!(p.in_proximity);
        assert!(p.perceptible());
    }

    #[test]
    fn test_missing_player_is_not_perceived() {
        let config = PerceptionConfig::default();
        let p = perceive(&facing_north(), None, &config, &OpenSpace);
        assert_eq!(p, Perception::NONE);
    }

    #[test]
    fn test_accrual_faster_when_close() {
        let pc = PerceptionConfig::default();
        let dc = DetectionConfig::default();
        let near = perceive(&facing_north(), Some(&player_at(0.0, 1.0)), &pc, &OpenSpace);
        let far = perceive(&facing_north(), Some(&player_at(0.0, 14.0)), &pc, &OpenSpace);
        assert!(accrual_rate(&near, &pc, &dc) > accrual_rate(&far, &pc, &dc));
        // At the edge of vision the multiplier bottoms out at 1.
        let edge = Perception {
            can_see: true,
            in_proximity: false,
            distance: pc.vision_range,
            angle_deg: 0.0,
        };
        assert!((accrual_rate(&edge, &pc, &dc) - dc.base_rate).abs() < 1e-4);
    }

    #[test]
    fn test_rear_proximity_is_slower_than_front() {
        let pc = PerceptionConfig::default();
        let dc = DetectionConfig::default();
        let front = perceive(&facing_north(), Some(&player_at(0.0, 2.0)), &pc, &Wall);
        let rear = perceive(&facing_north(), Some(&player_at(0.0, -2.0)), &pc, &Wall);
        let front_rate = accrual_rate(&front, &pc, &dc);
        let rear_rate = accrual_rate(&rear, &pc, &dc);
        assert!(front_rate > rear_rate);
        assert!((rear_rate / front_rate - dc.rear_multiplier / dc.front_multiplier).abs() < 1e-4);
    }

    #[test]
    fn test_meter_clamps_at_threshold() {
        let pc = PerceptionConfig::default();
        let dc = DetectionConfig::default();
        let seen = perceive(&facing_north(), Some(&player_at(0.0, 1.0)), &pc, &OpenSpace);
        let mut meter = DetectionMeter::new(dc.threshold);
        for _ in 0..1000 {
            meter.update(&seen, &pc, &dc, 0.1);
            assert!(meter.value() <= dc.threshold);
        }
        assert!(meter.is_full());
        assert_eq!(meter.value(), dc.threshold);
        assert_eq!(meter.normalized(), 1.0);
    }

    #[test]
    fn test_meter_decays_to_zero() {
        let pc = PerceptionConfig::default();
        let dc = DetectionConfig::default();
        let mut meter = DetectionMeter::new(dc.threshold);
        meter.fill();
        for _ in 0..200 {
            meter.update(&Perception::NONE, &pc, &dc, 0.1);
            assert!(meter.value() >= 0.0);
        }
        assert_eq!(meter.value(), 0.0);
    }

    #[test]
    fn test_zero_multiplier_holds_meter_while_perceived() {
        let pc = PerceptionConfig::default();
        let dc = DetectionConfig {
            front_multiplier: 0.0,
            ..DetectionConfig::default()
        };
        // Felt in front through a wall: perceived, but accrues nothing.
        let felt = perceive(&facing_north(), Some(&player_at(0.0, 2.0)), &pc, &Wall);
        assert!(felt.in_proximity && !felt.can_see);
        assert_eq!(accrual_rate(&felt, &pc, &dc), 0.0);

        let mut meter = DetectionMeter::new(dc.threshold);
        meter.update(&Perception { can_see: true, ..felt }, &pc, &dc, 1.0);
        let held = meter.value();
        assert!(held > 0.0);
        for _ in 0..10 {
            meter.update(&felt, &pc, &dc, 0.1);
        }
        assert_eq!(meter.value(), held, "meter must not decay while the player is perceived");
    }

    #[test]
    fn test_meter_single_tick_gain() {
        let pc = PerceptionConfig::default();
        let dc = DetectionConfig::default();
        let seen = Perception {
            can_see: true,
            in_proximity: false,
            distance: 0.0,
            angle_deg: 0.0,
        };
        let mut meter = DetectionMeter::new(dc.threshold);
        let value = meter.update(&seen, &pc, &dc, 0.5);
        // base 25/s * near factor 3 * 0.5 s
        assert!((value - 37.5).abs() < 1e-4);
    }
}

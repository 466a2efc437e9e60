//! Enemy tuning configuration.
//!
//! All sections deserialize with defaults, so a JSON file only needs the
//! fields it overrides. Defaults live in [`crate::constants`].

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::Traversal;
use crate::error::ConfigError;

/// Complete tuning surface of one enemy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub perception: PerceptionConfig,
    pub detection: DetectionConfig,
    pub movement: MovementConfig,
    pub timing: TimingConfig,
    pub patrol: PatrolConfig,
    pub search: SearchConfig,
    pub stalking: StalkingConfig,
}

/// Senses: sight cone, hearing and proximity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    pub vision_range: f32,
    /// Full cone width in degrees.
    pub vision_angle_deg: f32,
    pub eye_height: f32,
    pub hearing_range: f32,
    pub proximity_radius: f32,
}

/// Detection meter rates.
///
/// Gain per second while perceiving the player is
/// `base_rate * multiplier * lerp(near_factor, 1, distance / vision_range)`
/// where the multiplier is 1 when seen, `front_multiplier` or
/// `rear_multiplier` when only sensed in proximity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub threshold: f32,
    pub base_rate: f32,
    pub decay_rate: f32,
    pub front_multiplier: f32,
    pub rear_multiplier: f32,
    pub near_factor: f32,
    pub front_half_angle_deg: f32,
}

/// Navigation speed per state (m/s).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub patrol_speed: f32,
    pub investigate_speed: f32,
    pub alert_speed: f32,
    pub urgent_alert_speed: f32,
    pub chase_speed: f32,
    pub search_speed: f32,
    pub stalking_speed: f32,
    pub retreat_speed: f32,
    pub arrival_distance: f32,
}

/// How long each timed state lasts (seconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub lose_player_time: f32,
    pub investigate_time: f32,
    pub alert_duration: f32,
    pub search_duration: f32,
    pub stalking_duration: f32,
    pub stun_duration: f32,
    pub post_stun_wait_time: f32,
}

/// Waypoint route behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolConfig {
    pub min_wait: f32,
    pub max_wait: f32,
    pub traversal: Traversal,
    pub retreat_distance_penalty: f32,
}

/// Search and alert sweep pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub point_count: usize,
    pub radius: f32,
    pub time_per_point: f32,
}

/// Shadowing behavior after losing the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StalkingConfig {
    pub distance: f32,
    pub update_interval: f32,
    pub jitter: f32,
    /// Probability of stalking instead of searching when the player is lost.
    pub probability: f64,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            vision_range: VISION_RANGE,
            vision_angle_deg: VISION_ANGLE_DEG,
            eye_height: EYE_HEIGHT,
            hearing_range: HEARING_RANGE,
            proximity_radius: PROXIMITY_RADIUS,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: DETECTION_THRESHOLD,
            base_rate: DETECTION_BASE_RATE,
            decay_rate: DETECTION_DECAY_RATE,
            front_multiplier: DETECTION_FRONT_MULTIPLIER,
            rear_multiplier: DETECTION_REAR_MULTIPLIER,
            near_factor: DETECTION_NEAR_FACTOR,
            front_half_angle_deg: DETECTION_FRONT_HALF_ANGLE_DEG,
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            patrol_speed: PATROL_SPEED,
            investigate_speed: INVESTIGATE_SPEED,
            alert_speed: ALERT_SPEED,
            urgent_alert_speed: URGENT_ALERT_SPEED,
            chase_speed: CHASE_SPEED,
            search_speed: SEARCH_SPEED,
            stalking_speed: STALKING_SPEED,
            retreat_speed: RETREAT_SPEED,
            arrival_distance: ARRIVAL_DISTANCE,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            lose_player_time: LOSE_PLAYER_TIME,
            investigate_time: INVESTIGATE_TIME,
            alert_duration: ALERT_DURATION,
            search_duration: SEARCH_DURATION,
            stalking_duration: STALKING_DURATION,
            stun_duration: STUN_DURATION,
            post_stun_wait_time: POST_STUN_WAIT_TIME,
        }
    }
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            min_wait: WAYPOINT_MIN_WAIT,
            max_wait: WAYPOINT_MAX_WAIT,
            traversal: Traversal::default(),
            retreat_distance_penalty: RETREAT_DISTANCE_PENALTY,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            point_count: SEARCH_POINT_COUNT,
            radius: SEARCH_RADIUS,
            time_per_point: TIME_PER_SEARCH_POINT,
        }
    }
}

impl Default for StalkingConfig {
    fn default() -> Self {
        Self {
            distance: STALKING_DISTANCE,
            update_interval: STALKING_UPDATE_INTERVAL,
            jitter: STALKING_JITTER,
            probability: STALK_PROBABILITY,
        }
    }
}

impl EnemyConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EnemyConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the state machine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.perception;
        positive("perception.vision_range", p.vision_range)?;
        if !(p.vision_angle_deg > 0.0 && p.vision_angle_deg <= 360.0) {
            return Err(invalid(
                "perception.vision_angle_deg",
                format!("must be in (0, 360], got {}", p.vision_angle_deg),
            ));
        }
        non_negative("perception.eye_height", p.eye_height)?;
        non_negative("perception.hearing_range", p.hearing_range)?;
        non_negative("perception.proximity_radius", p.proximity_radius)?;

        let d = &self.detection;
        positive("detection.threshold", d.threshold)?;
        non_negative("detection.base_rate", d.base_rate)?;
        non_negative("detection.decay_rate", d.decay_rate)?;
        non_negative("detection.front_multiplier", d.front_multiplier)?;
        non_negative("detection.rear_multiplier", d.rear_multiplier)?;
        positive("detection.near_factor", d.near_factor)?;

        let m = &self.movement;
        for (field, speed) in [
            ("movement.patrol_speed", m.patrol_speed),
            ("movement.investigate_speed", m.investigate_speed),
            ("movement.alert_speed", m.alert_speed),
            ("movement.urgent_alert_speed", m.urgent_alert_speed),
            ("movement.chase_speed", m.chase_speed),
            ("movement.search_speed", m.search_speed),
            ("movement.stalking_speed", m.stalking_speed),
            ("movement.retreat_speed", m.retreat_speed),
        ] {
            positive(field, speed)?;
        }
        positive("movement.arrival_distance", m.arrival_distance)?;

        let t = &self.timing;
        for (field, secs) in [
            ("timing.lose_player_time", t.lose_player_time),
            ("timing.investigate_time", t.investigate_time),
            ("timing.alert_duration", t.alert_duration),
            ("timing.search_duration", t.search_duration),
            ("timing.stalking_duration", t.stalking_duration),
            ("timing.stun_duration", t.stun_duration),
            ("timing.post_stun_wait_time", t.post_stun_wait_time),
        ] {
            non_negative(field, secs)?;
        }

        let pa = &self.patrol;
        non_negative("patrol.min_wait", pa.min_wait)?;
        if pa.max_wait < pa.min_wait {
            return Err(invalid(
                "patrol.max_wait",
                format!("must be >= min_wait ({}), got {}", pa.min_wait, pa.max_wait),
            ));
        }
        non_negative("patrol.retreat_distance_penalty", pa.retreat_distance_penalty)?;

        let s = &self.search;
        if s.point_count == 0 {
            return Err(invalid("search.point_count", "must be at least 1".into()));
        }
        positive("search.radius", s.radius)?;
        non_negative("search.time_per_point", s.time_per_point)?;

        let st = &self.stalking;
        non_negative("stalking.distance", st.distance)?;
        positive("stalking.update_interval", st.update_interval)?;
        non_negative("stalking.jitter", st.jitter)?;
        if !(0.0..=1.0).contains(&st.probability) {
            return Err(invalid(
                "stalking.probability",
                format!("must be in [0, 1], got {}", st.probability),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be > 0, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be >= 0, got {value}")))
    }
}

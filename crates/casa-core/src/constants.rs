//! Simulation constants and tuning defaults.
//!
//! Every gameplay number here is only a default: `EnemyConfig` exposes all
//! of them so levels can retune the AI without code changes.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

// --- Perception ---

/// Maximum sight distance (meters).
pub const VISION_RANGE: f32 = 15.0;

/// Full width of the vision cone (degrees).
pub const VISION_ANGLE_DEG: f32 = 60.0;

/// Height of the line-of-sight origin above the enemy's position (meters).
pub const EYE_HEIGHT: f32 = 1.0;

/// Maximum distance at which sounds are heard (meters).
pub const HEARING_RANGE: f32 = 10.0;

/// Radius within which the player is sensed regardless of facing or walls (meters).
pub const PROXIMITY_RADIUS: f32 = 3.0;

// --- Detection meter ---

/// Meter value at which the enemy commits to a chase.
pub const DETECTION_THRESHOLD: f32 = 100.0;

/// Meter gain per second at the far edge of vision.
pub const DETECTION_BASE_RATE: f32 = 25.0;

/// Meter loss per second while the player is imperceptible.
pub const DETECTION_DECAY_RATE: f32 = 15.0;

/// Gain multiplier for an unseen player in proximity, in front of the enemy.
pub const DETECTION_FRONT_MULTIPLIER: f32 = 0.75;

/// Gain multiplier for an unseen player in proximity, behind the enemy.
pub const DETECTION_REAR_MULTIPLIER: f32 = 0.5;

/// Gain multiplier at point-blank range (falls to 1.0 at the vision range).
pub const DETECTION_NEAR_FACTOR: f32 = 3.0;

/// Half-space (degrees) counted as "in front" for proximity detection.
pub const DETECTION_FRONT_HALF_ANGLE_DEG: f32 = 90.0;

/// Smallest change in the normalized meter that is reported as an event.
pub const DETECTION_EVENT_EPSILON: f32 = 0.01;

// --- Movement speeds (m/s) ---

pub const PATROL_SPEED: f32 = 2.0;
pub const INVESTIGATE_SPEED: f32 = 3.0;
pub const ALERT_SPEED: f32 = 3.0;
pub const URGENT_ALERT_SPEED: f32 = 4.5;
pub const CHASE_SPEED: f32 = 5.0;
pub const SEARCH_SPEED: f32 = 2.5;
pub const STALKING_SPEED: f32 = 2.5;
pub const RETREAT_SPEED: f32 = 2.0;

// --- State durations (seconds) ---

pub const LOSE_PLAYER_TIME: f32 = 5.0;
pub const INVESTIGATE_TIME: f32 = 8.0;
pub const ALERT_DURATION: f32 = 10.0;
pub const SEARCH_DURATION: f32 = 15.0;
pub const STALKING_DURATION: f32 = 12.0;
pub const STUN_DURATION: f32 = 3.0;
pub const POST_STUN_WAIT_TIME: f32 = 2.0;

// --- Patrol ---

/// Remaining path distance below which a destination counts as reached (meters).
pub const ARRIVAL_DISTANCE: f32 = 0.5;

pub const WAYPOINT_MIN_WAIT: f32 = 2.0;
pub const WAYPOINT_MAX_WAIT: f32 = 4.0;

/// Weight of distance against alignment when picking a waypoint to resume at.
pub const RETREAT_DISTANCE_PENALTY: f32 = 0.05;

/// Generated routes never have fewer points than this.
pub const WAYPOINT_MIN_COUNT: usize = 2;

/// Generated routes never have a smaller radius than this (meters).
pub const WAYPOINT_MIN_RADIUS: f32 = 1.0;

// --- Search ---

pub const SEARCH_POINT_COUNT: usize = 4;
pub const SEARCH_RADIUS: f32 = 5.0;
pub const TIME_PER_SEARCH_POINT: f32 = 2.0;

// --- Stalking ---

pub const STALKING_DISTANCE: f32 = 6.0;
pub const STALKING_UPDATE_INTERVAL: f32 = 1.5;
pub const STALKING_JITTER: f32 = 1.0;

/// Chance of stalking (rather than searching) after losing the player.
pub const STALK_PROBABILITY: f64 = 0.6;

// --- Sound emitters ---

/// Minimum relative collision speed that makes a prop audible (m/s).
pub const MIN_COLLISION_FORCE: f32 = 2.0;

//! Wandering-enemy AI for Casa.
//!
//! Implements the enemy state machine, the detection meter, the sound bus,
//! waypoint routes and search/stalking geometry. Navigation and occlusion
//! are consumed through traits so the same code runs inside a game engine
//! or the headless simulation.

pub mod deferred;
pub mod detection;
pub mod fsm;
pub mod navigation;
pub mod search;
pub mod sound;
pub mod waypoints;

pub use casa_core as core;
pub use fsm::{EnemyAgent, Senses};
pub use navigation::{NavigationPort, Occluder, OpenSpace};
pub use sound::{SoundBus, SoundEmitter, SoundInbox, SubscriptionId};
pub use waypoints::WaypointRoute;

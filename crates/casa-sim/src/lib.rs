//! Headless simulation for Casa's enemies.
//!
//! Owns the hecs ECS world, runs the enemy AI against a simple floorplan at
//! a fixed tick rate, and produces `WorldSnapshot`s for tools and tests.

pub mod components;
pub mod engine;
pub mod error;
pub mod floorplan;
pub mod navigator;
pub mod scenario;
pub mod systems;
pub mod world_setup;

pub use casa_core as core;
pub use engine::{SimConfig, SimulationEngine};
pub use error::ScenarioError;
pub use scenario::Scenario;

#[cfg(test)]
mod tests;

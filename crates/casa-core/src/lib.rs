//! Core types and definitions for the Casa wandering-enemy AI.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geometry types, enemy states, configuration, commands, events,
//! snapshots and constants. It has no dependency on a game engine.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod state;
pub mod types;

pub use glam::Vec3;

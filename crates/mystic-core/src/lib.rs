//! Mystic Core - Core types and utilities for the Mystic NPC engine
//!
//! This crate provides the foundational types used throughout the engine:
//! - Mathematical primitives (re-exported from glam)
//! - Entity identifiers and poses for positioning
//! - Tick clock and cancellable task scheduler for the single tick thread

pub mod time;
pub mod types;

pub use glam::Vec3;
pub use time::{GameClock, Scheduler, TaskHandle, Tick, TickConfig, TICKS_PER_SECOND};
pub use types::{EntityId, Pose};

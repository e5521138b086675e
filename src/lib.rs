//! eDeDo - A 2D arcade platformer simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, entities, per-frame orchestration)
//! - `config`: Immutable game configuration and character selection
//! - `audio`: Sound requests emitted by the simulation and the volume policy in front of a player
//!
//! Rendering, input devices and audio synthesis live outside this crate. The
//! simulation only exposes the state to draw and the sounds to play.

pub mod audio;
pub mod config;
pub mod sim;

pub use audio::{AudioManager, AudioRequest, SoundKind, SoundSink};
pub use config::{Character, GameConfig};

/// Timing constants
pub mod consts {
    /// Simulation rate. One tick is one rendered frame.
    pub const TICKS_PER_SECOND: u32 = 60;
}

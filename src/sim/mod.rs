//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one tick = one frame at 60 Hz)
//! - Seeded RNG only
//! - Stable iteration order (collection order)
//! - No rendering, audio playback or platform dependencies

pub mod enemy;
pub mod level;
pub mod obstacle;
pub mod particles;
pub mod physics;
pub mod pickup;
pub mod player;
pub mod projectile;
pub mod state;
pub mod tick;

use rand::Rng;

pub use enemy::{Enemy, Tier, TierParams};
pub use level::{Level, generate_level};
pub use obstacle::{Obstacle, ObstacleKind};
pub use particles::{Particle, ParticleRequest, ParticleSystem, Rgb};
pub use physics::{
    Arena, Body, BodyContact, BoundaryContact, MIN_EXTENT, Rect, RectContact, WallSide,
    resolve_body_body, resolve_boundary, resolve_rect,
};
pub use pickup::{Door, HeartPickup};
pub use player::{CollisionEvent, ContactKind, JumpKind, PlayerBody};
pub use projectile::{EnemyBullet, Missile};
pub use state::{FireControl, GameEvent, GamePhase, GameState};
pub use tick::{TickInput, autopilot, tick};

/// Uniform float in [min, max), or `min` when the range is empty
pub(crate) fn random_span<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min { rng.random_range(min..max) } else { min }
}

/// Uniform integer in [min, max], tolerating swapped bounds
pub(crate) fn random_count<R: Rng>(rng: &mut R, min: u32, max: u32) -> u32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    rng.random_range(lo..=hi)
}

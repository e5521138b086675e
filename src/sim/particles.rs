//! Visual particle effects
//!
//! Particles are cosmetic. They draw from their own RNG stream so the number
//! of sparks spawned can never change gameplay.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::random_span;

/// Hard cap on live particles
pub const MAX_PARTICLES: usize = 2048;

/// Downward acceleration applied to particles each tick
pub const PARTICLE_GRAVITY: f32 = 0.2;

/// Horizontal air drag per tick
pub const PARTICLE_DRAG: f32 = 0.98;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Brighten every channel, saturating at 255
    pub fn lighten(self, amount: u8) -> Self {
        Self {
            r: self.r.saturating_add(amount),
            g: self.g.saturating_add(amount),
            b: self.b.saturating_add(amount),
        }
    }

    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
}

const IMPACT_COLORS: [Rgb; 4] = [
    Rgb::new(255, 200, 100),
    Rgb::new(255, 150, 50),
    Rgb::new(255, 100, 50),
    Rgb::new(255, 255, 150),
];

const RING_COLORS: [Rgb; 3] = [
    Rgb::new(200, 220, 255),
    Rgb::new(150, 200, 255),
    Rgb::new(100, 180, 255),
];

const BUMP_COLORS: [Rgb; 3] = [
    Rgb::new(255, 255, 255),
    Rgb::new(200, 220, 255),
    Rgb::new(255, 220, 200),
];

const TRAIL_COLORS: [Rgb; 3] = [
    Rgb::new(255, 255, 100),
    Rgb::new(255, 200, 50),
    Rgb::new(255, 150, 0),
];

/// "Spawn particles here" requests produced by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParticleRequest {
    /// Spray along `dir`; a zero direction sprays in all directions
    Directional { pos: Vec2, dir: Vec2, intensity: f32 },
    /// Enemy breaking apart in its own color
    EnemyDestruction { pos: Vec2, color: Rgb },
    MissileTrail { pos: Vec2 },
    /// Ring around the player on a double jump
    DoubleJumpRing { pos: Vec2, radius: f32 },
    /// Omnidirectional blast (charged missile)
    Explosion { pos: Vec2, intensity: f32 },
    /// Sparks where two bodies bumped
    BodyCollision { pos: Vec2, intensity: f32 },
}

/// A single decaying visual token
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Ticks left
    pub lifetime: u32,
    pub max_lifetime: u32,
    pub size: f32,
    pub color: Rgb,
}

impl Particle {
    /// Returns false once expired
    fn update(&mut self) -> bool {
        self.pos += self.vel;
        self.vel.y += PARTICLE_GRAVITY;
        self.vel.x *= PARTICLE_DRAG;
        self.lifetime = self.lifetime.saturating_sub(1);
        self.lifetime > 0
    }

    /// Remaining-life fraction in [0, 1]
    pub fn alpha(&self) -> f32 {
        if self.max_lifetime == 0 {
            0.0
        } else {
            (self.lifetime as f32 / self.max_lifetime as f32).min(1.0)
        }
    }

    /// Size shrinks with remaining life
    pub fn current_size(&self) -> f32 {
        self.size * self.alpha()
    }
}

/// Owns every live particle and the cosmetic RNG stream
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    rng: Pcg32,
}

impl ParticleSystem {
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::with_capacity(256),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Cosmetic coin flip (missile trail density and the like)
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.random_bool(probability.clamp(0.0, 1.0))
    }

    /// Age every particle and drop the expired ones
    pub fn update(&mut self) {
        self.particles.retain_mut(|p| p.update());
    }

    pub fn emit(&mut self, request: ParticleRequest) {
        match request {
            ParticleRequest::Directional {
                pos,
                dir,
                intensity,
            } => self.spray(pos, dir, intensity),
            ParticleRequest::Explosion { pos, intensity } => self.spray(pos, Vec2::ZERO, intensity),
            ParticleRequest::EnemyDestruction { pos, color } => {
                let palette = [color, Rgb::WHITE, Rgb::new(255, 255, 100), color.lighten(100)];
                for _ in 0..20 {
                    let angle = self.rng.random_range(0.0..TAU);
                    let speed = self.rng.random_range(3.0..8.0);
                    let lifetime = self.rng.random_range(15..=30);
                    let size = self.rng.random_range(2.0..5.0);
                    let color = palette[self.rng.random_range(0..palette.len())];
                    self.push(Particle {
                        pos,
                        vel: Vec2::from_angle(angle) * speed,
                        lifetime,
                        max_lifetime: 30,
                        size,
                        color,
                    });
                }
            }
            ParticleRequest::MissileTrail { pos } => {
                for _ in 0..2 {
                    let vel = Vec2::new(
                        self.rng.random_range(-0.5..0.5),
                        self.rng.random_range(-0.5..0.5),
                    );
                    let lifetime = self.rng.random_range(8..=15);
                    let size = self.rng.random_range(2.0..3.0);
                    let color = TRAIL_COLORS[self.rng.random_range(0..TRAIL_COLORS.len())];
                    self.push(Particle {
                        pos,
                        vel,
                        lifetime,
                        max_lifetime: 15,
                        size,
                        color,
                    });
                }
            }
            ParticleRequest::DoubleJumpRing { pos, radius } => {
                const RING_COUNT: usize = 16;
                for i in 0..RING_COUNT {
                    let dir = Vec2::from_angle(TAU * i as f32 / RING_COUNT as f32);
                    let speed = self.rng.random_range(3.0..5.0);
                    let lifetime = self.rng.random_range(15..=25);
                    let size = self.rng.random_range(3.0..5.0);
                    let color = RING_COLORS[self.rng.random_range(0..RING_COLORS.len())];
                    self.push(Particle {
                        pos: pos + dir * radius,
                        // Drift slightly downward
                        vel: Vec2::new(dir.x * speed, dir.y * speed * 0.5 + 1.0),
                        lifetime,
                        max_lifetime: 25,
                        size,
                        color,
                    });
                }
            }
            ParticleRequest::BodyCollision { pos, intensity } => {
                let count = burst_count(8.0, intensity);
                for _ in 0..count {
                    let angle = self.rng.random_range(0.0..TAU);
                    let speed = self.rng.random_range(2.0..4.0) * intensity;
                    let lifetime = self.rng.random_range(10..=20);
                    let size = self.rng.random_range(2.0..4.0);
                    let color = BUMP_COLORS[self.rng.random_range(0..BUMP_COLORS.len())];
                    self.push(Particle {
                        pos,
                        vel: Vec2::from_angle(angle) * speed,
                        lifetime,
                        max_lifetime: 20,
                        size,
                        color,
                    });
                }
            }
        }
    }

    fn spray(&mut self, pos: Vec2, dir: Vec2, intensity: f32) {
        const LIFETIME: u32 = 30;
        let count = burst_count(12.0, intensity);
        let omni = dir.length_squared() < 1e-6;
        let base = dir.y.atan2(dir.x);
        for _ in 0..count {
            let angle = if omni {
                self.rng.random_range(0.0..TAU)
            } else {
                base + self.rng.random_range(-0.8..0.8)
            };
            let speed = random_span(&mut self.rng, 2.0, 6.0) * intensity;
            let lifetime = self.rng.random_range(LIFETIME / 2..=LIFETIME);
            let size = self.rng.random_range(2.0..5.0);
            let color = IMPACT_COLORS[self.rng.random_range(0..IMPACT_COLORS.len())];
            self.push(Particle {
                pos,
                vel: Vec2::from_angle(angle) * speed,
                lifetime,
                max_lifetime: LIFETIME,
                size,
                color,
            });
        }
    }

    fn push(&mut self, particle: Particle) {
        if self.particles.len() < MAX_PARTICLES {
            self.particles.push(particle);
        }
    }
}

/// Particles for a burst, scaling with intensity up to double
fn burst_count(base: f32, intensity: f32) -> usize {
    if !intensity.is_finite() || intensity <= 0.0 {
        return 0;
    }
    (base * intensity.min(2.0)) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directional_count_scales_with_intensity() {
        let mut ps = ParticleSystem::new(1);
        ps.emit(ParticleRequest::Directional {
            pos: Vec2::ZERO,
            dir: Vec2::NEG_Y,
            intensity: 1.0,
        });
        assert_eq!(ps.len(), 12);

        ps.clear();
        ps.emit(ParticleRequest::Directional {
            pos: Vec2::ZERO,
            dir: Vec2::NEG_Y,
            intensity: 10.0,
        });
        assert_eq!(ps.len(), 24);
    }

    #[test]
    fn test_fixed_size_bursts() {
        let mut ps = ParticleSystem::new(2);
        ps.emit(ParticleRequest::EnemyDestruction {
            pos: Vec2::ZERO,
            color: Rgb::new(100, 150, 255),
        });
        assert_eq!(ps.len(), 20);
        ps.emit(ParticleRequest::DoubleJumpRing {
            pos: Vec2::ZERO,
            radius: 30.0,
        });
        assert_eq!(ps.len(), 36);
        ps.emit(ParticleRequest::MissileTrail { pos: Vec2::ZERO });
        assert_eq!(ps.len(), 38);
    }

    #[test]
    fn test_directional_spray_follows_direction() {
        let mut ps = ParticleSystem::new(3);
        ps.emit(ParticleRequest::Directional {
            pos: Vec2::ZERO,
            dir: Vec2::NEG_Y,
            intensity: 1.0,
        });
        // +/-0.8 rad around straight up: every particle moves upward
        assert!(ps.particles().iter().all(|p| p.vel.y < 0.0));
    }

    #[test]
    fn test_particles_expire() {
        let mut ps = ParticleSystem::new(4);
        ps.emit(ParticleRequest::Explosion {
            pos: Vec2::new(100.0, 100.0),
            intensity: 1.0,
        });
        assert!(!ps.is_empty());
        for _ in 0..30 {
            ps.update();
        }
        assert!(ps.is_empty());
    }

    #[test]
    fn test_alpha_and_size_decay() {
        let mut p = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::new(1.0, 0.0),
            lifetime: 10,
            max_lifetime: 20,
            size: 4.0,
            color: Rgb::WHITE,
        };
        assert_eq!(p.alpha(), 0.5);
        assert_eq!(p.current_size(), 2.0);
        assert!(p.update());
        assert!((p.vel.x - 0.98).abs() < 1e-6);
        assert!((p.vel.y - PARTICLE_GRAVITY).abs() < 1e-6);
    }

    #[test]
    fn test_cap_is_respected() {
        let mut ps = ParticleSystem::new(5);
        for _ in 0..200 {
            ps.emit(ParticleRequest::Explosion {
                pos: Vec2::ZERO,
                intensity: 2.0,
            });
        }
        assert_eq!(ps.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_zero_intensity_spawns_nothing() {
        let mut ps = ParticleSystem::new(6);
        ps.emit(ParticleRequest::BodyCollision {
            pos: Vec2::ZERO,
            intensity: 0.0,
        });
        assert!(ps.is_empty());
    }
}

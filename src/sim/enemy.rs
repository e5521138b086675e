//! AI-controlled enemies

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::obstacle::Obstacle;
use super::particles::Rgb;
use super::physics::{Arena, Body, mass_for, resolve_boundary, resolve_rect};
use super::projectile::EnemyBullet;
use super::{random_count, random_span};
use crate::config::{EnemyConfig, GameConfig};

/// Behavior archetype, fixed by an enemy's starting HP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// 1 HP: small, twitchy, jumps high
    Swift,
    /// 2 HP
    Brawler,
    /// 3 HP: big, slow, rarely leaves the ground
    Heavy,
}

/// Per-tier behavior constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierParams {
    /// Chance per tick of a random horizontal impulse
    pub move_chance: f64,
    /// Chance per grounded tick of a jump
    pub jump_chance: f64,
    pub speed_multiplier: f32,
    /// Fraction of the player's jump force
    pub jump_multiplier: f32,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Swift, Tier::Brawler, Tier::Heavy];

    pub fn from_hp(hp: u32) -> Self {
        match hp {
            0 | 1 => Tier::Swift,
            2 => Tier::Brawler,
            _ => Tier::Heavy,
        }
    }

    pub fn max_hp(self) -> u32 {
        match self {
            Tier::Swift => 1,
            Tier::Brawler => 2,
            Tier::Heavy => 3,
        }
    }

    pub fn params(self) -> TierParams {
        match self {
            Tier::Swift => TierParams {
                move_chance: 0.04,
                jump_chance: 0.025,
                speed_multiplier: 1.5,
                jump_multiplier: 0.85,
            },
            Tier::Brawler => TierParams {
                move_chance: 0.025,
                jump_chance: 0.015,
                speed_multiplier: 1.0,
                jump_multiplier: 0.7,
            },
            Tier::Heavy => TierParams {
                move_chance: 0.015,
                jump_chance: 0.008,
                speed_multiplier: 0.6,
                jump_multiplier: 0.5,
            },
        }
    }

    pub fn half_extents(self) -> Vec2 {
        match self {
            Tier::Swift => Vec2::new(26.5, 23.0),
            Tier::Brawler => Vec2::new(30.0, 25.0),
            Tier::Heavy => Vec2::new(33.5, 28.0),
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            Tier::Swift => Rgb::new(100, 150, 255),
            Tier::Brawler => Rgb::new(200, 100, 255),
            Tier::Heavy => Rgb::new(255, 80, 80),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
    pub vel: Vec2,
    pub half: Vec2,
    pub hp: u32,
    /// HP at spawn. Never changes.
    pub max_hp: u32,
    pub tier: Tier,
    /// +1 right, -1 left
    pub facing: f32,
    pub grounded: bool,
    pub shoot_timer: u32,
    /// Ticks between shots, re-rolled after every shot
    pub shoot_interval: u32,
}

impl Enemy {
    pub fn new(pos: Vec2, tier: Tier, shoot_interval: u32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            half: tier.half_extents(),
            hp: tier.max_hp(),
            max_hp: tier.max_hp(),
            tier,
            facing: 1.0,
            grounded: false,
            shoot_timer: 0,
            shoot_interval,
        }
    }

    /// Spawn with a random tier somewhere across the top of the arena.
    ///
    /// `max_y` bounds the spawn height; anything at or above the top margin
    /// spawns right under the ceiling.
    pub fn spawn(rng: &mut impl Rng, config: &EnemyConfig, arena: &Arena, max_y: f32) -> Self {
        let tier = Tier::from_hp(rng.random_range(1..=3));
        let half = tier.half_extents();
        let lo = arena.inner_min() + half + 10.0;
        let hi = arena.inner_max() - half - 10.0;
        let x = random_span(rng, lo.x, hi.x);
        let y = random_span(rng, lo.y, max_y.min(hi.y));
        let vx = random_span(rng, -2.0, 2.0);
        let shoot_interval = random_count(rng, config.shoot_interval_min, config.shoot_interval_max);

        let mut enemy = Self::new(Vec2::new(x, y), tier, shoot_interval);
        enemy.vel.x = vx;
        enemy
    }

    pub fn mass(&self) -> f32 {
        mass_for(self.half)
    }

    pub fn body(&self) -> Body {
        Body::new(self.pos, self.half, self.vel)
    }

    pub fn apply_body(&mut self, body: &Body) {
        self.pos = body.pos;
        self.vel = body.vel;
    }

    /// Display tint, following current HP so damaged enemies fade toward the
    /// weaker tiers. The identity color stays `tier.color()`.
    pub fn color(&self) -> Rgb {
        Tier::from_hp(self.hp).color()
    }

    pub fn is_destroyed(&self) -> bool {
        self.hp == 0
    }

    /// Returns true when this hit destroyed the enemy
    pub fn take_damage(&mut self, amount: u32) -> bool {
        self.hp = self.hp.saturating_sub(amount);
        self.is_destroyed()
    }

    pub fn update(
        &mut self,
        config: &GameConfig,
        arena: &Arena,
        obstacles: &[Obstacle],
        rng: &mut impl Rng,
    ) {
        let physics = &config.physics;
        let params = self.tier.params();
        let speed = config.enemies.base_speed * params.speed_multiplier;

        self.vel.y += physics.gravity;
        if self.grounded {
            self.vel.x *= physics.friction;
        }

        if rng.random_bool(params.move_chance) {
            self.vel.x += random_span(rng, -speed, speed);
        }
        if self.grounded && rng.random_bool(params.jump_chance) {
            self.vel.y = config.player.jump_force * params.jump_multiplier;
        }

        let cap = speed * 2.0;
        self.vel.x = self.vel.x.clamp(-cap, cap);
        self.pos += self.vel;

        let contact = resolve_boundary(self.pos, self.half, self.vel, arena, physics.wall_bounce);
        self.pos = contact.pos;
        self.vel = contact.vel;
        self.grounded = contact.grounded;

        for obstacle in obstacles.iter().filter(|o| o.is_solid()) {
            let hit = resolve_rect(self.pos, self.half, self.vel, &obstacle.rect, physics.wall_bounce);
            self.pos = hit.pos;
            self.vel = hit.vel;
            if hit.on_top {
                self.grounded = true;
            }
        }
        self.pos = arena.clamp_body(self.pos, self.half);
        self.update_facing();
    }

    /// Hysteresis: resting jitter must not flip facing
    fn update_facing(&mut self) {
        if self.vel.x > 0.5 {
            self.facing = 1.0;
        } else if self.vel.x < -0.5 {
            self.facing = -1.0;
        }
    }

    /// Advance the shoot timer. Returns the left/right bullet pair on firing.
    pub fn tick_shooting(&mut self, rng: &mut impl Rng, config: &EnemyConfig) -> Option<[EnemyBullet; 2]> {
        self.shoot_timer += 1;
        if self.shoot_timer < self.shoot_interval {
            return None;
        }
        self.shoot_timer = 0;
        self.shoot_interval = random_count(rng, config.shoot_interval_min, config.shoot_interval_max);

        let v = Vec2::new(config.bullet_speed, 0.0);
        Some([
            EnemyBullet::new(self.pos, -v, config.bullet_radius),
            EnemyBullet::new(self.pos, v, config.bullet_radius),
        ])
    }
}

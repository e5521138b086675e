//! The player-controlled body
//!
//! Movement is impulse based: input adds to velocity, it never sets it, so
//! momentum carries through jumps and wall bounces.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::obstacle::Obstacle;
use super::physics::{Arena, Body, WallSide, resolve_boundary, resolve_rect};
use crate::audio::SoundKind;
use crate::config::{Character, GameConfig, PlayerConfig};

/// What a successful jump was
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpKind {
    /// First jump, or a jump after walking off a ledge
    Single,
    /// Airborne jump paid for with energy
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactKind {
    /// Hard hit against a wall, the floor or an obstacle
    Impact,
    /// Dust kicked up while walking
    Footstep,
    /// Friction while sliding down a wall
    WallSlide,
}

/// A contact worth visual (and maybe audio) feedback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub pos: Vec2,
    /// Direction particles should fly
    pub normal: Vec2,
    pub intensity: f32,
    pub kind: ContactKind,
}

impl CollisionEvent {
    fn impact(pos: Vec2, normal: Vec2, intensity: f32) -> Self {
        Self {
            pos,
            normal,
            intensity,
            kind: ContactKind::Impact,
        }
    }

    /// Upward normal: something landed
    pub fn is_landing(&self) -> bool {
        self.normal.y <= -0.99
    }

    /// Sound for this contact. Footsteps and wall slides stay silent.
    pub fn sound(&self) -> Option<SoundKind> {
        match self.kind {
            ContactKind::Impact if self.is_landing() => Some(SoundKind::PlatformImpact),
            ContactKind::Impact => Some(SoundKind::WallImpact),
            ContactKind::Footstep | ContactKind::WallSlide => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBody {
    pub character: Character,
    pub pos: Vec2,
    pub vel: Vec2,
    pub half: Vec2,
    pub grounded: bool,
    pub jumps_remaining: u32,
    pub wall: WallSide,
    pub floating: bool,
    pub energy: f32,
    /// Smoothed copy of `energy` for the HUD. Never read by gameplay.
    pub displayed_energy: f32,
    /// Ticks since energy was last spent
    pub energy_idle_ticks: u32,
    pub lives: u32,
    pub max_lives: u32,
    pub invincible_ticks: u32,
    /// +1 right, -1 left
    pub facing: f32,
    pub speed_multiplier: f32,
    pub jump_multiplier: f32,
    pub rage: f32,
    walk_particle_timer: u32,
}

impl PlayerBody {
    pub fn new(character: Character, pos: Vec2, config: &PlayerConfig) -> Self {
        Self {
            character,
            pos,
            vel: Vec2::ZERO,
            half: character.half_extents(),
            grounded: false,
            jumps_remaining: config.max_jumps,
            wall: WallSide::None,
            floating: false,
            energy: config.max_energy,
            displayed_energy: config.max_energy,
            energy_idle_ticks: 0,
            lives: character.max_lives(),
            max_lives: character.max_lives(),
            invincible_ticks: 0,
            facing: 1.0,
            speed_multiplier: character.speed_multiplier(),
            jump_multiplier: character.jump_multiplier(),
            rage: 0.0,
            walk_particle_timer: 0,
        }
    }

    pub fn body(&self) -> Body {
        Body::new(self.pos, self.half, self.vel)
    }

    pub fn apply_body(&mut self, body: &Body) {
        self.pos = body.pos;
        self.vel = body.vel;
    }

    /// Horizontal input in [-1, 1]. Adds an impulse, weaker while airborne.
    pub fn move_dir(&mut self, dir: f32, config: &PlayerConfig) {
        if !dir.is_finite() || dir == 0.0 {
            return;
        }
        let dir = dir.clamp(-1.0, 1.0);
        let authority = if self.grounded { 1.0 } else { config.air_control };
        self.vel.x += dir * config.base_speed * self.speed_multiplier * config.move_impulse * authority;
        self.facing = dir.signum();
    }

    /// Spend one jump charge. A second, airborne charge costs energy; without
    /// enough of it nothing happens and `None` is returned.
    pub fn jump(&mut self, config: &PlayerConfig) -> Option<JumpKind> {
        if self.jumps_remaining == 0 {
            return None;
        }
        let double = !self.grounded && self.jumps_remaining < config.max_jumps;
        if double && !self.try_spend_energy(config.double_jump_energy_cost) {
            return None;
        }

        self.vel.y = config.jump_force * self.jump_multiplier;
        self.jumps_remaining -= 1;
        self.grounded = false;
        Some(if double { JumpKind::Double } else { JumpKind::Single })
    }

    pub fn start_floating(&mut self) {
        if !self.grounded && self.energy > 0.0 {
            self.floating = true;
            self.energy_idle_ticks = 0;
        }
    }

    pub fn stop_floating(&mut self) {
        self.floating = false;
    }

    /// Spend energy if there is enough. Insufficient energy is a no-op.
    pub fn try_spend_energy(&mut self, amount: f32) -> bool {
        if self.energy < amount {
            return false;
        }
        self.energy = (self.energy - amount).max(0.0);
        self.energy_idle_ticks = 0;
        true
    }

    /// Spend up to `amount`, stopping at zero. Returns what is left.
    pub fn drain_energy(&mut self, amount: f32) -> f32 {
        self.energy = (self.energy - amount).max(0.0);
        self.energy_idle_ticks = 0;
        self.energy
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_ticks > 0
    }

    /// Lose a life unless invincible. Returns true when a life was lost.
    pub fn take_hit(&mut self, config: &PlayerConfig) -> bool {
        if self.is_invincible() {
            return false;
        }
        self.lives = self.lives.saturating_sub(1);
        self.invincible_ticks = config.invincibility_ticks;
        true
    }

    /// Regain a life if below the character cap
    pub fn restore_life(&mut self) -> bool {
        if self.lives >= self.max_lives {
            return false;
        }
        self.lives += 1;
        true
    }

    pub fn add_rage(&mut self, amount: f32, config: &PlayerConfig) {
        self.rage = (self.rage + amount).clamp(0.0, config.max_rage);
    }

    pub fn try_spend_rage(&mut self, amount: f32) -> bool {
        if self.rage < amount {
            return false;
        }
        self.rage -= amount;
        true
    }

    /// A full rage meter raises the speed cap and shrugs off side hits
    pub fn is_rage_boosted(&self, config: &PlayerConfig) -> bool {
        self.rage >= config.max_rage
    }

    /// Reset for a new level: same lives and rage, fresh position
    pub fn respawn(&mut self, pos: Vec2, config: &PlayerConfig) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.grounded = false;
        self.floating = false;
        self.wall = WallSide::None;
        self.jumps_remaining = config.max_jumps;
        self.walk_particle_timer = 0;
    }

    /// Advance one tick. Returns contacts for the orchestrator to turn into
    /// particles and sounds. Obstacles are mutable so fragile platforms can
    /// count the steps they receive.
    pub fn update(
        &mut self,
        config: &GameConfig,
        arena: &Arena,
        obstacles: &mut [Obstacle],
    ) -> Vec<CollisionEvent> {
        let pc = &config.player;
        let physics = &config.physics;
        let mut events = Vec::new();
        let old_vel = self.vel;
        self.wall = WallSide::None;

        // 1. invincibility
        self.invincible_ticks = self.invincible_ticks.saturating_sub(1);

        // 2. regen after a second of not spending
        self.energy_idle_ticks = self.energy_idle_ticks.saturating_add(1);
        if self.energy_idle_ticks >= pc.energy_regen_delay && self.energy < pc.max_energy {
            self.energy = (self.energy + pc.energy_regen_rate).min(pc.max_energy);
        }

        // 3. HUD smoothing
        let diff = self.energy - self.displayed_energy;
        self.displayed_energy += diff.clamp(-pc.displayed_energy_rate, pc.displayed_energy_rate);

        // 4. gravity
        if self.floating && !self.grounded && self.energy > 0.0 {
            self.drain_energy(pc.float_energy_cost);
            self.vel.y += physics.gravity * pc.float_gravity_multiplier;
            if self.energy <= 0.0 {
                self.floating = false;
            }
        } else {
            self.floating = false;
            self.vel.y += physics.gravity;
        }

        // 5. friction
        if self.grounded {
            self.vel.x *= physics.friction;
        }

        // 6. speed cap
        let cap = if self.is_rage_boosted(pc) {
            pc.max_speed_rage
        } else {
            pc.max_speed
        };
        self.vel.x = self.vel.x.clamp(-cap, cap);

        // 7. integrate
        self.pos += self.vel;

        // 8. walls, then obstacles
        let contact = resolve_boundary(self.pos, self.half, self.vel, arena, physics.wall_bounce);
        self.pos = contact.pos;
        self.vel = contact.vel;
        self.grounded = contact.grounded;
        self.wall = contact.wall;

        let speed = old_vel.length();
        if speed > pc.impact_speed_threshold {
            if contact.wall != WallSide::None && old_vel.x.abs() > pc.impact_speed_threshold {
                let normal = Vec2::new(-contact.wall.sign(), 0.0);
                events.push(CollisionEvent::impact(self.pos, normal, speed / 5.0));
            }
            if contact.grounded && old_vel.y > pc.landing_speed_threshold {
                events.push(CollisionEvent::impact(self.pos, Vec2::NEG_Y, speed / 5.0));
            }
        }

        for obstacle in obstacles.iter_mut() {
            if !obstacle.is_solid() {
                continue;
            }
            let before = self.pos;
            let hit = resolve_rect(self.pos, self.half, self.vel, &obstacle.rect, physics.wall_bounce);
            if !hit.hit {
                continue;
            }
            self.pos = hit.pos;
            self.vel = hit.vel;

            if hit.on_top {
                self.grounded = true;
                if old_vel.y > pc.landing_speed_threshold {
                    events.push(CollisionEvent::impact(before, Vec2::NEG_Y, speed / 5.0));
                }
                obstacle.on_player_step();
                // Ride along with moving platforms
                self.pos += obstacle.displacement();
            } else if hit.normal.x.abs() > 0.5 && old_vel.x.abs() > pc.impact_speed_threshold {
                events.push(CollisionEvent::impact(before, hit.normal, speed / 5.0));
            }
        }
        self.pos = arena.clamp_body(self.pos, self.half);

        // 9. landing bookkeeping
        if self.grounded {
            self.jumps_remaining = pc.max_jumps;
            self.floating = false;

            if self.vel.x.abs() > 0.5 {
                self.walk_particle_timer += 1;
                if self.walk_particle_timer >= pc.walk_particle_interval {
                    self.walk_particle_timer = 0;
                    events.push(CollisionEvent {
                        pos: Vec2::new(self.pos.x - self.vel.x * 2.0, self.pos.y + self.half.y * 0.8),
                        normal: Vec2::NEG_Y,
                        intensity: 0.3,
                        kind: ContactKind::Footstep,
                    });
                }
            }
        }

        // 10. wall slide dust
        if self.wall != WallSide::None && self.vel.y.abs() > 1.0 {
            self.walk_particle_timer += 1;
            if self.walk_particle_timer >= pc.wall_slide_particle_interval {
                self.walk_particle_timer = 0;
                let side = self.wall.sign();
                events.push(CollisionEvent {
                    pos: Vec2::new(self.pos.x + self.half.x * side, self.pos.y),
                    normal: Vec2::new(-side, 0.0),
                    intensity: 0.4,
                    kind: ContactKind::WallSlide,
                });
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arena() -> Arena {
        Arena {
            width: 1200.0,
            height: 800.0,
            wall: 20.0,
        }
    }

    fn player() -> PlayerBody {
        PlayerBody::new(Character::Medium, Vec2::new(600.0, 400.0), &PlayerConfig::default())
    }

    fn floor_y(p: &PlayerBody) -> f32 {
        780.0 - p.half.y
    }

    #[test]
    fn test_double_jump_scenario() {
        let config = PlayerConfig::default();
        let mut p = player();
        p.grounded = false;
        p.jumps_remaining = 1;
        p.energy = 50.0;

        assert_eq!(p.jump(&config), Some(JumpKind::Double));
        assert_eq!(p.energy, 20.0);
        assert_eq!(p.jumps_remaining, 0);
        assert_eq!(p.vel.y, config.jump_force * p.jump_multiplier);
    }

    #[test]
    fn test_double_jump_without_energy_is_noop() {
        let config = PlayerConfig::default();
        let mut p = player();
        p.grounded = false;
        p.jumps_remaining = 1;
        p.energy = 29.0;
        p.vel.y = 3.0;

        assert_eq!(p.jump(&config), None);
        assert_eq!(p.energy, 29.0);
        assert_eq!(p.jumps_remaining, 1);
        assert_eq!(p.vel.y, 3.0);
    }

    #[test]
    fn test_ground_jump_is_free() {
        let config = PlayerConfig::default();
        let mut p = PlayerBody::new(Character::Flash, Vec2::new(600.0, 400.0), &config);
        p.grounded = true;
        assert_eq!(p.jump(&config), Some(JumpKind::Single));
        assert_eq!(p.energy, config.max_energy);
        assert_eq!(p.jumps_remaining, 1);
        assert!((p.vel.y - (-12.0 * 1.2)).abs() < 1e-5);
        assert!(!p.grounded);

        p.jumps_remaining = 0;
        assert_eq!(p.jump(&config), None);
    }

    #[test]
    fn test_air_control_is_weaker() {
        let config = PlayerConfig::default();
        let mut p = player();
        p.grounded = true;
        p.move_dir(1.0, &config);
        let ground = p.vel.x;
        p.vel.x = 0.0;
        p.grounded = false;
        p.move_dir(-1.0, &config);
        assert!((ground - 1.5).abs() < 1e-5);
        assert!((p.vel.x + 0.9).abs() < 1e-5);
        assert_eq!(p.facing, -1.0);
    }

    #[test]
    fn test_landing_resets_jumps_and_float() {
        let config = GameConfig::default();
        let mut p = player();
        p.pos.y = floor_y(&p) - 2.0;
        p.vel.y = 6.0;
        p.jumps_remaining = 0;
        p.floating = true;

        let events = p.update(&config, &arena(), &mut []);
        assert!(p.grounded);
        assert_eq!(p.jumps_remaining, 2);
        assert!(!p.floating);
        assert_eq!(p.vel.y, 0.0);
        let landing = events.iter().find(|e| e.is_landing()).unwrap();
        assert_eq!(landing.sound(), Some(SoundKind::PlatformImpact));
    }

    #[test]
    fn test_lands_on_platform_and_steps_it() {
        let config = GameConfig::default();
        let mut p = player();
        let mut obstacles = [Obstacle::fragile(500.0, 500.0, 200.0, 20.0, 2, 100)];
        p.pos.y = 500.0 - p.half.y - 1.0;
        p.vel.y = 4.0;

        p.update(&config, &arena(), &mut obstacles);
        assert!(p.grounded);
        assert!(obstacles[0].is_solid());

        obstacles[0].update();
        p.update(&config, &arena(), &mut obstacles);
        assert!(p.grounded);
        assert!(!obstacles[0].is_solid());
    }

    #[test]
    fn test_rides_moving_platform() {
        let config = GameConfig::default();
        let mut p = player();
        let mut obstacles = [Obstacle::moving(500.0, 500.0, 200.0, 20.0, 300.0, 2.0, &arena())];
        p.pos = Vec2::new(600.0, 500.0 - p.half.y);
        p.grounded = true;

        obstacles[0].update();
        let x_before = p.pos.x;
        p.update(&config, &arena(), &mut obstacles);
        assert!(p.grounded);
        assert!((p.pos.x - x_before - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_wall_impact_event() {
        let config = GameConfig::default();
        let mut p = player();
        p.pos.x = 20.0 + p.half.x + 2.0;
        p.vel.x = -8.0;

        let events = p.update(&config, &arena(), &mut []);
        assert_eq!(p.wall, WallSide::Left);
        let hit = events.iter().find(|e| e.kind == ContactKind::Impact).unwrap();
        assert_eq!(hit.normal, Vec2::X);
        assert_eq!(hit.sound(), Some(SoundKind::WallImpact));
    }

    #[test]
    fn test_floating_slows_fall_and_drains() {
        let config = GameConfig::default();
        let mut p = player();
        p.floating = true;
        p.update(&config, &arena(), &mut []);
        assert!((p.vel.y - 0.15).abs() < 1e-5);
        assert_eq!(p.energy, 99.5);
        assert_eq!(p.energy_idle_ticks, 0);

        p.energy = 0.4;
        p.update(&config, &arena(), &mut []);
        assert_eq!(p.energy, 0.0);
        assert!(!p.floating);

        p.start_floating();
        assert!(!p.floating);
    }

    #[test]
    fn test_regen_waits_for_idle_second() {
        let config = GameConfig::default();
        let mut p = player();
        p.pos.y = floor_y(&p);
        p.grounded = true;
        assert!(p.try_spend_energy(50.0));

        for _ in 0..59 {
            p.update(&config, &arena(), &mut []);
        }
        assert_eq!(p.energy, 50.0);
        p.update(&config, &arena(), &mut []);
        assert!((p.energy - 50.6).abs() < 1e-4);
    }

    #[test]
    fn test_rage_boost_raises_speed_cap() {
        let config = GameConfig::default();
        let mut p = player();
        p.vel.x = 30.0;
        p.update(&config, &arena(), &mut []);
        assert!((p.vel.x - 12.0).abs() < 1e-5);

        p.add_rage(1000.0, &config.player);
        assert_eq!(p.rage, 100.0);
        assert!(p.is_rage_boosted(&config.player));
        p.pos.x = 600.0;
        p.vel.x = 30.0;
        p.update(&config, &arena(), &mut []);
        assert!((p.vel.x - 17.0).abs() < 1e-5);
    }

    #[test]
    fn test_hits_respect_invincibility() {
        let config = PlayerConfig::default();
        let mut p = player();
        assert!(p.take_hit(&config));
        assert_eq!(p.lives, 4);
        assert!(!p.take_hit(&config));
        assert_eq!(p.lives, 4);
        assert!(p.restore_life());
        assert!(!p.restore_life());
        assert_eq!(p.lives, 5);
    }

    #[test]
    fn test_displayed_energy_lags() {
        let config = GameConfig::default();
        let mut p = player();
        p.energy = 90.0;
        p.update(&config, &arena(), &mut []);
        assert_eq!(p.displayed_energy, 98.0);
    }

    proptest! {
        #[test]
        fn prop_update_keeps_invariants(
            moves in prop::collection::vec((-1.0f32..1.0, any::<bool>(), any::<bool>()), 1..300),
        ) {
            let config = GameConfig::default();
            let mut p = player();
            let mut obstacles = vec![
                Obstacle::platform(300.0, 500.0, 200.0, 20.0),
                Obstacle::moving(600.0, 350.0, 120.0, 20.0, 200.0, 2.5, &arena()),
                Obstacle::block(900.0, 600.0, 60.0),
            ];
            for (dir, jump, float) in moves {
                for o in obstacles.iter_mut() {
                    o.update();
                }
                p.move_dir(dir, &config.player);
                if jump {
                    p.jump(&config.player);
                }
                if float { p.start_floating() } else { p.stop_floating() }
                let jumps_before = p.jumps_remaining;
                p.update(&config, &arena(), &mut obstacles);

                prop_assert!(p.energy >= 0.0 && p.energy <= config.player.max_energy);
                prop_assert!(p.jumps_remaining <= config.player.max_jumps);
                prop_assert!(arena().contains_body(p.pos, p.half));
                if p.grounded {
                    prop_assert_eq!(p.jumps_remaining, config.player.max_jumps);
                } else {
                    // Only landing restores charges
                    prop_assert_eq!(p.jumps_remaining, jumps_before);
                }
            }
        }
    }
}

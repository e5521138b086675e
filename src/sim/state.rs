//! Game state and core simulation types
//!
//! `GameState` is the only owner of entities, timers and the gameplay RNG.
//! Nothing outside `tick` mutates it while a run is in progress.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, Tier};
use super::level::{generate_level, spawn_point};
use super::obstacle::Obstacle;
use super::particles::{ParticleRequest, ParticleSystem};
use super::physics::Arena;
use super::pickup::{Door, HeartPickup};
use super::player::PlayerBody;
use super::projectile::{EnemyBullet, Missile};
use crate::audio::{AudioRequest, SoundKind};
use crate::config::{Character, GameConfig};
use crate::consts::TICKS_PER_SECOND;

/// Ticks the defeat animation runs before a menu may take over
pub const DEFEAT_HOLD_TICKS: u32 = 2 * TICKS_PER_SECOND;

/// Mixed into the game seed for the cosmetic particle stream
const PARTICLE_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Out of lives. Only particles keep moving.
    Defeated,
}

/// Gameplay facts for collaborators (HUD, stats, tests). Cleared every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemyDamaged { tier: Tier, hp_left: u32 },
    EnemyKilled { tier: Tier, pos: Vec2 },
    PlayerHit { lives_left: u32 },
    LifeRestored { lives: u32 },
    ChargedShotFired,
    DoorUnlocked,
    LevelCompleted { level: u32 },
    PlayerDefeated { level: u32 },
}

/// Fire button state machine: tap/hold auto-fire, long hold charges
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FireControl {
    /// Ticks the fire input has been held
    pub hold_ticks: u32,
    /// Ticks until the next auto-fire shot
    pub cooldown: u32,
    pub charging: bool,
    pub charge_ticks: u32,
    /// Player was grounded when the charge began (energy drains while charging)
    pub charge_grounded: bool,
}

impl FireControl {
    pub fn cancel_charge(&mut self) {
        self.charging = false;
        self.charge_ticks = 0;
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub arena: Arena,
    /// RNG seed for this run
    pub seed: u64,
    /// Gameplay RNG (enemy rolls, layout, pickups)
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Ticks simulated while playing
    pub time_ticks: u64,
    /// Current level (1-indexed)
    pub level: u32,

    pub player: PlayerBody,
    pub obstacles: Vec<Obstacle>,
    pub enemies: Vec<Enemy>,
    pub missiles: Vec<Missile>,
    pub bullets: Vec<EnemyBullet>,
    pub hearts: Vec<HeartPickup>,
    pub door: Door,
    pub particles: ParticleSystem,

    pub fire: FireControl,
    /// Kills this level (drives the door)
    pub kills: u32,
    /// Kills this run
    pub total_kills: u32,
    pub spawn_timer: u32,
    pub heart_timer: u32,
    /// Ticks since defeat
    pub defeat_ticks: u32,

    /// Sounds requested during the last tick
    pub audio_requests: Vec<AudioRequest>,
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(config: GameConfig, character: Character, seed: u64) -> Self {
        let arena = Arena::from_config(&config.arena);
        let mut rng = Pcg32::seed_from_u64(seed);
        let level = generate_level(&config, &arena, &mut rng, 1);
        let spawn = spawn_point(&arena, character.half_extents());
        let player = PlayerBody::new(character, spawn, &config.player);

        log::info!(
            "New run: seed={}, character={}, lives={}",
            seed,
            character.as_str(),
            player.lives
        );

        Self {
            arena,
            seed,
            rng,
            phase: GamePhase::Playing,
            time_ticks: 0,
            level: 1,
            player,
            obstacles: level.obstacles,
            enemies: level.enemies,
            missiles: Vec::new(),
            bullets: Vec::new(),
            hearts: Vec::new(),
            door: level.door,
            particles: ParticleSystem::new(seed ^ PARTICLE_SEED_SALT),
            fire: FireControl::default(),
            kills: 0,
            total_kills: 0,
            spawn_timer: 0,
            heart_timer: 0,
            defeat_ticks: 0,
            audio_requests: Vec::new(),
            events: Vec::new(),
            config,
        }
    }

    /// Empty arena: no obstacles, enemies or door. Handy for focused tests
    /// and scripted scenarios.
    pub fn empty(config: GameConfig, character: Character, seed: u64) -> Self {
        let mut state = Self::new(config, character, seed);
        state.obstacles.clear();
        state.enemies.clear();
        state
    }

    pub fn character(&self) -> Character {
        self.player.character
    }

    pub fn play_sound(&mut self, kind: SoundKind, intensity: f32) {
        self.audio_requests.push(AudioRequest::new(kind, intensity));
    }

    pub fn emit(&mut self, request: ParticleRequest) {
        self.particles.emit(request);
    }

    /// Take this tick's sound requests
    pub fn drain_audio(&mut self) -> Vec<AudioRequest> {
        std::mem::take(&mut self.audio_requests)
    }

    /// Take this tick's gameplay events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_defeated(&self) -> bool {
        self.phase == GamePhase::Defeated
    }

    /// Defeat animation finished; a front end may return to its menu
    pub fn ready_for_menu(&self) -> bool {
        self.is_defeated() && self.defeat_ticks >= DEFEAT_HOLD_TICKS
    }

    /// Charge progress in [0, 1] for the HUD
    pub fn charge_fraction(&self) -> f32 {
        if !self.fire.charging {
            return 0.0;
        }
        let time = self.config.weapons.charge_time.max(1);
        (self.fire.charge_ticks as f32 / time as f32).min(1.0)
    }

    /// Kills still needed before the door opens
    pub fn kills_remaining(&self) -> u32 {
        self.config.enemies.kills_to_unlock_door.saturating_sub(self.kills)
    }

    /// Regenerate the layout for `self.level` and clear every transient
    /// entity. Lives and rage carry over.
    pub(crate) fn load_level(&mut self) {
        let level = generate_level(&self.config, &self.arena, &mut self.rng, self.level);
        self.obstacles = level.obstacles;
        self.enemies = level.enemies;
        self.door = level.door;

        self.missiles.clear();
        self.bullets.clear();
        self.hearts.clear();
        self.particles.clear();

        self.kills = 0;
        self.spawn_timer = 0;
        self.heart_timer = 0;
        self.fire = FireControl::default();

        let spawn = spawn_point(&self.arena, self.player.half);
        self.player.respawn(spawn, &self.config.player);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_per_character() {
        for character in Character::ALL {
            let state = GameState::new(GameConfig::default(), character, 1);
            assert_eq!(state.phase, GamePhase::Playing);
            assert_eq!(state.level, 1);
            assert_eq!(state.player.lives, character.max_lives());
            assert_eq!(state.player.half, character.half_extents());
            assert_eq!(state.enemies.len(), 3);
            assert!(state.arena.contains_body(state.player.pos, state.player.half));
        }
    }

    #[test]
    fn test_drains_empty_the_queues() {
        let mut state = GameState::new(GameConfig::default(), Character::Medium, 2);
        state.play_sound(SoundKind::Jump, 2.0);
        state.events.push(GameEvent::DoorUnlocked);
        let audio = state.drain_audio();
        assert_eq!(audio.len(), 1);
        assert_eq!(audio[0].intensity, 1.0);
        assert_eq!(state.drain_events(), vec![GameEvent::DoorUnlocked]);
        assert!(state.audio_requests.is_empty() && state.events.is_empty());
    }

    #[test]
    fn test_load_level_keeps_lives_and_rage() {
        let mut state = GameState::new(GameConfig::default(), Character::Tank, 3);
        state.player.lives = 2;
        state.player.rage = 40.0;
        state.kills = 10;
        state.level = 2;
        state.missiles.push(Missile::new(Vec2::new(500.0, 500.0), Vec2::splat(10.0), Vec2::X, 5.0, false));
        state.hearts.push(HeartPickup::new(Vec2::new(500.0, 100.0), 15.0, 2.0));
        state.load_level();

        assert_eq!(state.player.lives, 2);
        assert_eq!(state.player.rage, 40.0);
        assert_eq!(state.kills, 0);
        assert!(state.missiles.is_empty() && state.hearts.is_empty());
        assert!(!state.door.active);
        assert_eq!(state.player.vel, Vec2::ZERO);
    }

    #[test]
    fn test_charge_fraction() {
        let mut state = GameState::new(GameConfig::default(), Character::Medium, 4);
        assert_eq!(state.charge_fraction(), 0.0);
        state.fire.charging = true;
        state.fire.charge_ticks = 15;
        assert_eq!(state.charge_fraction(), 0.5);
        state.fire.charge_ticks = 90;
        assert_eq!(state.charge_fraction(), 1.0);
    }
}

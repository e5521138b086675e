//! Game configuration and character selection
//!
//! Every tunable lives in one immutable value passed into the simulation at
//! construction. The defaults are the compiled-in balance; the native runner
//! can override them from a JSON file.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::TICKS_PER_SECOND;

/// Selectable player characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Character {
    /// Fast, high jumper, fragile
    Flash,
    #[default]
    Medium,
    /// Slow, low jumper, many lives
    Tank,
}

impl Character {
    pub const ALL: [Character; 3] = [Character::Flash, Character::Medium, Character::Tank];

    pub fn as_str(&self) -> &'static str {
        match self {
            Character::Flash => "Flash",
            Character::Medium => "Medium",
            Character::Tank => "Tank",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "flash" => Some(Character::Flash),
            "medium" | "med" => Some(Character::Medium),
            "tank" => Some(Character::Tank),
            _ => None,
        }
    }

    /// Lives at the start of a run (and the pickup cap)
    pub fn max_lives(&self) -> u32 {
        match self {
            Character::Flash => 4,
            Character::Medium => 5,
            Character::Tank => 6,
        }
    }

    /// Horizontal impulse multiplier
    pub fn speed_multiplier(&self) -> f32 {
        match self {
            Character::Flash => 1.5,
            Character::Medium => 1.0,
            Character::Tank => 0.7,
        }
    }

    /// Jump force multiplier
    pub fn jump_multiplier(&self) -> f32 {
        match self {
            Character::Flash => 1.2,
            Character::Medium => 1.0,
            Character::Tank => 0.8,
        }
    }

    /// Hitbox half extents (ellipse radii)
    pub fn half_extents(&self) -> Vec2 {
        match self {
            Character::Flash => Vec2::new(27.5, 32.5),
            Character::Medium => Vec2::new(35.5, 32.5),
            Character::Tank => Vec2::new(47.0, 30.5),
        }
    }
}

/// Arena rectangle, walls included
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    pub wall_thickness: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            wall_thickness: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration per tick
    pub gravity: f32,
    /// Horizontal velocity multiplier per grounded tick
    pub friction: f32,
    /// Velocity kept after hitting a wall, ceiling or obstacle side
    pub wall_bounce: f32,
    /// Restitution between two bodies
    pub body_restitution: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            friction: 0.92,
            wall_bounce: 0.5,
            body_restitution: 0.9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub base_speed: f32,
    /// Fraction of the speed added per tick of movement input
    pub move_impulse: f32,
    /// Fraction of ground authority kept while airborne
    pub air_control: f32,
    /// Upward velocity of a jump (negative is up)
    pub jump_force: f32,
    pub max_jumps: u32,
    pub max_energy: f32,
    pub energy_regen_rate: f32,
    /// Ticks without energy use before regeneration starts
    pub energy_regen_delay: u32,
    /// Max change per tick of the smoothed HUD energy
    pub displayed_energy_rate: f32,
    pub float_energy_cost: f32,
    pub float_gravity_multiplier: f32,
    pub double_jump_energy_cost: f32,
    pub max_speed: f32,
    pub max_speed_rage: f32,
    pub invincibility_ticks: u32,
    pub max_rage: f32,
    pub rage_gain_per_hit: f32,
    pub rage_super_cost: f32,
    /// Minimum pre-impact speed for an impact event
    pub impact_speed_threshold: f32,
    /// Minimum downward speed for a landing event
    pub landing_speed_threshold: f32,
    pub walk_particle_interval: u32,
    pub wall_slide_particle_interval: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            base_speed: 5.0,
            move_impulse: 0.3,
            air_control: 0.6,
            jump_force: -12.0,
            max_jumps: 2,
            max_energy: 100.0,
            energy_regen_rate: 0.6,
            energy_regen_delay: TICKS_PER_SECOND,
            displayed_energy_rate: 2.0,
            float_energy_cost: 0.5,
            float_gravity_multiplier: 0.3,
            double_jump_energy_cost: 30.0,
            max_speed: 12.0,
            max_speed_rage: 17.0,
            invincibility_ticks: 90,
            max_rage: 100.0,
            rage_gain_per_hit: 10.0,
            rage_super_cost: 50.0,
            impact_speed_threshold: 3.0,
            landing_speed_threshold: 2.0,
            walk_particle_interval: 8,
            wall_slide_particle_interval: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub missile_size: Vec2,
    pub missile_speed: f32,
    pub missile_energy_cost: f32,
    /// Ticks between auto-fired missiles while fire is held
    pub fire_cooldown: u32,
    /// Ticks fire must be held before a charge starts
    pub charge_hold_ticks: u32,
    /// Ticks a charge must last before release fires
    pub charge_time: u32,
    /// Energy a full charge costs
    pub charge_energy_cost: f32,
    pub charged_missile_size: Vec2,
    pub charged_missile_speed: f32,
    pub explosion_radius: f32,
    /// Chance per tick that a missile leaves a trail puff
    pub trail_chance: f64,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            missile_size: Vec2::new(15.0, 8.0),
            missile_speed: 18.0,
            missile_energy_cost: 10.0,
            fire_cooldown: 15,
            charge_hold_ticks: 30,
            charge_time: 30,
            charge_energy_cost: 20.0,
            charged_missile_size: Vec2::new(60.0, 35.0),
            charged_missile_speed: 15.0,
            explosion_radius: 120.0,
            trail_chance: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub base_speed: f32,
    pub spawn_interval: u32,
    pub max_count: usize,
    pub initial_count: usize,
    /// Kills needed in a level before the door opens
    pub kills_to_unlock_door: u32,
    pub shoot_interval_min: u32,
    pub shoot_interval_max: u32,
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    /// Player must fall faster than this for a contact to count as a stomp
    pub stomp_fall_speed: f32,
    /// Player vertical velocity after a stomp
    pub stomp_bounce: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            base_speed: 3.0,
            spawn_interval: 3 * TICKS_PER_SECOND,
            max_count: 6,
            initial_count: 3,
            kills_to_unlock_door: 10,
            shoot_interval_min: 120,
            shoot_interval_max: 240,
            bullet_speed: 4.0,
            bullet_radius: 6.0,
            stomp_fall_speed: 2.0,
            stomp_bounce: -8.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupConfig {
    pub heart_spawn_interval: u32,
    pub heart_fall_speed: f32,
    pub heart_size: f32,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            heart_spawn_interval: 5 * TICKS_PER_SECOND,
            heart_fall_speed: 2.0,
            heart_size: 15.0,
        }
    }
}

/// Inclusive integer range used by level generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Half-open float range used by level generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpanRange {
    pub min: f32,
    pub max: f32,
}

impl SpanRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

/// Procedural level assembly parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub platform_thickness: f32,
    /// Width of the always-present platform under the player spawn
    pub spawn_platform_width: f32,
    /// Distance from the arena floor to the spawn platform top
    pub spawn_platform_height: f32,
    pub static_platforms: CountRange,
    pub static_y: SpanRange,
    pub static_width: SpanRange,
    pub moving_platforms: CountRange,
    pub moving_y: SpanRange,
    pub moving_width: SpanRange,
    pub moving_travel: SpanRange,
    pub moving_speed: SpanRange,
    pub fragile_platforms: CountRange,
    pub fragile_y: SpanRange,
    pub fragile_width: SpanRange,
    pub fragile_break_delay: u32,
    pub fragile_respawn_time: u32,
    pub blocks: CountRange,
    pub block_y: SpanRange,
    pub block_size: SpanRange,
    /// Horizontal clearance kept from the walls when placing obstacles
    pub side_margin: f32,
    pub door_size: Vec2,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            platform_thickness: 20.0,
            spawn_platform_width: 300.0,
            spawn_platform_height: 350.0,
            static_platforms: CountRange::new(3, 6),
            static_y: SpanRange::new(150.0, 400.0),
            static_width: SpanRange::new(80.0, 180.0),
            moving_platforms: CountRange::new(2, 4),
            moving_y: SpanRange::new(100.0, 350.0),
            moving_width: SpanRange::new(100.0, 160.0),
            moving_travel: SpanRange::new(150.0, 300.0),
            moving_speed: SpanRange::new(1.5, 3.0),
            fragile_platforms: CountRange::new(1, 2),
            fragile_y: SpanRange::new(200.0, 420.0),
            fragile_width: SpanRange::new(80.0, 140.0),
            fragile_break_delay: 20,
            fragile_respawn_time: 3 * TICKS_PER_SECOND,
            blocks: CountRange::new(1, 3),
            block_y: SpanRange::new(100.0, 300.0),
            block_size: SpanRange::new(40.0, 70.0),
            side_margin: 50.0,
            door_size: Vec2::new(60.0, 80.0),
        }
    }
}

/// Complete, immutable game configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub arena: ArenaConfig,
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub weapons: WeaponConfig,
    pub enemies: EnemyConfig,
    pub pickups: PickupConfig,
    pub level: LevelConfig,
}

impl GameConfig {
    /// Parse a (possibly partial) JSON override. Missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from a JSON file, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Invalid config {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read config {}: {} - using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_from_str() {
        assert_eq!(Character::from_str("FLASH"), Some(Character::Flash));
        assert_eq!(Character::from_str("med"), Some(Character::Medium));
        assert_eq!(Character::from_str("tank"), Some(Character::Tank));
        assert_eq!(Character::from_str("wizard"), None);
        for c in Character::ALL {
            assert_eq!(Character::from_str(c.as_str()), Some(c));
        }
    }

    #[test]
    fn test_character_tradeoffs() {
        // More lives always costs speed
        assert!(Character::Flash.max_lives() < Character::Tank.max_lives());
        assert!(Character::Flash.speed_multiplier() > Character::Tank.speed_multiplier());
        assert!(Character::Flash.jump_multiplier() > Character::Tank.jump_multiplier());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "physics": { "gravity": 0.8 } }"#).unwrap();
        assert_eq!(config.physics.gravity, 0.8);
        assert_eq!(config.physics.friction, PhysicsConfig::default().friction);
        assert_eq!(config.arena.width, 1200.0);
        assert_eq!(config.enemies.kills_to_unlock_door, 10);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(GameConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = GameConfig::load_or_default("/definitely/not/here.json");
        assert_eq!(config.player.max_jumps, 2);
    }

    #[test]
    fn test_json_round_trip_preserves_values() {
        let mut config = GameConfig::default();
        config.weapons.explosion_radius = 42.0;
        let json = config.to_json().unwrap();
        let back = GameConfig::from_json(&json).unwrap();
        assert_eq!(back.weapons.explosion_radius, 42.0);
        assert_eq!(back.level.door_size, config.level.door_size);
    }
}

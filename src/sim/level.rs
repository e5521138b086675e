//! Procedural level assembly

use glam::Vec2;
use rand::Rng;

use super::enemy::Enemy;
use super::obstacle::Obstacle;
use super::physics::Arena;
use super::pickup::Door;
use super::{random_count, random_span};
use crate::config::{CountRange, GameConfig, SpanRange};

/// Everything that is rebuilt when a level starts
#[derive(Debug, Clone)]
pub struct Level {
    pub obstacles: Vec<Obstacle>,
    pub enemies: Vec<Enemy>,
    pub door: Door,
}

fn count(rng: &mut impl Rng, range: CountRange) -> u32 {
    random_count(rng, range.min, range.max)
}

fn span(rng: &mut impl Rng, range: SpanRange) -> f32 {
    random_span(rng, range.min, range.max)
}

/// Left edge for an obstacle of `width`, clear of both walls
fn place_x(rng: &mut impl Rng, arena: &Arena, margin: f32, width: f32) -> f32 {
    let lo = arena.inner_min().x + margin;
    let hi = arena.inner_max().x - margin - width;
    random_span(rng, lo, hi)
}

/// Player spawn point: horizontally centred, just under the ceiling
pub fn spawn_point(arena: &Arena, half: Vec2) -> Vec2 {
    Vec2::new(arena.width * 0.5, arena.inner_min().y + half.y + 5.0)
}

/// Build a fresh layout. Obstacle heights in the config are measured from
/// the top of the arena; the spawn platform is measured up from the floor.
pub fn generate_level(config: &GameConfig, arena: &Arena, rng: &mut impl Rng, number: u32) -> Level {
    let lc = &config.level;
    let margin = lc.side_margin;
    let thickness = lc.platform_thickness;
    let mut obstacles = Vec::new();

    // Always a safe landing under the spawn point
    obstacles.push(Obstacle::platform(
        arena.width * 0.5 - lc.spawn_platform_width * 0.5,
        arena.inner_max().y - lc.spawn_platform_height,
        lc.spawn_platform_width,
        thickness,
    ));

    for _ in 0..count(rng, lc.static_platforms) {
        let width = span(rng, lc.static_width);
        let x = place_x(rng, arena, margin, width);
        let y = span(rng, lc.static_y);
        obstacles.push(Obstacle::platform(x, y, width, thickness));
    }

    for _ in 0..count(rng, lc.moving_platforms) {
        let width = span(rng, lc.moving_width);
        let x = place_x(rng, arena, margin, width);
        let y = span(rng, lc.moving_y);
        let travel = span(rng, lc.moving_travel);
        let speed = span(rng, lc.moving_speed);
        obstacles.push(Obstacle::moving(x, y, width, thickness, travel, speed, arena));
    }

    for _ in 0..count(rng, lc.fragile_platforms) {
        let width = span(rng, lc.fragile_width);
        let x = place_x(rng, arena, margin, width);
        let y = span(rng, lc.fragile_y);
        obstacles.push(Obstacle::fragile(
            x,
            y,
            width,
            thickness,
            lc.fragile_break_delay,
            lc.fragile_respawn_time,
        ));
    }

    for _ in 0..count(rng, lc.blocks) {
        let size = span(rng, lc.block_size);
        let x = place_x(rng, arena, margin, size);
        let y = span(rng, lc.block_y);
        obstacles.push(Obstacle::block(x, y, size));
    }

    let enemies: Vec<Enemy> = (0..config.enemies.initial_count)
        .map(|_| Enemy::spawn(rng, &config.enemies, arena, arena.height * 0.5))
        .collect();

    log::info!(
        "Level {}: {} obstacles, {} enemies",
        number,
        obstacles.len(),
        enemies.len()
    );

    Level {
        obstacles,
        enemies,
        door: Door::new(arena, lc.door_size),
    }
}

//! Level obstacles
//!
//! One struct with a tagged kind instead of a type hierarchy. Collision code
//! only ever asks `is_solid`, `on_player_step`, `update` and `displacement`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::{Arena, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Thin platform that never moves
    Static,
    /// Platform bouncing horizontally between `min_x` and `max_x`
    Moving {
        min_x: f32,
        max_x: f32,
        speed: f32,
        /// +1 right, -1 left
        direction: f32,
        /// Horizontal movement during the last update
        last_dx: f32,
    },
    /// Platform that breaks after sustained contact and later comes back
    Fragile {
        break_delay: u32,
        respawn_time: u32,
        /// Consecutive ticks of player contact
        step_timer: u32,
        /// Ticks spent broken
        respawn_timer: u32,
        broken: bool,
        /// Player touched the top since the last update
        stepped: bool,
    },
    /// Square block
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub rect: Rect,
    pub kind: ObstacleKind,
}

impl Obstacle {
    pub fn platform(x: f32, y: f32, width: f32, thickness: f32) -> Self {
        Self {
            rect: Rect::new(x, y, width, thickness),
            kind: ObstacleKind::Static,
        }
    }

    pub fn block(x: f32, y: f32, size: f32) -> Self {
        Self {
            rect: Rect::new(x, y, size, size),
            kind: ObstacleKind::Block,
        }
    }

    /// Moving platform starting at its left bound and travelling `travel`
    /// pixels to the right, never past the arena walls
    pub fn moving(
        x: f32,
        y: f32,
        width: f32,
        thickness: f32,
        travel: f32,
        speed: f32,
        arena: &Arena,
    ) -> Self {
        let min_x = x.max(arena.inner_min().x);
        let max_x = (min_x + width + travel.max(0.0)).min(arena.inner_max().x);
        Self {
            rect: Rect::new(min_x, y, width, thickness),
            kind: ObstacleKind::Moving {
                min_x,
                max_x,
                speed: speed.abs(),
                direction: 1.0,
                last_dx: 0.0,
            },
        }
    }

    pub fn fragile(
        x: f32,
        y: f32,
        width: f32,
        thickness: f32,
        break_delay: u32,
        respawn_time: u32,
    ) -> Self {
        Self {
            rect: Rect::new(x, y, width, thickness),
            kind: ObstacleKind::Fragile {
                break_delay,
                respawn_time,
                step_timer: 0,
                respawn_timer: 0,
                broken: false,
                stepped: false,
            },
        }
    }

    /// Broken fragile platforms are the only non-solid obstacles
    pub fn is_solid(&self) -> bool {
        !matches!(self.kind, ObstacleKind::Fragile { broken: true, .. })
    }

    /// Player is standing on top of this obstacle this tick
    pub fn on_player_step(&mut self) {
        if let ObstacleKind::Fragile {
            break_delay,
            step_timer,
            respawn_timer,
            broken,
            stepped,
            ..
        } = &mut self.kind
        {
            if *broken {
                return;
            }
            *stepped = true;
            *step_timer += 1;
            if *step_timer >= *break_delay {
                *broken = true;
                *step_timer = 0;
                *respawn_timer = 0;
                log::debug!("Fragile platform at ({:.0}, {:.0}) broke", self.rect.pos.x, self.rect.pos.y);
            }
        }
    }

    /// Advance per-tick behavior (movement, break and respawn timers)
    pub fn update(&mut self) {
        match &mut self.kind {
            ObstacleKind::Static | ObstacleKind::Block => {}
            ObstacleKind::Moving {
                min_x,
                max_x,
                speed,
                direction,
                last_dx,
            } => {
                let old_x = self.rect.pos.x;
                let mut x = old_x + *speed * *direction;
                if x <= *min_x {
                    x = *min_x;
                    *direction = 1.0;
                } else if x + self.rect.size.x >= *max_x {
                    // Never overshoot; a range narrower than the platform pins it to min_x
                    x = (*max_x - self.rect.size.x).max(*min_x);
                    *direction = -1.0;
                }
                self.rect.pos.x = x;
                *last_dx = x - old_x;
            }
            ObstacleKind::Fragile {
                respawn_time,
                step_timer,
                respawn_timer,
                broken,
                stepped,
                ..
            } => {
                if *broken {
                    *respawn_timer += 1;
                    if *respawn_timer >= *respawn_time {
                        *broken = false;
                        *respawn_timer = 0;
                        *step_timer = 0;
                    }
                } else if !*stepped {
                    // Contact must be consecutive
                    *step_timer = 0;
                }
                *stepped = false;
            }
        }
    }

    /// How far the obstacle moved during its last update
    pub fn displacement(&self) -> Vec2 {
        match self.kind {
            ObstacleKind::Moving { last_dx, .. } => Vec2::new(last_dx, 0.0),
            _ => Vec2::ZERO,
        }
    }
}

//! Heart pickups and the level exit

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::{Arena, Rect, to_ellipse_space};

/// Falling heart that restores one life
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartPickup {
    pub pos: Vec2,
    pub size: f32,
    pub fall_speed: f32,
    pub active: bool,
}

impl HeartPickup {
    pub fn new(pos: Vec2, size: f32, fall_speed: f32) -> Self {
        Self {
            pos,
            size,
            fall_speed,
            active: true,
        }
    }

    pub fn update(&mut self, arena: &Arena) {
        self.pos.y += self.fall_speed;
        if self.pos.y > arena.height {
            self.active = false;
        }
    }

    pub fn touches_body(&self, center: Vec2, half: Vec2) -> bool {
        to_ellipse_space(self.pos - center, half + self.size).length_squared() < 1.0
    }
}

/// Level exit. Inert until enough enemies are defeated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub rect: Rect,
    pub active: bool,
}

impl Door {
    /// Door in the top-right corner of the arena
    pub fn new(arena: &Arena, size: Vec2) -> Self {
        Self {
            rect: Rect {
                pos: Vec2::new(arena.width - arena.wall - 80.0, arena.wall + 20.0),
                size,
            },
            active: false,
        }
    }

    pub fn touches_body(&self, center: Vec2, half: Vec2) -> bool {
        self.active && self.rect.touches_ellipse(center, half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> Arena {
        Arena {
            width: 1200.0,
            height: 800.0,
            wall: 20.0,
        }
    }

    #[test]
    fn test_heart_falls_off_bottom() {
        let mut h = HeartPickup::new(Vec2::new(300.0, 795.0), 15.0, 2.0);
        h.update(&arena());
        assert!(h.active);
        assert_eq!(h.pos.y, 797.0);
        for _ in 0..2 {
            h.update(&arena());
        }
        assert!(!h.active);
    }

    #[test]
    fn test_heart_contact() {
        let h = HeartPickup::new(Vec2::new(300.0, 300.0), 15.0, 2.0);
        assert!(h.touches_body(Vec2::new(340.0, 300.0), Vec2::new(35.0, 30.0)));
        assert!(!h.touches_body(Vec2::new(360.0, 300.0), Vec2::new(35.0, 30.0)));
    }

    #[test]
    fn test_door_only_collides_when_active() {
        let mut door = Door::new(&arena(), Vec2::new(60.0, 80.0));
        assert_eq!(door.rect.pos, Vec2::new(1100.0, 40.0));
        let inside = door.rect.center();
        assert!(!door.touches_body(inside, Vec2::splat(30.0)));
        door.active = true;
        assert!(door.touches_body(inside, Vec2::splat(30.0)));
    }
}

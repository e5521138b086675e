//! Player missiles and enemy bullets

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::{Arena, Rect, to_ellipse_space};

/// Player-fired missile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Missile {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    /// Large, slow, wall-piercing shot with an area effect
    pub charged: bool,
    pub active: bool,
}

impl Missile {
    /// Missile centred on `center` flying along `dir` (normalized here)
    pub fn new(center: Vec2, size: Vec2, dir: Vec2, speed: f32, charged: bool) -> Self {
        let dir = dir.try_normalize().unwrap_or(Vec2::X);
        Self {
            pos: center - size * 0.5,
            size,
            vel: dir * speed,
            charged,
            active: true,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Horizontal travel direction (+1 or -1)
    pub fn direction(&self) -> f32 {
        if self.vel.x < 0.0 { -1.0 } else { 1.0 }
    }

    /// Normal missiles die at the walls, charged ones once fully off the arena
    pub fn update(&mut self, arena: &Arena) {
        self.pos += self.vel;

        let rect = self.rect();
        let out = if self.charged {
            rect.max().x < 0.0
                || rect.min().x > arena.width
                || rect.max().y < 0.0
                || rect.min().y > arena.height
        } else {
            let c = self.center();
            let lo = arena.inner_min();
            let hi = arena.inner_max();
            c.x < lo.x || c.x > hi.x || c.y < lo.y || c.y > hi.y
        };
        if out {
            self.active = false;
        }
    }

    pub fn touches_body(&self, center: Vec2, half: Vec2) -> bool {
        self.rect().touches_ellipse(center, half)
    }
}

/// Bullet fired by an enemy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyBullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub active: bool,
}

impl EnemyBullet {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel,
            radius,
            active: true,
        }
    }

    pub fn update(&mut self, arena: &Arena) {
        self.pos += self.vel;
        let lo = arena.inner_min() - self.radius;
        let hi = arena.inner_max() + self.radius;
        if self.pos.x < lo.x || self.pos.x > hi.x || self.pos.y < lo.y || self.pos.y > hi.y {
            self.active = false;
        }
    }

    pub fn touches_body(&self, center: Vec2, half: Vec2) -> bool {
        to_ellipse_space(self.pos - center, half + self.radius).length_squared() < 1.0
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
    fn test_normal_missile_dies_at_wall() {
        let mut m = Missile::new(Vec2::new(1150.0, 400.0), Vec2::new(15.0, 8.0), Vec2::X, 18.0, false);
        m.update(&arena());
        assert!(m.active);
        m.update(&arena());
        assert!(!m.active);
    }

    #[test]
    fn test_charged_missile_pierces_walls() {
        let mut m = Missile::new(Vec2::new(1150.0, 400.0), Vec2::new(60.0, 35.0), Vec2::X, 15.0, true);
        for _ in 0..4 {
            m.update(&arena());
        }
        // Past the wall but not yet fully off the arena
        assert!(m.center().x > 1180.0);
        assert!(m.active);
        for _ in 0..10 {
            m.update(&arena());
        }
        assert!(!m.active);
    }

    #[test]
    fn test_aimed_missile_keeps_speed() {
        let m = Missile::new(Vec2::new(600.0, 400.0), Vec2::new(15.0, 8.0), Vec2::new(-1.0, -1.0), 18.0, false);
        assert!((m.vel.length() - 18.0).abs() < 1e-4);
        assert_eq!(m.direction(), -1.0);
        assert_eq!(m.center(), Vec2::new(600.0, 400.0));
    }

    #[test]
    fn test_missile_hits_ellipse() {
        let m = Missile::new(Vec2::new(600.0, 400.0), Vec2::new(15.0, 8.0), Vec2::X, 18.0, false);
        assert!(m.touches_body(Vec2::new(630.0, 400.0), Vec2::new(30.0, 20.0)));
        assert!(!m.touches_body(Vec2::new(650.0, 400.0), Vec2::new(30.0, 20.0)));
    }

    #[test]
    fn test_bullet_leaves_arena() {
        let mut b = EnemyBullet::new(Vec2::new(25.0, 400.0), Vec2::new(-4.0, 0.0), 6.0);
        b.update(&arena());
        assert!(b.active);
        for _ in 0..3 {
            b.update(&arena());
        }
        assert!(!b.active);
    }

    #[test]
    fn test_bullet_hits_body() {
        let b = EnemyBullet::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 6.0);
        assert!(b.touches_body(Vec2::new(130.0, 100.0), Vec2::new(30.0, 20.0)));
        assert!(!b.touches_body(Vec2::new(100.0, 130.0), Vec2::new(30.0, 20.0)));
    }
}

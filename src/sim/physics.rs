//! Collision detection and response for ellipse bodies
//!
//! Player and enemy hitboxes are axis-aligned ellipses, not circles. Every
//! primitive here uses the same trick: divide offsets by the half extents so
//! the ellipse becomes a unit circle, resolve in that space, then convert the
//! normal back to real space for velocity math.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::ArenaConfig;

/// Smallest half extent used as a denominator
pub const MIN_EXTENT: f32 = 1e-3;

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            pos: center - size * 0.5,
            size,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Closest point of the rectangle to `p` (p itself when inside)
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.max(self.min()).min(self.max())
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.pos.x < other.pos.x + other.size.x
            && self.pos.x + self.size.x > other.pos.x
            && self.pos.y < other.pos.y + other.size.y
            && self.pos.y + self.size.y > other.pos.y
    }

    /// Whether an ellipse body touches this rectangle
    pub fn touches_ellipse(&self, center: Vec2, half: Vec2) -> bool {
        let scaled = to_ellipse_space(center - self.closest_point(center), half);
        scaled.length_squared() < 1.0
    }
}

/// Which side wall a body is pressed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WallSide {
    #[default]
    None,
    Left,
    Right,
}

impl WallSide {
    /// -1 for left, 1 for right, 0 for none
    pub fn sign(self) -> f32 {
        match self {
            WallSide::None => 0.0,
            WallSide::Left => -1.0,
            WallSide::Right => 1.0,
        }
    }
}

/// The playable rectangle inside the walls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    pub wall: f32,
}

impl Arena {
    pub fn from_config(config: &ArenaConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            wall: config.wall_thickness,
        }
    }

    #[inline]
    pub fn inner_min(&self) -> Vec2 {
        Vec2::splat(self.wall)
    }

    #[inline]
    pub fn inner_max(&self) -> Vec2 {
        Vec2::new(self.width - self.wall, self.height - self.wall)
    }

    /// Whether an ellipse body lies fully inside the walls
    pub fn contains_body(&self, pos: Vec2, half: Vec2) -> bool {
        const TOLERANCE: f32 = 1e-3;
        let lo = self.inner_min() + half - TOLERANCE;
        let hi = self.inner_max() - half + TOLERANCE;
        pos.x >= lo.x && pos.x <= hi.x && pos.y >= lo.y && pos.y <= hi.y
    }

    /// Clamp a body centre so the body fits inside the walls
    pub fn clamp_body(&self, pos: Vec2, half: Vec2) -> Vec2 {
        let lo = self.inner_min() + half;
        let hi = (self.inner_max() - half).max(lo);
        pos.max(lo).min(hi)
    }
}

#[inline]
fn safe_extents(half: Vec2) -> Vec2 {
    half.max(Vec2::splat(MIN_EXTENT))
}

/// Express a real-space offset in the unit-circle space of an ellipse
#[inline]
pub fn to_ellipse_space(offset: Vec2, half: Vec2) -> Vec2 {
    offset / safe_extents(half)
}

/// Convert an ellipse-space normal back to a real-space unit normal
#[inline]
pub fn from_ellipse_normal(scaled_normal: Vec2, half: Vec2) -> Vec2 {
    (scaled_normal / safe_extents(half)).normalize_or_zero()
}

/// Mass of a body, proportional to its hitbox area
#[inline]
pub fn mass_for(half: Vec2) -> f32 {
    let half = safe_extents(half);
    half.x * half.y
}

/// Result of clamping a body inside the arena
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryContact {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Touching the floor
    pub grounded: bool,
    pub wall: WallSide,
}

/// Keep an ellipse body inside the arena.
///
/// Side walls and ceiling reflect velocity scaled by `bounce`; the floor
/// zeroes vertical velocity and grounds the body with no rebound.
pub fn resolve_boundary(
    pos: Vec2,
    half: Vec2,
    vel: Vec2,
    arena: &Arena,
    bounce: f32,
) -> BoundaryContact {
    let lo = arena.inner_min();
    let hi = arena.inner_max();
    let mut pos = pos;
    let mut vel = vel;
    let mut grounded = false;
    let mut wall = WallSide::None;

    if pos.x - half.x < lo.x {
        pos.x = lo.x + half.x;
        vel.x = -vel.x * bounce;
        wall = WallSide::Left;
    }
    if pos.x + half.x > hi.x {
        pos.x = hi.x - half.x;
        vel.x = -vel.x * bounce;
        wall = WallSide::Right;
    }
    if pos.y - half.y < lo.y {
        pos.y = lo.y + half.y;
        vel.y = -vel.y * bounce;
    }
    if pos.y + half.y > hi.y {
        pos.y = hi.y - half.y;
        vel.y = 0.0;
        grounded = true;
    }

    BoundaryContact {
        pos,
        vel,
        grounded,
        wall,
    }
}

/// Result of an ellipse vs rectangle check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectContact {
    pub pos: Vec2,
    pub vel: Vec2,
    pub hit: bool,
    /// Contact normal points up: the body rests on the rectangle
    pub on_top: bool,
    /// Real-space contact normal, pointing from the rectangle to the body
    pub normal: Vec2,
}

impl RectContact {
    fn miss(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            hit: false,
            on_top: false,
            normal: Vec2::ZERO,
        }
    }
}

/// Resolve an ellipse body against an axis-aligned rectangle.
///
/// On penetration the body is pushed out along the ellipse-space normal. A
/// dominant vertical normal zeroes vertical velocity, a dominant horizontal
/// one reflects horizontal velocity scaled by `bounce`.
pub fn resolve_rect(pos: Vec2, half: Vec2, vel: Vec2, rect: &Rect, bounce: f32) -> RectContact {
    let half = safe_extents(half);
    let closest = rect.closest_point(pos);
    let scaled = to_ellipse_space(pos - closest, half);
    let dist = scaled.length();

    if dist >= 1.0 {
        return RectContact::miss(pos, vel);
    }

    let (scaled_normal, push) = if dist > MIN_EXTENT {
        let n = scaled / dist;
        (n, n * (1.0 - dist))
    } else {
        // Centre inside the rectangle: leave through the nearest face
        let min = rect.min();
        let max = rect.max();
        let exits = [
            (Vec2::NEG_X, (pos.x - min.x) / half.x + 1.0),
            (Vec2::X, (max.x - pos.x) / half.x + 1.0),
            (Vec2::NEG_Y, (pos.y - min.y) / half.y + 1.0),
            (Vec2::Y, (max.y - pos.y) / half.y + 1.0),
        ];
        let (n, depth) = exits
            .into_iter()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((Vec2::NEG_Y, 1.0));
        (n, n * depth)
    };

    let new_pos = pos + push * half;
    let mut new_vel = vel;
    if scaled_normal.x.abs() > scaled_normal.y.abs() {
        new_vel.x = -vel.x * bounce;
    } else {
        new_vel.y = 0.0;
    }

    RectContact {
        pos: new_pos,
        vel: new_vel,
        hit: true,
        on_top: scaled_normal.y < -0.5,
        normal: from_ellipse_normal(scaled_normal, half),
    }
}

/// A moving ellipse body taking part in a collision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub half: Vec2,
    pub vel: Vec2,
    pub mass: f32,
}

impl Body {
    /// Body with mass derived from its hitbox area
    pub fn new(pos: Vec2, half: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            half,
            vel,
            mass: mass_for(half),
        }
    }
}

/// Result of a body vs body check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyContact {
    pub a: Body,
    pub b: Body,
    pub collided: bool,
    /// Real-space unit normal from `a` toward `b`
    pub normal: Vec2,
    /// Approach speed along the normal before the impulse (<= 0 when separating)
    pub closing_speed: f32,
}

/// Whether two ellipse bodies overlap (shared normalized-distance space)
pub fn bodies_overlap(pos_a: Vec2, half_a: Vec2, pos_b: Vec2, half_b: Vec2) -> bool {
    to_ellipse_space(pos_b - pos_a, half_a + half_b).length_squared() < 1.0
}

/// Separate two overlapping bodies 50/50 and exchange momentum.
///
/// The impulse is only applied while the bodies approach each other, so
/// bodies already separating never stick.
pub fn resolve_body_body(a: Body, b: Body, restitution: f32) -> BodyContact {
    let sum = safe_extents(a.half + b.half);
    let scaled = to_ellipse_space(b.pos - a.pos, sum);
    let dist = scaled.length();

    if dist >= 1.0 {
        return BodyContact {
            a,
            b,
            collided: false,
            normal: Vec2::ZERO,
            closing_speed: 0.0,
        };
    }

    // Coincident centres have no direction; pick one so they still separate
    let scaled_normal = if dist > MIN_EXTENT {
        scaled / dist
    } else {
        Vec2::X
    };

    let separation = (scaled_normal - scaled) * sum;
    let mut a = a;
    let mut b = b;
    a.pos -= separation * 0.5;
    b.pos += separation * 0.5;

    let normal = from_ellipse_normal(scaled_normal, sum);
    let closing = (a.vel - b.vel).dot(normal);
    let total_mass = a.mass + b.mass;

    if closing > 0.0 && total_mass > 0.0 {
        let impulse = (1.0 + restitution) * closing / total_mass;
        a.vel -= normal * impulse * b.mass;
        b.vel += normal * impulse * a.mass;
    }

    BodyContact {
        a,
        b,
        collided: true,
        normal,
        closing_speed: closing,
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

    #[test]
    fn test_floor_is_sticky() {
        let half = Vec2::new(30.0, 20.0);
        let c = resolve_boundary(Vec2::new(600.0, 790.0), half, Vec2::new(3.0, 9.0), &arena(), 0.5);
        assert!(c.grounded);
        assert_eq!(c.vel.y, 0.0);
        assert_eq!(c.vel.x, 3.0);
        assert_eq!(c.pos.y, 780.0 - 20.0);
        assert_eq!(c.wall, WallSide::None);
    }

    #[test]
    fn test_side_walls_bounce() {
        let half = Vec2::new(30.0, 20.0);
        let c = resolve_boundary(Vec2::new(25.0, 400.0), half, Vec2::new(-10.0, 0.0), &arena(), 0.5);
        assert_eq!(c.wall, WallSide::Left);
        assert_eq!(c.pos.x, 50.0);
        assert!((c.vel.x - 5.0).abs() < 1e-6);

        let c = resolve_boundary(Vec2::new(1190.0, 400.0), half, Vec2::new(8.0, 0.0), &arena(), 0.5);
        assert_eq!(c.wall, WallSide::Right);
        assert!((c.vel.x + 4.0).abs() < 1e-6);
        assert!(!c.grounded);
    }

    #[test]
    fn test_ceiling_bounces() {
        let c = resolve_boundary(
            Vec2::new(600.0, 10.0),
            Vec2::splat(10.0),
            Vec2::new(0.0, -6.0),
            &arena(),
            0.5,
        );
        assert_eq!(c.pos.y, 30.0);
        assert!((c.vel.y - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_land_on_rect_top() {
        let rect = Rect::new(100.0, 300.0, 200.0, 20.0);
        let half = Vec2::new(30.0, 20.0);
        // Body bottom 5px into the platform
        let c = resolve_rect(Vec2::new(200.0, 285.0), half, Vec2::new(2.0, 6.0), &rect, 0.5);
        assert!(c.hit);
        assert!(c.on_top);
        assert_eq!(c.vel.y, 0.0);
        assert_eq!(c.vel.x, 2.0);
        assert!((c.pos.y - 280.0).abs() < 1e-4);
        assert!((c.normal - Vec2::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn test_side_hit_on_rect() {
        let rect = Rect::new(100.0, 300.0, 200.0, 100.0);
        let half = Vec2::new(30.0, 20.0);
        let c = resolve_rect(Vec2::new(75.0, 350.0), half, Vec2::new(8.0, 1.0), &rect, 0.5);
        assert!(c.hit);
        assert!(!c.on_top);
        assert!((c.vel.x + 4.0).abs() < 1e-6);
        assert_eq!(c.vel.y, 1.0);
        assert!((c.pos.x - 70.0).abs() < 1e-4);
    }

    #[test]
    fn test_rect_miss_uses_ellipse_shape() {
        let rect = Rect::new(100.0, 300.0, 200.0, 20.0);
        // Wide, flat body: 35px left of the rect is inside a 40px half width
        let wide = Vec2::new(40.0, 10.0);
        assert!(resolve_rect(Vec2::new(65.0, 310.0), wide, Vec2::ZERO, &rect, 0.5).hit);
        // but 15px above the rect is outside a 10px half height
        assert!(!resolve_rect(Vec2::new(200.0, 285.0), wide, Vec2::ZERO, &rect, 0.5).hit);
    }

    #[test]
    fn test_centre_inside_rect_exits_nearest_face() {
        let rect = Rect::new(100.0, 300.0, 200.0, 40.0);
        let half = Vec2::new(10.0, 10.0);
        let c = resolve_rect(Vec2::new(200.0, 305.0), half, Vec2::new(0.0, 4.0), &rect, 0.5);
        assert!(c.hit);
        assert!(c.on_top);
        assert!((c.pos.y - 290.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_size_body_does_not_divide_by_zero() {
        let rect = Rect::new(100.0, 300.0, 200.0, 40.0);
        let c = resolve_rect(Vec2::new(200.0, 320.0), Vec2::ZERO, Vec2::ONE, &rect, 0.5);
        assert!(c.pos.is_finite());
        assert!(c.vel.is_finite());

        let a = Body::new(Vec2::new(10.0, 10.0), Vec2::ZERO, Vec2::X);
        let b = Body::new(Vec2::new(10.0, 10.0), Vec2::ZERO, Vec2::NEG_X);
        let r = resolve_body_body(a, b, 0.9);
        assert!(r.a.pos.is_finite() && r.b.vel.is_finite());
    }

    #[test]
    fn test_head_on_collision_reverses() {
        let half = Vec2::splat(20.0);
        let a = Body::new(Vec2::new(100.0, 100.0), half, Vec2::new(5.0, 0.0));
        let b = Body::new(Vec2::new(130.0, 100.0), half, Vec2::new(-5.0, 0.0));
        let r = resolve_body_body(a, b, 1.0);
        assert!(r.collided);
        // Equal masses, perfectly elastic: velocities swap
        assert!((r.a.vel.x + 5.0).abs() < 1e-4);
        assert!((r.b.vel.x - 5.0).abs() < 1e-4);
        // Separated to exactly touching
        assert!((r.b.pos.x - r.a.pos.x - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_separating_bodies_keep_velocity() {
        let half = Vec2::splat(20.0);
        let a = Body::new(Vec2::new(100.0, 100.0), half, Vec2::new(-3.0, 0.0));
        let b = Body::new(Vec2::new(130.0, 100.0), half, Vec2::new(3.0, 0.0));
        let r = resolve_body_body(a, b, 0.9);
        assert!(r.collided);
        assert_eq!(r.a.vel, a.vel);
        assert_eq!(r.b.vel, b.vel);
        assert!(r.a.pos.x < 100.0 && r.b.pos.x > 130.0);
    }

    #[test]
    fn test_mass_is_area() {
        assert_eq!(mass_for(Vec2::new(3.0, 4.0)), 12.0);
    }

    proptest! {
        #[test]
        fn prop_boundary_contains_body(
            x in -500.0f32..2000.0,
            y in -500.0f32..1500.0,
            hw in 1.0f32..100.0,
            hh in 1.0f32..100.0,
            vx in -50.0f32..50.0,
            vy in -50.0f32..50.0,
        ) {
            let half = Vec2::new(hw, hh);
            let a = arena();
            let c = resolve_boundary(Vec2::new(x, y), half, Vec2::new(vx, vy), &a, 0.5);
            prop_assert!(a.contains_body(c.pos, half));
            if c.grounded {
                prop_assert_eq!(c.vel.y, 0.0);
            }
        }

        #[test]
        fn prop_rect_push_out_leaves_no_penetration(
            x in 0.0f32..400.0,
            y in 200.0f32..450.0,
            hw in 2.0f32..60.0,
            hh in 2.0f32..60.0,
        ) {
            let rect = Rect::new(100.0, 300.0, 200.0, 40.0);
            let half = Vec2::new(hw, hh);
            let c = resolve_rect(Vec2::new(x, y), half, Vec2::new(1.0, 1.0), &rect, 0.5);
            if c.hit {
                let scaled = to_ellipse_space(c.pos - rect.closest_point(c.pos), half);
                prop_assert!(scaled.length() >= 1.0 - 1e-3);
            }
        }

        #[test]
        fn prop_elastic_collision_stops_approach(
            dx in -60.0f32..60.0,
            dy in -60.0f32..60.0,
            vax in -10.0f32..10.0,
            vay in -10.0f32..10.0,
            vbx in -10.0f32..10.0,
            vby in -10.0f32..10.0,
            hw_a in 5.0f32..40.0,
            hh_a in 5.0f32..40.0,
            hw_b in 5.0f32..40.0,
            hh_b in 5.0f32..40.0,
            restitution in 0.0f32..1.0,
        ) {
            let a = Body::new(Vec2::new(300.0, 300.0), Vec2::new(hw_a, hh_a), Vec2::new(vax, vay));
            let b = Body::new(
                Vec2::new(300.0 + dx, 300.0 + dy),
                Vec2::new(hw_b, hh_b),
                Vec2::new(vbx, vby),
            );
            let r = resolve_body_body(a, b, restitution);
            if r.collided {
                let closing_after = (r.a.vel - r.b.vel).dot(r.normal);
                prop_assert!(closing_after <= 1e-3);

                // Momentum change is equal and opposite
                let dp_a = (r.a.vel - a.vel) * a.mass;
                let dp_b = (r.b.vel - b.vel) * b.mass;
                let scale = 1.0 + a.mass.max(b.mass) * 20.0;
                prop_assert!((dp_a + dp_b).length() / scale < 1e-4);

                // Pushed apart to exactly touching
                let gap = to_ellipse_space(r.b.pos - r.a.pos, r.a.half + r.b.half).length();
                prop_assert!(gap > 0.999);
            }
        }
    }
}

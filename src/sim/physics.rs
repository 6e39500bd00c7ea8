//! Axis-aligned physics substrate
//!
//! Just enough of a broad-phase world for the climber: rectangular and
//! circular bounds, gravity integration, and solid resting contact against
//! platform tiles. Anything that is not the hero is kinematic.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Tolerance used when separating contacts along one axis
const CONTACT_SLOP: f32 = 0.5;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Closest point inside the box to `p`
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }
}

/// Body shape, positioned by the owning body's center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Bounds {
    Rect { half: Vec2 },
    Circle { radius: f32 },
}

impl Bounds {
    pub fn rect(width: f32, height: f32) -> Self {
        Bounds::Rect {
            half: Vec2::new(width / 2.0, height / 2.0),
        }
    }

    pub fn circle(radius: f32) -> Self {
        Bounds::Circle { radius }
    }

    /// Bounding box at `center`
    pub fn aabb_at(&self, center: Vec2) -> Aabb {
        match *self {
            Bounds::Rect { half } => Aabb::from_center(center, half),
            Bounds::Circle { radius } => Aabb::from_center(center, Vec2::splat(radius)),
        }
    }
}

/// Overlap test between two positioned shapes
pub fn shapes_overlap(a_pos: Vec2, a: &Bounds, b_pos: Vec2, b: &Bounds) -> bool {
    match (*a, *b) {
        (Bounds::Rect { .. }, Bounds::Rect { .. }) => a.aabb_at(a_pos).overlaps(&b.aabb_at(b_pos)),
        (Bounds::Circle { radius }, Bounds::Rect { .. }) => {
            circle_rect_overlap(a_pos, radius, &b.aabb_at(b_pos))
        }
        (Bounds::Rect { .. }, Bounds::Circle { radius }) => {
            circle_rect_overlap(b_pos, radius, &a.aabb_at(a_pos))
        }
        (Bounds::Circle { radius: ra }, Bounds::Circle { radius: rb }) => {
            a_pos.distance_squared(b_pos) < (ra + rb) * (ra + rb)
        }
    }
}

fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Aabb) -> bool {
    let closest = rect.clamp_point(center);
    center.distance_squared(closest) < radius * radius
}

/// Anything that takes part in broad-phase overlap checks
pub trait Collidable {
    fn body(&self) -> &Body;

    fn overlaps<C: Collidable>(&self, other: &C) -> bool
    where
        Self: Sized,
    {
        self.body().overlaps(other.body())
    }
}

/// A simulated body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    /// Center position
    pub pos: Vec2,
    pub vel: Vec2,
    pub bounds: Bounds,
    /// Whether gravity integrates into velocity
    pub gravity: bool,
    /// Immovable bodies are never pushed by contacts
    pub immovable: bool,
    /// Disabled bodies take part in no overlap or contact
    pub enabled: bool,
    /// Resting on a solid after the last step
    #[serde(default)]
    pub blocked_down: bool,
}

impl Body {
    /// Gravity-affected dynamic body
    pub fn dynamic(pos: Vec2, bounds: Bounds) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            bounds,
            gravity: true,
            immovable: false,
            enabled: true,
            blocked_down: false,
        }
    }

    /// Gravity-exempt body whose position is set directly each tick
    pub fn kinematic(pos: Vec2, bounds: Bounds) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            bounds,
            gravity: false,
            immovable: true,
            enabled: true,
            blocked_down: false,
        }
    }

    pub fn aabb(&self) -> Aabb {
        self.bounds.aabb_at(self.pos)
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        self.enabled
            && other.enabled
            && shapes_overlap(self.pos, &self.bounds, other.pos, &other.bounds)
    }

    /// Apply gravity to velocity
    pub fn integrate(&mut self, gravity: f32, dt: f32) {
        if self.enabled && self.gravity {
            self.vel.y += gravity * dt;
        }
    }

    /// Move by velocity, separating axis by axis from solid boxes
    ///
    /// Sets `blocked_down` when the body comes to rest on top of a solid.
    pub fn move_and_collide(&mut self, solids: &[Aabb], dt: f32) {
        self.blocked_down = false;
        if !self.enabled {
            return;
        }
        let half = self.aabb().max - self.pos;

        // Each pass ignores contact along the other axis, so resting on a row
        // of tiles never reads as a side hit
        self.pos.x += self.vel.x * dt;
        let x_half = half - Vec2::new(0.0, CONTACT_SLOP);
        for solid in solids {
            if !Aabb::from_center(self.pos, x_half).overlaps(solid) {
                continue;
            }
            if self.vel.x > 0.0 {
                self.pos.x = solid.min.x - half.x;
            } else if self.vel.x < 0.0 {
                self.pos.x = solid.max.x + half.x;
            }
            self.vel.x = 0.0;
        }

        self.pos.y += self.vel.y * dt;
        let y_half = half - Vec2::new(CONTACT_SLOP, 0.0);
        for solid in solids {
            if !Aabb::from_center(self.pos, y_half).overlaps(solid) {
                continue;
            }
            if self.vel.y > 0.0 {
                self.pos.y = solid.min.y - half.y;
                self.blocked_down = true;
            } else if self.vel.y < 0.0 {
                self.pos.y = solid.max.y + half.y;
            }
            self.vel.y = 0.0;
        }

        // Resting contact: a body sitting exactly on a surface stays grounded
        if !self.blocked_down && self.vel.y >= 0.0 {
            let feet = Aabb::from_center(self.pos + Vec2::new(0.0, CONTACT_SLOP), y_half);
            if solids.iter().any(|s| feet.overlaps(s)) {
                self.blocked_down = true;
                self.vel.y = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_overlap_excludes_touching() {
        let a = Aabb::new(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::new(Vec2::new(10.0, 0.0), Vec2::new(20.0, 10.0));
        let c = Aabb::new(Vec2::new(5.0, 5.0), Vec2::new(15.0, 15.0));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
    }

    #[test]
    fn test_circle_rect_overlap_corner() {
        let rect = Bounds::rect(20.0, 20.0);
        let circle = Bounds::circle(5.0);
        // Circle near the corner but outside the rounded distance
        assert!(!shapes_overlap(Vec2::ZERO, &rect, Vec2::new(14.0, 14.0), &circle));
        assert!(shapes_overlap(Vec2::ZERO, &rect, Vec2::new(13.0, 0.0), &circle));
    }

    #[test]
    fn test_kinematic_body_ignores_gravity() {
        let mut body = Body::kinematic(Vec2::ZERO, Bounds::circle(10.0));
        body.integrate(800.0, 1.0);
        assert_eq!(body.vel, Vec2::ZERO);
    }

    #[test]
    fn test_dynamic_body_lands_on_solid() {
        let floor = Aabb::new(Vec2::new(-100.0, 100.0), Vec2::new(100.0, 132.0));
        let mut body = Body::dynamic(Vec2::new(0.0, 70.0), Bounds::rect(30.0, 50.0));
        body.vel.y = 300.0;
        body.move_and_collide(&[floor], 1.0 / 60.0);
        assert!(body.blocked_down);
        assert_eq!(body.vel.y, 0.0);
        assert!((body.aabb().max.y - 100.0).abs() < 0.001);

        // Next step: gravity pulls it into the floor again, it stays grounded
        body.integrate(800.0, 1.0 / 60.0);
        body.move_and_collide(&[floor], 1.0 / 60.0);
        assert!(body.blocked_down);
    }

    #[test]
    fn test_dynamic_body_bonks_head() {
        let ceiling = Aabb::new(Vec2::new(-100.0, -32.0), Vec2::new(100.0, 0.0));
        let mut body = Body::dynamic(Vec2::new(0.0, 27.0), Bounds::rect(30.0, 50.0));
        body.vel.y = -520.0;
        body.move_and_collide(&[ceiling], 1.0 / 60.0);
        assert!(!body.blocked_down);
        assert_eq!(body.vel.y, 0.0);
        assert!(body.aabb().min.y >= 0.0);
    }

    #[test]
    fn test_disabled_bodies_never_overlap() {
        let a = Body::kinematic(Vec2::ZERO, Bounds::circle(10.0));
        let mut b = Body::kinematic(Vec2::new(5.0, 0.0), Bounds::circle(10.0));
        assert!(a.overlaps(&b));
        b.enabled = false;
        assert!(!a.overlaps(&b));
    }
}

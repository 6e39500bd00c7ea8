//! Enemy ("bug") behaviour
//!
//! Bugs are horizontal-only automatons pinned to one platform. They patrol
//! between its edges and chase the hero when the hero stands on their
//! platform's level.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::physics::{Body, Bounds, Collidable};
use super::platform::{Platform, PlatformHandle};
use super::pool::{Handle, Poolable};
use crate::consts::*;

pub type EnemyHandle = Handle<Enemy>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyBehavior {
    #[default]
    Patrol,
    Chase,
}

/// Home platform extents cached at spawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeBounds {
    pub left: f32,
    pub right: f32,
    /// Tile-row center line of the platform
    pub y: f32,
    /// Walkable surface
    pub top: f32,
}

impl HomeBounds {
    pub fn of(platform: &Platform) -> Self {
        Self {
            left: platform.left,
            right: platform.right(),
            y: platform.y,
            top: platform.top_y(),
        }
    }

    /// Horizontal range the enemy center may occupy
    fn walk_range(&self) -> (f32, f32) {
        let lo = self.left + ENEMY_EDGE_MARGIN;
        let hi = self.right - ENEMY_EDGE_MARGIN;
        if lo <= hi {
            (lo, hi)
        } else {
            let mid = (self.left + self.right) / 2.0;
            (mid, mid)
        }
    }
}

/// A bug confined to one platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub body: Body,
    /// Non-owning reference into the platform pool
    #[serde(skip)]
    pub home: Option<PlatformHandle>,
    pub bounds: HomeBounds,
    pub speed: f32,
    pub behavior: EnemyBehavior,
    pub tier_index: u32,
}

impl Default for Enemy {
    fn default() -> Self {
        let mut body = Body::kinematic(Vec2::ZERO, Bounds::circle(ENEMY_RADIUS));
        body.enabled = false;
        Self {
            body,
            home: None,
            bounds: HomeBounds::default(),
            speed: ENEMY_SPEED,
            behavior: EnemyBehavior::Patrol,
            tier_index: 0,
        }
    }
}

impl Enemy {
    /// Place on a platform at a random spot away from its edges
    pub fn spawn(
        &mut self,
        home: PlatformHandle,
        platform: &Platform,
        speed: f32,
        rng: &mut impl Rng,
    ) {
        self.home = Some(home);
        self.bounds = HomeBounds::of(platform);
        self.speed = speed;
        self.behavior = EnemyBehavior::Patrol;
        self.tier_index = platform.tier_index;

        let (lo, hi) = self.bounds.walk_range();
        let spawn_lo = (platform.left + 30.0).clamp(lo, hi);
        let spawn_hi = (platform.right() - 30.0).clamp(lo, hi);
        let x = if spawn_lo < spawn_hi {
            rng.random_range(spawn_lo..=spawn_hi)
        } else {
            spawn_lo
        };

        self.body = Body::kinematic(Vec2::new(x, self.surface_y()), Bounds::circle(ENEMY_RADIUS));
    }

    fn surface_y(&self) -> f32 {
        self.bounds.top - ENEMY_RADIUS
    }

    /// One tick of patrol/chase behaviour
    pub fn update(&mut self, hero_pos: Vec2, chase_band: f32, rng: &mut impl Rng, dt: f32) {
        if !self.body.enabled {
            return;
        }
        let (lo, hi) = self.bounds.walk_range();
        let x = self.body.pos.x;

        let hero_on_level = (hero_pos.y - self.bounds.y).abs() < chase_band;
        let hero_over_platform = hero_pos.x >= self.bounds.left && hero_pos.x <= self.bounds.right;

        if hero_on_level && hero_over_platform {
            self.behavior = EnemyBehavior::Chase;
            let dx = hero_pos.x - x;
            self.body.vel.x = if dx.abs() <= ENEMY_DEAD_ZONE {
                0.0
            } else {
                self.speed * dx.signum()
            };
        } else {
            self.behavior = EnemyBehavior::Patrol;
            if x <= lo {
                self.body.vel.x = self.speed;
            } else if x >= hi {
                self.body.vel.x = -self.speed;
            } else if self.body.vel.x == 0.0 {
                self.body.vel.x = if rng.random_bool(0.5) {
                    self.speed
                } else {
                    -self.speed
                };
            }
        }

        let mut next_x = x + self.body.vel.x * dt;
        if self.behavior == EnemyBehavior::Chase {
            // Don't overshoot the hero inside one tick
            let dx = hero_pos.x - x;
            if (next_x - x).abs() > dx.abs() {
                next_x = hero_pos.x;
            }
        }
        if next_x < lo {
            next_x = lo;
            self.body.vel.x = self.speed;
        } else if next_x > hi {
            next_x = hi;
            self.body.vel.x = -self.speed;
        }

        // Vertical axis is not simulated; pin to the surface every tick
        self.body.pos = Vec2::new(next_x, self.surface_y());
        self.body.vel.y = 0.0;
    }
}

impl Collidable for Enemy {
    fn body(&self) -> &Body {
        &self.body
    }
}

impl Poolable for Enemy {
    fn deactivate(&mut self) {
        self.body.enabled = false;
        self.body.vel = Vec2::ZERO;
        self.home = None;
        self.behavior = EnemyBehavior::Patrol;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::pool::Pool;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn setup(left: f32, width: f32) -> (Enemy, Platform, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut platforms: Pool<Platform> = Pool::new();
        let mut platform = Platform::default();
        platform.place(left, 400.0, width, TILE_SIZE, 3);
        let snapshot = platform.clone();
        let handle = platforms.acquire(|p| *p = snapshot);
        let mut enemy = Enemy::default();
        enemy.spawn(handle, &platform, ENEMY_SPEED, &mut rng);
        (enemy, platform, rng)
    }

    #[test]
    fn test_spawn_on_surface() {
        let (enemy, platform, _) = setup(100.0, 200.0);
        assert!(enemy.body.enabled);
        assert!(!enemy.body.gravity);
        assert!(enemy.body.pos.x >= platform.left + 30.0);
        assert!(enemy.body.pos.x <= platform.right() - 30.0);
        assert_eq!(enemy.body.pos.y, platform.top_y() - ENEMY_RADIUS);
        assert_eq!(enemy.tier_index, 3);
    }

    #[test]
    fn test_chases_hero_on_same_level() {
        let (mut enemy, platform, mut rng) = setup(100.0, 300.0);
        enemy.body.pos.x = 150.0;
        let hero = Vec2::new(350.0, platform.y - 40.0);
        enemy.update(hero, ENEMY_CHASE_BAND, &mut rng, SIM_DT);
        assert_eq!(enemy.behavior, EnemyBehavior::Chase);
        assert!(enemy.body.pos.x > 150.0);
    }

    #[test]
    fn test_chase_dead_zone_stops_jitter() {
        let (mut enemy, platform, mut rng) = setup(100.0, 300.0);
        enemy.body.pos.x = 250.0;
        let hero = Vec2::new(252.0, platform.y - 40.0);
        enemy.update(hero, ENEMY_CHASE_BAND, &mut rng, SIM_DT);
        assert_eq!(enemy.body.vel.x, 0.0);
        assert_eq!(enemy.body.pos.x, 250.0);
    }

    #[test]
    fn test_patrols_when_hero_off_platform() {
        let (mut enemy, platform, mut rng) = setup(100.0, 300.0);
        // Same height but beyond the platform's right edge
        let hero = Vec2::new(900.0, platform.y - 40.0);
        enemy.update(hero, ENEMY_CHASE_BAND, &mut rng, SIM_DT);
        assert_eq!(enemy.behavior, EnemyBehavior::Patrol);
        assert_ne!(enemy.body.vel.x, 0.0);
    }

    #[test]
    fn test_patrol_reverses_at_edge() {
        let (mut enemy, _, mut rng) = setup(100.0, 300.0);
        enemy.body.pos.x = 400.0 - ENEMY_EDGE_MARGIN;
        enemy.body.vel.x = ENEMY_SPEED;
        enemy.update(Vec2::new(0.0, -5000.0), ENEMY_CHASE_BAND, &mut rng, SIM_DT);
        assert!(enemy.body.vel.x < 0.0);
    }

    #[test]
    fn test_confined_and_pinned_over_many_ticks() {
        let (mut enemy, platform, mut rng) = setup(500.0, 160.0);
        for i in 0..2_000 {
            // Hero sweeps back and forth across the level at platform height
            let hero_x = ((i as f32) * 7.0) % 1024.0;
            enemy.body.pos.y += 3.0; // simulated drift is corrected every tick
            enemy.update(Vec2::new(hero_x, platform.y), ENEMY_CHASE_BAND, &mut rng, SIM_DT);
            assert!(enemy.body.pos.x >= platform.left && enemy.body.pos.x <= platform.right());
            assert_eq!(enemy.body.pos.y, platform.top_y() - ENEMY_RADIUS);
        }
    }

    proptest! {
        #[test]
        fn prop_confined_under_random_hero_motion(
            left in 0.0f32..800.0,
            width in 40.0f32..350.0,
            path in prop::collection::vec((0.0f32..1024.0, -200.0f32..200.0), 1..400),
        ) {
            let (mut enemy, platform, mut rng) = setup(left, width);
            for (hero_x, dy) in path {
                let hero = Vec2::new(hero_x, platform.y + dy);
                enemy.update(hero, ENEMY_CHASE_BAND, &mut rng, SIM_DT);
                prop_assert!(enemy.body.pos.x >= platform.left);
                prop_assert!(enemy.body.pos.x <= platform.right());
                prop_assert_eq!(enemy.body.pos.y, platform.top_y() - ENEMY_RADIUS);
            }
        }
    }

    #[test]
    fn test_deactivate_drops_home() {
        let (mut enemy, _, _) = setup(100.0, 200.0);
        enemy.deactivate();
        assert!(enemy.home.is_none());
        assert!(!enemy.body.enabled);
    }
}

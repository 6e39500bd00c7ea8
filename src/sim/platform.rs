//! Platforms (the horizontal strips the hero stands on)

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::Aabb;
use super::pool::{Handle, Poolable};

pub type PlatformHandle = Handle<Platform>;

/// A horizontal strip of fixed-size tiles
///
/// `y` is the center line of the tile row; the walkable surface is half a
/// tile above it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub left: f32,
    pub width: f32,
    pub y: f32,
    pub tile_size: f32,
    pub tier_index: u32,
}

impl Platform {
    /// Reinitialise at a new position; width is never below one tile
    pub fn place(&mut self, left: f32, y: f32, width: f32, tile_size: f32, tier_index: u32) {
        self.left = left;
        self.y = y;
        self.tile_size = tile_size;
        self.width = width.max(tile_size);
        self.tier_index = tier_index;
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn center_x(&self) -> f32 {
        self.left + self.width / 2.0
    }

    /// Y of the walkable surface
    pub fn top_y(&self) -> f32 {
        self.y - self.tile_size / 2.0
    }

    pub fn tile_count(&self) -> u32 {
        (self.width / self.tile_size).ceil() as u32
    }

    /// Collision boxes of the individual tiles
    pub fn tiles(&self) -> impl Iterator<Item = Aabb> + '_ {
        let half = Vec2::splat(self.tile_size / 2.0);
        (0..self.tile_count()).map(move |i| {
            let center = Vec2::new(
                self.left + i as f32 * self.tile_size + self.tile_size / 2.0,
                self.y,
            );
            Aabb::from_center(center, half)
        })
    }

    /// Box spanning every tile
    pub fn collision_box(&self) -> Aabb {
        let half = self.tile_size / 2.0;
        Aabb::new(
            Vec2::new(self.left, self.y - half),
            Vec2::new(self.left + self.tile_count() as f32 * self.tile_size, self.y + half),
        )
    }

    /// Whether a point lies over the platform, above its surface
    pub fn is_point_above(&self, point: Vec2) -> bool {
        point.x >= self.left && point.x <= self.right() && point.y < self.top_y()
    }
}

impl Poolable for Platform {
    fn deactivate(&mut self) {
        self.width = 0.0;
    }
}

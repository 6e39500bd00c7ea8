//! Collectibles ("stars")
//!
//! Lifecycle: Active -> Collected (short despawn animation, no physical
//! presence) -> returned to the pool.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::{Body, Bounds, Collidable};
use super::pool::{Handle, Poolable};
use crate::consts::*;

pub type CollectibleHandle = Handle<Collectible>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollectiblePhase {
    #[default]
    Active,
    /// Picked up; counting down the despawn animation
    Collected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub body: Body,
    pub value: u32,
    pub phase: CollectiblePhase,
    /// Remaining despawn animation time
    pub despawn_timer: f32,
    pub tier_index: u32,
}

impl Default for Collectible {
    fn default() -> Self {
        let mut body = Body::kinematic(Vec2::ZERO, Bounds::circle(COLLECTIBLE_RADIUS));
        body.enabled = false;
        Self {
            body,
            value: 0,
            phase: CollectiblePhase::Active,
            despawn_timer: 0.0,
            tier_index: 0,
        }
    }
}

/// Value of a collectible for a difficulty multiplier
pub fn collectible_value(multiplier: f32) -> u32 {
    (COLLECTIBLE_BASE_VALUE * multiplier).round() as u32
}

impl Collectible {
    pub fn spawn(&mut self, pos: Vec2, multiplier: f32, tier_index: u32) {
        self.body = Body::kinematic(pos, Bounds::circle(COLLECTIBLE_RADIUS));
        self.value = collectible_value(multiplier);
        self.phase = CollectiblePhase::Active;
        self.despawn_timer = 0.0;
        self.tier_index = tier_index;
    }

    pub fn is_collected(&self) -> bool {
        self.phase == CollectiblePhase::Collected
    }

    /// Take the value and drop physical presence
    ///
    /// Returns `None` if already collected, so a second overlap in the same
    /// frame cannot award twice.
    pub fn collect(&mut self) -> Option<u32> {
        if self.phase != CollectiblePhase::Active || !self.body.enabled {
            return None;
        }
        self.phase = CollectiblePhase::Collected;
        self.body.enabled = false;
        self.despawn_timer = COLLECT_ANIMATION_TIME;
        Some(self.value)
    }

    /// Advance the despawn animation; true once it is ready for the pool
    pub fn update(&mut self, dt: f32) -> bool {
        if self.phase != CollectiblePhase::Collected {
            return false;
        }
        self.despawn_timer = (self.despawn_timer - dt).max(0.0);
        self.despawn_timer == 0.0
    }
}

impl Collidable for Collectible {
    fn body(&self) -> &Body {
        &self.body
    }
}

impl Poolable for Collectible {
    fn deactivate(&mut self) {
        self.body.enabled = false;
        self.phase = CollectiblePhase::Active;
        self.despawn_timer = 0.0;
    }
}

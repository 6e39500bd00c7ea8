//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (pool slot order, tier index order)
//! - No rendering, input devices or network

pub mod collectible;
pub mod collision;
pub mod difficulty;
pub mod enemy;
pub mod events;
pub mod generator;
pub mod hero;
pub mod physics;
pub mod platform;
pub mod pool;
pub mod state;
pub mod tick;

pub use collectible::{Collectible, CollectibleHandle, CollectiblePhase};
pub use collision::{CollisionReport, EnemyContact};
pub use difficulty::{DifficultyParams, DifficultyState};
pub use enemy::{Enemy, EnemyBehavior, EnemyHandle};
pub use events::{EventBus, GameEvent};
pub use generator::{Generator, PlatformSpan, Tier};
pub use hero::{DamageOutcome, Facing, Hero, HeroState};
pub use physics::{Aabb, Body, Bounds, Collidable};
pub use platform::{Platform, PlatformHandle};
pub use pool::{Handle, Pool, PoolStats, Poolable};
pub use state::{Camera, GamePhase, GameState, RunSummary};
pub use tick::{TickInput, TickReport, autopilot, tick};

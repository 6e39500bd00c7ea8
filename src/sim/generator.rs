//! Procedural tier generation with a reachability guarantee
//!
//! Tiers are built ahead of the camera and torn down once they are far
//! below it. Every tier above the ground has at least one platform whose
//! center is within jump range of a platform center in the tier beneath.
//!
//! The generator owns the entity pools; tiers hold only handles.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collectible::{Collectible, CollectibleHandle};
use super::difficulty::{self, DifficultyParams, DifficultyState};
use super::enemy::{Enemy, EnemyHandle};
use super::physics::Aabb;
use super::platform::{Platform, PlatformHandle};
use super::pool::Pool;
use crate::consts::JUMP_SAFETY_FACTOR;
use crate::lerp;
use crate::tuning::Tuning;

/// Horizontal scatter of collectibles around a platform center
const COLLECTIBLE_SCATTER: f32 = 30.0;
/// Horizontal scatter of trail collectibles
const TRAIL_SCATTER: f32 = 10.0;
/// Collectibles float this far above the walkable row
const COLLECTIBLE_LIFT: f32 = 30.0;
const GROUND_COLLECTIBLE_LIFT: f32 = 40.0;
/// Peak rise of the guiding trail arc
const TRAIL_ARC_HEIGHT: f32 = 50.0;
/// Three-platform tiers draw widths up to this share of the max width
const THREE_PLATFORM_WIDTH_SHARE: f32 = 0.7;

/// One horizontal slice of the climb
#[derive(Debug, Clone)]
pub struct Tier {
    pub index: u32,
    pub y: f32,
    pub platforms: Vec<PlatformHandle>,
    pub enemies: Vec<EnemyHandle>,
    pub collectibles: Vec<CollectibleHandle>,
}

/// Horizontal extent of a platform before it is placed in the world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpan {
    pub left: f32,
    pub width: f32,
}

impl PlatformSpan {
    pub fn new(left: f32, width: f32) -> Self {
        Self { left, width }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn center(&self) -> f32 {
        self.left + self.width / 2.0
    }

    fn of(platform: &Platform) -> Self {
        Self::new(platform.left, platform.width)
    }

    /// Keep the span inside the level
    fn clamp_to(mut self, level_width: f32) -> Self {
        self.width = self.width.min(level_width);
        self.left = self.left.clamp(0.0, level_width - self.width);
        self
    }
}

/// What a call to [`Generator::advance`] changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    pub built: u32,
    pub recycled: u32,
}

/// Entities returned to pools by a tier teardown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecycleReport {
    pub platforms: u32,
    pub enemies: u32,
    pub collectibles: u32,
}

/// Uniform width draw; a degenerate range yields its lower bound
fn draw_width(min: f32, max: f32, rng: &mut impl Rng) -> f32 {
    if max > min {
        rng.random_range(min..=max)
    } else {
        min
    }
}

fn jitter(amount: f32, rng: &mut impl Rng) -> f32 {
    if amount > 0.0 {
        rng.random_range(0.0..=amount)
    } else {
        0.0
    }
}

fn scatter(amount: f32, rng: &mut impl Rng) -> f32 {
    if amount > 0.0 {
        rng.random_range(-amount..=amount)
    } else {
        0.0
    }
}

/// Two platforms hugging opposite edges with jitter, gap in the middle
pub fn layout_two(widths: [f32; 2], tuning: &Tuning, rng: &mut impl Rng) -> [PlatformSpan; 2] {
    let level_width = tuning.level_width;
    let left = PlatformSpan::new(jitter(tuning.edge_jitter, rng), widths[0]).clamp_to(level_width);

    let hugging = level_width - widths[1] - jitter(tuning.edge_jitter, rng);
    let right_x = hugging.max(left.right() + tuning.min_platform_gap);
    let right = PlatformSpan::new(right_x, widths[1]).clamp_to(level_width);

    [left, right]
}

/// Left, center and right platforms with two gaps
///
/// The center window is derived from the placed outer platforms; when the
/// window is empty the center platform falls back to the level midpoint.
pub fn layout_three(widths: [f32; 3], tuning: &Tuning, rng: &mut impl Rng) -> [PlatformSpan; 3] {
    let level_width = tuning.level_width;
    let left = PlatformSpan::new(jitter(tuning.edge_jitter, rng), widths[0]).clamp_to(level_width);
    let right_x = level_width - widths[2] - jitter(tuning.edge_jitter, rng);
    let right = PlatformSpan::new(right_x, widths[2]).clamp_to(level_width);

    let window_min = left.right() + tuning.min_platform_gap;
    let window_max = right.left - widths[1] - tuning.min_platform_gap;
    let center_x = if window_max > window_min {
        rng.random_range(window_min..=window_max)
    } else {
        ((level_width - widths[1]) / 2.0).floor()
    };
    let center = PlatformSpan::new(center_x, widths[1]).clamp_to(level_width);

    [left, center, right]
}

/// Whether any (previous, new) pair of centers is within `threshold`
pub fn is_reachable(prev: &[PlatformSpan], new: &[PlatformSpan], threshold: f32) -> bool {
    prev.iter()
        .any(|p| new.iter().any(|n| (p.center() - n.center()).abs() <= threshold))
}

/// Guarantee at least one reachable pair between consecutive tiers
///
/// Checks every pair; if none is within `threshold`, the new platform of
/// the closest pair is moved so its center sits over the previous one.
/// Returns the index of the moved platform, if any.
pub fn enforce_reachability(
    prev: &[PlatformSpan],
    new: &mut [PlatformSpan],
    threshold: f32,
    level_width: f32,
) -> Option<usize> {
    if prev.is_empty() || new.is_empty() || is_reachable(prev, new, threshold) {
        return None;
    }

    let mut best: Option<(usize, f32, f32)> = None;
    for p in prev {
        for (i, n) in new.iter().enumerate() {
            let dist = (p.center() - n.center()).abs();
            if best.is_none_or(|(_, d, _)| dist < d) {
                best = Some((i, dist, p.center()));
            }
        }
    }
    let (index, _, target_center) = best?;

    let span = &mut new[index];
    *span = PlatformSpan::new(target_center - span.width / 2.0, span.width).clamp_to(level_width);

    // Clamping at a level edge can leave a wide platform off-center; narrow
    // it to its partner's width so the centers coincide.
    if (span.center() - target_center).abs() > threshold {
        let partner = prev
            .iter()
            .find(|p| p.center() == target_center)
            .map_or(span.width, |p| p.width);
        *span = PlatformSpan::new(target_center - partner / 2.0, partner).clamp_to(level_width);
    }

    Some(index)
}

/// Builds, streams and recycles tiers
#[derive(Debug)]
pub struct Generator {
    tuning: Tuning,
    tiers: BTreeMap<u32, Tier>,
    highest_tier_index: u32,
    max_jump_distance: f32,
    ground_y: f32,
    platforms: Pool<Platform>,
    enemies: Pool<Enemy>,
    collectibles: Pool<Collectible>,
}

impl Generator {
    pub fn new(tuning: &Tuning) -> Self {
        let max_jump_distance = tuning.max_jump_distance();
        log::debug!("Max jump distance: {:.1}", max_jump_distance);
        Self {
            tuning: tuning.clone(),
            tiers: BTreeMap::new(),
            highest_tier_index: 0,
            max_jump_distance,
            ground_y: tuning.ground_y(),
            platforms: Pool::new(),
            enemies: Pool::new(),
            collectibles: Pool::new(),
        }
    }

    /// Center-to-center distance that counts as reachable
    pub fn reach_threshold(&self) -> f32 {
        self.max_jump_distance * JUMP_SAFETY_FACTOR
    }

    pub fn max_jump_distance(&self) -> f32 {
        self.max_jump_distance
    }

    pub fn ground_y(&self) -> f32 {
        self.ground_y
    }

    pub fn highest_tier_index(&self) -> u32 {
        self.highest_tier_index
    }

    pub fn tiers(&self) -> impl Iterator<Item = &Tier> {
        self.tiers.values()
    }

    pub fn tier(&self, index: u32) -> Option<&Tier> {
        self.tiers.get(&index)
    }

    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    pub fn platform(&self, handle: PlatformHandle) -> Option<&Platform> {
        self.platforms.get(handle)
    }

    pub fn platforms(&self) -> &Pool<Platform> {
        &self.platforms
    }

    pub fn enemies(&self) -> &Pool<Enemy> {
        &self.enemies
    }

    pub fn collectibles(&self) -> &Pool<Collectible> {
        &self.collectibles
    }

    pub fn collectibles_mut(&mut self) -> &mut Pool<Collectible> {
        &mut self.collectibles
    }

    /// Spans of a tier's live platforms
    pub fn tier_spans(&self, index: u32) -> Vec<PlatformSpan> {
        self.tiers
            .get(&index)
            .map(|tier| {
                tier.platforms
                    .iter()
                    .filter_map(|h| self.platforms.get(*h))
                    .map(PlatformSpan::of)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Build the ground plus the first tiers above it
    pub fn generate_initial(&mut self, difficulty: &mut DifficultyState, rng: &mut impl Rng) {
        let ground_y = self.ground_y;
        self.build_ground(ground_y);

        let count = self.tuning.initial_tiers;
        for index in 1..=count {
            let y = ground_y - index as f32 * self.tuning.base_vertical_gap;
            self.build_tier(index, y, rng);
        }
        self.highest_tier_index = count;
        difficulty.set_tier(count);
        log::info!("Initial world built: {} tiers above ground", count);
    }

    /// Permanent full-width floor, no enemies
    fn build_ground(&mut self, y: f32) {
        let tile_size = self.tuning.tile_size;
        let width = self.tuning.level_width;
        let platform = self
            .platforms
            .acquire(|p| p.place(0.0, y, width, tile_size, 0));

        let count = self.tuning.collectibles_per_tier;
        let spacing = (width - 200.0) / count.saturating_sub(1).max(1) as f32;
        let collectibles = (0..count)
            .map(|i| {
                let x = (100.0 + i as f32 * spacing).clamp(0.0, width);
                let pos = Vec2::new(x, y - tile_size - GROUND_COLLECTIBLE_LIFT);
                self.collectibles.acquire(|c| c.spawn(pos, 1.0, 0))
            })
            .collect();

        self.tiers.insert(
            0,
            Tier {
                index: 0,
                y,
                platforms: vec![platform],
                enemies: Vec::new(),
                collectibles,
            },
        );
    }

    /// Build one tier at `y`, repairing reachability against the tier below
    pub fn build_tier(&mut self, index: u32, y: f32, rng: &mut impl Rng) {
        let params = difficulty::evaluate(index, &self.tuning);
        let mut spans = self.draw_layout(&params, rng);

        let prev = index.checked_sub(1).map(|i| self.tier_spans(i)).unwrap_or_default();
        if let Some(moved) = enforce_reachability(
            &prev,
            &mut spans,
            self.reach_threshold(),
            self.tuning.level_width,
        ) {
            log::debug!("Tier {}: moved platform {} into jump range", index, moved);
        }

        let tile_size = self.tuning.tile_size;
        let platforms: Vec<PlatformHandle> = spans
            .iter()
            .map(|span| {
                self.platforms
                    .acquire(|p| p.place(span.left, y, span.width, tile_size, index))
            })
            .collect();

        let mut enemies = Vec::new();
        for &handle in &platforms {
            let Some(platform) = self.platforms.get(handle) else {
                continue;
            };
            for _ in 0..params.enemies_per_platform {
                let enemy = self
                    .enemies
                    .acquire(|e| e.spawn(handle, platform, params.enemy_speed, rng));
                enemies.push(enemy);
            }
        }

        let collectibles = self.spawn_collectibles(index, y, &spans, &params, rng);

        log::debug!(
            "Tier {} at y={:.0}: {} platforms, {} enemies, {} collectibles",
            index,
            y,
            platforms.len(),
            enemies.len(),
            collectibles.len()
        );

        self.tiers.insert(
            index,
            Tier {
                index,
                y,
                platforms,
                enemies,
                collectibles,
            },
        );
    }

    fn draw_layout(&self, params: &DifficultyParams, rng: &mut impl Rng) -> Vec<PlatformSpan> {
        let min = params.platform_min_width;
        let max = params.platform_max_width;
        if rng.random_bool(f64::from(params.three_platform_probability)) {
            let narrow_max = min.max((max * THREE_PLATFORM_WIDTH_SHARE).floor());
            let widths = [
                draw_width(min, narrow_max, rng),
                draw_width(min, narrow_max, rng),
                draw_width(min, narrow_max, rng),
            ];
            layout_three(widths, &self.tuning, rng).to_vec()
        } else {
            let widths = [draw_width(min, max, rng), draw_width(min, max, rng)];
            layout_two(widths, &self.tuning, rng).to_vec()
        }
    }

    /// Collectibles sit above platforms, plus a short guiding trail between
    /// the first pair of platforms within jump range of each other
    fn spawn_collectibles(
        &mut self,
        index: u32,
        y: f32,
        spans: &[PlatformSpan],
        params: &DifficultyParams,
        rng: &mut impl Rng,
    ) -> Vec<CollectibleHandle> {
        let mut handles = Vec::new();
        if spans.is_empty() {
            return handles;
        }
        let width = self.tuning.level_width;
        let row_y = y - self.tuning.tile_size - COLLECTIBLE_LIFT;
        let multiplier = params.collectible_multiplier;

        for i in 0..self.tuning.collectibles_per_tier as usize {
            let span = spans[i % spans.len()];
            let x = (span.center() + scatter(COLLECTIBLE_SCATTER, rng))
                .clamp(span.left, span.right());
            let pos = Vec2::new(x, row_y);
            handles.push(self.collectibles.acquire(|c| c.spawn(pos, multiplier, index)));
        }

        let threshold = self.reach_threshold();
        let pair = spans.iter().enumerate().find_map(|(a, span_a)| {
            spans[a + 1..]
                .iter()
                .find(|span_b| (span_a.center() - span_b.center()).abs() < threshold)
                .map(|span_b| (span_a.center(), span_b.center()))
        });

        if let Some((from, to)) = pair {
            let steps = self.tuning.trail_length;
            for s in 1..=steps {
                let t = s as f32 / (steps + 1) as f32;
                let x = (lerp(from, to, t) + scatter(TRAIL_SCATTER, rng)).clamp(0.0, width);
                let pos = Vec2::new(x, row_y - (t * TRAIL_ARC_HEIGHT).floor());
                handles.push(self.collectibles.acquire(|c| c.spawn(pos, multiplier, index)));
            }
        }

        handles
    }

    /// Stream tiers in above the camera and recycle those far below it
    ///
    /// `camera_top` is the y of the topmost visible line.
    pub fn advance(
        &mut self,
        camera_top: f32,
        difficulty: &mut DifficultyState,
        rng: &mut impl Rng,
    ) -> AdvanceReport {
        let mut report = AdvanceReport::default();
        let lookahead_line =
            camera_top - self.tuning.lookahead_gaps * self.tuning.base_vertical_gap;

        loop {
            let highest_y = self.highest_tier_y();
            if highest_y <= lookahead_line {
                break;
            }
            // Gap comes from the difficulty reached so far, not the tier's original spacing
            let gap = difficulty.params(&self.tuning).vertical_gap;
            let next = self.highest_tier_index + 1;
            self.build_tier(next, highest_y - gap, rng);
            self.highest_tier_index = next;
            difficulty.set_tier(next);
            report.built += 1;
        }

        let threshold = camera_top + self.tuning.recycle_distance;
        let expired: Vec<u32> = self
            .tiers
            .values()
            .filter(|tier| tier.index != 0 && tier.y > threshold)
            .map(|tier| tier.index)
            .collect();
        for index in expired {
            if let Some(tier) = self.tiers.remove(&index) {
                let released = self.recycle_tier(&tier);
                log::debug!("Recycled tier {}: {:?}", index, released);
                report.recycled += 1;
            }
        }

        report
    }

    fn highest_tier_y(&self) -> f32 {
        match self.tiers.get(&self.highest_tier_index) {
            Some(tier) => tier.y,
            None => self.ground_y - self.highest_tier_index as f32 * self.tuning.base_vertical_gap,
        }
    }

    /// Return a tier's entities to their pools
    ///
    /// Entities already released by another path are skipped.
    fn recycle_tier(&mut self, tier: &Tier) -> RecycleReport {
        let mut report = RecycleReport::default();
        for &h in &tier.enemies {
            report.enemies += u32::from(self.enemies.release(h));
        }
        for &h in &tier.collectibles {
            report.collectibles += u32::from(self.collectibles.release(h));
        }
        for &h in &tier.platforms {
            report.platforms += u32::from(self.platforms.release(h));
        }
        report
    }

    /// Tear everything down (ground included) and rebuild from scratch
    pub fn reset(&mut self, difficulty: &mut DifficultyState, rng: &mut impl Rng) {
        let tiers = std::mem::take(&mut self.tiers);
        for tier in tiers.values() {
            self.recycle_tier(tier);
        }
        let stray = self.platforms.release_all()
            + self.enemies.release_all()
            + self.collectibles.release_all();
        if stray > 0 {
            log::warn!("Reset released {} entities not owned by any tier", stray);
        }
        self.highest_tier_index = 0;
        difficulty.reset();
        self.generate_initial(difficulty, rng);
    }

    /// Tier index at the hero's altitude, for reporting only
    pub fn hero_tier(&self, hero_y: f32) -> i32 {
        ((self.ground_y - hero_y) / self.tuning.base_vertical_gap).floor() as i32
    }

    /// Advance every active enemy
    ///
    /// An enemy whose home platform is gone is returned to its pool instead
    /// of walking on a recycled strip.
    pub fn update_enemies(&mut self, hero_pos: Vec2, rng: &mut impl Rng, dt: f32) {
        let chase_band = self.tuning.enemy_chase_band;
        let mut orphans = Vec::new();
        for (handle, enemy) in self.enemies.all_active_mut() {
            if !enemy.home.is_some_and(|h| self.platforms.is_live(h)) {
                orphans.push(handle);
                continue;
            }
            enemy.update(hero_pos, chase_band, rng, dt);
        }
        for handle in orphans {
            log::warn!("Enemy {:?} lost its platform", handle);
            self.enemies.release(handle);
        }
    }

    /// Advance collect animations and pool the finished ones
    pub fn update_collectibles(&mut self, dt: f32) -> u32 {
        let finished: Vec<CollectibleHandle> = self
            .collectibles
            .all_active_mut()
            .filter_map(|(h, c)| c.update(dt).then_some(h))
            .collect();
        finished
            .into_iter()
            .map(|h| u32::from(self.collectibles.release(h)))
            .sum()
    }

    /// Platform tiles within `reach` of a point, for contact resolution
    pub fn solids_near(&self, pos: Vec2, reach: f32) -> Vec<Aabb> {
        self.platforms
            .all_active()
            .map(|(_, p)| p)
            .filter(|p| {
                let bounds = p.collision_box();
                pos.y + reach >= bounds.min.y
                    && pos.y - reach <= bounds.max.y
                    && pos.x + reach >= bounds.min.x
                    && pos.x - reach <= bounds.max.x
            })
            .flat_map(|p| p.tiles())
            .collect()
    }
}

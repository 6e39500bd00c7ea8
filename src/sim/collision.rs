//! Contact semantics
//!
//! Broad-phase overlap is a plain yes/no from the physics layer. This
//! module decides what an overlap means: stomp or damage for enemies,
//! pickup for collectibles, and recovery for a hero that fell out of view.

use glam::Vec2;

use super::collectible::Collectible;
use super::enemy::Enemy;
use super::generator::Generator;
use super::hero::{DamageOutcome, Hero};
use super::physics::{Body, Collidable};
use super::pool::Pool;
use crate::consts::{STOMP_BOUNCE, STOMP_TOLERANCE};
use crate::tuning::Tuning;

/// Outcome of one hero-enemy overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyContact {
    /// No overlap, or the hero is untouchable right now
    None,
    /// Hero bounced off the enemy; the enemy survives
    Stomp,
    Damage(DamageOutcome),
}

/// What contact resolution changed during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub stomps: u32,
    /// Score after each pickup, in pickup order
    pub scores: Vec<u64>,
    /// New life count, if any damage landed
    pub lives: Option<u32>,
    pub died: bool,
}

impl CollisionReport {
    fn record_damage(&mut self, outcome: DamageOutcome) {
        match outcome {
            DamageOutcome::Ignored => {}
            DamageOutcome::Hurt { lives } => self.lives = Some(lives),
            DamageOutcome::Died { lives } => {
                self.lives = Some(lives);
                self.died = true;
            }
        }
    }
}

/// Hero's feet above the enemy's top (within tolerance) while moving down
pub fn is_stomp(hero: &Body, enemy: &Body, falling: bool) -> bool {
    falling && hero.aabb().max.y < enemy.aabb().min.y + STOMP_TOLERANCE
}

/// Classify and apply a single hero-enemy overlap
///
/// `falling` is sampled once per tick so a bounce off the first of two
/// overlapping enemies does not turn the second into a hit.
pub fn resolve_enemy(hero: &mut Hero, enemy: &Enemy, falling: bool, tuning: &Tuning) -> EnemyContact {
    if hero.invulnerable || hero.is_dead() || !hero.overlaps(enemy) {
        return EnemyContact::None;
    }
    if is_stomp(&hero.body, &enemy.body, falling) {
        hero.bounce(STOMP_BOUNCE);
        EnemyContact::Stomp
    } else {
        EnemyContact::Damage(hero.take_damage(tuning))
    }
}

/// Award a collectible's value at most once; returns the new score
pub fn resolve_pickup(hero: &mut Hero, collectible: &mut Collectible) -> Option<u64> {
    if hero.is_dead() || !hero.overlaps(collectible) {
        return None;
    }
    let points = collectible.collect()?;
    Some(hero.add_score(points))
}

/// Resolve every hero overlap against the generator's live entities
pub fn resolve_contacts(hero: &mut Hero, generator: &mut Generator, tuning: &Tuning) -> CollisionReport {
    let mut report = CollisionReport::default();
    let falling = hero.body.vel.y > 0.0;

    resolve_enemies(hero, generator.enemies(), falling, tuning, &mut report);
    resolve_pickups(hero, generator.collectibles_mut(), &mut report);

    report
}

fn resolve_enemies(
    hero: &mut Hero,
    enemies: &Pool<Enemy>,
    falling: bool,
    tuning: &Tuning,
    report: &mut CollisionReport,
) {
    for (_, enemy) in enemies.all_active() {
        match resolve_enemy(hero, enemy, falling, tuning) {
            EnemyContact::None => {}
            EnemyContact::Stomp => report.stomps += 1,
            EnemyContact::Damage(outcome) => report.record_damage(outcome),
        }
    }
}

fn resolve_pickups(hero: &mut Hero, collectibles: &mut Pool<Collectible>, report: &mut CollisionReport) {
    for (_, collectible) in collectibles.all_active_mut() {
        if let Some(score) = resolve_pickup(hero, collectible) {
            report.scores.push(score);
        }
    }
}

/// Recover a hero that dropped out of view: one damage increment, then a
/// teleport to the middle of the screen
///
/// Returns the damage outcome when the fall limit was crossed.
pub fn recover_fall(hero: &mut Hero, camera_top: f32, tuning: &Tuning) -> Option<DamageOutcome> {
    let fall_limit = camera_top + tuning.view_height + tuning.fall_margin;
    if hero.is_dead() || hero.pos().y <= fall_limit {
        return None;
    }
    let outcome = hero.take_damage(tuning);
    let safe = Vec2::new(tuning.level_width / 2.0, camera_top + tuning.view_height / 2.0);
    log::debug!("Hero fell below {:.0}; respawning at {:?}", fall_limit, safe);
    hero.teleport(safe);
    Some(outcome)
}

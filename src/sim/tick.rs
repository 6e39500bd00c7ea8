//! Fixed-timestep tick
//!
//! One call advances the whole world by `dt` in a fixed order: hero,
//! camera, generator, enemies, contacts, despawns, fall check, timers.
//! Nothing here publishes events; the returned [`TickReport`] says what
//! changed and the caller turns that into notifications.

use glam::Vec2;

use super::collision::{recover_fall, resolve_contacts};
use super::hero::DamageOutcome;
use super::state::{GamePhase, GameState};
use crate::consts::*;

/// Semantic input for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Edge-triggered jump request
    pub jump: bool,
}

/// Observable changes from one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Score after each mutation this tick
    pub scores: Vec<u64>,
    pub lives: Option<u32>,
    pub tiers_built: u32,
    pub tiers_recycled: u32,
    pub stomps: u32,
    /// Death delay elapsed this tick
    pub game_over: bool,
}

/// Reach used when gathering platform tiles around the hero
const CONTACT_REACH: f32 = 128.0;

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> TickReport {
    let mut report = TickReport::default();
    if state.phase == GamePhase::GameOver {
        return report;
    }
    state.time_ticks += 1;

    state.hero.update(input, &state.tuning);
    let solids = state.generator.solids_near(state.hero.pos(), CONTACT_REACH);
    state.hero.step(&solids, &state.tuning, dt);

    state.camera.follow(state.hero.pos().y, &state.tuning);

    let advanced = state
        .generator
        .advance(state.camera.top, &mut state.difficulty, &mut state.rng);
    report.tiers_built = advanced.built;
    report.tiers_recycled = advanced.recycled;

    state
        .generator
        .update_enemies(state.hero.pos(), &mut state.rng, dt);

    let contacts = resolve_contacts(&mut state.hero, &mut state.generator, &state.tuning);
    report.stomps = contacts.stomps;
    report.scores = contacts.scores;
    report.lives = contacts.lives;

    state.generator.update_collectibles(dt);

    if let Some(DamageOutcome::Hurt { lives } | DamageOutcome::Died { lives }) =
        recover_fall(&mut state.hero, state.camera.top, &state.tuning)
    {
        report.lives = Some(lives);
    }

    if state.hero.tick_timers(dt) {
        state.phase = GamePhase::GameOver;
        report.game_over = true;
        log::info!(
            "Game over after {} ticks: score {}",
            state.time_ticks,
            state.hero.score
        );
    }

    report
}

/// Simple climbing bot for demos and soak runs
///
/// Steers toward the nearest platform above the hero's feet, jumps from
/// the ground once roughly lined up, and double jumps near the apex.
pub fn autopilot(state: &GameState) -> TickInput {
    let hero = &state.hero;
    let pos = hero.pos();
    let feet = hero.body.aabb().max.y;
    let reach = state.generator.reach_threshold();

    let target = state
        .generator
        .platforms()
        .all_active()
        .map(|(_, p)| p)
        .filter(|p| p.top_y() < feet - 1.0 && p.top_y() > feet - BASE_VERTICAL_GAP * 1.5)
        .min_by(|a, b| {
            let da = (a.center_x() - pos.x).abs();
            let db = (b.center_x() - pos.x).abs();
            da.total_cmp(&db)
        })
        .map(|p| Vec2::new(p.center_x(), p.top_y()));

    let Some(target) = target else {
        return TickInput::default();
    };

    let dx = target.x - pos.x;
    let mut input = TickInput {
        move_left: dx < -HERO_BODY_WIDTH,
        move_right: dx > HERO_BODY_WIDTH,
        jump: false,
    };

    if hero.on_ground() {
        input.jump = dx.abs() < reach * 0.5;
    } else if !hero.has_double_jumped && hero.body.vel.y > -50.0 && pos.y > target.y {
        input.jump = true;
    }
    input
}

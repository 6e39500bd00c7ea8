//! The player character
//!
//! Input-driven motion with a double jump, plus the lives/score/damage
//! state machine. The hero never publishes events itself; mutators return
//! what changed and the game state turns that into outbound events.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::{Aabb, Body, Bounds, Collidable};
use super::tick::TickInput;
use crate::consts::*;
use crate::tuning::Tuning;

/// Movement/animation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeroState {
    #[default]
    Idle,
    Running,
    Jumping,
    Falling,
    Hurt,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Result of a damage attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invulnerable or already dead
    Ignored,
    Hurt { lives: u32 },
    Died { lives: u32 },
}

/// Horizontal speed below which the hero counts as standing still
const RUN_THRESHOLD: f32 = 10.0;
/// Alpha while the hurt flash is in its dim half-period
const FLASH_ALPHA: f32 = 0.3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hero {
    pub body: Body,
    pub lives: u32,
    pub max_lives: u32,
    pub score: u64,
    pub state: HeroState,
    pub facing: Facing,
    pub can_double_jump: bool,
    pub has_double_jumped: bool,
    pub invulnerable: bool,
    hurt_timer: f32,
    invulnerable_timer: f32,
    flash_timer: f32,
    death_timer: Option<f32>,
    game_over_raised: bool,
}

impl Hero {
    pub fn new(pos: Vec2, tuning: &Tuning) -> Self {
        Self {
            body: Body::dynamic(pos, Bounds::rect(HERO_BODY_WIDTH, HERO_BODY_HEIGHT)),
            lives: tuning.start_lives,
            max_lives: tuning.start_lives,
            score: 0,
            state: HeroState::Idle,
            facing: Facing::Right,
            can_double_jump: false,
            has_double_jumped: false,
            invulnerable: false,
            hurt_timer: 0.0,
            invulnerable_timer: 0.0,
            flash_timer: 0.0,
            death_timer: None,
            game_over_raised: false,
        }
    }

    /// Reinitialise everything for a new run
    pub fn reset(&mut self, pos: Vec2, tuning: &Tuning) {
        *self = Self::new(pos, tuning);
    }

    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    pub fn is_dead(&self) -> bool {
        self.state == HeroState::Dead
    }

    pub fn on_ground(&self) -> bool {
        self.body.blocked_down
    }

    /// Apply semantic input to velocity
    pub fn update(&mut self, input: &TickInput, tuning: &Tuning) {
        if self.is_dead() {
            return;
        }

        let on_ground = self.on_ground();
        if on_ground {
            self.land();
        }

        // No inertia: no input means no horizontal motion
        self.body.vel.x = match (input.move_left, input.move_right) {
            (true, false) => {
                self.facing = Facing::Left;
                -tuning.hero_speed
            }
            (false, true) => {
                self.facing = Facing::Right;
                tuning.hero_speed
            }
            _ => 0.0,
        };

        if input.jump {
            if on_ground {
                self.body.vel.y = -tuning.jump_velocity;
                self.can_double_jump = true;
                self.has_double_jumped = false;
            } else if self.can_double_jump && !self.has_double_jumped {
                self.body.vel.y = -tuning.double_jump_velocity;
                self.has_double_jumped = true;
                self.can_double_jump = false;
            }
        }
    }

    /// Integrate gravity and resolve contact with platform tiles
    pub fn step(&mut self, solids: &[Aabb], tuning: &Tuning, dt: f32) {
        if self.is_dead() {
            return;
        }
        self.body.integrate(tuning.gravity, dt);
        self.body.move_and_collide(solids, dt);
        if self.on_ground() {
            self.land();
        }
        self.refresh_state();
    }

    fn land(&mut self) {
        self.can_double_jump = true;
        self.has_double_jumped = false;
    }

    fn refresh_state(&mut self) {
        if matches!(self.state, HeroState::Hurt | HeroState::Dead) {
            return;
        }
        self.state = if !self.on_ground() {
            if self.body.vel.y < 0.0 {
                HeroState::Jumping
            } else {
                HeroState::Falling
            }
        } else if self.body.vel.x.abs() > RUN_THRESHOLD {
            HeroState::Running
        } else {
            HeroState::Idle
        };
    }

    /// Lose a life unless invulnerable or dead
    pub fn take_damage(&mut self, tuning: &Tuning) -> DamageOutcome {
        if self.invulnerable || self.is_dead() {
            return DamageOutcome::Ignored;
        }

        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.die(tuning);
            return DamageOutcome::Died { lives: self.lives };
        }

        self.state = HeroState::Hurt;
        self.hurt_timer = tuning.hurt_duration;
        self.invulnerable = true;
        self.invulnerable_timer = tuning.invulnerability_time;
        self.flash_timer = HURT_FLASH_DURATION;
        DamageOutcome::Hurt { lives: self.lives }
    }

    fn die(&mut self, tuning: &Tuning) {
        self.state = HeroState::Dead;
        self.body.vel = Vec2::ZERO;
        self.body.gravity = false;
        self.hurt_timer = 0.0;
        self.flash_timer = 0.0;
        self.death_timer = Some(tuning.death_delay);
    }

    /// Count down transient timers
    ///
    /// Returns true exactly once per run: when the death delay elapses.
    pub fn tick_timers(&mut self, dt: f32) -> bool {
        if self.hurt_timer > 0.0 {
            self.hurt_timer = (self.hurt_timer - dt).max(0.0);
            if self.hurt_timer == 0.0 && self.state == HeroState::Hurt {
                self.state = HeroState::Idle;
                self.refresh_state();
            }
        }
        if self.invulnerable_timer > 0.0 {
            self.invulnerable_timer = (self.invulnerable_timer - dt).max(0.0);
            if self.invulnerable_timer == 0.0 {
                self.invulnerable = false;
            }
        }
        if self.flash_timer > 0.0 {
            self.flash_timer = (self.flash_timer - dt).max(0.0);
        }

        if let Some(timer) = self.death_timer.as_mut() {
            *timer = (*timer - dt).max(0.0);
            if *timer == 0.0 && !self.game_over_raised {
                self.game_over_raised = true;
                return true;
            }
        }
        false
    }

    /// Add points; returns the new score
    pub fn add_score(&mut self, points: u32) -> u64 {
        self.score += u64::from(points);
        self.score
    }

    /// Upward bounce off a stomped enemy
    pub fn bounce(&mut self, speed: f32) {
        self.body.vel.y = -speed;
    }

    /// Move to a safe spot with no velocity
    pub fn teleport(&mut self, pos: Vec2) {
        self.body.pos = pos;
        self.body.vel = Vec2::ZERO;
        self.body.blocked_down = false;
    }

    /// Sprite alpha for the hurt flash cue
    pub fn alpha(&self) -> f32 {
        if self.flash_timer <= 0.0 {
            return 1.0;
        }
        let elapsed = HURT_FLASH_DURATION - self.flash_timer;
        if ((elapsed / HURT_FLASH_PERIOD) as u32).is_multiple_of(2) {
            FLASH_ALPHA
        } else {
            1.0
        }
    }
}

impl Collidable for Hero {
    fn body(&self) -> &Body {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> Vec<Aabb> {
        vec![Aabb::new(Vec2::new(0.0, 500.0), Vec2::new(1024.0, 532.0))]
    }

    fn grounded_hero(tuning: &Tuning) -> Hero {
        let mut hero = Hero::new(Vec2::new(512.0, 470.0), tuning);
        // Settle onto the floor
        for _ in 0..10 {
            hero.update(&TickInput::default(), tuning);
            hero.step(&floor(), tuning, SIM_DT);
        }
        assert!(hero.on_ground());
        hero
    }

    fn jump() -> TickInput {
        TickInput {
            jump: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_horizontal_has_no_inertia() {
        let tuning = Tuning::default();
        let mut hero = grounded_hero(&tuning);
        let right = TickInput {
            move_right: true,
            ..Default::default()
        };
        hero.update(&right, &tuning);
        hero.step(&floor(), &tuning, SIM_DT);
        assert_eq!(hero.body.vel.x, tuning.hero_speed);
        assert_eq!(hero.state, HeroState::Running);
        hero.update(&TickInput::default(), &tuning);
        assert_eq!(hero.body.vel.x, 0.0);
        assert_eq!(hero.facing, Facing::Right);
    }

    #[test]
    fn test_double_jump_once_per_ground_contact() {
        let tuning = Tuning::default();
        let mut hero = grounded_hero(&tuning);

        hero.update(&jump(), &tuning);
        assert_eq!(hero.body.vel.y, -tuning.jump_velocity);
        hero.step(&floor(), &tuning, SIM_DT);
        assert_eq!(hero.state, HeroState::Jumping);

        hero.update(&jump(), &tuning);
        assert_eq!(hero.body.vel.y, -tuning.double_jump_velocity);
        assert!(hero.has_double_jumped);
        hero.step(&floor(), &tuning, SIM_DT);

        // Third press in the air does nothing
        let vy = hero.body.vel.y;
        hero.update(&jump(), &tuning);
        assert_eq!(hero.body.vel.y, vy);

        // Fall back down and land: double jump re-arms
        for _ in 0..240 {
            hero.update(&TickInput::default(), &tuning);
            hero.step(&floor(), &tuning, SIM_DT);
        }
        assert!(hero.on_ground());
        assert!(hero.can_double_jump);
        assert!(!hero.has_double_jumped);
    }

    #[test]
    fn test_damage_then_invulnerable() {
        let tuning = Tuning::default();
        let mut hero = grounded_hero(&tuning);
        assert_eq!(hero.take_damage(&tuning), DamageOutcome::Hurt { lives: 9 });
        assert_eq!(hero.state, HeroState::Hurt);
        assert_eq!(hero.take_damage(&tuning), DamageOutcome::Ignored);
        assert_eq!(hero.lives, 9);

        // Hurt state ends before invulnerability does
        let mut t = 0.0;
        while t < tuning.hurt_duration + 0.05 {
            hero.tick_timers(SIM_DT);
            t += SIM_DT;
        }
        assert_ne!(hero.state, HeroState::Hurt);
        assert!(hero.invulnerable);

        while t < tuning.invulnerability_time + 0.05 {
            hero.tick_timers(SIM_DT);
            t += SIM_DT;
        }
        assert!(!hero.invulnerable);
        assert_eq!(hero.take_damage(&tuning), DamageOutcome::Hurt { lives: 8 });
    }

    #[test]
    fn test_last_life_dies_and_raises_game_over_once() {
        let tuning = Tuning::default();
        let mut hero = grounded_hero(&tuning);
        hero.lives = 1;
        hero.add_score(120);
        assert_eq!(hero.take_damage(&tuning), DamageOutcome::Died { lives: 0 });
        assert!(hero.is_dead());
        assert!(!hero.body.gravity);
        assert_eq!(hero.body.vel, Vec2::ZERO);
        assert_eq!(hero.take_damage(&tuning), DamageOutcome::Ignored);
        assert_eq!(hero.lives, 0);

        let mut raised = 0;
        for _ in 0..600 {
            if hero.tick_timers(SIM_DT) {
                raised += 1;
            }
        }
        assert_eq!(raised, 1);
        assert_eq!(hero.score, 120);
    }

    #[test]
    fn test_dead_hero_ignores_input() {
        let tuning = Tuning::default();
        let mut hero = grounded_hero(&tuning);
        hero.lives = 1;
        hero.take_damage(&tuning);
        let pos = hero.pos();
        hero.update(&jump(), &tuning);
        hero.step(&floor(), &tuning, SIM_DT);
        assert_eq!(hero.pos(), pos);
    }

    #[test]
    fn test_flash_alpha_toggles() {
        let tuning = Tuning::default();
        let mut hero = grounded_hero(&tuning);
        assert_eq!(hero.alpha(), 1.0);
        hero.take_damage(&tuning);
        assert_eq!(hero.alpha(), FLASH_ALPHA);
        hero.tick_timers(0.15);
        assert_eq!(hero.alpha(), 1.0);
        hero.tick_timers(5.0);
        assert_eq!(hero.alpha(), 1.0);
    }

    #[test]
    fn test_reset_restores_start_of_run() {
        let tuning = Tuning::default();
        let mut hero = grounded_hero(&tuning);
        hero.add_score(50);
        hero.lives = 1;
        hero.take_damage(&tuning);
        hero.reset(Vec2::new(10.0, 20.0), &tuning);
        assert_eq!(hero.lives, tuning.start_lives);
        assert_eq!(hero.score, 0);
        assert_eq!(hero.state, HeroState::Idle);
        assert!(hero.body.gravity);
        assert!(!hero.invulnerable);
        assert_eq!(hero.pos(), Vec2::new(10.0, 20.0));
    }
}

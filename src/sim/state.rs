//! Run orchestration
//!
//! [`GameState`] owns one of everything (hero, generator, difficulty,
//! camera, RNG) and is the only producer of outbound events. Frames of
//! arbitrary length are split into fixed ticks.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyState;
use super::events::{EventBus, GameEvent};
use super::generator::Generator;
use super::hero::Hero;
use super::tick::{TickInput, tick};
use crate::consts::*;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Playing,
    GameOver,
}

/// Vertical-only follow camera that never scrolls back down
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Y of the topmost visible line
    pub top: f32,
}

impl Camera {
    /// Camera top that puts the hero `camera_offset` below the view center
    pub fn target_top(hero_y: f32, tuning: &Tuning) -> f32 {
        hero_y - tuning.camera_offset - tuning.view_height / 2.0
    }

    pub fn snapped(hero_y: f32, tuning: &Tuning) -> Self {
        Self {
            top: Self::target_top(hero_y, tuning),
        }
    }

    /// Ease toward the hero, upward only
    pub fn follow(&mut self, hero_y: f32, tuning: &Tuning) {
        let target = Self::target_top(hero_y, tuning);
        let eased = self.top + (target - self.top) * tuning.camera_lerp;
        self.top = self.top.min(eased);
    }
}

/// Serializable snapshot of a run, for HUDs and the headless runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub ticks: u64,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u32,
    pub hero_tier: i32,
    pub highest_tier_built: u32,
    pub tiers_retained: usize,
    pub active_platforms: usize,
    pub active_enemies: usize,
    pub active_collectibles: usize,
}

/// Complete state of one run
#[derive(Debug)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    pub hero: Hero,
    pub generator: Generator,
    pub difficulty: DifficultyState,
    pub camera: Camera,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    accumulator: f32,
    /// Jump pressed during a frame that ran no tick yet
    pending_jump: bool,
}

impl GameState {
    /// Build a fresh run and announce it on `events`
    pub fn new(seed: u64, tuning: Tuning, events: &mut EventBus) -> Self {
        let tuning = tuning.sanitized();
        let hero = Hero::new(Self::hero_start(&tuning), &tuning);
        let camera = Camera::snapped(hero.pos().y, &tuning);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            generator: Generator::new(&tuning),
            difficulty: DifficultyState::default(),
            hero,
            camera,
            tuning,
            phase: GamePhase::Playing,
            time_ticks: 0,
            accumulator: 0.0,
            pending_jump: false,
        };
        state
            .generator
            .generate_initial(&mut state.difficulty, &mut state.rng);
        log::info!("New run (seed {})", seed);
        state.announce(events);
        state
    }

    /// Hero spawn point, standing clear above the ground tier
    pub fn hero_start(tuning: &Tuning) -> Vec2 {
        Vec2::new(
            tuning.level_width / 2.0,
            tuning.ground_y() - tuning.tile_size - 30.0,
        )
    }

    fn announce(&self, events: &mut EventBus) {
        events.publish(GameEvent::GameStart);
        events.publish(GameEvent::LivesChange(self.hero.lives));
        events.publish(GameEvent::ScoreChange(self.hero.score));
    }

    /// Tear the whole world down and start over from the ground
    pub fn restart(&mut self, events: &mut EventBus) {
        self.generator.reset(&mut self.difficulty, &mut self.rng);
        self.hero.reset(Self::hero_start(&self.tuning), &self.tuning);
        self.camera = Camera::snapped(self.hero.pos().y, &self.tuning);
        self.phase = GamePhase::Playing;
        self.time_ticks = 0;
        self.accumulator = 0.0;
        self.pending_jump = false;
        log::info!("Run restarted");
        self.announce(events);
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Current tier of the hero, as reported to the HUD
    pub fn hero_tier(&self) -> i32 {
        self.generator.hero_tier(self.hero.pos().y)
    }

    /// Advance by one rendered frame
    ///
    /// The frame delta is clamped and split into fixed ticks. Movement is
    /// held for every tick; a jump press is consumed by the first tick that
    /// runs. Publishes `levelChange` once per call while the run is live.
    pub fn update(&mut self, frame_dt: f32, input: &TickInput, events: &mut EventBus) {
        if self.is_over() {
            return;
        }
        self.pending_jump |= input.jump;
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let step_input = TickInput {
                jump: std::mem::take(&mut self.pending_jump),
                ..input.clone()
            };
            let report = tick(self, &step_input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            if let Some(lives) = report.lives {
                events.publish(GameEvent::LivesChange(lives));
            }
            for &score in &report.scores {
                events.publish(GameEvent::ScoreChange(score));
            }
            if report.game_over {
                events.publish(GameEvent::GameOver(self.hero.score));
                self.accumulator = 0.0;
                return;
            }
        }

        // Drop time we could not simulate rather than spiral
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        events.publish(GameEvent::LevelChange(self.hero_tier()));
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            seed: self.seed,
            ticks: self.time_ticks,
            phase: self.phase,
            score: self.hero.score,
            lives: self.hero.lives,
            hero_tier: self.hero_tier(),
            highest_tier_built: self.generator.highest_tier_index(),
            tiers_retained: self.generator.tier_count(),
            active_platforms: self.generator.platforms().active_count(),
            active_enemies: self.generator.enemies().active_count(),
            active_collectibles: self.generator.collectibles().active_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hero::HeroState;
    use crate::sim::tick::autopilot;

    const FRAME: f32 = 1.0 / 60.0;

    fn new_state(seed: u64) -> (GameState, EventBus) {
        let mut bus = EventBus::new();
        let state = GameState::new(seed, Tuning::default(), &mut bus);
        (state, bus)
    }

    #[test]
    fn test_new_run_announces_start() {
        let (state, mut bus) = new_state(1);
        assert_eq!(
            bus.drain(),
            vec![
                GameEvent::GameStart,
                GameEvent::LivesChange(HERO_START_LIVES),
                GameEvent::ScoreChange(0)
            ]
        );
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.generator.tier_count(), INITIAL_TIERS as usize + 1);
    }

    #[test]
    fn test_level_change_every_frame() {
        let (mut state, mut bus) = new_state(2);
        bus.drain();
        for _ in 0..5 {
            state.update(FRAME, &TickInput::default(), &mut bus);
        }
        let levels = bus
            .drain()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::LevelChange(_)))
            .count();
        assert_eq!(levels, 5);
    }

    #[test]
    fn test_short_frames_accumulate() {
        let (mut state, mut bus) = new_state(3);
        state.update(SIM_DT * 0.4, &TickInput::default(), &mut bus);
        assert_eq!(state.time_ticks, 0);
        state.update(SIM_DT * 0.7, &TickInput::default(), &mut bus);
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let (mut state, mut bus) = new_state(4);
        state.update(5.0, &TickInput::default(), &mut bus);
        assert!(state.time_ticks <= u64::from(MAX_SUBSTEPS));
        assert!(state.time_ticks >= 5);
    }

    #[test]
    fn test_jump_survives_a_tickless_frame() {
        let (mut state, mut bus) = new_state(5);
        for _ in 0..60 {
            state.update(FRAME, &TickInput::default(), &mut bus);
        }
        assert!(state.hero.on_ground());
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        // Too short to run a tick; the press must carry into the next frame
        state.update(SIM_DT * 0.1, &jump, &mut bus);
        state.update(FRAME, &TickInput::default(), &mut bus);
        assert!(state.hero.body.vel.y < 0.0);
    }

    #[test]
    fn test_single_game_over_event() {
        let (mut state, mut bus) = new_state(6);
        state.hero.score = 120;
        state.hero.lives = 1;
        state.hero.take_damage(&state.tuning);
        assert_eq!(state.hero.state, HeroState::Dead);
        bus.drain();

        for _ in 0..240 {
            state.update(FRAME, &TickInput::default(), &mut bus);
        }
        let overs: Vec<_> = bus
            .drain()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver(_)))
            .collect();
        assert_eq!(overs, vec![GameEvent::GameOver(120)]);
        assert!(state.is_over());
    }

    #[test]
    fn test_restart_rebuilds_world() {
        let (mut state, mut bus) = new_state(7);
        for _ in 0..600 {
            let input = autopilot(&state);
            state.update(FRAME, &input, &mut bus);
        }
        state.hero.lives = 1;
        state.hero.invulnerable = false;
        state.hero.take_damage(&state.tuning);
        for _ in 0..90 {
            state.update(FRAME, &TickInput::default(), &mut bus);
        }
        assert!(state.is_over());
        bus.drain();

        state.restart(&mut bus);
        assert_eq!(bus.drain()[0], GameEvent::GameStart);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.hero.lives, HERO_START_LIVES);
        assert_eq!(state.hero.score, 0);
        assert_eq!(state.difficulty.current_tier_index, INITIAL_TIERS);
        assert_eq!(state.generator.tier_count(), INITIAL_TIERS as usize + 1);
        for pool_stats in [
            (state.generator.platforms().stats(), state.generator.platforms().active_count()),
            (state.generator.enemies().stats(), state.generator.enemies().active_count()),
        ] {
            let (stats, active) = pool_stats;
            assert_eq!(stats.acquired - stats.released, active as u64);
        }
    }

    #[test]
    fn test_two_pickups_in_one_tick_publish_twice() {
        let (mut state, mut bus) = new_state(9);
        for _ in 0..60 {
            state.update(FRAME, &TickInput::default(), &mut bus);
        }
        let start = state.hero.score;
        let pos = state.hero.pos();
        let stars: Vec<_> = state
            .generator
            .collectibles()
            .all_active()
            .filter(|(_, c)| !c.is_collected())
            .map(|(h, _)| h)
            .take(2)
            .collect();
        assert_eq!(stars.len(), 2);
        for (i, handle) in stars.into_iter().enumerate() {
            if let Some(star) = state.generator.collectibles_mut().get_mut(handle) {
                star.body.pos = pos + Vec2::new(i as f32 * 4.0 - 2.0, 0.0);
            }
        }
        bus.drain();

        state.update(FRAME, &TickInput::default(), &mut bus);
        let scores: Vec<_> = bus
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::ScoreChange(score) => Some(score),
                _ => None,
            })
            .collect();
        assert_eq!(scores.len(), 2);
        assert!(start < scores[0] && scores[0] < scores[1]);
        assert_eq!(scores[1], state.hero.score);
    }

    #[test]
    fn test_camera_follow_is_upward_only() {
        let tuning = Tuning::default();
        let mut camera = Camera::snapped(500.0, &tuning);
        let start = camera.top;
        camera.follow(900.0, &tuning);
        assert_eq!(camera.top, start);
        camera.follow(100.0, &tuning);
        assert!(camera.top < start);
        assert!(camera.top > Camera::target_top(100.0, &tuning));
    }

    #[test]
    fn test_summary_serializes() {
        let (state, _) = new_state(8);
        let json = serde_json::to_value(state.summary()).unwrap();
        assert_eq!(json["seed"], 8);
        assert_eq!(json["phase"], "Playing");
        assert_eq!(json["lives"], HERO_START_LIVES);
    }
}

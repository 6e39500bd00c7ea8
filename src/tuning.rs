//! Game balance and world dimensions
//!
//! Loaded from JSON when provided, otherwise built from `consts`. Every
//! loaded value is clamped into a playable range before use.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Largest magnitude accepted for any float setting
const MAX_MAGNITUDE: f32 = 100_000.0;
const MIN_TILE_SIZE: f32 = 4.0;
const MAX_INITIAL_TIERS: u32 = 64;
const MAX_COLLECTIBLES_PER_TIER: u32 = 32;
const MAX_TRAIL_LENGTH: u32 = 32;

/// Tunable parameters for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    pub level_width: f32,
    pub view_height: f32,
    pub ground_offset: f32,
    pub initial_tiers: u32,

    // === Physics ===
    pub gravity: f32,
    pub hero_speed: f32,
    pub jump_velocity: f32,
    pub double_jump_velocity: f32,

    // === Generation ===
    pub base_vertical_gap: f32,
    pub platform_min_width: f32,
    pub platform_max_width: f32,
    pub tile_size: f32,
    pub min_platform_gap: f32,
    pub edge_jitter: f32,
    pub collectibles_per_tier: u32,
    pub trail_length: u32,

    // === Hero ===
    pub start_lives: u32,
    pub invulnerability_time: f32,
    pub hurt_duration: f32,
    pub death_delay: f32,

    // === Enemies ===
    pub enemy_speed: f32,
    pub enemy_chase_band: f32,

    // === Camera / recycling ===
    pub camera_lerp: f32,
    pub camera_offset: f32,
    pub lookahead_gaps: f32,
    pub recycle_distance: f32,
    pub fall_margin: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            level_width: LEVEL_WIDTH,
            view_height: VIEW_HEIGHT,
            ground_offset: GROUND_OFFSET,
            initial_tiers: INITIAL_TIERS,

            gravity: GRAVITY,
            hero_speed: HERO_SPEED,
            jump_velocity: HERO_JUMP_VELOCITY,
            double_jump_velocity: HERO_DOUBLE_JUMP_VELOCITY,

            base_vertical_gap: BASE_VERTICAL_GAP,
            platform_min_width: PLATFORM_MIN_WIDTH,
            platform_max_width: PLATFORM_MAX_WIDTH,
            tile_size: TILE_SIZE,
            min_platform_gap: MIN_PLATFORM_GAP,
            edge_jitter: EDGE_JITTER,
            collectibles_per_tier: COLLECTIBLES_PER_TIER,
            trail_length: TRAIL_LENGTH,

            start_lives: HERO_START_LIVES,
            invulnerability_time: INVULNERABILITY_TIME,
            hurt_duration: HURT_DURATION,
            death_delay: DEATH_DELAY,

            enemy_speed: ENEMY_SPEED,
            enemy_chase_band: ENEMY_CHASE_BAND,

            camera_lerp: CAMERA_LERP,
            camera_offset: CAMERA_OFFSET_Y,
            lookahead_gaps: LOOKAHEAD_GAPS,
            recycle_distance: RECYCLE_DISTANCE,
            fall_margin: FALL_MARGIN,
        }
    }
}

impl Tuning {
    /// Parse tuning from a JSON document (missing fields use defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Load tuning from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Clamp degenerate values into a playable range
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.replace_non_finite(&defaults);

        self.tile_size = self.tile_size.max(MIN_TILE_SIZE);
        if !(self.platform_min_width >= self.tile_size) {
            log::warn!(
                "platform_min_width {} below one tile, clamping to {}",
                self.platform_min_width,
                self.tile_size
            );
            self.platform_min_width = self.tile_size;
        }
        if !(self.platform_max_width >= self.platform_min_width) {
            log::warn!(
                "platform_max_width {} below minimum width, clamping to {}",
                self.platform_max_width,
                self.platform_min_width
            );
            self.platform_max_width = self.platform_min_width;
        }
        if !(self.level_width >= self.platform_min_width) {
            log::warn!(
                "level_width {} narrower than one platform, clamping to {}",
                self.level_width,
                self.platform_min_width
            );
            self.level_width = self.platform_min_width;
        }
        if self.platform_max_width > self.level_width {
            log::warn!(
                "platform_max_width {} wider than the level, clamping to {}",
                self.platform_max_width,
                self.level_width
            );
            self.platform_max_width = self.level_width;
        }

        self.view_height = positive_or(self.view_height, defaults.view_height);
        self.gravity = positive_or(self.gravity, defaults.gravity);
        self.hero_speed = positive_or(self.hero_speed, defaults.hero_speed);
        self.jump_velocity = positive_or(self.jump_velocity, defaults.jump_velocity);
        self.double_jump_velocity =
            positive_or(self.double_jump_velocity, defaults.double_jump_velocity);
        self.base_vertical_gap = positive_or(self.base_vertical_gap, defaults.base_vertical_gap);
        self.enemy_speed = positive_or(self.enemy_speed, defaults.enemy_speed);
        self.enemy_chase_band = positive_or(self.enemy_chase_band, defaults.enemy_chase_band);
        self.lookahead_gaps = positive_or(self.lookahead_gaps, defaults.lookahead_gaps);
        if !self.max_jump_distance().is_finite() {
            log::warn!("jump reach overflows with gravity {}, using {}", self.gravity, defaults.gravity);
            self.gravity = defaults.gravity;
        }

        self.ground_offset = self.ground_offset.max(0.0);
        self.min_platform_gap = self.min_platform_gap.clamp(0.0, self.level_width);
        self.edge_jitter = self.edge_jitter.clamp(0.0, self.level_width);
        self.invulnerability_time = self.invulnerability_time.max(0.0);
        self.hurt_duration = self.hurt_duration.max(0.0);
        self.death_delay = self.death_delay.max(0.0);
        self.fall_margin = self.fall_margin.max(0.0);
        self.camera_offset = self.camera_offset.max(0.0);
        self.camera_lerp = if self.camera_lerp > 0.0 {
            self.camera_lerp.min(1.0)
        } else {
            defaults.camera_lerp
        };
        self.start_lives = self.start_lives.max(1);

        self.initial_tiers = capped("initial_tiers", self.initial_tiers, MAX_INITIAL_TIERS);
        self.collectibles_per_tier = capped(
            "collectibles_per_tier",
            self.collectibles_per_tier,
            MAX_COLLECTIBLES_PER_TIER,
        );
        self.trail_length = capped("trail_length", self.trail_length, MAX_TRAIL_LENGTH);

        // Entities must be fully off-screen before their tier is torn down
        let min_recycle = self.min_recycle_distance();
        if !(self.recycle_distance > min_recycle) {
            log::warn!(
                "recycle_distance {} would tear down visible tiers, raising to {}",
                self.recycle_distance,
                min_recycle + 1.0
            );
            self.recycle_distance = min_recycle + 1.0;
        }

        self
    }

    /// Swap NaN and infinite values for defaults and bound the rest
    fn replace_non_finite(&mut self, defaults: &Self) {
        let fields: [(&str, &mut f32, f32); 23] = [
            ("level_width", &mut self.level_width, defaults.level_width),
            ("view_height", &mut self.view_height, defaults.view_height),
            ("ground_offset", &mut self.ground_offset, defaults.ground_offset),
            ("gravity", &mut self.gravity, defaults.gravity),
            ("hero_speed", &mut self.hero_speed, defaults.hero_speed),
            ("jump_velocity", &mut self.jump_velocity, defaults.jump_velocity),
            ("double_jump_velocity", &mut self.double_jump_velocity, defaults.double_jump_velocity),
            ("base_vertical_gap", &mut self.base_vertical_gap, defaults.base_vertical_gap),
            ("platform_min_width", &mut self.platform_min_width, defaults.platform_min_width),
            ("platform_max_width", &mut self.platform_max_width, defaults.platform_max_width),
            ("tile_size", &mut self.tile_size, defaults.tile_size),
            ("min_platform_gap", &mut self.min_platform_gap, defaults.min_platform_gap),
            ("edge_jitter", &mut self.edge_jitter, defaults.edge_jitter),
            ("invulnerability_time", &mut self.invulnerability_time, defaults.invulnerability_time),
            ("hurt_duration", &mut self.hurt_duration, defaults.hurt_duration),
            ("death_delay", &mut self.death_delay, defaults.death_delay),
            ("enemy_speed", &mut self.enemy_speed, defaults.enemy_speed),
            ("enemy_chase_band", &mut self.enemy_chase_band, defaults.enemy_chase_band),
            ("camera_lerp", &mut self.camera_lerp, defaults.camera_lerp),
            ("camera_offset", &mut self.camera_offset, defaults.camera_offset),
            ("lookahead_gaps", &mut self.lookahead_gaps, defaults.lookahead_gaps),
            ("recycle_distance", &mut self.recycle_distance, defaults.recycle_distance),
            ("fall_margin", &mut self.fall_margin, defaults.fall_margin),
        ];
        for (name, value, fallback) in fields {
            if !value.is_finite() {
                log::warn!("{} is not a finite number, using {}", name, fallback);
                *value = fallback;
            } else if (*value).abs() > MAX_MAGNITUDE {
                log::warn!("{} {} out of range, clamping", name, value);
                *value = (*value).clamp(-MAX_MAGNITUDE, MAX_MAGNITUDE);
            }
        }
    }

    /// Smallest recycle distance that keeps every entity of a torn-down tier off-screen
    pub fn min_recycle_distance(&self) -> f32 {
        let largest_entity = HERO_BODY_HEIGHT
            .max(self.tile_size)
            .max(ENEMY_RADIUS * 2.0)
            .max(COLLECTIBLE_RADIUS * 2.0);
        // One frame of camera travel can never exceed a full view
        self.view_height + largest_entity
    }

    /// Y coordinate of the ground tier
    pub fn ground_y(&self) -> f32 {
        self.view_height - self.ground_offset
    }

    /// Horizontal reach of a full jump plus double jump, with safety margin
    pub fn max_jump_distance(&self) -> f32 {
        let single_airtime = 2.0 * self.jump_velocity / self.gravity;
        let extra_double_airtime = self.double_jump_velocity / self.gravity;
        self.hero_speed * (single_airtime + extra_double_airtime) * JUMP_SAFETY_FACTOR
    }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value > 0.0 { value } else { fallback }
}

fn capped(name: &str, value: u32, max: u32) -> u32 {
    if value > max {
        log::warn!("{} {} too large, clamping to {}", name, value, max);
        max
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_already_sane() {
        let tuning = Tuning::default();
        assert_eq!(tuning.clone().sanitized(), tuning);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "level_width": 800.0 }"#).unwrap();
        assert_eq!(tuning.level_width, 800.0);
        assert_eq!(tuning.gravity, GRAVITY);
        assert_eq!(tuning.start_lives, HERO_START_LIVES);
    }

    #[test]
    fn test_degenerate_widths_are_clamped() {
        let tuning = Tuning::from_json(
            r#"{ "platform_min_width": -5.0, "platform_max_width": 0.0, "level_width": 10.0 }"#,
        )
        .unwrap();
        assert_eq!(tuning.platform_min_width, tuning.tile_size);
        assert!(tuning.platform_max_width >= tuning.platform_min_width);
        assert!(tuning.level_width >= tuning.platform_min_width);
    }

    #[test]
    fn test_non_finite_values_are_clamped() {
        use crate::sim::{EventBus, GameState, TickInput};

        let tuning = Tuning::from_json(
            r#"{
                "platform_max_width": 1e39,
                "edge_jitter": 1e39,
                "gravity": -1e39,
                "level_width": 1e39,
                "initial_tiers": 4000000000,
                "collectibles_per_tier": 4000000000,
                "trail_length": 4000000000
            }"#,
        )
        .unwrap();
        assert!(tuning.platform_max_width.is_finite());
        assert!(tuning.platform_max_width <= tuning.level_width);
        assert_eq!(tuning.level_width, LEVEL_WIDTH);
        assert!(tuning.edge_jitter <= tuning.level_width);
        assert_eq!(tuning.gravity, GRAVITY);
        assert_eq!(tuning.initial_tiers, MAX_INITIAL_TIERS);
        assert_eq!(tuning.trail_length, MAX_TRAIL_LENGTH);

        let mut events = EventBus::new();
        let mut state = GameState::new(1, tuning, &mut events);
        for _ in 0..120 {
            state.update(1.0 / 60.0, &TickInput::default(), &mut events);
        }
        assert!(state.generator.tier_count() > 1);
    }

    #[test]
    fn test_nan_falls_back_to_default() {
        let tuning = Tuning {
            tile_size: f32::NAN,
            view_height: f32::INFINITY,
            camera_lerp: f32::NAN,
            ..Tuning::default()
        }
        .sanitized();
        assert_eq!(tuning.tile_size, TILE_SIZE);
        assert_eq!(tuning.view_height, VIEW_HEIGHT);
        assert_eq!(tuning.camera_lerp, CAMERA_LERP);
    }

    #[test]
    fn test_recycle_distance_raised_past_view() {
        let tuning = Tuning::from_json(r#"{ "recycle_distance": 100.0 }"#).unwrap();
        assert!(tuning.recycle_distance > tuning.view_height);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = Tuning::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_max_jump_distance_from_kinematics() {
        let tuning = Tuning::default();
        // (2 * 520 / 800 + 450 / 800) * 250 * 0.9
        let expected = (1.3 + 0.5625) * 250.0 * 0.9;
        assert!((tuning.max_jump_distance() - expected).abs() < 0.01);
    }
}

//! Difficulty curve
//!
//! Every tunable is a pure function of the tier index. The only mutable
//! piece of difficulty is which tier the generator has reached.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Gameplay tunables derived for one tier index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyParams {
    pub tier_index: u32,
    /// Multiplier on base enemy speed, capped at 2x
    pub enemy_speed_multiplier: f32,
    pub enemy_speed: f32,
    pub platform_min_width: f32,
    pub platform_max_width: f32,
    pub vertical_gap: f32,
    /// Chance that a tier gets three platforms instead of two
    pub three_platform_probability: f32,
    pub enemies_per_platform: u32,
    pub collectible_multiplier: f32,
}

/// Enemy speed multiplier: `1 + min(L * 0.02, 1)`
pub fn enemy_speed_multiplier(tier: u32) -> f32 {
    1.0 + (tier as f32 * 0.02).min(1.0)
}

/// Platform width range, shrinking by 5 per tier down to a floor of `min + 50`
pub fn platform_width_range(tier: u32, tuning: &Tuning) -> (f32, f32) {
    let min = tuning.platform_min_width;
    let reduction = (tier as f32 * 5.0).min(100.0);
    let max = (min + 50.0).max(tuning.platform_max_width - reduction);
    (min, max)
}

/// Vertical gap above the previous tier
pub fn vertical_gap(tier: u32, tuning: &Tuning) -> f32 {
    tuning.base_vertical_gap + (tier as f32 * 2.0).min(40.0)
}

/// Probability of a three-platform tier, falling from 0.5 to a floor of 0.3
pub fn three_platform_probability(tier: u32) -> f32 {
    (0.5 - tier as f32 * 0.01).max(0.3)
}

pub fn enemies_per_platform(tier: u32) -> u32 {
    match tier {
        0..10 => 1,
        10..25 => 2,
        _ => 3,
    }
}

/// Collectible value multiplier: `1 + floor(L / 5) * 0.5`
pub fn collectible_multiplier(tier: u32) -> f32 {
    1.0 + (tier / 5) as f32 * 0.5
}

/// Evaluate all tunables for a tier
pub fn evaluate(tier: u32, tuning: &Tuning) -> DifficultyParams {
    let multiplier = enemy_speed_multiplier(tier);
    let (min_width, max_width) = platform_width_range(tier, tuning);
    DifficultyParams {
        tier_index: tier,
        enemy_speed_multiplier: multiplier,
        enemy_speed: tuning.enemy_speed * multiplier,
        platform_min_width: min_width,
        platform_max_width: max_width,
        vertical_gap: vertical_gap(tier, tuning),
        three_platform_probability: three_platform_probability(tier),
        enemies_per_platform: enemies_per_platform(tier),
        collectible_multiplier: collectible_multiplier(tier),
    }
}

/// Which tier the generator has most recently built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyState {
    pub current_tier_index: u32,
}

impl DifficultyState {
    pub fn set_tier(&mut self, tier: u32) {
        self.current_tier_index = tier;
    }

    pub fn reset(&mut self) {
        self.current_tier_index = 0;
    }

    /// Tunables at the current tier
    pub fn params(&self, tuning: &Tuning) -> DifficultyParams {
        evaluate(self.current_tier_index, tuning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_speed_multiplier_at_tier_30() {
        assert!((enemy_speed_multiplier(30) - 1.6).abs() < 1e-6);
        let params = evaluate(30, &Tuning::default());
        assert!((params.enemy_speed - 80.0 * 1.6).abs() < 1e-3);
    }

    #[test]
    fn test_caps() {
        let tuning = Tuning::default();
        assert_eq!(enemy_speed_multiplier(50), 2.0);
        assert_eq!(enemy_speed_multiplier(500), 2.0);
        assert_eq!(platform_width_range(0, &tuning), (150.0, 350.0));
        assert_eq!(platform_width_range(20, &tuning), (150.0, 250.0));
        assert_eq!(platform_width_range(1000, &tuning), (150.0, 250.0));
        assert_eq!(vertical_gap(0, &tuning), 150.0);
        assert_eq!(vertical_gap(100, &tuning), 190.0);
        assert!((three_platform_probability(0) - 0.5).abs() < 1e-6);
        assert!((three_platform_probability(40) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_width_floor_with_narrow_config() {
        let tuning = Tuning {
            platform_max_width: 160.0,
            ..Tuning::default()
        };
        // Floor of min + 50 wins over the configured max
        assert_eq!(platform_width_range(0, &tuning), (150.0, 200.0));
    }

    #[test]
    fn test_enemy_density_steps() {
        assert_eq!(enemies_per_platform(0), 1);
        assert_eq!(enemies_per_platform(9), 1);
        assert_eq!(enemies_per_platform(10), 2);
        assert_eq!(enemies_per_platform(24), 2);
        assert_eq!(enemies_per_platform(25), 3);
    }

    #[test]
    fn test_collectible_multiplier_steps() {
        assert_eq!(collectible_multiplier(0), 1.0);
        assert_eq!(collectible_multiplier(4), 1.0);
        assert_eq!(collectible_multiplier(5), 1.5);
        assert_eq!(collectible_multiplier(12), 2.0);
    }

    #[test]
    fn test_state_params_follow_tier() {
        let tuning = Tuning::default();
        let mut state = DifficultyState::default();
        state.set_tier(30);
        assert_eq!(state.params(&tuning), evaluate(30, &tuning));
        state.reset();
        assert_eq!(state.current_tier_index, 0);
    }

    proptest! {
        #[test]
        fn prop_difficulty_is_monotonic(tier in 0u32..10_000) {
            let tuning = Tuning::default();
            let here = evaluate(tier, &tuning);
            let next = evaluate(tier + 1, &tuning);
            prop_assert!(next.enemy_speed_multiplier >= here.enemy_speed_multiplier);
            prop_assert!(next.enemy_speed_multiplier <= 2.0);
            prop_assert!(next.platform_max_width <= here.platform_max_width);
            prop_assert!(next.platform_max_width >= tuning.platform_min_width + 50.0);
            prop_assert!(next.vertical_gap >= here.vertical_gap);
            prop_assert!(next.enemies_per_platform >= here.enemies_per_platform);
        }
    }
}

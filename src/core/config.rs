//! Engine configuration with documented balance constants
//!
//! The original tuning values are preserved as defaults. None of these are
//! load-bearing algorithmic requirements; they are the knobs a designer is
//! expected to turn.

use serde::{Deserialize, Serialize};

/// Balance parameters shared by the progression, crafting and session systems
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    // === PROGRESSION ===
    /// Experience required to go from level 1 to level 2
    pub first_level_threshold: u64,

    /// Each subsequent threshold is the previous one times this factor
    pub threshold_growth: f64,

    /// An evolution slot is granted at every level divisible by this
    pub evolution_level_interval: u32,

    /// Base experience granted per effect trigger is `effect.rarity * this`
    pub effect_trigger_exp: u64,

    // === CRAFTING ===
    /// Weight of the mean component rarity in the blended weapon rarity
    pub rarity_mean_weight: f64,

    /// Weight of the highest component rarity in the blended weapon rarity
    pub rarity_max_weight: f64,

    /// Chance a Rare result gains a minor bonus effect
    pub rare_minor_chance: f64,

    /// Chance a Legendary result gains a major bonus effect
    /// (the minor one is guaranteed at Legendary and above)
    pub legendary_major_chance: f64,

    /// Accuracy is clamped into this range after component deltas
    pub accuracy_floor: f32,
    pub accuracy_ceiling: f32,

    /// Durability never aggregates below this
    pub min_durability: u32,

    /// Base damage never aggregates below this
    pub min_base_damage: i32,

    /// Component recovery on disassembly:
    /// `base + durability_fraction * scale`
    pub recovery_base_chance: f64,
    pub recovery_durability_scale: f64,

    // === STATUS EFFECTS ===
    /// Application chance never drops below this, whatever the resistance
    pub min_status_chance: f32,

    // === SESSION ===
    /// Base probability that an escape attempt succeeds
    pub escape_base_chance: f64,

    /// Penalty applied when more than `escape_crowd_threshold` enemies live
    pub escape_crowd_penalty: f64,
    pub escape_crowd_threshold: usize,

    /// Flat chance any attack context counts as critical
    pub critical_chance: f64,

    /// Damage multiplier on a critical standard attack
    pub critical_multiplier: f32,

    /// Fraction of incoming damage absorbed while defending
    pub defend_reduction: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            first_level_threshold: 1000,
            threshold_growth: 1.5,
            evolution_level_interval: 3,
            effect_trigger_exp: 100,
            rarity_mean_weight: 0.7,
            rarity_max_weight: 0.3,
            rare_minor_chance: 0.5,
            legendary_major_chance: 0.5,
            accuracy_floor: 0.1,
            accuracy_ceiling: 0.98,
            min_durability: 30,
            min_base_damage: 5,
            recovery_base_chance: 0.3,
            recovery_durability_scale: 0.5,
            min_status_chance: 0.05,
            escape_base_chance: 0.5,
            escape_crowd_penalty: 0.2,
            escape_crowd_threshold: 3,
            critical_chance: 0.2,
            critical_multiplier: 1.5,
            defend_reduction: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_reference_tuning() {
        let config = EngineConfig::default();
        assert_eq!(config.first_level_threshold, 1000);
        assert!((config.threshold_growth - 1.5).abs() < f64::EPSILON);
        assert_eq!(config.evolution_level_interval, 3);
        assert!((config.rarity_mean_weight - 0.7).abs() < f64::EPSILON);
        assert!((config.rarity_max_weight - 0.3).abs() < f64::EPSILON);
    }
}

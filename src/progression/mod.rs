//! Weapon experience, levels and evolutions
//!
//! Each weapon instance carries one [`EvolutionProgress`]. Experience is
//! granted per combat action, dampened by weapon rarity, and levels are
//! settled immediately so `experience < next_level_threshold` always holds
//! afterwards. Every third level banks an evolution slot.

use serde::{Deserialize, Serialize};

use crate::catalog::{EvolutionPath, WeaponTemplate};
use crate::core::config::EngineConfig;
use crate::core::error::{EngineError, Result};
use crate::core::types::{EvolutionId, Rarity};

/// Combat action kinds that earn weapon experience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceAction {
    DamageDealt,
    CriticalHit,
    Kill,
    EffectTriggered,
}

impl ExperienceAction {
    /// Per-action scaling of the raw experience value
    pub fn multiplier(self) -> f64 {
        match self {
            ExperienceAction::DamageDealt => 0.1,
            ExperienceAction::CriticalHit => 0.5,
            ExperienceAction::Kill => 2.0,
            ExperienceAction::EffectTriggered => 1.5,
        }
    }
}

/// What a grant call changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GrantResult {
    pub experience_gained: u64,
    pub levels_gained: u32,
    pub evolution_slots_gained: u32,
}

/// Read-only progress report for UI consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub level: u32,
    pub experience: u64,
    pub next_level_threshold: u64,
    pub evolutions_available: u32,
    pub levels_until_next_slot: u32,
}

/// Per-instance leveling state, co-created with the weapon instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionProgress {
    pub level: u32,
    pub experience: u64,
    pub next_level_threshold: u64,
    pub evolutions_available: u32,
    pub applied_evolutions: Vec<EvolutionId>,
}

impl EvolutionProgress {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            level: 1,
            experience: 0,
            next_level_threshold: config.first_level_threshold,
            evolutions_available: 0,
            applied_evolutions: Vec::new(),
        }
    }

    /// Grant experience for one action and settle any level-ups.
    pub fn grant_experience(
        &mut self,
        action: ExperienceAction,
        base_exp: u64,
        rarity: Rarity,
        config: &EngineConfig,
    ) -> GrantResult {
        let gained = (base_exp as f64 * action.multiplier() * rarity.exp_factor()).floor() as u64;
        self.experience += gained;

        let mut result = GrantResult {
            experience_gained: gained,
            ..Default::default()
        };
        while self.experience >= self.next_level_threshold {
            self.experience -= self.next_level_threshold;
            self.level += 1;
            self.next_level_threshold =
                (self.next_level_threshold as f64 * config.threshold_growth).floor() as u64;
            result.levels_gained += 1;
            if self.level % config.evolution_level_interval == 0 {
                self.evolutions_available += 1;
                result.evolution_slots_gained += 1;
            }
        }
        if result.levels_gained > 0 {
            tracing::info!(
                level = self.level,
                slots = self.evolutions_available,
                "weapon leveled up"
            );
        }
        result
    }

    /// Evolution paths the weapon currently qualifies for: unlocked by level,
    /// not yet applied, prerequisites satisfied.
    pub fn available_evolutions<'a>(&self, template: &'a WeaponTemplate) -> Vec<&'a EvolutionPath> {
        template
            .evolution_paths
            .iter()
            .filter(|path| !self.applied_evolutions.contains(&path.id))
            .filter(|path| self.level >= path.level_requirement)
            .filter(|path| {
                path.prerequisites
                    .iter()
                    .all(|p| self.applied_evolutions.contains(p))
            })
            .collect()
    }

    /// Apply an evolution onto the instance's effective template. The shared
    /// catalog entry is never touched; `effective` is the instance-owned copy.
    pub fn apply_evolution(
        &mut self,
        effective: &mut WeaponTemplate,
        evolution_id: &EvolutionId,
    ) -> Result<()> {
        if self.evolutions_available == 0 {
            return Err(EngineError::NoEvolutionSlots);
        }
        let available = self.available_evolutions(effective);
        let Some(path) = available.iter().find(|p| &p.id == evolution_id) else {
            return Err(EngineError::EvolutionNotAvailable(evolution_id.clone()));
        };
        let effects = path.effects.clone();

        if let Some(v) = effects.base_damage {
            effective.stats.base_damage = v;
        }
        if let Some(v) = effects.accuracy {
            effective.stats.accuracy = v;
        }
        if let Some(v) = effects.range {
            effective.stats.range = v;
        }
        if let Some(v) = effects.max_charge {
            effective.stats.max_charge = v;
        }
        if let Some(v) = effects.charge_rate {
            effective.stats.charge_rate = v;
        }
        if let Some(v) = effects.durability {
            effective.stats.durability = v;
        }
        for (effect_id, delta) in &effects.effect_changes {
            if let Some(effect) = effective.effects.iter_mut().find(|e| &e.id == effect_id) {
                delta.apply_to(effect);
            }
        }
        if let Some(new_effect) = effects.new_effect {
            effective.effects.push(new_effect);
        }

        self.evolutions_available -= 1;
        self.applied_evolutions.push(evolution_id.clone());
        tracing::info!(evolution = %evolution_id, weapon = %effective.id, "evolution applied");
        Ok(())
    }

    pub fn summary(&self, config: &EngineConfig) -> ProgressSummary {
        let interval = config.evolution_level_interval;
        let levels_until_next_slot = interval - (self.level % interval);
        ProgressSummary {
            level: self.level,
            experience: self.experience,
            next_level_threshold: self.next_level_threshold,
            evolutions_available: self.evolutions_available,
            levels_until_next_slot,
        }
    }
}

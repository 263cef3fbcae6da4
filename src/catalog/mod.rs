//! Weapon templates and the static catalog
//!
//! Templates are immutable once registered. Evolution never touches a
//! catalog entry; it mutates the owned effective copy held by a weapon
//! instance, so the deltas and paths defined here are data only.

pub mod builtin;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::core::types::{EffectId, EvolutionId, Rarity, WeaponCategory, WeaponId};
use crate::effect::{EffectDescriptor, EffectPayload};

/// Base numeric stats shared by every weapon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub base_damage: i32,
    pub damage_type: crate::core::types::DamageType,
    pub range: u32,
    pub accuracy: f32,
    pub max_charge: u32,
    /// Charge gained per standard attack
    pub charge_rate: u32,
    pub durability: u32,
    pub weight: f32,
}

/// Field-level override applied to one existing effect by an evolution.
/// `None` fields leave the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectDelta {
    #[serde(default)]
    pub damage: Option<i32>,
    #[serde(default)]
    pub damage_multiplier: Option<f32>,
    #[serde(default)]
    pub armor_penetration: Option<f32>,
    #[serde(default)]
    pub max_targets: Option<usize>,
    #[serde(default)]
    pub aoe_radius: Option<u32>,
    #[serde(default)]
    pub strength: Option<i32>,
    #[serde(default)]
    pub duration: Option<crate::core::types::Tick>,
    #[serde(default)]
    pub application_chance: Option<f32>,
    #[serde(default)]
    pub charge_cost: Option<u32>,
    #[serde(default)]
    pub cooldown: Option<crate::core::types::Tick>,
}

impl EffectDelta {
    /// Merge into a matching descriptor. Fields that do not apply to the
    /// descriptor's payload kind are ignored.
    pub fn apply_to(&self, effect: &mut EffectDescriptor) {
        match &mut effect.payload {
            EffectPayload::Damage {
                damage,
                damage_multiplier,
                armor_penetration,
                max_targets,
                aoe_radius,
                ..
            } => {
                if let Some(v) = self.damage {
                    *damage = v;
                }
                if let Some(v) = self.damage_multiplier {
                    *damage_multiplier = v;
                }
                if let Some(v) = self.armor_penetration {
                    *armor_penetration = v;
                }
                if let Some(v) = self.max_targets {
                    *max_targets = v;
                }
                if let Some(v) = self.aoe_radius {
                    *aoe_radius = v;
                }
            }
            EffectPayload::Status {
                duration,
                strength,
                application_chance,
                max_targets,
                ..
            } => {
                if let Some(v) = self.strength {
                    *strength = v;
                }
                if let Some(v) = self.duration {
                    *duration = v;
                }
                if let Some(v) = self.application_chance {
                    *application_chance = v;
                }
                if let Some(v) = self.max_targets {
                    *max_targets = v;
                }
            }
            EffectPayload::Utility(_) => {}
        }
        if let Some(v) = self.charge_cost {
            effect.costs.charge = v;
        }
        if let Some(v) = self.cooldown {
            effect.cooldown = v;
        }
    }
}

/// The template-side payload of one evolution path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvolutionEffects {
    /// Scalar stat overrides (absolute values, not deltas)
    #[serde(default)]
    pub base_damage: Option<i32>,
    #[serde(default)]
    pub accuracy: Option<f32>,
    #[serde(default)]
    pub range: Option<u32>,
    #[serde(default)]
    pub max_charge: Option<u32>,
    #[serde(default)]
    pub charge_rate: Option<u32>,
    #[serde(default)]
    pub durability: Option<u32>,
    /// Keyed modifications of existing effects
    #[serde(default)]
    pub effect_changes: AHashMap<EffectId, EffectDelta>,
    /// Appended as a brand-new effect
    #[serde(default)]
    pub new_effect: Option<EffectDescriptor>,
}

/// One unlockable upgrade on a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionPath {
    pub id: EvolutionId,
    pub name: String,
    pub description: String,
    pub level_requirement: u32,
    /// Evolution ids that must already be applied
    #[serde(default)]
    pub prerequisites: Vec<EvolutionId>,
    pub effects: EvolutionEffects,
}

/// Immutable catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponTemplate {
    pub id: WeaponId,
    pub name: String,
    pub description: String,
    pub category: WeaponCategory,
    pub rarity: Rarity,
    pub stats: BaseStats,
    pub effects: Vec<EffectDescriptor>,
    #[serde(default)]
    pub evolution_paths: Vec<EvolutionPath>,
}

impl WeaponTemplate {
    pub fn effect(&self, id: &EffectId) -> Option<&EffectDescriptor> {
        self.effects.iter().find(|e| &e.id == id)
    }

    pub fn evolution(&self, id: &EvolutionId) -> Option<&EvolutionPath> {
        self.evolution_paths.iter().find(|p| &p.id == id)
    }
}

/// The shared read-only template store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeaponCatalog {
    templates: AHashMap<WeaponId, WeaponTemplate>,
}

impl WeaponCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog preloaded with the stock arsenal
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for template in builtin::stock_weapons() {
            // Stock ids are distinct by construction
            let _ = catalog.register_template(template);
        }
        catalog
    }

    pub fn register_template(&mut self, template: WeaponTemplate) -> Result<()> {
        if template.name.trim().is_empty() {
            return Err(EngineError::MissingField(template.id, "name"));
        }
        if template.description.trim().is_empty() {
            return Err(EngineError::MissingField(template.id, "description"));
        }
        if template.effects.is_empty() {
            return Err(EngineError::MissingField(template.id, "effects"));
        }
        if template.stats.base_damage <= 0 {
            return Err(EngineError::MissingField(template.id, "base_damage"));
        }
        if self.templates.contains_key(&template.id) {
            return Err(EngineError::DuplicateTemplate(template.id));
        }
        tracing::info!(
            id = %template.id,
            category = %template.category,
            rarity = %template.rarity,
            "registered weapon template"
        );
        self.templates.insert(template.id.clone(), template);
        Ok(())
    }

    pub fn get(&self, id: &WeaponId) -> Option<&WeaponTemplate> {
        self.templates.get(id)
    }

    pub fn contains(&self, id: &WeaponId) -> bool {
        self.templates.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Templates filtered by category and minimum rarity, id-sorted for
    /// stable listings
    pub fn list(
        &self,
        category: Option<WeaponCategory>,
        min_rarity: Option<Rarity>,
    ) -> Vec<&WeaponTemplate> {
        let mut found: Vec<&WeaponTemplate> = self
            .templates
            .values()
            .filter(|t| category.map_or(true, |c| t.category == c))
            .filter(|t| min_rarity.map_or(true, |r| t.rarity >= r))
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeaponTemplate> {
        self.templates.values()
    }
}

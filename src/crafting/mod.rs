//! Component-based weapon crafting
//!
//! A craft takes one component per slot, resolves the weapon category from
//! the intersection of component compatibilities, aggregates stat deltas
//! onto per-category base stats, synthesizes an effect set, and registers
//! the result as a brand-new template assigned to the crafting player.
//! Disassembly is the probabilistic inverse.

pub mod components;

use ahash::{AHashMap, AHashSet};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::EngineConfig;
use crate::core::error::EngineError;
use crate::core::types::{ComponentId, DamageType, PlayerId, Rarity, Tick, WeaponCategory, WeaponId};
use crate::effect::EffectDescriptor;
use crate::registry::InstanceRegistry;

/// Crafting slot kinds. Frame and Barrel are mandatory; the rest refine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentCategory {
    Frame,
    Barrel,
    PowerSource,
    Focusing,
    Handle,
    Modifier,
    Stabilizer,
    Amplifier,
}

impl std::fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ComponentCategory::Frame => "frame",
            ComponentCategory::Barrel => "barrel",
            ComponentCategory::PowerSource => "power source",
            ComponentCategory::Focusing => "focusing system",
            ComponentCategory::Handle => "handle",
            ComponentCategory::Modifier => "modifier",
            ComponentCategory::Stabilizer => "stabilizer",
            ComponentCategory::Amplifier => "amplifier",
        };
        write!(f, "{name}")
    }
}

/// Additive stat contribution of one component. Numeric fields sum;
/// `damage_type` overwrites (last component wins); `armor_penetration`
/// folds into every damage effect of the finished weapon; `new_effect`
/// joins the effect set verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatDelta {
    #[serde(default)]
    pub base_damage: i32,
    #[serde(default)]
    pub range: i32,
    #[serde(default)]
    pub accuracy: f32,
    #[serde(default)]
    pub max_charge: i32,
    #[serde(default)]
    pub charge_rate: i32,
    #[serde(default)]
    pub durability: i32,
    #[serde(default)]
    pub weight: f32,
    #[serde(default)]
    pub armor_penetration: f32,
    #[serde(default)]
    pub damage_type: Option<DamageType>,
    #[serde(default)]
    pub new_effect: Option<EffectDescriptor>,
}

/// Read-only crafting material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    pub description: String,
    pub category: ComponentCategory,
    pub rarity: Rarity,
    /// Empty set means compatible with every weapon category
    #[serde(default)]
    pub compatibility: AHashSet<WeaponCategory>,
    #[serde(default)]
    pub delta: StatDelta,
    /// 1 (trivial) to 10 (master work)
    pub difficulty: u8,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CraftError {
    #[error("missing required component: {0}")]
    MissingRequiredComponent(ComponentCategory),

    #[error("unknown component: {0}")]
    UnknownComponent(ComponentId),

    #[error("component {component} belongs in the {expected} slot, not {given}")]
    WrongSlot {
        component: ComponentId,
        expected: ComponentCategory,
        given: ComponentCategory,
    },

    #[error("no weapon category is compatible with every supplied component")]
    NoCompatibleCategory,

    #[error("component {component} is incompatible with {category} weapons")]
    IncompatibleComponent {
        component: ComponentId,
        category: WeaponCategory,
    },

    #[error("duplicate component id: {0}")]
    DuplicateComponent(ComponentId),

    #[error("weapon {weapon} was not crafted by player {player}")]
    NotCrafted { player: PlayerId, weapon: WeaponId },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Registered component store, extensible at runtime and via TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentCatalog {
    components: AHashMap<ComponentId, Component>,
}

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog preloaded with the stock component set
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for component in components::stock_components() {
            // Stock ids are distinct by construction
            let _ = catalog.register_component(component);
        }
        catalog
    }

    pub fn register_component(&mut self, component: Component) -> Result<(), CraftError> {
        if self.components.contains_key(&component.id) {
            return Err(CraftError::DuplicateComponent(component.id));
        }
        tracing::debug!(id = %component.id, category = %component.category, "component registered");
        self.components.insert(component.id.clone(), component);
        Ok(())
    }

    pub fn get(&self, id: &ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    /// Components of one slot category, id-sorted
    pub fn by_category(&self, category: ComponentCategory) -> Vec<&Component> {
        let mut found: Vec<&Component> = self
            .components
            .values()
            .filter(|c| c.category == category)
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }
}

/// Provenance of a crafted weapon, kept for disassembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraftedWeaponRecord {
    pub player: PlayerId,
    pub weapon: WeaponId,
    pub components: Vec<(ComponentCategory, ComponentId)>,
    pub crafted_at: Tick,
    pub difficulty: u8,
}

/// What a craft produced
#[derive(Debug, Clone)]
pub struct CraftOutcome {
    pub weapon: WeaponId,
    pub category: WeaponCategory,
    pub rarity: Rarity,
    pub difficulty: u8,
}

/// What a disassembly recovered
#[derive(Debug, Clone, PartialEq)]
pub struct DisassembleResult {
    pub weapon: WeaponId,
    pub recovered: Vec<ComponentId>,
}

/// The crafting engine: component catalog plus provenance records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CraftingSystem {
    pub components: ComponentCatalog,
    records: Vec<CraftedWeaponRecord>,
}

impl CraftingSystem {
    pub fn new(components: ComponentCatalog) -> Self {
        Self {
            components,
            records: Vec::new(),
        }
    }

    pub fn with_builtins() -> Self {
        Self::new(ComponentCatalog::with_builtins())
    }

    pub fn record(&self, player: &PlayerId, weapon: &WeaponId) -> Option<&CraftedWeaponRecord> {
        self.records
            .iter()
            .find(|r| &r.player == player && &r.weapon == weapon)
    }

    pub fn records(&self) -> &[CraftedWeaponRecord] {
        &self.records
    }

    pub(crate) fn restore_record(&mut self, record: CraftedWeaponRecord) {
        self.records.push(record);
    }

    /// Craft a weapon from one component per slot, register the resulting
    /// template, and assign it to the player.
    pub fn craft(
        &mut self,
        registry: &mut InstanceRegistry,
        player: &PlayerId,
        slots: &AHashMap<ComponentCategory, ComponentId>,
        name: &str,
        description: &str,
        now: Tick,
        rng: &mut impl Rng,
    ) -> Result<CraftOutcome, CraftError> {
        for required in [ComponentCategory::Frame, ComponentCategory::Barrel] {
            if !slots.contains_key(&required) {
                return Err(CraftError::MissingRequiredComponent(required));
            }
        }

        // Resolve components in stable slot order
        let mut selected: Vec<(ComponentCategory, Component)> = Vec::with_capacity(slots.len());
        let mut ordered: Vec<(&ComponentCategory, &ComponentId)> = slots.iter().collect();
        ordered.sort_by_key(|(category, _)| **category);
        for (category, id) in ordered {
            let component = self
                .components
                .get(id)
                .ok_or_else(|| CraftError::UnknownComponent(id.clone()))?
                .clone();
            if component.category != *category {
                return Err(CraftError::WrongSlot {
                    component: component.id,
                    expected: component.category,
                    given: *category,
                });
            }
            selected.push((*category, component));
        }

        let category = resolve_category(&selected)?;
        for (_, component) in &selected {
            if !component.compatibility.is_empty() && !component.compatibility.contains(&category) {
                return Err(CraftError::IncompatibleComponent {
                    component: component.id.clone(),
                    category,
                });
            }
        }

        let config = registry.config.clone();
        let difficulty = crafting_difficulty(&selected);
        let rarity = blended_rarity(&selected, &config);
        let stats = aggregate_stats(category, &selected, &config);
        let armor_penetration_bonus: f32 = selected
            .iter()
            .map(|(_, c)| c.delta.armor_penetration)
            .sum();
        let effects = components::generate_effects(
            &selected,
            category,
            rarity,
            armor_penetration_bonus,
            &config,
            rng,
        );

        let weapon_id = fresh_weapon_id(registry, category, rng);
        let template = crate::catalog::WeaponTemplate {
            id: weapon_id.clone(),
            name: name.to_string(),
            description: description.to_string(),
            category,
            rarity,
            stats,
            effects,
            evolution_paths: Vec::new(),
        };
        registry.catalog.register_template(template)?;
        registry.assign(player, &weapon_id)?;

        self.records.push(CraftedWeaponRecord {
            player: player.clone(),
            weapon: weapon_id.clone(),
            components: selected
                .iter()
                .map(|(category, c)| (*category, c.id.clone()))
                .collect(),
            crafted_at: now,
            difficulty,
        });
        tracing::info!(
            player = %player,
            weapon = %weapon_id,
            category = %category,
            rarity = %rarity,
            difficulty,
            "weapon crafted"
        );
        Ok(CraftOutcome {
            weapon: weapon_id,
            category,
            rarity,
            difficulty,
        })
    }

    /// Break a crafted weapon down. Each recorded component is recovered
    /// with probability `base + durability_fraction * scale`; the instance,
    /// its progress and the provenance record are removed regardless.
    pub fn disassemble(
        &mut self,
        registry: &mut InstanceRegistry,
        player: &PlayerId,
        weapon: &WeaponId,
        rng: &mut impl Rng,
    ) -> Result<DisassembleResult, CraftError> {
        let record_index = self
            .records
            .iter()
            .position(|r| &r.player == player && &r.weapon == weapon)
            .ok_or_else(|| CraftError::NotCrafted {
                player: player.clone(),
                weapon: weapon.clone(),
            })?;
        let instance = registry.instance(player, weapon)?;
        let config = &registry.config;
        let recovery_chance = config.recovery_base_chance
            + instance.durability_fraction() * config.recovery_durability_scale;

        let record = self.records.swap_remove(record_index);
        let recovered: Vec<ComponentId> = record
            .components
            .iter()
            .filter(|_| rng.gen::<f64>() < recovery_chance)
            .map(|(_, id)| id.clone())
            .collect();

        registry.remove(player, weapon)?;
        tracing::info!(
            player = %player,
            weapon = %weapon,
            recovered = recovered.len(),
            of = record.components.len(),
            "weapon disassembled"
        );
        Ok(DisassembleResult {
            weapon: weapon.clone(),
            recovered,
        })
    }
}

/// Intersect compatibilities; on ties the fixed priority order decides
fn resolve_category(
    selected: &[(ComponentCategory, Component)],
) -> Result<WeaponCategory, CraftError> {
    let mut candidates: AHashSet<WeaponCategory> =
        WeaponCategory::CRAFT_PRIORITY.into_iter().collect();
    for (_, component) in selected {
        if !component.compatibility.is_empty() {
            candidates.retain(|c| component.compatibility.contains(c));
        }
    }
    WeaponCategory::CRAFT_PRIORITY
        .into_iter()
        .find(|c| candidates.contains(c))
        .ok_or(CraftError::NoCompatibleCategory)
}

fn crafting_difficulty(selected: &[(ComponentCategory, Component)]) -> u8 {
    let count = selected.len().max(1);
    let mean = selected
        .iter()
        .map(|(_, c)| c.difficulty as f64)
        .sum::<f64>()
        / count as f64;
    let complexity_bonus = if count >= 5 {
        2.0
    } else if count >= 3 {
        1.0
    } else {
        0.0
    };
    ((mean + complexity_bonus).round() as u8).clamp(1, 10)
}

fn blended_rarity(selected: &[(ComponentCategory, Component)], config: &EngineConfig) -> Rarity {
    let count = selected.len().max(1);
    let mean = selected
        .iter()
        .map(|(_, c)| c.rarity.value() as f64)
        .sum::<f64>()
        / count as f64;
    let max = selected
        .iter()
        .map(|(_, c)| c.rarity.value())
        .max()
        .unwrap_or(1) as f64;
    let blended =
        (mean * config.rarity_mean_weight + max * config.rarity_max_weight).round() as u32;
    Rarity::from_value(blended)
}

fn aggregate_stats(
    category: WeaponCategory,
    selected: &[(ComponentCategory, Component)],
    config: &EngineConfig,
) -> crate::catalog::BaseStats {
    let mut stats = components::category_base_stats(category);
    for (_, component) in selected {
        let delta = &component.delta;
        stats.base_damage += delta.base_damage;
        stats.range = (stats.range as i64 + delta.range as i64).max(1) as u32;
        stats.accuracy += delta.accuracy;
        stats.max_charge = (stats.max_charge as i64 + delta.max_charge as i64).max(0) as u32;
        stats.charge_rate = (stats.charge_rate as i64 + delta.charge_rate as i64).max(0) as u32;
        stats.durability = (stats.durability as i64 + delta.durability as i64).max(0) as u32;
        stats.weight = (stats.weight + delta.weight).max(0.0);
        if let Some(damage_type) = delta.damage_type {
            stats.damage_type = damage_type;
        }
    }
    stats.accuracy = stats
        .accuracy
        .clamp(config.accuracy_floor, config.accuracy_ceiling);
    stats.durability = stats.durability.max(config.min_durability);
    stats.base_damage = stats.base_damage.max(config.min_base_damage);
    stats
}

fn fresh_weapon_id(
    registry: &InstanceRegistry,
    category: WeaponCategory,
    rng: &mut impl Rng,
) -> WeaponId {
    loop {
        let id = WeaponId::new(format!("crafted_{category}_{}", rng.gen_range(1000..10000)));
        if !registry.catalog.contains(&id) {
            return id;
        }
    }
}

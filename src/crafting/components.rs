//! Stock crafting components, per-category base stat tables, effect
//! synthesis, and TOML loading for externally-authored component packs.

use rand::Rng;

use crate::catalog::BaseStats;
use crate::core::config::EngineConfig;
use crate::core::types::{ComponentId, DamageType, EffectId, Rarity, StatusKind, WeaponCategory};
use crate::effect::{
    EffectCost, EffectDescriptor, EffectPayload, TriggerConditions, UtilityPayload,
};

use super::{Component, ComponentCatalog, ComponentCategory, StatDelta};

/// Fixed base stats a crafted weapon starts from, per resolved category
pub fn category_base_stats(category: WeaponCategory) -> BaseStats {
    match category {
        WeaponCategory::Energy => BaseStats {
            base_damage: 20,
            damage_type: DamageType::Energy,
            range: 18,
            accuracy: 0.8,
            max_charge: 100,
            charge_rate: 10,
            durability: 100,
            weight: 3.0,
        },
        WeaponCategory::Melee => BaseStats {
            base_damage: 35,
            damage_type: DamageType::Physical,
            range: 2,
            accuracy: 0.9,
            max_charge: 60,
            charge_rate: 8,
            durability: 120,
            weight: 4.0,
        },
        WeaponCategory::Projectile => BaseStats {
            base_damage: 25,
            damage_type: DamageType::Physical,
            range: 20,
            accuracy: 0.75,
            max_charge: 30,
            charge_rate: 6,
            durability: 110,
            weight: 5.0,
        },
        WeaponCategory::Tech => BaseStats {
            base_damage: 18,
            damage_type: DamageType::Tech,
            range: 15,
            accuracy: 0.85,
            max_charge: 80,
            charge_rate: 12,
            durability: 90,
            weight: 3.0,
        },
        WeaponCategory::Experimental => BaseStats {
            base_damage: 30,
            damage_type: DamageType::Void,
            range: 16,
            accuracy: 0.7,
            max_charge: 120,
            charge_rate: 8,
            durability: 70,
            weight: 6.0,
        },
    }
}

/// Build the crafted weapon's effect set: component-supplied effects first,
/// a category default if none exist, then rarity-gated bonus effects.
pub fn generate_effects(
    selected: &[(ComponentCategory, Component)],
    category: WeaponCategory,
    rarity: Rarity,
    armor_penetration_bonus: f32,
    config: &EngineConfig,
    rng: &mut impl Rng,
) -> Vec<EffectDescriptor> {
    let mut effects: Vec<EffectDescriptor> = selected
        .iter()
        .filter_map(|(_, c)| c.delta.new_effect.clone())
        .collect();
    if effects.is_empty() {
        effects.push(default_effect(category));
    }

    match rarity {
        Rarity::Common => {}
        Rarity::Rare => {
            if rng.gen::<f64>() < config.rare_minor_chance {
                effects.push(bonus_effect(category, BonusTier::Minor, rng));
            }
        }
        Rarity::Epic => {
            effects.push(bonus_effect(category, BonusTier::Minor, rng));
        }
        Rarity::Legendary => {
            effects.push(bonus_effect(category, BonusTier::Minor, rng));
            if rng.gen::<f64>() < config.legendary_major_chance {
                effects.push(bonus_effect(category, BonusTier::Major, rng));
            }
        }
        Rarity::Artifact => {
            effects.push(bonus_effect(category, BonusTier::Minor, rng));
            effects.push(bonus_effect(category, BonusTier::Major, rng));
        }
    }

    if armor_penetration_bonus > 0.0 {
        for effect in &mut effects {
            if let EffectPayload::Damage {
                armor_penetration, ..
            } = &mut effect.payload
            {
                *armor_penetration = (*armor_penetration + armor_penetration_bonus).min(1.0);
            }
        }
    }
    effects
}

/// Canonical fallback ability per category
fn default_effect(category: WeaponCategory) -> EffectDescriptor {
    match category {
        WeaponCategory::Energy => EffectDescriptor {
            id: EffectId::new("energy_discharge"),
            name: "Energy Discharge".to_string(),
            description: "Releases a concentrated discharge of stored energy".to_string(),
            payload: EffectPayload::Damage {
                damage: 30,
                damage_multiplier: 1.0,
                damage_type: DamageType::Energy,
                armor_penetration: 0.0,
                max_targets: 1,
                aoe_radius: 0,
            },
            trigger_conditions: TriggerConditions {
                min_charge: Some(50),
                ..Default::default()
            },
            costs: EffectCost::charge(50),
            cooldown: 3,
            duration: 1,
            rarity: 1,
        },
        WeaponCategory::Melee => EffectDescriptor {
            id: EffectId::new("power_strike"),
            name: "Power Strike".to_string(),
            description: "A blow delivered with amplified force".to_string(),
            payload: EffectPayload::Damage {
                damage: 45,
                damage_multiplier: 1.2,
                damage_type: DamageType::Physical,
                armor_penetration: 0.0,
                max_targets: 1,
                aoe_radius: 0,
            },
            trigger_conditions: TriggerConditions {
                trigger_chance: Some(0.3),
                ..Default::default()
            },
            costs: EffectCost::free(),
            cooldown: 3,
            duration: 1,
            rarity: 1,
        },
        WeaponCategory::Projectile => EffectDescriptor {
            id: EffectId::new("precision_shot"),
            name: "Precision Shot".to_string(),
            description: "A carefully placed shot at a weak point".to_string(),
            payload: EffectPayload::Damage {
                damage: 35,
                damage_multiplier: 1.5,
                damage_type: DamageType::Physical,
                armor_penetration: 0.0,
                max_targets: 1,
                aoe_radius: 0,
            },
            trigger_conditions: TriggerConditions::none(),
            costs: EffectCost::free(),
            cooldown: 4,
            duration: 1,
            rarity: 1,
        },
        WeaponCategory::Tech => EffectDescriptor {
            id: EffectId::new("system_disruption"),
            name: "System Disruption".to_string(),
            description: "Temporarily scrambles the target's systems".to_string(),
            payload: EffectPayload::Status {
                status_type: StatusKind::Disrupted,
                duration: 3,
                strength: 2,
                application_chance: 0.7,
                max_targets: 1,
            },
            trigger_conditions: TriggerConditions {
                min_charge: Some(40),
                ..Default::default()
            },
            costs: EffectCost::charge(40),
            cooldown: 5,
            duration: 3,
            rarity: 1,
        },
        WeaponCategory::Experimental => EffectDescriptor {
            id: EffectId::new("reality_shift"),
            name: "Reality Shift".to_string(),
            description: "Briefly warps reality around everything near the target".to_string(),
            payload: EffectPayload::Damage {
                damage: 40,
                damage_multiplier: 1.3,
                damage_type: DamageType::Void,
                armor_penetration: 0.0,
                max_targets: 6,
                aoe_radius: 5,
            },
            trigger_conditions: TriggerConditions {
                min_charge: Some(70),
                ..Default::default()
            },
            costs: EffectCost {
                charge: 70,
                durability: 8,
            },
            cooldown: 6,
            duration: 3,
            rarity: 2,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BonusTier {
    Minor,
    Major,
}

/// One rarity bonus effect, drawn per category. Ids get a random suffix so
/// repeated bonuses on one weapon stay distinct.
fn bonus_effect(
    category: WeaponCategory,
    tier: BonusTier,
    rng: &mut impl Rng,
) -> EffectDescriptor {
    let suffix: u32 = rng.gen_range(1000..10000);
    match (category, tier) {
        (WeaponCategory::Energy, BonusTier::Minor) => EffectDescriptor {
            id: EffectId::new(format!("energy_feedback_{suffix}")),
            name: "Energy Feedback".to_string(),
            description: "Attacks occasionally feed charge back into the weapon".to_string(),
            payload: EffectPayload::Utility(UtilityPayload::ChargeRefund { amount: 10 }),
            trigger_conditions: TriggerConditions {
                trigger_chance: Some(0.4),
                ..Default::default()
            },
            costs: EffectCost::free(),
            cooldown: 3,
            duration: 1,
            rarity: 1,
        },
        (WeaponCategory::Energy, BonusTier::Major) => EffectDescriptor {
            id: EffectId::new(format!("plasma_cascade_{suffix}")),
            name: "Plasma Cascade".to_string(),
            description: "Sets off a chain reaction of plasma detonations".to_string(),
            payload: EffectPayload::Damage {
                damage: 20,
                damage_multiplier: 1.0,
                damage_type: DamageType::Energy,
                armor_penetration: 0.0,
                max_targets: 3,
                aoe_radius: 4,
            },
            trigger_conditions: TriggerConditions {
                min_charge: Some(60),
                trigger_chance: Some(0.3),
                ..Default::default()
            },
            costs: EffectCost::charge(60),
            cooldown: 6,
            duration: 1,
            rarity: 2,
        },
        (WeaponCategory::Melee, BonusTier::Minor) => EffectDescriptor {
            id: EffectId::new(format!("stance_shift_{suffix}")),
            name: "Stance Shift".to_string(),
            description: "A momentary change of stance that sharpens critical openings".to_string(),
            payload: EffectPayload::Utility(UtilityPayload::StanceShift {
                critical_bonus: 0.15,
                duration: 2,
            }),
            trigger_conditions: TriggerConditions {
                trigger_chance: Some(0.3),
                ..Default::default()
            },
            costs: EffectCost::free(),
            cooldown: 4,
            duration: 2,
            rarity: 1,
        },
        (WeaponCategory::Melee, BonusTier::Major) => EffectDescriptor {
            id: EffectId::new(format!("whirlwind_attack_{suffix}")),
            name: "Whirlwind Attack".to_string(),
            description: "A sweeping circular strike that hits everything in reach".to_string(),
            payload: EffectPayload::Damage {
                damage: 30,
                damage_multiplier: 0.8,
                damage_type: DamageType::Physical,
                armor_penetration: 0.0,
                max_targets: 5,
                aoe_radius: 3,
            },
            trigger_conditions: TriggerConditions {
                trigger_chance: Some(0.2),
                ..Default::default()
            },
            costs: EffectCost::free(),
            cooldown: 8,
            duration: 1,
            rarity: 2,
        },
        (WeaponCategory::Projectile, BonusTier::Minor) => EffectDescriptor {
            id: EffectId::new(format!("quick_reload_{suffix}")),
            name: "Quick Reload".to_string(),
            description: "Occasionally cycles the action far faster than normal".to_string(),
            payload: EffectPayload::Utility(UtilityPayload::ReloadBoost {
                bonus: 0.5,
                duration: 1,
            }),
            trigger_conditions: TriggerConditions {
                trigger_chance: Some(0.3),
                ..Default::default()
            },
            costs: EffectCost::free(),
            cooldown: 4,
            duration: 1,
            rarity: 1,
        },
        (WeaponCategory::Projectile, BonusTier::Major) => EffectDescriptor {
            id: EffectId::new(format!("explosive_round_{suffix}")),
            name: "Explosive Round".to_string(),
            description: "Chambers a round that detonates on impact".to_string(),
            payload: EffectPayload::Damage {
                damage: 25,
                damage_multiplier: 1.2,
                damage_type: DamageType::Explosive,
                armor_penetration: 0.0,
                max_targets: 4,
                aoe_radius: 3,
            },
            trigger_conditions: TriggerConditions {
                trigger_chance: Some(0.2),
                ..Default::default()
            },
            costs: EffectCost::free(),
            cooldown: 7,
            duration: 1,
            rarity: 2,
        },
        (WeaponCategory::Tech, BonusTier::Minor) => EffectDescriptor {
            id: EffectId::new(format!("targeting_assist_{suffix}")),
            name: "Targeting Assist".to_string(),
            description: "Onboard targeting briefly steadies the wielder's aim".to_string(),
            payload: EffectPayload::Utility(UtilityPayload::AccuracyBoost {
                bonus: 0.15,
                duration: 2,
            }),
            trigger_conditions: TriggerConditions {
                trigger_chance: Some(0.4),
                ..Default::default()
            },
            costs: EffectCost::free(),
            cooldown: 5,
            duration: 2,
            rarity: 1,
        },
        (WeaponCategory::Tech, BonusTier::Major) => EffectDescriptor {
            id: EffectId::new(format!("system_overload_{suffix}")),
            name: "System Overload".to_string(),
            description: "Overdrives every subsystem for one devastating shot".to_string(),
            payload: EffectPayload::Damage {
                damage: 50,
                damage_multiplier: 1.5,
                damage_type: DamageType::Tech,
                armor_penetration: 0.3,
                max_targets: 1,
                aoe_radius: 0,
            },
            trigger_conditions: TriggerConditions {
                min_charge: Some(80),
                trigger_chance: Some(0.2),
                ..Default::default()
            },
            costs: EffectCost {
                charge: 80,
                durability: 5,
            },
            cooldown: 10,
            duration: 1,
            rarity: 2,
        },
        (WeaponCategory::Experimental, BonusTier::Minor) => EffectDescriptor {
            id: EffectId::new(format!("unstable_flux_{suffix}")),
            name: "Unstable Flux".to_string(),
            description: "Leaks an unstable flux that disorients whatever it touches".to_string(),
            payload: EffectPayload::Status {
                status_type: StatusKind::Disoriented,
                duration: 2,
                strength: 2,
                application_chance: 0.3,
                max_targets: 1,
            },
            trigger_conditions: TriggerConditions {
                trigger_chance: Some(0.2),
                ..Default::default()
            },
            costs: EffectCost::free(),
            cooldown: 6,
            duration: 2,
            rarity: 1,
        },
        (WeaponCategory::Experimental, BonusTier::Major) => EffectDescriptor {
            id: EffectId::new(format!("dimensional_rift_{suffix}")),
            name: "Dimensional Rift".to_string(),
            description: "Tears open a small rift that drags in and damages nearby enemies".to_string(),
            payload: EffectPayload::Damage {
                damage: 35,
                damage_multiplier: 1.3,
                damage_type: DamageType::Void,
                armor_penetration: 0.0,
                max_targets: 6,
                aoe_radius: 5,
            },
            trigger_conditions: TriggerConditions {
                min_charge: Some(90),
                trigger_chance: Some(0.15),
                ..Default::default()
            },
            costs: EffectCost {
                charge: 90,
                durability: 8,
            },
            cooldown: 12,
            duration: 3,
            rarity: 2,
        },
    }
}

fn component(
    id: &str,
    name: &str,
    description: &str,
    category: ComponentCategory,
    rarity: Rarity,
    compatibility: &[WeaponCategory],
    delta: StatDelta,
    difficulty: u8,
) -> Component {
    Component {
        id: ComponentId::new(id),
        name: name.to_string(),
        description: description.to_string(),
        category,
        rarity,
        compatibility: compatibility.iter().copied().collect(),
        delta,
        difficulty,
    }
}

/// The stock component set
pub fn stock_components() -> Vec<Component> {
    use ComponentCategory::*;
    use WeaponCategory::{Energy, Experimental, Melee, Projectile, Tech};

    vec![
        // --- frames ---
        component(
            "lightweight_frame",
            "Lightweight Frame",
            "Light alloy chassis that shaves weight at the cost of sturdiness",
            Frame,
            Rarity::Common,
            &[Energy, Projectile],
            StatDelta {
                weight: -2.0,
                durability: -10,
                ..Default::default()
            },
            2,
        ),
        component(
            "reinforced_frame",
            "Reinforced Frame",
            "Heavy chassis built to take abuse",
            Frame,
            Rarity::Common,
            &[Melee, Projectile],
            StatDelta {
                weight: 2.0,
                durability: 30,
                ..Default::default()
            },
            3,
        ),
        component(
            "balanced_frame",
            "Balanced Frame",
            "Chassis with near-perfect weight distribution",
            Frame,
            Rarity::Common,
            &[Energy, Melee, Projectile],
            StatDelta {
                accuracy: 0.05,
                ..Default::default()
            },
            2,
        ),
        component(
            "adaptive_frame",
            "Adaptive Frame",
            "Smart chassis that reconfigures itself to the wielder",
            Frame,
            Rarity::Rare,
            &[Tech, Experimental],
            StatDelta {
                durability: 15,
                accuracy: 0.03,
                ..Default::default()
            },
            5,
        ),
        // --- barrels ---
        component(
            "precision_barrel",
            "Precision Barrel",
            "Finely machined bore that tightens groupings",
            Barrel,
            Rarity::Common,
            &[Energy, Projectile],
            StatDelta {
                accuracy: 0.1,
                range: 3,
                ..Default::default()
            },
            3,
        ),
        component(
            "heavy_barrel",
            "Heavy Barrel",
            "Thick barrel that trades handling for punch and reach",
            Barrel,
            Rarity::Common,
            &[Projectile],
            StatDelta {
                weight: 3.0,
                base_damage: 5,
                range: 5,
                accuracy: -0.05,
                ..Default::default()
            },
            3,
        ),
        component(
            "accelerator_barrel",
            "Accelerator Barrel",
            "Magnetic acceleration stage along the full bore length",
            Barrel,
            Rarity::Rare,
            &[Energy, Projectile, Tech],
            StatDelta {
                base_damage: 8,
                armor_penetration: 0.1,
                ..Default::default()
            },
            4,
        ),
        component(
            "phase_barrel",
            "Phase Barrel",
            "Modulates projectile phase to pass partway through matter",
            Barrel,
            Rarity::Epic,
            &[Energy, Experimental],
            StatDelta {
                armor_penetration: 0.25,
                base_damage: -3,
                ..Default::default()
            },
            7,
        ),
        // --- power sources ---
        component(
            "standard_battery",
            "Standard Battery",
            "Dependable, balanced energy cell",
            PowerSource,
            Rarity::Common,
            &[Energy, Tech],
            StatDelta {
                max_charge: 100,
                charge_rate: 10,
                ..Default::default()
            },
            2,
        ),
        component(
            "high_capacity_cell",
            "High Capacity Cell",
            "Stores more energy but recharges slowly",
            PowerSource,
            Rarity::Rare,
            &[Energy, Tech],
            StatDelta {
                max_charge: 150,
                charge_rate: 5,
                ..Default::default()
            },
            4,
        ),
        component(
            "fast_charge_module",
            "Fast Charge Module",
            "Rapid recharge at the cost of capacity",
            PowerSource,
            Rarity::Rare,
            &[Energy, Tech],
            StatDelta {
                max_charge: 75,
                charge_rate: 20,
                ..Default::default()
            },
            4,
        ),
        component(
            "exotic_power_core",
            "Exotic Power Core",
            "Unstable but enormously potent energy source",
            PowerSource,
            Rarity::Epic,
            &[Energy, Experimental],
            StatDelta {
                max_charge: 200,
                charge_rate: 15,
                durability: -20,
                base_damage: 10,
                ..Default::default()
            },
            6,
        ),
        // --- focusing systems ---
        component(
            "standard_sights",
            "Standard Sights",
            "Basic but reliable sighting system",
            Focusing,
            Rarity::Common,
            &[Energy, Projectile],
            StatDelta {
                accuracy: 0.05,
                ..Default::default()
            },
            2,
        ),
        component(
            "targeting_computer",
            "Targeting Computer",
            "Computes firing solutions in real time",
            Focusing,
            Rarity::Rare,
            &[Energy, Projectile, Tech],
            StatDelta {
                accuracy: 0.15,
                ..Default::default()
            },
            5,
        ),
        component(
            "quantum_targeting",
            "Quantum Targeting",
            "Predicts target movement at quantum resolution",
            Focusing,
            Rarity::Epic,
            &[Tech, Experimental],
            StatDelta {
                accuracy: 0.25,
                ..Default::default()
            },
            7,
        ),
        // --- handles ---
        component(
            "ergonomic_grip",
            "Ergonomic Grip",
            "Shaped for comfort and stability",
            Handle,
            Rarity::Common,
            &[Energy, Projectile, Melee],
            StatDelta {
                accuracy: 0.05,
                charge_rate: 1,
                ..Default::default()
            },
            2,
        ),
        component(
            "shock_absorbing_grip",
            "Shock Absorbing Grip",
            "Soaks up recoil and vibration",
            Handle,
            Rarity::Rare,
            &[Energy, Projectile],
            StatDelta {
                accuracy: 0.1,
                durability: 10,
                ..Default::default()
            },
            3,
        ),
        component(
            "neural_interface",
            "Neural Interface",
            "Links directly into the wielder's implants",
            Handle,
            Rarity::Epic,
            &[Tech, Experimental],
            StatDelta {
                accuracy: 0.2,
                charge_rate: 2,
                ..Default::default()
            },
            6,
        ),
        // --- modifiers ---
        component(
            "damage_enhancer",
            "Damage Enhancer",
            "Raises overall output at a small durability cost",
            Modifier,
            Rarity::Common,
            &[Energy, Projectile, Melee],
            StatDelta {
                base_damage: 8,
                durability: -5,
                ..Default::default()
            },
            3,
        ),
        component(
            "elemental_converter",
            "Elemental Converter",
            "Re-tunes shots with a volatile elemental payload",
            Modifier,
            Rarity::Rare,
            &[Energy, Tech],
            StatDelta {
                damage_type: Some(DamageType::Elemental),
                new_effect: Some(EffectDescriptor {
                    id: EffectId::new("elemental_damage"),
                    name: "Elemental Damage".to_string(),
                    description: "Leaves a lingering elemental burn".to_string(),
                    payload: EffectPayload::Status {
                        status_type: StatusKind::ElementalBurn,
                        duration: 3,
                        strength: 2,
                        application_chance: 0.4,
                        max_targets: 1,
                    },
                    trigger_conditions: TriggerConditions {
                        trigger_chance: Some(0.3),
                        ..Default::default()
                    },
                    costs: EffectCost::free(),
                    cooldown: 4,
                    duration: 3,
                    rarity: 1,
                }),
                ..Default::default()
            },
            5,
        ),
        component(
            "reality_distorter",
            "Reality Distorter",
            "Experimental module that bends physics just slightly out of true",
            Modifier,
            Rarity::Legendary,
            &[Experimental],
            StatDelta {
                armor_penetration: 0.3,
                durability: -15,
                new_effect: Some(EffectDescriptor {
                    id: EffectId::new("reality_breach"),
                    name: "Reality Breach".to_string(),
                    description: "Opens a fissure in reality that ignores defenses".to_string(),
                    payload: EffectPayload::Damage {
                        damage: 40,
                        damage_multiplier: 1.5,
                        damage_type: DamageType::Void,
                        armor_penetration: 0.8,
                        max_targets: 1,
                        aoe_radius: 0,
                    },
                    trigger_conditions: TriggerConditions {
                        trigger_chance: Some(0.15),
                        ..Default::default()
                    },
                    costs: EffectCost::free(),
                    cooldown: 10,
                    duration: 1,
                    rarity: 3,
                }),
                ..Default::default()
            },
            10,
        ),
    ]
}

/// Error type for component pack loading
#[derive(Debug, Clone)]
pub enum ComponentLoadError {
    IoError(String),
    ParseError(String),
    InvalidCategory(String),
    InvalidRarity(String),
    InvalidWeaponCategory(String),
    DuplicateId(String),
}

impl std::fmt::Display for ComponentLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentLoadError::IoError(e) => write!(f, "IO error: {}", e),
            ComponentLoadError::ParseError(e) => write!(f, "Parse error: {}", e),
            ComponentLoadError::InvalidCategory(e) => write!(f, "Invalid component category: {}", e),
            ComponentLoadError::InvalidRarity(e) => write!(f, "Invalid rarity: {}", e),
            ComponentLoadError::InvalidWeaponCategory(e) => {
                write!(f, "Invalid weapon category: {}", e)
            }
            ComponentLoadError::DuplicateId(e) => write!(f, "Duplicate component id: {}", e),
        }
    }
}

impl std::error::Error for ComponentLoadError {}

/// TOML representation of a component pack file
#[derive(Debug, serde::Deserialize)]
struct TomlComponents {
    components: Vec<TomlComponent>,
}

#[derive(Debug, serde::Deserialize)]
struct TomlComponent {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    category: String,
    rarity: String,
    #[serde(default)]
    compatibility: Vec<String>,
    #[serde(default)]
    delta: StatDelta,
    difficulty: u8,
}

impl TomlComponent {
    fn into_component(self) -> Result<Component, ComponentLoadError> {
        let category = match self.category.to_lowercase().as_str() {
            "frame" => ComponentCategory::Frame,
            "barrel" => ComponentCategory::Barrel,
            "power_source" => ComponentCategory::PowerSource,
            "focusing" => ComponentCategory::Focusing,
            "handle" => ComponentCategory::Handle,
            "modifier" => ComponentCategory::Modifier,
            "stabilizer" => ComponentCategory::Stabilizer,
            "amplifier" => ComponentCategory::Amplifier,
            _ => return Err(ComponentLoadError::InvalidCategory(self.category)),
        };
        let rarity = match self.rarity.to_lowercase().as_str() {
            "common" => Rarity::Common,
            "rare" => Rarity::Rare,
            "epic" => Rarity::Epic,
            "legendary" => Rarity::Legendary,
            "artifact" => Rarity::Artifact,
            _ => return Err(ComponentLoadError::InvalidRarity(self.rarity)),
        };
        let compatibility = self
            .compatibility
            .into_iter()
            .map(|c| match c.to_lowercase().as_str() {
                "energy" => Ok(WeaponCategory::Energy),
                "melee" => Ok(WeaponCategory::Melee),
                "projectile" => Ok(WeaponCategory::Projectile),
                "tech" => Ok(WeaponCategory::Tech),
                "experimental" => Ok(WeaponCategory::Experimental),
                _ => Err(ComponentLoadError::InvalidWeaponCategory(c)),
            })
            .collect::<Result<_, _>>()?;
        Ok(Component {
            id: ComponentId::new(self.id),
            name: self.name,
            description: self.description,
            category,
            rarity,
            compatibility,
            delta: self.delta,
            difficulty: self.difficulty,
        })
    }
}

impl ComponentCatalog {
    /// Load a component pack from a TOML file
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self, ComponentLoadError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ComponentLoadError::IoError(e.to_string()))?;
        Self::parse_toml(&content)
    }

    /// Parse a component pack from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ComponentLoadError> {
        let toml_data: TomlComponents =
            toml::from_str(content).map_err(|e| ComponentLoadError::ParseError(e.to_string()))?;
        let mut catalog = Self::new();
        for component in toml_data.components {
            let component = component.into_component()?;
            let id = component.id.clone();
            catalog
                .register_component(component)
                .map_err(|_| ComponentLoadError::DuplicateId(id.to_string()))?;
        }
        Ok(catalog)
    }
}

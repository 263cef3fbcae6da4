//! Stock weapon catalog
//!
//! One hand-authored arsenal covering every category, with effects,
//! trigger conditions and evolution paths. Content generators can extend
//! the catalog at runtime through `register_template`.

use crate::core::types::{DamageType, StatusKind, WeaponCategory};
use crate::core::types::{EffectId, EvolutionId, Rarity, WeaponId};
use crate::effect::{
    EffectCost, EffectDescriptor, EffectPayload, TriggerConditions, UtilityPayload,
};

use super::{BaseStats, EffectDelta, EvolutionEffects, EvolutionPath, WeaponTemplate};

/// The full stock arsenal
pub fn stock_weapons() -> Vec<WeaponTemplate> {
    vec![
        nova_blaster(),
        void_lance(),
        quantum_blade(),
        nanite_pistol(),
        emp_coilgun(),
        chronofreezer(),
    ]
}

fn min_charge(amount: u32) -> TriggerConditions {
    TriggerConditions {
        min_charge: Some(amount),
        ..Default::default()
    }
}

fn nova_blaster() -> WeaponTemplate {
    WeaponTemplate {
        id: WeaponId::new("nova_blaster"),
        name: "Nova Blaster".to_string(),
        description: "Energy pistol that banks charge between shots and vents it as a devastating burst".to_string(),
        category: WeaponCategory::Energy,
        rarity: Rarity::Rare,
        stats: BaseStats {
            base_damage: 25,
            damage_type: DamageType::Energy,
            range: 15,
            accuracy: 0.8,
            max_charge: 100,
            charge_rate: 10,
            durability: 100,
            weight: 2.5,
        },
        effects: vec![
            EffectDescriptor {
                id: EffectId::new("energy_burst"),
                name: "Energy Burst".to_string(),
                description: "Releases a focused discharge of stored energy".to_string(),
                payload: EffectPayload::Damage {
                    damage: 50,
                    damage_multiplier: 1.0,
                    damage_type: DamageType::Energy,
                    armor_penetration: 0.0,
                    max_targets: 1,
                    aoe_radius: 0,
                },
                trigger_conditions: min_charge(50),
                costs: EffectCost::charge(50),
                cooldown: 3,
                duration: 1,
                rarity: 2,
            },
            EffectDescriptor {
                id: EffectId::new("nova_explosion"),
                name: "Nova Explosion".to_string(),
                description: "Detonates the full charge bank, catching everything nearby".to_string(),
                payload: EffectPayload::Damage {
                    damage: 40,
                    damage_multiplier: 1.2,
                    damage_type: DamageType::Energy,
                    armor_penetration: 0.0,
                    max_targets: 5,
                    aoe_radius: 5,
                },
                trigger_conditions: min_charge(100),
                costs: EffectCost {
                    charge: 100,
                    durability: 5,
                },
                cooldown: 6,
                duration: 1,
                rarity: 3,
            },
        ],
        evolution_paths: vec![
            EvolutionPath {
                id: EvolutionId::new("improved_capacitors"),
                name: "Improved Capacitors".to_string(),
                description: "Higher charge ceiling and faster accrual".to_string(),
                level_requirement: 3,
                prerequisites: Vec::new(),
                effects: EvolutionEffects {
                    max_charge: Some(150),
                    charge_rate: Some(15),
                    ..Default::default()
                },
            },
            EvolutionPath {
                id: EvolutionId::new("focused_emitter"),
                name: "Focused Emitter".to_string(),
                description: "Tighter beam, harder hits".to_string(),
                level_requirement: 6,
                prerequisites: Vec::new(),
                effects: EvolutionEffects {
                    base_damage: Some(35),
                    accuracy: Some(0.9),
                    ..Default::default()
                },
            },
            EvolutionPath {
                id: EvolutionId::new("overcharge_module"),
                name: "Overcharge Module".to_string(),
                description: "Banks double charge and unlocks a concentrated beam".to_string(),
                level_requirement: 9,
                prerequisites: vec![EvolutionId::new("improved_capacitors")],
                effects: EvolutionEffects {
                    max_charge: Some(200),
                    new_effect: Some(EffectDescriptor {
                        id: EffectId::new("overcharge_beam"),
                        name: "Overcharge Beam".to_string(),
                        description: "Fires the whole bank as a single armor-cutting lance".to_string(),
                        payload: EffectPayload::Damage {
                            damage: 120,
                            damage_multiplier: 1.5,
                            damage_type: DamageType::Energy,
                            armor_penetration: 0.3,
                            max_targets: 1,
                            aoe_radius: 0,
                        },
                        trigger_conditions: min_charge(200),
                        costs: EffectCost {
                            charge: 200,
                            durability: 10,
                        },
                        cooldown: 10,
                        duration: 1,
                        rarity: 4,
                    }),
                    ..Default::default()
                },
            },
        ],
    }
}

fn void_lance() -> WeaponTemplate {
    WeaponTemplate {
        id: WeaponId::new("void_lance"),
        name: "Void Lance".to_string(),
        description: "Projects a filament of void energy that ignores most conventional armor".to_string(),
        category: WeaponCategory::Energy,
        rarity: Rarity::Epic,
        stats: BaseStats {
            base_damage: 40,
            damage_type: DamageType::Void,
            range: 12,
            accuracy: 0.9,
            max_charge: 100,
            charge_rate: 5,
            durability: 80,
            weight: 4.0,
        },
        effects: vec![
            EffectDescriptor {
                id: EffectId::new("void_pierce"),
                name: "Void Pierce".to_string(),
                description: "A needle of void energy that slips through armor".to_string(),
                payload: EffectPayload::Damage {
                    damage: 65,
                    damage_multiplier: 1.0,
                    damage_type: DamageType::Void,
                    armor_penetration: 0.5,
                    max_targets: 1,
                    aoe_radius: 0,
                },
                trigger_conditions: min_charge(50),
                costs: EffectCost {
                    charge: 50,
                    durability: 2,
                },
                cooldown: 4,
                duration: 1,
                rarity: 3,
            },
            EffectDescriptor {
                id: EffectId::new("reality_tear"),
                name: "Reality Tear".to_string(),
                description: "Rips a short-lived tear that lashes everything near the impact point".to_string(),
                payload: EffectPayload::Damage {
                    damage: 30,
                    damage_multiplier: 1.3,
                    damage_type: DamageType::Void,
                    armor_penetration: 0.3,
                    max_targets: 3,
                    aoe_radius: 4,
                },
                trigger_conditions: min_charge(100),
                costs: EffectCost {
                    charge: 100,
                    durability: 5,
                },
                cooldown: 8,
                duration: 1,
                rarity: 4,
            },
        ],
        evolution_paths: vec![EvolutionPath {
            id: EvolutionId::new("void_attunement"),
            name: "Void Attunement".to_string(),
            description: "Deepens the lance's connection to the void".to_string(),
            level_requirement: 5,
            prerequisites: Vec::new(),
            effects: EvolutionEffects {
                base_damage: Some(50),
                effect_changes: [(
                    EffectId::new("void_pierce"),
                    EffectDelta {
                        damage: Some(80),
                        armor_penetration: Some(0.6),
                        ..Default::default()
                    },
                )]
                .into_iter()
                .collect(),
                ..Default::default()
            },
        }],
    }
}

fn quantum_blade() -> WeaponTemplate {
    WeaponTemplate {
        id: WeaponId::new("quantum_blade"),
        name: "Quantum Blade".to_string(),
        description: "A monomolecular edge held in quantum superposition, striking from impossible angles".to_string(),
        category: WeaponCategory::Melee,
        rarity: Rarity::Epic,
        stats: BaseStats {
            base_damage: 35,
            damage_type: DamageType::Physical,
            range: 2,
            accuracy: 0.95,
            max_charge: 100,
            charge_rate: 8,
            durability: 100,
            weight: 1.5,
        },
        effects: vec![
            EffectDescriptor {
                id: EffectId::new("phase_strike"),
                name: "Phase Strike".to_string(),
                description: "The blade phases through guard and armor alike".to_string(),
                payload: EffectPayload::Damage {
                    damage: 45,
                    damage_multiplier: 1.1,
                    damage_type: DamageType::Physical,
                    armor_penetration: 0.7,
                    max_targets: 1,
                    aoe_radius: 0,
                },
                trigger_conditions: TriggerConditions {
                    consecutive_hits: Some(2),
                    ..Default::default()
                },
                costs: EffectCost::charge(30),
                cooldown: 3,
                duration: 1,
                rarity: 3,
            },
            EffectDescriptor {
                id: EffectId::new("quantum_shift"),
                name: "Quantum Shift".to_string(),
                description: "Blinks the wielder a short distance through superposed space".to_string(),
                payload: EffectPayload::Utility(UtilityPayload::Teleport {
                    distance: 5,
                    direction: Default::default(),
                }),
                trigger_conditions: TriggerConditions {
                    health_below_percent: Some(40.0),
                    ..Default::default()
                },
                costs: EffectCost {
                    charge: 40,
                    durability: 3,
                },
                cooldown: 6,
                duration: 1,
                rarity: 3,
            },
        ],
        evolution_paths: vec![
            EvolutionPath {
                id: EvolutionId::new("superposition_edge"),
                name: "Superposition Edge".to_string(),
                description: "The edge exists in more states at once".to_string(),
                level_requirement: 4,
                prerequisites: Vec::new(),
                effects: EvolutionEffects {
                    base_damage: Some(45),
                    ..Default::default()
                },
            },
            EvolutionPath {
                id: EvolutionId::new("quantum_entanglement"),
                name: "Quantum Entanglement".to_string(),
                description: "A cut here lands elsewhere too".to_string(),
                level_requirement: 8,
                prerequisites: vec![EvolutionId::new("superposition_edge")],
                effects: EvolutionEffects {
                    new_effect: Some(EffectDescriptor {
                        id: EffectId::new("entangled_slash"),
                        name: "Entangled Slash".to_string(),
                        description: "One swing wounds every entangled enemy nearby".to_string(),
                        payload: EffectPayload::Damage {
                            damage: 40,
                            damage_multiplier: 1.0,
                            damage_type: DamageType::Physical,
                            armor_penetration: 0.4,
                            max_targets: 3,
                            aoe_radius: 6,
                        },
                        trigger_conditions: min_charge(60),
                        costs: EffectCost {
                            charge: 60,
                            durability: 4,
                        },
                        cooldown: 7,
                        duration: 1,
                        rarity: 4,
                    }),
                    ..Default::default()
                },
            },
        ],
    }
}

fn nanite_pistol() -> WeaponTemplate {
    WeaponTemplate {
        id: WeaponId::new("nanite_pistol"),
        name: "Nanite Pistol".to_string(),
        description: "Fires capsules of self-replicating nanites that eat through plating".to_string(),
        category: WeaponCategory::Projectile,
        rarity: Rarity::Rare,
        stats: BaseStats {
            base_damage: 20,
            damage_type: DamageType::Physical,
            range: 18,
            accuracy: 0.85,
            max_charge: 100,
            charge_rate: 10,
            durability: 100,
            weight: 2.0,
        },
        effects: vec![
            EffectDescriptor {
                id: EffectId::new("nanite_swarm"),
                name: "Nanite Swarm".to_string(),
                description: "Releases a corroding swarm onto the target".to_string(),
                payload: EffectPayload::Status {
                    status_type: StatusKind::Corroded,
                    duration: 4,
                    strength: 3,
                    application_chance: 0.85,
                    max_targets: 1,
                },
                trigger_conditions: min_charge(40),
                costs: EffectCost::charge(40),
                cooldown: 4,
                duration: 4,
                rarity: 2,
            },
            EffectDescriptor {
                id: EffectId::new("nanite_explosion"),
                name: "Nanite Explosion".to_string(),
                description: "Overloads the swarm, shredding everything it has spread to".to_string(),
                payload: EffectPayload::Damage {
                    damage: 35,
                    damage_multiplier: 1.2,
                    damage_type: DamageType::Tech,
                    armor_penetration: 0.2,
                    max_targets: 3,
                    aoe_radius: 3,
                },
                trigger_conditions: min_charge(80),
                costs: EffectCost {
                    charge: 80,
                    durability: 3,
                },
                cooldown: 6,
                duration: 1,
                rarity: 3,
            },
        ],
        evolution_paths: vec![EvolutionPath {
            id: EvolutionId::new("enhanced_nanites"),
            name: "Enhanced Nanites".to_string(),
            description: "A more aggressive replication strain".to_string(),
            level_requirement: 4,
            prerequisites: Vec::new(),
            effects: EvolutionEffects {
                base_damage: Some(25),
                effect_changes: [(
                    EffectId::new("nanite_swarm"),
                    EffectDelta {
                        strength: Some(5),
                        duration: Some(5),
                        ..Default::default()
                    },
                )]
                .into_iter()
                .collect(),
                ..Default::default()
            },
        }],
    }
}

fn emp_coilgun() -> WeaponTemplate {
    WeaponTemplate {
        id: WeaponId::new("emp_coilgun"),
        name: "EMP Coilgun".to_string(),
        description: "Magnetic accelerator tuned to disable electronics rather than flesh".to_string(),
        category: WeaponCategory::Tech,
        rarity: Rarity::Rare,
        stats: BaseStats {
            base_damage: 15,
            damage_type: DamageType::Emp,
            range: 22,
            accuracy: 0.8,
            max_charge: 100,
            charge_rate: 15,
            durability: 90,
            weight: 3.5,
        },
        effects: vec![
            EffectDescriptor {
                id: EffectId::new("system_shutdown"),
                name: "System Shutdown".to_string(),
                description: "A targeted pulse that knocks one enemy's systems offline".to_string(),
                payload: EffectPayload::Status {
                    status_type: StatusKind::Disrupted,
                    duration: 2,
                    strength: 3,
                    application_chance: 0.9,
                    max_targets: 1,
                },
                trigger_conditions: min_charge(50),
                costs: EffectCost::charge(50),
                cooldown: 5,
                duration: 2,
                rarity: 2,
            },
            EffectDescriptor {
                id: EffectId::new("emp_pulse"),
                name: "EMP Pulse".to_string(),
                description: "An omnidirectional pulse that disrupts every nearby enemy".to_string(),
                payload: EffectPayload::Status {
                    status_type: StatusKind::Disrupted,
                    duration: 2,
                    strength: 2,
                    application_chance: 0.75,
                    max_targets: 4,
                },
                trigger_conditions: min_charge(100),
                costs: EffectCost {
                    charge: 100,
                    durability: 3,
                },
                cooldown: 8,
                duration: 2,
                rarity: 3,
            },
        ],
        evolution_paths: vec![EvolutionPath {
            id: EvolutionId::new("focused_discharge"),
            name: "Focused Discharge".to_string(),
            description: "Narrows the coil field for a harder kinetic punch".to_string(),
            level_requirement: 3,
            prerequisites: Vec::new(),
            effects: EvolutionEffects {
                base_damage: Some(20),
                charge_rate: Some(20),
                ..Default::default()
            },
        }],
    }
}

fn chronofreezer() -> WeaponTemplate {
    WeaponTemplate {
        id: WeaponId::new("chronofreezer"),
        name: "Chronofreezer".to_string(),
        description: "Experimental emitter that drags targets out of local time".to_string(),
        category: WeaponCategory::Experimental,
        rarity: Rarity::Legendary,
        stats: BaseStats {
            base_damage: 30,
            damage_type: DamageType::Elemental,
            range: 15,
            accuracy: 0.75,
            max_charge: 100,
            charge_rate: 5,
            durability: 70,
            weight: 5.0,
        },
        effects: vec![
            EffectDescriptor {
                id: EffectId::new("time_dilation"),
                name: "Time Dilation".to_string(),
                description: "Slows a target's subjective time to a crawl".to_string(),
                payload: EffectPayload::Status {
                    status_type: StatusKind::Disoriented,
                    duration: 3,
                    strength: 2,
                    application_chance: 0.8,
                    max_targets: 1,
                },
                trigger_conditions: min_charge(50),
                costs: EffectCost {
                    charge: 50,
                    durability: 2,
                },
                cooldown: 5,
                duration: 3,
                rarity: 3,
            },
            EffectDescriptor {
                id: EffectId::new("temporal_stasis"),
                name: "Temporal Stasis".to_string(),
                description: "Locks a target in place outside the flow of time".to_string(),
                payload: EffectPayload::Status {
                    status_type: StatusKind::Stunned,
                    duration: 2,
                    strength: 5,
                    application_chance: 0.7,
                    max_targets: 1,
                },
                trigger_conditions: min_charge(100),
                costs: EffectCost {
                    charge: 100,
                    durability: 5,
                },
                cooldown: 10,
                duration: 2,
                rarity: 4,
            },
        ],
        evolution_paths: vec![EvolutionPath {
            id: EvolutionId::new("chrono_stabilizer"),
            name: "Chrono Stabilizer".to_string(),
            description: "Steadier field generation, cheaper activations".to_string(),
            level_requirement: 5,
            prerequisites: Vec::new(),
            effects: EvolutionEffects {
                durability: Some(90),
                effect_changes: [(
                    EffectId::new("time_dilation"),
                    EffectDelta {
                        charge_cost: Some(40),
                        cooldown: Some(4),
                        ..Default::default()
                    },
                )]
                .into_iter()
                .collect(),
                ..Default::default()
            },
        }],
    }
}

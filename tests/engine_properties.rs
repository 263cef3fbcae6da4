//! Property tests for the resource and leveling invariants

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use neonforge::actor::ActorState;
use neonforge::catalog::{BaseStats, WeaponCatalog, WeaponTemplate};
use neonforge::core::config::EngineConfig;
use neonforge::core::types::{DamageType, PlayerId, Rarity, WeaponCategory, WeaponId};
use neonforge::effect::resolution::standard_damage;
use neonforge::effect::{
    CombatContext, EffectCost, EffectDescriptor, EffectPayload, TriggerConditions,
};
use neonforge::progression::{EvolutionProgress, ExperienceAction};
use neonforge::registry::InstanceRegistry;

#[derive(Debug, Clone)]
enum Op {
    AddCharge(u32),
    Repair(u32),
    Trigger,
    Tick(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u32..200).prop_map(Op::AddCharge),
        (0u32..60).prop_map(Op::Repair),
        Just(Op::Trigger),
        (1u64..5).prop_map(Op::Tick),
    ]
}

fn costly_template() -> WeaponTemplate {
    WeaponTemplate {
        id: "prop_rifle".into(),
        name: "Property Rifle".to_string(),
        description: "fixture".to_string(),
        category: WeaponCategory::Projectile,
        rarity: Rarity::Common,
        stats: BaseStats {
            base_damage: 15,
            damage_type: DamageType::Physical,
            range: 10,
            accuracy: 0.9,
            max_charge: 100,
            charge_rate: 10,
            durability: 80,
            weight: 3.0,
        },
        effects: vec![EffectDescriptor {
            id: "drain".into(),
            name: "Drain".to_string(),
            description: String::new(),
            payload: EffectPayload::Damage {
                damage: 10,
                damage_multiplier: 1.0,
                damage_type: DamageType::Physical,
                armor_penetration: 0.0,
                max_targets: 1,
                aoe_radius: 0,
            },
            trigger_conditions: TriggerConditions::none(),
            costs: EffectCost {
                charge: 30,
                durability: 5,
            },
            cooldown: 2,
            duration: 1,
            rarity: 1,
        }],
        evolution_paths: Vec::new(),
    }
}

proptest! {
    #[test]
    fn charge_and_durability_stay_in_bounds(
        ops in prop::collection::vec(op_strategy(), 1..60),
        seed in 0u64..1000,
    ) {
        let mut catalog = WeaponCatalog::new();
        catalog.register_template(costly_template()).unwrap();
        let mut registry = InstanceRegistry::new(catalog, EngineConfig::default());
        let player: PlayerId = "p1".into();
        let weapon: WeaponId = "prop_rifle".into();
        registry.assign(&player, &weapon).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut time = 1u64;

        for op in ops {
            match op {
                Op::AddCharge(amount) => {
                    registry.add_charge(&player, &weapon, amount).unwrap();
                }
                Op::Repair(amount) => {
                    registry.repair(&player, &weapon, amount).unwrap();
                }
                Op::Tick(delta) => {
                    time += delta;
                    registry.tick(time);
                }
                Op::Trigger => {
                    let before = registry.instance(&player, &weapon).unwrap().clone();
                    let mut actor = ActorState::new("p1", "Player", 100);
                    let mut targets = vec![ActorState::new("e1", "Enemy", 1000)];
                    let primary = targets[0].id.clone();
                    let result = registry.trigger(
                        &player,
                        &weapon,
                        &"drain".into(),
                        &mut actor,
                        &mut targets,
                        Some(&primary),
                        &CombatContext::at(time),
                        &mut rng,
                    );
                    if let Err(err) = result {
                        // A rejected trigger must be side-effect free
                        prop_assert!(err.is_resource_error());
                        let after = registry.instance(&player, &weapon).unwrap();
                        prop_assert_eq!(before.current_charge, after.current_charge);
                        prop_assert_eq!(before.current_durability, after.current_durability);
                    }
                }
            }
            let instance = registry.instance(&player, &weapon).unwrap();
            prop_assert!(instance.current_charge <= instance.max_charge());
            prop_assert!(instance.current_durability <= instance.max_durability());
        }
    }

    #[test]
    fn leveling_is_monotonic(
        grants in prop::collection::vec((0usize..4, 0u64..20_000), 1..80),
    ) {
        let config = EngineConfig::default();
        let mut progress = EvolutionProgress::new(&config);
        let actions = [
            ExperienceAction::DamageDealt,
            ExperienceAction::CriticalHit,
            ExperienceAction::Kill,
            ExperienceAction::EffectTriggered,
        ];
        let mut last_level = progress.level;
        let mut last_slots = progress.evolutions_available;

        for (action_index, base_exp) in grants {
            let result =
                progress.grant_experience(actions[action_index], base_exp, Rarity::Common, &config);
            prop_assert!(progress.level >= last_level);
            prop_assert!(progress.experience < progress.next_level_threshold);
            prop_assert!(progress.evolutions_available >= last_slots);
            if result.evolution_slots_gained > 0 {
                // A slot only arrives alongside a level-up
                prop_assert!(result.levels_gained > 0);
            }
            last_level = progress.level;
            last_slots = progress.evolutions_available;
        }
    }

    #[test]
    fn damage_never_drops_below_one(
        base in 1i32..1000,
        resistance in 0.0f32..=1.0,
    ) {
        let target = ActorState::new("e", "Enemy", 1000)
            .with_resistance(DamageType::Physical, resistance);
        let damage = standard_damage(base, DamageType::Physical, &target);
        prop_assert!(damage >= 1);
        prop_assert!(damage <= base);
    }
}

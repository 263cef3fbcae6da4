//! Checkpoint round trips across crafting, assignment and progression

use ahash::AHashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use neonforge::core::types::{ComponentId, EvolutionId, PlayerId};
use neonforge::crafting::{ComponentCategory, CraftingSystem};
use neonforge::progression::ExperienceAction;
use neonforge::registry::InstanceRegistry;
use neonforge::save::SaveState;

#[test]
fn full_engine_state_survives_a_json_round_trip() {
    let mut registry = InstanceRegistry::with_builtins();
    let mut crafting = CraftingSystem::with_builtins();
    let player: PlayerId = "p1".into();
    let mut rng = ChaCha8Rng::seed_from_u64(21);

    // A stock weapon, leveled and evolved
    registry.assign(&player, &"nova_blaster".into()).unwrap();
    registry
        .grant_experience(&player, &"nova_blaster".into(), ExperienceAction::Kill, 100_000)
        .unwrap();
    registry
        .apply_evolution(
            &player,
            &"nova_blaster".into(),
            &EvolutionId::new("improved_capacitors"),
        )
        .unwrap();
    registry
        .add_charge(&player, &"nova_blaster".into(), 120)
        .unwrap();

    // A crafted weapon with a provenance record
    let slots: AHashMap<ComponentCategory, ComponentId> = [
        (
            ComponentCategory::Frame,
            ComponentId::new("lightweight_frame"),
        ),
        (
            ComponentCategory::Barrel,
            ComponentId::new("precision_barrel"),
        ),
        (
            ComponentCategory::PowerSource,
            ComponentId::new("standard_battery"),
        ),
    ]
    .into_iter()
    .collect();
    let outcome = crafting
        .craft(
            &mut registry,
            &player,
            &slots,
            "Heirloom",
            "Saved and restored",
            5,
            &mut rng,
        )
        .unwrap();

    let json = SaveState::capture(&registry, &crafting).to_json().unwrap();
    let (restored, restored_crafting) = SaveState::from_json(&json).unwrap().restore().unwrap();

    // Evolved instance state
    let instance = restored.instance(&player, &"nova_blaster".into()).unwrap();
    assert_eq!(instance.effective.stats.max_charge, 150);
    assert_eq!(instance.current_charge, 120);
    assert_eq!(
        restored.progress(&player, &"nova_blaster".into()).unwrap(),
        registry.progress(&player, &"nova_blaster".into()).unwrap()
    );

    // Crafted weapon, its template and its record
    assert!(restored.catalog.contains(&outcome.weapon));
    assert!(restored.instance(&player, &outcome.weapon).is_ok());
    let record = restored_crafting.record(&player, &outcome.weapon).unwrap();
    assert_eq!(record.components.len(), 3);
    assert_eq!(record.crafted_at, 5);

    // The untouched catalog entry is preserved too
    assert_eq!(
        restored.catalog.get(&"nova_blaster".into()).unwrap().stats.max_charge,
        100
    );
}

#[test]
fn restored_engine_keeps_working() {
    let mut registry = InstanceRegistry::with_builtins();
    let crafting = CraftingSystem::with_builtins();
    let player: PlayerId = "p1".into();
    registry.assign(&player, &"quantum_blade".into()).unwrap();

    let state = SaveState::capture(&registry, &crafting);
    let (mut restored, _) = state.restore().unwrap();

    // The restored registry accepts the normal mutation paths
    restored
        .add_charge(&player, &"quantum_blade".into(), 30)
        .unwrap();
    restored
        .grant_experience(&player, &"quantum_blade".into(), ExperienceAction::Kill, 600)
        .unwrap();
    let progress = restored.progress(&player, &"quantum_blade".into()).unwrap();
    assert!(progress.experience > 0 || progress.level > 1);
}

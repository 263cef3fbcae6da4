//! Crafting scenarios: category resolution, stat aggregation, disassembly

use ahash::{AHashMap, AHashSet};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use neonforge::core::types::{ComponentId, PlayerId, Rarity, WeaponCategory};
use neonforge::crafting::{
    Component, ComponentCatalog, ComponentCategory, CraftError, CraftingSystem, StatDelta,
};
use neonforge::registry::InstanceRegistry;

fn component(
    id: &str,
    category: ComponentCategory,
    compatibility: &[WeaponCategory],
) -> Component {
    Component {
        id: ComponentId::new(id),
        name: id.to_string(),
        description: "test component".to_string(),
        category,
        rarity: Rarity::Common,
        compatibility: compatibility.iter().copied().collect::<AHashSet<_>>(),
        delta: StatDelta::default(),
        difficulty: 2,
    }
}

fn system_with(components: Vec<Component>) -> CraftingSystem {
    let mut catalog = ComponentCatalog::new();
    for c in components {
        catalog.register_component(c).unwrap();
    }
    CraftingSystem::new(catalog)
}

fn slots(pairs: &[(ComponentCategory, &str)]) -> AHashMap<ComponentCategory, ComponentId> {
    pairs
        .iter()
        .map(|(category, id)| (*category, ComponentId::new(*id)))
        .collect()
}

#[test]
fn intersecting_compatibility_resolves_to_melee() {
    let mut crafting = system_with(vec![
        component(
            "frame",
            ComponentCategory::Frame,
            &[WeaponCategory::Melee, WeaponCategory::Projectile],
        ),
        component("barrel", ComponentCategory::Barrel, &[WeaponCategory::Melee]),
    ]);
    let mut registry = InstanceRegistry::with_builtins();
    let player: PlayerId = "p1".into();
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let outcome = crafting
        .craft(
            &mut registry,
            &player,
            &slots(&[
                (ComponentCategory::Frame, "frame"),
                (ComponentCategory::Barrel, "barrel"),
            ]),
            "Pipe Blade",
            "Sharpened scrap on a pipe",
            0,
            &mut rng,
        )
        .unwrap();

    assert_eq!(outcome.category, WeaponCategory::Melee);
    let template = registry.catalog.get(&outcome.weapon).unwrap();
    assert_eq!(template.category, WeaponCategory::Melee);
    assert!(!template.effects.is_empty());
}

#[test]
fn disjoint_compatibility_fails_without_side_effects() {
    let mut crafting = system_with(vec![
        component("frame", ComponentCategory::Frame, &[WeaponCategory::Energy]),
        component("barrel", ComponentCategory::Barrel, &[WeaponCategory::Melee]),
    ]);
    let mut registry = InstanceRegistry::with_builtins();
    let player: PlayerId = "p1".into();
    let before = registry.catalog.len();
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let err = crafting
        .craft(
            &mut registry,
            &player,
            &slots(&[
                (ComponentCategory::Frame, "frame"),
                (ComponentCategory::Barrel, "barrel"),
            ]),
            "Impossible",
            "Parts that cannot agree",
            0,
            &mut rng,
        )
        .unwrap_err();

    assert!(matches!(err, CraftError::NoCompatibleCategory));
    assert_eq!(registry.catalog.len(), before);
    assert!(registry.player_weapons(&player).is_empty());
    assert!(crafting.records().is_empty());
}

#[test]
fn missing_frame_is_rejected() {
    let mut crafting = system_with(vec![component(
        "barrel",
        ComponentCategory::Barrel,
        &[WeaponCategory::Melee],
    )]);
    let mut registry = InstanceRegistry::with_builtins();
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let err = crafting
        .craft(
            &mut registry,
            &"p1".into(),
            &slots(&[(ComponentCategory::Barrel, "barrel")]),
            "Barrel Only",
            "Missing its frame",
            0,
            &mut rng,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        CraftError::MissingRequiredComponent(ComponentCategory::Frame)
    ));
}

#[test]
fn stock_components_craft_a_clamped_energy_weapon() {
    let mut crafting = CraftingSystem::with_builtins();
    let mut registry = InstanceRegistry::with_builtins();
    let player: PlayerId = "p1".into();
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let outcome = crafting
        .craft(
            &mut registry,
            &player,
            &slots(&[
                (ComponentCategory::Frame, "lightweight_frame"),
                (ComponentCategory::Barrel, "precision_barrel"),
                (ComponentCategory::PowerSource, "standard_battery"),
                (ComponentCategory::Focusing, "targeting_computer"),
                (ComponentCategory::Handle, "ergonomic_grip"),
            ]),
            "Bench Special",
            "Everything the bench had to offer",
            0,
            &mut rng,
        )
        .unwrap();

    assert_eq!(outcome.category, WeaponCategory::Energy);
    assert!((1..=10).contains(&outcome.difficulty));
    let template = registry.catalog.get(&outcome.weapon).unwrap();
    assert!(template.stats.accuracy <= 0.98);
    assert!(template.stats.accuracy >= 0.1);
    assert!(template.stats.base_damage >= 5);
    assert!(template.stats.durability >= 30);
    // Assigned at zero charge and full durability
    let instance = registry.instance(&player, &outcome.weapon).unwrap();
    assert_eq!(instance.current_charge, 0);
    assert_eq!(instance.current_durability, template.stats.durability);
    assert!(crafting.record(&player, &outcome.weapon).is_some());
}

#[test]
fn disassembly_removes_the_weapon_and_returns_some_components() {
    let mut crafting = CraftingSystem::with_builtins();
    let mut registry = InstanceRegistry::with_builtins();
    let player: PlayerId = "p1".into();
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let outcome = crafting
        .craft(
            &mut registry,
            &player,
            &slots(&[
                (ComponentCategory::Frame, "lightweight_frame"),
                (ComponentCategory::Barrel, "precision_barrel"),
                (ComponentCategory::PowerSource, "standard_battery"),
            ]),
            "Disposable",
            "Built to be torn down",
            0,
            &mut rng,
        )
        .unwrap();

    let result = crafting
        .disassemble(&mut registry, &player, &outcome.weapon, &mut rng)
        .unwrap();

    // Full durability: 0.8 recovery chance per component, and never more
    // components than went in
    assert!(result.recovered.len() <= 3);
    assert!(registry.instance(&player, &outcome.weapon).is_err());
    assert!(crafting.record(&player, &outcome.weapon).is_none());

    let known: AHashSet<_> = [
        ComponentId::new("lightweight_frame"),
        ComponentId::new("precision_barrel"),
        ComponentId::new("standard_battery"),
    ]
    .into_iter()
    .collect();
    assert!(result.recovered.iter().all(|id| known.contains(id)));
}

#[test]
fn disassembling_a_stock_weapon_is_rejected() {
    let mut crafting = CraftingSystem::with_builtins();
    let mut registry = InstanceRegistry::with_builtins();
    let player: PlayerId = "p1".into();
    registry.assign(&player, &"nova_blaster".into()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let err = crafting
        .disassemble(&mut registry, &player, &"nova_blaster".into(), &mut rng)
        .unwrap_err();
    assert!(matches!(err, CraftError::NotCrafted { .. }));
    assert!(registry.instance(&player, &"nova_blaster".into()).is_ok());
}

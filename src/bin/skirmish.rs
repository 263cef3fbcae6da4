//! Scripted Skirmish Demo
//!
//! Crafts a weapon, runs one deterministic battle against a pair of raiders
//! and prints the combat log plus the weapon's progression afterwards.

use ahash::AHashMap;
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use neonforge::actor::ActorState;
use neonforge::core::config::EngineConfig;
use neonforge::core::types::{ComponentId, DamageType, PlayerId};
use neonforge::crafting::{ComponentCategory, CraftingSystem};
use neonforge::registry::InstanceRegistry;
use neonforge::session::{
    ActionKind, CombatPhase, CombatSession, CombatSide, Combatant, InitiativeStat,
};

#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Craft a weapon and run one scripted battle")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long, default_value_t = 1337)]
    seed: u64,

    /// Maximum turns before the demo gives up
    #[arg(long, default_value_t = 30)]
    max_turns: u64,
}

fn main() {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut registry = InstanceRegistry::with_builtins();
    let mut crafting = CraftingSystem::with_builtins();
    let player: PlayerId = "vex".into();

    let mut slots = AHashMap::new();
    slots.insert(
        ComponentCategory::Frame,
        ComponentId::new("lightweight_frame"),
    );
    slots.insert(
        ComponentCategory::Barrel,
        ComponentId::new("precision_barrel"),
    );
    slots.insert(
        ComponentCategory::PowerSource,
        ComponentId::new("standard_battery"),
    );
    slots.insert(
        ComponentCategory::Modifier,
        ComponentId::new("damage_enhancer"),
    );

    let outcome = match crafting.craft(
        &mut registry,
        &player,
        &slots,
        "Vex's Sidearm",
        "Hand-built from salvaged parts",
        0,
        &mut rng,
    ) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("crafting failed: {err}");
            std::process::exit(1);
        }
    };
    println!(
        "Crafted {} ({} / {}, difficulty {})",
        outcome.weapon, outcome.category, outcome.rarity, outcome.difficulty
    );

    let hero = Combatant::new(
        ActorState::new("vex", "Vex", 120),
        CombatSide::Player,
        InitiativeStat::Attributes {
            reflex: 6,
            intelligence: 5,
        },
    )
    .with_weapon(player.clone(), outcome.weapon.clone());
    let raider = Combatant::new(
        ActorState::new("raider", "Raider", 60),
        CombatSide::Enemy,
        InitiativeStat::Flat(4),
    )
    .with_attack(8, DamageType::Physical, 0.7);
    let bruiser = Combatant::new(
        ActorState::new("bruiser", "Bruiser", 90),
        CombatSide::Enemy,
        InitiativeStat::Flat(2),
    )
    .with_attack(12, DamageType::Physical, 0.6);

    let mut session = CombatSession::new(
        vec![hero, raider, bruiser],
        EngineConfig::default(),
        args.seed,
    );
    if let Err(err) = session.start() {
        eprintln!("could not start combat: {err}");
        std::process::exit(1);
    }

    while session.phase() == CombatPhase::InProgress && session.turn() <= args.max_turns {
        let Some(actor) = session.current_actor().cloned() else {
            break;
        };
        let action = if actor.as_str() == "vex" {
            // Focus fire: weakest living enemy first
            let target = session
                .status()
                .participants
                .into_iter()
                .filter(|p| p.side == CombatSide::Enemy && p.health > 0)
                .min_by_key(|p| p.health)
                .map(|p| p.id);
            match target {
                Some(target) => ActionKind::Attack { target },
                None => break,
            }
        } else {
            ActionKind::Attack {
                target: "vex".into(),
            }
        };
        if let Err(err) = session.perform_action(&actor, action, &mut registry) {
            eprintln!("action failed for {actor}: {err}");
            session.next_turn(&mut registry).ok();
        }
    }

    println!();
    for line in session.log().all() {
        println!("{line}");
    }
    println!();
    println!("Result: {} after {} turns", session.phase(), session.turn());

    match registry.progress_summary(&player, &outcome.weapon) {
        Ok(summary) => println!(
            "{}: level {}, {} / {} exp, {} evolution slot(s)",
            outcome.weapon,
            summary.level,
            summary.experience,
            summary.next_level_threshold,
            summary.evolutions_available
        ),
        Err(err) => eprintln!("no progression record: {err}"),
    }
}

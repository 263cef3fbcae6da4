//! Turn-based combat session controller
//!
//! The top-level state machine: initiative, per-actor actions, persistent
//! status ticks and terminal condition checks. The session owns its actors
//! and its RNG; the weapon registry is borrowed per call so one registry can
//! outlive many battles. Consumers poll [`CombatSession::status`], the
//! session never pushes updates.

use ahash::AHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actor::{ActorState, ModifierKind};
use crate::core::config::EngineConfig;
use crate::core::error::{EngineError, Result};
use crate::core::log::CombatLog;
use crate::core::types::{ActorId, DamageType, EffectId, PlayerId, Tick, WeaponId};
use crate::effect::resolution::{standard_damage, EffectOutcome};
use crate::effect::CombatContext;
use crate::progression::ExperienceAction;
use crate::registry::{ActivationResult, InstanceRegistry};

/// Session lifecycle. Terminal states admit no further actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatPhase {
    Preparation,
    InProgress,
    PlayerVictory,
    EnemyVictory,
    Escaped,
    Aborted,
}

impl CombatPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CombatPhase::PlayerVictory
                | CombatPhase::EnemyVictory
                | CombatPhase::Escaped
                | CombatPhase::Aborted
        )
    }
}

impl std::fmt::Display for CombatPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CombatPhase::Preparation => "preparation",
            CombatPhase::InProgress => "in progress",
            CombatPhase::PlayerVictory => "player victory",
            CombatPhase::EnemyVictory => "enemy victory",
            CombatPhase::Escaped => "escaped",
            CombatPhase::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatSide {
    Player,
    Enemy,
}

impl CombatSide {
    fn opponent(self) -> CombatSide {
        match self {
            CombatSide::Player => CombatSide::Enemy,
            CombatSide::Enemy => CombatSide::Player,
        }
    }
}

/// Initiative input: derived from attributes when the participant has them,
/// otherwise a flat stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitiativeStat {
    Attributes { reflex: i32, intelligence: i32 },
    Flat(i32),
}

impl InitiativeStat {
    fn value(self) -> i32 {
        match self {
            InitiativeStat::Attributes {
                reflex,
                intelligence,
            } => reflex + intelligence,
            InitiativeStat::Flat(value) => value,
        }
    }
}

/// One combat participant. Weapon-wielding participants reference an
/// instance in the registry through `(owner, equipped_weapon)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub actor: ActorState,
    pub side: CombatSide,
    pub initiative: InitiativeStat,
    /// Unarmed/natural attack damage, used when no weapon is equipped
    pub base_damage: i32,
    pub damage_type: DamageType,
    pub accuracy: f32,
    /// Registry owner id for the equipped weapon, if any
    pub owner: Option<PlayerId>,
    pub equipped_weapon: Option<WeaponId>,
    /// Running hit streak feeding combo-gated trigger conditions
    pub consecutive_hits: u32,
    /// Set when an enemy escapes; fled combatants are out of the fight
    #[serde(default)]
    pub fled: bool,
}

impl Combatant {
    pub fn new(actor: ActorState, side: CombatSide, initiative: InitiativeStat) -> Self {
        Self {
            actor,
            side,
            initiative,
            base_damage: 10,
            damage_type: DamageType::Physical,
            accuracy: 0.8,
            owner: None,
            equipped_weapon: None,
            consecutive_hits: 0,
            fled: false,
        }
    }

    pub fn with_weapon(mut self, owner: PlayerId, weapon: WeaponId) -> Self {
        self.owner = Some(owner);
        self.equipped_weapon = Some(weapon);
        self
    }

    pub fn with_attack(mut self, base_damage: i32, damage_type: DamageType, accuracy: f32) -> Self {
        self.base_damage = base_damage;
        self.damage_type = damage_type;
        self.accuracy = accuracy;
        self
    }
}

/// Action submitted by the driver for the current actor
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    Attack { target: ActorId },
    Defend,
    Escape,
    Special {
        effect: EffectId,
        target: ActorId,
    },
}

/// What one action did
#[derive(Debug, Clone)]
pub enum ActionReport {
    Attacked {
        target: ActorId,
        damage: i32,
        critical: bool,
        killed: bool,
    },
    Missed {
        target: ActorId,
    },
    SpecialTriggered {
        effect: EffectId,
        outcome: EffectOutcome,
    },
    Defended,
    EscapeAttempt {
        success: bool,
    },
}

/// Polled snapshot for UI consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub phase: CombatPhase,
    pub turn: Tick,
    pub current_actor: Option<ActorId>,
    pub participants: Vec<ParticipantStatus>,
    pub recent_log: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantStatus {
    pub id: ActorId,
    pub name: String,
    pub side: CombatSide,
    pub health: i32,
    pub max_health: i32,
}

const STATUS_LOG_LINES: usize = 5;

/// One battle. Strictly sequential; every call runs to completion.
#[derive(Debug)]
pub struct CombatSession {
    pub id: Uuid,
    phase: CombatPhase,
    turn: Tick,
    combatants: Vec<Combatant>,
    initiative_order: Vec<ActorId>,
    current_index: usize,
    log: CombatLog,
    rng: ChaCha8Rng,
    config: EngineConfig,
}

impl CombatSession {
    pub fn new(combatants: Vec<Combatant>, config: EngineConfig, seed: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: CombatPhase::Preparation,
            turn: 0,
            combatants,
            initiative_order: Vec::new(),
            current_index: 0,
            log: CombatLog::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
        }
    }

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    pub fn turn(&self) -> Tick {
        self.turn
    }

    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    pub fn initiative_order(&self) -> &[ActorId] {
        &self.initiative_order
    }

    pub fn current_actor(&self) -> Option<&ActorId> {
        if self.phase != CombatPhase::InProgress {
            return None;
        }
        self.initiative_order.get(self.current_index)
    }

    pub fn combatant(&self, id: &ActorId) -> Result<&Combatant> {
        self.combatants
            .iter()
            .find(|c| &c.actor.id == id)
            .ok_or_else(|| EngineError::UnknownParticipant(id.clone()))
    }

    fn combatant_index(&self, id: &ActorId) -> Result<usize> {
        self.combatants
            .iter()
            .position(|c| &c.actor.id == id)
            .ok_or_else(|| EngineError::UnknownParticipant(id.clone()))
    }

    /// Roll initiative and open the battle. Valid only from `Preparation`.
    pub fn start(&mut self) -> Result<()> {
        if self.phase != CombatPhase::Preparation {
            return Err(EngineError::CombatOver);
        }
        let mut scored: Vec<(ActorId, i32)> = self
            .combatants
            .iter()
            .map(|c| {
                let roll: i32 = self.rng.gen_range(1..=10);
                (c.actor.id.clone(), c.initiative.value() + roll)
            })
            .collect();
        // Stable sort keeps input order on ties
        scored.sort_by_key(|(_, score)| std::cmp::Reverse(*score));
        self.initiative_order = scored.into_iter().map(|(id, _)| id).collect();
        self.current_index = 0;
        self.turn = 1;
        self.phase = CombatPhase::InProgress;
        self.log.push(format!(
            "Combat begins. Initiative: {}",
            self.initiative_order
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
        tracing::info!(session = %self.id, participants = self.combatants.len(), "combat started");
        Ok(())
    }

    /// Abort from any non-terminal state
    pub fn abort(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = CombatPhase::Aborted;
            self.log.push("Combat aborted.");
        }
    }

    /// Snapshot of the battle for UI polling
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            phase: self.phase,
            turn: self.turn,
            current_actor: self.current_actor().cloned(),
            participants: self
                .combatants
                .iter()
                .map(|c| ParticipantStatus {
                    id: c.actor.id.clone(),
                    name: c.actor.name.clone(),
                    side: c.side,
                    health: c.actor.health,
                    max_health: c.actor.max_health,
                })
                .collect(),
            recent_log: self.log.recent(STATUS_LOG_LINES).to_vec(),
        }
    }

    fn living(&self, side: CombatSide) -> usize {
        self.combatants
            .iter()
            .filter(|c| c.side == side && !c.fled && c.actor.is_alive())
            .count()
    }

    /// Perform one action for `actor`. Defend may be issued reactively; every
    /// other action must come from the current actor. A successful action
    /// advances the initiative order; wrapping increments the turn counter
    /// and applies persistent statuses.
    pub fn perform_action(
        &mut self,
        actor: &ActorId,
        action: ActionKind,
        registry: &mut InstanceRegistry,
    ) -> Result<ActionReport> {
        match self.phase {
            CombatPhase::Preparation => return Err(EngineError::CombatNotStarted),
            CombatPhase::InProgress => {}
            _ => return Err(EngineError::CombatOver),
        }
        let is_turn = self.current_actor() == Some(actor);
        if !is_turn && action != ActionKind::Defend {
            return Err(EngineError::OutOfTurn(actor.clone()));
        }

        let report = match action {
            ActionKind::Attack { target } => self.attack(actor, &target, registry)?,
            ActionKind::Defend => self.defend(actor)?,
            ActionKind::Escape => self.escape(actor)?,
            ActionKind::Special { effect, target } => {
                self.special(actor, &effect, &target, registry)?
            }
        };

        if is_turn {
            self.advance(registry);
        }
        self.check_terminal();
        Ok(report)
    }

    /// Advance to the next actor without an action (the driver may skip
    /// stunned or absent participants).
    pub fn next_turn(&mut self, registry: &mut InstanceRegistry) -> Result<()> {
        if self.phase != CombatPhase::InProgress {
            return Err(EngineError::CombatNotStarted);
        }
        self.advance(registry);
        self.check_terminal();
        Ok(())
    }

    fn attack(
        &mut self,
        actor: &ActorId,
        target: &ActorId,
        registry: &mut InstanceRegistry,
    ) -> Result<ActionReport> {
        let attacker_index = self.combatant_index(actor)?;
        let target_index = self.combatant_index(target)?;
        let attacker = &self.combatants[attacker_index];

        // A special effect preempts the standard attack when one is eligible
        if let (Some(owner), Some(weapon)) =
            (attacker.owner.clone(), attacker.equipped_weapon.clone())
        {
            let ctx = self.context_for(attacker_index, false);
            let eligible = match registry.check_activation(&owner, &weapon, &ctx, &mut self.rng)? {
                ActivationResult::Eligible(ids) => ids.into_iter().next(),
                _ => None,
            };
            if let Some(effect_id) = eligible {
                let report = self.run_trigger(
                    attacker_index,
                    target_index,
                    &owner,
                    &weapon,
                    &effect_id,
                    registry,
                )?;
                registry.add_charge(&owner, &weapon, self.charge_rate(registry, &owner, &weapon))?;
                return Ok(report);
            }
        }

        // Standard attack: hit roll, then the shared damage formula
        let attacker = &self.combatants[attacker_index];
        let accuracy = (attacker.accuracy + attacker.actor.accuracy_bonus()).clamp(0.0, 1.0);
        if self.rng.gen::<f32>() >= accuracy {
            self.combatants[attacker_index].consecutive_hits = 0;
            let name = self.combatants[attacker_index].actor.name.clone();
            let target_name = self.combatants[target_index].actor.name.clone();
            self.log.push(format!("{name} attacks {target_name} and misses."));
            return Ok(ActionReport::Missed {
                target: target.clone(),
            });
        }

        let critical = self.rng.gen::<f64>()
            < self.config.critical_chance + self.combatants[attacker_index].actor.critical_bonus() as f64;
        let attacker = &self.combatants[attacker_index];
        let (mut base, damage_type) = match (&attacker.owner, &attacker.equipped_weapon) {
            (Some(owner), Some(weapon)) => {
                let stats = &registry.instance(owner, weapon)?.effective.stats;
                (stats.base_damage, stats.damage_type)
            }
            _ => (attacker.base_damage, attacker.damage_type),
        };
        if critical {
            base = (base as f32 * self.config.critical_multiplier).floor() as i32;
        }

        let raw = standard_damage(base, damage_type, &self.combatants[target_index].actor);
        let dealt = self.combatants[target_index].actor.apply_damage(raw);
        let killed = !self.combatants[target_index].actor.is_alive();
        self.combatants[attacker_index].consecutive_hits += 1;

        let name = self.combatants[attacker_index].actor.name.clone();
        let target_name = self.combatants[target_index].actor.name.clone();
        let crit_note = if critical { " (critical)" } else { "" };
        if killed {
            self.log.push(format!(
                "{name} hits {target_name} for {dealt} damage{crit_note}. {target_name} is down!"
            ));
        } else {
            self.log
                .push(format!("{name} hits {target_name} for {dealt} damage{crit_note}."));
        }

        // Weapon experience and charge accrual for armed attackers
        let attacker = &self.combatants[attacker_index];
        if let (Some(owner), Some(weapon)) =
            (attacker.owner.clone(), attacker.equipped_weapon.clone())
        {
            registry.grant_experience(&owner, &weapon, ExperienceAction::DamageDealt, dealt as u64)?;
            if critical {
                registry.grant_experience(&owner, &weapon, ExperienceAction::CriticalHit, dealt as u64)?;
            }
            if killed {
                let max_health = self.combatants[target_index].actor.max_health;
                registry.grant_experience(&owner, &weapon, ExperienceAction::Kill, max_health as u64)?;
            }
            registry.add_charge(&owner, &weapon, self.charge_rate(registry, &owner, &weapon))?;
        }

        Ok(ActionReport::Attacked {
            target: target.clone(),
            damage: dealt,
            critical,
            killed,
        })
    }

    fn defend(&mut self, actor: &ActorId) -> Result<ActionReport> {
        let index = self.combatant_index(actor)?;
        let now = self.turn;
        let reduction = self.config.defend_reduction;
        self.combatants[index].actor.attach_modifier(
            ModifierKind::DamageReduction {
                fraction: reduction,
            },
            now,
            1,
        );
        let name = self.combatants[index].actor.name.clone();
        self.log.push(format!("{name} takes a defensive stance."));
        Ok(ActionReport::Defended)
    }

    /// Only a player-side escape ends the session; a fleeing enemy just
    /// drops out of the fight.
    fn escape(&mut self, actor: &ActorId) -> Result<ActionReport> {
        let index = self.combatant_index(actor)?;
        let side = self.combatants[index].side;
        let opposing = self.living(side.opponent());
        let mut chance = self.config.escape_base_chance;
        if opposing > self.config.escape_crowd_threshold {
            chance -= self.config.escape_crowd_penalty;
        }
        let success = self.rng.gen::<f64>() < chance;
        let name = self.combatants[index].actor.name.clone();
        if success {
            match side {
                CombatSide::Player => {
                    self.phase = CombatPhase::Escaped;
                    self.log.push(format!("{name} escapes from combat."));
                }
                CombatSide::Enemy => {
                    self.combatants[index].fled = true;
                    self.log.push(format!("{name} flees the battle."));
                }
            }
        } else {
            self.log.push(format!("{name} fails to escape."));
        }
        Ok(ActionReport::EscapeAttempt { success })
    }

    fn special(
        &mut self,
        actor: &ActorId,
        effect: &EffectId,
        target: &ActorId,
        registry: &mut InstanceRegistry,
    ) -> Result<ActionReport> {
        let attacker_index = self.combatant_index(actor)?;
        let target_index = self.combatant_index(target)?;
        let attacker = &self.combatants[attacker_index];
        let (Some(owner), Some(weapon)) =
            (attacker.owner.clone(), attacker.equipped_weapon.clone())
        else {
            return Err(EngineError::NotEligible {
                effect: effect.clone(),
                reason: "no weapon equipped".to_string(),
            });
        };
        self.run_trigger(attacker_index, target_index, &owner, &weapon, effect, registry)
    }

    /// Trigger one special effect. Resolution works on detached copies of the
    /// actor states, written back by id afterwards.
    fn run_trigger(
        &mut self,
        attacker_index: usize,
        target_index: usize,
        owner: &PlayerId,
        weapon: &WeaponId,
        effect_id: &EffectId,
        registry: &mut InstanceRegistry,
    ) -> Result<ActionReport> {
        let ctx = self.context_for(attacker_index, false);
        let mut player_actor = self.combatants[attacker_index].actor.clone();
        let side = self.combatants[attacker_index].side;
        let mut targets: Vec<ActorState> = self
            .combatants
            .iter()
            .filter(|c| c.side != side && !c.fled && c.actor.is_alive())
            .map(|c| c.actor.clone())
            .collect();
        let primary = self.combatants[target_index].actor.id.clone();

        let result = registry.trigger(
            owner,
            weapon,
            effect_id,
            &mut player_actor,
            &mut targets,
            Some(&primary),
            &ctx,
            &mut self.rng,
        );
        let triggered = match result {
            Ok(triggered) => triggered,
            Err(err) => {
                // Failures are surfaced into the session log, never swallowed
                self.log.push(format!("Special attack failed: {err}"));
                return Err(err);
            }
        };

        self.write_back(player_actor);
        for state in targets {
            self.write_back(state);
        }
        if triggered.outcome.total_damage() > 0 {
            self.combatants[attacker_index].consecutive_hits += 1;
        }
        self.log.push(triggered.outcome.message.clone());

        Ok(ActionReport::SpecialTriggered {
            effect: effect_id.clone(),
            outcome: triggered.outcome,
        })
    }

    fn write_back(&mut self, state: ActorState) {
        if let Some(combatant) = self
            .combatants
            .iter_mut()
            .find(|c| c.actor.id == state.id)
        {
            combatant.actor = state;
        }
    }

    fn charge_rate(
        &self,
        registry: &InstanceRegistry,
        owner: &PlayerId,
        weapon: &WeaponId,
    ) -> u32 {
        registry
            .instance(owner, weapon)
            .map(|i| i.effective.stats.charge_rate)
            .unwrap_or(0)
    }

    fn context_for(&self, attacker_index: usize, is_critical: bool) -> CombatContext {
        let attacker = &self.combatants[attacker_index];
        let side = attacker.side;
        let mut distances = AHashMap::new();
        for combatant in &self.combatants {
            if combatant.side != side {
                // No positional model: everyone is adjacent
                distances.insert(combatant.actor.id.clone(), 1);
            }
        }
        CombatContext {
            time: self.turn,
            player_health_percent: attacker.actor.health_percent(),
            consecutive_hits: attacker.consecutive_hits,
            enemy_count: self.living(side.opponent()) as u32,
            is_critical,
            distances,
        }
    }

    /// Move to the next living actor; wrapping starts a new turn and applies
    /// persistent statuses to everyone.
    fn advance(&mut self, registry: &mut InstanceRegistry) {
        if self.phase != CombatPhase::InProgress || self.initiative_order.is_empty() {
            return;
        }
        let count = self.initiative_order.len();
        for _ in 0..count {
            self.current_index += 1;
            if self.current_index >= count {
                self.current_index = 0;
                self.turn += 1;
                self.apply_persistent_effects(registry);
            }
            let id = self.initiative_order[self.current_index].clone();
            if self
                .combatant(&id)
                .map(|c| !c.fled && c.actor.is_alive())
                .unwrap_or(false)
            {
                break;
            }
        }
    }

    /// Damaging statuses deal their strength in damage each turn; expired
    /// statuses, modifiers and active effects are dropped afterwards.
    fn apply_persistent_effects(&mut self, registry: &mut InstanceRegistry) {
        let now = self.turn;
        let mut lines = Vec::new();
        for combatant in &mut self.combatants {
            if combatant.fled || !combatant.actor.is_alive() {
                continue;
            }
            let ticking: Vec<(crate::core::types::StatusKind, i32)> = combatant
                .actor
                .statuses
                .values()
                .filter(|s| s.kind.is_damaging())
                .map(|s| (s.kind, s.strength))
                .collect();
            for (kind, strength) in ticking {
                let dealt = combatant.actor.apply_damage(strength);
                lines.push(format!(
                    "{} takes {} damage from {}.",
                    combatant.actor.name, dealt, kind
                ));
            }
            let expired = combatant.actor.purge_expired(now);
            for kind in expired {
                lines.push(format!("{} is no longer {}.", combatant.actor.name, kind));
            }
        }
        for line in lines {
            self.log.push(line);
        }
        registry.tick(now);
    }

    fn check_terminal(&mut self) {
        if self.phase != CombatPhase::InProgress {
            return;
        }
        if self.living(CombatSide::Player) == 0 {
            self.phase = CombatPhase::EnemyVictory;
            self.log.push("The player has been defeated.");
            tracing::info!(session = %self.id, "combat ended in enemy victory");
        } else if self.living(CombatSide::Enemy) == 0 {
            self.phase = CombatPhase::PlayerVictory;
            self.log.push("All enemies are down. Victory!");
            tracing::info!(session = %self.id, "combat ended in player victory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Rarity;
    use crate::catalog::{BaseStats, WeaponCatalog, WeaponTemplate};
    use crate::core::types::WeaponCategory;
    use crate::effect::{EffectCost, EffectDescriptor, EffectPayload, TriggerConditions};

    fn player(name: &str) -> Combatant {
        Combatant::new(
            ActorState::new(name, name, 100),
            CombatSide::Player,
            InitiativeStat::Attributes {
                reflex: 5,
                intelligence: 5,
            },
        )
        .with_attack(20, DamageType::Physical, 1.0)
    }

    fn enemy(name: &str, health: i32) -> Combatant {
        Combatant::new(
            ActorState::new(name, name, health),
            CombatSide::Enemy,
            InitiativeStat::Flat(1),
        )
        .with_attack(10, DamageType::Physical, 1.0)
    }

    fn no_crit_config() -> EngineConfig {
        EngineConfig {
            critical_chance: 0.0,
            ..EngineConfig::default()
        }
    }

    fn template_with_effect(effect: EffectDescriptor) -> WeaponTemplate {
        WeaponTemplate {
            id: "test_rifle".into(),
            name: "Test Rifle".to_string(),
            description: "A fixture".to_string(),
            category: WeaponCategory::Projectile,
            rarity: Rarity::Common,
            stats: BaseStats {
                base_damage: 20,
                damage_type: DamageType::Physical,
                range: 10,
                accuracy: 1.0,
                max_charge: 100,
                charge_rate: 10,
                durability: 100,
                weight: 3.0,
            },
            effects: vec![effect],
            evolution_paths: Vec::new(),
        }
    }

    fn registry_with(template: WeaponTemplate) -> InstanceRegistry {
        let mut catalog = WeaponCatalog::new();
        catalog.register_template(template).unwrap();
        InstanceRegistry::new(catalog, EngineConfig::default())
    }

    #[test]
    fn test_start_only_from_preparation() {
        let mut session = CombatSession::new(
            vec![player("hero"), enemy("raider", 50)],
            no_crit_config(),
            7,
        );
        session.start().unwrap();
        assert_eq!(session.phase(), CombatPhase::InProgress);
        assert!(matches!(session.start(), Err(EngineError::CombatOver)));
    }

    #[test]
    fn test_initiative_is_deterministic_for_fixed_seed() {
        let build = || {
            CombatSession::new(
                vec![player("hero"), enemy("raider", 50), enemy("brute", 80)],
                no_crit_config(),
                42,
            )
        };
        let mut a = build();
        let mut b = build();
        a.start().unwrap();
        b.start().unwrap();
        assert_eq!(a.initiative_order(), b.initiative_order());
    }

    #[test]
    fn test_action_before_start_is_rejected() {
        let mut session = CombatSession::new(
            vec![player("hero"), enemy("raider", 50)],
            no_crit_config(),
            7,
        );
        let mut registry = InstanceRegistry::with_builtins();
        let err = session
            .perform_action(
                &"hero".into(),
                ActionKind::Attack {
                    target: "raider".into(),
                },
                &mut registry,
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::CombatNotStarted));
    }

    #[test]
    fn test_out_of_turn_attack_is_rejected() {
        // Player reflex+intelligence 10 vs flat 1 guarantees the player acts
        // first even on the worst rolls
        let mut session = CombatSession::new(
            vec![player("hero"), enemy("raider", 50)],
            no_crit_config(),
            7,
        );
        session.start().unwrap();
        assert_eq!(session.current_actor(), Some(&"hero".into()));
        let mut registry = InstanceRegistry::with_builtins();
        let err = session
            .perform_action(
                &"raider".into(),
                ActionKind::Attack {
                    target: "hero".into(),
                },
                &mut registry,
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::OutOfTurn(_)));
    }

    #[test]
    fn test_defend_allowed_out_of_turn() {
        let mut session = CombatSession::new(
            vec![player("hero"), enemy("raider", 50)],
            no_crit_config(),
            7,
        );
        session.start().unwrap();
        let mut registry = InstanceRegistry::with_builtins();
        let report = session
            .perform_action(&"raider".into(), ActionKind::Defend, &mut registry)
            .unwrap();
        assert!(matches!(report, ActionReport::Defended));
        // The reactive defend did not consume the current actor's turn
        assert_eq!(session.current_actor(), Some(&"hero".into()));
    }

    #[test]
    fn test_unarmed_attack_deals_base_damage() {
        let mut session = CombatSession::new(
            vec![player("hero"), enemy("raider", 50)],
            no_crit_config(),
            7,
        );
        session.start().unwrap();
        let mut registry = InstanceRegistry::with_builtins();
        let report = session
            .perform_action(
                &"hero".into(),
                ActionKind::Attack {
                    target: "raider".into(),
                },
                &mut registry,
            )
            .unwrap();
        match report {
            ActionReport::Attacked { damage, killed, .. } => {
                assert_eq!(damage, 20);
                assert!(!killed);
            }
            other => panic!("expected attack report, got {other:?}"),
        }
        assert_eq!(session.combatant(&"raider".into()).unwrap().actor.health, 30);
    }

    #[test]
    fn test_armed_attack_uses_weapon_and_grants_experience() {
        // No trigger conditions pass: the only effect needs charge the
        // weapon does not have, so the standard attack path runs
        let effect = EffectDescriptor {
            id: "burst".into(),
            name: "Burst".to_string(),
            description: String::new(),
            payload: EffectPayload::Damage {
                damage: 10,
                damage_multiplier: 1.0,
                damage_type: DamageType::Physical,
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
        };
        let mut registry = registry_with(template_with_effect(effect));
        let owner: PlayerId = "hero".into();
        let weapon: WeaponId = "test_rifle".into();
        registry.assign(&owner, &weapon).unwrap();

        let armed = player("hero").with_weapon(owner.clone(), weapon.clone());
        let mut session =
            CombatSession::new(vec![armed, enemy("raider", 50)], no_crit_config(), 7);
        session.start().unwrap();
        session
            .perform_action(
                &"hero".into(),
                ActionKind::Attack {
                    target: "raider".into(),
                },
                &mut registry,
            )
            .unwrap();

        assert_eq!(session.combatant(&"raider".into()).unwrap().actor.health, 30);
        let progress = registry.progress(&owner, &weapon).unwrap();
        // 20 damage * 0.1 multiplier * 1.0 rarity factor
        assert_eq!(progress.experience, 2);
        // Charge accrued at the weapon's charge rate
        assert_eq!(registry.instance(&owner, &weapon).unwrap().current_charge, 10);
    }

    #[test]
    fn test_eligible_special_preempts_standard_attack() {
        let effect = EffectDescriptor {
            id: "burst".into(),
            name: "Burst".to_string(),
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
            costs: EffectCost::free(),
            cooldown: 3,
            duration: 1,
            rarity: 1,
        };
        let mut registry = registry_with(template_with_effect(effect));
        let owner: PlayerId = "hero".into();
        let weapon: WeaponId = "test_rifle".into();
        registry.assign(&owner, &weapon).unwrap();

        let armed = player("hero").with_weapon(owner.clone(), weapon.clone());
        let mut session =
            CombatSession::new(vec![armed, enemy("raider", 50)], no_crit_config(), 7);
        session.start().unwrap();
        let report = session
            .perform_action(
                &"hero".into(),
                ActionKind::Attack {
                    target: "raider".into(),
                },
                &mut registry,
            )
            .unwrap();
        // damage 10 + weapon base 20 * 1.0
        assert!(matches!(report, ActionReport::SpecialTriggered { .. }));
        assert_eq!(session.combatant(&"raider".into()).unwrap().actor.health, 20);
    }

    #[test]
    fn test_victory_when_all_enemies_fall() {
        let mut session = CombatSession::new(
            vec![player("hero"), enemy("raider", 15)],
            no_crit_config(),
            7,
        );
        session.start().unwrap();
        let mut registry = InstanceRegistry::with_builtins();
        session
            .perform_action(
                &"hero".into(),
                ActionKind::Attack {
                    target: "raider".into(),
                },
                &mut registry,
            )
            .unwrap();
        assert_eq!(session.phase(), CombatPhase::PlayerVictory);
        assert!(session.phase().is_terminal());
    }

    #[test]
    fn test_actions_after_terminal_state_are_rejected() {
        let mut session = CombatSession::new(
            vec![player("hero"), enemy("raider", 15)],
            no_crit_config(),
            7,
        );
        session.start().unwrap();
        let mut registry = InstanceRegistry::with_builtins();
        session
            .perform_action(
                &"hero".into(),
                ActionKind::Attack {
                    target: "raider".into(),
                },
                &mut registry,
            )
            .unwrap();
        let err = session
            .perform_action(&"hero".into(), ActionKind::Defend, &mut registry)
            .unwrap_err();
        assert!(matches!(err, EngineError::CombatOver));
    }

    #[test]
    fn test_abort_is_terminal() {
        let mut session = CombatSession::new(
            vec![player("hero"), enemy("raider", 50)],
            no_crit_config(),
            7,
        );
        session.start().unwrap();
        session.abort();
        assert_eq!(session.phase(), CombatPhase::Aborted);
    }

    fn sure_escape_config() -> EngineConfig {
        EngineConfig {
            critical_chance: 0.0,
            escape_base_chance: 1.0,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_player_escape_ends_the_session() {
        let mut session = CombatSession::new(
            vec![player("hero"), enemy("raider", 50)],
            sure_escape_config(),
            7,
        );
        session.start().unwrap();
        let mut registry = InstanceRegistry::with_builtins();
        let report = session
            .perform_action(&"hero".into(), ActionKind::Escape, &mut registry)
            .unwrap();
        assert!(matches!(report, ActionReport::EscapeAttempt { success: true }));
        assert_eq!(session.phase(), CombatPhase::Escaped);
    }

    #[test]
    fn test_fleeing_enemy_leaves_the_fight_running() {
        let mut session = CombatSession::new(
            vec![player("hero"), enemy("raider", 20), enemy("brute", 20)],
            sure_escape_config(),
            7,
        );
        session.start().unwrap();
        let mut registry = InstanceRegistry::with_builtins();

        // Skip to the first enemy and have it flee
        session.next_turn(&mut registry).unwrap();
        let fleeing = session.current_actor().unwrap().clone();
        let report = session
            .perform_action(&fleeing, ActionKind::Escape, &mut registry)
            .unwrap();
        assert!(matches!(report, ActionReport::EscapeAttempt { success: true }));
        assert_eq!(session.phase(), CombatPhase::InProgress);
        assert!(session.combatant(&fleeing).unwrap().fled);

        // The fled enemy is skipped in the order; downing the other one wins
        while session.current_actor() != Some(&"hero".into()) {
            session.next_turn(&mut registry).unwrap();
        }
        let remaining: ActorId = if fleeing == "raider".into() {
            "brute".into()
        } else {
            "raider".into()
        };
        session
            .perform_action(
                &"hero".into(),
                ActionKind::Attack { target: remaining },
                &mut registry,
            )
            .unwrap();
        assert_eq!(session.phase(), CombatPhase::PlayerVictory);
    }

    #[test]
    fn test_wrap_applies_damaging_statuses() {
        use crate::actor::{AppliedStatus, StatusSource};
        use crate::core::types::StatusKind;

        let mut raider = enemy("raider", 50);
        raider.actor.apply_status(AppliedStatus {
            kind: StatusKind::Burning,
            strength: 5,
            start_time: 1,
            end_time: 10,
            source: StatusSource {
                player: "hero".into(),
                weapon: "w".into(),
                effect: "e".into(),
            },
        });
        let mut session =
            CombatSession::new(vec![player("hero"), raider], no_crit_config(), 7);
        session.start().unwrap();
        let mut registry = InstanceRegistry::with_builtins();
        // Both actors act; the wrap applies the burn
        session
            .perform_action(&"hero".into(), ActionKind::Defend, &mut registry)
            .unwrap();
        session
            .perform_action(
                &"raider".into(),
                ActionKind::Attack {
                    target: "hero".into(),
                },
                &mut registry,
            )
            .unwrap();
        assert_eq!(session.turn(), 2);
        assert_eq!(session.combatant(&"raider".into()).unwrap().actor.health, 45);
    }

    #[test]
    fn test_status_snapshot_reports_participants() {
        let mut session = CombatSession::new(
            vec![player("hero"), enemy("raider", 50)],
            no_crit_config(),
            7,
        );
        session.start().unwrap();
        let status = session.status();
        assert_eq!(status.phase, CombatPhase::InProgress);
        assert_eq!(status.participants.len(), 2);
        assert_eq!(status.current_actor, Some("hero".into()));
        assert!(!status.recent_log.is_empty());
    }
}

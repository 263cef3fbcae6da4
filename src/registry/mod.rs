//! Weapon instances and effect activation
//!
//! The registry owns the shared template catalog, every live
//! [`WeaponInstance`], the 1:1 progression records, and the pool of
//! [`ActiveEffect`]s. Triggering is atomic: both resource costs are checked
//! before either is deducted, so a failed trigger leaves no trace.

use ahash::AHashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actor::{ActorState, StatusSource};
use crate::catalog::{EvolutionPath, WeaponCatalog, WeaponTemplate};
use crate::core::config::EngineConfig;
use crate::core::error::{EngineError, Result};
use crate::core::types::{ActorId, EffectId, EvolutionId, PlayerId, Tick, WeaponId};
use crate::effect::resolution::{self, EffectOutcome};
use crate::effect::{CombatContext, EffectDescriptor};
use crate::progression::{EvolutionProgress, ExperienceAction, GrantResult, ProgressSummary};

/// A player's live copy of a template's runtime state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponInstance {
    pub player: PlayerId,
    pub template_id: WeaponId,
    /// Owned copy of the template, mutated in place by evolutions.
    /// The catalog entry itself is never touched.
    pub effective: WeaponTemplate,
    pub current_charge: u32,
    pub current_durability: u32,
    /// Only holds effects currently on cooldown (expiry tick)
    pub cooldowns: AHashMap<EffectId, Tick>,
    pub kill_count: u32,
    pub damage_dealt: u64,
    pub special_triggers: u32,
}

impl WeaponInstance {
    pub fn max_charge(&self) -> u32 {
        self.effective.stats.max_charge
    }

    pub fn max_durability(&self) -> u32 {
        self.effective.stats.durability
    }

    pub fn durability_fraction(&self) -> f64 {
        let max = self.max_durability();
        if max == 0 {
            return 0.0;
        }
        self.current_durability as f64 / max as f64
    }
}

/// Runtime record of a triggered effect, garbage-collected by `tick`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub id: Uuid,
    pub player: PlayerId,
    pub weapon: WeaponId,
    pub effect: EffectId,
    /// The descriptor as it was at trigger time; later evolutions do not
    /// retroactively change an effect in flight
    pub snapshot: EffectDescriptor,
    pub start_time: Tick,
    pub end_time: Tick,
    pub targets: Vec<ActorId>,
    pub result_log: Vec<String>,
}

/// Why a weapon can or cannot fire a special effect right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationResult {
    Eligible(Vec<EffectId>),
    NoEffects,
    AllOnCooldown,
    ConditionsUnmet,
}

impl ActivationResult {
    pub fn is_eligible(&self) -> bool {
        matches!(self, ActivationResult::Eligible(_))
    }

    /// Human-readable reason for the ineligible variants
    pub fn reason(&self) -> &'static str {
        match self {
            ActivationResult::Eligible(_) => "eligible",
            ActivationResult::NoEffects => "weapon has no special effects",
            ActivationResult::AllOnCooldown => "all effects are on cooldown",
            ActivationResult::ConditionsUnmet => "no effect's trigger conditions are met",
        }
    }
}

/// Result of a successful trigger
#[derive(Debug, Clone)]
pub struct TriggerOutcome {
    pub active_effect: Uuid,
    pub outcome: EffectOutcome,
    pub experience: GrantResult,
}

/// Owner of catalog, instances, progression records and active effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceRegistry {
    pub catalog: WeaponCatalog,
    instances: AHashMap<(PlayerId, WeaponId), WeaponInstance>,
    progress: AHashMap<(PlayerId, WeaponId), EvolutionProgress>,
    active_effects: Vec<ActiveEffect>,
    pub config: EngineConfig,
}

impl InstanceRegistry {
    pub fn new(catalog: WeaponCatalog, config: EngineConfig) -> Self {
        Self {
            catalog,
            instances: AHashMap::new(),
            progress: AHashMap::new(),
            active_effects: Vec::new(),
            config,
        }
    }

    /// Registry over the stock arsenal with default tuning
    pub fn with_builtins() -> Self {
        Self::new(WeaponCatalog::with_builtins(), EngineConfig::default())
    }

    /// Assign a template to a player: fresh instance at zero charge and full
    /// durability, with a co-created level 1 progression record.
    pub fn assign(&mut self, player: &PlayerId, template_id: &WeaponId) -> Result<()> {
        let template = self
            .catalog
            .get(template_id)
            .ok_or_else(|| EngineError::TemplateNotFound(template_id.clone()))?
            .clone();
        let key = (player.clone(), template_id.clone());
        if self.instances.contains_key(&key) {
            return Err(EngineError::AlreadyAssigned {
                player: player.clone(),
                weapon: template_id.clone(),
            });
        }
        let instance = WeaponInstance {
            player: player.clone(),
            template_id: template_id.clone(),
            current_charge: 0,
            current_durability: template.stats.durability,
            effective: template,
            cooldowns: AHashMap::new(),
            kill_count: 0,
            damage_dealt: 0,
            special_triggers: 0,
        };
        tracing::info!(player = %player, weapon = %template_id, "weapon assigned");
        self.instances.insert(key.clone(), instance);
        self.progress
            .insert(key, EvolutionProgress::new(&self.config));
        Ok(())
    }

    pub fn instance(&self, player: &PlayerId, weapon: &WeaponId) -> Result<&WeaponInstance> {
        self.instances
            .get(&(player.clone(), weapon.clone()))
            .ok_or_else(|| EngineError::InstanceNotFound {
                player: player.clone(),
                weapon: weapon.clone(),
            })
    }

    fn instance_mut(&mut self, player: &PlayerId, weapon: &WeaponId) -> Result<&mut WeaponInstance> {
        self.instances
            .get_mut(&(player.clone(), weapon.clone()))
            .ok_or_else(|| EngineError::InstanceNotFound {
                player: player.clone(),
                weapon: weapon.clone(),
            })
    }

    pub fn progress(&self, player: &PlayerId, weapon: &WeaponId) -> Result<&EvolutionProgress> {
        self.progress
            .get(&(player.clone(), weapon.clone()))
            .ok_or_else(|| EngineError::InstanceNotFound {
                player: player.clone(),
                weapon: weapon.clone(),
            })
    }

    /// All of one player's weapons, id-sorted for stable listings
    pub fn player_weapons(&self, player: &PlayerId) -> Vec<&WeaponInstance> {
        let mut found: Vec<&WeaponInstance> = self
            .instances
            .values()
            .filter(|i| &i.player == player)
            .collect();
        found.sort_by(|a, b| a.template_id.cmp(&b.template_id));
        found
    }

    /// Remove an instance and its progression record (disassembly, loss)
    pub fn remove(&mut self, player: &PlayerId, weapon: &WeaponId) -> Result<WeaponInstance> {
        let key = (player.clone(), weapon.clone());
        let instance = self
            .instances
            .remove(&key)
            .ok_or_else(|| EngineError::InstanceNotFound {
                player: player.clone(),
                weapon: weapon.clone(),
            })?;
        self.progress.remove(&key);
        tracing::info!(player = %player, weapon = %weapon, "weapon removed");
        Ok(instance)
    }

    /// Accrue charge (e.g. one standard attack's worth), clamped to max.
    /// Returns the new charge level.
    pub fn add_charge(&mut self, player: &PlayerId, weapon: &WeaponId, amount: u32) -> Result<u32> {
        let instance = self.instance_mut(player, weapon)?;
        let max = instance.max_charge();
        instance.current_charge = (instance.current_charge + amount).min(max);
        Ok(instance.current_charge)
    }

    /// Restore durability, clamped to the effective template's maximum
    pub fn repair(&mut self, player: &PlayerId, weapon: &WeaponId, amount: u32) -> Result<u32> {
        let instance = self.instance_mut(player, weapon)?;
        let max = instance.max_durability();
        instance.current_durability = (instance.current_durability + amount).min(max);
        Ok(instance.current_durability)
    }

    /// Evaluate which effects could fire right now. Expired cooldown entries
    /// are purged first so the cooldown map only ever holds live entries.
    pub fn check_activation(
        &mut self,
        player: &PlayerId,
        weapon: &WeaponId,
        ctx: &CombatContext,
        rng: &mut impl Rng,
    ) -> Result<ActivationResult> {
        let instance = self.instance_mut(player, weapon)?;
        let now = ctx.time;
        instance.cooldowns.retain(|_, expiry| *expiry > now);

        if instance.effective.effects.is_empty() {
            return Ok(ActivationResult::NoEffects);
        }
        let off_cooldown: Vec<&EffectDescriptor> = instance
            .effective
            .effects
            .iter()
            .filter(|e| !instance.cooldowns.contains_key(&e.id))
            .collect();
        if off_cooldown.is_empty() {
            return Ok(ActivationResult::AllOnCooldown);
        }
        let charge = instance.current_charge;
        let eligible: Vec<EffectId> = off_cooldown
            .iter()
            .filter(|e| e.trigger_conditions.evaluate(charge, ctx, rng))
            .map(|e| e.id.clone())
            .collect();
        if eligible.is_empty() {
            return Ok(ActivationResult::ConditionsUnmet);
        }
        Ok(ActivationResult::Eligible(eligible))
    }

    /// Trigger one effect: re-validate, pay costs atomically, set the
    /// cooldown, resolve against the targets, and grant trigger experience.
    #[allow(clippy::too_many_arguments)]
    pub fn trigger(
        &mut self,
        player: &PlayerId,
        weapon: &WeaponId,
        effect_id: &EffectId,
        player_actor: &mut ActorState,
        targets: &mut [ActorState],
        primary: Option<&ActorId>,
        ctx: &CombatContext,
        rng: &mut impl Rng,
    ) -> Result<TriggerOutcome> {
        let config = self.config.clone();
        let instance = self.instance_mut(player, weapon)?;
        let now = ctx.time;
        instance.cooldowns.retain(|_, expiry| *expiry > now);

        let descriptor = instance
            .effective
            .effect(effect_id)
            .ok_or_else(|| EngineError::EffectNotFound {
                weapon: weapon.clone(),
                effect: effect_id.clone(),
            })?
            .clone();

        if let Some(until) = instance.cooldowns.get(effect_id) {
            return Err(EngineError::OnCooldown {
                effect: effect_id.clone(),
                until: *until,
            });
        }
        if !descriptor
            .trigger_conditions
            .evaluate(instance.current_charge, ctx, rng)
        {
            return Err(EngineError::NotEligible {
                effect: effect_id.clone(),
                reason: "trigger conditions not met".to_string(),
            });
        }

        // Both costs must be payable before either is deducted
        if instance.current_charge < descriptor.costs.charge {
            return Err(EngineError::InsufficientCharge {
                have: instance.current_charge,
                need: descriptor.costs.charge,
            });
        }
        if instance.current_durability < descriptor.costs.durability {
            return Err(EngineError::InsufficientDurability {
                have: instance.current_durability,
                need: descriptor.costs.durability,
            });
        }
        instance.current_charge -= descriptor.costs.charge;
        instance.current_durability -= descriptor.costs.durability;
        if descriptor.cooldown > 0 {
            instance
                .cooldowns
                .insert(effect_id.clone(), now + descriptor.cooldown);
        }
        instance.special_triggers += 1;
        let weapon_base_damage = instance.effective.stats.base_damage;

        let source = StatusSource {
            player: player.clone(),
            weapon: weapon.clone(),
            effect: effect_id.clone(),
        };
        let outcome = resolution::resolve_effect(
            &descriptor,
            weapon_base_damage,
            &source,
            player_actor,
            targets,
            primary,
            ctx,
            &config,
            rng,
        );

        // Post-resolution bookkeeping on the same instance
        let instance = self.instance_mut(player, weapon)?;
        instance.damage_dealt += outcome.total_damage().max(0) as u64;
        instance.kill_count += outcome.kills();
        if let crate::effect::resolution::OutcomeDetail::Utility(
            crate::effect::resolution::UtilityReport::ChargeRefund { amount },
        ) = &outcome.detail
        {
            let max = instance.max_charge();
            instance.current_charge = (instance.current_charge + amount).min(max);
        }

        let active = ActiveEffect {
            id: Uuid::new_v4(),
            player: player.clone(),
            weapon: weapon.clone(),
            effect: effect_id.clone(),
            snapshot: descriptor.clone(),
            start_time: now,
            end_time: now + descriptor.duration,
            targets: targets.iter().map(|t| t.id.clone()).collect(),
            result_log: vec![outcome.message.clone()],
        };
        let active_id = active.id;
        self.active_effects.push(active);

        let experience = self.grant_experience(
            player,
            weapon,
            ExperienceAction::EffectTriggered,
            descriptor.rarity as u64 * config.effect_trigger_exp,
        )?;

        tracing::debug!(
            player = %player,
            weapon = %weapon,
            effect = %effect_id,
            success = outcome.success,
            "effect triggered"
        );
        Ok(TriggerOutcome {
            active_effect: active_id,
            outcome,
            experience,
        })
    }

    /// Drain and return every active effect that has run its course
    pub fn tick(&mut self, now: Tick) -> Vec<ActiveEffect> {
        let mut expired = Vec::new();
        let mut index = 0;
        while index < self.active_effects.len() {
            if self.active_effects[index].end_time <= now {
                expired.push(self.active_effects.swap_remove(index));
            } else {
                index += 1;
            }
        }
        expired
    }

    pub fn active_effects(&self) -> &[ActiveEffect] {
        &self.active_effects
    }

    /// Grant experience for one action, dampened by the weapon's rarity
    pub fn grant_experience(
        &mut self,
        player: &PlayerId,
        weapon: &WeaponId,
        action: ExperienceAction,
        base_exp: u64,
    ) -> Result<GrantResult> {
        let rarity = self.instance(player, weapon)?.effective.rarity;
        let config = self.config.clone();
        let progress = self
            .progress
            .get_mut(&(player.clone(), weapon.clone()))
            .ok_or_else(|| EngineError::InstanceNotFound {
                player: player.clone(),
                weapon: weapon.clone(),
            })?;
        Ok(progress.grant_experience(action, base_exp, rarity, &config))
    }

    pub fn available_evolutions(
        &self,
        player: &PlayerId,
        weapon: &WeaponId,
    ) -> Result<Vec<&EvolutionPath>> {
        let instance = self.instance(player, weapon)?;
        let progress = self.progress(player, weapon)?;
        Ok(progress.available_evolutions(&instance.effective))
    }

    pub fn apply_evolution(
        &mut self,
        player: &PlayerId,
        weapon: &WeaponId,
        evolution: &EvolutionId,
    ) -> Result<()> {
        let key = (player.clone(), weapon.clone());
        let Some(instance) = self.instances.get_mut(&key) else {
            return Err(EngineError::InstanceNotFound {
                player: player.clone(),
                weapon: weapon.clone(),
            });
        };
        let Some(progress) = self.progress.get_mut(&key) else {
            return Err(EngineError::InstanceNotFound {
                player: player.clone(),
                weapon: weapon.clone(),
            });
        };
        progress.apply_evolution(&mut instance.effective, evolution)?;
        // Scalar overrides can lower the caps; stored resources stay within them
        instance.current_charge = instance.current_charge.min(instance.effective.stats.max_charge);
        instance.current_durability = instance
            .current_durability
            .min(instance.effective.stats.durability);
        Ok(())
    }

    pub fn progress_summary(&self, player: &PlayerId, weapon: &WeaponId) -> Result<ProgressSummary> {
        Ok(self.progress(player, weapon)?.summary(&self.config))
    }

    pub(crate) fn instances(&self) -> impl Iterator<Item = &WeaponInstance> {
        self.instances.values()
    }

    /// Reinstall a pre-constructed instance and progression record (load path)
    pub(crate) fn restore_instance(
        &mut self,
        instance: WeaponInstance,
        progress: EvolutionProgress,
    ) {
        let key = (instance.player.clone(), instance.template_id.clone());
        self.instances.insert(key.clone(), instance);
        self.progress.insert(key, progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(99)
    }

    fn setup() -> (InstanceRegistry, PlayerId, WeaponId) {
        let mut registry = InstanceRegistry::with_builtins();
        let player = PlayerId::new("p1");
        let weapon = WeaponId::new("nova_blaster");
        registry.assign(&player, &weapon).unwrap();
        (registry, player, weapon)
    }

    #[test]
    fn test_assign_initial_state() {
        let (registry, player, weapon) = setup();
        let instance = registry.instance(&player, &weapon).unwrap();
        assert_eq!(instance.current_charge, 0);
        assert_eq!(instance.current_durability, 100);
        let progress = registry.progress(&player, &weapon).unwrap();
        assert_eq!(progress.level, 1);
        assert_eq!(progress.next_level_threshold, 1000);
    }

    #[test]
    fn test_double_assign_rejected() {
        let (mut registry, player, weapon) = setup();
        let err = registry.assign(&player, &weapon).unwrap_err();
        assert!(matches!(err, EngineError::AlreadyAssigned { .. }));
    }

    #[test]
    fn test_assign_unknown_template() {
        let mut registry = InstanceRegistry::with_builtins();
        let err = registry
            .assign(&PlayerId::new("p1"), &WeaponId::new("nonexistent"))
            .unwrap_err();
        assert!(matches!(err, EngineError::TemplateNotFound(_)));
    }

    #[test]
    fn test_add_charge_clamps_to_max() {
        let (mut registry, player, weapon) = setup();
        registry.add_charge(&player, &weapon, 80).unwrap();
        let charge = registry.add_charge(&player, &weapon, 80).unwrap();
        assert_eq!(charge, 100);
    }

    #[test]
    fn test_check_activation_distinguishes_reasons() {
        let (mut registry, player, weapon) = setup();
        let ctx = CombatContext::at(0);

        // Zero charge: both effects need min_charge
        let result = registry
            .check_activation(&player, &weapon, &ctx, &mut rng())
            .unwrap();
        assert_eq!(result, ActivationResult::ConditionsUnmet);

        registry.add_charge(&player, &weapon, 100).unwrap();
        let result = registry
            .check_activation(&player, &weapon, &ctx, &mut rng())
            .unwrap();
        match result {
            ActivationResult::Eligible(effects) => assert_eq!(effects.len(), 2),
            other => panic!("expected eligible, got {other:?}"),
        }
    }

    #[test]
    fn test_trigger_deducts_and_sets_cooldown() {
        let (mut registry, player, weapon) = setup();
        registry.add_charge(&player, &weapon, 60).unwrap();
        let mut actor = ActorState::new("p1", "Player", 100);
        let mut targets = vec![ActorState::new("e1", "Enemy", 200)];
        let primary = ActorId::new("e1");
        let ctx = CombatContext::at(1);

        let outcome = registry
            .trigger(
                &player,
                &weapon,
                &EffectId::new("energy_burst"),
                &mut actor,
                &mut targets,
                Some(&primary),
                &ctx,
                &mut rng(),
            )
            .unwrap();
        assert!(outcome.outcome.success);
        // 50 + floor(25 * 1.0) = 75
        assert_eq!(outcome.outcome.total_damage(), 75);
        assert_eq!(targets[0].health, 125);

        let instance = registry.instance(&player, &weapon).unwrap();
        assert_eq!(instance.current_charge, 10);
        assert_eq!(instance.special_triggers, 1);
        assert_eq!(instance.damage_dealt, 75);
        assert_eq!(instance.cooldowns[&EffectId::new("energy_burst")], 4);
        assert_eq!(registry.active_effects().len(), 1);
    }

    #[test]
    fn test_trigger_insufficient_charge_is_side_effect_free() {
        let (mut registry, player, weapon) = setup();
        registry.add_charge(&player, &weapon, 40).unwrap();
        let mut actor = ActorState::new("p1", "Player", 100);
        let mut targets = vec![ActorState::new("e1", "Enemy", 200)];
        let primary = ActorId::new("e1");

        let err = registry
            .trigger(
                &player,
                &weapon,
                &EffectId::new("energy_burst"),
                &mut actor,
                &mut targets,
                Some(&primary),
                &CombatContext::at(1),
                &mut rng(),
            )
            .unwrap_err();
        // min_charge gate and cost are both 50; either way no side effects
        assert!(err.is_resource_error());

        let instance = registry.instance(&player, &weapon).unwrap();
        assert_eq!(instance.current_charge, 40);
        assert_eq!(instance.current_durability, 100);
        assert!(instance.cooldowns.is_empty());
        assert_eq!(instance.special_triggers, 0);
        assert!(registry.active_effects().is_empty());
    }

    #[test]
    fn test_trigger_on_cooldown_rejected() {
        let (mut registry, player, weapon) = setup();
        registry.add_charge(&player, &weapon, 100).unwrap();
        let mut actor = ActorState::new("p1", "Player", 100);
        let mut targets = vec![ActorState::new("e1", "Enemy", 500)];
        let primary = ActorId::new("e1");
        let effect = EffectId::new("energy_burst");

        registry
            .trigger(
                &player,
                &weapon,
                &effect,
                &mut actor,
                &mut targets,
                Some(&primary),
                &CombatContext::at(1),
                &mut rng(),
            )
            .unwrap();
        registry.add_charge(&player, &weapon, 100).unwrap();
        let err = registry
            .trigger(
                &player,
                &weapon,
                &effect,
                &mut actor,
                &mut targets,
                Some(&primary),
                &CombatContext::at(2),
                &mut rng(),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::OnCooldown { .. }));

        // Cooldown expires at tick 4
        registry
            .trigger(
                &player,
                &weapon,
                &effect,
                &mut actor,
                &mut targets,
                Some(&primary),
                &CombatContext::at(4),
                &mut rng(),
            )
            .unwrap();
    }

    #[test]
    fn test_trigger_grants_experience() {
        let (mut registry, player, weapon) = setup();
        registry.add_charge(&player, &weapon, 60).unwrap();
        let mut actor = ActorState::new("p1", "Player", 100);
        let mut targets = vec![ActorState::new("e1", "Enemy", 500)];
        let primary = ActorId::new("e1");

        let outcome = registry
            .trigger(
                &player,
                &weapon,
                &EffectId::new("energy_burst"),
                &mut actor,
                &mut targets,
                Some(&primary),
                &CombatContext::at(1),
                &mut rng(),
            )
            .unwrap();
        // rarity 2 effect: 200 base, x1.5 action, x0.8 rare weapon = 240
        assert_eq!(outcome.experience.experience_gained, 240);
        assert_eq!(registry.progress(&player, &weapon).unwrap().experience, 240);
    }

    #[test]
    fn test_tick_drains_expired_effects() {
        let (mut registry, player, weapon) = setup();
        registry.add_charge(&player, &weapon, 60).unwrap();
        let mut actor = ActorState::new("p1", "Player", 100);
        let mut targets = vec![ActorState::new("e1", "Enemy", 500)];
        let primary = ActorId::new("e1");
        registry
            .trigger(
                &player,
                &weapon,
                &EffectId::new("energy_burst"),
                &mut actor,
                &mut targets,
                Some(&primary),
                &CombatContext::at(1),
                &mut rng(),
            )
            .unwrap();

        assert!(registry.tick(1).is_empty());
        let expired = registry.tick(2);
        assert_eq!(expired.len(), 1);
        assert!(registry.active_effects().is_empty());
    }

    #[test]
    fn test_remove_drops_progress_too() {
        let (mut registry, player, weapon) = setup();
        registry.remove(&player, &weapon).unwrap();
        assert!(registry.instance(&player, &weapon).is_err());
        assert!(registry.progress(&player, &weapon).is_err());
    }

    #[test]
    fn test_apply_evolution_via_registry() {
        let (mut registry, player, weapon) = setup();
        {
            let progress = registry
                .progress
                .get_mut(&(player.clone(), weapon.clone()))
                .unwrap();
            progress.level = 3;
            progress.evolutions_available = 1;
        }
        registry
            .apply_evolution(&player, &weapon, &EvolutionId::new("improved_capacitors"))
            .unwrap();
        let instance = registry.instance(&player, &weapon).unwrap();
        assert_eq!(instance.effective.stats.max_charge, 150);
        // Shared catalog entry untouched
        assert_eq!(registry.catalog.get(&weapon).unwrap().stats.max_charge, 100);
    }

    #[test]
    fn test_evolution_lowering_durability_clamps_current() {
        use crate::catalog::{BaseStats, EvolutionEffects};
        use crate::core::types::{DamageType, Rarity, WeaponCategory};
        use crate::effect::{EffectCost, EffectPayload, TriggerConditions};

        let template = WeaponTemplate {
            id: WeaponId::new("field_rifle"),
            name: "Field Rifle".to_string(),
            description: "A rifle with a lightened conversion path".to_string(),
            category: WeaponCategory::Projectile,
            rarity: Rarity::Common,
            stats: BaseStats {
                base_damage: 20,
                damage_type: DamageType::Physical,
                range: 15,
                accuracy: 0.85,
                max_charge: 100,
                charge_rate: 10,
                durability: 100,
                weight: 4.0,
            },
            effects: vec![EffectDescriptor {
                id: EffectId::new("burst_fire"),
                name: "Burst Fire".to_string(),
                description: "Three rounds in one pull".to_string(),
                payload: EffectPayload::Damage {
                    damage: 15,
                    damage_multiplier: 1.0,
                    damage_type: DamageType::Physical,
                    armor_penetration: 0.0,
                    max_targets: 1,
                    aoe_radius: 0,
                },
                trigger_conditions: TriggerConditions::none(),
                costs: EffectCost::charge(20),
                cooldown: 2,
                duration: 1,
                rarity: 1,
            }],
            evolution_paths: vec![EvolutionPath {
                id: EvolutionId::new("lightened_receiver"),
                name: "Lightened Receiver".to_string(),
                description: "Trades casing strength for handling".to_string(),
                level_requirement: 3,
                prerequisites: Vec::new(),
                effects: EvolutionEffects {
                    accuracy: Some(0.95),
                    durability: Some(60),
                    ..Default::default()
                },
            }],
        };
        let mut catalog = WeaponCatalog::new();
        catalog.register_template(template).unwrap();
        let mut registry = InstanceRegistry::new(catalog, EngineConfig::default());
        let player = PlayerId::new("p1");
        let weapon = WeaponId::new("field_rifle");
        registry.assign(&player, &weapon).unwrap();
        {
            let progress = registry
                .progress
                .get_mut(&(player.clone(), weapon.clone()))
                .unwrap();
            progress.level = 3;
            progress.evolutions_available = 1;
        }

        registry
            .apply_evolution(&player, &weapon, &EvolutionId::new("lightened_receiver"))
            .unwrap();

        // Current durability follows the lowered cap down
        let instance = registry.instance(&player, &weapon).unwrap();
        assert_eq!(instance.max_durability(), 60);
        assert_eq!(instance.current_durability, 60);
        assert!(instance.durability_fraction() <= 1.0);
    }
}

//! Effect resolution
//!
//! Pure outcome computation for one triggered effect against a set of
//! targets. The only state touched is the actors passed in; resource
//! accounting (charge, durability, cooldowns) happens in the registry
//! before resolution is invoked. Failures are structured outcomes with
//! `success = false`, never panics.

use rand::Rng;

use crate::actor::{ActorState, AppliedStatus, ModifierKind, StatusSource};
use crate::core::config::EngineConfig;
use crate::core::types::{ActorId, DamageType, StatusKind, Tick};
use crate::effect::{CombatContext, EffectDescriptor, EffectPayload, TeleportDirection, UtilityPayload};

/// One target's share of a damage effect
#[derive(Debug, Clone, PartialEq)]
pub struct DamageReport {
    pub target: ActorId,
    pub damage: i32,
    pub damage_type: DamageType,
    pub killed: bool,
}

/// One target's share of a status effect
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub target: ActorId,
    pub kind: StatusKind,
    pub chance: f32,
    pub applied: bool,
}

/// A revealed weakness from a scan
#[derive(Debug, Clone, PartialEq)]
pub struct WeaknessReport {
    pub target: ActorId,
    pub damage_type: DamageType,
    pub resistance: f32,
}

/// Result of a utility effect
#[derive(Debug, Clone, PartialEq)]
pub enum UtilityReport {
    Teleport {
        distance: u32,
        direction: TeleportDirection,
    },
    Stealth { level: i32, until: Tick },
    Shield { amount: i32, until: Tick },
    Scan { weaknesses: Vec<WeaknessReport> },
    Heal { restored: i32 },
    /// Charge restoration is applied by the registry, which owns the weapon
    ChargeRefund { amount: u32 },
    AccuracyBoost { bonus: f32, until: Tick },
    StanceShift { critical_bonus: f32, until: Tick },
    ReloadBoost { bonus: f32, until: Tick },
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeDetail {
    Damage {
        hits: Vec<DamageReport>,
        total_damage: i32,
        kills: u32,
    },
    Status { applications: Vec<StatusReport> },
    Utility(UtilityReport),
    Failed,
}

/// The full result of resolving one effect
#[derive(Debug, Clone, PartialEq)]
pub struct EffectOutcome {
    pub success: bool,
    pub message: String,
    pub detail: OutcomeDetail,
}

impl EffectOutcome {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            detail: OutcomeDetail::Failed,
        }
    }

    /// Damage dealt across all hits, zero for non-damage outcomes
    pub fn total_damage(&self) -> i32 {
        match &self.detail {
            OutcomeDetail::Damage { total_damage, .. } => *total_damage,
            _ => 0,
        }
    }

    /// Targets killed by this outcome
    pub fn kills(&self) -> u32 {
        match &self.detail {
            OutcomeDetail::Damage { kills, .. } => *kills,
            _ => 0,
        }
    }
}

/// Standard (non-special) attack damage against one target, using the same
/// formula as damage effects with no flat bonus and multiplier 1.
pub fn standard_damage(base_damage: i32, damage_type: DamageType, target: &ActorState) -> i32 {
    damage_against(base_damage, damage_type, 0.0, target)
}

fn damage_against(
    total: i32,
    damage_type: DamageType,
    armor_penetration: f32,
    target: &ActorState,
) -> i32 {
    let resistance = (target.resistance(damage_type) - armor_penetration).max(0.0);
    let reduced = (total as f32 * (1.0 - resistance)).floor() as i32;
    reduced.max(1)
}

/// Resolve one effect descriptor. `targets` is the caller's candidate list in
/// stable order; `primary` names the explicitly selected target for damage
/// and status payloads.
#[allow(clippy::too_many_arguments)]
pub fn resolve_effect(
    descriptor: &EffectDescriptor,
    weapon_base_damage: i32,
    source: &StatusSource,
    player: &mut ActorState,
    targets: &mut [ActorState],
    primary: Option<&ActorId>,
    ctx: &CombatContext,
    config: &EngineConfig,
    rng: &mut impl Rng,
) -> EffectOutcome {
    match &descriptor.payload {
        EffectPayload::Damage {
            damage,
            damage_multiplier,
            damage_type,
            armor_penetration,
            max_targets,
            aoe_radius,
        } => resolve_damage(
            descriptor,
            *damage + (weapon_base_damage as f32 * damage_multiplier).floor() as i32,
            *damage_type,
            *armor_penetration,
            (*max_targets).max(1),
            *aoe_radius,
            targets,
            primary,
            ctx,
        ),
        EffectPayload::Status {
            status_type,
            duration,
            strength,
            application_chance,
            max_targets,
        } => resolve_status(
            descriptor,
            *status_type,
            *duration,
            *strength,
            *application_chance,
            (*max_targets).max(1),
            source,
            targets,
            primary,
            ctx,
            config,
            rng,
        ),
        EffectPayload::Utility(utility) => {
            resolve_utility(descriptor, utility, player, targets, ctx)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_damage(
    descriptor: &EffectDescriptor,
    total: i32,
    damage_type: DamageType,
    armor_penetration: f32,
    max_targets: usize,
    aoe_radius: u32,
    targets: &mut [ActorState],
    primary: Option<&ActorId>,
    ctx: &CombatContext,
) -> EffectOutcome {
    let Some(primary) = primary else {
        return EffectOutcome::failure(format!("{} requires a target", descriptor.name));
    };
    if !targets.iter().any(|t| &t.id == primary) {
        return EffectOutcome::failure(format!(
            "{} target {primary} is not in the fight",
            descriptor.name
        ));
    }

    // Primary always hits; within an area, remaining slots fill in input order
    let mut selected: Vec<ActorId> = vec![primary.clone()];
    if aoe_radius > 0 {
        for target in targets.iter() {
            if selected.len() >= max_targets {
                break;
            }
            if &target.id != primary && ctx.distance_to(&target.id) <= aoe_radius {
                selected.push(target.id.clone());
            }
        }
    }

    let mut hits = Vec::with_capacity(selected.len());
    let mut total_damage = 0;
    let mut kills = 0;
    for id in &selected {
        if let Some(target) = targets.iter_mut().find(|t| &t.id == id) {
            let final_damage = damage_against(total, damage_type, armor_penetration, target);
            let was_alive = target.is_alive();
            target.apply_damage(final_damage);
            let killed = was_alive && !target.is_alive();
            if killed {
                kills += 1;
            }
            total_damage += final_damage;
            hits.push(DamageReport {
                target: id.clone(),
                damage: final_damage,
                damage_type,
                killed,
            });
        }
    }

    let message = if hits.len() == 1 {
        format!(
            "{} hit {} for {} {} damage",
            descriptor.name, hits[0].target, hits[0].damage, damage_type
        )
    } else {
        format!(
            "{} hit {} targets for {} {} damage",
            descriptor.name,
            hits.len(),
            total_damage,
            damage_type
        )
    };

    EffectOutcome {
        success: true,
        message,
        detail: OutcomeDetail::Damage {
            hits,
            total_damage,
            kills,
        },
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_status(
    descriptor: &EffectDescriptor,
    kind: StatusKind,
    duration: Tick,
    strength: i32,
    application_chance: f32,
    max_targets: usize,
    source: &StatusSource,
    targets: &mut [ActorState],
    primary: Option<&ActorId>,
    ctx: &CombatContext,
    config: &EngineConfig,
    rng: &mut impl Rng,
) -> EffectOutcome {
    let Some(primary) = primary else {
        return EffectOutcome::failure(format!("{} requires a target", descriptor.name));
    };
    if !targets.iter().any(|t| &t.id == primary) {
        return EffectOutcome::failure(format!(
            "{} target {primary} is not in the fight",
            descriptor.name
        ));
    }

    let mut selected: Vec<ActorId> = vec![primary.clone()];
    for target in targets.iter() {
        if selected.len() >= max_targets {
            break;
        }
        if &target.id != primary {
            selected.push(target.id.clone());
        }
    }

    let mut applications = Vec::with_capacity(selected.len());
    for id in &selected {
        if let Some(target) = targets.iter_mut().find(|t| &t.id == id) {
            let chance = (application_chance - target.status_resistance(kind))
                .max(config.min_status_chance);
            let applied = target.can_receive_status && rng.gen::<f32>() < chance;
            if applied {
                target.apply_status(AppliedStatus {
                    kind,
                    strength,
                    start_time: ctx.time,
                    end_time: ctx.time + duration,
                    source: source.clone(),
                });
            }
            applications.push(StatusReport {
                target: id.clone(),
                kind,
                chance,
                applied,
            });
        }
    }

    let applied_count = applications.iter().filter(|a| a.applied).count();
    let message = format!(
        "{} applied {kind} to {applied_count} of {} targets",
        descriptor.name,
        applications.len()
    );

    EffectOutcome {
        success: true,
        message,
        detail: OutcomeDetail::Status { applications },
    }
}

fn resolve_utility(
    descriptor: &EffectDescriptor,
    utility: &UtilityPayload,
    player: &mut ActorState,
    targets: &mut [ActorState],
    ctx: &CombatContext,
) -> EffectOutcome {
    let (report, message) = match utility {
        UtilityPayload::Teleport { distance, direction } => (
            UtilityReport::Teleport {
                distance: *distance,
                direction: *direction,
            },
            format!("{} displaced {} by {distance} units", descriptor.name, player.name),
        ),
        UtilityPayload::Stealth { level, duration } => {
            player.attach_modifier(ModifierKind::Stealth { level: *level }, ctx.time, *duration);
            (
                UtilityReport::Stealth {
                    level: *level,
                    until: ctx.time + duration,
                },
                format!("{} cloaked {} (level {level})", descriptor.name, player.name),
            )
        }
        UtilityPayload::Shield { amount, duration } => {
            if *amount <= 0 {
                return EffectOutcome::failure(format!(
                    "{} has a non-positive shield amount",
                    descriptor.name
                ));
            }
            player.attach_modifier(ModifierKind::Shield { amount: *amount }, ctx.time, *duration);
            (
                UtilityReport::Shield {
                    amount: *amount,
                    until: ctx.time + duration,
                },
                format!("{} shielded {} for {amount}", descriptor.name, player.name),
            )
        }
        UtilityPayload::Scan {
            max_targets,
            reveal_weakness,
            ..
        } => {
            let mut weaknesses = Vec::new();
            if *reveal_weakness {
                for target in targets.iter().take((*max_targets).max(1)) {
                    // Lowest resistance wins; ties resolve to the first type
                    // in declaration order
                    let mut weakest = (DamageType::ALL[0], target.resistance(DamageType::ALL[0]));
                    for damage_type in DamageType::ALL {
                        let resistance = target.resistance(damage_type);
                        if resistance < weakest.1 {
                            weakest = (damage_type, resistance);
                        }
                    }
                    weaknesses.push(WeaknessReport {
                        target: target.id.clone(),
                        damage_type: weakest.0,
                        resistance: weakest.1,
                    });
                }
            }
            let message = format!(
                "{} scanned {} targets",
                descriptor.name,
                weaknesses.len()
            );
            (UtilityReport::Scan { weaknesses }, message)
        }
        UtilityPayload::Heal { amount, percentage } => {
            let total = *amount + (player.max_health as f32 * percentage).floor() as i32;
            if total <= 0 {
                return EffectOutcome::failure(format!(
                    "{} computes a non-positive heal",
                    descriptor.name
                ));
            }
            let restored = player.heal(total);
            (
                UtilityReport::Heal { restored },
                format!("{} restored {restored} health to {}", descriptor.name, player.name),
            )
        }
        UtilityPayload::ChargeRefund { amount } => (
            UtilityReport::ChargeRefund { amount: *amount },
            format!("{} refunded {amount} charge", descriptor.name),
        ),
        UtilityPayload::AccuracyBoost { bonus, duration } => {
            player.attach_modifier(
                ModifierKind::AccuracyBoost { bonus: *bonus },
                ctx.time,
                *duration,
            );
            (
                UtilityReport::AccuracyBoost {
                    bonus: *bonus,
                    until: ctx.time + duration,
                },
                format!("{} steadied {}'s aim", descriptor.name, player.name),
            )
        }
        UtilityPayload::StanceShift {
            critical_bonus,
            duration,
        } => {
            player.attach_modifier(
                ModifierKind::CriticalBoost {
                    bonus: *critical_bonus,
                },
                ctx.time,
                *duration,
            );
            (
                UtilityReport::StanceShift {
                    critical_bonus: *critical_bonus,
                    until: ctx.time + duration,
                },
                format!("{} shifted {}'s stance", descriptor.name, player.name),
            )
        }
        UtilityPayload::ReloadBoost { bonus, duration } => {
            player.attach_modifier(
                ModifierKind::ReloadBoost { bonus: *bonus },
                ctx.time,
                *duration,
            );
            (
                UtilityReport::ReloadBoost {
                    bonus: *bonus,
                    until: ctx.time + duration,
                },
                format!("{} accelerated {}'s reload", descriptor.name, player.name),
            )
        }
    };

    EffectOutcome {
        success: true,
        message,
        detail: OutcomeDetail::Utility(report),
    }
}

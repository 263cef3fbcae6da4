//! Special-weapon effect model
//!
//! An [`EffectDescriptor`] is a declarative definition of one ability a
//! weapon can trigger: a tagged payload (damage, status or utility), a
//! conjunctive set of trigger predicates, resource costs and a cooldown.
//! Resolution of a triggered effect lives in [`resolution`].

pub mod resolution;

use ahash::AHashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{ActorId, DamageType, EffectId, StatusKind, Tick};

/// Direction tag for teleport effects (no real positional model)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TeleportDirection {
    #[default]
    Forward,
    Backward,
    Left,
    Right,
}

/// Utility effect sub-types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UtilityPayload {
    /// Reports displacement only; positions are not modeled
    Teleport {
        distance: u32,
        direction: TeleportDirection,
    },
    /// Timed stealth modifier on the acting player
    Stealth { level: i32, duration: Tick },
    /// Timed damage-absorbing shield on the acting player
    Shield { amount: i32, duration: Tick },
    /// Reveals the weakest resistance of up to `max_targets` enemies
    Scan {
        range: u32,
        max_targets: usize,
        reveal_weakness: bool,
    },
    /// Restores `amount + max_health * percentage` health
    Heal { amount: i32, percentage: f32 },
    /// Refunds charge to the triggering weapon
    ChargeRefund { amount: u32 },
    /// Timed accuracy bonus on the acting player
    AccuracyBoost { bonus: f32, duration: Tick },
    /// Timed critical-chance bonus (stance shift)
    StanceShift { critical_bonus: f32, duration: Tick },
    /// Timed reload/charge-rate bonus
    ReloadBoost { bonus: f32, duration: Tick },
}

/// Category-specific effect payload. Exhaustively matched by the resolution
/// engine; no dynamic field dictionaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectPayload {
    Damage {
        damage: i32,
        damage_multiplier: f32,
        damage_type: DamageType,
        /// Subtracted from the target's resistance, floored at zero
        armor_penetration: f32,
        max_targets: usize,
        /// Zero means single-target; positive enables area selection
        aoe_radius: u32,
    },
    Status {
        status_type: StatusKind,
        duration: Tick,
        strength: i32,
        application_chance: f32,
        max_targets: usize,
    },
    Utility(UtilityPayload),
}

impl EffectPayload {
    pub fn category_name(&self) -> &'static str {
        match self {
            EffectPayload::Damage { .. } => "damage",
            EffectPayload::Status { .. } => "status",
            EffectPayload::Utility(_) => "utility",
        }
    }
}

/// Resource cost of triggering an effect. Both costs must be payable before
/// either is deducted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectCost {
    #[serde(default)]
    pub charge: u32,
    #[serde(default)]
    pub durability: u32,
}

impl EffectCost {
    pub fn free() -> Self {
        Self::default()
    }

    pub fn charge(amount: u32) -> Self {
        Self {
            charge: amount,
            durability: 0,
        }
    }
}

/// Conjunction of named trigger predicates. Absent predicates pass.
/// Evaluation short-circuits on the first failing predicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerConditions {
    /// Weapon charge must be at least this
    #[serde(default)]
    pub min_charge: Option<u32>,
    /// Acting player's health percent must be strictly below this
    #[serde(default)]
    pub health_below_percent: Option<f32>,
    /// At least this many consecutive hits landed
    #[serde(default)]
    pub consecutive_hits: Option<u32>,
    /// At least this many enemies in the fight
    #[serde(default)]
    pub enemy_count: Option<u32>,
    /// Only on a critical-hit context
    #[serde(default)]
    pub requires_critical: bool,
    /// Independent random draw with this probability
    #[serde(default)]
    pub trigger_chance: Option<f32>,
}

impl TriggerConditions {
    /// Always eligible (used for on-demand effects)
    pub fn none() -> Self {
        Self::default()
    }

    pub fn evaluate(
        &self,
        current_charge: u32,
        ctx: &CombatContext,
        rng: &mut impl Rng,
    ) -> bool {
        if let Some(min) = self.min_charge {
            if current_charge < min {
                return false;
            }
        }
        if let Some(threshold) = self.health_below_percent {
            if ctx.player_health_percent >= threshold {
                return false;
            }
        }
        if let Some(required) = self.consecutive_hits {
            if ctx.consecutive_hits < required {
                return false;
            }
        }
        if let Some(required) = self.enemy_count {
            if ctx.enemy_count < required {
                return false;
            }
        }
        if self.requires_critical && !ctx.is_critical {
            return false;
        }
        if let Some(chance) = self.trigger_chance {
            if rng.gen::<f32>() > chance {
                return false;
            }
        }
        true
    }
}

/// Declarative definition of one special ability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    pub id: EffectId,
    pub name: String,
    pub description: String,
    pub payload: EffectPayload,
    #[serde(default)]
    pub trigger_conditions: TriggerConditions,
    #[serde(default)]
    pub costs: EffectCost,
    /// Ticks until this effect may trigger again
    #[serde(default)]
    pub cooldown: Tick,
    /// Ticks the resulting ActiveEffect persists
    #[serde(default = "default_duration")]
    pub duration: Tick,
    /// Experience weight: a trigger grants `rarity * effect_trigger_exp`
    #[serde(default = "default_effect_rarity")]
    pub rarity: u32,
}

fn default_duration() -> Tick {
    1
}

fn default_effect_rarity() -> u32 {
    1
}

/// Snapshot of the combat situation an activation check runs against.
/// Time is a logical tick supplied by the session, never wall clock.
#[derive(Debug, Clone, Default)]
pub struct CombatContext {
    pub time: Tick,
    pub player_health_percent: f32,
    pub consecutive_hits: u32,
    pub enemy_count: u32,
    pub is_critical: bool,
    /// Distance to each candidate target, for area-effect selection
    pub distances: AHashMap<ActorId, u32>,
}

impl CombatContext {
    pub fn at(time: Tick) -> Self {
        Self {
            time,
            player_health_percent: 100.0,
            ..Self::default()
        }
    }

    pub fn distance_to(&self, target: &ActorId) -> u32 {
        // Unknown targets are treated as far away, like the reference's
        // default of 100 units
        self.distances.get(target).copied().unwrap_or(100)
    }
}

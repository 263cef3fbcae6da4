//! Shared combat-actor state
//!
//! Both the effect resolution engine and the combat session mutate actors:
//! health, per-damage-type resistances, applied statuses (replace semantics,
//! never stacked) and timed modifiers such as stealth or shields.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{ActorId, DamageType, EffectId, PlayerId, StatusKind, Tick, WeaponId};

/// Attribution for a status effect, kept for later kill/assist credit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSource {
    pub player: PlayerId,
    pub weapon: WeaponId,
    pub effect: EffectId,
}

/// One applied status on an actor. Re-application of the same kind replaces
/// this record wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedStatus {
    pub kind: StatusKind,
    pub strength: i32,
    pub start_time: Tick,
    pub end_time: Tick,
    pub source: StatusSource,
}

/// Timed non-status attachments granted by utility effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Hidden from enemies; level scales detection difficulty
    Stealth { level: i32 },
    /// Absorbs incoming damage until depleted
    Shield { amount: i32 },
    /// Additive accuracy bonus
    AccuracyBoost { bonus: f32 },
    /// Additive critical-hit chance bonus
    CriticalBoost { bonus: f32 },
    /// Faster reload/charge accrual
    ReloadBoost { bonus: f32 },
    /// Fraction of incoming damage absorbed (defend stance)
    DamageReduction { fraction: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedModifier {
    pub kind: ModifierKind,
    pub start_time: Tick,
    pub end_time: Tick,
}

/// Mutable state of one combat participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorState {
    pub id: ActorId,
    pub name: String,
    pub health: i32,
    pub max_health: i32,
    /// Fractional resistance per damage type (0.0 = none, 1.0 = immune)
    #[serde(default)]
    pub resistances: AHashMap<DamageType, f32>,
    /// Fractional resistance against status application per kind
    #[serde(default)]
    pub status_resistances: AHashMap<StatusKind, f32>,
    #[serde(default)]
    pub statuses: AHashMap<StatusKind, AppliedStatus>,
    #[serde(default)]
    pub modifiers: Vec<TimedModifier>,
    /// Constructs and some bosses shrug off status effects entirely
    #[serde(default = "default_true")]
    pub can_receive_status: bool,
}

fn default_true() -> bool {
    true
}

impl ActorState {
    pub fn new(id: impl Into<ActorId>, name: impl Into<String>, max_health: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            health: max_health,
            max_health,
            resistances: AHashMap::new(),
            status_resistances: AHashMap::new(),
            statuses: AHashMap::new(),
            modifiers: Vec::new(),
            can_receive_status: true,
        }
    }

    pub fn with_resistance(mut self, damage_type: DamageType, fraction: f32) -> Self {
        self.resistances.insert(damage_type, fraction);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn health_percent(&self) -> f32 {
        if self.max_health <= 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32 * 100.0
    }

    pub fn resistance(&self, damage_type: DamageType) -> f32 {
        self.resistances.get(&damage_type).copied().unwrap_or(0.0)
    }

    pub fn status_resistance(&self, kind: StatusKind) -> f32 {
        self.status_resistances.get(&kind).copied().unwrap_or(0.0)
    }

    /// Apply damage after shields and defend-stance reduction.
    /// Returns the health actually removed.
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        let mut remaining = amount.max(0);

        // Shields absorb first, in attachment order
        for modifier in &mut self.modifiers {
            if remaining == 0 {
                break;
            }
            if let ModifierKind::Shield { amount: shield } = &mut modifier.kind {
                let absorbed = remaining.min(*shield);
                *shield -= absorbed;
                remaining -= absorbed;
            }
        }

        if let Some(fraction) = self.damage_reduction() {
            remaining = (remaining as f32 * (1.0 - fraction)).floor() as i32;
        }

        let before = self.health;
        self.health = (self.health - remaining).max(0);
        before - self.health
    }

    /// Add health, clamped to max. Returns the health actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = (self.health + amount.max(0)).min(self.max_health);
        self.health - before
    }

    /// Replace-semantics status application: any existing record of the same
    /// kind is overwritten, never stacked.
    pub fn apply_status(&mut self, status: AppliedStatus) {
        self.statuses.insert(status.kind, status);
    }

    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.statuses.contains_key(&kind)
    }

    pub fn attach_modifier(&mut self, kind: ModifierKind, now: Tick, duration: Tick) {
        self.modifiers.push(TimedModifier {
            kind,
            start_time: now,
            end_time: now + duration,
        });
    }

    fn damage_reduction(&self) -> Option<f32> {
        self.modifiers.iter().find_map(|m| match m.kind {
            ModifierKind::DamageReduction { fraction } => Some(fraction),
            _ => None,
        })
    }

    pub fn accuracy_bonus(&self) -> f32 {
        self.modifiers
            .iter()
            .map(|m| match m.kind {
                ModifierKind::AccuracyBoost { bonus } => bonus,
                _ => 0.0,
            })
            .sum()
    }

    pub fn critical_bonus(&self) -> f32 {
        self.modifiers
            .iter()
            .map(|m| match m.kind {
                ModifierKind::CriticalBoost { bonus } => bonus,
                _ => 0.0,
            })
            .sum()
    }

    /// Drop expired statuses and modifiers, plus depleted shields.
    /// Returns the status kinds that expired this tick.
    pub fn purge_expired(&mut self, now: Tick) -> Vec<StatusKind> {
        let expired: Vec<StatusKind> = self
            .statuses
            .values()
            .filter(|s| s.end_time <= now)
            .map(|s| s.kind)
            .collect();
        for kind in &expired {
            self.statuses.remove(kind);
        }
        self.modifiers.retain(|m| {
            if m.end_time <= now {
                return false;
            }
            !matches!(m.kind, ModifierKind::Shield { amount } if amount <= 0)
        });
        expired
    }
}

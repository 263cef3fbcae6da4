//! Engine-wide error taxonomy
//!
//! Three families: validation errors (bad or duplicate content), resource
//! errors (charge/durability/cooldown shortfalls, reported with the exact
//! shortfall), and state errors (action illegal in the current phase).
//! Nothing here is fatal; every variant is recoverable by the caller.

use thiserror::Error;

use crate::core::types::{ActorId, EffectId, EvolutionId, PlayerId, Tick, WeaponId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    // --- validation ---
    #[error("duplicate template id: {0}")]
    DuplicateTemplate(WeaponId),

    #[error("template {0} missing required field: {1}")]
    MissingField(WeaponId, &'static str),

    #[error("template not found: {0}")]
    TemplateNotFound(WeaponId),

    #[error("weapon {weapon} is not assigned to player {player}")]
    InstanceNotFound { player: PlayerId, weapon: WeaponId },

    #[error("weapon {weapon} is already assigned to player {player}")]
    AlreadyAssigned { player: PlayerId, weapon: WeaponId },

    #[error("effect {effect} not found on weapon {weapon}")]
    EffectNotFound { weapon: WeaponId, effect: EffectId },

    #[error("unknown combat participant: {0}")]
    UnknownParticipant(ActorId),

    // --- resource ---
    #[error("insufficient charge: have {have}, need {need}")]
    InsufficientCharge { have: u32, need: u32 },

    #[error("insufficient durability: have {have}, need {need}")]
    InsufficientDurability { have: u32, need: u32 },

    #[error("effect {effect} on cooldown until tick {until}")]
    OnCooldown { effect: EffectId, until: Tick },

    #[error("effect {effect} is not eligible: {reason}")]
    NotEligible { effect: EffectId, reason: String },

    // --- state ---
    #[error("it is not {0}'s turn")]
    OutOfTurn(ActorId),

    #[error("combat has not been started")]
    CombatNotStarted,

    #[error("combat is already over")]
    CombatOver,

    #[error("no evolution slots available")]
    NoEvolutionSlots,

    #[error("evolution {0} is not available for this weapon")]
    EvolutionNotAvailable(EvolutionId),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Resource errors can be retried once the resource recovers;
    /// the session log distinguishes them from state errors.
    pub fn is_resource_error(&self) -> bool {
        matches!(
            self,
            EngineError::InsufficientCharge { .. }
                | EngineError::InsufficientDurability { .. }
                | EngineError::OnCooldown { .. }
                | EngineError::NotEligible { .. }
        )
    }
}

//! Neonforge - turn-based combat simulation and weapon progression engine
//!
//! The engine is strictly sequential and logically clocked: every operation
//! runs to completion on an integer tick, randomness is injected through a
//! seedable generator, and all failures are recoverable structured errors.
//!
//! The pieces, from the bottom up:
//! - [`effect`]: declarative effect descriptors and the resolution engine
//! - [`catalog`]: immutable weapon templates and evolution paths
//! - [`registry`]: per-player weapon instances, charge/durability/cooldowns
//! - [`progression`]: weapon experience, levels and evolution slots
//! - [`crafting`]: component-based weapon construction and disassembly
//! - [`session`]: the turn-based combat state machine
//! - [`save`]: full-state checkpointing between battles

pub mod actor;
pub mod catalog;
pub mod core;
pub mod crafting;
pub mod effect;
pub mod progression;
pub mod registry;
pub mod save;
pub mod session;

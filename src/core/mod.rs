//! Core types, errors, configuration and the combat log

pub mod config;
pub mod error;
pub mod log;
pub mod types;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use log::CombatLog;

//! Full-state checkpointing
//!
//! Collects catalog entries, component definitions, weapon instances,
//! progression records and crafted-weapon records into one serializable
//! value. Map keys are flattened into entry lists so the JSON rendition
//! stays portable. Round-trip fidelity of every record is the contract;
//! in-flight active effects and open combat sessions are deliberately not
//! captured, a checkpoint is taken between battles.

use serde::{Deserialize, Serialize};

use crate::catalog::{WeaponCatalog, WeaponTemplate};
use crate::core::config::EngineConfig;
use crate::crafting::{Component, ComponentCatalog, CraftedWeaponRecord, CraftingSystem};
use crate::progression::EvolutionProgress;
use crate::registry::{InstanceRegistry, WeaponInstance};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceEntry {
    pub instance: WeaponInstance,
    pub progress: EvolutionProgress,
}

/// Everything needed to rebuild the engine between battles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveState {
    pub config: EngineConfig,
    pub templates: Vec<WeaponTemplate>,
    pub components: Vec<Component>,
    pub instances: Vec<InstanceEntry>,
    pub crafted: Vec<CraftedWeaponRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("saved state is inconsistent: {0}")]
    Inconsistent(String),
}

impl SaveState {
    /// Snapshot a registry and crafting system
    pub fn capture(registry: &InstanceRegistry, crafting: &CraftingSystem) -> Self {
        let mut templates: Vec<WeaponTemplate> = registry.catalog.iter().cloned().collect();
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        let mut components: Vec<Component> = crafting.components.iter().cloned().collect();
        components.sort_by(|a, b| a.id.cmp(&b.id));

        let mut instances: Vec<InstanceEntry> = registry
            .instances()
            .map(|instance| {
                let progress = registry
                    .progress(&instance.player, &instance.template_id)
                    .map(|p| p.clone())
                    // Instances and progress records are co-created
                    .unwrap_or_else(|_| EvolutionProgress::new(&registry.config));
                InstanceEntry {
                    instance: instance.clone(),
                    progress,
                }
            })
            .collect();
        instances.sort_by(|a, b| {
            (&a.instance.player, &a.instance.template_id)
                .cmp(&(&b.instance.player, &b.instance.template_id))
        });

        Self {
            config: registry.config.clone(),
            templates,
            components,
            instances,
            crafted: crafting.records().to_vec(),
        }
    }

    /// Rebuild a registry and crafting system from this snapshot
    pub fn restore(self) -> Result<(InstanceRegistry, CraftingSystem), SaveError> {
        let mut catalog = WeaponCatalog::new();
        for template in self.templates {
            let id = template.id.clone();
            catalog
                .register_template(template)
                .map_err(|e| SaveError::Inconsistent(format!("template {id}: {e}")))?;
        }
        let mut registry = InstanceRegistry::new(catalog, self.config);
        for entry in self.instances {
            if !registry.catalog.contains(&entry.instance.template_id) {
                return Err(SaveError::Inconsistent(format!(
                    "instance references missing template {}",
                    entry.instance.template_id
                )));
            }
            registry.restore_instance(entry.instance, entry.progress);
        }

        let mut crafting = CraftingSystem::new(ComponentCatalog::new());
        for component in self.components {
            let id = component.id.clone();
            crafting
                .components
                .register_component(component)
                .map_err(|e| SaveError::Inconsistent(format!("component {id}: {e}")))?;
        }
        for record in self.crafted {
            crafting.restore_record(record);
        }
        tracing::info!(
            templates = registry.catalog.len(),
            instances = registry.instances().count(),
            "save state restored"
        );
        Ok((registry, crafting))
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        Ok(serde_json::from_str(json)?)
    }
}

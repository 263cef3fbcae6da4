//! Core type definitions used throughout the engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical combat time unit (turn counter, not wall clock)
pub type Tick = u64;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identifier for a player (or any weapon-owning actor)
    PlayerId
);
string_id!(
    /// Identifier for a weapon template (and the instances assigned from it)
    WeaponId
);
string_id!(
    /// Identifier for one effect descriptor within a template
    EffectId
);
string_id!(
    /// Identifier for a crafting component
    ComponentId
);
string_id!(
    /// Identifier for an evolution path entry
    EvolutionId
);
string_id!(
    /// Identifier for any combat participant (player or enemy)
    ActorId
);

/// Weapon category - drives crafting compatibility and base stat tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponCategory {
    Energy,
    Melee,
    Projectile,
    Tech,
    Experimental,
}

impl WeaponCategory {
    /// Fixed priority order used when crafting resolves to several categories
    pub const CRAFT_PRIORITY: [WeaponCategory; 5] = [
        WeaponCategory::Experimental,
        WeaponCategory::Tech,
        WeaponCategory::Energy,
        WeaponCategory::Projectile,
        WeaponCategory::Melee,
    ];
}

impl fmt::Display for WeaponCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeaponCategory::Energy => "energy",
            WeaponCategory::Melee => "melee",
            WeaponCategory::Projectile => "projectile",
            WeaponCategory::Tech => "tech",
            WeaponCategory::Experimental => "experimental",
        };
        write!(f, "{name}")
    }
}

/// Rarity tier - ordinal quality classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Artifact,
}

impl Rarity {
    /// Numeric value 1..=5 used by the crafting rarity blend
    pub fn value(self) -> u32 {
        match self {
            Rarity::Common => 1,
            Rarity::Rare => 2,
            Rarity::Epic => 3,
            Rarity::Legendary => 4,
            Rarity::Artifact => 5,
        }
    }

    /// Nearest tier at or above a blended numeric value
    pub fn from_value(value: u32) -> Self {
        match value {
            0 | 1 => Rarity::Common,
            2 => Rarity::Rare,
            3 => Rarity::Epic,
            4 => Rarity::Legendary,
            _ => Rarity::Artifact,
        }
    }

    /// Experience dampening: rarer weapons level more slowly per raw action
    pub fn exp_factor(self) -> f64 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Rare => 0.8,
            Rarity::Epic => 0.6,
            Rarity::Legendary => 0.4,
            Rarity::Artifact => 0.2,
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
            Rarity::Artifact => "artifact",
        };
        write!(f, "{name}")
    }
}

/// Damage type tags - resistance lookup key on targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    Physical,
    Energy,
    Thermal,
    Chemical,
    Emp,
    Tech,
    Void,
    Explosive,
    Elemental,
}

impl DamageType {
    /// All damage types, in the order weakness scans report them
    pub const ALL: [DamageType; 9] = [
        DamageType::Physical,
        DamageType::Energy,
        DamageType::Thermal,
        DamageType::Chemical,
        DamageType::Emp,
        DamageType::Tech,
        DamageType::Void,
        DamageType::Explosive,
        DamageType::Elemental,
    ];
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DamageType::Physical => "physical",
            DamageType::Energy => "energy",
            DamageType::Thermal => "thermal",
            DamageType::Chemical => "chemical",
            DamageType::Emp => "emp",
            DamageType::Tech => "tech",
            DamageType::Void => "void",
            DamageType::Explosive => "explosive",
            DamageType::Elemental => "elemental",
        };
        write!(f, "{name}")
    }
}

/// Status ailment kinds applied by status effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    Bleeding,
    Burning,
    ElementalBurn,
    Corroded,
    Disoriented,
    Disrupted,
    Stunned,
}

impl StatusKind {
    /// Statuses that deal their strength as damage each turn
    pub fn is_damaging(self) -> bool {
        matches!(
            self,
            StatusKind::Bleeding
                | StatusKind::Burning
                | StatusKind::ElementalBurn
                | StatusKind::Corroded
        )
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusKind::Bleeding => "bleeding",
            StatusKind::Burning => "burning",
            StatusKind::ElementalBurn => "elemental burn",
            StatusKind::Corroded => "corroded",
            StatusKind::Disoriented => "disoriented",
            StatusKind::Disrupted => "disrupted",
            StatusKind::Stunned => "stunned",
        };
        write!(f, "{name}")
    }
}

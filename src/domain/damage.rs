// Damage taxonomy used to decide which hits open a combat zone.

use super::ship::{BlockId, EntityId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DamageType {
    Bullet,
    Explosion,
    Rocket,
    Mine,
    Weapon,
    Destruction,
    // Spiders, wolves and other hostile fauna.
    Creature,
    Unknown,
    // Collisions and structural stress.
    Deformation,
    Grind,
    Drill,
    Fall,
    // Temperature, lack of oxygen and similar.
    Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageClass {
    Combat,
    // Combat only when the attacker is itself a grid (ramming).
    Deformation,
    NonCombat,
}

impl DamageType {
    pub fn class(self) -> DamageClass {
        match self {
            DamageType::Bullet
            | DamageType::Explosion
            | DamageType::Rocket
            | DamageType::Mine
            | DamageType::Weapon
            | DamageType::Destruction
            | DamageType::Creature
            | DamageType::Unknown => DamageClass::Combat,
            DamageType::Deformation => DamageClass::Deformation,
            DamageType::Grind | DamageType::Drill | DamageType::Fall | DamageType::Environment => {
                DamageClass::NonCombat
            }
        }
    }
}

/// Damage notification delivered by the host after damage is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    pub target_block: BlockId,
    pub attacker_id: EntityId,
    pub damage_type: DamageType,
    pub amount: f32,
}

//! Interfaces the host agent provides, and the unit data crossing them.
//!
//! The analysis never talks to the game directly. Placement checks, enemy
//! lookups and build commands go through these traits so the same code runs
//! against the live game and against the offline terrain used in tests.

use crate::footprint::FootprintKind;
use crate::location::*;
use serde::{Deserialize, Serialize};

/// Structures the planner knows how to place.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureType {
    CommandCenter,
    SupplyDepot,
    Barracks,
    Factory,
    Starport,
    EngineeringBay,
    Armory,
    Bunker,
    MissileTurret,
    Reactor,
    TechLab,
}

impl StructureType {
    pub fn footprint(self) -> FootprintKind {
        match self {
            StructureType::SupplyDepot
            | StructureType::MissileTurret
            | StructureType::Reactor
            | StructureType::TechLab => FootprintKind::Small2x2,
            StructureType::EngineeringBay | StructureType::Armory | StructureType::Bunker => {
                FootprintKind::Medium3x3
            }
            StructureType::Barracks | StructureType::Factory | StructureType::Starport => {
                FootprintKind::Medium3x3WithAddon
            }
            StructureType::CommandCenter => FootprintKind::Large5x5,
        }
    }

    /// Whether the structure can later grow an addon on its right side.
    pub fn takes_addon(self) -> bool {
        self.footprint() == FootprintKind::Medium3x3WithAddon
    }

    pub fn build_ability(self) -> AbilityId {
        match self {
            StructureType::CommandCenter => AbilityId::BuildCommandCenter,
            StructureType::SupplyDepot => AbilityId::BuildSupplyDepot,
            StructureType::Barracks => AbilityId::BuildBarracks,
            StructureType::Factory => AbilityId::BuildFactory,
            StructureType::Starport => AbilityId::BuildStarport,
            StructureType::EngineeringBay => AbilityId::BuildEngineeringBay,
            StructureType::Armory => AbilityId::BuildArmory,
            StructureType::Bunker => AbilityId::BuildBunker,
            StructureType::MissileTurret => AbilityId::BuildMissileTurret,
            StructureType::Reactor => AbilityId::BuildReactor,
            StructureType::TechLab => AbilityId::BuildTechLab,
        }
    }
}

/// Build abilities issued through the `ActionSink`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityId {
    BuildCommandCenter,
    BuildSupplyDepot,
    BuildBarracks,
    BuildFactory,
    BuildStarport,
    BuildEngineeringBay,
    BuildArmory,
    BuildBunker,
    BuildMissileTurret,
    BuildReactor,
    BuildTechLab,
}

/// Coarse role of a unit, used to ignore harmless hostiles near placements.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitRole {
    Worker,
    Scout,
    Army,
    Structure,
}

/// A unit as reported by the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub tag: u64,
    pub position: Point2,
    pub role: UnitRole,
    pub structure: Option<StructureType>,
}

impl Unit {
    pub fn new(tag: u64, position: Point2, role: UnitRole) -> Self {
        Unit {
            tag,
            position,
            role,
            structure: None,
        }
    }

    pub fn structure(tag: u64, structure_type: StructureType, position: Point2) -> Self {
        Unit {
            tag,
            position,
            role: UnitRole::Structure,
            structure: Some(structure_type),
        }
    }

    /// Workers and scouts do not block a placement.
    pub fn is_trivial(&self) -> bool {
        matches!(self.role, UnitRole::Worker | UnitRole::Scout)
    }
}

/// Game-side placement validation.
pub trait PlacementQuery {
    fn can_place(&self, ability: AbilityId, pos: Point2, builder: Option<&Unit>) -> bool;
}

/// Hostile units near a position.
pub trait EnemyQuery {
    fn enemy_units_near(&self, pos: Point2, radius: f32) -> Vec<Unit>;
}

/// Receiver of the build commands the planner decides on.
pub trait ActionSink {
    fn issue_build_command(&mut self, builder: &Unit, ability: AbilityId, pos: Point2);
}

/// A snapshot of known enemy units answers proximity queries directly.
impl EnemyQuery for [Unit] {
    fn enemy_units_near(&self, pos: Point2, radius: f32) -> Vec<Unit> {
        let radius_sq = radius * radius;
        self.iter()
            .filter(|u| u.position.distance_squared(pos) <= radius_sq)
            .cloned()
            .collect()
    }
}

impl EnemyQuery for Vec<Unit> {
    fn enemy_units_near(&self, pos: Point2, radius: f32) -> Vec<Unit> {
        self.as_slice().enemy_units_near(pos, radius)
    }
}

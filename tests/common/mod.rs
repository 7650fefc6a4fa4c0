#![allow(dead_code)]

use terrain_foreman::*;

pub const MAP_SIZE: usize = 64;
pub const HIGH_GROUND: i32 = 12;
pub const LOW_GROUND: i32 = 2;

/// A 64x64 map split by a diagonal cliff. A three cell wide ramp runs from
/// the high plateau around the origin corner down to the low ground around
/// the opposite corner. `mirrored` flips the map left to right.
pub fn diagonal_ramp_map(mirrored: bool) -> GridTerrain {
    GridTerrain::from_fn(MAP_SIZE, MAP_SIZE, |x, y| {
        let i = if mirrored { 32 - x } else { x - 32 };
        let j = y - 32;
        let s = i + j;
        if (i - j).abs() <= 1 && (1..=10).contains(&s) {
            (TerrainFlags::PATHABLE, HIGH_GROUND - s)
        } else if s <= 1 {
            (TerrainFlags::PATHABLE | TerrainFlags::PLACABLE, HIGH_GROUND)
        } else if s >= 11 {
            (TerrainFlags::PATHABLE | TerrainFlags::PLACABLE, LOW_GROUND)
        } else {
            (TerrainFlags::NONE, 7)
        }
    })
}

/// A 64x64 map like `diagonal_ramp_map` with a shorter ramp: two cells wide
/// at its lip, nine cells in all, falling through six height levels from 11
/// to 6 before it meets the low ground.
pub fn two_wide_ramp_map() -> GridTerrain {
    GridTerrain::from_fn(MAP_SIZE, MAP_SIZE, |x, y| {
        let (i, j) = (x - 32, y - 32);
        let s = i + j;
        if (i - j).abs() <= 1 && (1..=6).contains(&s) {
            (TerrainFlags::PATHABLE, HIGH_GROUND - s)
        } else if s <= 1 {
            (TerrainFlags::PATHABLE | TerrainFlags::PLACABLE, HIGH_GROUND)
        } else if s >= 7 {
            (TerrainFlags::PATHABLE | TerrainFlags::PLACABLE, LOW_GROUND)
        } else {
            (TerrainFlags::NONE, 7)
        }
    })
}

/// A map with no ramps at all.
pub fn flat_map() -> GridTerrain {
    GridTerrain::from_fn(MAP_SIZE, MAP_SIZE, |_, _| {
        (TerrainFlags::PATHABLE | TerrainFlags::PLACABLE, HIGH_GROUND)
    })
}

pub fn home_base() -> Point2 {
    Point2::new(20.5, 20.5)
}

pub fn assert_point(actual: Point2, x: f32, y: f32) {
    assert!(
        actual.approx_eq(Point2::new(x, y)),
        "expected ({}, {}), got ({}, {})",
        x,
        y,
        actual.x,
        actual.y
    );
}

pub fn worker() -> Unit {
    Unit::new(1, home_base(), UnitRole::Worker)
}

/// Build commands in the order they were issued.
#[derive(Default)]
pub struct RecordingSink {
    pub commands: Vec<(u64, AbilityId, Point2)>,
}

impl ActionSink for RecordingSink {
    fn issue_build_command(&mut self, builder: &Unit, ability: AbilityId, pos: Point2) {
        self.commands.push((builder.tag, ability, pos));
    }
}

/// Host placement check that answers the same for every spot.
pub struct FixedPlacement(pub bool);

impl PlacementQuery for FixedPlacement {
    fn can_place(&self, _ability: AbilityId, _pos: Point2, _builder: Option<&Unit>) -> bool {
        self.0
    }
}

pub fn no_enemies() -> Vec<Unit> {
    Vec::new()
}

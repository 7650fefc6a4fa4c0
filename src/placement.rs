//! General structure placement around the base.
//!
//! Candidates are visited in one quadrant-parametrized nested scan: starting
//! at the reference anchor, x advances by `scan_step` cells toward the back
//! of the base until it leaves the region, and for every x the same walk is
//! done along y. The first candidate that survives every check wins.

use crate::config::TerrainConfig;
use crate::footprint::FootprintKind;
use crate::host::EnemyQuery;
use crate::hull::ConvexHull;
use crate::location::*;
use crate::occupancy::OccupancyLayer;
use crate::orientation::BaseOrientation;
use fnv::FnvHashSet;
use log::*;

/// Why a scan candidate was passed over.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// Part of the footprint is outside the region or already built on.
    Occupied,
    /// The footprint overlaps cells held back for a planned structure.
    Reserved,
    /// The footprint reaches into the mineral line.
    MineralLine,
    /// A hostile unit that is not a worker or scout is too close.
    Enemy,
}

/// Scans one occupancy layer for free structure spots.
pub struct PlacementPlanner<'a> {
    layer: &'a OccupancyLayer,
    config: &'a TerrainConfig,
    exclusion: Option<&'a ConvexHull>,
    reserved: Option<&'a FnvHashSet<GridCell>>,
}

impl<'a> PlacementPlanner<'a> {
    pub fn new(layer: &'a OccupancyLayer, config: &'a TerrainConfig) -> Self {
        PlacementPlanner {
            layer,
            config,
            exclusion: None,
            reserved: None,
        }
    }

    /// Reject candidates whose cells fall inside `hull`.
    pub fn exclude_hull(mut self, hull: Option<&'a ConvexHull>) -> Self {
        self.exclusion = hull;
        self
    }

    /// Reject candidates touching any of `cells`.
    pub fn reserve(mut self, cells: &'a FnvHashSet<GridCell>) -> Self {
        self.reserved = Some(cells);
        self
    }

    /// Candidate anchors in scan order. Empty when the layer has no cells.
    pub fn candidates(
        &self,
        orientation: BaseOrientation,
        kind: FootprintKind,
        reference: Point2,
    ) -> Vec<Point2> {
        let bounds = match self.layer.bounds() {
            Some(bounds) => bounds,
            None => return Vec::new(),
        };

        let start = kind.snap(reference);
        let direction = orientation.scan_direction();
        let (limit_x, limit_y) = orientation.scan_limits(&bounds);
        let step = self.config.scan_step.max(1) as f32;

        let xs = axis_walk(start.x, direction.x_sign, limit_x, step);
        let ys = axis_walk(start.y, direction.y_sign, limit_y, step);

        xs.iter()
            .flat_map(|&x| ys.iter().map(move |&y| Point2::new(x, y)))
            .collect()
    }

    /// Check one candidate anchor.
    pub fn check<E: EnemyQuery + ?Sized>(
        &self,
        anchor: Point2,
        orientation: BaseOrientation,
        kind: FootprintKind,
        wants_addon: bool,
        enemies: &E,
    ) -> Result<(), Rejection> {
        if !self.layer.is_area_free(anchor, kind, wants_addon) {
            return Err(Rejection::Occupied);
        }

        let cells = kind.cells(anchor, wants_addon);

        if let Some(reserved) = self.reserved {
            if cells.iter().any(|cell| reserved.contains(cell)) {
                return Err(Rejection::Reserved);
            }
        }

        if let Some(hull) = self.exclusion {
            let extent = hull.scan_bounds(orientation);
            let inside = cells
                .iter()
                .map(|cell| cell.center())
                .filter(|&center| extent.spans(center))
                .any(|center| hull.contains(center));
            if inside {
                return Err(Rejection::MineralLine);
            }
        }

        let threatened = enemies
            .enemy_units_near(anchor, self.config.enemy_reject_radius)
            .iter()
            .any(|unit| !unit.is_trivial());
        if threatened {
            return Err(Rejection::Enemy);
        }

        Ok(())
    }

    /// First candidate in scan order that passes every check, if any.
    pub fn find_next_build_spot<E: EnemyQuery + ?Sized>(
        &self,
        orientation: BaseOrientation,
        kind: FootprintKind,
        wants_addon: bool,
        reference: Point2,
        enemies: &E,
    ) -> Option<Point2> {
        self.find_spot_where(orientation, kind, wants_addon, reference, enemies, |_| true)
    }

    /// Like `find_next_build_spot`, with `accept` as a last check on each
    /// candidate that passed the others.
    pub fn find_spot_where<E, F>(
        &self,
        orientation: BaseOrientation,
        kind: FootprintKind,
        wants_addon: bool,
        reference: Point2,
        enemies: &E,
        mut accept: F,
    ) -> Option<Point2>
    where
        E: EnemyQuery + ?Sized,
        F: FnMut(Point2) -> bool,
    {
        for anchor in self.candidates(orientation, kind, reference) {
            match self.check(anchor, orientation, kind, wants_addon, enemies) {
                Ok(()) if accept(anchor) => {
                    debug!(
                        "Placement: {:?} at ({}, {}) in layer {}",
                        kind,
                        anchor.x,
                        anchor.y,
                        self.layer.name()
                    );
                    return Some(anchor);
                }
                Ok(()) => {
                    trace!("Placement: rejected ({}, {}) by host", anchor.x, anchor.y);
                }
                Err(reason) => {
                    trace!("Placement: rejected ({}, {}): {:?}", anchor.x, anchor.y, reason);
                }
            }
        }

        debug!("Placement: no spot for {:?} in layer {}", kind, self.layer.name());
        None
    }
}

/// Coordinates from `start` stepping `step` in the direction of `sign` while
/// the containing cell has not reached `limit`.
fn axis_walk(start: f32, sign: i32, limit: i32, step: f32) -> Vec<f32> {
    let mut values = Vec::new();
    let mut value = start;
    loop {
        let cell = value.floor() as i32;
        let inside = if sign < 0 { cell > limit } else { cell < limit };
        if !inside {
            break;
        }
        values.push(value);
        value += step * sign as f32;
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Unit, UnitRole};
    use crate::occupancy::MAIN_LAYER;

    fn square_layer(size: i32) -> OccupancyLayer {
        let cells = (0..size).flat_map(|x| (0..size).map(move |y| GridCell::from_coords(x, y)));
        OccupancyLayer::new(MAIN_LAYER, cells)
    }

    fn army_everywhere(size: i32) -> Vec<Unit> {
        let mut tag = 0;
        let mut units = Vec::new();
        for x in (0..size).step_by(4) {
            for y in (0..size).step_by(4) {
                tag += 1;
                units.push(Unit::new(tag, Point2::new(x as f32, y as f32), UnitRole::Army));
            }
        }
        units
    }

    #[test]
    fn scan_walks_x_then_y_toward_the_bounds() {
        let layer = square_layer(10);
        let config = TerrainConfig::default();
        let planner = PlacementPlanner::new(&layer, &config);
        let small = FootprintKind::Small2x2;

        let candidates =
            planner.candidates(BaseOrientation::RightTop, small, Point2::new(6.0, 6.0));
        assert_eq!(
            candidates,
            vec![
                Point2::new(6.0, 6.0),
                Point2::new(6.0, 8.0),
                Point2::new(8.0, 6.0),
                Point2::new(8.0, 8.0),
            ]
        );

        let candidates =
            planner.candidates(BaseOrientation::LeftBottom, small, Point2::new(3.0, 3.0));
        assert_eq!(
            candidates,
            vec![
                Point2::new(3.0, 3.0),
                Point2::new(3.0, 1.0),
                Point2::new(1.0, 3.0),
                Point2::new(1.0, 1.0),
            ]
        );
    }

    #[test]
    fn enemies_near_every_candidate_block_placement() {
        let layer = square_layer(20);
        let config = TerrainConfig::default();
        let planner = PlacementPlanner::new(&layer, &config);
        let reference = Point2::new(4.0, 4.0);
        let spot_among = |units: &[Unit]| {
            planner.find_next_build_spot(
                BaseOrientation::RightTop,
                FootprintKind::Small2x2,
                false,
                reference,
                units,
            )
        };

        let enemies = army_everywhere(24);
        assert_eq!(spot_among(&enemies), None);

        let moved: Vec<Unit> = enemies
            .into_iter()
            .map(|mut unit| {
                unit.position = unit.position.offset(100.0, 100.0);
                unit
            })
            .collect();
        assert_eq!(spot_among(&moved), Some(reference));
    }

    #[test]
    fn workers_do_not_block_placement() {
        let layer = square_layer(20);
        let config = TerrainConfig::default();
        let planner = PlacementPlanner::new(&layer, &config);
        let reference = Point2::new(4.0, 4.0);
        let workers = vec![
            Unit::new(1, reference, UnitRole::Worker),
            Unit::new(2, reference, UnitRole::Scout),
        ];

        let spot = planner.find_next_build_spot(
            BaseOrientation::RightTop,
            FootprintKind::Small2x2,
            false,
            reference,
            &workers,
        );
        assert_eq!(spot, Some(reference));
    }

    #[test]
    fn occupied_and_reserved_spots_are_skipped() {
        let small = FootprintKind::Small2x2;
        let mut layer = square_layer(20);
        layer.mark_footprint(Point2::new(4.0, 4.0), small, true);
        let config = TerrainConfig::default();
        let reserved: FnvHashSet<GridCell> =
            small.cells(Point2::new(4.0, 6.0), false).into_iter().collect();
        let planner = PlacementPlanner::new(&layer, &config).reserve(&reserved);
        let no_enemies: Vec<Unit> = Vec::new();
        let check = |x, y| {
            planner.check(Point2::new(x, y), BaseOrientation::RightTop, small, false, &no_enemies)
        };

        assert_eq!(check(4.0, 4.0), Err(Rejection::Occupied));
        assert_eq!(check(4.0, 6.0), Err(Rejection::Reserved));
        let spot = planner.find_next_build_spot(
            BaseOrientation::RightTop,
            small,
            false,
            Point2::new(4.0, 4.0),
            &no_enemies,
        );
        assert_eq!(spot, Some(Point2::new(4.0, 8.0)));
    }

    #[test]
    fn mineral_hull_excludes_candidates() {
        let layer = square_layer(20);
        let config = TerrainConfig::default();
        let corners: Vec<Point2> = [(3.0, 3.0), (9.0, 3.0), (9.0, 9.0), (3.0, 9.0)]
            .iter()
            .map(|&(x, y)| Point2::new(x, y))
            .collect();
        let hull = ConvexHull::new(&corners).unwrap();
        let planner = PlacementPlanner::new(&layer, &config).exclude_hull(Some(&hull));
        let no_enemies: Vec<Unit> = Vec::new();

        let spot = planner.find_next_build_spot(
            BaseOrientation::RightTop,
            FootprintKind::Small2x2,
            false,
            Point2::new(4.0, 4.0),
            &no_enemies,
        );
        assert_eq!(spot, Some(Point2::new(4.0, 10.0)));
    }

    #[test]
    fn addon_clearance_needs_room_on_the_right() {
        let layer = square_layer(12);
        let config = TerrainConfig::default();
        let planner = PlacementPlanner::new(&layer, &config);
        let no_enemies: Vec<Unit> = Vec::new();
        let spot = |with_addon| {
            planner.find_next_build_spot(
                BaseOrientation::LeftBottom,
                FootprintKind::Medium3x3,
                with_addon,
                Point2::new(9.5, 2.5),
                &no_enemies,
            )
        };

        // At x = 9.5 the 3x3 fits but its addon would poke out of the region.
        assert_eq!(spot(true), Some(Point2::new(7.5, 2.5)));
        assert_eq!(spot(false), Some(Point2::new(9.5, 2.5)));
    }

    #[test]
    fn axis_walk_stops_at_limit() {
        assert_eq!(axis_walk(2.0, 1, 7, 2.0), vec![2.0, 4.0, 6.0]);
        assert_eq!(axis_walk(5.5, -1, -1, 2.0), vec![5.5, 3.5, 1.5]);
        assert!(axis_walk(8.0, 1, 7, 2.0).is_empty());
    }
}

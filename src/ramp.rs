//! Ramps and the structure wall that closes them.
//!
//! A `Ramp` is a ramp cluster with its cells ordered by terrain height. The
//! solver places two depots on the outer lips of the ramp and one production
//! structure between them, all derived from circle-circle intersections
//! around the two lip points:
//!
//! 1. The lips are the two highest cells farthest from the bottom of the ramp.
//! 2. Circles of radius √`depot_radius_sq` around both lips meet at the middle
//!    reference, on the high-ground side.
//! 3. Circles of radius √`corner_depot_radius_sq` around the lip midpoint and
//!    the middle reference meet at the two corner depots.
//! 4. Circles of radius √`production_radius_sq` around both lips meet at the
//!    production anchor, again on the high-ground side.
//! 5. A production anchor whose addon would overlap a depot moves left.
//!
//! The addon is part of the wall. After a shift it is the piece that closes
//! the gap the production structure left behind.

use crate::cluster::Cluster;
use crate::config::TerrainConfig;
use crate::constants::*;
use crate::error::*;
use crate::footprint::FootprintKind;
use crate::geometry::*;
use crate::host::StructureType;
use crate::location::*;
use crate::terrain::*;
use fnv::{FnvHashMap, FnvHashSet};
use itertools::iproduct;
use log::*;
use pathfinding::directed::bfs::bfs;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug)]
pub struct Ramp {
    id: u32,
    cells: Vec<(GridCell, i32)>,
    members: FnvHashSet<GridCell>,
    bounds: BoundingBox,
    upper: Vec<GridCell>,
    lower: Vec<GridCell>,
}

impl Ramp {
    pub fn new<T: TerrainQuery + ?Sized>(
        cluster: &Cluster,
        terrain: &T,
    ) -> Result<Ramp, TerrainError> {
        let cells = cluster.height_sorted(terrain);

        let (top, bottom) = match (cells.first(), cells.last()) {
            (Some(first), Some(last)) => (first.1, last.1),
            _ => {
                return Err(TerrainError::InvalidCluster {
                    cells: 0,
                    reason: "cluster is empty",
                })
            }
        };

        if top == bottom {
            return Err(TerrainError::InvalidCluster {
                cells: cells.len(),
                reason: "cluster has a single height level",
            });
        }

        let at_height = |height: i32| -> Vec<GridCell> {
            cells
                .iter()
                .filter(|(_, h)| *h == height)
                .map(|(c, _)| *c)
                .collect()
        };
        let upper = at_height(top);
        let lower = at_height(bottom);

        if upper.len() < 2 {
            return Err(TerrainError::InvalidCluster {
                cells: cells.len(),
                reason: "fewer than two upper cells",
            });
        }

        let members = cells.iter().map(|(c, _)| c.normalized()).collect();
        let bounds = BoundingBox::from_cells(cells.iter().map(|(c, _)| c)).ok_or(
            TerrainError::InvalidCluster {
                cells: 0,
                reason: "cluster is empty",
            },
        )?;

        Ok(Ramp {
            id: cluster.id(),
            cells,
            members,
            bounds,
            upper,
            lower,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Cells with their heights, highest first.
    pub fn cells(&self) -> &[(GridCell, i32)] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        self.members.contains(&cell.normalized())
    }

    /// Cells at the ramp's highest level.
    pub fn upper(&self) -> &[GridCell] {
        &self.upper
    }

    /// Cells at the ramp's lowest level.
    pub fn lower(&self) -> &[GridCell] {
        &self.lower
    }

    pub fn top_height(&self) -> i32 {
        self.cells.first().map(|(_, h)| *h).unwrap_or_default()
    }

    pub fn bottom_height(&self) -> i32 {
        self.cells.last().map(|(_, h)| *h).unwrap_or_default()
    }

    pub fn top_center(&self) -> Point2 {
        Point2::mean(self.upper.iter().map(|c| c.center())).unwrap_or_default()
    }

    pub fn bottom_center(&self) -> Point2 {
        Point2::mean(self.lower.iter().map(|c| c.center())).unwrap_or_default()
    }

    /// Point on the approach side of the ramp. Wall anchors are picked to be
    /// away from it.
    pub fn lower_reference(&self) -> Point2 {
        self.bottom_center()
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Centers of the two upper cells farthest from the lower reference.
    pub fn lip_points(&self) -> [Point2; 2] {
        let reference = self.lower_reference();
        let mut upper = self.upper.clone();
        upper.sort_by(|a, b| {
            b.center()
                .distance_squared(reference)
                .total_cmp(&a.center().distance_squared(reference))
                .then(a.cmp(b))
        });

        let lip = |cell: GridCell| cell.to_point().offset(CELL_CENTER_OFFSET, CELL_CENTER_OFFSET);
        [lip(upper[0]), lip(upper[1])]
    }

    /// Whether ground units are kept from walking from the bottom of the ramp
    /// onto the high ground around it once `structures` stand.
    ///
    /// The neighbourhood of the ramp is rasterized at sub-cell resolution.
    /// Unpathable cells and structure cells are grown by half the unit radius
    /// so that only gaps at least one unit radius wide stay open, then the
    /// free sub-cells are searched from every bottom cell for any high ground
    /// cell on the edge of the window. A bottom that is entirely covered does
    /// not count as sealed.
    pub fn is_sealed_by<T: TerrainQuery + ?Sized>(
        &self,
        terrain: &T,
        config: &TerrainConfig,
        structures: &[GridCell],
    ) -> bool {
        let res = config.seal_check_resolution.max(1) as i32;
        let window = self.bounds.expanded(config.seal_check_margin);
        let (origin_x, origin_y) = (window.min.cell_x(), window.min.cell_y());
        let width = window.width() * res;
        let height = window.height() * res;

        let structures: FnvHashSet<GridCell> = structures.iter().map(|c| c.normalized()).collect();
        let is_obstacle = |x: i32, y: i32| -> bool {
            !terrain.is_pathable(x, y) || structures.contains(&GridCell::from_coords(x, y))
        };

        let clearance = config.unit_radius / 2.0;
        let clearance_sq = clearance * clearance;
        let sub_cell_center = |sx: i32, sy: i32| {
            Point2::new(
                origin_x as f32 + (sx as f32 + 0.5) / res as f32,
                origin_y as f32 + (sy as f32 + 0.5) / res as f32,
            )
        };
        let sub_cell_of = |point: Point2| {
            (
                ((point.x - origin_x as f32) * res as f32).floor() as i32,
                ((point.y - origin_y as f32) * res as f32).floor() as i32,
            )
        };

        let mut free = MapDataArray::new(width as usize, height as usize, false);
        for sy in 0..height {
            for sx in 0..width {
                let p = sub_cell_center(sx, sy);
                let (x0, x1) = ((p.x - clearance).floor() as i32, (p.x + clearance).floor() as i32);
                let (y0, y1) = ((p.y - clearance).floor() as i32, (p.y + clearance).floor() as i32);
                let clear = iproduct!(x0..=x1, y0..=y1).all(|(cx, cy)| {
                    !is_obstacle(cx, cy) || distance_sq_to_cell(p, cx, cy) >= clearance_sq
                });
                free.set(sx as usize, sy as usize, clear);
            }
        }

        let is_free = |x: i32, y: i32| free.get_checked(x, y) == Some(&true);

        let starts: Vec<(i32, i32)> = self
            .lower
            .iter()
            .map(|cell| sub_cell_of(cell.center()))
            .filter(|&(x, y)| is_free(x, y))
            .collect();
        if starts.is_empty() {
            warn!("Wall seal check: bottom of ramp {} is covered", self.id);
            return false;
        }

        let top = self.top_height();
        let escapes = |x: i32, y: i32| {
            if x != 0 && y != 0 && x != width - 1 && y != height - 1 {
                return false;
            }
            let cell = GridCell::from_coords(
                origin_x + x.div_euclid(res),
                origin_y + y.div_euclid(res),
            );
            !self.contains(cell) && terrain.cell_height(cell) >= top
        };

        // `None` is a virtual source joined to every free bottom cell.
        let leak = bfs(
            &None,
            |node: &Option<(i32, i32)>| match *node {
                None => starts.iter().copied().map(Some).collect::<Vec<_>>(),
                Some((x, y)) => NEIGHBORS_8
                    .iter()
                    .filter_map(|&(dx, dy)| {
                        let (nx, ny) = (x + dx, y + dy);
                        if !is_free(nx, ny) {
                            return None;
                        }
                        // No squeezing diagonally between two blocked sub-cells.
                        if dx != 0 && dy != 0 && (!is_free(x + dx, y) || !is_free(x, y + dy)) {
                            return None;
                        }
                        Some(Some((nx, ny)))
                    })
                    .collect(),
            },
            |node| node.map_or(false, |(x, y)| escapes(x, y)),
        );

        if let Some(path) = &leak {
            trace!(
                "Wall seal check: ramp {} leaks after {} steps",
                self.id,
                path.len() - 1
            );
        }

        leak.is_none()
    }
}

fn distance_sq_to_cell(p: Point2, x: i32, y: i32) -> f32 {
    let (min_x, min_y) = (x as f32, y as f32);
    let dx = (min_x - p.x).max(0.0).max(p.x - (min_x + 1.0));
    let dy = (min_y - p.y).max(0.0).max(p.y - (min_y + 1.0));
    dx * dx + dy * dy
}

/// A named structure of the wall.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallPart {
    FirstDepot,
    SecondDepot,
    Production,
    /// Addon of the production structure, built by the structure itself.
    Addon,
}

impl WallPart {
    pub const ALL: [WallPart; 4] = [
        WallPart::FirstDepot,
        WallPart::SecondDepot,
        WallPart::Production,
        WallPart::Addon,
    ];

    pub fn structure(self) -> StructureType {
        match self {
            WallPart::FirstDepot | WallPart::SecondDepot => StructureType::SupplyDepot,
            WallPart::Production => StructureType::Barracks,
            WallPart::Addon => StructureType::TechLab,
        }
    }

    /// Cells the part covers once built.
    pub fn footprint(self) -> FootprintKind {
        self.structure().footprint().base()
    }
}

/// Anchors of the structures walling off a ramp.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RampWallPlan {
    /// Corner depots, ordered by x then y.
    pub depots: [Point2; 2],
    pub production: Point2,
    /// Set when the production anchor was moved left to make room for its addon.
    pub addon_shifted: bool,
}

impl RampWallPlan {
    pub fn anchor(&self, part: WallPart) -> Point2 {
        match part {
            WallPart::FirstDepot => self.depots[0],
            WallPart::SecondDepot => self.depots[1],
            WallPart::Production => self.production,
            WallPart::Addon => self.addon_anchor(),
        }
    }

    /// The part anchored at `pos`, comparing fixed-point keys.
    pub fn part_at(&self, pos: Point2) -> Option<WallPart> {
        WallPart::ALL
            .iter()
            .copied()
            .find(|&part| self.anchor(part).key() == pos.key())
    }

    pub fn addon_anchor(&self) -> Point2 {
        FootprintKind::Medium3x3WithAddon.addon_anchor(self.production)
    }

    /// Anchor and footprint of every wall part.
    pub fn footprints(&self) -> Vec<(Point2, FootprintKind)> {
        WallPart::ALL
            .iter()
            .map(|&part| (self.anchor(part), part.footprint()))
            .collect()
    }

    pub fn cells(&self) -> Vec<GridCell> {
        self.footprints()
            .into_iter()
            .flat_map(|(anchor, kind)| kind.cells(anchor, false))
            .collect()
    }

    /// Whether the whole wall, once built, closes `ramp`.
    pub fn seals<T: TerrainQuery + ?Sized>(
        &self,
        ramp: &Ramp,
        terrain: &T,
        config: &TerrainConfig,
    ) -> bool {
        ramp.is_sealed_by(terrain, config, &self.cells())
    }
}

/// Compute the wall for `ramp`. Any failed intersection aborts the whole plan,
/// and so does a part that would overlap another or stand on unbuildable
/// ground.
pub fn solve_wall<T: TerrainQuery + ?Sized>(
    ramp: &Ramp,
    terrain: &T,
    config: &TerrainConfig,
) -> Result<RampWallPlan, TerrainError> {
    let [lip_a, lip_b] = ramp.lip_points();
    let lower = ramp.lower_reference();

    let depot_radius = config.depot_radius_sq.sqrt();
    let middle = farther_of(circle_intersection(lip_a, lip_b, depot_radius)?, lower);

    let corner_radius = config.corner_depot_radius_sq.sqrt();
    let corners = circle_intersection(lip_a.midpoint(lip_b), middle, corner_radius)?;
    let mut depots = corners.map(|p| FootprintKind::Small2x2.snap(p));
    depots.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));

    let production_radius = config.production_radius_sq.sqrt();
    let production = farther_of(circle_intersection(lip_a, lip_b, production_radius)?, lower);
    let mut production = FootprintKind::Medium3x3.snap(production);

    let depot_cells: FnvHashSet<GridCell> = depots
        .iter()
        .flat_map(|&d| FootprintKind::Small2x2.cells(d, false))
        .collect();
    let addon_blocked = FootprintKind::Medium3x3WithAddon
        .addon_cells(production)
        .iter()
        .any(|cell| depot_cells.contains(cell));

    if addon_blocked {
        debug!(
            "Ramp {}: addon at ({}, {}) hits a depot, shifting production left",
            ramp.id(),
            production.x,
            production.y
        );
        production = production.offset(-config.addon_shift, 0.0);
    }

    trace!(
        "Ramp {}: lips ({}, {}) ({}, {}), middle ({}, {})",
        ramp.id(),
        lip_a.x,
        lip_a.y,
        lip_b.x,
        lip_b.y,
        middle.x,
        middle.y
    );

    let plan = RampWallPlan {
        depots,
        production,
        addon_shifted: addon_blocked,
    };
    check_footprints(&plan, terrain)?;

    Ok(plan)
}

/// Every part must stand on placable ground without sharing a cell with
/// another part.
fn check_footprints<T: TerrainQuery + ?Sized>(
    plan: &RampWallPlan,
    terrain: &T,
) -> Result<(), TerrainError> {
    let mut claimed: FnvHashMap<GridCell, WallPart> = FnvHashMap::default();

    for part in WallPart::ALL {
        for cell in part.footprint().cells(plan.anchor(part), false) {
            if !terrain.is_placable_cell(cell) {
                return Err(TerrainError::UnbuildableWall {
                    part,
                    x: cell.cell_x(),
                    y: cell.cell_y(),
                });
            }
            if let Some(first) = claimed.insert(cell, part) {
                return Err(TerrainError::OverlappingWall {
                    first,
                    second: part,
                });
            }
        }
    }

    Ok(())
}

//! Flood-fill grouping of grid cells into connected clusters.
//!
//! Candidates are painted onto a raster covering the map, then repeatedly
//! one unclustered candidate is taken, given a fresh cluster id, and grown
//! breadth-first over every unclustered candidate within the Manhattan
//! neighbour distance. Membership only depends on the candidate set and the
//! options; the order clusters are discovered in follows the input order and
//! carries no meaning.

use crate::constants::*;
use crate::geometry::BoundingBox;
use crate::location::*;
use crate::terrain::*;
use fnv::FnvHashMap;
use log::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterOptions {
    /// Largest Manhattan step, in raster cells, between neighbours.
    pub max_distance: u32,
    /// Clusters with fewer cells are dropped. `None` keeps everything.
    pub min_size: Option<usize>,
    /// Raster cells per map cell.
    pub resolution: u32,
}

impl ClusterOptions {
    /// Grouping used for ramps: diagonal steps connect, noise is dropped.
    pub fn ramps() -> Self {
        ClusterOptions {
            max_distance: RAMP_NEIGHBOR_DISTANCE,
            min_size: Some(MIN_RAMP_CLUSTER_SIZE),
            resolution: 1,
        }
    }

    /// Grouping used for buildable regions: edge-adjacent cells, no filter.
    pub fn regions() -> Self {
        ClusterOptions {
            max_distance: REGION_NEIGHBOR_DISTANCE,
            min_size: None,
            resolution: 1,
        }
    }

    /// Every `(dx, dy)` with `0 < |dx| + |dy| <= max_distance`.
    pub fn neighbor_offsets(&self) -> Vec<(i32, i32)> {
        let d = self.max_distance as i32;
        let mut offsets = Vec::new();
        for dy in -d..=d {
            for dx in -d..=d {
                if (dx, dy) != (0, 0) && dx.abs() + dy.abs() <= d {
                    offsets.push((dx, dy));
                }
            }
        }
        offsets
    }
}

impl Default for ClusterOptions {
    fn default() -> Self {
        ClusterOptions::ramps()
    }
}

/// A connected group of cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    id: u32,
    cells: Vec<GridCell>,
}

impl Cluster {
    pub fn new(id: u32, cells: Vec<GridCell>) -> Self {
        Cluster { id, cells }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        self.cells.contains(&cell)
    }

    /// Mean of the cell centers.
    pub fn mean_position(&self) -> Option<Point2> {
        Point2::mean(self.cells.iter().map(|c| c.center()))
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_cells(self.cells.iter())
    }

    /// Cells with their terrain height, highest first. Ties keep cell order.
    pub fn height_sorted<T: TerrainQuery + ?Sized>(&self, terrain: &T) -> Vec<(GridCell, i32)> {
        let mut cells: Vec<(GridCell, i32)> = self
            .cells
            .iter()
            .map(|&c| (c, terrain.cell_height(c)))
            .collect();
        cells.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        cells
    }

    /// Cells sorted by key, for order-independent comparison.
    pub fn sorted_cells(&self) -> Vec<GridCell> {
        let mut cells = self.cells.clone();
        cells.sort();
        cells
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum CellTag {
    Empty,
    Unclustered,
    Clustered(u32),
}

/// Group `candidates` into clusters. `bounds` must cover every candidate;
/// candidates outside it are ignored.
pub fn cluster_cells<I>(
    candidates: I,
    bounds: BoundingBox,
    options: &ClusterOptions,
) -> Vec<Cluster>
where
    I: IntoIterator<Item = GridCell>,
{
    let resolution = options.resolution.max(1) as i64;
    let width = (bounds.width().max(0) as i64 * resolution) as usize;
    let height = (bounds.height().max(0) as i64 * resolution) as usize;
    let min_x = bounds.min.fixed_x() as i64;
    let min_y = bounds.min.fixed_y() as i64;
    let to_raster = |cell: GridCell| -> (i32, i32) {
        let x = ((cell.fixed_x() as i64 - min_x) * resolution).div_euclid(FIXED_POINT_SCALE as i64);
        let y = ((cell.fixed_y() as i64 - min_y) * resolution).div_euclid(FIXED_POINT_SCALE as i64);
        (x as i32, y as i32)
    };

    let mut raster = MapDataArray::new(width, height, CellTag::Empty);
    let mut members: FnvHashMap<(i32, i32), Vec<GridCell>> = FnvHashMap::default();
    let mut pending: Vec<(i32, i32)> = Vec::new();
    let mut ignored = 0usize;

    for cell in candidates {
        let (rx, ry) = to_raster(cell);
        if !raster.contains(rx, ry) {
            ignored += 1;
            continue;
        }
        let entry = members.entry((rx, ry)).or_default();
        if !entry.contains(&cell) {
            entry.push(cell);
        }
        if *raster.get(rx as usize, ry as usize) == CellTag::Empty {
            raster.set(rx as usize, ry as usize, CellTag::Unclustered);
            pending.push((rx, ry));
        }
    }

    if ignored > 0 {
        warn!("Clustering: ignored {} candidates outside the map bounds", ignored);
    }

    let offsets = options.neighbor_offsets();
    let mut clusters = Vec::new();
    let mut discarded = 0usize;
    let mut next_id = 0u32;
    let mut queue = VecDeque::new();

    while let Some(seed) = pending.pop() {
        if *raster.get(seed.0 as usize, seed.1 as usize) != CellTag::Unclustered {
            continue;
        }

        let id = next_id;
        next_id += 1;
        raster.set(seed.0 as usize, seed.1 as usize, CellTag::Clustered(id));
        queue.push_back(seed);

        let mut cells = Vec::new();
        while let Some((x, y)) = queue.pop_front() {
            if let Some(found) = members.get(&(x, y)) {
                cells.extend(found.iter().copied());
            }
            for &(dx, dy) in &offsets {
                let nx = x + dx;
                let ny = y + dy;
                if raster.get_checked(nx, ny) == Some(&CellTag::Unclustered) {
                    raster.set(nx as usize, ny as usize, CellTag::Clustered(id));
                    queue.push_back((nx, ny));
                }
            }
        }

        match options.min_size {
            Some(min) if cells.len() < min => discarded += 1,
            _ => clusters.push(Cluster::new(id, cells)),
        }
    }

    debug!(
        "Clustering: {} raster cells -> {} clusters kept, {} below minimum size",
        members.len(),
        clusters.len(),
        discarded
    );

    clusters
}

/// Pathable, unbuildable cells that sit on a height transition. Flat
/// unbuildable cells are vision blockers, not ramps.
pub fn ramp_candidates<T: TerrainQuery + ?Sized>(terrain: &T) -> Vec<GridCell> {
    unbuildable_pathable(terrain)
        .filter(|&(x, y)| !is_flat(terrain, x, y))
        .map(|(x, y)| GridCell::from_coords(x, y))
        .collect()
}

/// Pathable, unbuildable cells whose neighbours all share their height.
pub fn vision_blockers<T: TerrainQuery + ?Sized>(terrain: &T) -> Vec<GridCell> {
    unbuildable_pathable(terrain)
        .filter(|&(x, y)| is_flat(terrain, x, y))
        .map(|(x, y)| GridCell::from_coords(x, y))
        .collect()
}

/// Pathable and placable cells.
pub fn buildable_candidates<T: TerrainQuery + ?Sized>(terrain: &T) -> Vec<GridCell> {
    all_cells(terrain)
        .filter(|&(x, y)| terrain.is_pathable(x, y) && terrain.is_placable(x, y))
        .map(|(x, y)| GridCell::from_coords(x, y))
        .collect()
}

fn all_cells<T: TerrainQuery + ?Sized>(terrain: &T) -> impl Iterator<Item = (i32, i32)> {
    let bounds = terrain.map_bounds();
    let (x0, x1) = (bounds.min.cell_x(), bounds.max.cell_x());
    let (y0, y1) = (bounds.min.cell_y(), bounds.max.cell_y());
    (y0..y1).flat_map(move |y| (x0..x1).map(move |x| (x, y)))
}

fn unbuildable_pathable<'a, T: TerrainQuery + ?Sized>(
    terrain: &'a T,
) -> impl Iterator<Item = (i32, i32)> + 'a {
    all_cells(terrain)
        .filter(move |&(x, y)| terrain.is_pathable(x, y) && !terrain.is_placable(x, y))
}

/// Neighbours past the map edge have no height and are skipped.
fn is_flat<T: TerrainQuery + ?Sized>(terrain: &T, x: i32, y: i32) -> bool {
    let bounds = terrain.map_bounds();
    let h = terrain.terrain_height(x, y);
    NEIGHBORS_8
        .iter()
        .map(|&(dx, dy)| (x + dx, y + dy))
        .filter(|&(nx, ny)| bounds.contains_cell(nx, ny))
        .all(|(nx, ny)| terrain.terrain_height(nx, ny) == h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(size: i32) -> BoundingBox {
        BoundingBox::new(GridCell::from_coords(0, 0), GridCell::from_coords(size, size))
    }

    fn cells(coords: &[(i32, i32)]) -> Vec<GridCell> {
        coords.iter().map(|&(x, y)| GridCell::from_coords(x, y)).collect()
    }

    fn opts(max_distance: u32, min_size: Option<usize>, resolution: u32) -> ClusterOptions {
        ClusterOptions {
            max_distance,
            min_size,
            resolution,
        }
    }

    fn as_sets(clusters: &[Cluster]) -> Vec<Vec<GridCell>> {
        let mut sets: Vec<Vec<GridCell>> = clusters.iter().map(|c| c.sorted_cells()).collect();
        sets.sort();
        sets
    }

    #[test]
    fn neighbor_offsets_follow_manhattan_distance() {
        assert_eq!(opts(1, None, 1).neighbor_offsets().len(), 4);
        assert_eq!(opts(2, None, 1).neighbor_offsets().len(), 12);
    }

    #[test]
    fn diagonal_cells_join_at_distance_two() {
        let input = cells(&[(1, 1), (2, 2), (3, 3), (10, 10)]);
        let options = opts(2, None, 1);
        let clusters = cluster_cells(input.clone(), bounds(16), &options);
        assert_eq!(clusters.len(), 2);

        let edge_only = ClusterOptions {
            max_distance: 1,
            ..options
        };
        assert_eq!(cluster_cells(input, bounds(16), &edge_only).len(), 4);
    }

    #[test]
    fn clustering_is_independent_of_input_order() {
        let mut input = cells(&[
            (0, 0),
            (0, 1),
            (1, 1),
            (5, 5),
            (5, 6),
            (6, 6),
            (9, 0),
            (9, 1),
            (12, 12),
        ]);
        let options = opts(1, None, 1);
        let forward = cluster_cells(input.clone(), bounds(16), &options);
        input.reverse();
        let backward = cluster_cells(input.clone(), bounds(16), &options);
        input.rotate_left(4);
        let rotated = cluster_cells(input, bounds(16), &options);

        assert_eq!(as_sets(&forward), as_sets(&backward));
        assert_eq!(as_sets(&forward), as_sets(&rotated));
        assert_eq!(forward.len(), 4);
    }

    #[test]
    fn small_clusters_are_discarded_when_minimum_is_set() {
        let mut input: Vec<GridCell> = (0..8).map(|x| GridCell::from_coords(x, 3)).collect();
        input.extend(cells(&[(20, 20), (20, 21)]));
        let options = opts(1, Some(8), 1);
        let clusters = cluster_cells(input.clone(), bounds(32), &options);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].size(), 8);

        let keep_all = ClusterOptions {
            min_size: None,
            ..options
        };
        assert_eq!(cluster_cells(input, bounds(32), &keep_all).len(), 2);
    }

    #[test]
    fn sub_cell_resolution_separates_half_cell_points() {
        let input = vec![
            GridCell::from_point(Point2::new(2.0, 2.0)),
            GridCell::from_point(Point2::new(2.5, 2.0)),
            GridCell::from_point(Point2::new(3.5, 2.0)),
        ];
        assert_eq!(cluster_cells(input.clone(), bounds(8), &opts(1, None, 1)).len(), 1);
        assert_eq!(cluster_cells(input, bounds(8), &opts(1, None, 2)).len(), 2);
    }

    #[test]
    fn candidates_outside_bounds_are_ignored() {
        let input = cells(&[(1, 1), (40, 40)]);
        let clusters = cluster_cells(input, bounds(8), &ClusterOptions::regions());
        assert_eq!(clusters.len(), 1);
    }

    #[test]
    fn ramp_candidates_skip_flat_unbuildable_cells() {
        // Columns 0..4 high, 4..6 sloped, 6..10 low; a flat unbuildable patch
        // sits in the middle of the low ground.
        let terrain = GridTerrain::from_fn(10, 10, |x, y| {
            let pathable = TerrainFlags::PATHABLE;
            match x {
                0..=3 => (pathable | TerrainFlags::PLACABLE, 10),
                4 | 5 => (pathable, 10 - 2 * (x - 3)),
                _ if (7..=8).contains(&x) && (4..=5).contains(&y) => (pathable, 2),
                _ => (pathable | TerrainFlags::PLACABLE, 2),
            }
        });
        let ramps = ramp_candidates(&terrain);
        assert_eq!(ramps.len(), 20);
        assert!(ramps.iter().all(|c| c.cell_x() == 4 || c.cell_x() == 5));
        assert_eq!(vision_blockers(&terrain).len(), 4);
        assert_eq!(buildable_candidates(&terrain).len(), 100 - 20 - 4);
    }

    #[test]
    fn flat_unbuildable_cells_on_the_map_edge_are_vision_blockers() {
        let terrain = GridTerrain::from_fn(6, 6, |x, y| {
            if x == 0 && (2..=3).contains(&y) {
                (TerrainFlags::PATHABLE, 4)
            } else {
                (TerrainFlags::PATHABLE | TerrainFlags::PLACABLE, 4)
            }
        });
        assert!(ramp_candidates(&terrain).is_empty());
        assert_eq!(vision_blockers(&terrain), cells(&[(0, 2), (0, 3)]));
    }

    #[test]
    fn cluster_metadata() {
        let terrain = GridTerrain::from_fn(4, 4, |x, _| (TerrainFlags::PATHABLE, 10 - x));
        let cluster = Cluster::new(0, cells(&[(2, 0), (0, 0), (1, 0)]));
        let sorted = cluster.height_sorted(&terrain);
        assert_eq!(
            sorted.iter().map(|(_, h)| *h).collect::<Vec<_>>(),
            vec![10, 9, 8]
        );
        assert_eq!(cluster.mean_position(), Some(Point2::new(1.5, 0.5)));
    }
}

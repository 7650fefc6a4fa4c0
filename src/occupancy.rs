//! Sparse structure-footprint occupancy, one layer per analyzed region.
//!
//! A layer only knows the cells of its region: a cell that is not present is
//! not buildable, a present cell is either free (`false`) or covered by a
//! completed structure (`true`). Marking never adds cells to a layer, so
//! clearing a footprint that was never marked leaves the layer untouched.

use crate::footprint::FootprintKind;
use crate::geometry::BoundingBox;
use crate::location::*;
use fnv::FnvHashMap;
use log::*;
use serde::{Deserialize, Serialize};

/// Name of the layer covering the home base region.
pub const MAIN_LAYER: &str = "main";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OccupancyLayer {
    name: String,
    cells: FnvHashMap<GridCell, bool>,
    bounds: Option<BoundingBox>,
}

impl OccupancyLayer {
    /// A layer over `cells`, all initially free.
    pub fn new<I: IntoIterator<Item = GridCell>>(name: impl Into<String>, cells: I) -> Self {
        let cells: FnvHashMap<GridCell, bool> =
            cells.into_iter().map(|c| (c.normalized(), false)).collect();
        let bounds = BoundingBox::from_cells(cells.keys());
        OccupancyLayer {
            name: name.into(),
            cells,
            bounds,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bounds of the region this layer covers, `None` for an empty layer.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        self.cells.contains_key(&cell.normalized())
    }

    /// `Some(occupied)` for cells in the region, `None` otherwise.
    pub fn get(&self, cell: GridCell) -> Option<bool> {
        self.cells.get(&cell.normalized()).copied()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.values().filter(|&&occupied| occupied).count()
    }

    /// Set every cell of the footprint to `occupied`. Returns the number of
    /// cells whose state changed; re-marking is a no-op.
    pub fn mark_footprint(&mut self, anchor: Point2, kind: FootprintKind, occupied: bool) -> usize {
        let mut changed = 0;
        for cell in kind.cells(anchor, false) {
            if let Some(state) = self.cells.get_mut(&cell) {
                if *state != occupied {
                    *state = occupied;
                    changed += 1;
                }
            }
        }
        changed
    }

    /// True only if every footprint cell (and, when requested, the addon
    /// clearance) is in the region and free.
    pub fn is_area_free(&self, anchor: Point2, kind: FootprintKind, include_addon: bool) -> bool {
        kind.cells(anchor, include_addon)
            .iter()
            .all(|cell| self.cells.get(cell) == Some(&false))
    }

    /// Iterate `(cell, occupied)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (GridCell, bool)> + '_ {
        self.cells.iter().map(|(cell, occupied)| (*cell, *occupied))
    }
}

/// Named occupancy layers; layer 0 is the main base.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OccupancyGrid {
    layers: Vec<OccupancyLayer>,
}

impl OccupancyGrid {
    pub fn new(main: OccupancyLayer) -> Self {
        OccupancyGrid { layers: vec![main] }
    }

    /// Add a layer, replacing any existing layer with the same name.
    pub fn add_layer(&mut self, layer: OccupancyLayer) {
        if let Some(existing) = self.layers.iter_mut().find(|l| l.name == layer.name) {
            *existing = layer;
        } else {
            self.layers.push(layer);
        }
    }

    pub fn main(&self) -> Option<&OccupancyLayer> {
        self.layers.first()
    }

    pub fn layer(&self, name: &str) -> Option<&OccupancyLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn layers(&self) -> &[OccupancyLayer] {
        &self.layers
    }

    /// Mark a footprint in every layer that covers any of its cells.
    pub fn mark_footprint(&mut self, anchor: Point2, kind: FootprintKind, occupied: bool) -> usize {
        let changed: usize = self
            .layers
            .iter_mut()
            .map(|layer| layer.mark_footprint(anchor, kind, occupied))
            .sum();
        trace!(
            "Occupancy: {:?} at ({}, {}) -> {} ({} cells changed)",
            kind,
            anchor.x,
            anchor.y,
            occupied,
            changed
        );
        changed
    }

    /// Area check against the main layer.
    pub fn is_area_free(&self, anchor: Point2, kind: FootprintKind, include_addon: bool) -> bool {
        self.main()
            .map(|layer| layer.is_area_free(anchor, kind, include_addon))
            .unwrap_or(false)
    }

    /// Whether the cell containing `pos` is covered by a structure in any layer.
    pub fn is_occupied(&self, pos: Point2) -> bool {
        let cell = GridCell::from_point(pos);
        self.layers.iter().any(|layer| layer.get(cell) == Some(true))
    }
}

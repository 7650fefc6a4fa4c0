//! Structure footprints: the cells a structure covers relative to its anchor.
//!
//! Anchors are structure centers as the game reports them. Even-sized
//! footprints are anchored on cell corners, odd-sized ones on cell centers.
//! Subtracting the per-kind centering offset from an anchor yields the
//! lower-left cell of the footprint.

use crate::constants::*;
use crate::location::*;
use itertools::iproduct;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FootprintKind {
    Small2x2,
    Medium3x3,
    /// A 3x3 structure that reserves a 2x2 addon on its right side.
    Medium3x3WithAddon,
    Large5x5,
}

impl FootprintKind {
    /// Edge length of the main footprint in cells.
    pub fn size(self) -> i32 {
        match self {
            FootprintKind::Small2x2 => 2,
            FootprintKind::Medium3x3 | FootprintKind::Medium3x3WithAddon => 3,
            FootprintKind::Large5x5 => 5,
        }
    }

    /// Distance from the anchor to the lower-left corner of the footprint.
    pub fn centering_offset(self) -> f32 {
        self.size() as f32 / 2.0
    }

    pub fn has_addon(self) -> bool {
        self == FootprintKind::Medium3x3WithAddon
    }

    /// The kind without its addon reservation: the cells the structure
    /// itself covers once built.
    pub fn base(self) -> FootprintKind {
        match self {
            FootprintKind::Medium3x3WithAddon => FootprintKind::Medium3x3,
            other => other,
        }
    }

    /// Lower-left cell covered by a structure anchored at `anchor`.
    pub fn origin(self, anchor: Point2) -> GridCell {
        let offset = self.centering_offset();
        GridCell::from_point(anchor.offset(-offset, -offset)).normalized()
    }

    /// Cell offsets of the main footprint relative to `origin`.
    pub fn offsets(self) -> Vec<(i32, i32)> {
        let size = self.size();
        iproduct!(0..size, 0..size).collect()
    }

    /// Cell offsets of the 2x2 addon clearance relative to `origin`: right
    /// of the footprint, aligned with its bottom row.
    pub fn addon_offsets(self) -> [(i32, i32); 4] {
        let size = self.size();
        [(size, 0), (size + 1, 0), (size, 1), (size + 1, 1)]
    }

    /// Cells covered by a structure at `anchor`. Kinds that carry an addon
    /// always include its clearance; `include_addon` requests it for others.
    pub fn cells(self, anchor: Point2, include_addon: bool) -> Vec<GridCell> {
        let origin = self.origin(anchor);
        let mut cells: Vec<GridCell> = self
            .offsets()
            .into_iter()
            .map(|(dx, dy)| origin.offset(dx, dy))
            .collect();
        if include_addon || self.has_addon() {
            cells.extend(self.addon_cells(anchor));
        }
        cells
    }

    /// Cells of the addon clearance alone.
    pub fn addon_cells(self, anchor: Point2) -> Vec<GridCell> {
        let origin = self.origin(anchor);
        self.addon_offsets()
            .iter()
            .map(|&(dx, dy)| origin.offset(dx, dy))
            .collect()
    }

    /// Anchor of the addon that would attach to a structure at `anchor`.
    pub fn addon_anchor(self, anchor: Point2) -> Point2 {
        let shift = (self.size() - 3) as f32 / 2.0;
        anchor.offset(ADDON_OFFSET.0 + shift, ADDON_OFFSET.1 - shift)
    }

    /// Snap an arbitrary point onto this kind's anchor lattice.
    pub fn snap(self, point: Point2) -> Point2 {
        if self.size() % 2 == 0 {
            Point2::new(point.x.round(), point.y.round())
        } else {
            Point2::new(point.x.floor() + 0.5, point.y.floor() + 0.5)
        }
    }

    /// Map-space rectangle `(min, max)` of the main footprint.
    pub fn rect(self, anchor: Point2) -> (Point2, Point2) {
        let origin = self.origin(anchor).to_point();
        let size = self.size() as f32;
        (origin, origin.offset(size, size))
    }
}

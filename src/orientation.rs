//! Which map quadrant the home base occupies, and the scan directions that
//! follow from it.

use crate::geometry::BoundingBox;
use crate::location::*;
use serde::{Deserialize, Serialize};

/// Quadrant of the map containing the home base, relative to the map
/// center. `y` grows toward the top.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseOrientation {
    LeftTop,
    RightTop,
    LeftBottom,
    RightBottom,
}

/// Direction a quadrant-relative scan walks in, pointing away from the map
/// center into the back of the base.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScanDirection {
    pub x_sign: i32,
    pub y_sign: i32,
}

/// Edge of a bounding box a scan runs toward on each axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoundEdge {
    Min,
    Max,
}

impl BaseOrientation {
    pub const ALL: [BaseOrientation; 4] = [
        BaseOrientation::LeftTop,
        BaseOrientation::RightTop,
        BaseOrientation::LeftBottom,
        BaseOrientation::RightBottom,
    ];

    pub fn is_left(self) -> bool {
        matches!(self, BaseOrientation::LeftTop | BaseOrientation::LeftBottom)
    }

    pub fn is_top(self) -> bool {
        matches!(self, BaseOrientation::LeftTop | BaseOrientation::RightTop)
    }

    pub fn scan_direction(self) -> ScanDirection {
        ScanDirection {
            x_sign: if self.is_left() { -1 } else { 1 },
            y_sign: if self.is_top() { 1 } else { -1 },
        }
    }

    /// `(x edge, y edge)` of a region the scan ends at.
    pub fn bound_edges(self) -> (BoundEdge, BoundEdge) {
        let direction = self.scan_direction();
        let pick = |sign: i32| if sign < 0 { BoundEdge::Min } else { BoundEdge::Max };
        (pick(direction.x_sign), pick(direction.y_sign))
    }

    /// Cell coordinates `(x, y)` where a scan over `bounds` stops, exclusive.
    pub fn scan_limits(self, bounds: &BoundingBox) -> (i32, i32) {
        let (x_edge, y_edge) = self.bound_edges();
        let x = match x_edge {
            BoundEdge::Min => bounds.min.cell_x() - 1,
            BoundEdge::Max => bounds.max.cell_x(),
        };
        let y = match y_edge {
            BoundEdge::Min => bounds.min.cell_y() - 1,
            BoundEdge::Max => bounds.max.cell_y(),
        };
        (x, y)
    }
}

/// Classify `home` against the midpoint of `map_bounds`. A base exactly on
/// the vertical center line counts as right, on the horizontal one as bottom.
pub fn classify_orientation(home: Point2, map_bounds: &BoundingBox) -> BaseOrientation {
    let center = map_bounds.center();
    match (home.x < center.x, home.y > center.y) {
        (true, true) => BaseOrientation::LeftTop,
        (false, true) => BaseOrientation::RightTop,
        (true, false) => BaseOrientation::LeftBottom,
        (false, false) => BaseOrientation::RightBottom,
    }
}

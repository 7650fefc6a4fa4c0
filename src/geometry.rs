//! Geometric primitives shared by the hull, ramp and placement code.

use crate::error::GeometryError;
use crate::location::*;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounds of an analyzed region, `min` inclusive, `max` exclusive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: GridCell,
    pub max: GridCell,
}

impl BoundingBox {
    pub fn new(min: GridCell, max: GridCell) -> Self {
        BoundingBox { min, max }
    }

    /// Smallest box covering every integer cell in `cells`.
    pub fn from_cells<'a, I: IntoIterator<Item = &'a GridCell>>(cells: I) -> Option<Self> {
        let mut iter = cells.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y) = (first.cell_x(), first.cell_y());
        let (mut max_x, mut max_y) = (min_x, min_y);
        for cell in iter {
            min_x = min_x.min(cell.cell_x());
            min_y = min_y.min(cell.cell_y());
            max_x = max_x.max(cell.cell_x());
            max_y = max_y.max(cell.cell_y());
        }
        Some(BoundingBox {
            min: GridCell::from_coords(min_x, min_y),
            max: GridCell::from_coords(max_x + 1, max_y + 1),
        })
    }

    pub fn width(&self) -> i32 {
        self.max.cell_x() - self.min.cell_x()
    }

    pub fn height(&self) -> i32 {
        self.max.cell_y() - self.min.cell_y()
    }

    pub fn contains_point(&self, point: Point2) -> bool {
        let min = self.min.to_point();
        let max = self.max.to_point();
        point.x >= min.x && point.x < max.x && point.y >= min.y && point.y < max.y
    }

    pub fn contains_cell(&self, x: i32, y: i32) -> bool {
        (self.min.cell_x()..self.max.cell_x()).contains(&x)
            && (self.min.cell_y()..self.max.cell_y()).contains(&y)
    }

    pub fn center(&self) -> Point2 {
        self.min.to_point().midpoint(self.max.to_point())
    }

    /// Grow the box by `cells` on every side.
    pub fn expanded(&self, cells: i32) -> Self {
        BoundingBox {
            min: self.min.offset(-cells, -cells),
            max: self.max.offset(cells, cells),
        }
    }
}

/// Intersection points of two circles of equal `radius` around `a` and `b`.
///
/// Requires `radius > |a - b| / 2`. The tangent case `radius == |a - b| / 2`
/// is rejected: it yields a single zero-width point that cannot anchor a
/// footprint pair.
pub fn circle_intersection(
    a: Point2,
    b: Point2,
    radius: f32,
) -> Result<[Point2; 2], GeometryError> {
    let delta = b - a;
    let distance = delta.length();
    if distance == 0.0 {
        return Err(GeometryError::CoincidentCenters);
    }

    let half_distance = distance / 2.0;
    if radius <= half_distance {
        return Err(GeometryError::NoIntersection {
            radius,
            half_distance,
        });
    }

    let middle = a.midpoint(b);
    let h = (radius * radius - half_distance * half_distance).sqrt();
    let offset = Point2::new(-delta.y / distance * h, delta.x / distance * h);

    Ok([middle + offset, middle - offset])
}

/// Whichever of the two points lies farther from `reference`. Ties go to the first.
pub fn farther_of(pair: [Point2; 2], reference: Point2) -> Point2 {
    if pair[1].distance_squared(reference) > pair[0].distance_squared(reference) {
        pair[1]
    } else {
        pair[0]
    }
}

/// Cross product of `(b - o)` and `(c - o)`; positive for a counter-clockwise turn.
pub fn cross(o: Point2, b: Point2, c: Point2) -> f32 {
    (b.x - o.x) * (c.y - o.y) - (b.y - o.y) * (c.x - o.x)
}

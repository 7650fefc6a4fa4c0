//! Convex hull of a point set, with quadrant-relative vertex ordering.
//!
//! The hull is built with Andrew's monotone chain and stored counter-clockwise
//! without collinear vertices. Sorting the vertices with the comparator of a
//! `BaseOrientation` makes "first" and "last" mean the same thing (nearest
//! and farthest along the scan direction) whichever quadrant the base is in.

use crate::error::GeometryError;
use crate::geometry::cross;
use crate::location::*;
use crate::orientation::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConvexHull {
    vertices: Vec<Point2>,
}

/// Axis ranges spanned by a hull, in scan order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HullScanBounds {
    /// Hull vertex reached first by the scan.
    pub first: Point2,
    /// Hull vertex reached last by the scan.
    pub last: Point2,
    /// `(start, end)` of the x extent, in scan order.
    pub horizontal: (f32, f32),
    /// `(start, end)` of the y extent, in scan order.
    pub vertical: (f32, f32),
}

impl HullScanBounds {
    /// Whether `point` falls within both axis extents.
    pub fn spans(&self, point: Point2) -> bool {
        let within = |v: f32, (a, b): (f32, f32)| v >= a.min(b) && v <= a.max(b);
        within(point.x, self.horizontal) && within(point.y, self.vertical)
    }
}

impl ConvexHull {
    /// Hull of `points`. Fewer than three points, or points that are all
    /// collinear, are a `GeometryError`.
    pub fn new(points: &[Point2]) -> Result<ConvexHull, GeometryError> {
        if points.len() < 3 {
            return Err(GeometryError::DegenerateHull {
                points: points.len(),
            });
        }

        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        sorted.dedup_by(|a, b| a.approx_eq(*b));

        let mut lower: Vec<Point2> = Vec::with_capacity(sorted.len());
        for &p in &sorted {
            while lower.len() >= 2
                && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0
            {
                lower.pop();
            }
            lower.push(p);
        }

        let mut upper: Vec<Point2> = Vec::with_capacity(sorted.len());
        for &p in sorted.iter().rev() {
            while upper.len() >= 2
                && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0
            {
                upper.pop();
            }
            upper.push(p);
        }

        // Each chain ends where the other begins.
        lower.pop();
        upper.pop();
        lower.extend(upper);

        if lower.len() < 3 {
            return Err(GeometryError::DegenerateHull {
                points: lower.len(),
            });
        }

        Ok(ConvexHull { vertices: lower })
    }

    /// Vertices in counter-clockwise order.
    pub fn vertices(&self) -> &[Point2] {
        &self.vertices
    }

    /// Inside or on the boundary, within `GEOMETRY_EPSILON`.
    pub fn contains(&self, point: Point2) -> bool {
        let n = self.vertices.len();
        (0..n).all(|i| {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            cross(a, b, point) >= -crate::constants::GEOMETRY_EPSILON * a.distance(b).max(1.0)
        })
    }

    /// Vertices sorted along the scan direction of `orientation`: primarily
    /// by x, then by y.
    pub fn ordered_for(&self, orientation: BaseOrientation) -> Vec<Point2> {
        let mut ordered = self.vertices.clone();
        ordered.sort_by(|a, b| scan_order(orientation, a, b));
        ordered
    }

    pub fn scan_bounds(&self, orientation: BaseOrientation) -> HullScanBounds {
        let ordered = self.ordered_for(orientation);
        let first = ordered[0];
        let last = ordered[ordered.len() - 1];

        let direction = orientation.scan_direction();
        let along = |v: f32, sign: i32| v * sign as f32;
        let (mut y_start, mut y_end) = (first.y, first.y);
        for p in &ordered {
            if along(p.y, direction.y_sign) < along(y_start, direction.y_sign) {
                y_start = p.y;
            }
            if along(p.y, direction.y_sign) > along(y_end, direction.y_sign) {
                y_end = p.y;
            }
        }

        HullScanBounds {
            first,
            last,
            horizontal: (first.x, last.x),
            vertical: (y_start, y_end),
        }
    }
}

/// Comparator placing points in the order a scan for `orientation` meets them.
pub fn scan_order(orientation: BaseOrientation, a: &Point2, b: &Point2) -> Ordering {
    let direction = orientation.scan_direction();
    let ax = a.x * direction.x_sign as f32;
    let bx = b.x * direction.x_sign as f32;
    let ay = a.y * direction.y_sign as f32;
    let by = b.y * direction.y_sign as f32;
    ax.total_cmp(&bx).then(ay.total_cmp(&by))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f32, f32)]) -> Vec<Point2> {
        coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    #[test]
    fn square_with_interior_points() {
        let points = pts(&[
            (0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (2.0, 2.0), (1.0, 3.0), (2.0, 0.0),
        ]);
        let hull = ConvexHull::new(&points).unwrap();
        assert_eq!(hull.vertices().len(), 4);
        for p in &points {
            assert!(hull.contains(*p), "{:?} outside hull", p);
        }
        assert!(!hull.contains(Point2::new(4.5, 2.0)));
    }

    #[test]
    fn every_input_point_is_contained() {
        // Mineral-line shaped cloud.
        let points = pts(&[
            (20.5, 30.0), (21.5, 31.0), (22.5, 32.5), (23.0, 34.0), (23.5, 35.5),
            (22.0, 37.0), (21.0, 38.0), (24.0, 33.0), (26.5, 33.5), (22.5, 35.0),
        ]);
        let hull = ConvexHull::new(&points).unwrap();
        for p in &points {
            assert!(hull.contains(*p));
        }
        // Counter-clockwise winding.
        let v = hull.vertices();
        let area: f32 = (0..v.len())
            .map(|i| {
                let (a, b) = (v[i], v[(i + 1) % v.len()]);
                a.x * b.y - b.x * a.y
            })
            .sum();
        assert!(area > 0.0);
    }

    #[test]
    fn two_points_are_degenerate() {
        let points = pts(&[(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(
            ConvexHull::new(&points),
            Err(GeometryError::DegenerateHull { points: 2 })
        );
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let points = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        assert!(ConvexHull::new(&points).is_err());
    }

    #[test]
    fn ordering_follows_quadrant() {
        let square = pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let hull = ConvexHull::new(&square).unwrap();

        let right_top = hull.ordered_for(BaseOrientation::RightTop);
        assert_eq!(right_top[0], Point2::new(0.0, 0.0));
        assert_eq!(right_top[3], Point2::new(4.0, 4.0));

        let left_bottom = hull.ordered_for(BaseOrientation::LeftBottom);
        assert_eq!(left_bottom[0], Point2::new(4.0, 4.0));
        assert_eq!(left_bottom[3], Point2::new(0.0, 0.0));

        let bounds = hull.scan_bounds(BaseOrientation::LeftTop);
        assert_eq!(bounds.first, Point2::new(4.0, 0.0));
        assert_eq!(bounds.last, Point2::new(0.0, 4.0));
        assert_eq!(bounds.horizontal, (4.0, 0.0));
        assert_eq!(bounds.vertical, (0.0, 4.0));
        assert!(bounds.spans(Point2::new(2.0, 2.0)));
        assert!(!bounds.spans(Point2::new(5.0, 2.0)));
    }
}

use crate::constants::*;
use serde::*;

/// Fixed-point map coordinate used as a hash key for cells and anchors.
///
/// Coordinates are stored in units of `1 / FIXED_POINT_SCALE` map units, so
/// two anchors that differ only by floating point noise map to the same key.
/// Integer cells are addressed by their lower-left corner.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct GridCell {
    x: i32,
    y: i32,
}

impl GridCell {
    /// Key for the integer cell `(x, y)`.
    pub fn from_coords(x: i32, y: i32) -> Self {
        GridCell {
            x: x * FIXED_POINT_SCALE,
            y: y * FIXED_POINT_SCALE,
        }
    }

    /// Key for an arbitrary map point, rounded to the fixed-point grid.
    pub fn from_point(point: Point2) -> Self {
        GridCell {
            x: (point.x * FIXED_POINT_SCALE as f32).round() as i32,
            y: (point.y * FIXED_POINT_SCALE as f32).round() as i32,
        }
    }

    #[inline]
    pub fn fixed_x(self) -> i32 {
        self.x
    }

    #[inline]
    pub fn fixed_y(self) -> i32 {
        self.y
    }

    /// Integer cell containing this coordinate.
    #[inline]
    pub fn cell_x(self) -> i32 {
        self.x.div_euclid(FIXED_POINT_SCALE)
    }

    /// Integer cell containing this coordinate.
    #[inline]
    pub fn cell_y(self) -> i32 {
        self.y.div_euclid(FIXED_POINT_SCALE)
    }

    /// Snap to the integer cell containing this coordinate.
    pub fn normalized(self) -> Self {
        GridCell::from_coords(self.cell_x(), self.cell_y())
    }

    pub fn is_integral(self) -> bool {
        self.x % FIXED_POINT_SCALE == 0 && self.y % FIXED_POINT_SCALE == 0
    }

    pub fn to_point(self) -> Point2 {
        Point2::new(
            self.x as f32 / FIXED_POINT_SCALE as f32,
            self.y as f32 / FIXED_POINT_SCALE as f32,
        )
    }

    /// Center of the integer cell containing this coordinate.
    pub fn center(self) -> Point2 {
        Point2::new(
            self.cell_x() as f32 + CELL_CENTER_OFFSET,
            self.cell_y() as f32 + CELL_CENTER_OFFSET,
        )
    }

    /// Key offset by whole cells.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        GridCell {
            x: self.x + dx * FIXED_POINT_SCALE,
            y: self.y + dy * FIXED_POINT_SCALE,
        }
    }

    /// Chebyshev distance in whole cells.
    pub fn distance_to(self, other: Self) -> i32 {
        let dx = self.cell_x() - other.cell_x();
        let dy = self.cell_y() - other.cell_y();

        dx.abs().max(dy.abs())
    }

    /// Manhattan distance in whole cells.
    pub fn manhattan_to(self, other: Self) -> i32 {
        (self.cell_x() - other.cell_x()).abs() + (self.cell_y() - other.cell_y()).abs()
    }

    #[inline]
    pub fn packed_repr(self) -> u64 {
        ((self.x as u32 as u64) << 32) | (self.y as u32 as u64)
    }

    #[inline]
    pub fn from_packed(packed: u64) -> Self {
        GridCell {
            x: (packed >> 32) as u32 as i32,
            y: (packed & 0xFFFF_FFFF) as u32 as i32,
        }
    }
}

impl Serialize for GridCell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.packed_repr().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GridCell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(GridCell::from_packed)
    }
}

/// A point on the map in map units. `y` grows toward the top of the map.
#[derive(Copy, Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Point2 { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Point2::new(self.x + dx, self.y + dy)
    }

    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn midpoint(self, other: Self) -> Self {
        Point2::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Equality within `GEOMETRY_EPSILON` on both axes.
    pub fn approx_eq(self, other: Self) -> bool {
        (self.x - other.x).abs() <= GEOMETRY_EPSILON && (self.y - other.y).abs() <= GEOMETRY_EPSILON
    }

    /// Fixed-point key for this point.
    pub fn key(self) -> GridCell {
        GridCell::from_point(self)
    }

    /// Mean of a set of points, `None` when empty.
    pub fn mean<I: IntoIterator<Item = Point2>>(points: I) -> Option<Point2> {
        let mut count = 0usize;
        let mut sum = Point2::default();
        for p in points {
            sum = sum + p;
            count += 1;
        }
        if count == 0 {
            None
        } else {
            Some(sum / count as f32)
        }
    }
}

impl std::ops::Add for Point2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Point2::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Point2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Point2::new(self.x - other.x, self.y - other.y)
    }
}

impl std::ops::Mul<f32> for Point2 {
    type Output = Self;
    fn mul(self, scale: f32) -> Self {
        Point2::new(self.x * scale, self.y * scale)
    }
}

impl std::ops::Div<f32> for Point2 {
    type Output = Self;
    fn div(self, scale: f32) -> Self {
        Point2::new(self.x / scale, self.y / scale)
    }
}

impl From<GridCell> for Point2 {
    fn from(cell: GridCell) -> Self {
        cell.to_point()
    }
}

impl From<(f32, f32)> for Point2 {
    fn from((x, y): (f32, f32)) -> Self {
        Point2::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noisy_points_share_a_key() {
        let a = GridCell::from_point(Point2::new(31.999_99, 34.000_01));
        let b = GridCell::from_point(Point2::new(32.0, 34.0));
        assert_eq!(a, b);
        assert_eq!(b, GridCell::from_coords(32, 34));
    }

    #[test]
    fn fractional_cells_normalize_to_containing_cell() {
        let anchor = GridCell::from_point(Point2::new(29.5, 31.5));
        assert!(!anchor.is_integral());
        assert_eq!(anchor.normalized(), GridCell::from_coords(29, 31));

        let negative = GridCell::from_point(Point2::new(-0.5, -1.5));
        assert_eq!(negative.cell_x(), -1);
        assert_eq!(negative.cell_y(), -2);
    }

    #[test]
    fn packed_repr_is_reversible_for_negative_coords() {
        let cell = GridCell::from_point(Point2::new(-3.25, 7.5));
        assert_eq!(GridCell::from_packed(cell.packed_repr()), cell);
    }

    #[test]
    fn mean_of_empty_set_is_none() {
        assert!(Point2::mean(Vec::new()).is_none());
        let mean = Point2::mean(vec![Point2::new(0.0, 0.0), Point2::new(2.0, 4.0)]);
        assert_eq!(mean, Some(Point2::new(1.0, 2.0)));
    }
}

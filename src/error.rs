use crate::ramp::WallPart;
use thiserror::Error;

/// Failures of the geometric primitives. These abort only the computation
/// that hit them; callers retry on a later tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A convex hull needs at least three input points.
    #[error("convex hull needs at least 3 points, got {points}")]
    DegenerateHull { points: usize },

    /// Circle-circle intersection requires `radius > half_distance`.
    #[error("radius {radius} does not exceed half the center distance {half_distance}")]
    NoIntersection { radius: f32, half_distance: f32 },

    /// Both circles share a center, so the intersection is not a point pair.
    #[error("circle centers coincide")]
    CoincidentCenters,
}

/// Failures of the terrain analysis entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TerrainError {
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// The cluster cannot be split into meaningful upper and lower cells.
    #[error("invalid cluster of {cells} cells: {reason}")]
    InvalidCluster { cells: usize, reason: &'static str },

    /// A wall part would cover a cell that does not take structures.
    #[error("{part:?} would cover unbuildable cell ({x}, {y})")]
    UnbuildableWall { part: WallPart, x: i32, y: i32 },

    /// Two wall parts claim the same cell.
    #[error("{first:?} and {second:?} overlap")]
    OverlappingWall { first: WallPart, second: WallPart },

    /// The map has no ramp cluster to analyze.
    #[error("no ramp found")]
    NoRampFound,
}

/// Sub-unit resolution of `GridCell` keys. One map unit is split into this
/// many fixed-point steps so fractional anchors hash and compare exactly.
pub const FIXED_POINT_SCALE: i32 = 100;

/// Clusters smaller than this are terrain noise rather than ramps.
pub const MIN_RAMP_CLUSTER_SIZE: usize = 8;

/// Manhattan neighbour distance used when grouping ramp cells.
pub const RAMP_NEIGHBOR_DISTANCE: u32 = 2;

/// Manhattan neighbour distance used when grouping buildable regions.
pub const REGION_NEIGHBOR_DISTANCE: u32 = 1;

/// Offset from a lip cell corner to its center.
pub const CELL_CENTER_OFFSET: f32 = 0.5;

/// Radius² of the circle pair that locates the middle depot reference.
pub const DEPOT_RADIUS_SQ: f32 = 2.5;

/// Radius² of the circle pair that locates the two corner depots.
pub const CORNER_DEPOT_RADIUS_SQ: f32 = 5.0;

/// Radius² of the circle pair that locates the production structure.
pub const PRODUCTION_RADIUS_SQ: f32 = 5.0;

/// Distance the production structure moves left when its addon would not fit.
pub const ADDON_SHIFT: f32 = 2.0;

/// Offset from a 3x3 anchor to the anchor of its 2x2 addon.
pub const ADDON_OFFSET: (f32, f32) = (2.5, -0.5);

/// Hostile units inside this radius of a candidate veto the placement.
pub const ENEMY_REJECT_RADIUS: f32 = 8.0;

/// Step between consecutive placement scan candidates, in cells.
pub const SCAN_STEP: u32 = 2;

/// Collision radius of the smallest ground unit the wall has to stop.
pub const GROUND_UNIT_RADIUS: f32 = 0.75;

/// Sub-cells per map cell in the wall seal check raster.
pub const SEAL_CHECK_RESOLUTION: u32 = 4;

/// Cells around the ramp bounding box inspected by the wall seal check.
pub const SEAL_CHECK_MARGIN: i32 = 6;

/// Tolerance for floating point comparisons on map coordinates.
pub const GEOMETRY_EPSILON: f32 = 1e-4;

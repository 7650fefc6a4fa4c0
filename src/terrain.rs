use crate::geometry::BoundingBox;
use crate::location::*;
use bitflags::*;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TerrainFlags: u8 {
        const NONE = 0;
        const PATHABLE = 1;
        const PLACABLE = 2;
    }
}

/// Pathability, placability and height oracle for the map.
///
/// Coordinates are integer cells. Implementations must answer "not pathable,
/// not placable" for cells outside `map_bounds`.
pub trait TerrainQuery {
    fn is_pathable(&self, x: i32, y: i32) -> bool;

    fn is_placable(&self, x: i32, y: i32) -> bool;

    fn terrain_height(&self, x: i32, y: i32) -> i32;

    fn map_bounds(&self) -> BoundingBox;

    fn is_pathable_cell(&self, cell: GridCell) -> bool {
        self.is_pathable(cell.cell_x(), cell.cell_y())
    }

    fn is_placable_cell(&self, cell: GridCell) -> bool {
        self.is_placable(cell.cell_x(), cell.cell_y())
    }

    fn cell_height(&self, cell: GridCell) -> i32 {
        self.terrain_height(cell.cell_x(), cell.cell_y())
    }
}

impl<T: TerrainQuery + ?Sized> TerrainQuery for &T {
    fn is_pathable(&self, x: i32, y: i32) -> bool {
        (**self).is_pathable(x, y)
    }

    fn is_placable(&self, x: i32, y: i32) -> bool {
        (**self).is_placable(x, y)
    }

    fn terrain_height(&self, x: i32, y: i32) -> i32 {
        (**self).terrain_height(x, y)
    }

    fn map_bounds(&self) -> BoundingBox {
        (**self).map_bounds()
    }
}

/// A width x height raster of per-cell data, origin at cell (0, 0).
#[derive(Clone, Debug)]
pub struct MapDataArray<T: Copy> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Copy> MapDataArray<T> {
    pub fn new(width: usize, height: usize, initial: T) -> Self {
        MapDataArray {
            width,
            height,
            data: vec![initial; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        let index = y * self.width + x;
        &self.data[index]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let index = y * self.width + x;
        &mut self.data[index]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        *self.get_mut(x, y) = value;
    }

    /// Bounds-checked read with signed coordinates.
    #[inline]
    pub fn get_checked(&self, x: i32, y: i32) -> Option<&T> {
        if self.contains(x, y) {
            Some(self.get(x as usize, y as usize))
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(i, v)| {
            let x = i % width;
            let y = i / width;
            ((x, y), v)
        })
    }
}

/// Neighbor offsets for 8-directional movement.
pub const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
];

/// In-memory terrain backed by per-cell flags and heights.
///
/// This is the offline terrain used by tests and by hosts that snapshot the
/// game's pathing, placement and height grids once at game start.
#[derive(Clone, Debug)]
pub struct GridTerrain {
    flags: MapDataArray<TerrainFlags>,
    heights: MapDataArray<i32>,
}

impl GridTerrain {
    /// A map of the given size with every cell unpathable at height 0.
    pub fn new(width: usize, height: usize) -> GridTerrain {
        GridTerrain {
            flags: MapDataArray::new(width, height, TerrainFlags::NONE),
            heights: MapDataArray::new(width, height, 0),
        }
    }

    /// Build a map by evaluating `cell` for every coordinate.
    pub fn from_fn<F>(width: usize, height: usize, mut cell: F) -> GridTerrain
    where
        F: FnMut(i32, i32) -> (TerrainFlags, i32),
    {
        let mut terrain = GridTerrain::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let (flags, h) = cell(x as i32, y as i32);
                terrain.flags.set(x, y, flags);
                terrain.heights.set(x, y, h);
            }
        }
        terrain
    }

    pub fn set(&mut self, x: i32, y: i32, flags: TerrainFlags, height: i32) {
        if self.flags.contains(x, y) {
            self.flags.set(x as usize, y as usize, flags);
            self.heights.set(x as usize, y as usize, height);
        }
    }

    pub fn get(&self, x: i32, y: i32) -> TerrainFlags {
        self.flags
            .get_checked(x, y)
            .copied()
            .unwrap_or(TerrainFlags::NONE)
    }
}

impl TerrainQuery for GridTerrain {
    fn is_pathable(&self, x: i32, y: i32) -> bool {
        self.get(x, y).contains(TerrainFlags::PATHABLE)
    }

    fn is_placable(&self, x: i32, y: i32) -> bool {
        self.get(x, y).contains(TerrainFlags::PLACABLE)
    }

    fn terrain_height(&self, x: i32, y: i32) -> i32 {
        self.heights.get_checked(x, y).copied().unwrap_or(0)
    }

    fn map_bounds(&self) -> BoundingBox {
        BoundingBox::new(
            GridCell::from_coords(0, 0),
            GridCell::from_coords(self.flags.width() as i32, self.flags.height() as i32),
        )
    }
}

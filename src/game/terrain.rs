//! Destructible tile map
//!
//! The map is a flat byte-per-cell grid. Rows are padded to a power of two
//! so a cell index is `(row << height_shift) + column`, the layout peers
//! receive verbatim through [`TerrainMap::to_bytes`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::body::Extents;
use crate::game::constants::terrain::{
    ENTERING_CLEAR_OFFSETS, MAX_WALL_HIT_POINTS, WALL_HEIGHT, WALL_HEIGHT_SHIFT, WALL_WIDTH,
    WALL_WIDTH_SHIFT,
};
use crate::util::point::Point;
use crate::util::vec2::Vec2;

/// Content of a single terrain cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum WallType {
    Empty = 0,
    Brick = 1,
    Stone = 2,
    Water = 3,
    WaterSurface = 4,
}

impl WallType {
    /// Brick and stone block bodies; everything else is passable
    #[inline]
    pub fn is_solid(self) -> bool {
        matches!(self, WallType::Brick | WallType::Stone)
    }

    #[inline]
    pub fn is_wet(self) -> bool {
        matches!(self, WallType::Water | WallType::WaterSurface)
    }
}

/// Grid coordinates of a terrain cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell containing a pixel
    #[inline]
    pub fn containing(point: Point) -> Self {
        Self {
            x: point.x >> WALL_WIDTH_SHIFT,
            y: point.y >> WALL_HEIGHT_SHIFT,
        }
    }

    /// Cell containing a world position (truncated to pixels first)
    #[inline]
    pub fn at(position: Vec2) -> Self {
        Self::containing(Point::from_vec2(position))
    }

    /// Top-left pixel of the cell
    #[inline]
    pub fn origin(self) -> Point {
        Point::new(self.x << WALL_WIDTH_SHIFT, self.y << WALL_HEIGHT_SHIFT)
    }

    /// Center of the cell in world space
    #[inline]
    pub fn center(self) -> Vec2 {
        let origin = self.origin();
        Vec2::new(
            (origin.x + WALL_WIDTH / 2) as f32,
            (origin.y + WALL_HEIGHT / 2) as f32,
        )
    }
}

const MIN_SIDE: u32 = 3;

/// Map generation parameters (percent values are 0..=100)
#[derive(Debug, Clone, Copy)]
pub struct TerrainParams {
    pub width: u32,
    pub height: u32,
    pub wall_percent: u8,
    pub stone_percent: u8,
    pub water_percent: u8,
}

/// Number of bits a row index is shifted by; the stored row width is
/// `1 << shift`, the smallest power of two not below `width`.
pub fn calculate_height_shift(width: u32) -> u32 {
    width.max(1).next_power_of_two().trailing_zeros()
}

#[derive(Debug, Clone)]
pub struct TerrainMap {
    cells: Vec<WallType>,
    width: i32,
    height: i32,
    height_shift: u32,
    water_level: i32,
    /// Bumped by every cell write that changes a cell
    revision: u64,
}

impl TerrainMap {
    /// Creates a map with a stone border and no inner walls. Both sides are
    /// at least 3 cells so there is always one inner cell.
    pub fn open(params: &TerrainParams) -> Self {
        let height_shift = calculate_height_shift(params.width.max(MIN_SIDE));
        let width = 1i32 << height_shift;
        let height = params.height.max(MIN_SIDE) as i32;
        let water_percent = params.water_percent.min(100) as i32;
        let water_level = height - 1 - (height - 2) * water_percent / 100;

        let mut map = Self {
            cells: vec![WallType::Empty; (width * height) as usize],
            width,
            height,
            height_shift,
            water_level,
            revision: 0,
        };
        for y in 0..height {
            for x in 0..width {
                let wall = if map.is_border(x, y) {
                    WallType::Stone
                } else {
                    map.open_type_for_row(y)
                };
                map.set_wall(x, y, wall);
            }
        }
        map
    }

    /// Generates a random map: stone border, then each inner cell is a wall
    /// with probability `wall_percent`, stone among walls with probability
    /// `stone_percent`, otherwise the open type of its row.
    pub fn generate<R: Rng + ?Sized>(params: &TerrainParams, rng: &mut R) -> Self {
        let mut map = Self::open(params);
        let wall_probability = params.wall_percent.min(100) as f64 / 100.0;
        let stone_probability = params.stone_percent.min(100) as f64 / 100.0;

        for y in 1..map.height - 1 {
            for x in 1..map.width - 1 {
                if rng.gen::<f64>() < wall_probability {
                    let wall = if rng.gen::<f64>() < stone_probability {
                        WallType::Stone
                    } else {
                        WallType::Brick
                    };
                    map.set_wall(x, y, wall);
                }
            }
        }
        map
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn height_shift(&self) -> u32 {
        self.height_shift
    }

    /// Row of the water surface; rows below it are water
    #[inline]
    pub fn water_level(&self) -> i32 {
        self.water_level
    }

    /// Width of the playfield in pixels
    #[inline]
    pub fn pixel_width(&self) -> i32 {
        self.width << WALL_WIDTH_SHIFT
    }

    /// Height of the playfield in pixels
    #[inline]
    pub fn pixel_height(&self) -> i32 {
        self.height << WALL_HEIGHT_SHIFT
    }

    #[inline]
    fn is_border(&self, x: i32, y: i32) -> bool {
        x == 0 || y == 0 || x == self.width - 1 || y == self.height - 1
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return None;
        }
        Some(((y << self.height_shift) + x) as usize)
    }

    /// Cell content; anything outside the grid reads as stone
    #[inline]
    pub fn wall(&self, x: i32, y: i32) -> WallType {
        self.index(x, y)
            .map(|i| self.cells[i])
            .unwrap_or(WallType::Stone)
    }

    #[inline]
    pub fn wall_at_cell(&self, cell: Cell) -> WallType {
        self.wall(cell.x, cell.y)
    }

    /// Content of the cell under a world position
    #[inline]
    pub fn wall_at(&self, position: Vec2) -> WallType {
        self.wall_at_cell(Cell::at(position))
    }

    /// Writes a cell; writes outside the grid are ignored
    pub fn set_wall(&mut self, x: i32, y: i32, wall: WallType) {
        if let Some(i) = self.index(x, y) {
            if self.cells[i] != wall {
                self.cells[i] = wall;
                self.revision += 1;
            }
        }
    }

    /// Changes the grid has seen; equal revisions mean equal bytes
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// What a non-wall cell of row `y` holds
    #[inline]
    pub fn open_type_for_row(&self, y: i32) -> WallType {
        if y < self.water_level {
            WallType::Empty
        } else if y == self.water_level {
            WallType::WaterSurface
        } else {
            WallType::Water
        }
    }

    /// Replaces a cell with the open type of its row
    pub fn clear_wall(&mut self, x: i32, y: i32) {
        let open = self.open_type_for_row(y);
        self.set_wall(x, y, open);
    }

    /// Clears the bricks above, left of, at and right of a spawn cell
    pub fn clear_for_entering_worm(&mut self, cell: Cell) {
        for (dx, dy) in ENTERING_CLEAR_OFFSETS {
            let (x, y) = (cell.x + dx, cell.y + dy);
            if self.wall(x, y) == WallType::Brick {
                self.clear_wall(x, y);
            }
        }
    }

    /// Whether the point under a world position is solid
    #[inline]
    pub fn point_hits(&self, position: Vec2) -> bool {
        self.wall_at(position).is_solid()
    }

    /// Tests the four corners and the center of a box against solid cells
    /// and returns the first solid cell found.
    pub fn box_hit(&self, position: Vec2, extents: Extents) -> Option<Cell> {
        let p = Point::from_vec2(position);
        let probes = [
            Point::new(p.x - extents.left, p.y - extents.up),
            Point::new(p.x - extents.left, p.y + extents.down),
            Point::new(p.x + extents.right, p.y - extents.up),
            Point::new(p.x + extents.right, p.y + extents.down),
            p,
        ];
        probes
            .into_iter()
            .map(Cell::containing)
            .find(|&cell| self.wall_at_cell(cell).is_solid())
    }

    #[inline]
    pub fn hits_box(&self, position: Vec2, extents: Extents) -> bool {
        self.box_hit(position, extents).is_some()
    }

    /// Iterates over the inner (non-border) cells, row by row
    pub fn inner_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (1..self.height - 1).flat_map(move |y| (1..self.width - 1).map(move |x| Cell::new(x, y)))
    }

    /// Flat byte-per-cell copy of the grid
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cells.iter().map(|&wall| wall as u8).collect()
    }
}

/// Hit points of every cell, parallel to the terrain grid. Only brick
/// cells ever consume them.
#[derive(Debug, Clone)]
pub struct WallHitPoints {
    hit_points: Vec<i32>,
    width: i32,
    height: i32,
}

impl WallHitPoints {
    pub fn new(terrain: &TerrainMap) -> Self {
        Self {
            hit_points: vec![MAX_WALL_HIT_POINTS; (terrain.width() * terrain.height()) as usize],
            width: terrain.width(),
            height: terrain.height(),
        }
    }

    /// Subtracts damage and reports whether the cell is now destroyed
    pub fn damage(&mut self, cell: Cell, damage: i32) -> bool {
        if cell.x < 0 || cell.x >= self.width || cell.y < 0 || cell.y >= self.height {
            return false;
        }
        let slot = &mut self.hit_points[(cell.y * self.width + cell.x) as usize];
        *slot -= damage;
        *slot <= 0
    }

    pub fn get(&self, cell: Cell) -> Option<i32> {
        if cell.x < 0 || cell.x >= self.width || cell.y < 0 || cell.y >= self.height {
            return None;
        }
        Some(self.hit_points[(cell.y * self.width + cell.x) as usize])
    }
}

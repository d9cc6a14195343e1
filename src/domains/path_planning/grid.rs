use crate::common::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A cell on the warehouse grid. Serialized as an `[x, y]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(&self, other: &Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn is_adjacent(&self, other: &Coord) -> bool {
        self.manhattan(other) == 1
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Coord> for (i32, i32) {
    fn from(c: Coord) -> Self {
        (c.x, c.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// +y, +x, -y, -x. Search tie-breaking depends on this order.
const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

pub const WAREHOUSE_SIZE: i32 = 9;
/// Racks of the reference warehouse as inclusive `(min_x, max_x, min_y, max_y)`.
pub const WAREHOUSE_RACKS: [(i32, i32, i32, i32); 2] = [(3, 5, 2, 3), (5, 7, 6, 7)];
pub const WAREHOUSE_BOUNDARY: [(i32, i32); 8] =
    [(2, 2), (2, 4), (6, 2), (6, 4), (4, 6), (4, 8), (8, 6), (8, 8)];

/// Cells of an inclusive rectangle, column by column.
pub fn rect_cells(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Vec<Coord> {
    (min_x..=max_x)
        .flat_map(|x| (min_y..=max_y).map(move |y| Coord::new(x, y)))
        .collect()
}

/// Static warehouse map.
///
/// Obstacles are kept as groups so clients can draw them; a cell listed as a
/// boundary point stays traversable even when an obstacle group covers it.
#[derive(Debug, Clone)]
pub struct GridMap {
    size: i32,
    obstacles: Vec<Vec<Coord>>,
    blocked: HashSet<Coord>,
    boundary: HashSet<Coord>,
}

/// Read-only map description handed to clients at bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDescription {
    pub size: i32,
    pub obstacles: Vec<Vec<Coord>>,
    pub boundary_points: Vec<Coord>,
}

impl GridMap {
    pub fn new(size: i32, obstacles: Vec<Vec<Coord>>, boundary: impl IntoIterator<Item = Coord>) -> DomainResult<Self> {
        if size <= 0 {
            return Err(DomainError::InvalidMap {
                reason: format!("Grid size must be positive, got {}", size),
            });
        }
        let blocked = obstacles.iter().flatten().copied().collect();
        Ok(Self {
            size,
            obstacles,
            blocked,
            boundary: boundary.into_iter().collect(),
        })
    }

    /// Empty square grid with no obstacles.
    pub fn open(size: i32) -> DomainResult<Self> {
        Self::new(size, Vec::new(), Vec::new())
    }

    /// The reference 9x9 warehouse: two rectangular racks with their corner
    /// cells left open as boundary points.
    pub fn warehouse() -> Self {
        let obstacles: Vec<Vec<Coord>> = WAREHOUSE_RACKS
            .iter()
            .map(|&(min_x, max_x, min_y, max_y)| rect_cells(min_x, max_x, min_y, max_y))
            .collect();
        Self {
            size: WAREHOUSE_SIZE,
            blocked: obstacles.iter().flatten().copied().collect(),
            obstacles,
            boundary: WAREHOUSE_BOUNDARY.into_iter().map(Coord::from).collect(),
        }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn in_bounds(&self, c: Coord) -> bool {
        (0..self.size).contains(&c.x) && (0..self.size).contains(&c.y)
    }

    pub fn is_boundary(&self, c: Coord) -> bool {
        self.boundary.contains(&c)
    }

    pub fn is_valid(&self, c: Coord) -> bool {
        if !self.in_bounds(c) {
            return false;
        }
        if self.boundary.contains(&c) {
            return true;
        }
        !self.blocked.contains(&c)
    }

    pub fn neighbors(&self, c: Coord) -> Vec<Coord> {
        adjacent_cells(c).filter(|n| self.is_valid(*n)).collect()
    }

    pub fn valid_positions(&self) -> Vec<Coord> {
        (0..self.size)
            .flat_map(|x| (0..self.size).map(move |y| Coord::new(x, y)))
            .filter(|c| self.is_valid(*c))
            .collect()
    }

    pub fn describe(&self) -> MapDescription {
        let mut boundary_points: Vec<Coord> = self.boundary.iter().copied().collect();
        boundary_points.sort();
        MapDescription {
            size: self.size,
            obstacles: self.obstacles.clone(),
            boundary_points,
        }
    }
}

pub(crate) fn adjacent_cells(c: Coord) -> impl Iterator<Item = Coord> {
    DIRECTIONS
        .iter()
        .map(move |(dx, dy)| Coord::new(c.x + dx, c.y + dy))
}

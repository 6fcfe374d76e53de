use serde::{Deserialize, Serialize};
use thicket_core::{ConfigError, GenRng};
use thicket_procgen::TileKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    Empty,
    Straight,
    Turn,
    Intersection,
    TJunction,
    DeadEnd,
}

impl CellType {
    pub fn is_road(self) -> bool {
        self != CellType::Empty
    }

    pub fn tile_kind(self) -> Option<TileKind> {
        match self {
            CellType::Empty => None,
            CellType::Straight => Some(TileKind::Straight),
            CellType::Turn => Some(TileKind::Turn),
            CellType::Intersection => Some(TileKind::Intersection),
            CellType::TJunction => Some(TileKind::TJunction),
            CellType::DeadEnd => Some(TileKind::DeadEnd),
        }
    }
}

/// Grid directions; north is +z, east is +x
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Clockwise seen from above, matching quarter turns of `Quat::from_rotation_y`
    pub const ALL: [Direction; 4] = [Direction::North, Direction::East, Direction::South, Direction::West];

    pub fn offset(self) -> (i64, i64) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    /// Direction after `quarter_turns` 90 degree rotations
    pub fn rotated(self, quarter_turns: u32) -> Direction {
        let index = Self::ALL.iter().position(|d| *d == self).unwrap_or(0);
        Self::ALL[(index + quarter_turns as usize) % 4]
    }
}

/// Which of the four neighbours carry a road
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Connections {
    pub north: bool,
    pub east: bool,
    pub south: bool,
    pub west: bool,
}

impl Connections {
    pub fn has(&self, direction: Direction) -> bool {
        match direction {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }

    pub fn count(&self) -> usize {
        Direction::ALL.iter().filter(|d| self.has(**d)).count()
    }

    /// Cell type implied by this connectivity; `None` for an isolated cell
    pub fn classify(&self) -> Option<CellType> {
        match self.count() {
            1 => Some(CellType::DeadEnd),
            2 if (self.north && self.south) || (self.east && self.west) => Some(CellType::Straight),
            2 => Some(CellType::Turn),
            3 => Some(CellType::TJunction),
            4 => Some(CellType::Intersection),
            _ => None,
        }
    }
}

/// Probabilities steering the secondary streets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarveRules {
    pub secondary_probability: f32,
    pub termination_probability: f32,
}

impl Default for CarveRules {
    fn default() -> Self {
        Self {
            secondary_probability: 0.3,
            termination_probability: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetGrid {
    size: usize,
    cells: Vec<CellType>,
}

impl StreetGrid {
    pub fn new(size: usize) -> Result<Self, ConfigError> {
        if size < 3 {
            return Err(ConfigError::InvalidGrid(size));
        }
        Ok(Self {
            size,
            cells: vec![CellType::Empty; size * size],
        })
    }

    /// Carve main and secondary streets, then classify every road cell
    pub fn carve(size: usize, rules: CarveRules, rng: &mut GenRng) -> Result<Self, ConfigError> {
        let mut grid = Self::new(size)?;
        grid.carve_main_streets(rng);
        grid.carve_secondary_streets(rules, rng);
        grid.reclassify();
        Ok(grid)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, x: usize, z: usize) -> CellType {
        self.cells[z * self.size + x]
    }

    pub fn set(&mut self, x: usize, z: usize, cell: CellType) {
        self.cells[z * self.size + x] = cell;
    }

    /// Cell in `direction` from `(x, z)`, if it is inside the grid
    pub fn neighbor(&self, x: usize, z: usize, direction: Direction) -> Option<(usize, usize)> {
        let (dx, dz) = direction.offset();
        let nx = x as i64 + dx;
        let nz = z as i64 + dz;
        let range = 0..self.size as i64;
        (range.contains(&nx) && range.contains(&nz)).then_some((nx as usize, nz as usize))
    }

    pub fn connections(&self, x: usize, z: usize) -> Connections {
        let road = |d| {
            self.neighbor(x, z, d)
                .is_some_and(|(nx, nz)| self.get(nx, nz).is_road())
        };
        Connections {
            north: road(Direction::North),
            east: road(Direction::East),
            south: road(Direction::South),
            west: road(Direction::West),
        }
    }

    pub fn is_adjacent_to_road(&self, x: usize, z: usize) -> bool {
        self.connections(x, z).count() > 0
    }

    /// `(x, z, cell)` in x-major order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, CellType)> + '_ {
        (0..self.size).flat_map(move |x| (0..self.size).map(move |z| (x, z, self.get(x, z))))
    }

    pub fn road_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_road()).count()
    }

    fn carve_main_streets(&mut self, rng: &mut GenRng) {
        let last = self.size as i32 - 1;

        let main_z = rng.range_i32(1, last) as usize;
        for x in 0..self.size {
            self.set(x, main_z, CellType::Straight);
        }

        let main_x = rng.range_i32(1, last) as usize;
        for z in 0..self.size {
            let cell = if self.get(main_x, z) == CellType::Straight {
                CellType::Intersection
            } else {
                CellType::Straight
            };
            self.set(main_x, z, cell);
        }
    }

    fn carve_secondary_streets(&mut self, rules: CarveRules, rng: &mut GenRng) {
        for x in 0..self.size {
            for z in 0..self.size {
                if self.get(x, z) == CellType::Empty && rng.chance(rules.secondary_probability) {
                    self.set(x, z, CellType::Straight);
                    self.extend_street(x, z, rules, rng);
                }
            }
        }
    }

    fn extend_street(&mut self, x: usize, z: usize, rules: CarveRules, rng: &mut GenRng) {
        let direction = Direction::ALL[rng.range_i32(0, 4) as usize];
        let (mut x, mut z) = (x, z);

        while let Some((nx, nz)) = self.neighbor(x, z, direction) {
            if self.get(nx, nz) != CellType::Empty {
                break;
            }
            self.set(nx, nz, CellType::Straight);
            (x, z) = (nx, nz);
            if rng.chance(rules.termination_probability) {
                break;
            }
        }
    }

    /// Derive every road cell's type from its neighbours.
    /// Isolated road cells keep the type they were carved with.
    pub fn reclassify(&mut self) {
        let updates: Vec<(usize, usize, CellType)> = self
            .cells()
            .filter(|(_, _, cell)| cell.is_road())
            .filter_map(|(x, z, _)| self.connections(x, z).classify().map(|cell| (x, z, cell)))
            .collect();

        for (x, z, cell) in updates {
            self.set(x, z, cell);
        }
    }

    /// Quarter turns that bring the canonical tile onto this cell's connectivity
    pub fn quarter_turns(&self, x: usize, z: usize) -> u32 {
        let c = self.connections(x, z);
        match self.get(x, z) {
            CellType::Straight => u32::from(c.north || c.south),
            CellType::Turn => match (c.north, c.east, c.south, c.west) {
                (true, true, _, _) => 0,
                (_, true, true, _) => 1,
                (_, _, true, true) => 2,
                _ => 3,
            },
            CellType::TJunction => {
                if !c.south {
                    0
                } else if !c.west {
                    1
                } else if !c.north {
                    2
                } else {
                    3
                }
            }
            CellType::DeadEnd => {
                if c.west {
                    0
                } else if c.north {
                    1
                } else if c.east {
                    2
                } else {
                    3
                }
            }
            CellType::Intersection | CellType::Empty => 0,
        }
    }
}

/// Arms of a tile kind in its canonical orientation
pub fn canonical_arms(kind: TileKind) -> &'static [Direction] {
    match kind {
        TileKind::Straight => &[Direction::East, Direction::West],
        TileKind::Turn => &[Direction::North, Direction::East],
        TileKind::Intersection => &Direction::ALL,
        TileKind::TJunction => &[Direction::North, Direction::East, Direction::West],
        TileKind::DeadEnd => &[Direction::West],
    }
}

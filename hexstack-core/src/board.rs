//! Board geometry: 45 cells on 7 offset rows
//!
//! Rows alternate 6 and 7 cells wide. An even row sits half a cell to the
//! right of the odd rows around it, so a cell at `(row, col)` on an even
//! row touches columns `col` and `col + 1` on the rows above and below,
//! while a cell on an odd row touches `col - 1` and `col`.

use serde::{Deserialize, Serialize};

use crate::{Result, TableError};

/// Number of rows
pub const NUM_ROWS: usize = 7;

/// Number of cells
pub const NUM_CELLS: usize = 45;

/// Cell count of each row
pub const ROW_WIDTHS: [usize; NUM_ROWS] = [6, 7, 6, 7, 6, 7, 6];

/// Linear cell index (0..45)
pub type Cell = usize;

/// Width of a row, 0 for rows off the board
pub fn row_width(row: usize) -> usize {
    ROW_WIDTHS.get(row).copied().unwrap_or(0)
}

/// Row/column coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coords {
    pub row: usize,
    pub col: usize,
}

impl Coords {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Check if these coordinates are on the board
    pub fn is_valid(&self) -> bool {
        self.col < row_width(self.row)
    }

    /// Linear index of these coordinates
    pub fn index(&self) -> Result<Cell> {
        if !self.is_valid() {
            return Err(TableError::OutOfBounds { row: self.row, col: self.col });
        }
        let index = if self.row % 2 == 0 {
            13 * self.row / 2 + self.col
        } else {
            6 + 13 * (self.row - 1) / 2 + self.col
        };
        Ok(index)
    }

    /// Coordinates of a linear index
    pub fn from_index(cell: Cell) -> Result<Self> {
        if cell >= NUM_CELLS {
            return Err(TableError::InvalidLookup(format!("cell {cell} is off the board")));
        }
        let mut row = 2 * (cell / 13);
        let mut col = cell % 13;
        if col > 5 {
            col -= 6;
            row += 1;
        }
        Ok(Self { row, col })
    }

    /// Neighbouring coordinates in a direction, if on the board
    pub fn step(&self, direction: Direction) -> Option<Coords> {
        let (dr, dc) = direction.delta(self.row);
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        let next = Coords::new(row, col);
        next.is_valid().then_some(next)
    }
}

/// Index of `(row, col)`
pub fn cell_index(row: usize, col: usize) -> Result<Cell> {
    Coords::new(row, col).index()
}

/// Row of a cell
pub fn row_of(cell: Cell) -> Result<usize> {
    Coords::from_index(cell).map(|c| c.row)
}

/// The six hex directions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    West,
    East,
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

/// All directions, in axis pairs
pub const DIRECTIONS: [Direction; 6] = [
    Direction::West,
    Direction::East,
    Direction::NorthWest,
    Direction::SouthEast,
    Direction::NorthEast,
    Direction::SouthWest,
];

impl Direction {
    /// (row delta, col delta) from a cell on `row`
    pub fn delta(self, row: usize) -> (isize, isize) {
        let odd = (row % 2) as isize;
        match self {
            Direction::West => (0, -1),
            Direction::East => (0, 1),
            Direction::NorthWest => (-1, -odd),
            Direction::NorthEast => (-1, 1 - odd),
            Direction::SouthWest => (1, -odd),
            Direction::SouthEast => (1, 1 - odd),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::West => Direction::East,
            Direction::East => Direction::West,
            Direction::NorthWest => Direction::SouthEast,
            Direction::SouthEast => Direction::NorthWest,
            Direction::NorthEast => Direction::SouthWest,
            Direction::SouthWest => Direction::NorthEast,
        }
    }

    /// Axis shared with the opposite direction (0 = row, 1 and 2 = diagonals)
    pub fn axis(self) -> usize {
        match self {
            Direction::West | Direction::East => 0,
            Direction::NorthWest | Direction::SouthEast => 1,
            Direction::NorthEast | Direction::SouthWest => 2,
        }
    }
}

/// Neighbour distance: one step or a straight two-cell jump
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Radius {
    Step = 1,
    Jump = 2,
}

impl Radius {
    pub const ALL: [Radius; 2] = [Radius::Step, Radius::Jump];

    pub fn steps(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Radius {
    type Error = TableError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Radius::Step),
            2 => Ok(Radius::Jump),
            _ => Err(TableError::InvalidLookup(format!("radius must be 1 or 2, got {value}"))),
        }
    }
}

/// Cell in `direction` reached by walking `radius` steps, if on the board
pub fn walk(from: Coords, direction: Direction, radius: Radius) -> Option<Coords> {
    (0..radius.steps()).try_fold(from, |at, _| at.step(direction))
}

/// Sorted neighbour cells of `coords` at `radius`
fn compute_neighbours(coords: Coords, radius: Radius) -> Result<Vec<Cell>> {
    let mut cells = Vec::with_capacity(6);
    for direction in DIRECTIONS {
        if let Some(target) = walk(coords, direction, radius) {
            cells.push(target.index()?);
        }
    }
    cells.sort_unstable();
    Ok(cells)
}

/// Row membership and neighbour lists for every cell, built once
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    rows: Vec<usize>,
    step: Vec<Vec<Cell>>,
    jump: Vec<Vec<Cell>>,
}

impl Topology {
    pub fn new() -> Result<Self> {
        let mut rows = Vec::with_capacity(NUM_CELLS);
        let mut step = Vec::with_capacity(NUM_CELLS);
        let mut jump = Vec::with_capacity(NUM_CELLS);

        for cell in 0..NUM_CELLS {
            let coords = Coords::from_index(cell)?;
            rows.push(coords.row);
            step.push(compute_neighbours(coords, Radius::Step)?);
            jump.push(compute_neighbours(coords, Radius::Jump)?);
        }

        tracing::debug!(
            "Built topology: {} cells, {} step links, {} jump links",
            NUM_CELLS,
            step.iter().map(Vec::len).sum::<usize>(),
            jump.iter().map(Vec::len).sum::<usize>()
        );
        Ok(Self { rows, step, jump })
    }

    pub fn row_of(&self, cell: Cell) -> Result<usize> {
        self.rows
            .get(cell)
            .copied()
            .ok_or_else(|| TableError::InvalidLookup(format!("cell {cell} is off the board")))
    }

    pub fn neighbours(&self, cell: Cell, radius: Radius) -> Result<&[Cell]> {
        let lists = match radius {
            Radius::Step => &self.step,
            Radius::Jump => &self.jump,
        };
        lists
            .get(cell)
            .map(Vec::as_slice)
            .ok_or_else(|| TableError::InvalidLookup(format!("cell {cell} is off the board")))
    }

    /// All neighbour lists at `radius`, indexed by cell
    pub fn all_neighbours(&self, radius: Radius) -> &[Vec<Cell>] {
        match radius {
            Radius::Step => &self.step,
            Radius::Jump => &self.jump,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_index() {
        assert_eq!(cell_index(0, 0).unwrap(), 0);
        assert_eq!(cell_index(0, 5).unwrap(), 5);
        assert_eq!(cell_index(1, 0).unwrap(), 6);
        assert_eq!(cell_index(1, 6).unwrap(), 12);
        assert_eq!(cell_index(2, 0).unwrap(), 13);
        assert_eq!(cell_index(3, 0).unwrap(), 19);
        assert_eq!(cell_index(6, 5).unwrap(), 44);

        assert_eq!(cell_index(0, 6), Err(TableError::OutOfBounds { row: 0, col: 6 }));
        assert!(cell_index(1, 7).is_err());
        assert!(cell_index(7, 0).is_err());
    }

    #[test]
    fn test_indices_partition_board() {
        assert_eq!(ROW_WIDTHS.iter().sum::<usize>(), NUM_CELLS);

        let mut seen = [false; NUM_CELLS];
        for (row, &width) in ROW_WIDTHS.iter().enumerate() {
            for col in 0..width {
                let cell = cell_index(row, col).unwrap();
                assert!(!seen[cell], "cell {cell} produced twice");
                seen[cell] = true;
                assert_eq!(Coords::from_index(cell).unwrap(), Coords::new(row, col));
                assert_eq!(row_of(cell).unwrap(), row);
            }
        }
        assert!(seen.iter().all(|&s| s));
        assert!(Coords::from_index(45).is_err());
    }

    #[test]
    fn test_step_neighbours() {
        let topo = Topology::new().unwrap();
        assert_eq!(topo.neighbours(0, Radius::Step).unwrap(), &[1, 6, 7]);
        assert_eq!(topo.neighbours(6, Radius::Step).unwrap(), &[0, 7, 13]);
        assert_eq!(topo.neighbours(22, Radius::Step).unwrap(), &[15, 16, 21, 23, 28, 29]);
        assert_eq!(topo.neighbours(44, Radius::Step).unwrap(), &[37, 38, 43]);
    }

    #[test]
    fn test_jump_neighbours() {
        let topo = Topology::new().unwrap();
        assert_eq!(topo.neighbours(0, Radius::Jump).unwrap(), &[2, 14]);
        assert_eq!(topo.neighbours(22, Radius::Jump).unwrap(), &[8, 10, 20, 24, 34, 36]);
        // Jumping from the second column of an odd row reaches column 0 two rows away
        assert!(topo.neighbours(20, Radius::Jump).unwrap().contains(&6));
        assert!(topo.neighbours(6, Radius::Jump).unwrap().contains(&20));
    }

    #[test]
    fn test_neighbours_symmetric() {
        let topo = Topology::new().unwrap();
        for radius in Radius::ALL {
            for a in 0..NUM_CELLS {
                for &b in topo.neighbours(a, radius).unwrap() {
                    assert!(
                        topo.neighbours(b, radius).unwrap().contains(&a),
                        "{a} -> {b} at {radius:?} is one-way"
                    );
                }
            }
        }
    }

    #[test]
    fn test_neighbour_counts() {
        let topo = Topology::new().unwrap();
        for cell in 0..NUM_CELLS {
            let coords = Coords::from_index(cell).unwrap();
            let step = topo.neighbours(cell, Radius::Step).unwrap();
            assert!((2..=6).contains(&step.len()), "cell {cell}: {step:?}");
            assert!(step.windows(2).all(|w| w[0] < w[1]));

            // Each axis contributes one or two step neighbours
            for axis in 0..3 {
                let count = DIRECTIONS
                    .iter()
                    .filter(|d| d.axis() == axis && coords.step(**d).is_some())
                    .count();
                assert!((1..=2).contains(&count), "cell {cell} axis {axis}");
            }

            let jump = topo.neighbours(cell, Radius::Jump).unwrap();
            assert!((1..=6).contains(&jump.len()), "cell {cell}: {jump:?}");
        }

        for corner in [0, 5, 39, 44] {
            assert!(topo.neighbours(corner, Radius::Step).unwrap().len() < 6);
        }
    }

    #[test]
    fn test_lookup_errors() {
        let topo = Topology::new().unwrap();
        assert!(matches!(topo.row_of(45), Err(TableError::InvalidLookup(_))));
        assert!(topo.neighbours(45, Radius::Jump).is_err());
        assert!(Radius::try_from(3).is_err());
        assert_eq!(Radius::try_from(2).unwrap(), Radius::Jump);
    }

    #[test]
    fn test_direction_opposites() {
        for d in DIRECTIONS {
            assert_eq!(d.opposite().opposite(), d);
            assert_eq!(d.opposite().axis(), d.axis());
        }
    }
}

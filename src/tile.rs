use std::fmt;

use image::RgbaImage;

/// A (row, col) coordinate on an N x N board.
///
/// A tile's current slot is its index in the board sequence; `Position`
/// converts between the two views with the board dimension in hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn index(self, size: usize) -> usize {
        self.row * size + self.col
    }

    pub fn from_index(index: usize, size: usize) -> Self {
        Self {
            row: index / size,
            col: index % size,
        }
    }

    /// True iff `other` shares an edge with `self`: exactly one axis differs,
    /// and by exactly 1. Diagonals and wraparound at the edges do not count.
    pub fn is_adjacent(self, other: Self) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// An image fragment plus the position it belongs to when the puzzle is
/// solved. The home position is fixed at build time; where the tile currently
/// sits is tracked by the board, not the tile.
#[derive(Clone)]
pub struct Tile {
    image: RgbaImage,
    home: Position,
}

impl Tile {
    pub fn new(image: RgbaImage, home: Position) -> Self {
        Self { image, home }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn home(&self) -> Position {
        self.home
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.image.dimensions();
        f.debug_struct("Tile")
            .field("home", &self.home)
            .field("px", &format_args!("{}x{}", w, h))
            .finish()
    }
}

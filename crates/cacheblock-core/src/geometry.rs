//! Coordinates and rectangular footprints
//!
//! Footprints use signed inclusive bounds because a window built around a
//! seed near the matrix edge can extend past row or column zero before it is
//! clipped back inside the matrix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A matrix coordinate, ordered row-major
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Chebyshev (maximum-norm) distance
    pub fn chebyshev(&self, other: &Coord) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Coord {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// Inclusive rectangle `[row_start, row_end] x [col_start, col_end]`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Footprint {
    pub row_start: i64,
    pub row_end: i64,
    pub col_start: i64,
    pub col_end: i64,
}

impl Footprint {
    pub fn new(row_start: i64, row_end: i64, col_start: i64, col_end: i64) -> Self {
        debug_assert!(row_start <= row_end && col_start <= col_end);
        Self {
            row_start,
            row_end,
            col_start,
            col_end,
        }
    }

    /// Square box of side `2 * radius + 1` centered on `center`
    pub fn centered(center: Coord, radius: usize) -> Self {
        let (r, c, k) = (center.row as i64, center.col as i64, radius as i64);
        Self::new(r - k, r + k, c - k, c + k)
    }

    /// Square footprint of side `edge` anchored at `origin`
    pub fn square(origin: Coord, edge: usize) -> Self {
        let (r, c, e) = (origin.row as i64, origin.col as i64, edge as i64);
        Self::new(r, r + e - 1, c, c + e - 1)
    }

    pub fn height(&self) -> usize {
        (self.row_end - self.row_start + 1) as usize
    }

    pub fn width(&self) -> usize {
        (self.col_end - self.col_start + 1) as usize
    }

    pub fn area(&self) -> usize {
        self.height() * self.width()
    }

    pub fn is_square(&self) -> bool {
        self.height() == self.width()
    }

    /// Whether the cell lies inside this footprint
    pub fn contains(&self, row: i64, col: i64) -> bool {
        (self.row_start..=self.row_end).contains(&row)
            && (self.col_start..=self.col_end).contains(&col)
    }

    pub fn contains_coord(&self, coord: Coord) -> bool {
        self.contains(coord.row as i64, coord.col as i64)
    }

    /// Whether the footprint lies within `[0, rows) x [0, cols)`
    pub fn within(&self, rows: usize, cols: usize) -> bool {
        self.row_start >= 0
            && self.col_start >= 0
            && self.row_end < rows as i64
            && self.col_end < cols as i64
    }

    /// Top-left corner; only meaningful once the footprint is inside the matrix
    pub fn origin(&self) -> Coord {
        debug_assert!(self.row_start >= 0 && self.col_start >= 0);
        Coord::new(self.row_start as usize, self.col_start as usize)
    }

    /// Cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        (self.row_start..=self.row_end)
            .flat_map(move |r| (self.col_start..=self.col_end).map(move |c| (r, c)))
    }

    /// Grow the shorter axis (centered on the original span) until square
    pub fn squared(&self) -> Self {
        let edge = self.height().max(self.width()) as i64;
        let grow = |start: i64, end: i64| {
            let missing = edge - (end - start + 1);
            let before = missing / 2;
            (start - before, end + (missing - before))
        };
        let (row_start, row_end) = grow(self.row_start, self.row_end);
        let (col_start, col_end) = grow(self.col_start, self.col_end);
        Self::new(row_start, row_end, col_start, col_end)
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..={}]x[{}..={}]",
            self.row_start, self.row_end, self.col_start, self.col_end
        )
    }
}

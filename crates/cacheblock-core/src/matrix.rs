//! Coordinate-form input matrix and the lookup state used during blocking
//!
//! `CooMatrix` is the immutable input. `LocationIndex` and `BlockedSet` are
//! the two pieces of state the blocker owns for the duration of one run; the
//! `Availability` trait is the read-only view the sampler and the block
//! builder get of them.

use crate::error::{Error, Result};
use crate::geometry::Coord;
use std::collections::{HashMap, HashSet};

/// One stored entry of a COO matrix
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CooEntry {
    pub row: usize,
    pub col: usize,
    pub value: f64,
}

impl CooEntry {
    pub fn new(row: usize, col: usize, value: f64) -> Self {
        Self { row, col, value }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.row, self.col)
    }
}

/// Sparse matrix in coordinate form
///
/// Entries keep their input order: the blocker visits them in exactly this
/// order, so it is part of the observable behavior of a run.
///
/// # Examples
///
/// ```
/// use cacheblock_core::CooMatrix;
///
/// let m = CooMatrix::from_triplets(3, 3, &[(0, 0, 1.0), (2, 1, 4.0)]).unwrap();
/// assert_eq!(m.nnz(), 2);
/// assert_eq!(m.row_sums(), vec![1.0, 0.0, 4.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CooMatrix {
    rows: usize,
    cols: usize,
    entries: Vec<CooEntry>,
}

impl CooMatrix {
    /// Create a matrix, rejecting out-of-bounds and duplicate coordinates
    pub fn new(rows: usize, cols: usize, entries: Vec<CooEntry>) -> Result<Self> {
        // Footprints use signed coordinates
        if i64::try_from(rows).is_err() || i64::try_from(cols).is_err() {
            return Err(Error::InvalidInput(format!(
                "Matrix dimensions {rows}x{cols} exceed the addressable range"
            )));
        }
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if entry.row >= rows || entry.col >= cols {
                return Err(Error::out_of_bounds(entry.row, entry.col, rows, cols));
            }
            if !seen.insert(entry.coord()) {
                return Err(Error::DuplicateEntry {
                    row: entry.row,
                    col: entry.col,
                });
            }
        }
        Ok(Self {
            rows,
            cols,
            entries,
        })
    }

    /// Convenience constructor from `(row, col, value)` triplets
    pub fn from_triplets(rows: usize, cols: usize, triplets: &[(usize, usize, f64)]) -> Result<Self> {
        let entries = triplets
            .iter()
            .map(|&(row, col, value)| CooEntry::new(row, col, value))
            .collect();
        Self::new(rows, cols, entries)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CooEntry] {
        &self.entries
    }

    /// Row sums, i.e. the product with an all-ones vector
    pub fn row_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.rows];
        for entry in &self.entries {
            sums[entry.row] += entry.value;
        }
        sums
    }

    /// Build the read-only coordinate lookup
    pub fn location_index(&self) -> LocationIndex {
        LocationIndex {
            values: self
                .entries
                .iter()
                .map(|entry| (entry.coord(), entry.value))
                .collect(),
        }
    }
}

/// Mapping from coordinate to stored value
#[derive(Clone, Debug, Default)]
pub struct LocationIndex {
    values: HashMap<Coord, f64>,
}

impl LocationIndex {
    pub fn get(&self, coord: Coord) -> Option<f64> {
        self.values.get(&coord).copied()
    }

    /// Lookup with signed coordinates; anything negative is outside the matrix
    pub fn get_signed(&self, row: i64, col: i64) -> Option<f64> {
        if row < 0 || col < 0 {
            return None;
        }
        self.get(Coord::new(row as usize, col as usize))
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.values.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Coordinates already covered by a tile; only ever grows
#[derive(Clone, Debug, Default)]
pub struct BlockedSet {
    cells: HashSet<Coord>,
}

impl BlockedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a coordinate; returns false if it was already blocked
    pub fn insert(&mut self, coord: Coord) -> bool {
        self.cells.insert(coord)
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains(&coord)
    }

    pub fn contains_signed(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && self.contains(Coord::new(row as usize, col as usize))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Whether a cell holds a nonzero that no tile has claimed yet
pub trait Availability {
    fn is_available(&self, row: i64, col: i64) -> bool;

    /// Whether a cell has already been claimed by a tile
    fn is_blocked(&self, row: i64, col: i64) -> bool;
}

/// Borrowed view over the blocker's index and blocked set
#[derive(Clone, Copy)]
pub struct Occupancy<'a> {
    index: &'a LocationIndex,
    blocked: &'a BlockedSet,
}

impl<'a> Occupancy<'a> {
    pub fn new(index: &'a LocationIndex, blocked: &'a BlockedSet) -> Self {
        Self { index, blocked }
    }
}

impl Availability for Occupancy<'_> {
    fn is_available(&self, row: i64, col: i64) -> bool {
        self.index.get_signed(row, col).is_some() && !self.blocked.contains_signed(row, col)
    }

    fn is_blocked(&self, row: i64, col: i64) -> bool {
        self.blocked.contains_signed(row, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_bounds() {
        let err = CooMatrix::from_triplets(2, 2, &[(0, 0, 1.0), (2, 0, 1.0)]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_dimensions_beyond_signed_range() {
        let err = CooMatrix::from_triplets(usize::MAX, 2, &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(CooMatrix::from_triplets(i64::MAX as usize, 2, &[]).is_ok());
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = CooMatrix::from_triplets(4, 4, &[(1, 1, 1.0), (1, 1, 2.0)]).unwrap_err();
        assert!(matches!(err, Error::DuplicateEntry { row: 1, col: 1 }));
    }

    #[test]
    fn test_entries_keep_input_order() {
        let m = CooMatrix::from_triplets(5, 5, &[(4, 4, 1.0), (0, 0, 2.0), (2, 3, 3.0)]).unwrap();
        let coords: Vec<_> = m.entries().iter().map(|e| e.coord()).collect();
        assert_eq!(
            coords,
            vec![Coord::new(4, 4), Coord::new(0, 0), Coord::new(2, 3)]
        );
    }

    #[test]
    fn test_row_sums() {
        let m = CooMatrix::from_triplets(3, 4, &[(0, 0, 1.5), (0, 3, 2.0), (2, 1, -1.0)]).unwrap();
        assert_eq!(m.row_sums(), vec![3.5, 0.0, -1.0]);
    }

    #[test]
    fn test_occupancy_tracks_blocked_cells() {
        let m = CooMatrix::from_triplets(3, 3, &[(0, 0, 1.0), (1, 1, 2.0)]).unwrap();
        let index = m.location_index();
        let mut blocked = BlockedSet::new();

        {
            let view = Occupancy::new(&index, &blocked);
            assert!(view.is_available(0, 0));
            assert!(!view.is_available(0, 1));
            assert!(!view.is_available(-1, 0));
        }

        assert!(blocked.insert(Coord::new(0, 0)));
        assert!(!blocked.insert(Coord::new(0, 0)));

        let view = Occupancy::new(&index, &blocked);
        assert!(!view.is_available(0, 0));
        assert!(view.is_blocked(0, 0));
        assert!(view.is_available(1, 1));
    }
}

//! Dense square tiles
//!
//! A tile is a small dense sub-array cut out of the sparse matrix. Only edges
//! 1 through 4 can be serialized, so `TileEdge` is checked when a tile is
//! built rather than when it is written.

use crate::error::{Error, Result};
use crate::geometry::{Coord, Footprint};
use crate::matrix::LocationIndex;

/// Largest tile edge the serialized layout supports
pub const MAX_TILE_EDGE: usize = 4;

/// Side length of a square tile, guaranteed to be in `1..=MAX_TILE_EDGE`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileEdge(u8);

impl TileEdge {
    /// Validate an edge for a tile anchored at `origin`
    pub fn new(edge: usize, origin: Coord) -> Result<Self> {
        if (1..=MAX_TILE_EDGE).contains(&edge) {
            Ok(Self(edge as u8))
        } else {
            Err(Error::ShapeOutOfDomain {
                edge,
                row: origin.row,
                col: origin.col,
                max: MAX_TILE_EDGE,
            })
        }
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }

    /// Number of value slots stored for this edge
    pub fn area(self) -> usize {
        self.get() * self.get()
    }

    /// Serialized cost in elements: fixed overhead plus the dense payload
    pub fn cost(self, overhead: usize) -> usize {
        overhead + self.area()
    }
}

/// A dense square tile with a row-major, zero-filled value buffer
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    origin: Coord,
    edge: TileEdge,
    values: Vec<f64>,
}

impl Tile {
    /// Create a tile from an explicit value buffer
    pub fn new(origin: Coord, edge: TileEdge, values: Vec<f64>) -> Result<Self> {
        if values.len() != edge.area() {
            return Err(Error::InvalidInput(format!(
                "Tile at {origin} with edge {} needs {} values, got {}",
                edge.get(),
                edge.area(),
                values.len()
            )));
        }
        Ok(Self {
            origin,
            edge,
            values,
        })
    }

    /// Read every cell of the footprint from the index, zero-filling gaps
    pub fn materialize(origin: Coord, edge: TileEdge, index: &LocationIndex) -> Self {
        let footprint = Footprint::square(origin, edge.get());
        let values = footprint
            .cells()
            .map(|(r, c)| index.get_signed(r, c).unwrap_or(0.0))
            .collect();
        Self {
            origin,
            edge,
            values,
        }
    }

    pub fn origin(&self) -> Coord {
        self.origin
    }

    pub fn edge(&self) -> TileEdge {
        self.edge
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::square(self.origin, self.edge.get())
    }

    /// Value at a global coordinate, if it falls inside this tile
    pub fn get(&self, coord: Coord) -> Option<f64> {
        if !self.footprint().contains_coord(coord) {
            return None;
        }
        let local_row = coord.row - self.origin.row;
        let local_col = coord.col - self.origin.col;
        Some(self.values[local_row * self.edge.get() + local_col])
    }

    /// Number of stored values that are nonzero
    pub fn nnz(&self) -> usize {
        self.values.iter().filter(|v| **v != 0.0).count()
    }

    pub fn cost(&self, overhead: usize) -> usize {
        self.edge.cost(overhead)
    }
}

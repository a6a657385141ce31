//! Parsing layout documents back into memory
//!
//! Used to validate written artifacts and by the `inspect` command. Parsing
//! checks the structural rules a consumer kernel relies on: supported tile
//! edges, tiles inside the matrix, value counts matching the edge, and
//! superblock costs matching their tiles.

use crate::writer::LayoutStats;
use cacheblock_core::{Coord, Error, Footprint, Result, TileEdge};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// One tile as stored in a document
#[derive(Clone, Debug, PartialEq)]
pub struct TileRecord {
    pub origin: Coord,
    pub edge: TileEdge,
    pub values: Vec<f64>,
}

impl TileRecord {
    pub fn footprint(&self) -> Footprint {
        Footprint::square(self.origin, self.edge.get())
    }
}

/// One superblock as stored in a document
#[derive(Clone, Debug, PartialEq)]
pub struct SuperblockRecord {
    pub cost: usize,
    pub tiles: Vec<TileRecord>,
}

/// Summary of one superblock, independent of tile order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SuperblockSummary {
    pub cost: usize,
    pub tile_count: usize,
}

/// A parsed layout document
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutDocument {
    pub rows: usize,
    pub cols: usize,
    pub superblocks: Vec<SuperblockRecord>,
}

impl LayoutDocument {
    /// Parse and validate a document; `tile_overhead` is the per-tile cost
    /// constant the writer used
    pub fn parse(text: &str, tile_overhead: usize) -> Result<Self> {
        let mut tokens = Tokens::new(text);

        let rows: usize = tokens.next_value("row count")?;
        let cols: usize = tokens.next_value("column count")?;
        let count: usize = tokens.next_value("superblock count")?;
        if i64::try_from(rows).is_err() || i64::try_from(cols).is_err() {
            return Err(Error::parse(1, format!("matrix dimensions {rows}x{cols} are too large")));
        }

        // Counts come from the file, so nothing is preallocated from them
        let mut superblocks = Vec::new();
        for _ in 0..count {
            let cost: usize = tokens.next_value("superblock cost")?;
            let cost_line = tokens.line;
            let tile_count: usize = tokens.next_value("tile count")?;

            let mut tiles = Vec::new();
            let mut expected_cost = 0;
            for _ in 0..tile_count {
                let edge: usize = tokens.next_value("tile edge")?;
                let edge_line = tokens.line;
                let row: usize = tokens.next_value("tile row")?;
                let col: usize = tokens.next_value("tile column")?;
                let origin = Coord::new(row, col);
                let edge = TileEdge::new(edge, origin)?;

                let fits = |start: usize, limit: usize| {
                    start.checked_add(edge.get()).is_some_and(|end| end <= limit)
                };
                if !fits(row, rows) || !fits(col, cols) {
                    return Err(Error::parse(
                        edge_line,
                        format!(
                            "tile of edge {} at {origin} lies outside a {rows}x{cols} matrix",
                            edge.get()
                        ),
                    ));
                }

                let values = (0..edge.area())
                    .map(|_| tokens.next_value::<f64>("tile value"))
                    .collect::<Result<Vec<_>>>()?;
                expected_cost += edge.cost(tile_overhead);
                tiles.push(TileRecord {
                    origin,
                    edge,
                    values,
                });
            }

            if cost != expected_cost {
                return Err(Error::parse(
                    cost_line,
                    format!("superblock cost {cost} does not match its tiles ({expected_cost})"),
                ));
            }
            superblocks.push(SuperblockRecord { cost, tiles });
        }

        if let Some((line, token)) = tokens.next_raw() {
            return Err(Error::parse(line, format!("unexpected trailing token '{token}'")));
        }

        Ok(Self {
            rows,
            cols,
            superblocks,
        })
    }

    /// Read and parse a document from disk
    pub fn read_file<P: AsRef<Path>>(path: P, tile_overhead: usize) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::parse(&text, tile_overhead)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &TileRecord> {
        self.superblocks.iter().flat_map(|s| s.tiles.iter())
    }

    /// Tiles keyed by origin, for order-independent comparison
    pub fn tile_map(&self) -> BTreeMap<Coord, &TileRecord> {
        self.tiles().map(|t| (t.origin, t)).collect()
    }

    /// Per-superblock cost and count, sorted
    pub fn summaries(&self) -> Vec<SuperblockSummary> {
        let mut summaries: Vec<_> = self
            .superblocks
            .iter()
            .map(|s| SuperblockSummary {
                cost: s.cost,
                tile_count: s.tiles.len(),
            })
            .collect();
        summaries.sort_by_key(|s| (s.cost, s.tile_count));
        summaries
    }

    pub fn stats(&self) -> LayoutStats {
        let mut stats = LayoutStats::default();
        for tile in self.tiles() {
            stats.tile_count += 1;
            stats.value_slots += tile.values.len();
            stats.stored_nonzeros += tile.values.iter().filter(|&&v| v != 0.0).count();
        }
        stats
    }

    /// Check that no two tiles cover the same cell
    pub fn check_disjoint(&self) -> Result<()> {
        let mut owner: BTreeMap<(i64, i64), Coord> = BTreeMap::new();
        for tile in self.tiles() {
            for cell in tile.footprint().cells() {
                if let Some(previous) = owner.insert(cell, tile.origin) {
                    return Err(Error::InvalidInput(format!(
                        "cell ({}, {}) covered by tiles at {previous} and {}",
                        cell.0, cell.1, tile.origin
                    )));
                }
            }
        }
        Ok(())
    }

    /// Product with an all-ones vector, i.e. the row sums of the stored tiles
    pub fn row_sums(&self) -> Vec<f64> {
        let mut y = vec![0.0; self.rows];
        for tile in self.tiles() {
            let edge = tile.edge.get();
            for (i, row) in tile.values.chunks(edge).enumerate() {
                y[tile.origin.row + i] += row.iter().sum::<f64>();
            }
        }
        y
    }

    /// Product with `x`, computed tile by tile
    ///
    /// Mirrors what the consumer kernel does with the document, so the result
    /// can be compared against the expected-result vector.
    pub fn multiply(&self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.cols {
            return Err(Error::InvalidInput(format!(
                "vector of length {} for a matrix with {} columns",
                x.len(),
                self.cols
            )));
        }
        let mut y = vec![0.0; self.rows];
        for tile in self.tiles() {
            let edge = tile.edge.get();
            for (i, row) in tile.values.chunks(edge).enumerate() {
                let xs = &x[tile.origin.col..tile.origin.col + edge];
                y[tile.origin.row + i] += row.iter().zip(xs).map(|(a, b)| a * b).sum::<f64>();
            }
        }
        Ok(y)
    }
}

/// Whitespace tokens tagged with their 1-based line
struct Tokens<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    current: std::str::SplitWhitespace<'a>,
    line: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            current: "".split_whitespace(),
            line: 1,
        }
    }

    fn next_raw(&mut self) -> Option<(usize, &'a str)> {
        loop {
            if let Some(token) = self.current.next() {
                return Some((self.line, token));
            }
            let (index, line) = self.lines.next()?;
            self.line = index + 1;
            self.current = line.split_whitespace();
        }
    }

    fn next_value<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let (line, token) = self
            .next_raw()
            .ok_or_else(|| Error::parse(self.line, format!("missing {what}")))?;
        token
            .parse()
            .map_err(|_| Error::parse(line, format!("invalid {what} '{token}'")))
    }
}

//! Cache regions and the finished output of the blocking stage
//!
//! The coordinate space is partitioned into fixed-size regions sized to a
//! page budget. Each tile belongs to the region containing its origin; the
//! region accumulates the serialized cost, the tile count and the origins in
//! the order the tiles were created.

use crate::error::{Error, Result};
use crate::geometry::Coord;
use crate::tile::Tile;
use std::collections::BTreeMap;

/// Index of a cache region, ordered row-major
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionKey {
    pub row: usize,
    pub col: usize,
}

impl RegionKey {
    /// Region containing `origin` for the given region extent
    pub fn containing(origin: Coord, extent: (usize, usize)) -> Self {
        Self {
            row: origin.row / extent.0,
            col: origin.col / extent.1,
        }
    }
}

/// Accumulated tiles of one cache region
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CacheRegion {
    /// Sum of serialized tile costs
    pub cost: usize,
    /// Origins in creation order
    pub origins: Vec<Coord>,
}

impl CacheRegion {
    pub fn tile_count(&self) -> usize {
        self.origins.len()
    }

    fn push(&mut self, origin: Coord, cost: usize) {
        self.cost += cost;
        self.origins.push(origin);
    }
}

/// Summary of a tile table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileStats {
    pub n_tiles: usize,
    /// Total value slots across all tiles
    pub area: usize,
    /// Stored values that are nonzero
    pub nnz: usize,
    pub n_regions: usize,
}

/// Tiles keyed by origin together with their region partition
///
/// Append-only while the blocker runs; read-only afterwards.
#[derive(Clone, Debug)]
pub struct BlockedMatrix {
    rows: usize,
    cols: usize,
    region_extent: (usize, usize),
    tile_overhead: usize,
    tiles: BTreeMap<Coord, Tile>,
    regions: BTreeMap<RegionKey, CacheRegion>,
}

impl BlockedMatrix {
    pub fn new(rows: usize, cols: usize, region_extent: (usize, usize), tile_overhead: usize) -> Self {
        assert!(
            region_extent.0 > 0 && region_extent.1 > 0,
            "Region extent must be positive"
        );
        Self {
            rows,
            cols,
            region_extent,
            tile_overhead,
            tiles: BTreeMap::new(),
            regions: BTreeMap::new(),
        }
    }

    /// Register a tile under its origin and charge it to its region
    pub fn insert(&mut self, tile: Tile) -> Result<RegionKey> {
        let origin = tile.origin();
        if self.tiles.contains_key(&origin) {
            return Err(Error::OriginCollision {
                row: origin.row,
                col: origin.col,
            });
        }
        if !tile.footprint().within(self.rows, self.cols) {
            return Err(Error::InvalidInput(format!(
                "Tile {} lies outside a {}x{} matrix",
                tile.footprint(),
                self.rows,
                self.cols
            )));
        }
        let key = RegionKey::containing(origin, self.region_extent);
        self.regions
            .entry(key)
            .or_default()
            .push(origin, tile.cost(self.tile_overhead));
        self.tiles.insert(origin, tile);
        Ok(key)
    }

    pub fn contains_origin(&self, origin: Coord) -> bool {
        self.tiles.contains_key(&origin)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn region_extent(&self) -> (usize, usize) {
        self.region_extent
    }

    pub fn tile_overhead(&self) -> usize {
        self.tile_overhead
    }

    pub fn tile(&self, origin: Coord) -> Option<&Tile> {
        self.tiles.get(&origin)
    }

    /// Tiles in row-major origin order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn n_tiles(&self) -> usize {
        self.tiles.len()
    }

    /// Regions in row-major region order
    pub fn regions(&self) -> &BTreeMap<RegionKey, CacheRegion> {
        &self.regions
    }

    pub fn tile_stats(&self) -> TileStats {
        TileStats {
            n_tiles: self.tiles.len(),
            area: self.tiles.values().map(|t| t.edge().area()).sum(),
            nnz: self.tiles.values().map(Tile::nnz).sum(),
            n_regions: self.regions.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileEdge;

    fn tile(row: usize, col: usize, edge: usize) -> Tile {
        let origin = Coord::new(row, col);
        let edge = TileEdge::new(edge, origin).unwrap();
        Tile::new(origin, edge, vec![1.0; edge.area()]).unwrap()
    }

    #[test]
    fn test_region_key_integer_division() {
        assert_eq!(
            RegionKey::containing(Coord::new(19, 20), (20, 20)),
            RegionKey { row: 0, col: 1 }
        );
        assert_eq!(
            RegionKey::containing(Coord::new(45, 3), (20, 20)),
            RegionKey { row: 2, col: 0 }
        );
    }

    #[test]
    fn test_insert_accumulates_region() {
        let mut blocked = BlockedMatrix::new(40, 40, (20, 20), 3);
        blocked.insert(tile(0, 0, 2)).unwrap();
        blocked.insert(tile(5, 5, 4)).unwrap();
        blocked.insert(tile(25, 0, 1)).unwrap();

        let first = &blocked.regions()[&RegionKey { row: 0, col: 0 }];
        assert_eq!(first.cost, 7 + 19);
        assert_eq!(first.tile_count(), 2);
        assert_eq!(first.origins, vec![Coord::new(0, 0), Coord::new(5, 5)]);

        let stats = blocked.tile_stats();
        assert_eq!(stats.n_tiles, 3);
        assert_eq!(stats.area, 4 + 16 + 1);
        assert_eq!(stats.nnz, 21);
        assert_eq!(stats.n_regions, 2);
    }

    #[test]
    fn test_insert_rejects_duplicate_origin() {
        let mut blocked = BlockedMatrix::new(10, 10, (20, 20), 3);
        blocked.insert(tile(1, 1, 1)).unwrap();
        let err = blocked.insert(tile(1, 1, 2)).unwrap_err();
        assert!(matches!(err, Error::OriginCollision { row: 1, col: 1 }));
    }

    #[test]
    fn test_insert_rejects_out_of_bounds() {
        let mut blocked = BlockedMatrix::new(4, 4, (20, 20), 3);
        assert!(blocked.insert(tile(3, 3, 2)).is_err());
        assert_eq!(blocked.n_tiles(), 0);
    }
}

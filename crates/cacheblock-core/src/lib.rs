//! Core data model for cache-aware sparse matrix blocking
//!
//! This crate holds the types every stage of the layout pipeline shares:
//!
//! 1. **Input** - `CooMatrix`, plus the `LocationIndex` and `BlockedSet`
//!    state built from it while blocking
//! 2. **Tiles** - dense square `Tile`s keyed by origin, grouped into
//!    `CacheRegion`s inside a `BlockedMatrix`
//! 3. **Configuration and errors** - `LayoutConfig`, `Error`, `Result`
//!
//! # Example
//!
//! ```rust
//! use cacheblock_core::{BlockedMatrix, Coord, CooMatrix, LayoutConfig, Tile, TileEdge};
//!
//! let config = LayoutConfig::default();
//! let matrix = CooMatrix::from_triplets(8, 8, &[(2, 2, 1.0), (2, 3, 2.0)]).unwrap();
//! let index = matrix.location_index();
//!
//! let origin = Coord::new(2, 2);
//! let tile = Tile::materialize(origin, TileEdge::new(2, origin).unwrap(), &index);
//!
//! let mut blocked = BlockedMatrix::new(8, 8, config.region_extent(), config.tile_overhead);
//! blocked.insert(tile).unwrap();
//! assert_eq!(blocked.tile_stats().nnz, 2);
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod matrix;
pub mod region;
pub mod tile;

// Re-export core types
pub use config::{LayoutConfig, VisitOrder, MAX_WINDOW_RADIUS};
pub use error::{Error, Result};
pub use geometry::{Coord, Footprint};
pub use matrix::{Availability, BlockedSet, CooEntry, CooMatrix, LocationIndex, Occupancy};
pub use region::{BlockedMatrix, CacheRegion, RegionKey, TileStats};
pub use tile::{Tile, TileEdge, MAX_TILE_EDGE};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

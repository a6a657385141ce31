//! Adaptive blocking of sparse matrices into dense square tiles
//!
//! Nonzeros are visited one at a time. For each one that no tile has
//! claimed yet, the `BlockBuilder` samples the surrounding window to decide
//! how large a tile to grow, `clip_tile` fits that footprint into the
//! matrix and around existing tiles, and the `MatrixBlocker` materializes
//! the tile and claims every cell it covers.
//!
//! # Example
//!
//! ```rust
//! use cacheblock_blocking::block_matrix;
//! use cacheblock_core::{CooMatrix, LayoutConfig};
//!
//! let matrix = CooMatrix::from_triplets(20, 20, &[(3, 3, 1.0), (3, 4, 1.0), (12, 15, 2.0)]).unwrap();
//! let blocked = block_matrix(&matrix, &LayoutConfig::new().with_seed(7)).unwrap();
//!
//! for tile in blocked.tiles() {
//!     println!("{} edge {}", tile.origin(), tile.edge().get());
//! }
//! ```

pub mod blocker;
pub mod builder;
pub mod clip;

pub use blocker::{block_matrix, BlockingSummary, MatrixBlocker};
pub use builder::{BlockBuilder, FootprintSource, Proposal};
pub use clip::{clip_tile, fit_around_seed};

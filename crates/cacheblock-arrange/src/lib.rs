//! Locality-preserving tile arrangement
//!
//! After blocking, each cache region holds an unordered set of tile origins.
//! This crate turns every region into a `Superblock`: the same tiles in an
//! order where consecutive tiles are, wherever possible, within one cache
//! line of each other.
//!
//! # Example
//!
//! ```rust
//! use cacheblock_arrange::SuperblockArranger;
//! use cacheblock_blocking::block_matrix;
//! use cacheblock_core::{CooMatrix, LayoutConfig};
//!
//! let config = LayoutConfig::new().with_seed(1);
//! let matrix = CooMatrix::from_triplets(30, 30, &[(0, 0, 1.0), (25, 25, 1.0), (2, 3, 1.0)]).unwrap();
//! let blocked = block_matrix(&matrix, &config).unwrap();
//!
//! let superblocks = SuperblockArranger::from_config(&config).arrange_all(&blocked).unwrap();
//! assert_eq!(superblocks.len(), blocked.regions().len());
//! ```

pub mod arranger;
pub mod spatial;
pub mod superblock;

pub use arranger::SuperblockArranger;
pub use spatial::ChebyshevGrid;
pub use superblock::{StepCounts, Superblock};

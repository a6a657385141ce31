//! Serialized cache-blocked layouts and matrix I/O
//!
//! - [`writer`]: the layout document consumed by the multiply kernel
//! - [`document`]: parsing and validating layout documents
//! - [`market`]: Matrix Market coordinate input
//! - [`vectors`]: the all-ones input vector and the expected result
//!
//! # Example
//!
//! ```rust
//! use cacheblock_arrange::SuperblockArranger;
//! use cacheblock_blocking::block_matrix;
//! use cacheblock_core::{CooMatrix, LayoutConfig};
//! use cacheblock_layout::{LayoutDocument, LayoutSerializer};
//!
//! let config = LayoutConfig::new().with_seed(3);
//! let matrix = CooMatrix::from_triplets(6, 6, &[(0, 0, 1.0), (5, 5, 2.0)]).unwrap();
//! let blocked = block_matrix(&matrix, &config).unwrap();
//! let superblocks = SuperblockArranger::from_config(&config).arrange_all(&blocked).unwrap();
//!
//! let mut text = Vec::new();
//! let stats = LayoutSerializer::write(&superblocks, &blocked, &mut text).unwrap();
//! let doc = LayoutDocument::parse(std::str::from_utf8(&text).unwrap(), config.tile_overhead).unwrap();
//! assert_eq!(doc.stats(), stats);
//! ```

pub mod document;
pub mod market;
pub mod vectors;
pub mod writer;

pub use document::{LayoutDocument, SuperblockRecord, SuperblockSummary, TileRecord};
pub use market::{read_matrix_market, read_matrix_market_file};
pub use vectors::{parse_vector, write_expected_result, write_ones_vector};
pub use writer::{LayoutSerializer, LayoutStats};

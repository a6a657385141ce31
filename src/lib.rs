//! Cache-aware sparse matrix blocking and superblock layout
//!
//! Converts a sparse matrix in coordinate form into a layout of small dense
//! tiles, grouped into page-sized cache regions and ordered for locality,
//! ready for a separate SpMV kernel to consume.
//!
//! The work is split across the workspace crates, all re-exported here:
//!
//! - [`cacheblock_core`]: coordinates, tiles, regions, configuration, errors
//! - [`cacheblock_sampling`]: seedable density estimation
//! - [`cacheblock_blocking`]: the adaptive blocker
//! - [`cacheblock_arrange`]: superblock arrangement
//! - [`cacheblock_layout`]: the output document and matrix/vector I/O
//!
//! # Example
//!
//! ```rust
//! use cacheblock::prelude::*;
//!
//! let matrix = CooMatrix::from_triplets(
//!     5,
//!     5,
//!     &[(0, 0, 1.0), (0, 1, 1.0), (1, 0, 1.0), (4, 4, 1.0)],
//! )
//! .unwrap();
//!
//! let pipeline = LayoutPipeline::new(LayoutConfig::new().with_rates(1.0).with_seed(42)).unwrap();
//! let output = pipeline.build(&matrix).unwrap();
//! assert_eq!(output.blocked.tile_stats().nnz, 4);
//! ```

pub mod cli;
pub mod pipeline;

pub use cacheblock_arrange::{StepCounts, Superblock, SuperblockArranger};
pub use cacheblock_blocking::{block_matrix, BlockingSummary, MatrixBlocker};
pub use cacheblock_core::{
    BlockedMatrix, Coord, CooMatrix, Error, LayoutConfig, Result, Tile, VisitOrder,
};
pub use cacheblock_layout::{LayoutDocument, LayoutSerializer, LayoutStats};
pub use cacheblock_sampling::SamplingEngine;
pub use pipeline::{ArtifactPaths, LayoutPipeline, PipelineOutput, RunReport, StageTimings};

/// Commonly used items
pub mod prelude {
    pub use crate::pipeline::{LayoutPipeline, RunReport};
    pub use cacheblock_arrange::SuperblockArranger;
    pub use cacheblock_blocking::{block_matrix, MatrixBlocker};
    pub use cacheblock_core::{BlockedMatrix, Coord, CooMatrix, LayoutConfig, VisitOrder};
    pub use cacheblock_layout::{
        read_matrix_market_file, LayoutDocument, LayoutSerializer, LayoutStats,
    };
}

//! Layout document writer
//!
//! The document is a whitespace-separated token stream:
//!
//! ```text
//! rows cols superblock_count
//! cost tile_count edge row col v v v ... edge row col v ...
//! ```
//!
//! with one line per superblock. Line breaks are cosmetic; readers only
//! rely on token order.

use cacheblock_arrange::Superblock;
use cacheblock_core::{BlockedMatrix, Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, instrument};

/// Totals over everything a layout document stores
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutStats {
    pub tile_count: usize,
    /// Value slots written, zero padding included
    pub value_slots: usize,
    /// Written values that are nonzero
    pub stored_nonzeros: usize,
}

/// Writes arranged superblocks in the layout format
pub struct LayoutSerializer;

impl LayoutSerializer {
    /// Write the document for `superblocks` to `out`
    ///
    /// Every origin in `superblocks` must name a tile in `blocked`.
    #[instrument(skip_all, fields(superblocks = superblocks.len()))]
    pub fn write<W: Write>(
        superblocks: &[Superblock],
        blocked: &BlockedMatrix,
        out: W,
    ) -> Result<LayoutStats> {
        let mut out = BufWriter::new(out);
        let mut stats = LayoutStats::default();

        writeln!(out, "{} {} {}", blocked.rows(), blocked.cols(), superblocks.len())?;
        for superblock in superblocks {
            write!(out, "{} {}", superblock.cost, superblock.tile_count())?;
            for &origin in &superblock.order {
                let tile = blocked.tile(origin).ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "superblock for region ({}, {}) names unknown tile {origin}",
                        superblock.region.row, superblock.region.col
                    ))
                })?;
                write!(out, " {} {} {}", tile.edge().get(), origin.row, origin.col)?;
                for value in tile.values() {
                    write!(out, " {value}")?;
                }
                stats.tile_count += 1;
                stats.value_slots += tile.values().len();
                stats.stored_nonzeros += tile.nnz();
            }
            writeln!(out)?;
        }
        out.flush()?;

        debug!(
            tiles = stats.tile_count,
            slots = stats.value_slots,
            stored = stats.stored_nonzeros,
            "wrote layout"
        );
        Ok(stats)
    }

    /// Write the document to a file, replacing any existing one
    pub fn write_file<P: AsRef<Path>>(
        path: P,
        superblocks: &[Superblock],
        blocked: &BlockedMatrix,
    ) -> Result<LayoutStats> {
        let file = File::create(path.as_ref())?;
        Self::write(superblocks, blocked, file)
    }
}

//! Blocking orchestration
//!
//! `MatrixBlocker` owns all mutable state of one blocking run: the location
//! index, the blocked set, the sampling engine and the growing
//! `BlockedMatrix`. Collaborators only ever see borrowed views of it.

use crate::builder::{BlockBuilder, FootprintSource};
use crate::clip::clip_tile;
use cacheblock_core::{
    BlockedMatrix, BlockedSet, Coord, CooMatrix, Footprint, LayoutConfig, LocationIndex,
    Occupancy, Result, Tile, TileEdge, VisitOrder,
};
use cacheblock_sampling::SamplingEngine;
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, instrument, trace, warn};

/// Counters describing how a blocking run went
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BlockingSummary {
    /// Tiles whose footprint came from a dense quadrant
    pub quadrant_tiles: usize,
    /// Tiles whose footprint came from the immediate-neighbor quorum
    pub ring_tiles: usize,
    /// Tiles whose footprint came from the neighbor bounding box
    pub bounds_tiles: usize,
    /// Quadrant re-samples across all seeds
    pub refinements: usize,
    /// Footprints that had to be moved or shrunk before registration
    pub adjusted: usize,
    /// Nonzeros wrapped in 1x1 tiles after the main pass
    pub swept: usize,
}

impl BlockingSummary {
    pub fn tiles(&self) -> usize {
        self.quadrant_tiles + self.ring_tiles + self.bounds_tiles + self.swept
    }
}

/// Groups the nonzeros of one matrix into dense square tiles
///
/// # Examples
///
/// ```
/// use cacheblock_blocking::MatrixBlocker;
/// use cacheblock_core::{CooMatrix, LayoutConfig};
///
/// let matrix = CooMatrix::from_triplets(5, 5, &[(0, 0, 1.0), (0, 1, 2.0), (1, 0, 3.0), (4, 4, 4.0)]).unwrap();
/// let config = LayoutConfig::new().with_rates(1.0).with_seed(42);
///
/// let blocked = MatrixBlocker::new(&matrix, &config).unwrap().run().unwrap();
/// assert_eq!(blocked.tile_stats().nnz, 4);
/// ```
pub struct MatrixBlocker<'m, R = StdRng> {
    matrix: &'m CooMatrix,
    visit_order: VisitOrder,
    builder: BlockBuilder,
    sampler: SamplingEngine<R>,
    index: LocationIndex,
    blocked: BlockedSet,
    output: BlockedMatrix,
    summary: BlockingSummary,
}

impl<'m> MatrixBlocker<'m, StdRng> {
    /// Blocker whose sampler is seeded from `config.seed`
    pub fn new(matrix: &'m CooMatrix, config: &LayoutConfig) -> Result<Self> {
        Self::with_sampler(matrix, config, SamplingEngine::from_seed_option(config.seed))
    }
}

impl<'m, R: Rng> MatrixBlocker<'m, R> {
    /// Blocker driven by a caller-supplied sampler
    pub fn with_sampler(
        matrix: &'m CooMatrix,
        config: &LayoutConfig,
        sampler: SamplingEngine<R>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            matrix,
            visit_order: config.visit_order,
            builder: BlockBuilder::new(config),
            sampler,
            index: matrix.location_index(),
            blocked: BlockedSet::new(),
            output: BlockedMatrix::new(
                matrix.rows(),
                matrix.cols(),
                config.region_extent(),
                config.tile_overhead,
            ),
            summary: BlockingSummary::default(),
        })
    }

    /// Block every nonzero and hand back the finished tile table
    pub fn run(self) -> Result<BlockedMatrix> {
        self.run_with_summary().map(|(blocked, _)| blocked)
    }

    /// Like [`run`](Self::run), also returning the run's counters
    #[instrument(
        skip(self),
        fields(rows = self.matrix.rows(), cols = self.matrix.cols(), nnz = self.matrix.nnz())
    )]
    pub fn run_with_summary(mut self) -> Result<(BlockedMatrix, BlockingSummary)> {
        let matrix = self.matrix;
        let mut seeds: Vec<Coord> = matrix.entries().iter().map(|e| e.coord()).collect();
        if self.visit_order == VisitOrder::RowMajor {
            seeds.sort_unstable();
        }

        for seed in seeds {
            if self.blocked.contains(seed) {
                continue;
            }
            self.place(seed)?;
        }
        self.sweep()?;

        let stats = self.output.tile_stats();
        info!(
            tiles = stats.n_tiles,
            area = stats.area,
            stored_nnz = stats.nnz,
            regions = stats.n_regions,
            refinements = self.summary.refinements,
            adjusted = self.summary.adjusted,
            "blocking complete"
        );
        Ok((self.output, self.summary))
    }

    /// Build, clip and register the tile for one unclaimed seed
    fn place(&mut self, seed: Coord) -> Result<()> {
        let (rows, cols) = self.matrix.shape();
        let view = Occupancy::new(&self.index, &self.blocked);
        let proposal = self.builder.propose(seed, &view, &mut self.sampler);

        let squared = proposal.footprint.squared();
        let output = &self.output;
        let placed = clip_tile(squared, seed, rows, cols, &view, |origin| {
            output.contains_origin(origin)
        })?;

        self.summary.refinements += proposal.refinements;
        match proposal.source {
            FootprintSource::Quadrant => self.summary.quadrant_tiles += 1,
            FootprintSource::Ring => self.summary.ring_tiles += 1,
            FootprintSource::Bounds => self.summary.bounds_tiles += 1,
        }
        if placed != squared {
            self.summary.adjusted += 1;
        }
        trace!(
            %seed,
            source = ?proposal.source,
            proposed = %proposal.footprint,
            %placed,
            "placing tile"
        );

        self.register(placed)
    }

    /// Materialize a tile over `footprint` and claim every cell it covers
    fn register(&mut self, footprint: Footprint) -> Result<()> {
        let origin = footprint.origin();
        let edge = TileEdge::new(footprint.height(), origin)?;
        let tile = Tile::materialize(origin, edge, &self.index);
        let region = self.output.insert(tile)?;

        // Zero cells are claimed too, so later tiles never re-cover them
        for (row, col) in footprint.cells() {
            self.blocked.insert(Coord::new(row as usize, col as usize));
        }
        debug!(
            %origin,
            edge = edge.get(),
            region_row = region.row,
            region_col = region.col,
            "registered tile"
        );
        Ok(())
    }

    /// Wrap any nonzero the main pass left unclaimed in its own 1x1 tile
    fn sweep(&mut self) -> Result<()> {
        let matrix = self.matrix;
        for entry in matrix.entries() {
            let coord = entry.coord();
            if self.blocked.contains(coord) {
                continue;
            }
            warn!(%coord, "nonzero left unblocked after main pass, wrapping in 1x1 tile");
            self.register(Footprint::square(coord, 1))?;
            self.summary.swept += 1;
        }
        Ok(())
    }
}

/// Block `matrix` with `config` in one call
pub fn block_matrix(matrix: &CooMatrix, config: &LayoutConfig) -> Result<BlockedMatrix> {
    MatrixBlocker::new(matrix, config)?.run()
}

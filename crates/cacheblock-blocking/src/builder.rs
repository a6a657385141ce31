//! Footprint selection for a single seed
//!
//! Given an unclaimed nonzero, the builder proposes the rectangle a new tile
//! should cover. It tries, in order:
//!
//! 1. the densest quadrant of the sampling window, if its estimated density
//!    survives a second, quadrant-only sample
//! 2. the 3x3 box around the seed, if at least three immediate neighbors are
//!    unclaimed nonzeros
//! 3. the bounding box of the seed and whatever neighbors were found, with
//!    lopsided shapes nudged towards a square
//!
//! The proposal is not clipped to the matrix; that is the blocker's job.

use cacheblock_core::{Availability, Coord, Footprint, LayoutConfig};
use cacheblock_sampling::{QuadrantDensities, SamplingEngine};
use rand::Rng;
use serde::Serialize;
use tracing::trace;

/// Immediate neighbors in scan order
const RING: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Neighbors needed before the 3x3 box is taken outright
const RING_QUORUM: usize = 3;

/// Step of the search that produced a footprint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FootprintSource {
    /// A quadrant whose density held up under refinement
    Quadrant,
    /// Enough unclaimed immediate neighbors for a 3x3 box
    Ring,
    /// Bounding box of the seed and the neighbors found
    Bounds,
}

/// A proposed tile footprint
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Proposal {
    pub footprint: Footprint,
    pub source: FootprintSource,
    /// Quadrants re-sampled before the decision
    pub refinements: usize,
}

/// Proposes tile footprints from sampled local density
///
/// # Examples
///
/// ```
/// use cacheblock_blocking::{BlockBuilder, FootprintSource};
/// use cacheblock_core::{BlockedSet, Coord, CooMatrix, LayoutConfig, Occupancy};
/// use cacheblock_sampling::SamplingEngine;
///
/// let matrix = CooMatrix::from_triplets(100, 100, &[(50, 50, 1.0)]).unwrap();
/// let index = matrix.location_index();
/// let blocked = BlockedSet::new();
/// let view = Occupancy::new(&index, &blocked);
///
/// let builder = BlockBuilder::new(&LayoutConfig::default());
/// let proposal = builder.propose(Coord::new(50, 50), &view, &mut SamplingEngine::seeded(1));
/// assert_eq!(proposal.source, FootprintSource::Bounds);
/// assert_eq!(proposal.footprint.area(), 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockBuilder {
    window_radius: usize,
    sampling_rate: f64,
    refine_rate: f64,
    threshold: f64,
}

impl BlockBuilder {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            window_radius: config.window_radius,
            sampling_rate: config.sampling_rate,
            refine_rate: config.refine_rate,
            threshold: config.quadrant_threshold,
        }
    }

    /// Propose a footprint for a tile seeded at `seed`
    pub fn propose<R: Rng, A: Availability>(
        &self,
        seed: Coord,
        view: &A,
        sampler: &mut SamplingEngine<R>,
    ) -> Proposal {
        let (quadrant, refinements) = self.dense_quadrant(seed, view, sampler);
        if let Some(footprint) = quadrant {
            return Proposal {
                footprint,
                source: FootprintSource::Quadrant,
                refinements,
            };
        }

        let (footprint, source) = neighbor_footprint(seed, view);
        Proposal {
            footprint,
            source,
            refinements,
        }
    }

    /// First ranked quadrant whose density clears the threshold twice
    fn dense_quadrant<R: Rng, A: Availability>(
        &self,
        seed: Coord,
        view: &A,
        sampler: &mut SamplingEngine<R>,
    ) -> (Option<Footprint>, usize) {
        let window = Footprint::centered(seed, self.window_radius);
        let sample = sampler.sample(&window, seed, self.sampling_rate, view);
        let densities = QuadrantDensities::from_observations(&sample.observations, seed);

        let mut refinements = 0;
        for (quadrant, density) in densities.ranked() {
            // Ranked highest first, nothing further down can qualify
            if density <= self.threshold {
                break;
            }
            let footprint = quadrant.footprint(seed, self.window_radius);
            let refined = sampler
                .sample(&footprint, seed, self.refine_rate, view)
                .density_or_zero();
            refinements += 1;
            trace!(
                seed = %seed,
                ?quadrant,
                density,
                refined,
                "refined quadrant"
            );
            if refined > self.threshold {
                return (Some(footprint), refinements);
            }
        }
        (None, refinements)
    }
}

/// Footprint from the seed's immediate neighborhood
fn neighbor_footprint<A: Availability>(seed: Coord, view: &A) -> (Footprint, FootprintSource) {
    let (row, col) = (seed.row as i64, seed.col as i64);
    let mut bounds = Footprint::new(row, row, col, col);
    let mut found = 0;

    for (dr, dc) in RING {
        let (r, c) = (row + dr, col + dc);
        if !view.is_available(r, c) {
            continue;
        }
        found += 1;
        if found == RING_QUORUM {
            return (Footprint::centered(seed, 1), FootprintSource::Ring);
        }
        bounds.row_start = bounds.row_start.min(r);
        bounds.row_end = bounds.row_end.max(r);
        bounds.col_start = bounds.col_start.min(c);
        bounds.col_end = bounds.col_end.max(c);
    }

    match bounds.height() + bounds.width() {
        // 2x3 or 3x2
        5 => bounds = Footprint::centered(seed, 1),
        // 1x2 or 2x1
        3 if bounds.height() == 1 => bounds.row_end += 1,
        3 => bounds.col_end += 1,
        _ => {}
    }
    (bounds, FootprintSource::Bounds)
}

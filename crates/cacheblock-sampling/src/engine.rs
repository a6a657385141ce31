//! Density estimation by sampling without replacement
//!
//! The engine owns its random source so that a run is reproducible from a
//! single seed. It never sees the blocker's state directly; cells are judged
//! through the `Availability` view passed into each call.

use cacheblock_core::{Availability, Coord, Footprint};
use rand::prelude::*;
use rand::seq::index;
use tracing::trace;

/// One sampled cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Observation {
    pub row: i64,
    pub col: i64,
    /// Nonzero and not yet claimed by a tile
    pub available: bool,
}

/// Observations of one sampling pass
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleResult {
    pub observations: Vec<Observation>,
}

impl SampleResult {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Number of observations that were available nonzeros
    pub fn available(&self) -> usize {
        self.observations.iter().filter(|o| o.available).count()
    }

    /// Fraction of sampled cells that were available nonzeros
    ///
    /// `None` when nothing was drawn; the estimate is undefined in that case.
    pub fn density(&self) -> Option<f64> {
        if self.observations.is_empty() {
            None
        } else {
            Some(self.available() as f64 / self.observations.len() as f64)
        }
    }

    /// Density with an empty sample read as zero
    pub fn density_or_zero(&self) -> f64 {
        self.density().unwrap_or(0.0)
    }
}

/// Seedable sampling engine
///
/// # Examples
///
/// ```
/// use cacheblock_core::{BlockedSet, Coord, CooMatrix, Footprint, Occupancy};
/// use cacheblock_sampling::SamplingEngine;
///
/// let matrix = CooMatrix::from_triplets(4, 4, &[(0, 0, 1.0), (0, 1, 1.0)]).unwrap();
/// let index = matrix.location_index();
/// let blocked = BlockedSet::new();
/// let view = Occupancy::new(&index, &blocked);
///
/// let mut engine = SamplingEngine::seeded(42);
/// let result = engine.sample(&Footprint::new(0, 1, 0, 1), Coord::new(0, 0), 1.0, &view);
/// assert_eq!(result.len(), 3);
/// assert_eq!(result.available(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct SamplingEngine<R = StdRng> {
    rng: R,
}

impl SamplingEngine<StdRng> {
    /// Engine with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Fixed seed when given, otherwise one drawn from the thread generator
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| thread_rng().gen());
        Self::seeded(seed)
    }
}

impl<R: Rng> SamplingEngine<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draw `floor(rate * area)` distinct cells of `region`, never `excluded`
    ///
    /// The draw is capped at the number of eligible cells, so a rate of 1.0
    /// observes every cell except the excluded one.
    pub fn sample<A: Availability>(
        &mut self,
        region: &Footprint,
        excluded: Coord,
        rate: f64,
        view: &A,
    ) -> SampleResult {
        let area = region.area();
        let width = region.width();

        // Linear position of the excluded cell, when it lies inside the region
        let skip = region.contains_coord(excluded).then(|| {
            (excluded.row as i64 - region.row_start) as usize * width
                + (excluded.col as i64 - region.col_start) as usize
        });
        let eligible = area - usize::from(skip.is_some());
        let amount = ((rate * area as f64).floor() as usize).min(eligible);

        let observations: Vec<Observation> = index::sample(&mut self.rng, eligible, amount)
            .into_iter()
            .map(|i| {
                let linear = match skip {
                    Some(s) if i >= s => i + 1,
                    _ => i,
                };
                let row = region.row_start + (linear / width) as i64;
                let col = region.col_start + (linear % width) as i64;
                Observation {
                    row,
                    col,
                    available: view.is_available(row, col),
                }
            })
            .collect();

        trace!(
            region = %region,
            drawn = observations.len(),
            "sampled region"
        );

        SampleResult { observations }
    }
}

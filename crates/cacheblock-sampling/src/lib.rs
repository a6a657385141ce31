//! Random sub-sampling density estimation
//!
//! The blocker decides how far to grow a tile by estimating, rather than
//! counting, how many unclaimed nonzeros surround a seed. This crate provides
//! the seedable `SamplingEngine` that draws the cells and the quadrant
//! binning used to turn one window sample into four directional estimates.
//!
//! # Example
//!
//! ```rust
//! use cacheblock_core::{BlockedSet, Coord, CooMatrix, Footprint, Occupancy};
//! use cacheblock_sampling::{QuadrantDensities, SamplingEngine};
//!
//! let matrix = CooMatrix::from_triplets(10, 10, &[(4, 4, 1.0), (4, 5, 1.0), (5, 5, 1.0)]).unwrap();
//! let index = matrix.location_index();
//! let blocked = BlockedSet::new();
//! let view = Occupancy::new(&index, &blocked);
//!
//! let seed = Coord::new(4, 4);
//! let mut engine = SamplingEngine::seeded(7);
//! let sample = engine.sample(&Footprint::centered(seed, 3), seed, 1.0, &view);
//! let densities = QuadrantDensities::from_observations(&sample.observations, seed);
//!
//! let (best, _) = densities.ranked()[0];
//! println!("densest quadrant: {best:?}");
//! ```

pub mod engine;
pub mod quadrant;

pub use engine::{Observation, SampleResult, SamplingEngine};
pub use quadrant::{Quadrant, QuadrantDensities};

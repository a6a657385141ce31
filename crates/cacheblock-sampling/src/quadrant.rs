//! Fuzzy quadrants around a seed
//!
//! The sampling window around a seed is split into four quadrants that all
//! include the seed's own row and column, so neighboring quadrants overlap by
//! one line of cells.

use crate::engine::Observation;
use cacheblock_core::{Coord, Footprint};

/// One of the four quadrants around a seed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    TopRight,
    TopLeft,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    /// All quadrants in ranking tie-break order
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopRight,
        Quadrant::TopLeft,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    fn upper(self) -> bool {
        matches!(self, Quadrant::TopRight | Quadrant::TopLeft)
    }

    fn left(self) -> bool {
        matches!(self, Quadrant::TopLeft | Quadrant::BottomLeft)
    }

    /// Whether a cell belongs to this quadrant of `seed`
    pub fn contains(self, seed: Coord, row: i64, col: i64) -> bool {
        let (r, c) = (seed.row as i64, seed.col as i64);
        let row_ok = if self.upper() { row <= r } else { row >= r };
        let col_ok = if self.left() { col <= c } else { col >= c };
        row_ok && col_ok
    }

    /// Bounding box spanning from the seed to the window edge
    pub fn footprint(self, seed: Coord, radius: usize) -> Footprint {
        let (r, c, k) = (seed.row as i64, seed.col as i64, radius as i64);
        let (row_start, row_end) = if self.upper() { (r - k, r) } else { (r, r + k) };
        let (col_start, col_end) = if self.left() { (c - k, c) } else { (c, c + k) };
        Footprint::new(row_start, row_end, col_start, col_end)
    }
}

/// Observed density per quadrant
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct QuadrantDensities {
    densities: [f64; 4],
}

impl QuadrantDensities {
    /// Bin a window sample into the four quadrants of `seed`
    ///
    /// A quadrant with no observations gets density zero.
    pub fn from_observations(observations: &[Observation], seed: Coord) -> Self {
        let mut hits = [0usize; 4];
        let mut counts = [0usize; 4];
        for obs in observations {
            for (i, quadrant) in Quadrant::ALL.iter().enumerate() {
                if quadrant.contains(seed, obs.row, obs.col) {
                    counts[i] += 1;
                    if obs.available {
                        hits[i] += 1;
                    }
                }
            }
        }

        let mut densities = [0.0; 4];
        for i in 0..4 {
            if counts[i] > 0 {
                densities[i] = hits[i] as f64 / counts[i] as f64;
            }
        }
        Self { densities }
    }

    pub fn get(&self, quadrant: Quadrant) -> f64 {
        self.densities[quadrant as usize]
    }

    /// Quadrants by density, highest first; ties keep `Quadrant::ALL` order
    pub fn ranked(&self) -> [(Quadrant, f64); 4] {
        let mut ranked = [
            (Quadrant::ALL[0], self.densities[0]),
            (Quadrant::ALL[1], self.densities[1]),
            (Quadrant::ALL[2], self.densities[2]),
            (Quadrant::ALL[3], self.densities[3]),
        ];
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

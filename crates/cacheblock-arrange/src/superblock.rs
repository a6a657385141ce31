//! Arranged cache regions

use cacheblock_core::{Coord, RegionKey};
use serde::Serialize;

/// How each step of an arrangement walk was chosen
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StepCounts {
    /// Steps taken to a spatial-index neighbor
    pub indexed: usize,
    /// Steps found by scanning the sorted origin lists
    pub scanned: usize,
    /// Steps that fell back to the smallest unvisited origin
    pub arbitrary: usize,
}

impl StepCounts {
    /// Steps that stayed within one cache line along at least one axis
    pub fn local(&self) -> usize {
        self.indexed + self.scanned
    }
}

impl std::ops::AddAssign for StepCounts {
    fn add_assign(&mut self, other: Self) {
        self.indexed += other.indexed;
        self.scanned += other.scanned;
        self.arbitrary += other.arbitrary;
    }
}

/// One cache region's tiles in visiting order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Superblock {
    pub region: RegionKey,
    /// Serialized cost of all tiles in the region
    pub cost: usize,
    pub order: Vec<Coord>,
    pub steps: StepCounts,
}

impl Superblock {
    pub fn tile_count(&self) -> usize {
        self.order.len()
    }
}

//! Superblock arrangement
//!
//! Orders the tiles of each cache region so that a sequential reader moves
//! between nearby tiles. The walk starts at the row-major first origin and
//! repeatedly steps to an unvisited origin, trying three sources in turn:
//!
//! 1. the spatial index: nearest unvisited origin within one cache line
//! 2. the row- and column-sorted origin lists, scanned outward from the
//!    current origin while the scanned axis stays within one cache line
//! 3. the smallest unvisited origin, giving up on locality for this step

use crate::spatial::ChebyshevGrid;
use crate::superblock::{StepCounts, Superblock};
use cacheblock_core::{BlockedMatrix, Coord, Error, LayoutConfig, RegionKey, Result};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, instrument};

/// Orders tile origins for locality of sequential access
///
/// # Examples
///
/// ```
/// use cacheblock_arrange::SuperblockArranger;
/// use cacheblock_core::{Coord, RegionKey};
///
/// let arranger = SuperblockArranger::new(16, 20);
/// let origins = [Coord::new(10, 10), Coord::new(0, 0), Coord::new(0, 2)];
/// let (order, _) = arranger.arrange(RegionKey { row: 0, col: 0 }, &origins).unwrap();
/// assert_eq!(order, vec![Coord::new(0, 0), Coord::new(0, 2), Coord::new(10, 10)]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SuperblockArranger {
    locality: usize,
    neighbor_limit: usize,
}

impl SuperblockArranger {
    /// Arranger treating origins within `locality` (Chebyshev) as adjacent
    pub fn new(locality: usize, neighbor_limit: usize) -> Self {
        Self {
            locality,
            neighbor_limit: neighbor_limit.max(1),
        }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.cache_line_capacity(), config.neighbor_limit)
    }

    /// Visiting order over one region's tile origins
    ///
    /// The result is a permutation of `origins`. Fewer than two origins are
    /// returned unchanged.
    pub fn arrange(&self, region: RegionKey, origins: &[Coord]) -> Result<(Vec<Coord>, StepCounts)> {
        let mut counts = StepCounts::default();
        if origins.len() < 2 {
            return Ok((origins.to_vec(), counts));
        }

        let grid = ChebyshevGrid::new(origins, self.locality);
        let by_row = SortedAxis::new(origins, |c| (c.row, c.col));
        let by_col = SortedAxis::new(origins, |c| (c.col, c.row));

        let mut remaining: BTreeSet<Coord> = origins.iter().copied().collect();
        let total = remaining.len();
        let mut order = Vec::with_capacity(total);

        let mut current = by_row.points[0];
        remaining.remove(&current);
        order.push(current);

        while !remaining.is_empty() {
            let next = if let Some(next) = self.from_index(&grid, current, &remaining) {
                counts.indexed += 1;
                next
            } else if let Some(next) = self.from_scan(&by_row, &by_col, current, &remaining) {
                counts.scanned += 1;
                next
            } else {
                counts.arbitrary += 1;
                // Guard only: `remaining` is non-empty inside the loop
                remaining
                    .first()
                    .copied()
                    .ok_or_else(|| Error::ArrangementExhausted {
                        region_row: region.row,
                        region_col: region.col,
                        visited: order.len(),
                        total,
                    })?
            };

            remaining.remove(&next);
            order.push(next);
            current = next;
        }

        Ok((order, counts))
    }

    /// Arrange every region of a finished tile table, in region order
    #[instrument(skip_all, fields(regions = blocked.regions().len()))]
    pub fn arrange_all(&self, blocked: &BlockedMatrix) -> Result<Vec<Superblock>> {
        let mut superblocks = Vec::with_capacity(blocked.regions().len());
        for (&key, region) in blocked.regions() {
            let (order, steps) = self.arrange(key, &region.origins)?;
            debug!(
                region_row = key.row,
                region_col = key.col,
                tiles = order.len(),
                indexed = steps.indexed,
                scanned = steps.scanned,
                arbitrary = steps.arbitrary,
                "arranged region"
            );
            superblocks.push(Superblock {
                region: key,
                cost: region.cost,
                order,
                steps,
            });
        }
        Ok(superblocks)
    }

    /// Nearest unvisited origin reported by the spatial index
    fn from_index(
        &self,
        grid: &ChebyshevGrid,
        current: Coord,
        remaining: &BTreeSet<Coord>,
    ) -> Option<Coord> {
        grid.nearest_within(current, self.neighbor_limit, self.locality)
            .into_iter()
            .map(|(_, candidate)| candidate)
            .find(|candidate| remaining.contains(candidate))
    }

    /// Outward scan of both sorted lists, one step at a time
    ///
    /// Each step checks row-list forward, row-list backward, column-list
    /// forward, column-list backward. The scan ends once all four positions
    /// have left the locality window along their axis.
    fn from_scan(
        &self,
        by_row: &SortedAxis,
        by_col: &SortedAxis,
        current: Coord,
        remaining: &BTreeSet<Coord>,
    ) -> Option<Coord> {
        let row_at = by_row.position(current)?;
        let col_at = by_col.position(current)?;

        for step in 1..by_row.points.len() {
            let mut in_window = false;
            for (axis, at, key) in [
                (by_row, row_at, current.row),
                (by_col, col_at, current.col),
            ] {
                for index in [at.checked_add(step), at.checked_sub(step)] {
                    let Some(&candidate) = index.and_then(|i| axis.points.get(i)) else {
                        continue;
                    };
                    if (axis.key)(&candidate).0.abs_diff(key) > self.locality {
                        continue;
                    }
                    in_window = true;
                    if remaining.contains(&candidate) {
                        return Some(candidate);
                    }
                }
            }
            if !in_window {
                break;
            }
        }
        None
    }
}

/// Origins sorted along one axis, with a reverse lookup
struct SortedAxis {
    points: Vec<Coord>,
    positions: HashMap<Coord, usize>,
    key: fn(&Coord) -> (usize, usize),
}

impl SortedAxis {
    fn new(origins: &[Coord], key: fn(&Coord) -> (usize, usize)) -> Self {
        let mut points = origins.to_vec();
        points.sort_by_key(key);
        points.dedup();
        let positions = points.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Self {
            points,
            positions,
            key,
        }
    }

    fn position(&self, coord: Coord) -> Option<usize> {
        self.positions.get(&coord).copied()
    }
}

//! Bucketed spatial index under the Chebyshev metric
//!
//! Points are hashed into square buckets whose side equals the typical query
//! radius, so a radius query only inspects the bucket containing the query
//! point and its immediate neighbors.

use cacheblock_core::Coord;
use std::collections::HashMap;

/// Nearest-neighbor index over a fixed point set
#[derive(Clone, Debug)]
pub struct ChebyshevGrid {
    bucket: usize,
    buckets: HashMap<(usize, usize), Vec<Coord>>,
    len: usize,
}

impl ChebyshevGrid {
    /// Index `points` using square buckets of side `bucket`
    pub fn new(points: &[Coord], bucket: usize) -> Self {
        let bucket = bucket.max(1);
        let mut buckets: HashMap<(usize, usize), Vec<Coord>> = HashMap::new();
        for &point in points {
            buckets
                .entry((point.row / bucket, point.col / bucket))
                .or_default()
                .push(point);
        }
        Self {
            bucket,
            buckets,
            len: points.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Up to `k` indexed points within Chebyshev distance `radius` of `point`
    ///
    /// Results are ordered by distance, then row, then column, and include
    /// `point` itself when it is indexed.
    pub fn nearest_within(&self, point: Coord, k: usize, radius: usize) -> Vec<(usize, Coord)> {
        let rows = point.row.saturating_sub(radius) / self.bucket
            ..=point.row.saturating_add(radius) / self.bucket;
        let cols = point.col.saturating_sub(radius) / self.bucket
            ..=point.col.saturating_add(radius) / self.bucket;

        let mut found: Vec<(usize, Coord)> = Vec::new();
        for bucket_row in rows {
            for bucket_col in cols.clone() {
                let Some(members) = self.buckets.get(&(bucket_row, bucket_col)) else {
                    continue;
                };
                found.extend(
                    members
                        .iter()
                        .map(|&other| (point.chebyshev(&other), other))
                        .filter(|&(distance, _)| distance <= radius),
                );
            }
        }

        found.sort_unstable();
        found.truncate(k);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(coords: &[(usize, usize)]) -> Vec<Coord> {
        coords.iter().copied().map(Coord::from).collect()
    }

    #[test]
    fn test_radius_filters_by_max_norm() {
        let grid = ChebyshevGrid::new(&points(&[(0, 0), (3, 3), (0, 5), (6, 0)]), 4);
        let hits = grid.nearest_within(Coord::new(0, 0), 10, 4);
        let coords: Vec<_> = hits.iter().map(|&(_, c)| c).collect();
        assert_eq!(coords, points(&[(0, 0), (3, 3)]));
    }

    #[test]
    fn test_results_sorted_and_truncated() {
        let grid = ChebyshevGrid::new(&points(&[(5, 5), (5, 7), (4, 6), (9, 9), (5, 6)]), 3);
        let hits = grid.nearest_within(Coord::new(5, 5), 3, 16);
        assert_eq!(
            hits,
            vec![
                (0, Coord::new(5, 5)),
                (1, Coord::new(4, 6)),
                (1, Coord::new(5, 6)),
            ]
        );
    }

    #[test]
    fn test_query_crosses_bucket_boundaries() {
        let grid = ChebyshevGrid::new(&points(&[(15, 15), (16, 16), (31, 31)]), 16);
        let hits = grid.nearest_within(Coord::new(16, 16), 20, 16);
        assert_eq!(hits.len(), 3);
        assert_eq!(grid.len(), 3);
    }

    #[test]
    fn test_query_near_zero_saturates() {
        let grid = ChebyshevGrid::new(&points(&[(0, 1)]), 16);
        assert_eq!(grid.nearest_within(Coord::new(0, 0), 1, 16), vec![(1, Coord::new(0, 1))]);
        assert!(ChebyshevGrid::new(&[], 16).is_empty());
    }
}

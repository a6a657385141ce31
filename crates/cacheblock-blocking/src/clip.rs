//! Placing proposed footprints inside the matrix
//!
//! A proposal may hang over the matrix edge, cover cells other tiles already
//! claimed, or start on a registered origin. `clip_tile` resolves all three
//! in that order and returns a square footprint that contains the seed and
//! no claimed cell.

use cacheblock_core::{Availability, Coord, Error, Footprint, Result};
use tracing::debug;

/// Move and shrink a proposed footprint until it is a legal tile
///
/// 1. The edge is capped at the smaller matrix dimension, then the box is
///    shifted inward across any bottom/right overflow, or else any top/left
///    overflow.
/// 2. If the result no longer contains `seed` or covers a claimed cell, it is
///    replaced by the nearest square of at most the same edge that does
///    (see [`fit_around_seed`]).
/// 3. While the origin is already registered, the origin moves diagonally
///    by one, shrinking the edge. Reaching a single cell that still collides
///    is fatal.
pub fn clip_tile<A, F>(
    proposal: Footprint,
    seed: Coord,
    rows: usize,
    cols: usize,
    view: &A,
    is_origin: F,
) -> Result<Footprint>
where
    A: Availability,
    F: Fn(Coord) -> bool,
{
    let mut footprint = proposal;
    let edge = (proposal.height().max(proposal.width()) as i64).min(rows.min(cols) as i64);
    footprint.row_end = footprint.row_start + edge - 1;
    footprint.col_end = footprint.col_start + edge - 1;
    shift_inward(&mut footprint.row_start, &mut footprint.row_end, rows as i64);
    shift_inward(&mut footprint.col_start, &mut footprint.col_end, cols as i64);

    if footprint != proposal {
        debug!(%proposal, clipped = %footprint, "shifted footprint into matrix");
    }

    let mut footprint = fit_around_seed(footprint, seed, rows, cols, view);

    while is_origin(footprint.origin()) {
        let origin = footprint.origin();
        if footprint.height() <= 1 {
            return Err(Error::OriginCollision {
                row: origin.row,
                col: origin.col,
            });
        }
        debug!(%origin, "origin already registered, shrinking diagonally");
        footprint.row_start += 1;
        footprint.col_start += 1;
    }

    Ok(footprint)
}

/// Shift `[start, end]` to lie within `[0, limit)` without resizing it
fn shift_inward(start: &mut i64, end: &mut i64, limit: i64) {
    let shift = if *end >= limit {
        limit - 1 - *end
    } else if *start < 0 {
        -*start
    } else {
        0
    };
    *start += shift;
    *end += shift;
}

/// Largest unclaimed square containing `seed`, preferring `footprint` itself
///
/// Candidates are tried from the current edge downwards. Among squares of
/// one edge, the one whose origin is closest (Manhattan) to the current
/// origin wins, ties broken by row then column. The seed cell is never
/// claimed, so the search always succeeds by edge 1.
pub fn fit_around_seed<A: Availability>(
    footprint: Footprint,
    seed: Coord,
    rows: usize,
    cols: usize,
    view: &A,
) -> Footprint {
    if footprint.contains_coord(seed) && is_clear(&footprint, view) {
        return footprint;
    }

    let (seed_row, seed_col) = (seed.row as i64, seed.col as i64);
    let (rows, cols) = (rows as i64, cols as i64);
    let (anchor_row, anchor_col) = (footprint.row_start, footprint.col_start);

    for edge in (1..=footprint.height() as i64).rev() {
        let mut candidates: Vec<Footprint> = ((seed_row - edge + 1)..=seed_row)
            .flat_map(|r| ((seed_col - edge + 1)..=seed_col).map(move |c| (r, c)))
            .filter(|&(r, c)| r >= 0 && c >= 0 && r + edge <= rows && c + edge <= cols)
            .map(|(r, c)| Footprint::new(r, r + edge - 1, c, c + edge - 1))
            .collect();
        candidates.sort_by_key(|f| {
            (
                (f.row_start - anchor_row).abs() + (f.col_start - anchor_col).abs(),
                f.row_start,
                f.col_start,
            )
        });
        if let Some(fitted) = candidates.into_iter().find(|f| is_clear(f, view)) {
            debug!(%footprint, %fitted, %seed, "refit footprint around seed");
            return fitted;
        }
    }

    Footprint::new(seed_row, seed_row, seed_col, seed_col)
}

fn is_clear<A: Availability>(footprint: &Footprint, view: &A) -> bool {
    footprint.cells().all(|(r, c)| !view.is_blocked(r, c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cacheblock_core::{BlockedSet, LocationIndex, Occupancy};

    fn no_origins(_: Coord) -> bool {
        false
    }

    #[test]
    fn test_overflow_shifts_inward() {
        let index = LocationIndex::default();
        let blocked = BlockedSet::new();
        let view = Occupancy::new(&index, &blocked);

        // Quadrant hanging off the bottom-right corner
        let clipped = clip_tile(
            Footprint::new(8, 11, 8, 11),
            Coord::new(9, 9),
            10,
            10,
            &view,
            no_origins,
        )
        .unwrap();
        assert_eq!(clipped, Footprint::new(6, 9, 6, 9));

        // Ring box hanging off the top-left corner
        let clipped = clip_tile(
            Footprint::new(-1, 1, -1, 1),
            Coord::new(0, 0),
            10,
            10,
            &view,
            no_origins,
        )
        .unwrap();
        assert_eq!(clipped, Footprint::new(0, 2, 0, 2));
    }

    #[test]
    fn test_edge_capped_by_thin_matrix() {
        let index = LocationIndex::default();
        let blocked = BlockedSet::new();
        let view = Occupancy::new(&index, &blocked);

        let clipped = clip_tile(
            Footprint::new(-1, 1, 3, 5),
            Coord::new(0, 4),
            2,
            10,
            &view,
            no_origins,
        )
        .unwrap();
        assert_eq!((clipped.height(), clipped.width()), (2, 2));
        assert!(clipped.within(2, 10));
        assert!(clipped.contains_coord(Coord::new(0, 4)));
    }

    #[test]
    fn test_claimed_cells_force_refit() {
        let index = LocationIndex::default();
        let mut blocked = BlockedSet::new();
        blocked.insert(Coord::new(4, 4));
        let view = Occupancy::new(&index, &blocked);

        // Nearest clear 4x4 origins are (4, 5) and (5, 4); row breaks the tie
        let fitted = fit_around_seed(Footprint::new(4, 7, 4, 7), Coord::new(5, 5), 20, 20, &view);
        assert_eq!(fitted, Footprint::new(4, 7, 5, 8));
    }

    #[test]
    fn test_refit_keeps_clear_footprint() {
        let index = LocationIndex::default();
        let blocked = BlockedSet::new();
        let view = Occupancy::new(&index, &blocked);

        let footprint = Footprint::new(2, 5, 2, 5);
        assert_eq!(
            fit_around_seed(footprint, Coord::new(3, 3), 20, 20, &view),
            footprint
        );
    }

    #[test]
    fn test_surrounded_seed_falls_back_to_single_cell() {
        let index = LocationIndex::default();
        let mut blocked = BlockedSet::new();
        for (r, c) in [(4, 5), (6, 5), (5, 4), (5, 6)] {
            blocked.insert(Coord::new(r, c));
        }
        let view = Occupancy::new(&index, &blocked);

        let fitted = fit_around_seed(Footprint::centered(Coord::new(5, 5), 1), Coord::new(5, 5), 20, 20, &view);
        assert_eq!(fitted, Footprint::new(5, 5, 5, 5));
    }

    #[test]
    fn test_registered_origin_shrinks_diagonally() {
        let index = LocationIndex::default();
        let blocked = BlockedSet::new();
        let view = Occupancy::new(&index, &blocked);

        let clipped = clip_tile(
            Footprint::new(2, 4, 2, 4),
            Coord::new(4, 4),
            10,
            10,
            &view,
            |origin| origin == Coord::new(2, 2),
        )
        .unwrap();
        assert_eq!(clipped, Footprint::new(3, 4, 3, 4));
    }

    #[test]
    fn test_collision_at_single_cell_is_fatal() {
        let index = LocationIndex::default();
        let blocked = BlockedSet::new();
        let view = Occupancy::new(&index, &blocked);

        let err = clip_tile(
            Footprint::new(3, 3, 3, 3),
            Coord::new(3, 3),
            10,
            10,
            &view,
            |_| true,
        )
        .unwrap_err();
        assert!(matches!(err, Error::OriginCollision { row: 3, col: 3 }));
    }
}

//! Splitting a pair selection into route matrix requests.
//!
//! The Routes API caps the number of elements per request, and transit
//! routing has a much lower cap than driving. Origins and destinations are
//! tiled into `side x side` blocks; a block whose pairs are all selected is
//! sent as one rectangular request. Every other selected pair goes out in
//! `1 x k` requests, one per origin and `side` destinations at a time, so that
//! unselected pairs are never billed and round trips stay close to one per
//! origin.

use std::ops::Range;

use spacetime_core::{PairSelection, TravelMode};

/// One request's worth of origins and destinations, as global indices into
/// the caller's origin and destination lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixBatch {
    pub origins: Vec<usize>,
    pub destinations: Vec<usize>,
}

impl MatrixBatch {
    /// Number of billed elements.
    #[must_use]
    pub fn elements(&self) -> usize {
        self.origins.len() * self.destinations.len()
    }
}

/// Largest origin or destination count per request for `mode`.
#[must_use]
pub fn max_batch_side(mode: TravelMode) -> usize {
    match mode {
        TravelMode::Transit => 10,
        TravelMode::Drive | TravelMode::Walk => 25,
    }
}

/// Plans the requests that cover exactly the pairs in `selection`.
///
/// `side` is clamped to at least 1.
#[must_use]
pub fn plan_batches(selection: &PairSelection, side: usize) -> Vec<MatrixBatch> {
    let side = side.max(1);
    let mut batches = Vec::new();

    for origin_tile in tiles(selection.n_origins(), side) {
        let full_tiles: Vec<Range<usize>> = tiles(selection.n_destinations(), side)
            .filter(|dest_tile| {
                origin_tile.clone().all(|o| {
                    selection.destinations_in(o, dest_tile.clone()).len() == dest_tile.len()
                })
            })
            .collect();

        for dest_tile in &full_tiles {
            batches.push(MatrixBatch {
                origins: origin_tile.clone().collect(),
                destinations: dest_tile.clone().collect(),
            });
        }

        for origin in origin_tile {
            let rest: Vec<usize> = selection
                .destinations_of(origin)
                .iter()
                .copied()
                .filter(|d| !full_tiles.iter().any(|tile| tile.contains(d)))
                .collect();
            for chunk in rest.chunks(side) {
                batches.push(MatrixBatch {
                    origins: vec![origin],
                    destinations: chunk.to_vec(),
                });
            }
        }
    }

    batches
}

fn tiles(len: usize, side: usize) -> impl Iterator<Item = Range<usize>> {
    (0..len)
        .step_by(side)
        .map(move |start| start..(start + side).min(len))
}

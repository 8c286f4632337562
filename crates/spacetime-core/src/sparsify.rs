//! Selection of origin/destination pairs worth a real travel-time query.
//!
//! Distant pairs are left out and later approximated by
//! [`reconstruct`](crate::dense::reconstruct), which keeps the number of
//! billed matrix elements small.

use crate::error::CoreError;
use crate::geo::{GeoPoint, MapView};

/// The set of origin/destination pairs to query.
///
/// Stored as one sorted list of destination indices per origin; excluded pairs
/// are never materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSelection {
    rows: Vec<Vec<usize>>,
    n_destinations: usize,
}

impl PairSelection {
    /// Every origin paired with every destination.
    #[must_use]
    pub fn all(n_origins: usize, n_destinations: usize) -> Self {
        Self {
            rows: vec![(0..n_destinations).collect(); n_origins],
            n_destinations,
        }
    }

    #[must_use]
    pub fn n_origins(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn n_destinations(&self) -> usize {
        self.n_destinations
    }

    /// Number of selected pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    /// Selected destination indices for `origin`, ascending.
    #[must_use]
    pub fn destinations_of(&self, origin: usize) -> &[usize] {
        self.rows.get(origin).map_or(&[], Vec::as_slice)
    }

    /// Selected destinations of `origin` within `range`.
    #[must_use]
    pub fn destinations_in(&self, origin: usize, range: std::ops::Range<usize>) -> &[usize] {
        let row = self.destinations_of(origin);
        let start = row.partition_point(|&d| d < range.start);
        let end = row.partition_point(|&d| d < range.end);
        &row[start..end]
    }

    #[must_use]
    pub fn contains(&self, origin: usize, destination: usize) -> bool {
        self.destinations_of(origin)
            .binary_search(&destination)
            .is_ok()
    }

    /// All selected `(origin, destination)` pairs in row-major order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(o, row)| row.iter().map(move |&d| (o, d)))
    }
}

/// Selects the pairs whose normalized distance under `view` is strictly below
/// `max_normalized_distance`.
///
/// Pairs of equal points are never selected. When `origins` and
/// `destinations` hold the same points, only pairs with
/// `origin_index < destination_index` are kept since the matrix is symmetric.
///
/// # Errors
///
/// Returns [`CoreError::EmptySelection`] if no pair is selected.
pub fn select_pairs(
    view: &MapView,
    origins: &[GeoPoint],
    destinations: &[GeoPoint],
    max_normalized_distance: f64,
) -> Result<PairSelection, CoreError> {
    let symmetric = origins == destinations;
    let projected: Vec<_> = destinations
        .iter()
        .map(|&d| view.to_normalized(d))
        .collect();

    let rows: Vec<Vec<usize>> = origins
        .iter()
        .enumerate()
        .map(|(i, &origin)| {
            let from = view.to_normalized(origin);
            destinations
                .iter()
                .zip(&projected)
                .enumerate()
                .filter(|&(j, (&destination, &to))| {
                    (!symmetric || i < j)
                        && origin != destination
                        && from.distance(to) < max_normalized_distance
                })
                .map(|(j, _)| j)
                .collect()
        })
        .collect();

    let selection = PairSelection {
        rows,
        n_destinations: destinations.len(),
    };
    if selection.is_empty() {
        return Err(CoreError::EmptySelection {
            max_normalized_distance,
        });
    }

    tracing::info!(
        selected = selection.len(),
        total = origins.len() * destinations.len(),
        symmetric,
        "sparsified distance matrix"
    );
    Ok(selection)
}

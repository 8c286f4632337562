//! Dense travel-time reconstruction.
//!
//! Only nearby pairs are ever queried. The remaining entries are approximated
//! by the shortest chain of queried pairs (Floyd–Warshall), which is an
//! estimate and not a measured travel time.

use crate::route::RouteEntry;

/// `n × n` travel times in seconds; `None` where no path is known.
pub type DenseMatrix = Vec<Vec<Option<u64>>>;

/// Builds the full symmetric matrix for `n` nodes from sparse query results.
///
/// Entries without [`RouteCondition::RouteExists`](crate::RouteCondition) or
/// without a duration are ignored. Each usable entry is written to both
/// `(origin, destination)` and `(destination, origin)`; when a pair appears
/// more than once, in either direction, the later entry wins. Unreached pairs
/// stay `None`.
#[must_use]
pub fn reconstruct(n: usize, entries: &[RouteEntry]) -> DenseMatrix {
    let mut matrix: DenseMatrix = vec![vec![None; n]; n];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[i] = Some(0);
    }

    let mut used = 0usize;
    for entry in entries {
        let Some(duration) = entry.usable_duration() else {
            continue;
        };
        let (i, j) = (entry.origin_index, entry.destination_index);
        if i >= n || j >= n {
            tracing::warn!(
                origin = i,
                destination = j,
                n,
                "skipping route entry outside the matrix"
            );
            continue;
        }
        if i == j {
            continue;
        }
        matrix[i][j] = Some(duration);
        matrix[j][i] = Some(duration);
        used += 1;
    }
    tracing::debug!(n, used, total = entries.len(), "seeded dense matrix");

    for k in 0..n {
        for i in 0..n {
            let Some(ik) = matrix[i][k] else {
                continue;
            };
            for j in 0..n {
                let Some(kj) = matrix[k][j] else {
                    continue;
                };
                let through = ik.saturating_add(kj);
                if matrix[i][j].is_none_or(|current| through < current) {
                    matrix[i][j] = Some(through);
                }
            }
        }
    }

    matrix
}

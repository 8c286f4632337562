//! Grid construction over a static map view.
//!
//! The lattice spans the whole visible image: rows run north to south and
//! columns west to east, stored row-major so that a cell's flat index is
//! `row * size + col`.

use crate::dense::{reconstruct, DenseMatrix};
use crate::error::CoreError;
use crate::geo::{GeoPoint, MapView};
use crate::route::RouteEntry;
use crate::snap::{SnapOutcome, SnapToRoad, UnsnappedReason};
use crate::sparsify::{select_pairs, PairSelection};
use crate::travel::TravelMode;

/// Default drift limit, in normalized units, between a raw point and its
/// snapped location.
pub const DEFAULT_MAX_SNAP_DRIFT: f64 = 0.05;

/// `n` evenly spaced values from `a` to `b` inclusive; `n == 1` gives the
/// midpoint.
fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![(a + b) / 2.0];
    }
    #[allow(clippy::cast_precision_loss)]
    let step = (b - a) / (n - 1) as f64;
    #[allow(clippy::cast_precision_loss)]
    (0..n).map(|i| a + step * i as f64).collect()
}

/// Lays out `size × size` points covering `view`, row-major, north to south
/// and west to east.
///
/// # Errors
///
/// Returns [`CoreError::InvalidGridSize`] if `size` is zero.
pub fn build_grid(view: &MapView, size: usize) -> Result<Vec<GeoPoint>, CoreError> {
    if size == 0 {
        return Err(CoreError::InvalidGridSize(size));
    }
    let center = view.center();
    let extents = view.extents();

    let mut lats = linspace(
        center.lat - extents.half_height_deg,
        center.lat + extents.half_height_deg,
        size,
    );
    lats.reverse();
    let lngs = linspace(
        center.lng - extents.half_width_deg,
        center.lng + extents.half_width_deg,
        size,
    );

    Ok(lats
        .iter()
        .flat_map(|&lat| lngs.iter().map(move |&lng| GeoPoint::new(lat, lng)))
        .collect())
}

/// One lattice position.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub raw: GeoPoint,
    pub row: usize,
    pub col: usize,
    pub snap: SnapOutcome,
}

impl GridCell {
    /// The snapped road location, or the raw point when snapping did not
    /// produce an accepted result.
    #[must_use]
    pub fn snapped(&self) -> GeoPoint {
        self.snap.resolution().map_or(self.raw, |r| r.location)
    }
}

/// A grid of cells over one map view, plus the travel times queried for it.
#[derive(Debug, Clone)]
pub struct Grid {
    view: MapView,
    size: usize,
    travel_mode: TravelMode,
    cells: Vec<GridCell>,
    route_matrix: Option<Vec<RouteEntry>>,
}

impl Grid {
    /// Builds a grid whose cells keep their raw positions.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidGridSize`] if `size` is zero.
    pub fn unsnapped(
        view: MapView,
        size: usize,
        travel_mode: TravelMode,
    ) -> Result<Self, CoreError> {
        let cells = build_grid(&view, size)?
            .into_iter()
            .enumerate()
            .map(|(index, raw)| GridCell {
                raw,
                row: index / size,
                col: index % size,
                snap: SnapOutcome::Unsnapped(UnsnappedReason::Disabled),
            })
            .collect();
        Ok(Self {
            view,
            size,
            travel_mode,
            cells,
            route_matrix: None,
        })
    }

    /// Builds a grid and snaps every cell to a nearby road, one lookup at a
    /// time.
    ///
    /// A failed lookup, or a snapped location more than `max_drift` away from
    /// the raw point in normalized units, keeps the raw point and is logged as
    /// a warning.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidGridSize`] if `size` is zero. Snapping
    /// failures are never returned.
    pub async fn snapped<S: SnapToRoad>(
        view: MapView,
        size: usize,
        travel_mode: TravelMode,
        snapper: &S,
        max_drift: f64,
    ) -> Result<Self, CoreError> {
        let mut grid = Self::unsnapped(view, size, travel_mode)?;
        let mut snapped = 0usize;
        for cell in &mut grid.cells {
            let outcome = snap_cell(&view, cell, snapper, max_drift).await;
            cell.snap = outcome;
            if cell.snap.is_snapped() {
                snapped += 1;
            }
        }
        tracing::info!(
            snapped,
            total = grid.cells.len(),
            "snapped grid points to roads"
        );
        Ok(grid)
    }

    #[must_use]
    pub fn view(&self) -> &MapView {
        &self.view
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn travel_mode(&self) -> TravelMode {
        self.travel_mode
    }

    #[must_use]
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    #[must_use]
    pub fn snapped_locations(&self) -> Vec<GeoPoint> {
        self.cells.iter().map(GridCell::snapped).collect()
    }

    /// Selects the snapped-point pairs closer than `max_normalized_distance`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptySelection`] if no pair qualifies.
    pub fn select_pairs(&self, max_normalized_distance: f64) -> Result<PairSelection, CoreError> {
        let points = self.snapped_locations();
        select_pairs(&self.view, &points, &points, max_normalized_distance)
    }

    /// Stores the queried entries. Can only be done once.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RouteMatrixAlreadySet`] on a second call.
    pub fn attach_route_matrix(&mut self, entries: Vec<RouteEntry>) -> Result<(), CoreError> {
        if self.route_matrix.is_some() {
            return Err(CoreError::RouteMatrixAlreadySet);
        }
        self.route_matrix = Some(entries);
        Ok(())
    }

    #[must_use]
    pub fn route_matrix(&self) -> Option<&[RouteEntry]> {
        self.route_matrix.as_deref()
    }

    /// Dense travel times derived from the attached route matrix.
    #[must_use]
    pub fn dense_travel_times(&self) -> Option<DenseMatrix> {
        self.route_matrix
            .as_deref()
            .map(|entries| reconstruct(self.cells.len(), entries))
    }
}

async fn snap_cell<S: SnapToRoad>(
    view: &MapView,
    cell: &GridCell,
    snapper: &S,
    max_drift: f64,
) -> SnapOutcome {
    match snapper.snap(cell.raw).await {
        Ok(resolution) => {
            let distance = view.normalized_distance(cell.raw, resolution.location);
            if distance > max_drift {
                tracing::warn!(
                    row = cell.row,
                    col = cell.col,
                    raw = %cell.raw,
                    snapped = %resolution.location,
                    distance,
                    max_drift,
                    "snapped location drifted too far; keeping raw point"
                );
                SnapOutcome::Unsnapped(UnsnappedReason::Drifted {
                    distance,
                    rejected: resolution,
                })
            } else {
                tracing::debug!(row = cell.row, col = cell.col, distance, "snapped grid point");
                SnapOutcome::Snapped(resolution)
            }
        }
        Err(failure) => {
            tracing::warn!(
                row = cell.row,
                col = cell.col,
                raw = %cell.raw,
                error = %failure,
                "could not snap grid point; keeping raw point"
            );
            SnapOutcome::Unsnapped(UnsnappedReason::Failed(failure))
        }
    }
}

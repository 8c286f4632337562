//! The persisted `grid_data.json` document read by the map frontend.

use serde::{Deserialize, Serialize};

use crate::dense::{reconstruct, DenseMatrix};
use crate::geo::GeoPoint;
use crate::grid::{Grid, GridCell};
use crate::route::RouteEntry;
use crate::snap::{SnapOutcome, UnsnappedReason};
use crate::travel::TravelMode;

/// How a location's `snapped_location` was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapStatus {
    Snapped,
    #[default]
    Disabled,
    Failed,
    Drifted,
}

/// One grid cell as stored in the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub raw_location: GeoPoint,
    pub snapped_location: GeoPoint,
    /// Column index.
    pub grid_x: usize,
    /// Row index.
    pub grid_y: usize,
    pub snap_result_types: Option<Vec<String>>,
    pub snap_result_place_id: Option<String>,
    #[serde(default)]
    pub snap_status: SnapStatus,
}

impl From<&GridCell> for LocationRecord {
    fn from(cell: &GridCell) -> Self {
        let resolution = cell.snap.resolution();
        let snap_status = match &cell.snap {
            SnapOutcome::Snapped(_) => SnapStatus::Snapped,
            SnapOutcome::Unsnapped(UnsnappedReason::Disabled) => SnapStatus::Disabled,
            SnapOutcome::Unsnapped(UnsnappedReason::Failed(_)) => SnapStatus::Failed,
            SnapOutcome::Unsnapped(UnsnappedReason::Drifted { .. }) => SnapStatus::Drifted,
        };
        Self {
            raw_location: cell.raw,
            snapped_location: cell.snapped(),
            grid_x: cell.col,
            grid_y: cell.row,
            snap_result_types: resolution.map(|r| r.types.clone()),
            snap_result_place_id: resolution.map(|r| r.place_id.clone()),
            snap_status,
        }
    }
}

/// Everything the frontend needs to draw one grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridArtifact {
    pub center: GeoPoint,
    pub zoom: u8,
    pub size: usize,
    pub size_pixels: u32,
    #[serde(default)]
    pub travel_mode: TravelMode,
    pub locations: Vec<LocationRecord>,
    #[serde(default)]
    pub route_matrix: Vec<RouteEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dense_travel_times: Option<DenseMatrix>,
}

impl GridArtifact {
    /// Recomputes `dense_travel_times` from `route_matrix` alone.
    pub fn densify(&mut self) {
        let n = self.size * self.size;
        self.dense_travel_times = Some(reconstruct(n, &self.route_matrix));
    }
}

impl Grid {
    /// Snapshot of the grid in its persisted form, including the dense matrix
    /// when a route matrix is attached.
    #[must_use]
    pub fn to_artifact(&self) -> GridArtifact {
        let view = self.view();
        GridArtifact {
            center: view.center(),
            zoom: view.zoom(),
            size: self.size(),
            size_pixels: view.pixel_size(),
            travel_mode: self.travel_mode(),
            locations: self.cells().iter().map(LocationRecord::from).collect(),
            route_matrix: self.route_matrix().map(<[RouteEntry]>::to_vec).unwrap_or_default(),
            dense_travel_times: self.dense_travel_times(),
        }
    }
}

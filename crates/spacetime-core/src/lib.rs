//! Core of the spacetime grid builder: map projection, grid layout, pair
//! selection and dense travel-time reconstruction.
//!
//! Network access lives in `spacetime-gmaps`; this crate only defines the
//! [`SnapToRoad`] seam it plugs into.

pub mod app_config;
pub mod artifact;
pub mod config;
pub mod dense;
pub mod error;
pub mod geo;
pub mod grid;
pub mod route;
pub mod snap;
pub mod sparsify;
pub mod travel;

pub use app_config::AppConfig;
pub use artifact::{GridArtifact, LocationRecord, SnapStatus};
pub use config::{load_app_config, load_app_config_from_env};
pub use dense::{reconstruct, DenseMatrix};
pub use error::{ConfigError, CoreError, SnapFailure};
pub use geo::{mercator_scale_factor, GeoPoint, MapExtents, MapView, NormalizedPoint};
pub use grid::{build_grid, Grid, GridCell, DEFAULT_MAX_SNAP_DRIFT};
pub use route::{RouteCondition, RouteEntry};
pub use snap::{SnapOutcome, SnapResolution, SnapToRoad, UnsnappedReason};
pub use sparsify::{select_pairs, PairSelection};
pub use travel::TravelMode;

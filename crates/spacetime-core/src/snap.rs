//! Road snapping seam.
//!
//! Grid assembly resolves every lattice point through a [`SnapToRoad`]
//! implementation and records the result as a [`SnapOutcome`], so callers can
//! tell a verified road location from a best-effort raw point.

use crate::error::SnapFailure;
use crate::geo::GeoPoint;

/// A point resolved onto the road network.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResolution {
    pub location: GeoPoint,
    pub place_id: String,
    pub types: Vec<String>,
}

/// Resolves an arbitrary coordinate to a nearby routable location.
#[allow(async_fn_in_trait)]
pub trait SnapToRoad {
    /// # Errors
    ///
    /// Returns a [`SnapFailure`] when no suitable location is found or the
    /// lookup itself fails.
    async fn snap(&self, point: GeoPoint) -> Result<SnapResolution, SnapFailure>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnsnappedReason {
    /// Snapping was not requested.
    Disabled,
    /// The lookup failed.
    Failed(SnapFailure),
    /// The resolved location was further than the allowed drift.
    Drifted {
        distance: f64,
        rejected: SnapResolution,
    },
}

/// Result of snapping one grid cell.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapOutcome {
    Snapped(SnapResolution),
    Unsnapped(UnsnappedReason),
}

impl SnapOutcome {
    #[must_use]
    pub fn resolution(&self) -> Option<&SnapResolution> {
        match self {
            SnapOutcome::Snapped(resolution) => Some(resolution),
            SnapOutcome::Unsnapped(_) => None,
        }
    }

    #[must_use]
    pub fn is_snapped(&self) -> bool {
        matches!(self, SnapOutcome::Snapped(_))
    }
}

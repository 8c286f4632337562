//! Geographic coordinates and the projection of a static map view.
//!
//! A [`MapView`] describes the square map image the grid is laid over: its
//! center, zoom level and pixel size. Every normalized coordinate is relative
//! to exactly one view, with `(0, 0)` at the north-west corner of the image
//! and `(1, 1)` at the south-east corner.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Highest zoom level the static map API renders.
pub const MAX_ZOOM: u8 = 21;

/// Largest square image the static map API returns, in pixels.
pub const MAX_PIXEL_SIZE: u32 = 640;

/// Degrees of longitude covered by one map pixel at zoom 0.
///
/// Tuned by placing markers on real static map images: moving this many
/// degrees per pixel from the center reaches the image corners. The
/// theoretical tile value is `360 / 256 = 1.406_25`; the rendered images are
/// slightly tighter.
pub const DEGREES_PER_PIXEL_AT_ZOOM_0: f64 = 1.4;

/// A WGS-84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Formats as `lat,lng`, the form map URLs expect.
impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// A point projected into a view's `[0, 1]²` image space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Half-width and half-height, in degrees, of the area a view covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapExtents {
    pub half_width_deg: f64,
    pub half_height_deg: f64,
}

/// A square static map image: center, zoom and pixel size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    center: GeoPoint,
    zoom: u8,
    pixel_size: u32,
}

impl MapView {
    /// Creates a view after checking the map API limits.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidCenter`] if the center latitude is not strictly
    ///   between -90 and 90 or its longitude is not finite.
    /// - [`CoreError::InvalidZoom`] if `zoom` exceeds [`MAX_ZOOM`].
    /// - [`CoreError::InvalidPixelSize`] if `pixel_size` is zero or exceeds
    ///   [`MAX_PIXEL_SIZE`].
    pub fn new(center: GeoPoint, zoom: u8, pixel_size: u32) -> Result<Self, CoreError> {
        // Mercator breaks down at the poles: rows would run south to north.
        if !(center.lat > -90.0 && center.lat < 90.0) || !center.lng.is_finite() {
            return Err(CoreError::InvalidCenter {
                lat: center.lat,
                lng: center.lng,
            });
        }
        if zoom > MAX_ZOOM {
            return Err(CoreError::InvalidZoom(zoom));
        }
        if pixel_size == 0 || pixel_size > MAX_PIXEL_SIZE {
            return Err(CoreError::InvalidPixelSize(pixel_size));
        }
        Ok(Self {
            center,
            zoom,
            pixel_size,
        })
    }

    #[must_use]
    pub fn center(&self) -> GeoPoint {
        self.center
    }

    #[must_use]
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    #[must_use]
    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    /// Degrees covered from the center to each edge of the image.
    ///
    /// Tiles keep a constant east-west scale per zoom level, while the
    /// north-south coverage shrinks by the Mercator scale factor away from
    /// the equator.
    #[must_use]
    pub fn extents(&self) -> MapExtents {
        let half_width_deg = f64::from(self.pixel_size) / 2.0 * DEGREES_PER_PIXEL_AT_ZOOM_0
            / 2f64.powi(i32::from(self.zoom));
        let half_height_deg = half_width_deg / mercator_scale_factor(self.center.lat);
        MapExtents {
            half_width_deg,
            half_height_deg,
        }
    }

    /// Projects `point` into this view's image space.
    #[must_use]
    pub fn to_normalized(&self, point: GeoPoint) -> NormalizedPoint {
        let MapExtents {
            half_width_deg,
            half_height_deg,
        } = self.extents();
        let west = self.center.lng - half_width_deg;
        let north = self.center.lat + half_height_deg;
        NormalizedPoint {
            x: (point.lng - west) / (2.0 * half_width_deg),
            y: (north - point.lat) / (2.0 * half_height_deg),
        }
    }

    /// Inverse of [`MapView::to_normalized`].
    #[must_use]
    pub fn from_normalized(&self, point: NormalizedPoint) -> GeoPoint {
        let MapExtents {
            half_width_deg,
            half_height_deg,
        } = self.extents();
        let west = self.center.lng - half_width_deg;
        let north = self.center.lat + half_height_deg;
        GeoPoint {
            lat: north - point.y * 2.0 * half_height_deg,
            lng: west + point.x * 2.0 * half_width_deg,
        }
    }

    /// Euclidean distance between two points in this view's image space.
    #[must_use]
    pub fn normalized_distance(&self, a: GeoPoint, b: GeoPoint) -> f64 {
        self.to_normalized(a).distance(self.to_normalized(b))
    }
}

/// Mercator stretch of the parallel at `lat` degrees: `1 / cos(lat)`.
#[must_use]
pub fn mercator_scale_factor(lat: f64) -> f64 {
    1.0 / lat.to_radians().cos()
}

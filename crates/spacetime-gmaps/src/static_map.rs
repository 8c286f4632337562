//! Background image for the map frontend.

use spacetime_core::{GeoPoint, MapView};

use crate::client::GmapsClient;
use crate::error::GmapsError;

const STATIC_MAP_PATH: &str = "maps/api/staticmap";
const HIDE_POINTS_OF_INTEREST: &str = "feature:poi|visibility:off";

impl GmapsClient {
    /// Downloads a square PNG of `view` at double resolution, with a marker
    /// for each point in `markers`.
    ///
    /// # Errors
    ///
    /// - [`GmapsError::Http`] on network failure.
    /// - [`GmapsError::ApiError`] on a non-2xx status.
    pub async fn static_map(
        &self,
        view: &MapView,
        markers: &[GeoPoint],
    ) -> Result<Vec<u8>, GmapsError> {
        let center = view.center().to_string();
        let zoom = view.zoom().to_string();
        let size = format!("{0}x{0}", view.pixel_size());
        let mut params = vec![
            ("center", center.as_str()),
            ("zoom", zoom.as_str()),
            ("size", size.as_str()),
            ("scale", "2"),
            ("style", HIDE_POINTS_OF_INTEREST),
        ];

        // A leading `|` keeps the default marker style.
        let marker_list: String = markers.iter().map(|m| format!("|{m}")).collect();
        if !markers.is_empty() {
            params.push(("markers", marker_list.as_str()));
        }

        let url = self.maps_url(STATIC_MAP_PATH, &params);
        tracing::debug!(
            %center,
            zoom = view.zoom(),
            markers = markers.len(),
            "fetching static map"
        );
        let bytes = self.get(&url).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

//! Route matrix requests against the Routes API.
//!
//! [`GmapsClient::fetch_route_matrix`] checks the cost, plans the batches and
//! hands back a [`RouteMatrixFetch`] cursor. Each call to
//! [`RouteMatrixFetch::next_batch`] sends one billed request.

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Url;
use spacetime_core::{GeoPoint, PairSelection, RouteEntry, TravelMode};

use crate::batch::{max_batch_side, plan_batches, MatrixBatch};
use crate::client::{check_status, parse_json, GmapsClient};
use crate::cost::{Confirm, CostGate};
use crate::error::GmapsError;
use crate::retry::retry_with_backoff;
use crate::types::{RouteMatrixPayload, RouteMatrixWaypoint};

const ROUTE_MATRIX_PATH: &str = "distanceMatrix/v2:computeRouteMatrix";
const FIELD_MASK: &str = "originIndex,destinationIndex,duration,distanceMeters,status,condition";
const TRAFFIC_UNAWARE: &str = "TRAFFIC_UNAWARE";

/// Builds the request body for one batch.
///
/// Driving requests ignore live traffic. A departure time is only sent for
/// transit; other modes drop it.
#[must_use]
pub fn build_payload(
    origins: &[GeoPoint],
    destinations: &[GeoPoint],
    travel_mode: TravelMode,
    departure_time: Option<DateTime<Utc>>,
) -> RouteMatrixPayload {
    let routing_preference = (travel_mode == TravelMode::Drive).then_some(TRAFFIC_UNAWARE);

    let departure_time = match (travel_mode, departure_time) {
        (TravelMode::Transit, Some(at)) => Some(at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        (_, Some(at)) => {
            tracing::debug!(
                %travel_mode,
                departure = %at,
                "departure time only applies to transit"
            );
            None
        }
        (_, None) => None,
    };

    RouteMatrixPayload {
        origins: origins.iter().copied().map(RouteMatrixWaypoint::from).collect(),
        destinations: destinations
            .iter()
            .copied()
            .map(RouteMatrixWaypoint::from)
            .collect(),
        travel_mode,
        routing_preference,
        departure_time,
    }
}

/// Everything needed to query the travel times of a pair selection.
#[derive(Debug, Clone, Copy)]
pub struct RouteMatrixRequest<'a> {
    pub origins: &'a [GeoPoint],
    pub destinations: &'a [GeoPoint],
    /// Pairs to query, indexing into `origins` and `destinations`.
    pub selection: &'a PairSelection,
    pub travel_mode: TravelMode,
    pub departure_time: Option<DateTime<Utc>>,
}

impl GmapsClient {
    /// Sends one `computeRouteMatrix` request, retrying while rate limited.
    ///
    /// Returned indices are local to `payload`.
    ///
    /// # Errors
    ///
    /// - [`GmapsError::RateLimitExceeded`] once the backoff policy gives up.
    /// - [`GmapsError::ApiError`] on any other non-2xx status.
    /// - [`GmapsError::Http`] on network failure.
    /// - [`GmapsError::Deserialize`] if the body is not a list of elements.
    pub async fn compute_route_matrix(
        &self,
        payload: &RouteMatrixPayload,
    ) -> Result<Vec<RouteEntry>, GmapsError> {
        let url = self.routes_url(ROUTE_MATRIX_PATH);
        let url = &url;
        retry_with_backoff(&self.backoff, move || async move {
            self.post_route_matrix(url, payload).await
        })
        .await
    }

    async fn post_route_matrix(
        &self,
        url: &Url,
        payload: &RouteMatrixPayload,
    ) -> Result<Vec<RouteEntry>, GmapsError> {
        let response = self
            .client
            .post(url.clone())
            .header("X-Goog-Api-Key", self.api_key.as_str())
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(payload)
            .send()
            .await?;
        let body = check_status(response).await?.text().await?;
        parse_json(&body, "computeRouteMatrix")
    }

    /// Starts fetching travel times for every pair in `request.selection`.
    ///
    /// The cost gate runs here, before any request is sent.
    ///
    /// # Errors
    ///
    /// - [`GmapsError::SelectionMismatch`] if the selection does not fit the
    ///   given origins and destinations.
    /// - [`GmapsError::UserAborted`] if the cost confirmation is declined.
    pub fn fetch_route_matrix<'a>(
        &'a self,
        request: RouteMatrixRequest<'a>,
        cost_gate: &CostGate,
        confirm: &impl Confirm,
    ) -> Result<RouteMatrixFetch<'a>, GmapsError> {
        let selection = request.selection;
        if selection.n_origins() > request.origins.len()
            || selection.n_destinations() > request.destinations.len()
        {
            return Err(GmapsError::SelectionMismatch {
                selection_origins: selection.n_origins(),
                selection_destinations: selection.n_destinations(),
                origins: request.origins.len(),
                destinations: request.destinations.len(),
            });
        }

        cost_gate.check(selection.len(), confirm)?;

        let batches = plan_batches(selection, max_batch_side(request.travel_mode));
        tracing::info!(
            pairs = selection.len(),
            batches = batches.len(),
            travel_mode = %request.travel_mode,
            "planned route matrix fetch"
        );

        Ok(RouteMatrixFetch {
            client: self,
            request,
            total: batches.len(),
            batches: batches.into_iter(),
            sent: 0,
            finished: false,
        })
    }
}

/// Cursor over the batches of one route matrix fetch.
///
/// Not `Clone`: every batch is requested at most once. After the last batch
/// or the first error, [`next_batch`](Self::next_batch) keeps returning
/// `None`.
pub struct RouteMatrixFetch<'a> {
    client: &'a GmapsClient,
    request: RouteMatrixRequest<'a>,
    batches: std::vec::IntoIter<MatrixBatch>,
    total: usize,
    sent: usize,
    finished: bool,
}

impl RouteMatrixFetch<'_> {
    #[must_use]
    pub fn total_batches(&self) -> usize {
        self.total
    }

    /// Batches not yet requested; `0` once the fetch has finished.
    #[must_use]
    pub fn remaining_batches(&self) -> usize {
        if self.finished {
            0
        } else {
            self.batches.len()
        }
    }

    /// Requests the next batch and returns its entries with global indices.
    pub async fn next_batch(&mut self) -> Option<Result<Vec<RouteEntry>, GmapsError>> {
        if self.finished {
            return None;
        }
        let Some(batch) = self.batches.next() else {
            self.finished = true;
            return None;
        };
        self.sent += 1;

        let origins: Vec<GeoPoint> = batch
            .origins
            .iter()
            .map(|&i| self.request.origins[i])
            .collect();
        let destinations: Vec<GeoPoint> = batch
            .destinations
            .iter()
            .map(|&i| self.request.destinations[i])
            .collect();
        let payload = build_payload(
            &origins,
            &destinations,
            self.request.travel_mode,
            self.request.departure_time,
        );

        tracing::info!(
            batch = self.sent,
            batches = self.total,
            elements = batch.elements(),
            "requesting route matrix batch"
        );

        match self.client.compute_route_matrix(&payload).await {
            Ok(entries) => Some(Ok(to_global(&batch, entries))),
            Err(err) => {
                self.finished = true;
                tracing::error!(batch = self.sent, error = %err, "route matrix batch failed");
                Some(Err(err))
            }
        }
    }

    /// Drains the cursor into one list.
    ///
    /// # Errors
    ///
    /// Returns the first batch error; entries from earlier batches are lost.
    pub async fn try_collect(mut self) -> Result<Vec<RouteEntry>, GmapsError> {
        let mut entries = Vec::with_capacity(self.request.selection.len());
        while let Some(batch) = self.next_batch().await {
            entries.extend(batch?);
        }
        Ok(entries)
    }
}

/// Maps local response indices back to the caller's indices, dropping
/// elements that point outside the batch.
fn to_global(batch: &MatrixBatch, entries: Vec<RouteEntry>) -> Vec<RouteEntry> {
    entries
        .into_iter()
        .filter_map(|mut entry| {
            let origin = batch.origins.get(entry.origin_index);
            let destination = batch.destinations.get(entry.destination_index);
            match (origin, destination) {
                (Some(&origin), Some(&destination)) => {
                    entry.origin_index = origin;
                    entry.destination_index = destination;
                    Some(entry)
                }
                _ => {
                    tracing::warn!(
                        origin_index = entry.origin_index,
                        destination_index = entry.destination_index,
                        origins = batch.origins.len(),
                        destinations = batch.destinations.len(),
                        "dropping route matrix element outside its batch"
                    );
                    None
                }
            }
        })
        .collect()
}

//! `spacetime build`: lay out a grid, query travel times and export it.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Args;
use spacetime_core::{AppConfig, GeoPoint, Grid, MapView, TravelMode};
use spacetime_gmaps::{
    BackoffPolicy, Confirm, CostGate, GmapsClient, RouteMatrixFetch, RouteMatrixRequest,
};

use crate::prompt::{ask, AssumeYes, Cancelled, StdinConfirm};

/// Width and height of the exported map image in pixels.
const SIZE_PIXELS: u32 = 640;

#[derive(Debug, Args)]
pub(crate) struct BuildArgs {
    /// Name of the output directory under the assets directory
    #[arg(long)]
    pub(crate) output_name: String,
    /// Map center as latitude and longitude
    #[arg(
        long,
        num_args = 2,
        value_names = ["LAT", "LNG"],
        allow_negative_numbers = true,
        required = true
    )]
    pub(crate) center: Vec<f64>,
    /// Map zoom level (0-21)
    #[arg(long, default_value_t = 14)]
    pub(crate) zoom: u8,
    /// Number of grid points per side
    #[arg(long, default_value_t = 19)]
    pub(crate) grid_size: usize,
    /// Only query pairs closer than this in the [0,1]x[0,1] map space; the
    /// rest are approximated from shorter routes
    #[arg(long, default_value_t = 0.12)]
    pub(crate) max_normalized_distance: f64,
    /// DRIVE, TRANSIT or WALK
    #[arg(long, default_value = "drive")]
    pub(crate) travel_mode: TravelMode,
    /// Departure time for transit routes, RFC 3339 (e.g. 2024-05-06T08:00:00Z)
    #[arg(long, value_parser = parse_departure_time)]
    pub(crate) departure_time: Option<DateTime<Utc>>,
    /// Keep raw grid points instead of snapping them to roads
    #[arg(long)]
    pub(crate) no_snap: bool,
    /// Answer yes to every confirmation
    #[arg(long, short = 'y')]
    pub(crate) yes: bool,
}

impl BuildArgs {
    fn center(&self) -> anyhow::Result<GeoPoint> {
        match self.center.as_slice() {
            [lat, lng] => Ok(GeoPoint::new(*lat, *lng)),
            other => anyhow::bail!("--center takes LAT LNG, got {} values", other.len()),
        }
    }
}

pub(crate) fn parse_departure_time(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp such as 2024-05-06T08:00:00Z: {e}"))
}

/// Builds the grid described by `args` and writes `grid_data.json` and
/// `map.png` into `<assets_dir>/<output_name>`.
///
/// # Errors
///
/// Returns an error if the API key is missing, the view is invalid, any Maps
/// request fails, or the output cannot be written. Declined confirmations
/// surface as [`Cancelled`] or `GmapsError::UserAborted`.
pub(crate) async fn run_build(config: &AppConfig, args: &BuildArgs) -> anyhow::Result<()> {
    let view = MapView::new(args.center()?, args.zoom, SIZE_PIXELS)?;

    let output_dir = config.assets_dir.join(&args.output_name);
    if output_dir.exists()
        && !args.yes
        && !ask(&format!("{} already exists. Overwrite?", output_dir.display()))
    {
        return Err(Cancelled(format!("{} left untouched", output_dir.display())).into());
    }

    let api_key = config.require_gmaps_api_key()?;
    let backoff = BackoffPolicy::fixed(
        config.rate_limit_max_attempts,
        Duration::from_secs(config.rate_limit_delay_secs),
    );
    let client = GmapsClient::new(api_key, config.request_timeout_secs, backoff)
        .map_err(|e| anyhow::anyhow!("failed to build Maps client: {e}"))?;

    let map_image = client.static_map(&view, &[]).await?;

    let mut grid = if args.no_snap {
        Grid::unsnapped(view, args.grid_size, args.travel_mode)?
    } else {
        Grid::snapped(
            view,
            args.grid_size,
            args.travel_mode,
            &client,
            config.max_snap_drift,
        )
        .await?
    };

    let points = grid.snapped_locations();
    let selection = grid.select_pairs(args.max_normalized_distance)?;
    println!(
        "Querying {} of {} pairs ({} grid points)",
        selection.len(),
        points.len() * points.len().saturating_sub(1) / 2,
        points.len()
    );

    let request = RouteMatrixRequest {
        origins: &points,
        destinations: &points,
        selection: &selection,
        travel_mode: args.travel_mode,
        departure_time: args.departure_time,
    };
    let gate = CostGate::with_threshold(config.cost_confirm_threshold_dollars);
    let fetch = if args.yes {
        start_fetch(&client, request, &gate, &AssumeYes)?
    } else {
        start_fetch(&client, request, &gate, &StdinConfirm)?
    };
    let entries = fetch.try_collect().await?;
    tracing::info!(entries = entries.len(), "route matrix fetched");

    grid.attach_route_matrix(entries)?;
    write_output(&output_dir, &grid, &map_image)?;

    println!("Exported to {}", output_dir.display());
    Ok(())
}

fn start_fetch<'a>(
    client: &'a GmapsClient,
    request: RouteMatrixRequest<'a>,
    gate: &CostGate,
    confirm: &impl Confirm,
) -> anyhow::Result<RouteMatrixFetch<'a>> {
    Ok(client.fetch_route_matrix(request, gate, confirm)?)
}

fn write_output(output_dir: &Path, grid: &Grid, map_image: &[u8]) -> anyhow::Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let artifact = grid.to_artifact();
    let json = serde_json::to_vec(&artifact)?;
    let data_path = output_dir.join("grid_data.json");
    std::fs::write(&data_path, json)
        .with_context(|| format!("writing {}", data_path.display()))?;

    let map_path = output_dir.join("map.png");
    std::fs::write(&map_path, map_image)
        .with_context(|| format!("writing {}", map_path.display()))?;
    Ok(())
}

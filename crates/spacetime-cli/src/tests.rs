use std::path::{Path, PathBuf};

use spacetime_core::TravelMode;

use super::*;

fn parse_build(extra: &[&str]) -> BuildArgs {
    let mut argv = vec![
        "spacetime",
        "build",
        "--output-name",
        "seattle",
        "--center",
        "47.6062",
        "-122.3321",
    ];
    argv.extend_from_slice(extra);
    match Cli::try_parse_from(argv).expect("expected valid cli args").command {
        Commands::Build(args) => args,
        other => panic!("expected build, got {other:?}"),
    }
}

#[test]
fn build_defaults_match_export_settings() {
    let args = parse_build(&[]);
    assert_eq!(args.output_name, "seattle");
    assert_eq!(args.center, vec![47.6062, -122.3321]);
    assert_eq!(args.zoom, 14);
    assert_eq!(args.grid_size, 19);
    assert!((args.max_normalized_distance - 0.12).abs() < f64::EPSILON);
    assert_eq!(args.travel_mode, TravelMode::Drive);
    assert!(args.departure_time.is_none());
    assert!(!args.no_snap);
    assert!(!args.yes);
}

#[test]
fn build_accepts_transit_with_departure_time() {
    let args = parse_build(&[
        "--travel-mode",
        "TRANSIT",
        "--departure-time",
        "2024-05-06T10:00:00+02:00",
        "--grid-size",
        "9",
        "--no-snap",
        "-y",
    ]);
    assert_eq!(args.travel_mode, TravelMode::Transit);
    assert_eq!(
        args.departure_time.map(|t| t.to_rfc3339()),
        Some("2024-05-06T08:00:00+00:00".to_owned())
    );
    assert_eq!(args.grid_size, 9);
    assert!(args.no_snap);
    assert!(args.yes);
}

#[test]
fn build_rejects_free_text_departure_time() {
    let result = Cli::try_parse_from([
        "spacetime",
        "build",
        "--output-name",
        "x",
        "--center",
        "1",
        "2",
        "--departure-time",
        "monday 10am",
    ]);
    assert!(result.is_err());
}

#[test]
fn build_rejects_unknown_travel_mode() {
    let result = Cli::try_parse_from([
        "spacetime",
        "build",
        "--output-name",
        "x",
        "--center",
        "1",
        "2",
        "--travel-mode",
        "bicycle",
    ]);
    assert!(result.is_err());
}

#[test]
fn build_requires_both_center_coordinates() {
    let result = Cli::try_parse_from([
        "spacetime",
        "build",
        "--output-name",
        "x",
        "--center",
        "47.6",
    ]);
    assert!(result.is_err());
}

#[test]
fn build_requires_output_name() {
    let result = Cli::try_parse_from(["spacetime", "build", "--center", "1", "2"]);
    assert!(result.is_err());
}

#[test]
fn parses_densify_command() {
    let cli = Cli::try_parse_from(["spacetime", "densify", "seattle/grid_data.json"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Densify { ref input_file, force: false }
            if input_file == Path::new("seattle/grid_data.json")
    ));
}

#[test]
fn parses_densify_force() {
    let cli = Cli::try_parse_from(["spacetime", "densify", "/tmp/grid.json", "--force"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Densify { force: true, .. }));
}

#[test]
fn no_command_is_an_error() {
    assert!(Cli::try_parse_from(["spacetime"]).is_err());
}

#[test]
fn densify_input_resolves_against_assets_dir() {
    let assets = Path::new("/srv/assets");
    assert_eq!(
        densify::resolve_input(assets, Path::new("seattle/grid_data.json")),
        PathBuf::from("/srv/assets/seattle/grid_data.json")
    );
    assert_eq!(
        densify::resolve_input(assets, Path::new("/data/grid.json")),
        PathBuf::from("/data/grid.json")
    );
    assert_eq!(
        densify::resolve_input(assets, Path::new("./grid.json")),
        PathBuf::from("./grid.json")
    );
}

#[test]
fn departure_time_is_normalized_to_utc() {
    let parsed = build::parse_departure_time("2024-05-06T08:00:00Z").expect("valid");
    assert_eq!(parsed.to_rfc3339(), "2024-05-06T08:00:00+00:00");
    assert!(build::parse_departure_time("2024-05-06").is_err());
}

#[test]
fn cancellation_is_recognised() {
    let declined: anyhow::Error = Cancelled("kept".to_owned()).into();
    assert!(is_cancellation(&declined));

    let aborted: anyhow::Error = GmapsError::UserAborted {
        pairs: 900,
        dollars: 4.5,
    }
    .into();
    assert!(is_cancellation(&aborted));

    let other = anyhow::anyhow!("network down");
    assert!(!is_cancellation(&other));
}

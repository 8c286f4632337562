//! Google Maps Platform client for the spacetime grid builder.
//!
//! Reverse geocoding for road snapping, static map images, and batched route
//! matrix requests with a cost gate and rate-limit retries.

pub mod batch;
pub mod client;
pub mod cost;
pub mod error;
pub mod matrix;
pub mod retry;
pub mod snap;
pub mod static_map;
pub mod types;

pub use batch::{max_batch_side, plan_batches, MatrixBatch};
pub use client::GmapsClient;
pub use cost::{Confirm, CostGate, DOLLARS_PER_ELEMENT};
pub use error::GmapsError;
pub use matrix::{build_payload, RouteMatrixFetch, RouteMatrixRequest};
pub use retry::{is_rate_limited, BackoffPolicy};
pub use snap::{select_resolution, SNAP_RESULT_TYPES};

//! Travel-time query results.
//!
//! [`RouteEntry`] keeps the travel-time API's element shape (camelCase keys,
//! `duration` as a `"1111s"` string) so the persisted `route_matrix` stays
//! readable by the map frontend.

use serde::{Deserialize, Serialize};

/// Whether a route was found between a queried pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteCondition {
    RouteExists,
    RouteNotFound,
    #[default]
    #[serde(other)]
    RouteMatrixElementConditionUnspecified,
}

/// One queried origin/destination pair.
///
/// Indices are flat positions into the grid's row-major cell list. The API
/// omits zero-valued fields, so a missing index decodes as `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    #[serde(default)]
    pub origin_index: usize,
    #[serde(default)]
    pub destination_index: usize,
    #[serde(
        rename = "duration",
        default,
        with = "duration_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<serde_json::Value>,
    #[serde(default)]
    pub condition: RouteCondition,
}

impl RouteEntry {
    /// Duration of an existing route, or `None` when the entry carries no
    /// usable travel time.
    #[must_use]
    pub fn usable_duration(&self) -> Option<u64> {
        match self.condition {
            RouteCondition::RouteExists => self.duration_seconds,
            _ => None,
        }
    }
}

mod duration_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub(super) fn serialize<S: Serializer>(value: &Option<u64>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(secs) => s.serialize_str(&format!("{secs}s")),
            None => s.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        let Some(raw) = Option::<String>::deserialize(d)? else {
            return Ok(None);
        };
        let number = raw.strip_suffix('s').unwrap_or(&raw);
        let secs: f64 = number
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid duration '{raw}'")))?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(de::Error::custom(format!("invalid duration '{raw}'")));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Some(secs.round() as u64))
    }
}

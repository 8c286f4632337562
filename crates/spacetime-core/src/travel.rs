use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How travel times are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TravelMode {
    #[default]
    Drive,
    Transit,
    Walk,
}

impl TravelMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Drive => "DRIVE",
            TravelMode::Transit => "TRANSIT",
            TravelMode::Walk => "WALK",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DRIVE" => Ok(TravelMode::Drive),
            "TRANSIT" => Ok(TravelMode::Transit),
            "WALK" => Ok(TravelMode::Walk),
            _ => Err(format!(
                "unknown travel mode '{s}' (expected drive, transit or walk)"
            )),
        }
    }
}

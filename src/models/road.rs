//! Road conditions: closures and weather.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Static weather label on a road leg.
///
/// Each label slows vehicles by a fixed multiplier of their cruise speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    /// No slowdown.
    #[default]
    #[serde(alias = "Sol", alias = "sun")]
    Clear,
    /// 85% of cruise speed.
    #[serde(alias = "Chuva")]
    Rain,
    /// 70% of cruise speed.
    #[serde(alias = "Nevoeiro")]
    Fog,
    /// 50% of cruise speed.
    #[serde(rename = "snow", alias = "Neve/Gelo", alias = "ice")]
    SnowIce,
}

impl Weather {
    /// All labels.
    pub const ALL: [Weather; 4] = [Weather::Clear, Weather::Rain, Weather::Fog, Weather::SnowIce];

    /// Multiplier applied to cruise speed.
    pub fn speed_factor(self) -> f64 {
        match self {
            Weather::Clear => 1.0,
            Weather::Rain => 0.85,
            Weather::Fog => 0.7,
            Weather::SnowIce => 0.5,
        }
    }

    /// Canonical lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Weather::Clear => "clear",
            Weather::Rain => "rain",
            Weather::Fog => "fog",
            Weather::SnowIce => "snow",
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weather {
    type Err = String;

    /// Unrecognized labels are an error; callers wanting the clear default
    /// should use `unwrap_or_default`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "clear" | "sol" | "sun" => Ok(Weather::Clear),
            "rain" | "chuva" => Ok(Weather::Rain),
            "fog" | "nevoeiro" => Ok(Weather::Fog),
            "snow" | "ice" | "snow/ice" | "neve/gelo" => Ok(Weather::SnowIce),
            other => Err(format!("unknown weather `{other}`")),
        }
    }
}

/// Per-road state fixed for the duration of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadCondition {
    /// Closed roads are never traversed.
    pub closed: bool,
    /// Weather on the leg.
    pub weather: Weather,
}

impl RoadCondition {
    /// An open road in clear weather.
    pub fn open() -> Self {
        Self::default()
    }

    /// A closed road.
    pub fn closed() -> Self {
        Self {
            closed: true,
            weather: Weather::Clear,
        }
    }

    /// Sets the weather.
    pub fn with_weather(mut self, weather: Weather) -> Self {
        self.weather = weather;
        self
    }
}

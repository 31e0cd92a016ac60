//! Scheduler configuration.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};

/// How vehicle inventories behave across a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceMode {
    /// One pass; inventories are never depleted.
    Unlimited,
    /// Inventories deplete on commit and are restored between rounds.
    Bounded,
}

impl ResourceMode {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceMode::Unlimited => "unlimited",
            ResourceMode::Bounded => "bounded",
        }
    }
}

impl fmt::Display for ResourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceMode {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unlimited" => Ok(ResourceMode::Unlimited),
            "bounded" | "limited" => Ok(ResourceMode::Bounded),
            _ => Err(DispatchError::UnknownMode(s.to_owned())),
        }
    }
}

/// Weights of the urgency score
/// `priority × priority_weight + deadline_scale / (hours_remaining + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyWeights {
    /// Multiplier on zone priority.
    pub priority_weight: f64,
    /// Numerator of the deadline decay term.
    pub deadline_scale: f64,
}

impl Default for UrgencyWeights {
    fn default() -> Self {
        Self {
            priority_weight: 100.0,
            deadline_scale: 1000.0,
        }
    }
}

/// Tunables for a dispatch run.
///
/// # Examples
///
/// ```
/// use relief_dispatch::dispatch::DispatchConfig;
///
/// let config = DispatchConfig::from_json_str(r#"{ "max_rounds": 8, "parallel": false }"#).unwrap();
/// assert_eq!(config.max_rounds, 8);
/// assert!(!config.parallel);
/// assert_eq!(config.urgency.priority_weight, 100.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Urgency score weights.
    pub urgency: UrgencyWeights,
    /// Cap on bounded-mode rounds.
    pub max_rounds: usize,
    /// Evaluate candidates on the rayon pool.
    pub parallel: bool,
    /// Only send vehicle kinds the destination accepts.
    pub respect_accessibility: bool,
    /// Exclude kinds whose range is shorter than the longest leg.
    pub enforce_leg_range: bool,
    /// Simulated clock origin. Falls back to the start passed to the
    /// scheduler, then to the current time.
    pub start_time: Option<NaiveDateTime>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            urgency: UrgencyWeights::default(),
            max_rounds: 64,
            parallel: true,
            respect_accessibility: true,
            enforce_leg_range: true,
            start_time: None,
        }
    }
}

impl DispatchConfig {
    /// Parses a JSON config document; missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the urgency weights.
    pub fn with_urgency(mut self, priority_weight: f64, deadline_scale: f64) -> Self {
        self.urgency = UrgencyWeights {
            priority_weight,
            deadline_scale,
        };
        self
    }

    /// Sets the bounded-mode round cap.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Enables or disables parallel candidate evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enables or disables the accessibility filter.
    pub fn with_accessibility(mut self, respect: bool) -> Self {
        self.respect_accessibility = respect;
        self
    }

    /// Enables or disables the leg-range filter.
    pub fn with_leg_range(mut self, enforce: bool) -> Self {
        self.enforce_leg_range = enforce;
        self
    }

    /// Sets the simulated clock origin.
    pub fn with_start_time(mut self, start: NaiveDateTime) -> Self {
        self.start_time = Some(start);
        self
    }

    /// Rejects weights that are negative or not finite, and a zero round cap.
    pub fn validate(&self) -> Result<()> {
        let UrgencyWeights {
            priority_weight,
            deadline_scale,
        } = self.urgency;
        if !priority_weight.is_finite() || priority_weight < 0.0 {
            return Err(DispatchError::InvalidConfig(format!(
                "priority_weight must be finite and non-negative, got {priority_weight}"
            )));
        }
        if !deadline_scale.is_finite() || deadline_scale < 0.0 {
            return Err(DispatchError::InvalidConfig(format!(
                "deadline_scale must be finite and non-negative, got {deadline_scale}"
            )));
        }
        if self.max_rounds == 0 {
            return Err(DispatchError::InvalidConfig("max_rounds must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DispatchConfig::default();
        assert_eq!(config.urgency.priority_weight, 100.0);
        assert_eq!(config.urgency.deadline_scale, 1000.0);
        assert_eq!(config.max_rounds, 64);
        assert!(config.parallel);
        assert!(config.respect_accessibility);
        assert!(config.enforce_leg_range);
        assert!(config.start_time.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mode_names() {
        assert_eq!("Bounded".parse::<ResourceMode>().expect("mode"), ResourceMode::Bounded);
        assert_eq!(" unlimited ".parse::<ResourceMode>().expect("mode"), ResourceMode::Unlimited);
        let err = "infinite".parse::<ResourceMode>().unwrap_err();
        assert!(matches!(err, DispatchError::UnknownMode(name) if name == "infinite"));
        assert_eq!(ResourceMode::Bounded.to_string(), "bounded");
    }

    #[test]
    fn test_builder() {
        let start = crate::models::parse_deadline("2024-11-20 08:00:00").expect("valid");
        let config = DispatchConfig::default()
            .with_urgency(10.0, 50.0)
            .with_max_rounds(3)
            .with_parallel(false)
            .with_accessibility(false)
            .with_leg_range(false)
            .with_start_time(start);
        assert_eq!(config.urgency.deadline_scale, 50.0);
        assert_eq!(config.max_rounds, 3);
        assert!(!config.parallel && !config.respect_accessibility && !config.enforce_leg_range);
        assert_eq!(config.start_time, Some(start));
    }

    #[test]
    fn test_validate_rejects() {
        assert!(matches!(
            DispatchConfig::default().with_max_rounds(0).validate(),
            Err(DispatchError::InvalidConfig(_))
        ));
        assert!(DispatchConfig::default().with_urgency(-1.0, 10.0).validate().is_err());
        assert!(DispatchConfig::default().with_urgency(1.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_json() {
        let config = DispatchConfig::from_json_str(
            r#"{ "urgency": { "priority_weight": 5.0 }, "start_time": "2024-11-20T08:00:00" }"#,
        )
        .expect("parse");
        assert_eq!(config.urgency.priority_weight, 5.0);
        assert_eq!(config.urgency.deadline_scale, 1000.0);
        assert!(config.start_time.is_some());

        assert!(matches!(DispatchConfig::from_json_str("{"), Err(DispatchError::Input(_))));
        assert!(matches!(
            DispatchConfig::from_json_str(r#"{ "max_rounds": 0 }"#),
            Err(DispatchError::InvalidConfig(_))
        ));
    }
}

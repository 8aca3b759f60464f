//! ---
//! ems_section: "02-generation-model"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Generation-mix derivation pipeline and shared series types."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Historical window requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RangeSelector {
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "48h")]
    TwoDays,
    #[serde(rename = "7d")]
    Week,
}

impl RangeSelector {
    pub const ALL: [RangeSelector; 3] = [
        RangeSelector::Day,
        RangeSelector::TwoDays,
        RangeSelector::Week,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeSelector::Day => "24h",
            RangeSelector::TwoDays => "48h",
            RangeSelector::Week => "7d",
        }
    }

    /// Total span covered by the range, in hours.
    pub fn span_hours(&self) -> u32 {
        match self {
            RangeSelector::Day => 24,
            RangeSelector::TwoDays => 48,
            RangeSelector::Week => 24 * 7,
        }
    }

    /// Sampling step in minutes: coarser for the weekly view.
    pub fn step_minutes(&self) -> u32 {
        match self {
            RangeSelector::Week => 30,
            RangeSelector::Day | RangeSelector::TwoDays => 15,
        }
    }

    /// Number of samples on the axis, both endpoints included.
    pub fn point_count(&self) -> usize {
        (self.span_hours() * 60 / self.step_minutes()) as usize + 1
    }

    pub fn span(&self) -> Duration {
        Duration::hours(i64::from(self.span_hours()))
    }

    pub fn step(&self) -> Duration {
        Duration::minutes(i64::from(self.step_minutes()))
    }
}

impl fmt::Display for RangeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RangeSelector {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "24h" => Ok(RangeSelector::Day),
            "48h" => Ok(RangeSelector::TwoDays),
            "7d" => Ok(RangeSelector::Week),
            other => Err(CoreError::UnknownRange(other.to_owned())),
        }
    }
}

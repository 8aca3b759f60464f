//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Data source adapters and fallback policy."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Provider selectable by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Offline synthetic generator.
    Mock,
    /// EirGrid transparency reports, with synthetic fallback.
    EirGrid,
    /// ENTSO-E transparency platform; requires a security token.
    Entsoe,
}

impl DataSource {
    /// Every source, in declaration order.
    pub const ALL: [DataSource; 3] = [DataSource::Mock, DataSource::EirGrid, DataSource::Entsoe];

    /// Preference order when several sources are available.
    pub const PRIORITY: [DataSource; 3] =
        [DataSource::EirGrid, DataSource::Entsoe, DataSource::Mock];

    /// Stable identifier used in configuration and on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            DataSource::Mock => "mock",
            DataSource::EirGrid => "eirgrid",
            DataSource::Entsoe => "entsoe",
        }
    }

    /// Label shown in provider selectors.
    pub fn label(&self) -> &'static str {
        match self {
            DataSource::Mock => "Mock (offline)",
            DataSource::EirGrid => "EirGrid (real-time)",
            DataSource::Entsoe => "ENTSO-E (real-time)",
        }
    }

    /// True for sources that involve a network request.
    pub fn is_live(&self) -> bool {
        !matches!(self, DataSource::Mock)
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DataSource {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        DataSource::ALL
            .into_iter()
            .find(|source| source.id().eq_ignore_ascii_case(needle) || source.label() == needle)
            .ok_or_else(|| SourceError::Configuration(format!("unknown data source '{needle}'")))
    }
}

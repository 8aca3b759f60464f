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

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Generation categories tracked for every sample. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceName {
    Wind,
    Solar,
    Hydro,
    Gas,
    Coal,
    Biomass,
    Imports,
}

impl SourceName {
    pub const ALL: [SourceName; 7] = [
        SourceName::Wind,
        SourceName::Solar,
        SourceName::Hydro,
        SourceName::Gas,
        SourceName::Coal,
        SourceName::Biomass,
        SourceName::Imports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceName::Wind => "wind",
            SourceName::Solar => "solar",
            SourceName::Hydro => "hydro",
            SourceName::Gas => "gas",
            SourceName::Coal => "coal",
            SourceName::Biomass => "biomass",
            SourceName::Imports => "imports",
        }
    }

    /// Grams of CO2 emitted per kWh generated by this source.
    pub fn emission_factor(&self) -> f64 {
        match self {
            SourceName::Wind => 12.0,
            SourceName::Solar => 50.0,
            SourceName::Hydro => 24.0,
            SourceName::Gas => 400.0,
            SourceName::Coal => 900.0,
            SourceName::Biomass => 230.0,
            // blended UK / continental interconnector average
            SourceName::Imports => 300.0,
        }
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceName::ALL
            .into_iter()
            .find(|name| name.as_str() == s.trim())
            .ok_or_else(|| CoreError::UnknownSource(s.to_owned()))
    }
}

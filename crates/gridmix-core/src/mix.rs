//! ---
//! ems_section: "02-generation-model"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Generation-mix derivation pipeline and shared series types."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

use crate::source::SourceName;

/// Per-source output weights before normalisation.
///
/// Produced by the synthetic sampler and by live payload coercion. Values are
/// expected to be non-negative but need not sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawMix {
    pub wind: f64,
    pub solar: f64,
    pub hydro: f64,
    pub gas: f64,
    pub coal: f64,
    pub biomass: f64,
    pub imports: f64,
}

impl RawMix {
    pub fn get(&self, source: SourceName) -> f64 {
        match source {
            SourceName::Wind => self.wind,
            SourceName::Solar => self.solar,
            SourceName::Hydro => self.hydro,
            SourceName::Gas => self.gas,
            SourceName::Coal => self.coal,
            SourceName::Biomass => self.biomass,
            SourceName::Imports => self.imports,
        }
    }

    pub fn set(&mut self, source: SourceName, value: f64) {
        let slot = match source {
            SourceName::Wind => &mut self.wind,
            SourceName::Solar => &mut self.solar,
            SourceName::Hydro => &mut self.hydro,
            SourceName::Gas => &mut self.gas,
            SourceName::Coal => &mut self.coal,
            SourceName::Biomass => &mut self.biomass,
            SourceName::Imports => &mut self.imports,
        };
        *slot = value;
    }

    /// Sum of all seven weights. Informational only.
    pub fn total(&self) -> f64 {
        SourceName::ALL.iter().map(|source| self.get(*source)).sum()
    }
}

/// Builds a raw mix from a partial mapping; unspecified sources stay at zero.
impl FromIterator<(SourceName, f64)> for RawMix {
    fn from_iter<I: IntoIterator<Item = (SourceName, f64)>>(iter: I) -> Self {
        let mut raw = RawMix::default();
        for (source, value) in iter {
            raw.set(source, value);
        }
        raw
    }
}

/// Normalised fractional breakdown of generation at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationMix {
    pub wind: f64,
    pub solar: f64,
    pub hydro: f64,
    pub gas: f64,
    pub coal: f64,
    pub biomass: f64,
    pub imports: f64,
}

/// Distribution returned when the raw weights carry no usable signal.
pub const FALLBACK_MIX: GenerationMix = GenerationMix {
    wind: 0.30,
    solar: 0.05,
    hydro: 0.05,
    gas: 0.45,
    coal: 0.05,
    biomass: 0.05,
    imports: 0.05,
};

impl GenerationMix {
    pub fn get(&self, source: SourceName) -> f64 {
        match source {
            SourceName::Wind => self.wind,
            SourceName::Solar => self.solar,
            SourceName::Hydro => self.hydro,
            SourceName::Gas => self.gas,
            SourceName::Coal => self.coal,
            SourceName::Biomass => self.biomass,
            SourceName::Imports => self.imports,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SourceName, f64)> + '_ {
        SourceName::ALL
            .into_iter()
            .map(move |source| (source, self.get(source)))
    }

    pub fn total(&self) -> f64 {
        self.iter().map(|(_, fraction)| fraction).sum()
    }
}

/// Rescale raw weights into fractions summing to one.
///
/// A non-positive, NaN or infinite total yields [`FALLBACK_MIX`] instead of
/// dividing by it. Finite weights whose sum overflows are first scaled down by
/// the largest component. Negative components are not rejected here; upstream
/// producers keep their output non-negative.
pub fn normalize_mix(raw: &RawMix) -> GenerationMix {
    let mut scaled = *raw;
    let mut total = scaled.total();
    if total == f64::INFINITY {
        let largest = SourceName::ALL
            .into_iter()
            .map(|source| raw.get(source))
            .fold(0.0_f64, f64::max);
        for source in SourceName::ALL {
            scaled.set(source, raw.get(source) / largest);
        }
        total = scaled.total();
    }
    if !total.is_finite() || total <= 0.0 {
        return FALLBACK_MIX;
    }
    GenerationMix {
        wind: scaled.wind / total,
        solar: scaled.solar / total,
        hydro: scaled.hydro / total,
        gas: scaled.gas / total,
        coal: scaled.coal / total,
        biomass: scaled.biomass / total,
        imports: scaled.imports / total,
    }
}

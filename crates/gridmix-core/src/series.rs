//! ---
//! ems_section: "02-generation-model"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Generation-mix derivation pipeline and shared series types."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::axis::TimeAxis;
use crate::intensity::carbon_intensity;
use crate::mix::{normalize_mix, GenerationMix, RawMix};
use crate::range::RangeSelector;
use crate::sampler::sample_raw_mix;

/// Carbon intensity at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarbonIntensityPoint {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "gramsCO2PerKWh")]
    pub grams_co2_per_kwh: u32,
}

/// Normalised generation mix at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationMixPoint {
    pub timestamp: DateTime<Utc>,
    pub mix: GenerationMix,
}

/// Where the data in a [`SeriesBundle`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesOrigin {
    /// Generated by the synthetic sampler on request.
    Synthetic,
    /// Derived from a live feed payload.
    Live,
    /// Synthetic data substituted after a live fetch failed.
    Fallback,
}

impl SeriesOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesOrigin::Synthetic => "synthetic",
            SeriesOrigin::Live => "live",
            SeriesOrigin::Fallback => "fallback",
        }
    }

    pub fn is_synthetic(&self) -> bool {
        !matches!(self, SeriesOrigin::Live)
    }
}

/// Intensity and generation series sharing one timestamp axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesBundle {
    pub intensity: Vec<CarbonIntensityPoint>,
    pub generation: Vec<GenerationMixPoint>,
    pub origin: SeriesOrigin,
}

impl SeriesBundle {
    /// Derive both series from raw per-source weights.
    ///
    /// Each record is normalised and reduced to an intensity value; its
    /// timestamp is written to both series so they stay aligned.
    pub fn from_raw<I>(records: I, origin: SeriesOrigin) -> Self
    where
        I: IntoIterator<Item = (DateTime<Utc>, RawMix)>,
    {
        let records = records.into_iter();
        let (lower, _) = records.size_hint();
        let mut intensity = Vec::with_capacity(lower);
        let mut generation = Vec::with_capacity(lower);
        for (timestamp, raw) in records {
            let mix = normalize_mix(&raw);
            intensity.push(CarbonIntensityPoint {
                timestamp,
                grams_co2_per_kwh: carbon_intensity(&mix),
            });
            generation.push(GenerationMixPoint { timestamp, mix });
        }
        Self {
            intensity,
            generation,
            origin,
        }
    }

    /// Run the synthetic sampler over the axis for `range` ending at `now`.
    pub fn synthetic(range: RangeSelector, now: DateTime<Utc>) -> Self {
        let axis = TimeAxis::build(range, now);
        let total_points = axis.len();
        let bundle = Self::from_raw(
            axis.iter()
                .enumerate()
                .map(|(index, timestamp)| (timestamp, sample_raw_mix(timestamp, index, total_points))),
            SeriesOrigin::Synthetic,
        );
        debug!(range = %range, points = bundle.len(), "synthetic series generated");
        bundle
    }

    pub fn with_origin(mut self, origin: SeriesOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn len(&self) -> usize {
        self.intensity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intensity.is_empty()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.intensity.iter().map(|point| point.timestamp)
    }

    /// True when both series carry the same ordered timestamps.
    pub fn shares_time_axis(&self) -> bool {
        self.intensity.len() == self.generation.len()
            && self
                .intensity
                .iter()
                .zip(&self.generation)
                .all(|(ci, mix)| ci.timestamp == mix.timestamp)
    }
}

/// Synthetic series for `range` ending at `now`.
pub fn generate_synthetic_series(range: RangeSelector, now: DateTime<Utc>) -> SeriesBundle {
    SeriesBundle::synthetic(range, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 20, 9, 15, 0).unwrap()
    }

    #[test]
    fn synthetic_series_matches_axis_length() {
        assert_eq!(generate_synthetic_series(RangeSelector::Day, now()).len(), 97);
        assert_eq!(generate_synthetic_series(RangeSelector::TwoDays, now()).len(), 193);
        assert_eq!(generate_synthetic_series(RangeSelector::Week, now()).len(), 337);
    }

    #[test]
    fn both_series_share_the_axis() {
        for range in RangeSelector::ALL {
            let bundle = generate_synthetic_series(range, now());
            assert!(bundle.shares_time_axis());
            let axis = TimeAxis::build(range, now());
            assert!(bundle.timestamps().eq(axis.iter()));
        }
    }

    #[test]
    fn every_mix_sums_to_one_and_intensity_is_bounded() {
        for range in RangeSelector::ALL {
            let bundle = generate_synthetic_series(range, now());
            for point in &bundle.generation {
                assert!((point.mix.total() - 1.0).abs() < 1e-9);
                assert!(point.mix.iter().all(|(_, fraction)| fraction >= 0.0));
            }
            for point in &bundle.intensity {
                assert!((12..=900).contains(&point.grams_co2_per_kwh));
            }
        }
    }

    #[test]
    fn only_live_origin_is_real_data() {
        assert!(SeriesOrigin::Synthetic.is_synthetic());
        assert!(SeriesOrigin::Fallback.is_synthetic());
        assert!(!SeriesOrigin::Live.is_synthetic());
    }

    #[test]
    fn from_raw_uses_fallback_for_empty_weights() {
        let bundle = SeriesBundle::from_raw([(now(), RawMix::default())], SeriesOrigin::Live);
        assert_eq!(bundle.len(), 1);
        assert_eq!(bundle.generation[0].mix, crate::mix::FALLBACK_MIX);
        assert_eq!(bundle.intensity[0].grams_co2_per_kwh, 259);
        assert_eq!(bundle.origin, SeriesOrigin::Live);
    }

    #[test]
    fn serialises_intensity_with_wire_field_name() {
        let bundle = generate_synthetic_series(RangeSelector::Day, now());
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["origin"], "synthetic");
        assert!(json["intensity"][0].get("gramsCO2PerKWh").is_some());
        assert!(json["generation"][0]["mix"].get("imports").is_some());
    }
}

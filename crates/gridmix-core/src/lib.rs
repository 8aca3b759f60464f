//! ---
//! ems_section: "02-generation-model"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Generation-mix derivation pipeline and shared series types."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Computational core of the gridmix workspace.
//!
//! A request for a [`RangeSelector`] is turned into a [`TimeAxis`], each
//! timestamp is sampled into a [`RawMix`], normalised into a
//! [`GenerationMix`] and reduced to a carbon-intensity value. The same
//! normaliser and calculator are used for synthetic and live data through
//! [`SeriesBundle::from_raw`].

pub mod axis;
pub mod clock;
pub mod errors;
pub mod intensity;
pub mod mix;
pub mod range;
pub mod sampler;
pub mod series;
pub mod source;

pub use axis::{format_tick_time, TimeAxis};
pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::{CoreError, Result};
pub use intensity::carbon_intensity;
pub use mix::{normalize_mix, GenerationMix, RawMix, FALLBACK_MIX};
pub use range::RangeSelector;
pub use sampler::{hour_of_day, sample_raw_mix};
pub use series::{
    generate_synthetic_series, CarbonIntensityPoint, GenerationMixPoint, SeriesBundle,
    SeriesOrigin,
};
pub use source::SourceName;

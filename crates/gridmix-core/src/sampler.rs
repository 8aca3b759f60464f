//! ---
//! ems_section: "02-generation-model"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Generation-mix derivation pipeline and shared series types."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::f64::consts::PI;

use chrono::{DateTime, Timelike, Utc};

use crate::mix::RawMix;

/// Continuous UTC hour of day in `[0, 24)`, at minute resolution.
pub fn hour_of_day(timestamp: &DateTime<Utc>) -> f64 {
    f64::from(timestamp.hour()) + f64::from(timestamp.minute()) / 60.0
}

/// Deterministic per-source output for one sample of a series.
///
/// Wind, solar and gas follow the time of day; hydro and coal are modulated by
/// the sample `index` over the `total_points` of the series so that longer
/// ranges show multi-day swings. Output is bounded per source but not
/// normalised.
pub fn sample_raw_mix(timestamp: DateTime<Utc>, index: usize, total_points: usize) -> RawMix {
    let hour = hour_of_day(&timestamp);
    let i = index as f64;
    let points = total_points.max(1) as f64;

    // Wind peaks in the early hours.
    let wind = (0.35 + 0.20 * (2.0 * PI * (hour - 3.0) / 24.0).sin()).clamp(0.10, 0.75);

    // sin(PI) is not exactly zero in f64, so the daylight window is explicit.
    let solar_raw = if hour > 6.0 && hour < 18.0 {
        (PI * (hour - 6.0) / 12.0).sin().max(0.0)
    } else {
        0.0
    };
    let solar = (0.18 * solar_raw).clamp(0.0, 0.25);

    let hydro = 0.05 + 0.02 * (2.0 * PI * i / (points / 7.0)).sin();
    let coal = 0.04 + 0.01 * (2.0 * PI * i / (points / 3.0)).sin();
    let biomass = 0.05;

    // Gas fills in when wind and solar drop under the 0.30 baseline.
    let gas = (0.40 + 0.10 * (2.0 * PI * hour / 24.0).cos() - (wind + solar - 0.30))
        .clamp(0.05, 0.70);

    let imports = (1.0 - (wind + solar + hydro + gas + coal + biomass)).clamp(0.02, 0.20);

    RawMix {
        wind,
        solar,
        hydro,
        gas,
        coal,
        biomass,
        imports,
    }
}

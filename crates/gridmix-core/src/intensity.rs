//! ---
//! ems_section: "02-generation-model"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Generation-mix derivation pipeline and shared series types."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use crate::mix::GenerationMix;

/// Carbon intensity in grams of CO2 per kWh for a normalised mix.
///
/// The weighted sum is rounded half away from zero. For a mix summing to one
/// the result lies within the emission factor range, 12 to 900.
pub fn carbon_intensity(mix: &GenerationMix) -> u32 {
    let weighted: f64 = mix
        .iter()
        .map(|(source, fraction)| fraction * source.emission_factor())
        .sum();
    weighted.round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mix::{normalize_mix, RawMix, FALLBACK_MIX};
    use crate::source::SourceName;

    #[test]
    fn single_source_mix_matches_its_factor() {
        for source in SourceName::ALL {
            let raw: RawMix = [(source, 1.0)].into_iter().collect();
            let mix = normalize_mix(&raw);
            assert_eq!(
                f64::from(carbon_intensity(&mix)),
                source.emission_factor(),
                "{source}"
            );
        }
    }

    #[test]
    fn fallback_mix_intensity() {
        // 3.6 + 2.5 + 1.2 + 180 + 45 + 11.5 + 15 = 258.8
        assert_eq!(carbon_intensity(&FALLBACK_MIX), 259);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        let raw: RawMix = [(SourceName::Wind, 0.75), (SourceName::Hydro, 0.25)]
            .into_iter()
            .collect();
        // 0.75 * 12 + 0.25 * 24 = 15.0
        assert_eq!(carbon_intensity(&normalize_mix(&raw)), 15);

        let raw: RawMix = [(SourceName::Wind, 0.5), (SourceName::Hydro, 0.5)]
            .into_iter()
            .collect();
        // 6 + 12 = 18
        assert_eq!(carbon_intensity(&normalize_mix(&raw)), 18);

        let raw: RawMix = [(SourceName::Wind, 0.875), (SourceName::Hydro, 0.125)]
            .into_iter()
            .collect();
        // 10.5 + 3 = 13.5
        assert_eq!(carbon_intensity(&normalize_mix(&raw)), 14);
    }
}

//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Command line client for generation mix and carbon intensity series."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use gridmix_core::{RangeSelector, SeriesBundle, SourceName};
use gridmix_sources::GenerationReport;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeriesDocument<'a> {
    source: &'static str,
    label: &'static str,
    range: RangeSelector,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback_cause: Option<String>,
    #[serde(flatten)]
    series: &'a SeriesBundle,
}

/// Open the output target; `None` and `-` both mean stdout.
pub fn open(target: Option<&Path>) -> Result<Box<dyn Write>> {
    match target {
        Some(path) if path != Path::new("-") => {
            let file = File::create(path)
                .with_context(|| format!("unable to create output file {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        _ => Ok(Box::new(io::stdout().lock())),
    }
}

pub fn write_json<W: Write>(writer: &mut W, report: &GenerationReport) -> Result<()> {
    let document = SeriesDocument {
        source: report.source.id(),
        label: report.source.label(),
        range: report.range,
        fallback_cause: report.fallback_cause.as_ref().map(ToString::to_string),
        series: &report.series,
    };
    serde_json::to_writer_pretty(&mut *writer, &document)?;
    writeln!(writer)?;
    Ok(())
}

/// One row per timestamp: intensity followed by the seven shares.
pub fn write_csv<W: Write>(writer: &mut W, series: &SeriesBundle) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    let mut header = vec!["timestamp", "grams_co2_per_kwh"];
    header.extend(SourceName::ALL.iter().map(SourceName::as_str));
    out.write_record(&header)?;

    for (intensity, generation) in series.intensity.iter().zip(&series.generation) {
        let mut row = vec![
            intensity
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            intensity.grams_co2_per_kwh.to_string(),
        ];
        row.extend(generation.mix.iter().map(|(_, share)| share.to_string()));
        out.write_record(&row)?;
    }
    out.flush()?;
    Ok(())
}

//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Data source adapters and fallback policy."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gridmix_core::{RangeSelector, RawMix, SourceName};
use serde_json::Value;

use crate::error::FetchError;
use crate::source::DataSource;

/// Time window requested from a live feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedRequest {
    /// Range the window was derived from.
    pub range: RangeSelector,
    /// Inclusive start of the window.
    pub start: DateTime<Utc>,
    /// Inclusive end of the window; also the request's reference "now".
    pub end: DateTime<Utc>,
}

impl FeedRequest {
    /// Window covering `range` and ending at `now`.
    pub fn for_range(range: RangeSelector, now: DateTime<Utc>) -> Self {
        Self {
            range,
            start: now - range.span(),
            end: now,
        }
    }
}

/// One live sample after field-by-field coercion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawGenerationRecord {
    /// Sample instant.
    pub timestamp: DateTime<Utc>,
    /// Per-source weights, never negative.
    pub mix: RawMix,
    /// Upstream-reported total, informational only.
    pub total: f64,
}

/// Async interface implemented by live generation feeds.
#[async_trait]
pub trait GenerationFeed: Send + Sync {
    /// Source this feed talks to.
    fn data_source(&self) -> DataSource;

    /// Fetch raw records for the requested window.
    ///
    /// Implementations need not enforce a timeout; the adapter wraps every
    /// call in the per-source deadline.
    async fn fetch(&self, request: &FeedRequest) -> Result<Vec<RawGenerationRecord>, FetchError>;
}

/// Coerce a decoded JSON payload into raw generation records.
///
/// The payload must be a non-empty array. Each element contributes one
/// record: `timestamp` (or `time`) is read as RFC 3339, defaulting to
/// `fallback_timestamp`; numeric fields accept numbers or numeric strings and
/// default to zero when missing, unparseable, negative or non-finite.
///
/// Records are kept even without a timestamp, so several of them can share
/// `fallback_timestamp` and the resulting series may repeat that instant.
pub fn coerce_payload(
    data_source: DataSource,
    payload: Value,
    fallback_timestamp: DateTime<Utc>,
) -> Result<Vec<RawGenerationRecord>, FetchError> {
    let Value::Array(items) = payload else {
        return Err(FetchError::MalformedPayload {
            data_source,
            reason: format!("expected a JSON array, found {}", json_kind(&payload)),
        });
    };
    if items.is_empty() {
        return Err(FetchError::MalformedPayload {
            data_source,
            reason: "payload contained no records".to_owned(),
        });
    }
    Ok(items
        .iter()
        .map(|item| coerce_record(item, fallback_timestamp))
        .collect())
}

fn coerce_record(item: &Value, fallback_timestamp: DateTime<Utc>) -> RawGenerationRecord {
    let mix = SourceName::ALL
        .into_iter()
        .map(|source| (source, coerce_number(item.get(source.as_str()))))
        .collect();
    RawGenerationRecord {
        timestamp: coerce_timestamp(item).unwrap_or(fallback_timestamp),
        mix,
        total: coerce_number(item.get("total")),
    }
}

fn coerce_timestamp(item: &Value) -> Option<DateTime<Utc>> {
    ["timestamp", "time"]
        .into_iter()
        .filter_map(|key| item.get(key).and_then(Value::as_str))
        .find(|raw| !raw.trim().is_empty())
        .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn coerce_number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(raw)) => raw.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|number| number.is_finite())
        .map(|number| number.max(0.0))
        .unwrap_or(0.0)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

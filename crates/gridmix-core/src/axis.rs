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

use crate::range::RangeSelector;

/// Ordered sample timestamps for one request.
///
/// Starts at `now - span` and advances by the range step up to and including
/// `now`. Built once per request and shared by both output series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeAxis {
    range: RangeSelector,
    timestamps: Vec<DateTime<Utc>>,
}

impl TimeAxis {
    pub fn build(range: RangeSelector, now: DateTime<Utc>) -> Self {
        let start = now - range.span();
        let step = range.step();
        let timestamps = (0..range.point_count())
            .map(|i| start + step * i as i32)
            .collect();
        Self { range, timestamps }
    }

    pub fn range(&self) -> RangeSelector {
        self.range
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn iter(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.timestamps.iter().copied()
    }
}

/// `HH:MM` tick label (UTC) for chart axes.
pub fn format_tick_time(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%H:%M").to_string()
}

//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Data source adapters and fallback policy."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::sync::atomic::{AtomicU64, Ordering};

use gridmix_core::{RangeSelector, SeriesBundle};
use tracing::debug;

use crate::error::Result;
use crate::source::DataSource;

/// Identifies one generation request issued by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    /// Monotonic sequence number, starting at 1.
    pub seq: u64,
    /// Source requested.
    pub source: DataSource,
    /// Range requested.
    pub range: RangeSelector,
}

/// Hands out request tickets so late responses for superseded requests can
/// be discarded by the caller.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    /// Create a sequencer with no outstanding requests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request; every earlier ticket becomes stale.
    pub fn begin(&self, source: DataSource, range: RangeSelector) -> RequestTicket {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        RequestTicket { seq, source, range }
    }

    /// Sequence number of the most recent request, 0 when none was issued.
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// True when no newer request has been issued since `ticket`.
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.latest() == ticket.seq
    }

    /// Pass `value` through only when `ticket` is still current.
    pub fn accept<T>(&self, ticket: &RequestTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            debug!(
                seq = ticket.seq,
                latest = self.latest(),
                range = %ticket.range,
                source = %ticket.source,
                "discarding response for superseded request"
            );
            None
        }
    }
}

/// Result of a generation request paired with the ticket that issued it.
#[derive(Debug)]
pub struct TrackedSeries {
    /// Ticket the request was issued under.
    pub ticket: RequestTicket,
    /// Outcome of the request.
    pub result: Result<SeriesBundle>,
}

impl TrackedSeries {
    /// Keep the result only if its ticket is still the latest.
    pub fn accept(self, sequencer: &RequestSequencer) -> Option<Result<SeriesBundle>> {
        sequencer.accept(&self.ticket, self.result)
    }
}
